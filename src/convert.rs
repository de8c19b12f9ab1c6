// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Conversion runs: read, parse, filter, resolve, serialize, write.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use polib::metadata::CatalogMetadata;

use crate::catalog::{resolve_references, Catalog, ReferenceSource};
use crate::error::{ConvertError, MissingBaseEntry, Result};
use crate::filter::{apply_filter, EntryFilter};
use crate::options::{ConvertOptions, Format, Formats};
use crate::plurals::{PluralResolver, PluralRule};
use crate::{json, mo, po};

/// Progress of a run. Runs only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Parsed,
    Filtered,
    Serialized,
    Done,
    Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Number of entries in the output.
    pub entries: usize,
    /// The last stage reached.
    pub stage: Stage,
    /// Key-as-reference lookups that found no base entry. The affected
    /// entries are missing from the output.
    pub diagnostics: Vec<MissingBaseEntry>,
}

/// Serialized output of [`Converter::convert_str`].
#[derive(Debug)]
pub struct Converted {
    pub output: Vec<u8>,
    pub report: Report,
}

struct Run {
    stage: Stage,
}

impl Run {
    fn advance(&mut self, next: Stage) {
        log::debug!("{:?} -> {next:?}", self.stage);
        self.stage = next;
    }
}

/// A parsed source catalog.
struct Source {
    catalog: Catalog,
    rule: PluralRule,
    /// Header of a PO source.
    metadata: Option<CatalogMetadata>,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Converts catalogs with fixed options and an optional filter.
pub struct Converter<'f> {
    options: ConvertOptions,
    filter: Option<Box<dyn EntryFilter + 'f>>,
}

impl<'f> Converter<'f> {
    pub fn new(options: ConvertOptions) -> Self {
        Converter {
            options,
            filter: None,
        }
    }

    /// Run `filter` on every parsed entry.
    pub fn with_filter(mut self, filter: impl EntryFilter + 'f) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `source` to `target` and pass the outcome to `done`.
    ///
    /// `done` is called exactly once.
    pub fn process<F>(&mut self, language: &str, source: &Path, target: &Path, done: F)
    where
        F: FnOnce(Result<Report>),
    {
        done(self.convert(language, source, target));
    }

    /// Convert `source` to `target`.
    ///
    /// Every precondition is checked before any file is touched, and
    /// the target is only written once the whole output is ready.
    pub fn convert(&mut self, language: &str, source: &Path, target: &Path) -> Result<Report> {
        let formats = self.options.validate(language, source, target)?;
        log::info!(
            "Converting {} ({}) to {} ({}) for {language}",
            source.display(),
            formats.source,
            target.display(),
            formats.target
        );

        let source_text = read(source)?;
        let base_text = match &self.options.base {
            Some(base) if self.options.key_as_reference || self.options.pot => {
                Some(read(base)?)
            }
            _ => None,
        };
        let Converted { output, mut report } =
            self.convert_str(language, formats, &source_text, base_text.as_deref())?;

        if let Some(parent) = target.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConvertError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(target, output).map_err(|source| ConvertError::Write {
            path: target.to_path_buf(),
            source,
        })?;
        log::debug!("{:?} -> {:?}", report.stage, Stage::Done);
        report.stage = Stage::Done;
        log::info!("Wrote {} entries to {}", report.entries, target.display());
        Ok(report)
    }

    /// Convert catalog text in memory.
    ///
    /// `base` is the base catalog text, in the source format, used in
    /// key-as-reference and POT mode. Only the plural definition file,
    /// if configured, is read from disk.
    pub fn convert_str(
        &mut self,
        language: &str,
        formats: Formats,
        source: &str,
        base: Option<&str>,
    ) -> Result<Converted> {
        let mut run = Run { stage: Stage::Idle };
        let result = self.run(&mut run, language, formats, source, base);
        if let Err(err) = &result {
            log::debug!("Failed after {:?}: {err}", run.stage);
            run.advance(Stage::Failed);
        }
        result
    }

    fn run(
        &mut self,
        run: &mut Run,
        language: &str,
        formats: Formats,
        source: &str,
        base: Option<&str>,
    ) -> Result<Converted> {
        let resolver = match &self.options.plurals {
            Some(path) => PluralResolver::load(path)?,
            None => PluralResolver::new(),
        };
        let Source {
            mut catalog,
            rule,
            metadata,
        } = self.parse(formats.source, source, language, &resolver)?;
        log::debug!(
            "Parsed {} entries, {} plural forms",
            catalog.len(),
            rule.form_count()
        );
        let mut base = match base {
            Some(text) if self.options.key_as_reference || self.options.pot => {
                Some(self.parse(formats.source, text, language, &resolver)?.catalog)
            }
            _ => None,
        };
        // Without key-as-reference, a template lists the base entries.
        if self.options.pot && !self.options.key_as_reference {
            catalog = base
                .take()
                .ok_or_else(|| ConvertError::configuration("pot requires a base catalog"))?;
            log::debug!("Building the template from {} base entries", catalog.len());
        }
        run.advance(Stage::Parsed);

        if let Some(filter) = self.filter.as_deref_mut() {
            catalog = apply_filter(catalog, filter)?;
        }
        run.advance(Stage::Filtered);

        let mut diagnostics = Vec::new();
        if self.options.key_as_reference {
            let base = base.ok_or_else(|| {
                ConvertError::configuration("keyasareference requires a base catalog")
            })?;
            let reference_source = match formats.source {
                Format::Json => ReferenceSource::Json,
                Format::Po | Format::Mo => ReferenceSource::Po,
            };
            let resolved = resolve_references(catalog, &base, reference_source);
            catalog = resolved.catalog;
            diagnostics = resolved.missing;
        }
        catalog.fit_plural_rule(&rule, self.options.ignore_plurals);

        let output = self.serialize(formats.target, &catalog, &rule, metadata, language)?;
        run.advance(Stage::Serialized);
        Ok(Converted {
            output,
            report: Report {
                entries: catalog.len(),
                stage: run.stage,
                diagnostics,
            },
        })
    }

    fn parse(
        &self,
        format: Format,
        text: &str,
        language: &str,
        resolver: &PluralResolver,
    ) -> Result<Source> {
        match format {
            Format::Po => {
                let document = po::parse(text)?;
                let rule =
                    resolver.resolve_with_fallback(language, document.plural_rule.as_ref())?;
                Ok(Source {
                    catalog: document.catalog,
                    rule,
                    metadata: Some(document.metadata),
                })
            }
            Format::Json => {
                let rule = resolver.resolve(language)?;
                let catalog = json::parse(text, &rule, &self.options.json())?;
                Ok(Source {
                    catalog,
                    rule,
                    metadata: None,
                })
            }
            Format::Mo => Err(ConvertError::configuration(
                "MO files can only be written, not read",
            )),
        }
    }

    /// Header text for PO and MO output: the source header if there was
    /// one, a generated header otherwise.
    fn header(
        &self,
        metadata: Option<CatalogMetadata>,
        rule: &PluralRule,
        language: &str,
    ) -> String {
        let metadata = metadata.unwrap_or_else(|| {
            po::header::generate(language, &self.options.project_id_version, Utc::now())
        });
        po::header::render(&metadata, rule)
    }

    fn serialize(
        &self,
        format: Format,
        catalog: &Catalog,
        rule: &PluralRule,
        metadata: Option<CatalogMetadata>,
        language: &str,
    ) -> Result<Vec<u8>> {
        match format {
            Format::Json => Ok(json::write(catalog, rule, &self.options.json())?.into_bytes()),
            Format::Po => {
                let options = po::WriteOptions {
                    pot: self.options.pot,
                    split_new_line: self.options.split_new_line,
                };
                let header = self.header(metadata, rule, language);
                Ok(po::write(catalog, &header, rule, options).into_bytes())
            }
            Format::Mo => {
                let header = self.header(metadata, rule, language);
                let mut output = Vec::new();
                mo::write(&mut output, catalog, &header, rule).map_err(|source| {
                    ConvertError::Write {
                        path: PathBuf::from("<memory>"),
                        source,
                    }
                })?;
                Ok(output)
            }
        }
    }
}

/// Convert `source` to `target` and report the outcome to `done`,
/// exactly once.
///
/// ```no_run
/// use std::path::Path;
/// use i18next_conv::convert::process;
/// use i18next_conv::options::ConvertOptions;
///
/// process(
///     "de",
///     Path::new("locales/de/translation.po"),
///     Path::new("locales/de/translation.json"),
///     &ConvertOptions::default(),
///     |result| match result {
///         Ok(report) => println!("{} entries written", report.entries),
///         Err(err) => eprintln!("{err}"),
///     },
/// );
/// ```
pub fn process<F>(
    language: &str,
    source: &Path,
    target: &Path,
    options: &ConvertOptions,
    done: F,
) where
    F: FnOnce(Result<Report>),
{
    Converter::new(options.clone()).process(language, source, target, done);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::error::BoxError;
    use crate::filter::FilterAction;
    use pretty_assertions::assert_eq;

    const PO_TO_JSON: Formats = Formats {
        source: Format::Po,
        target: Format::Json,
    };
    const JSON_TO_PO: Formats = Formats {
        source: Format::Json,
        target: Format::Po,
    };

    fn convert(
        options: ConvertOptions,
        language: &str,
        formats: Formats,
        source: &str,
        base: Option<&str>,
    ) -> Result<(String, Report)> {
        let Converted { output, report } =
            Converter::new(options).convert_str(language, formats, source, base)?;
        Ok((String::from_utf8(output).unwrap(), report))
    }

    /// The entries of PO text, header excluded.
    fn po_entries(text: &str) -> Vec<CatalogEntry> {
        po::parse(text).unwrap().catalog.into_entries().collect()
    }

    #[test]
    fn test_context_scenario() {
        let (json, report) = convert(
            ConvertOptions::default(),
            "de",
            PO_TO_JSON,
            "msgctxt \"formal\"\nmsgid \"item\"\nmsgstr \"Item\"\n",
            None,
        )
        .unwrap();
        assert_eq!(json, "{\n    \"item_formal\": \"Item\"\n}\n");
        assert_eq!(report.entries, 1);
        assert_eq!(report.stage, Stage::Serialized);
    }

    #[test]
    fn test_plural_scenario() {
        let po = "msgid \"apple\"\n\
                  msgid_plural \"apples\"\n\
                  msgstr[0] \"1 apple\"\n\
                  msgstr[1] \"%d apples\"\n";
        let (json, _) = convert(ConvertOptions::default(), "en", PO_TO_JSON, po, None).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&json).unwrap(),
            serde_json::json!({"apple": {"apple": "1 apple", "apple_plural": "%d apples"}})
        );

        let (back, _) = convert(ConvertOptions::default(), "en", JSON_TO_PO, &json, None).unwrap();
        assert_eq!(
            po_entries(&back),
            vec![CatalogEntry::plural(
                "apple",
                "apple",
                vec!["1 apple".into(), "%d apples".into()]
            )]
        );
        assert!(back.contains(
            "msgid \"apple\"\nmsgid_plural \"apple\"\nmsgstr[0] \"1 apple\"\nmsgstr[1] \"%d apples\"\n"
        ));
    }

    #[test]
    fn test_plural_forms_header_seeds_rule() {
        let po = "msgid \"\"\n\
                  msgstr \"Plural-Forms: nplurals=3; plural=(n==1 ? 0 : n==2 ? 1 : 2);\\n\"\n\
                  \n\
                  msgid \"cat\"\n\
                  msgid_plural \"cats\"\n\
                  msgstr[0] \"a\"\n\
                  msgstr[1] \"b\"\n\
                  msgstr[2] \"c\"\n";
        let (json, _) = convert(ConvertOptions::default(), "xx", PO_TO_JSON, po, None).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&json).unwrap(),
            serde_json::json!({"cat": {"cat_0": "a", "cat_1": "b", "cat_2": "c"}})
        );
    }

    #[test]
    fn test_unknown_language() {
        let err = convert(
            ConvertOptions::default(),
            "xx",
            JSON_TO_PO,
            r#"{"a": "b"}"#,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownLanguage(_)));
    }

    #[test]
    fn test_generated_header() {
        let (po, _) = convert(
            ConvertOptions::default(),
            "de",
            JSON_TO_PO,
            r#"{"hello": "Hallo"}"#,
            None,
        )
        .unwrap();
        assert!(po.starts_with("msgid \"\"\nmsgstr \"\"\n\"Project-Id-Version: i18next-conv\\n\"\n"));
        assert!(po.contains("\"Language: de\\n\"\n"));
        assert!(po.contains("\"Plural-Forms: nplurals=2; plural=(n != 1);\\n\"\n"));
        assert!(po.ends_with("\nmsgid \"hello\"\nmsgstr \"Hallo\"\n"));
    }

    #[test]
    fn test_pot() {
        let options = ConvertOptions {
            pot: true,
            base: Some(PathBuf::from("en.json")),
            ..ConvertOptions::default()
        };
        let (pot, report) = convert(
            options.clone(),
            "en",
            JSON_TO_PO,
            r#"{"hello": "Hallo"}"#,
            Some(r#"{"hello": "Hello", "apple": {"apple": "apple", "apple_plural": "apples"}}"#),
        )
        .unwrap();
        assert_eq!(report.entries, 2);
        assert!(pot.ends_with(
            "msgid \"hello\"\nmsgstr \"\"\n\
             \n\
             msgid \"apple\"\nmsgid_plural \"apple\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n"
        ));

        let err = convert(options, "en", JSON_TO_PO, r#"{"hello": "Hallo"}"#, None).unwrap_err();
        assert!(matches!(err, ConvertError::Configuration(_)));
    }

    #[test]
    fn test_key_as_reference_from_po() {
        let options = ConvertOptions {
            key_as_reference: true,
            base: Some(PathBuf::from("en.po")),
            ..ConvertOptions::default()
        };
        let base = "#: app.title\nmsgid \"My App\"\nmsgstr \"My App\"\n";
        let source = "#: app.title\nmsgid \"My App\"\nmsgstr \"Meine App\"\n\
                      \n\
                      #: app.gone\nmsgid \"Gone\"\nmsgstr \"Weg\"\n";
        let (json, report) = convert(options, "de", PO_TO_JSON, source, Some(base)).unwrap();
        assert_eq!(json, "{\n    \"app.title\": \"Meine App\"\n}\n");
        assert_eq!(report.entries, 1);
        assert_eq!(
            report.diagnostics,
            vec![MissingBaseEntry {
                key: String::from("app.gone")
            }]
        );
    }

    #[test]
    fn test_key_as_reference_from_json() {
        let options = ConvertOptions {
            key_as_reference: true,
            base: Some(PathBuf::from("en.json")),
            ..ConvertOptions::default()
        };
        let base = r#"{"title": "My App", "unused": "Unused"}"#;
        let source = r#"{"title": "Meine App", "missing": "Fehlt"}"#;
        let (po, report) = convert(options, "de", JSON_TO_PO, source, Some(base)).unwrap();
        assert_eq!(
            po_entries(&po),
            vec![CatalogEntry::singular("My App", "Meine App").with_reference("title")]
        );
        assert_eq!(
            report.diagnostics,
            vec![MissingBaseEntry {
                key: String::from("missing")
            }]
        );
    }

    #[test]
    fn test_filter() {
        let filter = |entry: &CatalogEntry| -> std::result::Result<FilterAction, BoxError> {
            Ok(if entry.id == "secret" {
                FilterAction::Remove
            } else {
                FilterAction::Replace(CatalogEntry {
                    translations: vec![entry.translation(0).to_uppercase()],
                    ..entry.clone()
                })
            })
        };
        let Converted { output, report } = Converter::new(ConvertOptions::default())
            .with_filter(filter)
            .convert_str(
                "de",
                PO_TO_JSON,
                "msgid \"a\"\nmsgstr \"x\"\n\nmsgid \"secret\"\nmsgstr \"y\"\n",
                None,
            )
            .unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "{\n    \"a\": \"X\"\n}\n");
        assert_eq!(report.entries, 1);
    }

    #[test]
    fn test_mo_target() {
        let Converted { output, .. } = Converter::new(ConvertOptions::default())
            .convert_str(
                "de",
                Formats {
                    source: Format::Json,
                    target: Format::Mo,
                },
                r#"{"hello": "Hallo"}"#,
                None,
            )
            .unwrap();
        assert_eq!(&output[0..4], &[0xde_u8, 0x12, 0x04, 0x95]);
    }

    #[test]
    fn test_ignore_plurals() {
        let options = ConvertOptions {
            ignore_plurals: true,
            ..ConvertOptions::default()
        };
        let po = "msgid \"apple\"\nmsgid_plural \"apples\"\nmsgstr[0] \"Apfel\"\nmsgstr[1] \"Äpfel\"\n";
        let (json, _) = convert(options, "de", PO_TO_JSON, po, None).unwrap();
        assert_eq!(json, "{\n    \"apple\": \"Apfel\"\n}\n");
    }
}
