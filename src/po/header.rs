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

//! The header entry: the `msgstr` of the empty `msgid`.

use chrono::{DateTime, Utc};
use polib::metadata::CatalogMetadata;

use crate::error::{ConvertError, Result};
use crate::plurals::PluralRule;

/// Parse header text found on `line`.
///
/// The `Plural-Forms` field is returned separately as a validated rule
/// so it can seed the plural resolver.
pub fn parse(text: &str, line: usize) -> Result<(CatalogMetadata, Option<PluralRule>)> {
    let mut plural_rule = None;
    for field in text.lines() {
        let Some((key, value)) = field.split_once(':') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("Plural-Forms") {
            let rule = PluralRule::parse_header(value)
                .map_err(|err| ConvertError::parse(line, format!("invalid Plural-Forms: {err}")))?;
            plural_rule = Some(rule);
        }
    }

    let metadata = match CatalogMetadata::parse(text) {
        Ok(metadata) => metadata,
        Err(err) => {
            log::warn!("Ignoring unreadable header metadata on line {line}: {err:?}");
            CatalogMetadata::new()
        }
    };
    Ok((metadata, plural_rule))
}

/// Metadata for a catalog generated from i18next JSON.
pub fn generate(language: &str, project_id_version: &str, now: DateTime<Utc>) -> CatalogMetadata {
    let mut metadata = CatalogMetadata::new();
    metadata.project_id_version = String::from(project_id_version);
    let timestamp = now.format("%Y-%m-%d %H:%M%z").to_string();
    metadata.pot_creation_date = timestamp.clone();
    metadata.po_revision_date = timestamp;
    metadata.language = String::from(language);
    metadata.mime_version = String::from("1.0");
    metadata.content_type = String::from("text/plain; charset=UTF-8");
    metadata.content_transfer_encoding = String::from("8bit");
    metadata
}

/// Render the header text, one `Key: value` line per non-empty field.
pub fn render(metadata: &CatalogMetadata, rule: &PluralRule) -> String {
    let plural_forms = rule.header_value();
    let fields = [
        ("Project-Id-Version", metadata.project_id_version.as_str()),
        ("POT-Creation-Date", metadata.pot_creation_date.as_str()),
        ("PO-Revision-Date", metadata.po_revision_date.as_str()),
        ("Language", metadata.language.as_str()),
        ("MIME-Version", metadata.mime_version.as_str()),
        ("Content-Type", metadata.content_type.as_str()),
        (
            "Content-Transfer-Encoding",
            metadata.content_transfer_encoding.as_str(),
        ),
        ("Plural-Forms", plural_forms.as_str()),
    ];
    fields
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}: {value}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plural_forms() {
        let (_, rule) = parse(
            "Content-Type: text/plain; charset=UTF-8\n\
             Plural-Forms: nplurals=3; plural=(n==1 ? 0 : n==2 ? 1 : 2);\n",
            2,
        )
        .unwrap();
        assert_eq!(rule.unwrap().form_count(), 3);
    }

    #[test]
    fn test_parse_without_plural_forms() {
        let (_, rule) = parse("Language: de\n", 2).unwrap();
        assert_eq!(rule, None);
    }

    #[test]
    fn test_parse_invalid_plural_forms() {
        let err = parse("Plural-Forms: nplurals=2; plural=n;\n", 7).unwrap_err();
        assert!(matches!(err, ConvertError::Parse { line: 7, .. }));
    }

    #[test]
    fn test_generate_and_render() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let metadata = generate("de", "i18next-conv", now);
        let rule = PluralRule::new(2, "(n != 1)").unwrap();
        assert_eq!(
            render(&metadata, &rule),
            "Project-Id-Version: i18next-conv\n\
             POT-Creation-Date: 2024-03-01 12:30+0000\n\
             PO-Revision-Date: 2024-03-01 12:30+0000\n\
             Language: de\n\
             MIME-Version: 1.0\n\
             Content-Type: text/plain; charset=UTF-8\n\
             Content-Transfer-Encoding: 8bit\n\
             Plural-Forms: nplurals=2; plural=(n != 1);\n"
        );
    }
}
