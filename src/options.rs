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

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::{ConvertError, Result};
use crate::json::suffix::PluralSuffixStyle;
use crate::json::JsonOptions;

/// A catalog file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Gettext PO or POT text.
    Po,
    /// i18next JSON.
    Json,
    /// Compiled gettext catalog, output only.
    Mo,
}

impl Format {
    /// Format implied by the file extension of `path`.
    pub fn from_path(path: &Path) -> Option<Format> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "po" | "pot" => Some(Format::Po),
            "json" => Some(Format::Json),
            "mo" => Some(Format::Mo),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Po => "po",
            Format::Json => "json",
            Format::Mo => "mo",
        })
    }
}

/// Settings of one conversion.
///
/// Deserializes from the camelCase option names of i18next-conv
/// configuration files:
///
/// ```
/// use i18next_conv::options::ConvertOptions;
///
/// let options: ConvertOptions =
///     serde_json::from_str(r#"{"keyseparator": ".", "ignorePlurals": true}"#).unwrap();
/// assert_eq!(options.key_separator, ".");
/// assert_eq!(options.ctx_separator, "_");
/// assert!(options.ignore_plurals);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Joins id and context in i18next keys.
    pub ctx_separator: String,
    /// Separates nesting levels in i18next keys.
    #[serde(rename = "keyseparator")]
    pub key_separator: String,
    /// Use the `#:` reference (or the i18next key) as key and look the
    /// text up in the base catalog.
    #[serde(rename = "keyasareference")]
    pub key_as_reference: bool,
    /// Base language catalog, in the source format.
    pub base: Option<PathBuf>,
    /// JSON plural definition file.
    pub plurals: Option<PathBuf>,
    pub ignore_plurals: bool,
    /// Write a POT template.
    pub pot: bool,
    pub split_new_line: bool,
    /// Only affects logging.
    pub quiet: bool,
    pub plural_suffix: PluralSuffixStyle,
    /// Overrides the format implied by the source extension.
    pub source_format: Option<Format>,
    /// Overrides the format implied by the target extension.
    pub target_format: Option<Format>,
    /// `Project-Id-Version` of generated PO headers.
    pub project_id_version: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            ctx_separator: String::from("_"),
            key_separator: String::from("##"),
            key_as_reference: false,
            base: None,
            plurals: None,
            ignore_plurals: false,
            pot: false,
            split_new_line: false,
            quiet: false,
            plural_suffix: PluralSuffixStyle::default(),
            source_format: None,
            target_format: None,
            project_id_version: String::from("i18next-conv"),
        }
    }
}

/// The source and target formats of a validated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formats {
    pub source: Format,
    pub target: Format,
}

fn resolve_format(explicit: Option<Format>, path: &Path, role: &str) -> Result<Format> {
    explicit.or_else(|| Format::from_path(path)).ok_or_else(|| {
        ConvertError::configuration(format!(
            "cannot tell the {role} format of {}, use a .po, .pot, .json or .mo extension \
             or set the format explicitly",
            path.display()
        ))
    })
}

impl ConvertOptions {
    /// Check every precondition of a run. Touches no files.
    pub fn validate(&self, language: &str, source: &Path, target: &Path) -> Result<Formats> {
        if language.trim().is_empty() {
            return Err(ConvertError::configuration("a language is required"));
        }
        if self.key_separator.is_empty() {
            return Err(ConvertError::configuration(
                "the key separator must not be empty",
            ));
        }
        if self.pot && self.base.is_none() {
            return Err(ConvertError::configuration(
                "generating a POT file requires a base file",
            ));
        }
        if self.key_as_reference && self.base.is_none() {
            return Err(ConvertError::configuration(
                "keyasareference requires a base file",
            ));
        }

        let formats = Formats {
            source: resolve_format(self.source_format, source, "source")?,
            target: resolve_format(self.target_format, target, "target")?,
        };
        if formats.source == Format::Mo {
            return Err(ConvertError::configuration(
                "MO files can only be written, not read",
            ));
        }
        if formats.source == formats.target {
            return Err(ConvertError::configuration(format!(
                "source and target are both {} files",
                formats.source
            )));
        }
        if self.pot && formats.target != Format::Po {
            return Err(ConvertError::configuration(format!(
                "a POT template cannot be written as {}",
                formats.target
            )));
        }
        if let Some(base) = &self.base {
            if let Some(base_format) = Format::from_path(base) {
                if base_format != formats.source {
                    return Err(ConvertError::configuration(format!(
                        "the base file {} must be a {} file like the source",
                        base.display(),
                        formats.source
                    )));
                }
            }
        }
        Ok(formats)
    }

    /// The JSON codec settings.
    pub fn json(&self) -> JsonOptions {
        JsonOptions {
            key_separator: self.key_separator.clone(),
            ctx_separator: self.ctx_separator.clone(),
            ignore_plurals: self.ignore_plurals,
            suffix_style: self.plural_suffix,
        }
    }
}
