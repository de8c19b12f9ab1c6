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

//! Plural key suffixes such as `_plural`, `_2` or `_few`.

use clap::ValueEnum;
use serde::Deserialize;

use crate::plurals::PluralRule;

/// How plural form indexes are spelled in i18next keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PluralSuffixStyle {
    /// `key` and `key_plural` for two forms, `key_0`, `key_1`, ...
    /// otherwise.
    #[default]
    Legacy,
    /// Always `key_0`, `key_1`, ...
    Numeric,
    /// CLDR category names: `key_one`, `key_few`, ... Falls back to
    /// numeric suffixes for rules without categories.
    Cldr,
}

/// The suffix of each plural form of one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralSuffixes {
    suffixes: Vec<String>,
}

impl PluralSuffixes {
    pub fn new(style: PluralSuffixStyle, rule: &PluralRule) -> Self {
        let count = rule.form_count();
        let numeric = || -> Vec<String> { (0..count).map(|index| format!("_{index}")).collect() };
        let suffixes = match style {
            PluralSuffixStyle::Legacy if count == 1 => vec![String::new()],
            PluralSuffixStyle::Legacy if count == 2 => {
                vec![String::new(), String::from("_plural")]
            }
            PluralSuffixStyle::Legacy | PluralSuffixStyle::Numeric => numeric(),
            PluralSuffixStyle::Cldr if rule.categories().len() == count => rule
                .categories()
                .iter()
                .map(|category| format!("_{category}"))
                .collect(),
            PluralSuffixStyle::Cldr => numeric(),
        };
        PluralSuffixes { suffixes }
    }

    /// Suffix of form `index`.
    pub fn suffix(&self, index: usize) -> Option<&str> {
        self.suffixes.get(index).map(String::as_str)
    }

    /// Form index spelled by `suffix`.
    pub fn index_of(&self, suffix: &str) -> Option<usize> {
        self.suffixes.iter().position(|candidate| candidate == suffix)
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plurals::PluralResolver;
    use pretty_assertions::assert_eq;

    fn suffixes(style: PluralSuffixStyle, language: &str) -> Vec<String> {
        let rule = PluralResolver::new().resolve(language).unwrap();
        let suffixes = PluralSuffixes::new(style, &rule);
        (0..suffixes.len())
            .filter_map(|index| suffixes.suffix(index))
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_legacy() {
        assert_eq!(suffixes(PluralSuffixStyle::Legacy, "en"), vec!["", "_plural"]);
        assert_eq!(suffixes(PluralSuffixStyle::Legacy, "ja"), vec![""]);
        assert_eq!(
            suffixes(PluralSuffixStyle::Legacy, "ru"),
            vec!["_0", "_1", "_2"]
        );
    }

    #[test]
    fn test_numeric() {
        assert_eq!(suffixes(PluralSuffixStyle::Numeric, "en"), vec!["_0", "_1"]);
    }

    #[test]
    fn test_cldr() {
        assert_eq!(
            suffixes(PluralSuffixStyle::Cldr, "ru"),
            vec!["_one", "_few", "_many"]
        );
        let rule = PluralRule::new(2, "n > 1").unwrap();
        let suffixes = PluralSuffixes::new(PluralSuffixStyle::Cldr, &rule);
        assert_eq!(suffixes.suffix(1), Some("_1"));
    }

    #[test]
    fn test_index_of() {
        let rule = PluralResolver::new().resolve("en").unwrap();
        let suffixes = PluralSuffixes::new(PluralSuffixStyle::Legacy, &rule);
        assert_eq!(suffixes.index_of(""), Some(0));
        assert_eq!(suffixes.index_of("_plural"), Some(1));
        assert_eq!(suffixes.index_of("_2"), None);
        assert_eq!(suffixes.suffix(2), None);
    }
}
