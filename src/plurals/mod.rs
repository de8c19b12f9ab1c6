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

//! Plural rules: how many forms a language has and which form a
//! quantity selects.

mod builtin;
pub mod expression;

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConvertError, Result};
use expression::Ast;

/// Rules are checked against every quantity up to this value when
/// they are loaded.
const VALIDATION_LIMIT: u64 = 1000;

/// Upper bound for `nplurals`. No language uses more than six forms.
pub const MAX_PLURAL_FORMS: usize = 10;

/// A validated plural rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluralRule {
    nplurals: usize,
    expression: String,
    ast: Ast,
    categories: Vec<String>,
}

impl PluralRule {
    /// Build a rule from a form count and a gettext plural expression.
    ///
    /// The expression must select an index below `nplurals` for every
    /// quantity from 0 to 1000.
    pub fn new(nplurals: usize, expression: &str) -> Result<Self> {
        if nplurals == 0 {
            return Err(ConvertError::PluralRule(format!(
                "nplurals must be at least 1 in {expression:?}"
            )));
        }
        if nplurals > MAX_PLURAL_FORMS {
            return Err(ConvertError::PluralRule(format!(
                "nplurals={nplurals} exceeds the limit of {MAX_PLURAL_FORMS} forms"
            )));
        }
        let ast = Ast::parse(expression)
            .map_err(|err| ConvertError::PluralRule(err.to_string()))?;
        if let Some(n) = (0..=VALIDATION_LIMIT).find(|&n| ast.evaluate(n) >= nplurals as u64) {
            return Err(ConvertError::PluralRule(format!(
                "{expression:?} selects form {} for n = {n}, but there are only {nplurals} forms",
                ast.evaluate(n)
            )));
        }
        Ok(PluralRule {
            nplurals,
            expression: expression.trim().to_string(),
            ast,
            categories: Vec::new(),
        })
    }

    /// Attach CLDR category names, one per form index.
    pub fn with_categories(mut self, categories: Vec<String>) -> Result<Self> {
        if !categories.is_empty() && categories.len() != self.nplurals {
            return Err(ConvertError::PluralRule(format!(
                "{} categories given for {} plural forms",
                categories.len(),
                self.nplurals
            )));
        }
        self.categories = categories;
        Ok(self)
    }

    /// Parse the value of a `Plural-Forms` header such as
    /// `nplurals=2; plural=(n != 1);`.
    pub fn parse_header(value: &str) -> Result<Self> {
        let mut nplurals = None;
        let mut plural = None;
        for field in value.split(';').map(str::trim).filter(|f| !f.is_empty()) {
            match field.split_once('=') {
                Some((key, value)) if key.trim() == "nplurals" => {
                    nplurals = Some(value.trim().parse::<usize>().map_err(|_| {
                        ConvertError::PluralRule(format!("invalid nplurals in {field:?}"))
                    })?);
                }
                Some((key, value)) if key.trim() == "plural" => plural = Some(value.trim()),
                _ => {
                    return Err(ConvertError::PluralRule(format!(
                        "unexpected field {field:?} in {value:?}"
                    )))
                }
            }
        }
        match (nplurals, plural) {
            (Some(nplurals), Some(plural)) => PluralRule::new(nplurals, plural),
            _ => Err(ConvertError::PluralRule(format!(
                "expected nplurals and plural in {value:?}"
            ))),
        }
    }

    /// Number of plural forms.
    pub fn form_count(&self) -> usize {
        self.nplurals
    }

    /// Form index selected by the quantity `n`.
    pub fn form_index(&self, n: u64) -> usize {
        let index = usize::try_from(self.ast.evaluate(n)).unwrap_or(usize::MAX);
        index.min(self.nplurals - 1)
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// CLDR category names by form index, empty if unknown.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The rule formatted for a `Plural-Forms` header.
    pub fn header_value(&self) -> String {
        format!("nplurals={}; plural={};", self.nplurals, self.expression)
    }
}

/// One entry of a plural definition file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PluralDefinition {
    /// `"nplurals=2; plural=(n != 1);"`
    Header(String),
    Table {
        nplurals: usize,
        plural: String,
        #[serde(default)]
        categories: Vec<String>,
    },
}

impl PluralDefinition {
    fn into_rule(self) -> Result<PluralRule> {
        match self {
            PluralDefinition::Header(value) => PluralRule::parse_header(&value),
            PluralDefinition::Table {
                nplurals,
                plural,
                categories,
            } => PluralRule::new(nplurals, &plural)?.with_categories(categories),
        }
    }
}

/// Normalize a language code for lookups: `pt-BR` becomes `pt_br`.
fn normalize_language(language: &str) -> String {
    language.trim().to_lowercase().replace('-', "_")
}

/// Candidate lookup keys, most specific first.
fn language_candidates(language: &str) -> Vec<String> {
    let normalized = normalize_language(language);
    let mut candidates = vec![normalized.clone()];
    if let Some((primary, _)) = normalized.split_once('_') {
        candidates.push(primary.to_string());
    }
    candidates
}

/// Maps language codes to plural rules.
///
/// Rules defined on the resolver take precedence over the built-in
/// table.
#[derive(Clone, Debug, Default)]
pub struct PluralResolver {
    definitions: HashMap<String, PluralRule>,
}

impl PluralResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver from a JSON plural definition file.
    ///
    /// The file maps language codes to either a `Plural-Forms` header
    /// value or an object with `nplurals`, `plural` and optional
    /// `categories`:
    ///
    /// ```
    /// use i18next_conv::plurals::PluralResolver;
    ///
    /// let resolver = PluralResolver::from_json(
    ///     r#"{
    ///         "tlh": "nplurals=2; plural=(n > 1);",
    ///         "en": { "nplurals": 1, "plural": "0" }
    ///     }"#,
    /// )
    /// .unwrap();
    /// assert_eq!(resolver.resolve("tlh").unwrap().form_count(), 2);
    /// assert_eq!(resolver.resolve("en").unwrap().form_count(), 1);
    /// ```
    pub fn from_json(text: &str) -> Result<Self> {
        let definitions: HashMap<String, PluralDefinition> = serde_json::from_str(text)
            .map_err(|err| ConvertError::parse(err.line(), err.to_string()))?;
        let mut resolver = PluralResolver::new();
        for (language, definition) in definitions {
            let rule = definition.into_rule().map_err(|err| {
                ConvertError::PluralRule(format!("definition for {language:?}: {err}"))
            })?;
            resolver.define(&language, rule);
        }
        Ok(resolver)
    }

    /// Load a plural definition file, see [`PluralResolver::from_json`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loading plural definitions from {}", path.display());
        Self::from_json(&text)
    }

    /// Override or add the rule for `language`.
    pub fn define(&mut self, language: &str, rule: PluralRule) {
        self.definitions.insert(normalize_language(language), rule);
    }

    /// Find the rule for `language`.
    pub fn resolve(&self, language: &str) -> Result<PluralRule> {
        self.resolve_with_fallback(language, None)
    }

    /// Find the rule for `language`, consulting `fallback` (usually the
    /// `Plural-Forms` header of the source file) before the built-in
    /// table.
    pub fn resolve_with_fallback(
        &self,
        language: &str,
        fallback: Option<&PluralRule>,
    ) -> Result<PluralRule> {
        let candidates = language_candidates(language);
        if let Some(rule) = candidates
            .iter()
            .find_map(|candidate| self.definitions.get(candidate))
        {
            return Ok(rule.clone());
        }
        if let Some(rule) = fallback {
            return Ok(rule.clone());
        }
        let builtin = candidates
            .iter()
            .find_map(|candidate| builtin::lookup(candidate))
            .ok_or_else(|| ConvertError::UnknownLanguage(language.to_string()))?;
        PluralRule::new(builtin.nplurals, builtin.plural)?.with_categories(
            builtin
                .categories
                .iter()
                .map(|category| category.to_string())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_english() {
        let rule = PluralResolver::new().resolve("en").unwrap();
        assert_eq!(rule.form_count(), 2);
        assert_eq!(rule.form_index(0), 1);
        assert_eq!(rule.form_index(1), 0);
        assert_eq!(rule.form_index(2), 1);
        assert_eq!(rule.categories(), ["one", "other"]);
    }

    #[test]
    fn test_builtin_japanese() {
        let rule = PluralResolver::new().resolve("ja").unwrap();
        assert_eq!(rule.form_count(), 1);
        assert_eq!(rule.form_index(7), 0);
    }

    #[test]
    fn test_builtin_russian() {
        let rule = PluralResolver::new().resolve("ru").unwrap();
        assert_eq!(rule.form_count(), 3);
        assert_eq!(
            [1, 3, 5, 21].map(|n| rule.form_index(n)),
            [0, 1, 2, 0]
        );
    }

    #[test]
    fn test_region_fallback() {
        let resolver = PluralResolver::new();
        assert_eq!(resolver.resolve("de-CH").unwrap().form_count(), 2);
        // Brazilian Portuguese has its own entry.
        assert_eq!(resolver.resolve("pt-BR").unwrap().form_index(0), 0);
        assert_eq!(resolver.resolve("pt").unwrap().form_index(0), 1);
    }

    #[test]
    fn test_unknown_language() {
        let err = PluralResolver::new().resolve("xx").unwrap_err();
        assert!(matches!(err, ConvertError::UnknownLanguage(lang) if lang == "xx"));
    }

    #[test]
    fn test_every_builtin_rule_is_valid() {
        for rule in builtin::BUILTIN_RULES {
            let parsed = PluralRule::new(rule.nplurals, rule.plural)
                .and_then(|parsed| {
                    parsed.with_categories(rule.categories.iter().map(|c| c.to_string()).collect())
                });
            assert!(parsed.is_ok(), "invalid rule for {:?}", rule.languages);
        }
    }

    #[test]
    fn test_parse_header() {
        let rule = PluralRule::parse_header("nplurals=3; plural=(n==1 ? 0 : n==2 ? 1 : 2);")
            .unwrap();
        assert_eq!(rule.form_count(), 3);
        assert_eq!(rule.form_index(2), 1);
        assert_eq!(
            rule.header_value(),
            "nplurals=3; plural=(n==1 ? 0 : n==2 ? 1 : 2);"
        );
    }

    #[test]
    fn test_parse_header_errors() {
        assert!(PluralRule::parse_header("nplurals=2;").is_err());
        assert!(PluralRule::parse_header("nplurals=two; plural=n != 1;").is_err());
        assert!(PluralRule::parse_header("nplurals=2; plural=n;").is_err());
        assert!(PluralRule::parse_header("nplurals=0; plural=0;").is_err());
    }

    #[test]
    fn test_too_many_forms() {
        let err = PluralRule::parse_header("nplurals=1000000000; plural=0;").unwrap_err();
        assert!(matches!(err, ConvertError::PluralRule(_)));
        assert!(PluralRule::new(MAX_PLURAL_FORMS, "n % 10").is_ok());
        assert!(PluralRule::new(MAX_PLURAL_FORMS + 1, "0").is_err());
    }

    #[test]
    fn test_deeply_nested_header() {
        let depth = 200_000;
        let header = format!(
            "nplurals=1; plural={}0{};",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let err = PluralRule::parse_header(&header).unwrap_err();
        assert!(matches!(err, ConvertError::PluralRule(_)));
    }

    #[test]
    fn test_form_index_is_clamped() {
        // Validation only covers small quantities.
        let rule = PluralRule::new(2, "n > 5000 ? 7 : n != 1").unwrap();
        assert_eq!(rule.form_index(10_000), 1);
    }

    #[test]
    fn test_definitions_override_builtin() {
        let resolver = PluralResolver::from_json(
            r#"{"de": {"nplurals": 3, "plural": "n == 0 ? 0 : n == 1 ? 1 : 2",
                       "categories": ["zero", "one", "other"]}}"#,
        )
        .unwrap();
        let rule = resolver.resolve("de-AT").unwrap();
        assert_eq!(rule.form_count(), 3);
        assert_eq!(rule.categories(), ["zero", "one", "other"]);
    }

    #[test]
    fn test_fallback_precedence() {
        let header = PluralRule::parse_header("nplurals=1; plural=0;").unwrap();
        let resolver = PluralResolver::new();
        assert_eq!(
            resolver
                .resolve_with_fallback("en", Some(&header))
                .unwrap()
                .form_count(),
            1
        );
        assert_eq!(
            resolver
                .resolve_with_fallback("xx", Some(&header))
                .unwrap()
                .form_count(),
            1
        );
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(PluralResolver::from_json(r#"{"en": {"nplurals": 2}}"#).is_err());
        assert!(PluralResolver::from_json(
            r#"{"en": {"nplurals": 2, "plural": "n != 1", "categories": ["one"]}}"#
        )
        .is_err());
        assert!(matches!(
            PluralResolver::from_json("{"),
            Err(ConvertError::Parse { .. })
        ));
    }
}
