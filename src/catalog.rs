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

//! The in-memory catalog shared by the PO and JSON codecs.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::error::MissingBaseEntry;
use crate::plurals::PluralRule;

/// The unique `(id, context)` pair of an entry. An empty context means
/// "no context".
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    pub id: String,
    pub context: String,
}

impl CompositeKey {
    pub fn new(id: impl Into<String>, context: impl Into<String>) -> Self {
        CompositeKey {
            id: id.into(),
            context: context.into(),
        }
    }

    /// Join id and context the way i18next keys spell them:
    /// `greeting` + `formal` becomes `greeting_formal` with the
    /// separator `_`.
    pub fn join(&self, ctx_separator: &str) -> String {
        if self.context.is_empty() {
            self.id.clone()
        } else {
            format!("{}{ctx_separator}{}", self.id, self.context)
        }
    }

    /// Split an i18next key into id and context on the rightmost
    /// separator. An empty separator disables context splitting.
    pub fn split(key: &str, ctx_separator: &str) -> Self {
        if ctx_separator.is_empty() {
            return CompositeKey::new(key, "");
        }
        match key.rsplit_once(ctx_separator) {
            Some((id, context)) if !id.is_empty() && !context.is_empty() => {
                CompositeKey::new(id, context)
            }
            _ => CompositeKey::new(key, ""),
        }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "{:?}", self.id)
        } else {
            write!(f, "{:?} (context {:?})", self.id, self.context)
        }
    }
}

/// One translatable message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    /// The `msgid`, or the i18next key path without context.
    pub id: String,
    /// The `msgctxt`, empty if there is none.
    pub context: String,
    /// The `msgid_plural`. `None` for singular entries.
    pub plural_id: Option<String>,
    /// Translations by plural form index. Never empty.
    pub translations: Vec<String>,
    /// Source references from `#:` comments.
    pub references: Vec<String>,
    /// Raw translator (`#`), extracted (`#.`) and previous (`#|`)
    /// comment lines.
    pub comments: Vec<String>,
    /// Flags from `#,` comments, such as `fuzzy`.
    pub flags: Vec<String>,
}

impl CatalogEntry {
    /// A singular entry.
    pub fn singular(id: impl Into<String>, translation: impl Into<String>) -> Self {
        CatalogEntry {
            id: id.into(),
            translations: vec![translation.into()],
            ..CatalogEntry::default()
        }
    }

    /// A plural entry with translations in form index order.
    pub fn plural(
        id: impl Into<String>,
        plural_id: impl Into<String>,
        translations: Vec<String>,
    ) -> Self {
        CatalogEntry {
            id: id.into(),
            plural_id: Some(plural_id.into()),
            translations,
            ..CatalogEntry::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.references.push(reference.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.add_flag(flag);
        self
    }

    /// Add a flag unless it is already present.
    pub fn add_flag(&mut self, flag: impl Into<String>) {
        let flag = flag.into();
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    pub fn key(&self) -> CompositeKey {
        CompositeKey::new(self.id.clone(), self.context.clone())
    }

    pub fn is_plural(&self) -> bool {
        self.plural_id.is_some()
    }

    pub fn is_fuzzy(&self) -> bool {
        self.flags.iter().any(|flag| flag == "fuzzy")
    }

    /// The translation for form `index`, or the empty string.
    pub fn translation(&self, index: usize) -> &str {
        self.translations.get(index).map_or("", String::as_str)
    }

    /// Enforce the slot invariants for a language with `rule`.
    ///
    /// Singular entries keep exactly one translation, plural entries at
    /// most `rule.form_count()`. With `ignore_plurals` every entry
    /// becomes singular.
    pub fn fit_plural_rule(&mut self, rule: &PluralRule, ignore_plurals: bool) {
        if ignore_plurals {
            self.plural_id = None;
        }
        let limit = if self.is_plural() {
            rule.form_count()
        } else {
            1
        };
        if self.translations.len() > limit {
            if self.is_plural() {
                log::warn!(
                    "Dropping {} extra plural forms of {}",
                    self.translations.len() - limit,
                    self.key()
                );
            }
            self.translations.truncate(limit);
        }
        if self.translations.is_empty() {
            self.translations.push(String::new());
        }
    }
}

/// Returned when an entry with the same composite key already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey(pub CompositeKey);

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate entry {}", self.0)
    }
}

impl std::error::Error for DuplicateKey {}

/// Entries by composite key, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: IndexMap<CompositeKey, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Fails if its composite key is taken.
    pub fn insert(&mut self, entry: CatalogEntry) -> Result<(), DuplicateKey> {
        let key = entry.key();
        if self.entries.contains_key(&key) {
            return Err(DuplicateKey(key));
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn get(&self, id: &str, context: &str) -> Option<&CatalogEntry> {
        self.entries.get(&CompositeKey::new(id, context))
    }

    pub fn get_mut(&mut self, id: &str, context: &str) -> Option<&mut CatalogEntry> {
        self.entries.get_mut(&CompositeKey::new(id, context))
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut CatalogEntry> {
        self.entries.values_mut()
    }

    pub fn into_entries(self) -> impl Iterator<Item = CatalogEntry> {
        self.entries.into_values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply [`CatalogEntry::fit_plural_rule`] to every entry.
    pub fn fit_plural_rule(&mut self, rule: &PluralRule, ignore_plurals: bool) {
        for entry in self.entries_mut() {
            entry.fit_plural_rule(rule, ignore_plurals);
        }
    }
}

/// Collects entries in order.
///
/// Unlike [`Catalog::insert`], a taken composite key is not an error
/// here: the first entry with a key wins and later ones are dropped.
/// Use `insert` where duplicates must be reported.
impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for entry in iter {
            if let Err(duplicate) = catalog.insert(entry) {
                log::debug!("Dropping {duplicate}");
            }
        }
        catalog
    }
}

/// Which side of the conversion holds reference keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    /// Gettext source: the reference key is the first `#:` reference.
    Po,
    /// i18next source: the reference key is the entry id, the key path.
    Json,
}

impl ReferenceSource {
    fn reference_key<'a>(&self, entry: &'a CatalogEntry) -> Option<&'a str> {
        match self {
            ReferenceSource::Po => entry.references.first().map(String::as_str),
            ReferenceSource::Json => Some(&entry.id),
        }
    }
}

/// Result of [`resolve_references`].
#[derive(Debug, Default)]
pub struct Resolved {
    pub catalog: Catalog,
    pub missing: Vec<MissingBaseEntry>,
}

/// Replace keys with references looked up in a base catalog.
///
/// With a gettext source, the first `#:` reference of each entry
/// becomes the i18next key; the base catalog (also gettext) must
/// contain an entry with the same reference, and supplies the plural
/// id.
///
/// With an i18next source, each key is looked up in the base catalog
/// (also i18next). The base translation becomes the `msgid`, the second
/// base plural form (if any) the `msgid_plural`, and the key is kept as
/// the reference.
///
/// Entries without a base counterpart are dropped and reported. When
/// two keys resolve to the same `(msgid, msgctxt)`, the references of
/// the later one are merged into the first.
pub fn resolve_references(catalog: Catalog, base: &Catalog, source: ReferenceSource) -> Resolved {
    let mut base_index = HashMap::new();
    for entry in base.entries() {
        if let Some(reference) = source.reference_key(entry) {
            base_index
                .entry((reference, entry.context.as_str()))
                .or_insert(entry);
        }
    }

    let mut resolved = Resolved::default();
    for entry in catalog.into_entries() {
        let Some(reference) = source.reference_key(&entry).map(str::to_string) else {
            log::warn!("{} has no reference to use as key", entry.key());
            resolved.missing.push(MissingBaseEntry {
                key: entry.id.clone(),
            });
            continue;
        };
        let Some(base_entry) = base_index.get(&(reference.as_str(), entry.context.as_str())) else {
            log::warn!("No base entry for reference {reference:?}");
            resolved.missing.push(MissingBaseEntry { key: reference });
            continue;
        };

        let new_entry = match source {
            ReferenceSource::Po => {
                let plural_id = match &entry.plural_id {
                    Some(own) => Some(base_entry.plural_id.clone().unwrap_or_else(|| own.clone())),
                    None => None,
                };
                CatalogEntry {
                    id: reference,
                    plural_id,
                    ..entry
                }
            }
            ReferenceSource::Json => {
                let display = base_entry.translation(0).to_string();
                let plural_id = entry.plural_id.as_ref().map(|_| {
                    match base_entry.translations.get(1) {
                        Some(plural) if !plural.is_empty() => plural.clone(),
                        _ => display.clone(),
                    }
                });
                let mut references = vec![reference];
                references.extend(entry.references);
                CatalogEntry {
                    id: display,
                    plural_id,
                    references,
                    ..entry
                }
            }
        };

        if let Some(existing) = resolved.catalog.get_mut(&new_entry.id, &new_entry.context) {
            log::warn!(
                "{} resolves to the same message as an earlier key, merging references",
                new_entry.key()
            );
            existing.references.extend(new_entry.references);
            continue;
        }
        // The key is free, checked above.
        let _ = resolved.catalog.insert(new_entry);
    }
    resolved
}
