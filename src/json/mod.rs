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

//! i18next JSON resources.
//!
//! Keys nest on the key separator: the entry `nav##home` is written as
//! `{"nav": {"home": "..."}}`. A context is appended to the last
//! segment with the context separator. Plural entries become an object
//! with one key per form, spelled with [`suffix::PluralSuffixes`].

pub mod suffix;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::{Catalog, CatalogEntry, CompositeKey};
use crate::error::{ConvertError, Result};
use crate::plurals::PluralRule;
use suffix::{PluralSuffixStyle, PluralSuffixes};

/// Settings shared by [`parse`] and [`write`].
#[derive(Debug, Clone)]
pub struct JsonOptions {
    pub key_separator: String,
    pub ctx_separator: String,
    pub ignore_plurals: bool,
    pub suffix_style: PluralSuffixStyle,
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions {
            key_separator: String::from("##"),
            ctx_separator: String::from("_"),
            ignore_plurals: false,
            suffix_style: PluralSuffixStyle::default(),
        }
    }
}

impl JsonOptions {
    fn segments<'a>(&self, id: &'a str) -> Vec<&'a str> {
        if self.key_separator.is_empty() {
            vec![id]
        } else {
            id.split(self.key_separator.as_str()).collect()
        }
    }
}

/// Best effort line of the first occurrence of `"key"` in `text`.
fn line_of(text: &str, key: &str) -> usize {
    let needle = serde_json::to_string(key).unwrap_or_default();
    text.find(&needle)
        .map_or(1, |offset| text[..offset].matches('\n').count() + 1)
}

struct Parser<'a> {
    text: &'a str,
    options: &'a JsonOptions,
    suffixes: PluralSuffixes,
    catalog: Catalog,
}

impl Parser<'_> {
    /// Form index of every key if `object` is the plural leaf of
    /// `segment`.
    fn plural_forms(&self, segment: &str, object: &Map<String, Value>) -> Option<Vec<String>> {
        if self.suffixes.len() < 2 || object.is_empty() {
            return None;
        }
        let mut forms = vec![String::new(); self.suffixes.len()];
        let mut has_plural = false;
        for (key, value) in object {
            let index = self.suffixes.index_of(key.strip_prefix(segment)?)?;
            forms[index] = scalar(value)?;
            has_plural |= index > 0;
        }
        has_plural.then_some(forms)
    }

    fn add(&mut self, path: &[String], translations: Vec<String>, plural: bool) -> Result<()> {
        let Some((last, parents)) = path.split_last() else {
            return Ok(());
        };
        let key = CompositeKey::split(last, &self.options.ctx_separator);
        let mut id = parents.join(&self.options.key_separator);
        if !parents.is_empty() {
            id.push_str(&self.options.key_separator);
        }
        id.push_str(&key.id);

        let mut entry = CatalogEntry {
            plural_id: plural.then(|| id.clone()),
            id,
            context: key.context,
            translations,
            ..CatalogEntry::default()
        };
        if self.options.ignore_plurals {
            entry.plural_id = None;
            entry.translations.truncate(1);
        }
        self.catalog
            .insert(entry)
            .map_err(|err| ConvertError::parse(line_of(self.text, last), err.to_string()))
    }

    fn walk(&mut self, object: &Map<String, Value>, path: &mut Vec<String>) -> Result<()> {
        for (key, value) in object {
            path.push(key.clone());
            match value {
                Value::Object(child) => match self.plural_forms(key, child) {
                    Some(forms) => self.add(path, forms, true)?,
                    None => self.walk(child, path)?,
                },
                Value::Null | Value::Array(_) => {
                    return Err(ConvertError::parse(
                        line_of(self.text, key),
                        format!(
                            "unsupported value at {:?}",
                            path.join(&self.options.key_separator)
                        ),
                    ));
                }
                scalar_value => {
                    let translation = scalar(scalar_value).unwrap_or_default();
                    self.add(path, vec![translation], false)?;
                }
            }
            path.pop();
        }
        Ok(())
    }
}

/// Strings, numbers and booleans as translation text.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Parse an i18next JSON resource.
///
/// An object is read as a plural leaf when all of its keys are the
/// parent key plus a plural suffix of `rule` and at least one of them
/// names a form other than the first. Its plural id equals its id.
pub fn parse(text: &str, rule: &PluralRule, options: &JsonOptions) -> Result<Catalog> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let root: Value = serde_json::from_str(text)
        .map_err(|err| ConvertError::parse(err.line(), err.to_string()))?;
    let Value::Object(root) = root else {
        return Err(ConvertError::parse(1, "expected a JSON object"));
    };

    let mut parser = Parser {
        text,
        options,
        suffixes: PluralSuffixes::new(options.suffix_style, rule),
        catalog: Catalog::new(),
    };
    parser.walk(&root, &mut Vec::new())?;
    log::debug!("Parsed {} JSON entries", parser.catalog.len());
    Ok(parser.catalog)
}

enum Node {
    Branch(IndexMap<String, Node>),
    Leaf(Value),
}

impl Node {
    fn into_value(self) -> Value {
        match self {
            Node::Leaf(value) => value,
            Node::Branch(children) => Value::Object(
                children
                    .into_iter()
                    .map(|(key, child)| (key, child.into_value()))
                    .collect(),
            ),
        }
    }
}

fn leaf(
    entry: &CatalogEntry,
    segment: &str,
    suffixes: &PluralSuffixes,
    options: &JsonOptions,
) -> Value {
    if !entry.is_plural() || options.ignore_plurals || suffixes.len() < 2 {
        return Value::String(entry.translation(0).to_string());
    }
    let forms = (0..suffixes.len())
        .filter_map(|index| {
            let suffix = suffixes.suffix(index)?;
            Some((
                format!("{segment}{suffix}"),
                Value::String(entry.translation(index).to_string()),
            ))
        })
        .collect();
    Value::Object(forms)
}

fn insert(
    root: &mut IndexMap<String, Node>,
    entry: &CatalogEntry,
    options: &JsonOptions,
    suffixes: &PluralSuffixes,
) -> Result<()> {
    let segments = options.segments(&entry.id);
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };
    let last = CompositeKey::new(*last, entry.context.as_str()).join(&options.ctx_separator);
    let conflict = || ConvertError::StructuralConflict {
        key: entry.key().join(&options.ctx_separator),
    };

    let mut branch = root;
    for parent in parents {
        let node = branch
            .entry(parent.to_string())
            .or_insert_with(|| Node::Branch(IndexMap::new()));
        branch = match node {
            Node::Branch(children) => children,
            Node::Leaf(_) => return Err(conflict()),
        };
    }
    if branch.contains_key(&last) {
        return Err(conflict());
    }
    let value = leaf(entry, &last, suffixes, options);
    branch.insert(last, Node::Leaf(value));
    Ok(())
}

/// Serialize a catalog to i18next JSON, indented by four spaces.
///
/// Fails with [`ConvertError::StructuralConflict`] when one key is
/// used both as a value and as a parent of other keys, or when two
/// entries spell the same key.
pub fn write(catalog: &Catalog, rule: &PluralRule, options: &JsonOptions) -> Result<String> {
    let suffixes = PluralSuffixes::new(options.suffix_style, rule);
    let mut root = IndexMap::new();
    for entry in catalog.entries() {
        insert(&mut root, entry, options, &suffixes)?;
    }

    let value = Node::Branch(root).into_value();
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
