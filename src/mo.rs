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

//! Compiled GNU MO catalogs.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::catalog::{Catalog, CatalogEntry};
use crate::plurals::PluralRule;

const MAGIC: u32 = 0x950412de;
const HEADER_SIZE: u32 = 28;

/// Separates context and msgid in a key.
const CONTEXT_SEPARATOR: char = '\u{4}';

fn message(entry: &CatalogEntry, rule: &PluralRule) -> (String, String) {
    let mut key = String::new();
    if !entry.context.is_empty() {
        key.push_str(&entry.context);
        key.push(CONTEXT_SEPARATOR);
    }
    key.push_str(&entry.id);
    let value = match &entry.plural_id {
        Some(plural_id) => {
            key.push('\0');
            key.push_str(plural_id);
            (0..rule.form_count())
                .map(|index| entry.translation(index))
                .collect::<Vec<_>>()
                .join("\0")
        }
        None => entry.translation(0).to_string(),
    };
    (key, value)
}

/// Write `catalog` as a little-endian MO file without hash table.
///
/// The header text is stored under the empty key. Fuzzy and
/// untranslated entries are left out, like `msgfmt` does.
pub fn write<W: Write>(
    mut out: W,
    catalog: &Catalog,
    header: &str,
    rule: &PluralRule,
) -> io::Result<()> {
    let mut messages = catalog
        .entries()
        .filter(|entry| !entry.is_fuzzy())
        .filter(|entry| entry.translations.iter().any(|t| !t.is_empty()))
        .map(|entry| message(entry, rule))
        .collect::<Vec<_>>();
    if !header.is_empty() {
        messages.push((String::new(), header.to_string()));
    }
    messages.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

    let count = messages.len() as u32;
    let originals_offset = HEADER_SIZE;
    let translations_offset = originals_offset + 8 * count;
    let strings_offset = translations_offset + 8 * count;

    out.write_u32::<LittleEndian>(MAGIC)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(count)?;
    out.write_u32::<LittleEndian>(originals_offset)?;
    out.write_u32::<LittleEndian>(translations_offset)?;
    // Hash table size and offset.
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(strings_offset)?;

    let strings = messages
        .iter()
        .map(|(key, _)| key)
        .chain(messages.iter().map(|(_, value)| value))
        .collect::<Vec<_>>();
    let mut offset = strings_offset;
    for string in &strings {
        out.write_u32::<LittleEndian>(string.len() as u32)?;
        out.write_u32::<LittleEndian>(offset)?;
        offset += string.len() as u32 + 1;
    }
    for string in &strings {
        out.write_all(string.as_bytes())?;
        out.write_u8(0)?;
    }
    log::debug!("Wrote {count} MO messages");
    Ok(())
}
