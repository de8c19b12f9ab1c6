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

use std::fmt::Write as _;

use super::escape::escape;
use crate::catalog::{Catalog, CatalogEntry};
use crate::plurals::PluralRule;

/// Options for [`write`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WriteOptions {
    /// Write a template: every `msgstr` is left empty.
    pub pot: bool,
    /// Break strings after each embedded newline.
    pub split_new_line: bool,
}

/// Write `keyword "value"`, or a multi-line string when splitting.
fn write_string(out: &mut String, keyword: &str, value: &str, split: bool) {
    if split && value.contains('\n') {
        out.push_str(keyword);
        out.push_str(" \"\"\n");
        for line in value.split_inclusive('\n') {
            let _ = writeln!(out, "\"{}\"", escape(line));
        }
    } else {
        let _ = writeln!(out, "{keyword} \"{}\"", escape(value));
    }
}

fn write_entry(out: &mut String, entry: &CatalogEntry, rule: &PluralRule, options: WriteOptions) {
    let (previous, comments): (Vec<_>, Vec<_>) = entry
        .comments
        .iter()
        .partition(|comment| comment.starts_with("#|"));
    for comment in comments {
        let _ = writeln!(out, "{comment}");
    }
    for reference in &entry.references {
        let _ = writeln!(out, "#: {reference}");
    }
    if !entry.flags.is_empty() {
        let _ = writeln!(out, "#, {}", entry.flags.join(", "));
    }
    for comment in previous {
        let _ = writeln!(out, "{comment}");
    }

    let split = options.split_new_line;
    if !entry.context.is_empty() {
        write_string(out, "msgctxt", &entry.context, split);
    }
    write_string(out, "msgid", &entry.id, split);
    let translation = |index: usize| if options.pot { "" } else { entry.translation(index) };
    match &entry.plural_id {
        Some(plural_id) => {
            write_string(out, "msgid_plural", plural_id, split);
            for index in 0..rule.form_count() {
                write_string(out, &format!("msgstr[{index}]"), translation(index), split);
            }
        }
        None => write_string(out, "msgstr", translation(0), split),
    }
}

/// Serialize a header and catalog to PO text.
///
/// The header text is always written as a multi-line string, the way
/// gettext tools write it.
pub fn write(catalog: &Catalog, header: &str, rule: &PluralRule, options: WriteOptions) -> String {
    let mut out = String::new();
    if !header.is_empty() {
        write_string(&mut out, "msgid", "", false);
        write_string(&mut out, "msgstr", header, true);
    }
    for entry in catalog.entries() {
        if !out.is_empty() {
            out.push('\n');
        }
        write_entry(&mut out, entry, rule, options);
    }
    out
}
