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

//! Line-based PO/POT parser.

use std::collections::BTreeMap;

use polib::metadata::CatalogMetadata;

use super::escape::{find_closing_quote, unescape};
use super::{header, PoDocument};
use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{ConvertError, Result};
use crate::plurals::MAX_PLURAL_FORMS;

/// The field a continuation line appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr(usize),
}

#[derive(Debug, Default)]
struct PendingEntry {
    start_line: usize,
    comments: Vec<String>,
    references: Vec<String>,
    flags: Vec<String>,
    msgctxt: Option<String>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    msgstr: BTreeMap<usize, String>,
    last: Option<Field>,
    obsolete: bool,
}

impl PendingEntry {
    fn is_empty(&self) -> bool {
        self.start_line == 0
    }

    fn has_keyword(&self) -> bool {
        self.msgctxt.is_some() || self.msgid.is_some()
    }

    fn touch(&mut self, lineno: usize) {
        if self.start_line == 0 {
            self.start_line = lineno;
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Msgctxt => self.msgctxt.get_or_insert_with(String::new),
            Field::Msgid => self.msgid.get_or_insert_with(String::new),
            Field::MsgidPlural => self.msgid_plural.get_or_insert_with(String::new),
            Field::Msgstr(index) => self.msgstr.entry(index).or_default(),
        }
    }
}

/// Parse the contents of a string literal line, such as `"foo" "bar"`.
///
/// Adjacent literals are concatenated.
fn parse_string(mut rest: &str, lineno: usize) -> Result<String> {
    let mut value = String::new();
    rest = rest.trim();
    if rest.is_empty() {
        return Err(ConvertError::parse(lineno, "expected a quoted string"));
    }
    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix('"') else {
            return Err(ConvertError::parse(
                lineno,
                format!("expected a quoted string, found {rest:?}"),
            ));
        };
        let end = find_closing_quote(body)
            .ok_or_else(|| ConvertError::parse(lineno, "unterminated string"))?;
        value.push_str(&unescape(&body[..end]));
        rest = body[end + 1..].trim_start();
    }
    Ok(value)
}

/// Parse a keyword such as `msgstr[2]`.
fn parse_keyword(keyword: &str, lineno: usize) -> Result<Field> {
    match keyword {
        "msgctxt" => Ok(Field::Msgctxt),
        "msgid" => Ok(Field::Msgid),
        "msgid_plural" => Ok(Field::MsgidPlural),
        "msgstr" => Ok(Field::Msgstr(0)),
        _ => keyword
            .strip_prefix("msgstr[")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|index| index.trim().parse().ok())
            .map(Field::Msgstr)
            .ok_or_else(|| ConvertError::parse(lineno, format!("unknown keyword {keyword:?}"))),
    }
}

struct Parser {
    pending: PendingEntry,
    catalog: Catalog,
    metadata: Option<CatalogMetadata>,
    plural_rule: Option<crate::plurals::PluralRule>,
}

impl Parser {
    fn new() -> Self {
        Parser {
            pending: PendingEntry::default(),
            catalog: Catalog::new(),
            metadata: None,
            plural_rule: None,
        }
    }

    fn line(&mut self, lineno: usize, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return self.finish_entry();
        }

        if let Some(obsolete) = line.strip_prefix("#~") {
            if self.pending.has_keyword() && !self.pending.obsolete {
                self.finish_entry()?;
            }
            self.pending.touch(lineno);
            self.pending.obsolete = true;
            log::trace!("Skipping obsolete line {lineno}: {obsolete}");
            return Ok(());
        }

        if let Some(comment) = line.strip_prefix('#') {
            // Comments always precede the keywords of their entry.
            if self.pending.has_keyword() || self.pending.obsolete {
                self.finish_entry()?;
            }
            self.pending.touch(lineno);
            if let Some(reference) = comment.strip_prefix(':') {
                let reference = reference.trim();
                if !reference.is_empty() {
                    self.pending.references.push(reference.to_string());
                }
            } else if let Some(flags) = comment.strip_prefix(',') {
                for flag in flags.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                    if !self.pending.flags.iter().any(|existing| existing == flag) {
                        self.pending.flags.push(flag.to_string());
                    }
                }
            } else {
                self.pending.comments.push(line.to_string());
            }
            return Ok(());
        }

        if line.starts_with('"') {
            if self.pending.obsolete {
                return Ok(());
            }
            let field = self.pending.last.ok_or_else(|| {
                ConvertError::parse(lineno, "string continuation without a keyword")
            })?;
            let value = parse_string(line, lineno)?;
            self.pending.field_mut(field).push_str(&value);
            return Ok(());
        }

        let (keyword, rest) = line
            .split_once(|c: char| c.is_whitespace())
            .unwrap_or((line, ""));
        let field = parse_keyword(keyword, lineno)?;
        let value = parse_string(rest, lineno)?;
        self.keyword(lineno, field, value)
    }

    fn keyword(&mut self, lineno: usize, field: Field, value: String) -> Result<()> {
        if self.pending.obsolete {
            self.finish_entry()?;
        }
        let has_msgstr = !self.pending.msgstr.is_empty();
        match field {
            Field::Msgctxt | Field::Msgid if has_msgstr => {
                // A new entry without a separating blank line.
                self.finish_entry()?;
            }
            Field::Msgctxt if self.pending.msgid.is_some() => {
                return Err(ConvertError::parse(lineno, "msgctxt after msgid"));
            }
            Field::Msgctxt if self.pending.msgctxt.is_some() => {
                return Err(ConvertError::parse(lineno, "duplicate msgctxt"));
            }
            Field::Msgid if self.pending.msgid.is_some() => {
                return Err(ConvertError::parse(lineno, "msgid without msgstr"));
            }
            Field::MsgidPlural if self.pending.msgid.is_none() || has_msgstr => {
                return Err(ConvertError::parse(
                    lineno,
                    "msgid_plural must follow msgid",
                ));
            }
            Field::MsgidPlural if self.pending.msgid_plural.is_some() => {
                return Err(ConvertError::parse(lineno, "duplicate msgid_plural"));
            }
            Field::Msgstr(_) if self.pending.msgid.is_none() => {
                return Err(ConvertError::parse(lineno, "msgstr without msgid"));
            }
            Field::Msgstr(index) if index >= MAX_PLURAL_FORMS => {
                return Err(ConvertError::parse(
                    lineno,
                    format!("msgstr[{index}] exceeds {MAX_PLURAL_FORMS} plural forms"),
                ));
            }
            Field::Msgstr(index) if index > 0 && self.pending.msgid_plural.is_none() => {
                return Err(ConvertError::parse(
                    lineno,
                    format!("msgstr[{index}] without msgid_plural"),
                ));
            }
            Field::Msgstr(index) if self.pending.msgstr.contains_key(&index) => {
                return Err(ConvertError::parse(
                    lineno,
                    format!("duplicate msgstr[{index}]"),
                ));
            }
            _ => {}
        }
        self.pending.touch(lineno);
        self.pending.field_mut(field).push_str(&value);
        self.pending.last = Some(field);
        Ok(())
    }

    fn finish_entry(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(());
        }
        if pending.obsolete {
            log::warn!("Skipping obsolete entry on line {}", pending.start_line);
            return Ok(());
        }
        let Some(msgid) = pending.msgid else {
            if pending.msgctxt.is_some() {
                return Err(ConvertError::parse(
                    pending.start_line,
                    "msgctxt without msgid",
                ));
            }
            log::debug!("Dropping comments without entry on line {}", pending.start_line);
            return Ok(());
        };
        if pending.msgstr.is_empty() {
            return Err(ConvertError::parse(
                pending.start_line,
                format!("missing msgstr for msgid {msgid:?}"),
            ));
        }

        if msgid.is_empty() && pending.msgctxt.is_none() && self.metadata.is_none() {
            let text = pending.msgstr.get(&0).map_or("", String::as_str);
            let (metadata, plural_rule) = header::parse(text, pending.start_line)?;
            self.metadata = Some(metadata);
            self.plural_rule = plural_rule;
            return Ok(());
        }

        let slots = pending
            .msgstr
            .keys()
            .next_back()
            .and_then(|max| max.checked_add(1))
            .unwrap_or(0);
        let mut translations = vec![String::new(); slots];
        for (index, msgstr) in pending.msgstr {
            translations[index] = msgstr;
        }
        let entry = CatalogEntry {
            id: msgid,
            context: pending.msgctxt.unwrap_or_default(),
            plural_id: pending.msgid_plural,
            translations,
            references: pending.references,
            comments: pending.comments,
            flags: pending.flags,
        };
        self.catalog
            .insert(entry)
            .map_err(|err| ConvertError::parse(pending.start_line, err.to_string()))
    }
}

/// Parse a PO or POT file.
///
/// The whole parse fails on the first malformed entry; the error names
/// the offending line.
pub fn parse(text: &str) -> Result<PoDocument> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut parser = Parser::new();
    for (idx, line) in text.lines().enumerate() {
        parser.line(idx + 1, line)?;
    }
    parser.finish_entry()?;
    log::debug!("Parsed {} PO entries", parser.catalog.len());
    Ok(PoDocument {
        metadata: parser.metadata.unwrap_or_else(CatalogMetadata::new),
        plural_rule: parser.plural_rule,
        catalog: parser.catalog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[track_caller]
    fn assert_parse_error(text: &str, expected_line: usize) {
        match parse(text) {
            Err(ConvertError::Parse { line, .. }) => assert_eq!(line, expected_line),
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("expected a parse error"),
        }
    }

    #[test]
    fn test_parse_simple() {
        let doc = parse(
            "msgid \"Hello\"\n\
             msgstr \"Hallo\"\n",
        )
        .unwrap();
        let entries = doc.catalog.entries().collect::<Vec<_>>();
        assert_eq!(entries, vec![&CatalogEntry::singular("Hello", "Hallo")]);
        assert_eq!(doc.plural_rule, None);
    }

    #[test]
    fn test_parse_header() {
        let doc = parse(
            "msgid \"\"\n\
             msgstr \"\"\n\
             \"Language: ru\\n\"\n\
             \"Plural-Forms: nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);\\n\"\n\
             \n\
             msgid \"Hello\"\n\
             msgstr \"Привет\"\n",
        )
        .unwrap();
        assert_eq!(doc.catalog.len(), 1);
        assert_eq!(doc.plural_rule.unwrap().form_count(), 3);
    }

    #[test]
    fn test_parse_context_plural_and_comments() {
        let doc = parse(
            "# Translator note\n\
             #. Extracted note\n\
             #: src/app.js:10 src/app.js:20\n\
             #: src/other.js:3\n\
             #, fuzzy, c-format\n\
             #| msgid \"old apple\"\n\
             msgctxt \"fruit\"\n\
             msgid \"apple\"\n\
             msgid_plural \"apples\"\n\
             msgstr[0] \"Apfel\"\n\
             msgstr[1] \"Äpfel\"\n",
        )
        .unwrap();
        let entry = doc.catalog.get("apple", "fruit").unwrap();
        assert_eq!(
            *entry,
            CatalogEntry::plural("apple", "apples", vec!["Apfel".into(), "Äpfel".into()])
                .with_context("fruit")
                .with_comment("# Translator note")
                .with_comment("#. Extracted note")
                .with_comment("#| msgid \"old apple\"")
                .with_reference("src/app.js:10 src/app.js:20")
                .with_reference("src/other.js:3")
                .with_flag("fuzzy")
                .with_flag("c-format")
        );
    }

    #[test]
    fn test_parse_multiline_strings() {
        let doc = parse(
            "msgid \"\"\n\
             \"first line\\n\"\n\
             \"second line\"\n\
             msgstr \"\"\n\
             \"erste Zeile\\n\" \"zweite Zeile\"\n",
        )
        .unwrap();
        let entry = doc.catalog.entries().next().unwrap();
        assert_eq!(entry.id, "first line\nsecond line");
        assert_eq!(entry.translation(0), "erste Zeile\nzweite Zeile");
    }

    #[test]
    fn test_parse_entries_without_blank_lines() {
        let doc = parse(
            "msgid \"one\"\n\
             msgstr \"eins\"\n\
             msgid \"two\"\n\
             msgstr \"zwei\"\n\
             #: ref\n\
             msgid \"three\"\n\
             msgstr \"drei\"\n",
        )
        .unwrap();
        assert_eq!(
            doc.catalog.entries().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["one", "two", "three"]
        );
    }

    #[test]
    fn test_parse_sparse_plural_slots() {
        let doc = parse(
            "msgid \"file\"\n\
             msgid_plural \"files\"\n\
             msgstr[2] \"many\"\n\
             msgstr[0] \"one\"\n",
        )
        .unwrap();
        assert_eq!(
            doc.catalog.get("file", "").unwrap().translations,
            vec!["one", "", "many"]
        );
    }

    #[test]
    fn test_parse_skips_obsolete_entries() {
        let doc = parse(
            "msgid \"kept\"\n\
             msgstr \"behalten\"\n\
             \n\
             #~ msgid \"gone\"\n\
             #~ msgstr \"weg\"\n",
        )
        .unwrap();
        assert_eq!(doc.catalog.len(), 1);
    }

    #[test]
    fn test_parse_entry_after_obsolete_lines() {
        let doc = parse(
            "#~ msgid \"old\"\n\
             #~ msgstr \"alt\"\n\
             msgid \"new\"\n\
             msgstr \"neu\"\n\
             #~ msgid \"older\"\n\
             #~ msgstr \"älter\"\n\
             #: src/main.js:1\n\
             msgid \"next\"\n\
             msgstr \"nächste\"\n",
        )
        .unwrap();
        assert_eq!(
            doc.catalog.entries().cloned().collect::<Vec<_>>(),
            vec![
                CatalogEntry::singular("new", "neu"),
                CatalogEntry::singular("next", "nächste").with_reference("src/main.js:1"),
            ]
        );
    }

    #[test]
    fn test_parse_crlf_and_bom() {
        let doc = parse("\u{feff}msgid \"a\"\r\nmsgstr \"b\"\r\n").unwrap();
        assert_eq!(doc.catalog.get("a", "").unwrap().translation(0), "b");
    }

    #[test]
    fn test_parse_errors() {
        assert_parse_error("msgid \"unterminated\nmsgstr \"\"\n", 1);
        assert_parse_error("msgid \"a\"\nmsgstr \"b\" trailing\n", 2);
        assert_parse_error("msgid \"a\"\nmsgtxt \"b\"\n", 2);
        assert_parse_error("\"orphan\"\n", 1);
        assert_parse_error("msgstr \"b\"\n", 1);
        assert_parse_error("#: ref\nmsgid \"a\"\n\nmsgid \"b\"\nmsgstr \"\"\n", 1);
        assert_parse_error("msgid \"a\"\nmsgstr[0] \"x\"\nmsgstr[0] \"y\"\n", 3);
        assert_parse_error("msgid \"a\"\nmsgstr[x] \"x\"\n", 2);
        assert_parse_error("msgid bare\nmsgstr \"\"\n", 1);
        assert_parse_error(
            "msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[18446744073709551615] \"x\"\n",
            3,
        );
        assert_parse_error("msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[4000000000] \"x\"\n", 3);
        assert_parse_error("msgid \"a\"\nmsgstr[1] \"x\"\n", 2);
    }

    #[test]
    fn test_parse_duplicate_entries() {
        assert_parse_error(
            "msgid \"a\"\nmsgstr \"1\"\n\n\
             msgctxt \"c\"\nmsgid \"a\"\nmsgstr \"2\"\n\n\
             msgid \"a\"\nmsgstr \"3\"\n",
            8,
        );
    }
}
