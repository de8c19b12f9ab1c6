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

//! Per-entry transform hooks run between parsing and serializing.

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{BoxError, ConvertError, Result};

/// What to do with one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    Keep,
    Replace(CatalogEntry),
    Remove,
}

/// A hook called once per entry, in catalog order.
///
/// Any `FnMut(&CatalogEntry) -> Result<FilterAction, BoxError>` is a
/// filter:
///
/// ```
/// use i18next_conv::catalog::{Catalog, CatalogEntry};
/// use i18next_conv::error::BoxError;
/// use i18next_conv::filter::{apply_filter, FilterAction};
///
/// let catalog = [
///     CatalogEntry::singular("keep", "yes"),
///     CatalogEntry::singular("drop", "no"),
/// ]
/// .into_iter()
/// .collect::<Catalog>();
/// let mut filter = |entry: &CatalogEntry| -> Result<FilterAction, BoxError> {
///     Ok(if entry.id == "drop" {
///         FilterAction::Remove
///     } else {
///         FilterAction::Keep
///     })
/// };
/// let catalog = apply_filter(catalog, &mut filter).unwrap();
/// assert_eq!(catalog.len(), 1);
/// ```
pub trait EntryFilter {
    fn filter(&mut self, entry: &CatalogEntry) -> std::result::Result<FilterAction, BoxError>;
}

impl<F> EntryFilter for F
where
    F: FnMut(&CatalogEntry) -> std::result::Result<FilterAction, BoxError>,
{
    fn filter(&mut self, entry: &CatalogEntry) -> std::result::Result<FilterAction, BoxError> {
        self(entry)
    }
}

/// Run `filter` over every entry and collect the survivors.
///
/// A replacement may change the composite key, but not to one already
/// taken by another surviving entry.
pub fn apply_filter<F>(catalog: Catalog, filter: &mut F) -> Result<Catalog>
where
    F: EntryFilter + ?Sized,
{
    let mut filtered = Catalog::new();
    let mut removed = 0;
    for entry in catalog.into_entries() {
        let key = entry.key();
        let action = filter.filter(&entry).map_err(|source| ConvertError::Filter {
            key: key.to_string(),
            source,
        })?;
        let entry = match action {
            FilterAction::Keep => entry,
            FilterAction::Replace(replacement) => replacement,
            FilterAction::Remove => {
                removed += 1;
                continue;
            }
        };
        filtered
            .insert(entry)
            .map_err(|duplicate| ConvertError::Filter {
                key: key.to_string(),
                source: Box::new(duplicate),
            })?;
    }
    log::debug!("Filter removed {removed} entries");
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        [
            CatalogEntry::singular("a", "A"),
            CatalogEntry::singular("b", "B"),
            CatalogEntry::singular("c", "C"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_replace_and_remove() {
        let mut calls = Vec::new();
        let mut filter = |entry: &CatalogEntry| -> std::result::Result<FilterAction, BoxError> {
            calls.push(entry.id.clone());
            Ok(match entry.id.as_str() {
                "a" => FilterAction::Replace(CatalogEntry::singular("a", "AAA")),
                "b" => FilterAction::Remove,
                _ => FilterAction::Keep,
            })
        };
        let filtered = apply_filter(catalog(), &mut filter).unwrap();
        assert_eq!(
            filtered.entries().cloned().collect::<Vec<_>>(),
            vec![
                CatalogEntry::singular("a", "AAA"),
                CatalogEntry::singular("c", "C"),
            ]
        );
        assert_eq!(calls, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_error_aborts() {
        let mut filter = |entry: &CatalogEntry| -> std::result::Result<FilterAction, BoxError> {
            if entry.id == "b" {
                Err("rejected".into())
            } else {
                Ok(FilterAction::Keep)
            }
        };
        let err = apply_filter(catalog(), &mut filter).unwrap_err();
        assert!(matches!(err, ConvertError::Filter { ref key, .. } if key == "\"b\""));
        assert_eq!(err.to_string(), "Filter failed on \"b\": rejected");
    }

    #[test]
    fn test_colliding_replacement() {
        let mut filter = |entry: &CatalogEntry| -> std::result::Result<FilterAction, BoxError> {
            Ok(match entry.id.as_str() {
                "c" => FilterAction::Replace(CatalogEntry::singular("a", "again")),
                _ => FilterAction::Keep,
            })
        };
        let err = apply_filter(catalog(), &mut filter).unwrap_err();
        assert!(matches!(err, ConvertError::Filter { .. }));
    }
}
