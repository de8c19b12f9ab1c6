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

//! Gettext PO and POT files.

pub mod escape;
pub mod header;
mod parser;
mod writer;

use polib::metadata::CatalogMetadata;

use crate::catalog::Catalog;
use crate::plurals::PluralRule;

pub use parser::parse;
pub use writer::{write, WriteOptions};

/// A parsed PO file.
pub struct PoDocument {
    /// Header metadata, empty if the file has no header entry.
    pub metadata: CatalogMetadata,
    /// The `Plural-Forms` header, if present.
    pub plural_rule: Option<PluralRule>,
    /// All entries except the header.
    pub catalog: Catalog,
}
