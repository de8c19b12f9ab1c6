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

//! Convert translation catalogs between gettext and i18next.
//!
//! A run parses a source catalog (PO/POT or i18next JSON) into a
//! [`catalog::Catalog`], optionally passes every entry through a
//! [`filter::EntryFilter`], resolves reference keys against a base
//! catalog, and serializes the result in the other format. PO, POT and
//! MO files can be written; PO and JSON files can be read.
//!
//! ```
//! use i18next_conv::convert::Converter;
//! use i18next_conv::options::{ConvertOptions, Format, Formats};
//!
//! let formats = Formats { source: Format::Po, target: Format::Json };
//! let converted = Converter::new(ConvertOptions::default())
//!     .convert_str(
//!         "de",
//!         formats,
//!         "msgctxt \"formal\"\nmsgid \"item\"\nmsgstr \"Item\"\n",
//!         None,
//!     )
//!     .unwrap();
//! assert_eq!(
//!     String::from_utf8(converted.output).unwrap(),
//!     "{\n    \"item_formal\": \"Item\"\n}\n"
//! );
//! ```

pub mod catalog;
pub mod convert;
pub mod error;
pub mod filter;
pub mod json;
pub mod mo;
pub mod options;
pub mod plurals;
pub mod po;

pub use catalog::{Catalog, CatalogEntry, CompositeKey};
pub use convert::{process, Converter, Report, Stage};
pub use error::{ConvertError, MissingBaseEntry, Result};
pub use options::{ConvertOptions, Format};
