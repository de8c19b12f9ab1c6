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

use std::path::PathBuf;

use thiserror::Error;

/// Error type accepted from filter hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Unknown language {0:?}: no plural rule available")]
    UnknownLanguage(String),
    #[error("Invalid plural rule: {0}")]
    PluralRule(String),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Conflicting key structure at {key:?}")]
    StructuralConflict { key: String },
    #[error("Could not encode JSON: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Filter failed on {key}: {source}")]
    Filter {
        key: String,
        #[source]
        source: BoxError,
    },
    #[error("Could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        ConvertError::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        ConvertError::Configuration(message.into())
    }
}

/// A key-as-reference lookup which found nothing in the base catalog.
///
/// These are collected per run instead of aborting it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No base entry for reference {key:?}")]
pub struct MissingBaseEntry {
    pub key: String,
}

pub type Result<T> = std::result::Result<T, ConvertError>;
