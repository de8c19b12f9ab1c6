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

//! Convert between gettext PO/POT files and i18next JSON resources.
//!
//! ```shell
//! i18next-conv -l de -s locales/de.po -t locales/de/translation.json
//! i18next-conv -l de -s locales/de/translation.json -t locales/de.po
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use clap::Parser;
use i18next_conv::json::suffix::PluralSuffixStyle;
use i18next_conv::{ConvertOptions, Converter, Format};
use log::{info, warn};
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Language code, e.g. `en` or `pt-BR`.
    #[arg(short, long)]
    language: Option<String>,
    /// File to read.
    #[arg(short, long, value_name = "PATH")]
    source: PathBuf,
    /// File to write.
    #[arg(short, long, value_name = "PATH")]
    target: PathBuf,
    /// Base language file, required by --keyasareference and --pot.
    #[arg(short, long, value_name = "PATH")]
    base: Option<PathBuf>,
    /// Use the reference comment as key.
    #[arg(short = 'K', long = "keyasareference")]
    key_as_reference: bool,
    /// Separator of nested keys [default: ##].
    #[arg(long = "keyseparator", visible_alias = "ks", value_name = "SEP")]
    key_separator: Option<String>,
    /// Plural forms definition file.
    #[arg(short = 'P', long, value_name = "PATH")]
    plurals: Option<PathBuf>,
    /// Generate a POT template.
    #[arg(short, long)]
    pot: bool,
    /// Separator between key and context [default: _].
    #[arg(long = "ctxSeparator", value_name = "SEP")]
    ctx_separator: Option<String>,
    /// Do not process plurals.
    #[arg(long = "ignorePlurals")]
    ignore_plurals: bool,
    /// Break PO strings after embedded newlines.
    #[arg(long = "splitNewLine")]
    split_new_line: bool,
    /// Only log errors.
    #[arg(long)]
    quiet: bool,
    /// Spelling of plural key suffixes.
    #[arg(long, value_enum, value_name = "STYLE")]
    plural_suffix: Option<PluralSuffixStyle>,
    /// Source format, if the extension does not tell.
    #[arg(long, value_enum)]
    source_format: Option<Format>,
    /// Target format, if the extension does not tell.
    #[arg(long, value_enum)]
    target_format: Option<Format>,
    /// JSON file with default options. Command line flags win.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Contents of a `--config` file.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    language: Option<String>,
    #[serde(flatten)]
    options: ConvertOptions,
}

fn load_config(path: &Path) -> anyhow::Result<ConfigFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Could not parse config file {}", path.display()))
}

impl Cli {
    /// The language and options, with flags overriding the config file.
    fn resolve(&self) -> anyhow::Result<(String, ConvertOptions)> {
        let ConfigFile {
            language,
            mut options,
        } = match &self.config {
            Some(path) => load_config(path)?,
            None => ConfigFile::default(),
        };

        let Some(language) = self.language.clone().or(language) else {
            bail!("A language is required, pass it with -l");
        };
        if let Some(base) = &self.base {
            options.base = Some(base.clone());
        }
        if let Some(plurals) = &self.plurals {
            options.plurals = Some(plurals.clone());
        }
        if let Some(separator) = &self.key_separator {
            options.key_separator = separator.clone();
        }
        if let Some(separator) = &self.ctx_separator {
            options.ctx_separator = separator.clone();
        }
        if let Some(style) = self.plural_suffix {
            options.plural_suffix = style;
        }
        options.source_format = self.source_format.or(options.source_format);
        options.target_format = self.target_format.or(options.target_format);
        options.key_as_reference |= self.key_as_reference;
        options.pot |= self.pot;
        options.ignore_plurals |= self.ignore_plurals;
        options.split_new_line |= self.split_new_line;
        options.quiet |= self.quiet;
        Ok((language, options))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (language, options) = cli.resolve()?;
    let default_level = if options.quiet { "error" } else { "info" };
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", default_level));

    info!("start converting");
    let report = Converter::new(options)
        .convert(&language, &cli.source, &cli.target)
        .context("failed writing file")?;
    for diagnostic in &report.diagnostics {
        warn!("{diagnostic}");
    }
    info!("file written");
    Ok(())
}
