// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use revisit_core::Fallible;
use revisit_core::fail;
use serde::Deserialize;

use crate::cmd::stats::StatsFormat;

/// The config file looked up in the working directory when `--config` is not
/// given. It is optional.
pub const DEFAULT_CONFIG_FILE: &str = "revisit.toml";

pub const DEFAULT_DATABASE: &str = "revisit.db";

/// Environment variable overriding the database path.
pub const DATABASE_ENV: &str = "REVISIT_DB";

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the SQLite review log.
    pub database: Option<PathBuf>,
    /// Default output format of `revisit stats`.
    pub stats_format: Option<StatsFormat>,
}

impl Config {
    pub fn parse(source: &str) -> Fallible<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load the config file. An explicitly given file must exist; the default
    /// one may be absent.
    pub fn load(path: Option<&Path>) -> Fallible<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return fail(format!("config file does not exist: {}", path.display()));
                }
                log::debug!("Loading config from {}", path.display());
                Self::parse(&read_to_string(path)?)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    log::debug!("Loading config from {}", path.display());
                    Self::parse(&read_to_string(path)?)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Resolve the database path: command-line flag, then environment, then
    /// config file, then the default.
    pub fn database_path(&self, flag: Option<PathBuf>, env: Option<String>) -> PathBuf {
        flag.or_else(|| env.filter(|s| !s.is_empty()).map(PathBuf::from))
            .or_else(|| self.database.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }
}
