// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use sensor_coap::{FileStore, MemoryStore, StateStore, DEFAULT_PORT_COAP_UDP};
use std::path::PathBuf;

/// Default location of the current-value file.
pub const DEFAULT_CURRENT_FILE: &str = "/opt/coap/current.txt";

/// Default location of the history file.
pub const DEFAULT_HISTORY_FILE: &str = "/opt/coap/data.txt";

/// Where the server keeps the sensor state.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StoreConfig {
    /// In memory only. State is lost on exit.
    Memory,

    /// In a current-value file and a history file. See [`FileStore`].
    Files {
        /// Current-value file.
        current: PathBuf,

        /// History file.
        history: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Files {
            current: PathBuf::from(DEFAULT_CURRENT_FILE),
            history: PathBuf::from(DEFAULT_HISTORY_FILE),
        }
    }
}

impl StoreConfig {
    /// Creates the configured store. Files are not touched until the first access.
    pub fn open(&self) -> Box<dyn StateStore + Send> {
        match self {
            StoreConfig::Memory => Box::new(MemoryStore::new()),
            StoreConfig::Files { current, history } => {
                Box::new(FileStore::new(current.clone(), history.clone()))
            }
        }
    }
}

impl std::fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Memory => f.write_str("memory"),
            StoreConfig::Files { current, history } => {
                write!(f, "current={:?} history={:?}", current, history)
            }
        }
    }
}

/// Settings for `sensor-coap-server`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ServerConfig {
    /// Socket address to bind, such as `0.0.0.0:5683`.
    pub bind: String,

    /// State store selection.
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: format!("0.0.0.0:{}", DEFAULT_PORT_COAP_UDP),
            store: Default::default(),
        }
    }
}
