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

use super::*;

/// A [`StateStore`] kept entirely in memory. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    current: Option<String>,
    history: Vec<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> MemoryStore {
        Default::default()
    }

    /// Creates a store with no current value and the given history lines.
    pub fn with_history<I, T>(lines: I) -> MemoryStore
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        MemoryStore {
            current: None,
            history: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// All history lines, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl StateStore for MemoryStore {
    fn read_current(&self) -> Option<String> {
        self.current.clone()
    }

    fn read_last_history_entry(&self) -> Option<String> {
        self.history
            .iter()
            .rev()
            .find(|line| !line.trim().is_empty())
            .cloned()
    }

    fn write_current_and_append_history(&mut self, value: &str) -> Result<(), StoreError> {
        self.current = Some(value.to_string());
        self.history
            .push(format_history_line(SystemTime::now(), value));
        Ok(())
    }
}
