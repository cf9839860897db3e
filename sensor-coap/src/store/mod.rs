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

//! Persistence of the sensor state.
//!
//! A [`StateStore`] owns two pieces of state: the *current value*, which every write
//! overwrites, and an append-only *history* of timestamped lines of the form
//!
//! ```text
//! 2024-05-01T12:00:00Z payload=<value>
//! ```
//!
//! The [`Router`](crate::Router) owns its store and is the only writer.

use super::*;
use std::time::SystemTime;

mod timestamp;
pub use timestamp::format_utc_timestamp;

mod memory;
pub use memory::MemoryStore;

mod file;
pub use file::FileStore;

/// Storage for the current sensor value and its history.
pub trait StateStore {
    /// The most recently written value, if any.
    fn read_current(&self) -> Option<String>;

    /// The last non-empty line of the history, if any.
    fn read_last_history_entry(&self) -> Option<String>;

    /// Overwrites the current value with `value` and appends it to the history.
    ///
    /// The current value is written first. An error means the caller must not report
    /// success, even if the current value was already replaced.
    fn write_current_and_append_history(&mut self, value: &str) -> Result<(), StoreError>;
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn read_current(&self) -> Option<String> {
        (**self).read_current()
    }

    fn read_last_history_entry(&self) -> Option<String> {
        (**self).read_last_history_entry()
    }

    fn write_current_and_append_history(&mut self, value: &str) -> Result<(), StoreError> {
        (**self).write_current_and_append_history(value)
    }
}

/// Formats one history line for `value` written at `time`.
pub fn format_history_line(time: SystemTime, value: &str) -> String {
    format!(
        "{} {}{}",
        format_utc_timestamp(time),
        HISTORY_VALUE_TAG,
        value
    )
}

/// Extracts the stored value from a history line: the text after `payload=` if the tag is
/// present, otherwise the whole line. Surrounding whitespace is removed.
pub fn extract_value(line: &str) -> &str {
    match line.find(HISTORY_VALUE_TAG) {
        Some(i) => line[i + HISTORY_VALUE_TAG.len()..].trim(),
        None => line.trim(),
    }
}

/// Returns the last line of `text` that is not blank, without its line terminator.
pub fn last_non_empty_line(text: &str) -> Option<&str> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .last()
}
