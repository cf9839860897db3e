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
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A [`StateStore`] backed by two plain-text files.
///
/// * The *current* file holds the latest value followed by a newline. It is replaced
///   atomically by writing `<path>.tmp` and renaming it over the old file.
/// * The *history* file is appended with one `"<timestamp> payload=<value>"` line per write.
///
/// Missing parent directories are created on the first write. Both files stay readable
/// with ordinary text tools.
#[derive(Debug, Clone)]
pub struct FileStore {
    current_path: PathBuf,
    history_path: PathBuf,
}

impl FileStore {
    /// Creates a store using the given current-value and history files.
    /// Neither file needs to exist yet.
    pub fn new(current_path: impl Into<PathBuf>, history_path: impl Into<PathBuf>) -> FileStore {
        FileStore {
            current_path: current_path.into(),
            history_path: history_path.into(),
        }
    }

    /// Path of the current-value file.
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Path of the history file.
    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    fn write_current(&self, value: &str) -> Result<(), StoreError> {
        ensure_parent(&self.current_path)?;

        let tmp_path = tmp_path_for(&self.current_path);
        write_synced(&tmp_path, value).map_err(write_failure(&tmp_path))?;
        fs::rename(&tmp_path, &self.current_path).map_err(write_failure(&self.current_path))
    }

    fn append_history(&self, line: &str) -> Result<(), StoreError> {
        ensure_parent(&self.history_path)?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_path)
            .and_then(|mut file| writeln!(file, "{}", line))
            .map_err(write_failure(&self.history_path))
    }
}

impl StateStore for FileStore {
    fn read_current(&self) -> Option<String> {
        read_last_line(&self.current_path)
    }

    fn read_last_history_entry(&self) -> Option<String> {
        read_last_line(&self.history_path)
    }

    fn write_current_and_append_history(&mut self, value: &str) -> Result<(), StoreError> {
        self.write_current(value)?;
        self.append_history(&format_history_line(SystemTime::now(), value))
    }
}

fn write_failure(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::WriteFailure {
        path: path.to_path_buf(),
        source,
    }
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(write_failure(parent))
        }
        _ => Ok(()),
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn write_synced(path: &Path, value: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{}", value)?;
    file.sync_all()
}

fn read_last_line(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => last_non_empty_line(&String::from_utf8_lossy(&bytes)).map(str::to_string),
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!("Unable to read {:?}: {}", path, e);
            None
        }
    }
}
