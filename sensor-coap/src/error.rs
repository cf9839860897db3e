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

use std::path::PathBuf;

/// Reasons an inbound datagram could not be parsed as a CoAP message.
///
/// Every variant results in the datagram being dropped without a response.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, thiserror::Error)]
pub enum ParseError {
    /// The datagram is shorter than the fixed four-byte header.
    #[error("datagram shorter than the CoAP header")]
    TooShort,

    /// The two-bit version field is not 1.
    #[error("unsupported CoAP version")]
    UnsupportedVersion,

    /// The token length is larger than 8 or runs past the end of the datagram.
    #[error("bad token length")]
    BadToken,

    /// An option header, extension or value is truncated, reserved, or otherwise invalid.
    #[error("malformed option")]
    MalformedOption,
}

/// Type for errors encountered while parsing or encoding CoAP messages.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, thiserror::Error)]
pub enum Error {
    /// The inbound message could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// There is not enough space in the given buffer to complete the operation.
    #[error("buffer too small")]
    BufferTooSmall,

    /// One or more of the supplied arguments are not valid for the given operation.
    #[error("invalid argument")]
    InvalidArgument,
}

/// Errors reported by a [`StateStore`](crate::StateStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The current value or the history could not be written.
    #[error("failed to write {path:?}: {source}")]
    WriteFailure {
        /// File that was being written.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
