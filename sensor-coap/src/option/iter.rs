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

/// A convenience iterator for parsing options from a byte buffer.
///
/// The iterator ends at the payload marker or at the end of the buffer, after which
/// [`OptionIterator::as_slice`] returns the payload. The first error ends iteration.
#[derive(Debug, Clone)]
pub struct OptionIterator<'a> {
    iter: core::slice::Iter<'a, u8>,
    last_option: OptionNumber,
    failed: bool,
}

impl<'a> Default for OptionIterator<'a> {
    fn default() -> Self {
        OptionIterator::new(&[])
    }
}

impl<'a> OptionIterator<'a> {
    /// Creates a new instance of an `OptionIterator` with the given byte slice.
    pub fn new(buffer: &'a [u8]) -> OptionIterator<'a> {
        OptionIterator {
            iter: buffer.iter(),
            last_option: Default::default(),
            failed: false,
        }
    }

    /// Returns the unread remaining bytes. Once iteration has finished
    /// this is the payload.
    pub fn as_slice(&self) -> &'a [u8] {
        self.iter.as_slice()
    }

    /// The number of the most recently decoded option.
    pub fn last_option(&self) -> OptionNumber {
        self.last_option
    }
}

impl<'a> Iterator for OptionIterator<'a> {
    type Item = Result<(OptionNumber, &'a [u8]), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let ret = decode_option(&mut self.iter, self.last_option).transpose();
        match ret {
            Some(Ok((key, _))) => self.last_option = key,
            Some(Err(_)) => self.failed = true,
            None => {}
        }
        ret
    }
}

impl AsRef<[u8]> for OptionIterator<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
