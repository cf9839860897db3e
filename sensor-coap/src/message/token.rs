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

use crate::consts::MAX_TOKEN_LEN;
use crate::ParseError;
use core::convert::TryFrom;
use core::ops::Deref;

/// Type for holding the value of a CoAP message token.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
pub struct MsgToken {
    len: u8,
    bytes: [u8; MAX_TOKEN_LEN],
}

impl MsgToken {
    /// Constant representing an empty token.
    pub const EMPTY: MsgToken = MsgToken {
        len: 0u8,
        bytes: [0; MAX_TOKEN_LEN],
    };

    /// Creates a new token from the given byte slice.
    ///
    /// # Panics
    ///
    /// Panics if `x` is longer than eight bytes. Use [`MsgToken::try_from`] for untrusted input.
    pub fn new(x: &[u8]) -> MsgToken {
        match MsgToken::try_from(x) {
            Ok(token) => token,
            Err(_) => panic!("Token too long: {} bytes", x.len()),
        }
    }

    /// Returns the length of this token.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns true if the length of this token is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a byte slice containing this token.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl std::fmt::Display for MsgToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.as_bytes() {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

impl Default for MsgToken {
    fn default() -> Self {
        MsgToken::EMPTY
    }
}

impl Deref for MsgToken {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl core::cmp::PartialEq<[u8]> for MsgToken {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl TryFrom<&[u8]> for MsgToken {
    type Error = ParseError;

    fn try_from(x: &[u8]) -> Result<Self, Self::Error> {
        if x.len() > MAX_TOKEN_LEN {
            return Err(ParseError::BadToken);
        }
        let mut bytes = [0u8; MAX_TOKEN_LEN];
        bytes[..x.len()].copy_from_slice(x);
        Ok(MsgToken {
            len: x.len() as u8,
            bytes,
        })
    }
}

/// A four byte token holding `x` in network byte order.
impl From<u32> for MsgToken {
    fn from(x: u32) -> Self {
        let mut bytes = [0u8; MAX_TOKEN_LEN];
        bytes[..4].copy_from_slice(&x.to_be_bytes());
        MsgToken { len: 4, bytes }
    }
}
