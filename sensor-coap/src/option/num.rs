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

/// Type representing a CoAP option number.
#[derive(Copy, Eq, PartialEq, Hash, Clone, Ord, PartialOrd)]
pub struct OptionNumber(pub u16);

impl OptionNumber {
    /// URI_HOST option.
    pub const URI_HOST: OptionNumber = OptionNumber(3);

    /// ETAG option.
    pub const ETAG: OptionNumber = OptionNumber(4);

    /// OBSERVE option.
    pub const OBSERVE: OptionNumber = OptionNumber(6);

    /// URI_PORT option.
    pub const URI_PORT: OptionNumber = OptionNumber(7);

    /// URI_PATH option. Interpreted by the parser.
    pub const URI_PATH: OptionNumber = OptionNumber(11);

    /// CONTENT_FORMAT option. Interpreted by the parser and written in every response.
    pub const CONTENT_FORMAT: OptionNumber = OptionNumber(12);

    /// MAX_AGE option.
    pub const MAX_AGE: OptionNumber = OptionNumber(14);

    /// URI_QUERY option.
    pub const URI_QUERY: OptionNumber = OptionNumber(15);

    /// ACCEPT option.
    pub const ACCEPT: OptionNumber = OptionNumber(17);

    /// BLOCK2 option.
    pub const BLOCK2: OptionNumber = OptionNumber(23);

    /// BLOCK1 option.
    pub const BLOCK1: OptionNumber = OptionNumber(27);

    /// Returns true if this option number is critical, false if it is optional.
    pub fn is_critical(self) -> bool {
        const FLAG_CRITICAL: u16 = 1;
        self.0 & FLAG_CRITICAL == FLAG_CRITICAL
    }

    /// Returns a human-readable name for this option number, if it is a well-known one.
    pub fn static_name(self) -> Option<&'static str> {
        match self {
            OptionNumber::URI_HOST => Some("Uri-Host"),
            OptionNumber::ETAG => Some("ETag"),
            OptionNumber::OBSERVE => Some("Observe"),
            OptionNumber::URI_PORT => Some("Uri-Port"),
            OptionNumber::URI_PATH => Some("Uri-Path"),
            OptionNumber::CONTENT_FORMAT => Some("Content-Format"),
            OptionNumber::MAX_AGE => Some("Max-Age"),
            OptionNumber::URI_QUERY => Some("Uri-Query"),
            OptionNumber::ACCEPT => Some("Accept"),
            OptionNumber::BLOCK2 => Some("Block2"),
            OptionNumber::BLOCK1 => Some("Block1"),
            _ => None,
        }
    }

    /// Writes out the name of this option along with a text debugging description of the value
    /// associated with this option.
    pub fn fmt_with_value(self, f: &mut std::fmt::Formatter<'_>, value: &[u8]) -> std::fmt::Result {
        write!(f, "{}", self)?;
        match self {
            OptionNumber::CONTENT_FORMAT | OptionNumber::ACCEPT => {
                if let Some(i) = try_decode_u16(value) {
                    write!(f, ":{}", ContentFormat(i))?;
                } else {
                    f.write_str("ERR")?;
                }
            }
            OptionNumber::URI_HOST | OptionNumber::URI_PATH | OptionNumber::URI_QUERY => {
                if let Ok(s) = std::str::from_utf8(value) {
                    write!(f, ":{:?}", s)?;
                } else {
                    f.write_str("ERR")?;
                }
            }
            _ => {
                if !value.is_empty() {
                    f.write_str(":")?;
                    for b in value {
                        write!(f, "{:02X}", b)?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl core::fmt::Display for OptionNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(name) = self.static_name() {
            f.write_str(name)
        } else if self.is_critical() {
            write!(f, "Crit-{}", self.0)
        } else {
            write!(f, "Opt-{}", self.0)
        }
    }
}

impl core::fmt::Debug for OptionNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.0, self)
    }
}

impl core::cmp::PartialEq<u16> for OptionNumber {
    fn eq(&self, other: &u16) -> bool {
        self.0.eq(other)
    }
}

impl Default for OptionNumber {
    fn default() -> Self {
        OptionNumber(0)
    }
}
