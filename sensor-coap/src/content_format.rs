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

/// A type for representing a CoAP Content Format value.
#[derive(Debug, Copy, Eq, PartialEq, Hash, Clone, Ord, PartialOrd)]
pub struct ContentFormat(pub u16);

impl ContentFormat {
    /// From IETF-RFC7252. Used for every response this crate builds.
    pub const TEXT_PLAIN_UTF8: ContentFormat = ContentFormat(0);

    /// From IETF-RFC7252.
    pub const APPLICATION_OCTET_STREAM: ContentFormat = ContentFormat(42);

    /// From IETF-RFC7252. Sent by the sensor nodes with their readings.
    pub const APPLICATION_JSON: ContentFormat = ContentFormat(50);

    /// JSON-formatted RFC8428 Sensor Measurement Lists (SenML)
    pub const APPLICATION_SENML_JSON: ContentFormat = ContentFormat(110);

    /// Returns the MIME name of this content format as a `&'static str`, if possible.
    pub fn static_name(self) -> Option<&'static str> {
        Some(match self {
            Self::TEXT_PLAIN_UTF8 => "text/plain;charset=utf-8",
            Self::APPLICATION_OCTET_STREAM => "application/octet-stream",
            Self::APPLICATION_JSON => "application/json",
            Self::APPLICATION_SENML_JSON => "application/senml+json",
            _ => return None,
        })
    }

    /// Returns true if payloads of this content format can be shown as text.
    pub fn is_utf8(self) -> bool {
        match self {
            Self::TEXT_PLAIN_UTF8 | Self::APPLICATION_JSON | Self::APPLICATION_SENML_JSON => true,
            _ => false,
        }
    }
}

impl core::fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(n) = self.static_name() {
            f.write_str(n)
        } else {
            write!(f, "application/x-coap-{}", self.0)
        }
    }
}
