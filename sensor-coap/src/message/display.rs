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
use core::fmt::{Display, Formatter};

/// Provides an implementation of [`core::fmt::Display`] for a parsed message, used when
/// logging traffic.
#[derive(Debug)]
pub struct MessageDisplay<'a, 'buf>(pub &'a MessageParser<'buf>);

impl<'a, 'buf> Display for MessageDisplay<'a, 'buf> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "<{:?} {}", self.0.msg_type(), DottedCode(self.0.code()))?;
        write!(f, " MID:{:04X}", self.0.msg_id())?;

        let token = self.0.msg_token();
        if !token.is_empty() {
            write!(f, " TOK:{}", token)?;
        }

        for option in self.0.options() {
            match option {
                Ok((number, bytes)) => {
                    f.write_str(" ")?;
                    number.fmt_with_value(f, bytes)?;
                }
                Err(e) => return write!(f, " ERR:{:?}>", e),
            }
        }

        let payload = self.0.payload();
        if !payload.is_empty() {
            let is_text = self.0.content_format().map_or(true, ContentFormat::is_utf8);
            match self.0.payload_as_str() {
                Some(payload_str) if is_text => write!(f, " {:?}", payload_str)?,
                _ => write!(f, " {:?}", payload)?,
            }
        }

        write!(f, ">")
    }
}

/// Helper struct for formatting a CoAP buffer for display.
#[derive(Copy, Clone)]
pub struct CoapByteDisplayFormatter<'buf>(pub &'buf [u8]);

impl<'buf> std::fmt::Display for CoapByteDisplayFormatter<'buf> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Ok(x) = MessageParser::new(self.0) {
            MessageDisplay(&x).fmt(f)
        } else {
            write!(f, "<CORRUPTED {:02x?}>", self.0)
        }
    }
}

impl<'buf> std::fmt::Debug for CoapByteDisplayFormatter<'buf> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Ok(x) = MessageParser::new(self.0) {
            write!(
                f,
                "CoapByteDisplayFormatter({}, {:02x?})",
                MessageDisplay(&x),
                self.0
            )
        } else {
            write!(f, "<CORRUPTED {:02x?}>", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_request() {
        let data = [
            0x42, 0x03, 0x12, 0x34, 0xAA, 0xBB, 0xB6, b's', b'e', b'n', b's', b'o', b'r', 0xFF,
            b'4', b'2',
        ];
        assert_eq!(
            CoapByteDisplayFormatter(&data).to_string(),
            "<Con 0.03 MID:1234 TOK:AABB Uri-Path:\"sensor\" \"42\">"
        );
    }

    #[test]
    fn display_corrupted() {
        assert_eq!(
            CoapByteDisplayFormatter(&[0x00, 0x01]).to_string(),
            "<CORRUPTED [00, 01]>"
        );
    }
}
