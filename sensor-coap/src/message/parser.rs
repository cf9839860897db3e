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
use core::convert::TryFrom;

/// A class for parsing a stand-alone UDP CoAP message from a given buffer.
///
/// Only the options this crate acts on are interpreted: every Uri-Path segment is joined
/// into [`uri_path`](MessageParser::uri_path) and Content-Format is decoded. Other options
/// are validated and skipped.
#[derive(Debug, Clone)]
pub struct MessageParser<'buf> {
    buffer: &'buf [u8],
    code: u8,
    msg_type: MsgType,
    msg_id: MsgId,
    token: MsgToken,
    uri_path: String,
    content_format: Option<ContentFormat>,
    option_start: usize,
    payload_start: usize,
}

impl<'buf> std::fmt::Display for MessageParser<'buf> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&MessageDisplay(self), f)
    }
}

impl<'buf> MessageParser<'buf> {
    /// The minimum buffer size that can be passed into `new()`.
    pub const MIN_MESSAGE_BUFFER_LEN: usize = COAP_HEADER_LEN;

    /// Creates a new `MessageParser` instance with the given `buffer`.
    pub fn new(buffer: &'buf [u8]) -> Result<MessageParser<'buf>, ParseError> {
        if buffer.len() < MessageParser::MIN_MESSAGE_BUFFER_LEN {
            return Err(ParseError::TooShort);
        }

        if (buffer[0] & COAP_MSG_VER_MASK) >> COAP_MSG_VER_OFFS != COAP_VERSION {
            return Err(ParseError::UnsupportedVersion);
        }

        let msg_type = MsgType::from_bits((buffer[0] & COAP_MSG_T_MASK) >> COAP_MSG_T_OFFS);
        let code = buffer[1];
        let msg_id = buffer[3] as u16 | ((buffer[2] as u16) << 8);

        let token_len = (buffer[0] & COAP_MSG_TKL_MASK) as usize;
        let option_start = COAP_HEADER_LEN + token_len;
        if token_len > MAX_TOKEN_LEN || option_start > buffer.len() {
            return Err(ParseError::BadToken);
        }
        let token = MsgToken::try_from(&buffer[COAP_HEADER_LEN..option_start])?;

        let mut uri_path = String::new();
        let mut content_format = None;

        let mut iter = OptionIterator::new(&buffer[option_start..]);

        for result in &mut iter {
            match result? {
                (OptionNumber::URI_PATH, segment) => {
                    if segment.is_empty() {
                        continue;
                    }
                    let segment =
                        std::str::from_utf8(segment).map_err(|_| ParseError::MalformedOption)?;
                    if !uri_path.is_empty() {
                        uri_path.push('/');
                    }
                    uri_path.push_str(segment);
                }
                (OptionNumber::CONTENT_FORMAT, value) => {
                    content_format = Some(ContentFormat(
                        try_decode_u16(value).ok_or(ParseError::MalformedOption)?,
                    ));
                }
                (_key, _value) => {
                    // Skip.
                }
            }
        }

        let payload_start = buffer.len() - iter.as_slice().len();

        Ok(MessageParser {
            buffer,
            code,
            msg_type,
            msg_id,
            token,
            uri_path,
            content_format,
            option_start,
            payload_start,
        })
    }

    /// Returns a byte slice containing the encoded message.
    pub fn as_bytes(&self) -> &'buf [u8] {
        self.buffer
    }

    /// Gets the raw code byte for this message.
    pub fn code(&self) -> u8 {
        self.code
    }

    /// Gets the message code for this message, if it is one this crate knows about.
    pub fn msg_code(&self) -> Option<MsgCode> {
        MsgCode::try_from(self.code)
    }

    /// Gets the message type for this message.
    pub fn msg_type(&self) -> MsgType {
        self.msg_type
    }

    /// Gets the message id for this message.
    pub fn msg_id(&self) -> MsgId {
        self.msg_id
    }

    /// Gets the message token for this message.
    pub fn msg_token(&self) -> MsgToken {
        self.token
    }

    /// The Uri-Path segments joined with `/`, without a leading slash.
    /// Empty if the message has no Uri-Path option.
    pub fn uri_path(&self) -> &str {
        &self.uri_path
    }

    /// Indicates the content format of the payload, if specified.
    pub fn content_format(&self) -> Option<ContentFormat> {
        self.content_format
    }

    /// Gets the payload as a byte slice. Empty if the message has no payload.
    pub fn payload(&self) -> &'buf [u8] {
        &self.buffer[self.payload_start..]
    }

    /// Gets the payload as a string slice, if it is valid UTF-8.
    pub fn payload_as_str(&self) -> Option<&'buf str> {
        std::str::from_utf8(self.payload()).ok()
    }

    /// Gets an iterator for processing the options of the message.
    pub fn options(&self) -> OptionIterator<'buf> {
        OptionIterator::new(&self.buffer[self.option_start..])
    }
}
