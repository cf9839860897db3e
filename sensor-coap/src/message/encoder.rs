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

use super::codec::*;
use super::*;

/// A class for writing stand-alone messages to a mutable byte slice.
///
/// The buffer is never written past its end: every method that adds bytes checks the
/// remaining capacity first and fails with [`Error::BufferTooSmall`] instead.
///
/// Parts must be written in wire order: header fields and the token first, then options
/// in non-decreasing option-number order, then the payload.
#[derive(Debug)]
pub struct BufferMessageEncoder<'buf> {
    buffer: &'buf mut [u8],
    len: usize,
    option_start: usize,
    payload_start: usize,
    last_option: OptionNumber,
}

impl<'buf> BufferMessageEncoder<'buf> {
    /// The minimum size buffer that can be passed into `new`.
    pub const MIN_MESSAGE_BUFFER_LEN: usize = COAP_HEADER_LEN;

    /// Creates a new `BufferMessageEncoder` using the given buffer.
    ///
    /// The header is initialized to version 1, `CON`, empty code, message id zero
    /// and no token.
    pub fn new(buffer: &'buf mut [u8]) -> Result<BufferMessageEncoder<'buf>, Error> {
        if buffer.len() < BufferMessageEncoder::MIN_MESSAGE_BUFFER_LEN {
            return Err(Error::BufferTooSmall);
        }

        buffer[0] = COAP_VERSION << COAP_MSG_VER_OFFS;
        buffer[1] = 0;
        buffer[2] = 0;
        buffer[3] = 0;

        Ok(BufferMessageEncoder {
            buffer,
            len: COAP_HEADER_LEN,
            option_start: COAP_HEADER_LEN,
            payload_start: COAP_HEADER_LEN,
            last_option: Default::default(),
        })
    }

    /// Returns a byte slice containing the encoded message.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Number of bytes encoded so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: the header is written on construction.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the token set for this message.
    pub fn msg_token(&self) -> MsgToken {
        let token_len = (self.buffer[0] & COAP_MSG_TKL_MASK) as usize;
        MsgToken::new(&self.buffer[COAP_HEADER_LEN..COAP_HEADER_LEN + token_len])
    }

    /// Sets the message type.
    pub fn set_msg_type(&mut self, tt: MsgType) {
        self.buffer[0] = (self.buffer[0] & !COAP_MSG_T_MASK) | ((tt as u8) << COAP_MSG_T_OFFS);
    }

    /// Sets the message id.
    pub fn set_msg_id(&mut self, msg_id: MsgId) {
        self.buffer[2] = (msg_id >> 8) as u8;
        self.buffer[3] = msg_id as u8;
    }

    /// Sets the message code.
    pub fn set_msg_code(&mut self, code: MsgCode) {
        self.set_raw_code(code as u8);
    }

    /// Sets the message code from a raw `class.detail` byte.
    pub fn set_raw_code(&mut self, code: u8) {
        self.buffer[1] = code;
    }

    /// Writes the token. Anything already written after the header is discarded.
    pub fn set_msg_token(&mut self, token: MsgToken) -> Result<(), Error> {
        let option_start = COAP_HEADER_LEN + token.len();
        if option_start > self.buffer.len() {
            return Err(Error::BufferTooSmall);
        }

        self.buffer[0] = (self.buffer[0] & !COAP_MSG_TKL_MASK) | token.len() as u8;
        self.buffer[COAP_HEADER_LEN..option_start].copy_from_slice(token.as_bytes());

        self.len = option_start;
        self.option_start = option_start;
        self.payload_start = option_start;
        self.last_option = Default::default();

        Ok(())
    }

    /// Appends an option. `key` must not be lower than the previously inserted option,
    /// and no payload may have been written yet.
    pub fn insert_option(&mut self, key: OptionNumber, value: &[u8]) -> Result<(), Error> {
        if self.len != self.payload_start || key < self.last_option {
            return Err(Error::InvalidArgument);
        }

        let written = encode_option(&mut self.buffer[self.len..], self.last_option, key, value)?;

        self.len += written;
        self.payload_start = self.len;
        self.last_option = key;

        Ok(())
    }

    /// Appends an option holding an unsigned integer value in its minimal encoding.
    pub fn insert_option_with_u16(&mut self, key: OptionNumber, value: u16) -> Result<(), Error> {
        let buf = &mut [0u8; 2];
        self.insert_option(key, encode_u16(value, buf))
    }

    /// Appends payload bytes, writing the payload marker first if needed.
    /// Appending an empty slice writes nothing.
    pub fn append_payload(&mut self, body: &[u8]) -> Result<(), Error> {
        if body.is_empty() {
            return Ok(());
        }

        let marker_len = if self.len == self.payload_start { 1 } else { 0 };
        let new_body_end = self.len + marker_len + body.len();

        if new_body_end > self.buffer.len() {
            return Err(Error::BufferTooSmall);
        }

        if marker_len == 1 {
            self.buffer[self.len] = PAYLOAD_MARKER;
            self.len += 1;
        }

        self.buffer[self.len..new_body_end].copy_from_slice(body);
        self.len = new_body_end;

        Ok(())
    }
}

impl<'buf> std::fmt::Display for BufferMessageEncoder<'buf> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&CoapByteDisplayFormatter(self.as_bytes()), f)
    }
}

impl<'buf> core::ops::Deref for BufferMessageEncoder<'buf> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn header_layout() {
        let buffer = &mut [0u8; 16];
        let mut encoder = BufferMessageEncoder::new(buffer).unwrap();
        encoder.set_msg_type(MsgType::Non);
        encoder.set_msg_code(MsgCode::MethodPost);
        encoder.set_msg_id(0xBEEF);
        encoder.set_msg_token(MsgToken::new(&[1, 2, 3])).unwrap();
        assert_eq!(encoder.as_bytes(), &[0x53, 0x02, 0xBE, 0xEF, 1, 2, 3]);
        assert_eq!(encoder.msg_token().as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn new_rejects_tiny_buffer() {
        let buffer = &mut [0u8; 3];
        assert_eq!(
            BufferMessageEncoder::new(buffer).unwrap_err(),
            Error::BufferTooSmall
        );
    }

    #[test]
    fn token_must_fit() {
        let buffer = &mut [0u8; 8];
        let mut encoder = BufferMessageEncoder::new(buffer).unwrap();
        assert_eq!(
            encoder.set_msg_token(MsgToken::new(&[0; 8])),
            Err(Error::BufferTooSmall)
        );
        assert_eq!(encoder.len(), 4);
    }

    #[test]
    fn options_must_ascend_and_precede_payload() {
        let buffer = &mut [0u8; 32];
        let mut encoder = BufferMessageEncoder::new(buffer).unwrap();
        encoder.insert_option(OptionNumber::URI_PATH, b"a").unwrap();
        encoder.insert_option(OptionNumber::URI_PATH, b"b").unwrap();
        assert_eq!(
            encoder.insert_option(OptionNumber::URI_HOST, b"h"),
            Err(Error::InvalidArgument)
        );
        encoder.append_payload(b"x").unwrap();
        assert_eq!(
            encoder.insert_option(OptionNumber::ACCEPT, b""),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn payload_capacity_is_checked() {
        let buffer = &mut [0u8; 8];
        let mut encoder = BufferMessageEncoder::new(buffer).unwrap();
        encoder.append_payload(b"abc").unwrap();
        assert_eq!(encoder.len(), 8);
        assert_eq!(encoder.append_payload(b"d"), Err(Error::BufferTooSmall));
        assert_eq!(encoder.as_bytes()[4..], [0xFF, b'a', b'b', b'c']);
    }

    #[test]
    fn empty_payload_writes_no_marker() {
        let buffer = &mut [0u8; 8];
        let mut encoder = BufferMessageEncoder::new(buffer).unwrap();
        encoder.append_payload(b"").unwrap();
        assert_eq!(encoder.len(), 4);
    }

    #[test]
    fn increasing_option_numbers_survive_decoding() {
        let buffer = &mut [0u8; 64];
        let mut encoder = BufferMessageEncoder::new(buffer).unwrap();
        let numbers = [OptionNumber(4), OptionNumber(11), OptionNumber(2000)];
        for number in numbers.iter() {
            encoder.insert_option(*number, b"v").unwrap();
        }
        let len = encoder.len();

        let msg = MessageParser::new(&buffer[..len]).unwrap();
        let decoded: Vec<_> = msg.options().map(|r| r.unwrap().0).collect();
        assert_eq!(decoded, numbers.to_vec());
    }

    proptest! {
        #[test]
        fn encode_then_parse(
            msg_id in any::<u16>(),
            token in proptest::collection::vec(any::<u8>(), 0..=8),
            path in "[a-z]{1,12}",
            payload in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let buffer = &mut [0u8; 128];
            let mut encoder = BufferMessageEncoder::new(buffer).unwrap();
            encoder.set_msg_type(MsgType::Con);
            encoder.set_msg_code(MsgCode::MethodPut);
            encoder.set_msg_id(msg_id);
            encoder.set_msg_token(MsgToken::new(&token)).unwrap();
            encoder.insert_option(OptionNumber::URI_PATH, path.as_bytes()).unwrap();
            encoder.append_payload(&payload).unwrap();
            let len = encoder.len();

            let msg = MessageParser::new(&buffer[..len]).unwrap();
            prop_assert_eq!(msg.msg_id(), msg_id);
            let got = msg.msg_token();
            prop_assert_eq!(got.as_bytes(), &token[..]);
            prop_assert_eq!(msg.uri_path(), path.as_str());
            prop_assert_eq!(msg.payload(), &payload[..]);
        }

        #[test]
        fn ascending_option_numbers_round_trip(
            mut numbers in proptest::collection::vec(0u16..10_000, 1..6),
        ) {
            numbers.sort();
            let buffer = &mut [0u8; 64];
            let mut encoder = BufferMessageEncoder::new(buffer).unwrap();
            for number in numbers.iter() {
                encoder.insert_option(OptionNumber(*number), b"").unwrap();
            }
            let len = encoder.len();

            let msg = MessageParser::new(&buffer[..len]).unwrap();
            let decoded: Vec<u16> = msg.options().map(|r| r.unwrap().0 .0).collect();
            prop_assert_eq!(decoded, numbers);
        }
    }
}
