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

/// Writes the response to `request` into `buffer` and returns the encoded length.
///
/// The response echoes the request's message id and token, is an `ACK` if the request was
/// `CON` (otherwise `NON`), carries a `text/plain` Content-Format option and, if `body` is
/// not empty, the payload marker followed by `body`.
///
/// Fails with [`Error::BufferTooSmall`] if any part does not fit, in which case nothing
/// should be sent.
pub fn build_response(
    request: &MessageParser<'_>,
    code: MsgCode,
    body: &[u8],
    buffer: &mut [u8],
) -> Result<usize, Error> {
    let mut encoder = BufferMessageEncoder::new(buffer)?;

    encoder.set_msg_type(request.msg_type().response_type());
    encoder.set_msg_code(code);
    encoder.set_msg_id(request.msg_id());
    encoder.set_msg_token(request.msg_token())?;
    encoder.insert_option_with_u16(
        OptionNumber::CONTENT_FORMAT,
        ContentFormat::TEXT_PLAIN_UTF8.0,
    )?;
    encoder.append_payload(body)?;

    Ok(encoder.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(first: u8, token: &[u8]) -> Vec<u8> {
        let mut data = vec![first | token.len() as u8, 0x01, 0x43, 0x21];
        data.extend_from_slice(token);
        data
    }

    #[test]
    fn ack_for_con() {
        let data = request(0x40, &[0x01, 0x02]);
        let req = MessageParser::new(&data).unwrap();
        let buffer = &mut [0u8; 32];
        let len = build_response(&req, MsgCode::SuccessContent, b"hi", buffer).unwrap();

        assert_eq!(
            &buffer[..len],
            &[0x62, 0x45, 0x43, 0x21, 0x01, 0x02, 0xC0, 0xFF, b'h', b'i']
        );
    }

    #[test]
    fn non_for_non_without_body() {
        let data = request(0x50, &[]);
        let req = MessageParser::new(&data).unwrap();
        let buffer = &mut [0u8; 32];
        let len = build_response(&req, MsgCode::SuccessChanged, b"", buffer).unwrap();

        assert_eq!(&buffer[..len], &[0x50, 0x44, 0x43, 0x21, 0xC0]);

        let resp = MessageParser::new(&buffer[..len]).unwrap();
        assert_eq!(resp.msg_type(), MsgType::Non);
        assert_eq!(resp.content_format(), Some(ContentFormat::TEXT_PLAIN_UTF8));
    }

    #[test]
    fn token_echoed_for_every_length() {
        for len in 0..=MAX_TOKEN_LEN {
            let token: Vec<u8> = (0..len as u8).map(|x| x.wrapping_mul(37)).collect();
            let data = request(0x40, &token);
            let req = MessageParser::new(&data).unwrap();
            let buffer = &mut [0u8; 64];
            let n = build_response(&req, MsgCode::SuccessContent, b"x", buffer).unwrap();

            let resp = MessageParser::new(&buffer[..n]).unwrap();
            assert_eq!(resp.msg_token().as_bytes(), &token[..]);
            assert_eq!(resp.msg_id(), 0x4321);
        }
    }

    #[test]
    fn too_small_at_every_step() {
        let data = request(0x40, &[9; 8]);
        let req = MessageParser::new(&data).unwrap();

        // Header, token, option, then marker + body each need room.
        for cap in [3usize, 11, 12, 15].iter() {
            let mut buffer = vec![0u8; *cap];
            assert_eq!(
                build_response(&req, MsgCode::SuccessContent, b"ab", &mut buffer),
                Err(Error::BufferTooSmall),
                "cap:{}",
                cap
            );
        }

        let buffer = &mut [0u8; 16];
        assert_eq!(
            build_response(&req, MsgCode::SuccessContent, b"ab", buffer),
            Ok(16)
        );
    }
}
