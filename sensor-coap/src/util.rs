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

/// Writes `value` into `dst` as a CoAP `uint` option value: big-endian with leading
/// zero bytes removed. Zero is encoded as an empty value.
pub fn encode_u16(value: u16, dst: &mut [u8; 2]) -> &[u8] {
    dst[0] = (value >> 8) as u8;
    dst[1] = value as u8;
    let skip = if value == 0 {
        2
    } else if value <= 0xFF {
        1
    } else {
        0
    };
    &dst[skip..]
}

/// Attempts to decode a CoAP `uint` option value of up to two bytes.
/// Returns `None` if the input is longer than two bytes.
pub fn try_decode_u16(src: &[u8]) -> Option<u16> {
    match src.len() {
        0 => Some(0u16),
        1 => Some(src[0] as u16),
        2 => Some(((src[0] as u16) << 8) + src[1] as u16),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::util::*;

    #[test]
    fn encode_u16_is_minimal() {
        let buf = &mut [0u8; 2];
        assert_eq!(encode_u16(0, buf), &[] as &[u8]);
        assert_eq!(encode_u16(50, buf), &[50u8]);
        assert_eq!(encode_u16(0x1234, buf), &[0x12u8, 0x34]);
    }

    #[test]
    fn encode_decode_u16() {
        for i in vec![0u16, 1, 0xFF, 0x100, 11050, 0xFFFF] {
            let buf = &mut [0; 2];
            let enc = encode_u16(i, buf);
            assert_eq!(try_decode_u16(enc), Some(i), "enc:{:02x?}", enc);
        }

        assert_eq!(try_decode_u16(&[0; 3]), None);
    }
}
