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

//! Low-level message codec functions.
//!
//! Option numbers and value lengths share the same encoding: a 4-bit nibble in the
//! option header, optionally followed by one or two extension bytes.
//!
//! | Nibble | Meaning                                   |
//! |--------|-------------------------------------------|
//! | 0..=12 | The value itself                          |
//! | 13     | `13 +` the next byte                      |
//! | 14     | `269 +` the next two bytes (big-endian)   |
//! | 15     | Reserved (only valid as the 0xFF marker)  |

use super::*;
use crate::option::{OptionNumber, MAX_OPTION_VALUE_SIZE};

/// Nibble value announcing a one-byte extension.
pub const NIBBLE_EXT_1: u8 = 13;

/// Nibble value announcing a two-byte extension.
pub const NIBBLE_EXT_2: u8 = 14;

/// Reserved nibble value.
pub const NIBBLE_RESERVED: u8 = 15;

const EXT_1_BASE: u32 = 13;
const EXT_2_BASE: u32 = 269;

/// The largest value expressible with a nibble and a two-byte extension.
pub const MAX_NIBBLE_VALUE: u32 = EXT_2_BASE + 0xFFFF;

/// An encoded delta or length: the header nibble plus zero, one or two extension bytes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct NibbleExt {
    nibble: u8,
    ext: [u8; 2],
    ext_len: usize,
}

impl NibbleExt {
    /// The 4-bit value that goes into the option header byte.
    pub fn nibble(&self) -> u8 {
        self.nibble
    }

    /// The extension bytes that follow the option header byte.
    pub fn ext(&self) -> &[u8] {
        &self.ext[..self.ext_len]
    }
}

/// Chooses the minimal-width encoding for an option delta or value length.
///
/// Fails with [`Error::InvalidArgument`] if `value` exceeds [`MAX_NIBBLE_VALUE`].
pub fn encode_nibble(value: u32) -> Result<NibbleExt, Error> {
    if value < EXT_1_BASE {
        Ok(NibbleExt {
            nibble: value as u8,
            ext: [0; 2],
            ext_len: 0,
        })
    } else if value < EXT_2_BASE {
        Ok(NibbleExt {
            nibble: NIBBLE_EXT_1,
            ext: [(value - EXT_1_BASE) as u8, 0],
            ext_len: 1,
        })
    } else if value <= MAX_NIBBLE_VALUE {
        let x = value - EXT_2_BASE;
        Ok(NibbleExt {
            nibble: NIBBLE_EXT_2,
            ext: [(x >> 8) as u8, x as u8],
            ext_len: 2,
        })
    } else {
        Err(Error::InvalidArgument)
    }
}

/// Decodes a delta or length nibble, consuming any extension bytes from `iter`.
pub fn decode_nibble(nibble: u8, iter: &mut core::slice::Iter<'_, u8>) -> Result<u32, ParseError> {
    match nibble {
        NIBBLE_EXT_1 => {
            let b = iter.next().ok_or(ParseError::MalformedOption)?;
            Ok(EXT_1_BASE + *b as u32)
        }
        NIBBLE_EXT_2 => {
            let msb = *iter.next().ok_or(ParseError::MalformedOption)? as u32;
            let lsb = *iter.next().ok_or(ParseError::MalformedOption)? as u32;
            Ok(EXT_2_BASE + ((msb << 8) | lsb))
        }
        x if x < NIBBLE_EXT_1 => Ok(x as u32),
        _ => Err(ParseError::MalformedOption),
    }
}

/// Number of extension bytes needed for `value`.
fn ext_size(value: usize) -> usize {
    if value >= EXT_2_BASE as usize {
        2
    } else if value >= EXT_1_BASE as usize {
        1
    } else {
        0
    }
}

/// Calculates the encoded size of a CoAP option.
pub fn calc_option_size(prev_key: OptionNumber, key: OptionNumber, value_len: usize) -> usize {
    let option_delta = key.0.saturating_sub(prev_key.0) as usize;
    1 + ext_size(option_delta) + ext_size(value_len) + value_len
}

/// Decodes one option from a `core::slice::Iter`, which can be obtained from a byte slice.
/// The iterator is then advanced to the next option.
///
/// Will return `Ok(None)` if it either encounters the end-of-options marker (0xFF), which
/// is consumed, or if the given iterator has been fully consumed. Either way the iterator
/// is left at the first payload byte.
pub fn decode_option<'a>(
    iter: &mut core::slice::Iter<'a, u8>,
    last_option: OptionNumber,
) -> Result<Option<(OptionNumber, &'a [u8])>, ParseError> {
    let header = match iter.next() {
        Some(x) => *x,
        None => return Ok(None),
    };

    if header == crate::consts::PAYLOAD_MARKER {
        return Ok(None);
    }

    let key_delta = decode_nibble(header >> 4, iter)?;
    let len = decode_nibble(header & 0xF, iter)? as usize;

    let number = last_option.0 as u32 + key_delta;
    if number > core::u16::MAX as u32 {
        // Don't let the key wrap.
        return Err(ParseError::MalformedOption);
    }

    let rest = iter.as_slice();
    if len > rest.len() {
        return Err(ParseError::MalformedOption);
    }

    let (value, remaining) = rest.split_at(len);
    *iter = remaining.iter();

    Ok(Some((OptionNumber(number as u16), value)))
}

/// Encodes an option into the given buffer, including the value.
/// Returns the number of bytes written.
pub fn encode_option(
    buffer: &mut [u8],
    prev_key: OptionNumber,
    key: OptionNumber,
    value: &[u8],
) -> Result<usize, Error> {
    if prev_key > key {
        return Err(Error::InvalidArgument);
    }

    if value.len() > MAX_OPTION_VALUE_SIZE {
        warn!("value_len:{}, max:{}", value.len(), MAX_OPTION_VALUE_SIZE);
        return Err(Error::InvalidArgument);
    }

    let calc_len = calc_option_size(prev_key, key, value.len());
    if calc_len > buffer.len() {
        warn!("calc_len:{}, blen:{}", calc_len, buffer.len());
        return Err(Error::BufferTooSmall);
    }

    let delta = encode_nibble((key.0 - prev_key.0) as u32)?;
    let len = encode_nibble(value.len() as u32)?;

    buffer[0] = (delta.nibble() << 4) | len.nibble();
    let mut offset = 1;
    for ext in [delta.ext(), len.ext(), value].iter() {
        buffer[offset..offset + ext.len()].copy_from_slice(ext);
        offset += ext.len();
    }

    debug_assert_eq!(offset, calc_len);
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(nibble: u8, ext: &[u8]) -> Result<u32, ParseError> {
        decode_nibble(nibble, &mut ext.iter())
    }

    #[test]
    fn nibble_literal_and_extended() {
        assert_eq!(decode(0, &[]), Ok(0));
        assert_eq!(decode(12, &[]), Ok(12));
        assert_eq!(decode(13, &[0]), Ok(13));
        assert_eq!(decode(13, &[255]), Ok(268));
        assert_eq!(decode(14, &[0, 0]), Ok(269));
        assert_eq!(decode(14, &[0x01, 0x02]), Ok(269 + 0x0102));
        assert_eq!(decode(14, &[0xFF, 0xFF]), Ok(MAX_NIBBLE_VALUE));
    }

    #[test]
    fn nibble_reserved_and_truncated() {
        assert_eq!(decode(15, &[0, 0]), Err(ParseError::MalformedOption));
        assert_eq!(decode(13, &[]), Err(ParseError::MalformedOption));
        assert_eq!(decode(14, &[]), Err(ParseError::MalformedOption));
        assert_eq!(decode(14, &[0x01]), Err(ParseError::MalformedOption));
    }

    #[test]
    fn nibble_encoding_is_minimal() {
        for (value, nibble, ext) in vec![
            (0u32, 0u8, vec![]),
            (12, 12, vec![]),
            (13, 13, vec![0u8]),
            (268, 13, vec![255]),
            (269, 14, vec![0, 0]),
            (1034, 14, vec![0x02, 0xFD]),
            (MAX_NIBBLE_VALUE, 14, vec![0xFF, 0xFF]),
        ] {
            let enc = encode_nibble(value).unwrap();
            assert_eq!(enc.nibble(), nibble, "value:{}", value);
            assert_eq!(enc.ext(), &ext[..], "value:{}", value);
            assert_eq!(decode(enc.nibble(), enc.ext()), Ok(value));
        }
        assert_eq!(encode_nibble(MAX_NIBBLE_VALUE + 1), Err(Error::InvalidArgument));
    }

    #[test]
    fn option_deltas_accumulate() {
        let buffer = &mut [0u8; 64];
        let numbers = [OptionNumber(11), OptionNumber(12), OptionNumber(300)];
        let mut len = 0;
        let mut prev = OptionNumber(0);
        for number in numbers.iter() {
            len += encode_option(&mut buffer[len..], prev, *number, b"ab").unwrap();
            prev = *number;
        }

        let mut iter = buffer[..len].iter();
        let mut last = OptionNumber(0);
        for number in numbers.iter() {
            let (key, value) = decode_option(&mut iter, last).unwrap().unwrap();
            assert_eq!(key, *number);
            assert_eq!(value, b"ab");
            last = key;
        }
        assert_eq!(decode_option(&mut iter, last), Ok(None));
    }

    #[test]
    fn decode_stops_at_marker() {
        let data = [0xB3, b'f', b'o', b'o', 0xFF, b'h', b'i'];
        let mut iter = data.iter();
        assert_eq!(
            decode_option(&mut iter, OptionNumber(0)),
            Ok(Some((OptionNumber::URI_PATH, &b"foo"[..])))
        );
        assert_eq!(decode_option(&mut iter, OptionNumber::URI_PATH), Ok(None));
        assert_eq!(iter.as_slice(), b"hi");
    }

    #[test]
    fn decode_rejects_bad_options() {
        // Value runs past the end.
        let mut iter = [0xB5, b'a', b'b'].iter();
        assert_eq!(
            decode_option(&mut iter, OptionNumber(0)),
            Err(ParseError::MalformedOption)
        );

        // Length nibble 14 with a single extension byte.
        let mut iter = [0x0E, 0x01].iter();
        assert_eq!(
            decode_option(&mut iter, OptionNumber(0)),
            Err(ParseError::MalformedOption)
        );

        // Reserved delta nibble.
        let mut iter = [0xF0].iter();
        assert_eq!(
            decode_option(&mut iter, OptionNumber(0)),
            Err(ParseError::MalformedOption)
        );

        // Option number wraps past 65535.
        let mut iter = [0xE0, 0xFF, 0xFF].iter();
        assert_eq!(
            decode_option(&mut iter, OptionNumber(1000)),
            Err(ParseError::MalformedOption)
        );
    }

    #[test]
    fn encode_checks_capacity_and_order() {
        let buffer = &mut [0u8; 4];
        assert_eq!(
            encode_option(buffer, OptionNumber(0), OptionNumber::URI_PATH, b"sensor"),
            Err(Error::BufferTooSmall)
        );
        assert_eq!(
            encode_option(buffer, OptionNumber(12), OptionNumber(11), b""),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            encode_option(buffer, OptionNumber(0), OptionNumber(12), b""),
            Ok(1)
        );
        assert_eq!(buffer[0], 0xC0);
    }

    #[test]
    fn option_size_matches_encoding() {
        let buffer = &mut [0u8; 400];
        let cases = vec![(0u16, 11u16, 6usize), (0, 12, 0), (11, 300, 13), (0, 1000, 300)];
        for (prev, key, len) in cases {
            let value = vec![b'x'; len];
            let written =
                encode_option(buffer, OptionNumber(prev), OptionNumber(key), &value).unwrap();
            assert_eq!(
                written,
                calc_option_size(OptionNumber(prev), OptionNumber(key), len)
            );
        }
    }
}
