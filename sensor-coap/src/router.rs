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

use super::store::extract_value;
use super::*;

/// Response code and body selected by the [`Router`] for one request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Response {
    /// Response code (2.04, 2.05, 4.04, 4.05 or 5.00).
    pub code: MsgCode,

    /// Plain-text response body.
    pub body: Vec<u8>,
}

impl Response {
    fn new(code: MsgCode, body: impl Into<Vec<u8>>) -> Response {
        Response {
            code,
            body: body.into(),
        }
    }

    /// The body as text, lossily decoded.
    pub fn body_as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Dispatches requests for the `sensor` and `echo` resources against a [`StateStore`].
///
/// | Method | Path     | Success                | Store failure         |
/// |--------|----------|------------------------|-----------------------|
/// | GET    | `sensor` | 2.05 value / `NO_DATA` | n/a                   |
/// | PUT    | `sensor` | 2.04 `UPDATED`         | 5.00 `UPDATE_FAIL`    |
/// | POST   | `echo`   | 2.05 `echo: <value>`   | 5.00 `WRITE_FAIL`     |
///
/// Any other method on `sensor` or `echo` gets 4.05 `METHOD_NOT_ALLOWED`. Any other path
/// gets 4.04 `NOT_FOUND`.
#[derive(Debug)]
pub struct Router<S> {
    store: S,
}

impl<S: StateStore> Router<S> {
    /// Creates a router that owns `store`.
    pub fn new(store: S) -> Router<S> {
        Router { store }
    }

    /// Shared access to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the router, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Selects the response for a request with the raw method `code`, `path` and
    /// `payload`. Writes happen before this returns.
    pub fn route(&mut self, code: u8, path: &str, payload: &[u8]) -> Response {
        match (MsgCode::try_from(code), path) {
            (Some(MsgCode::MethodGet), PATH_SENSOR) => self.read_sensor(),

            (Some(MsgCode::MethodPost), PATH_ECHO) => match self.store_value(payload) {
                Ok(value) => Response::new(
                    MsgCode::SuccessContent,
                    format!("{}{}", ECHO_PREFIX, value),
                ),
                Err(e) => {
                    error!("POST /{} failed: {}", PATH_ECHO, e);
                    Response::new(MsgCode::ServerErrorInternalServerError, BODY_WRITE_FAIL)
                }
            },

            (Some(MsgCode::MethodPut), PATH_SENSOR) => match self.store_value(payload) {
                Ok(_) => Response::new(MsgCode::SuccessChanged, BODY_UPDATED),
                Err(e) => {
                    error!("PUT /{} failed: {}", PATH_SENSOR, e);
                    Response::new(MsgCode::ServerErrorInternalServerError, BODY_UPDATE_FAIL)
                }
            },

            (_, PATH_SENSOR) | (_, PATH_ECHO) => {
                Response::new(MsgCode::ClientErrorMethodNotAllowed, BODY_METHOD_NOT_ALLOWED)
            }

            _ => Response::new(MsgCode::ClientErrorNotFound, BODY_NOT_FOUND),
        }
    }

    /// Parses `inbound`, routes it and writes the response into `outbound`.
    ///
    /// Returns the length of the response. An error means nothing should be sent:
    /// either the datagram was not a valid CoAP message or the response did not fit.
    pub fn handle_datagram(&mut self, inbound: &[u8], outbound: &mut [u8]) -> Result<usize, Error> {
        let request = match MessageParser::new(inbound) {
            Ok(request) => request,
            Err(e) => {
                debug!("Dropping {}: {}", CoapByteDisplayFormatter(inbound), e);
                return Err(e.into());
            }
        };

        let response = self.route(request.code(), request.uri_path(), request.payload());
        debug!(
            "{} -> {} {:?}",
            request,
            response.code,
            response.body_as_str()
        );

        build_response(&request, response.code, &response.body, outbound).map_err(|e| {
            warn!("Unable to encode response to {}: {}", request, e);
            e
        })
    }

    fn read_sensor(&self) -> Response {
        let value = self
            .store
            .read_current()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| {
                self.store
                    .read_last_history_entry()
                    .map(|line| extract_value(&line).to_string())
                    .filter(|value| !value.is_empty())
            })
            .unwrap_or_else(|| BODY_NO_DATA.to_string());

        Response::new(MsgCode::SuccessContent, value)
    }

    /// Normalizes `payload` and writes it to the store, returning the stored value.
    pub fn store_value(&mut self, payload: &[u8]) -> Result<String, StoreError> {
        let value = normalize_value(payload);
        self.store.write_current_and_append_history(&value)?;
        Ok(value)
    }
}

/// Converts a request payload into the value that is stored.
///
/// The payload is decoded as UTF-8 (invalid sequences replaced), line breaks become
/// spaces so the value stays on one history line, and surrounding whitespace is trimmed.
pub fn normalize_value(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload)
        .replace(|c: char| c == '\r' || c == '\n', " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GET: u8 = 0x01;
    const POST: u8 = 0x02;
    const PUT: u8 = 0x03;
    const DELETE: u8 = 0x04;

    #[derive(Debug, Default)]
    struct ReadOnlyStore;

    impl StateStore for ReadOnlyStore {
        fn read_current(&self) -> Option<String> {
            None
        }

        fn read_last_history_entry(&self) -> Option<String> {
            None
        }

        fn write_current_and_append_history(&mut self, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::WriteFailure {
                path: PathBuf::from("/read-only"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    fn request(
        msg_type: MsgType,
        code: u8,
        token: &[u8],
        path: &[&str],
        payload: &[u8],
    ) -> Vec<u8> {
        let mut buffer = [0u8; 256];
        let mut encoder = BufferMessageEncoder::new(&mut buffer).unwrap();
        encoder.set_msg_type(msg_type);
        encoder.set_raw_code(code);
        encoder.set_msg_id(0x4321);
        encoder.set_msg_token(MsgToken::new(token)).unwrap();
        for segment in path {
            encoder
                .insert_option(OptionNumber::URI_PATH, segment.as_bytes())
                .unwrap();
        }
        encoder.append_payload(payload).unwrap();
        encoder.as_bytes().to_vec()
    }

    #[test]
    fn get_without_data() {
        let mut router = Router::new(MemoryStore::new());
        assert_eq!(
            router.route(GET, "sensor", b""),
            Response::new(MsgCode::SuccessContent, "NO_DATA")
        );
    }

    #[test]
    fn put_then_get() {
        let mut router = Router::new(MemoryStore::new());
        assert_eq!(
            router.route(PUT, "sensor", b"hello"),
            Response::new(MsgCode::SuccessChanged, "UPDATED")
        );
        assert_eq!(
            router.route(GET, "sensor", b"ignored"),
            Response::new(MsgCode::SuccessContent, "hello")
        );
    }

    #[test]
    fn post_echo_is_visible_to_get() {
        let mut router = Router::new(MemoryStore::new());
        assert_eq!(
            router.route(POST, "echo", b"x"),
            Response::new(MsgCode::SuccessContent, "echo: x")
        );
        assert_eq!(router.route(GET, "sensor", b"").body, b"x");
        assert_eq!(router.store().history().len(), 1);
    }

    #[test]
    fn get_falls_back_to_history() {
        let store = MemoryStore::with_history(vec![
            "2024-01-01T00:00:00Z payload=1",
            "2024-01-01T00:00:05Z payload= 17.25 ",
            "",
        ]);
        let mut router = Router::new(store);
        assert_eq!(router.route(GET, "sensor", b"").body, b"17.25");

        let mut router = Router::new(MemoryStore::with_history(vec!["raw line"]));
        assert_eq!(router.route(GET, "sensor", b"").body, b"raw line");
    }

    #[test]
    fn unknown_path_is_not_found_every_time() {
        let mut router = Router::new(MemoryStore::new());
        for _ in 0..3 {
            assert_eq!(
                router.route(PUT, "unknown", b"v"),
                Response::new(MsgCode::ClientErrorNotFound, "NOT_FOUND")
            );
        }
        assert_eq!(router.route(GET, "", b"").code, MsgCode::ClientErrorNotFound);
        assert_eq!(
            router.route(GET, "sensor/extra", b"").code,
            MsgCode::ClientErrorNotFound
        );
        assert!(router.store().history().is_empty());
    }

    #[test]
    fn wrong_method_on_known_path() {
        let mut router = Router::new(MemoryStore::new());
        for (code, path) in &[(GET, "echo"), (POST, "sensor"), (DELETE, "sensor"), (0x45, "echo")] {
            assert_eq!(
                router.route(*code, path, b"v"),
                Response::new(MsgCode::ClientErrorMethodNotAllowed, "METHOD_NOT_ALLOWED"),
                "code {:#04x} path {}",
                code,
                path
            );
        }
        assert!(router.store().history().is_empty());
    }

    #[test]
    fn store_failure_is_internal_error() {
        let mut router = Router::new(ReadOnlyStore);
        assert_eq!(
            router.route(PUT, "sensor", b"v"),
            Response::new(MsgCode::ServerErrorInternalServerError, "UPDATE_FAIL")
        );
        assert_eq!(
            router.route(POST, "echo", b"v"),
            Response::new(MsgCode::ServerErrorInternalServerError, "WRITE_FAIL")
        );
    }

    #[test]
    fn store_value_reports_store_error() {
        let mut router = Router::new(ReadOnlyStore);
        match router.store_value(b"v") {
            Err(StoreError::WriteFailure { path, source }) => {
                assert_eq!(path, PathBuf::from("/read-only"));
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected: {:?}", other),
        }

        let mut router = Router::new(MemoryStore::new());
        assert_eq!(router.store_value(b" 7\r\n").unwrap(), "7");
        assert_eq!(router.store().read_current().as_deref(), Some("7"));
    }

    #[test]
    fn values_are_normalized() {
        assert_eq!(normalize_value(b"  a\r\nb \n"), "a  b");
        assert_eq!(normalize_value(b"\xFFok"), "\u{FFFD}ok");

        let mut router = Router::new(MemoryStore::new());
        router.route(PUT, "sensor", b"line1\nline2\n");
        assert_eq!(router.route(GET, "sensor", b"").body, b"line1 line2");
    }

    #[test]
    fn datagram_con_gets_ack() {
        let mut router = Router::new(MemoryStore::new());
        let inbound = request(MsgType::Con, PUT, &[1, 2, 3], &["sensor"], b"hello");
        let mut outbound = [0u8; MAX_DATAGRAM_LEN];

        let len = router.handle_datagram(&inbound, &mut outbound).unwrap();
        let response = MessageParser::new(&outbound[..len]).unwrap();

        assert_eq!(response.msg_type(), MsgType::Ack);
        assert_eq!(response.msg_code(), Some(MsgCode::SuccessChanged));
        assert_eq!(response.msg_id(), 0x4321);
        assert_eq!(response.msg_token(), MsgToken::new(&[1, 2, 3]));
        assert_eq!(response.content_format(), Some(ContentFormat::TEXT_PLAIN_UTF8));
        assert_eq!(response.payload(), b"UPDATED");
    }

    #[test]
    fn datagram_non_gets_non() {
        let mut router = Router::new(MemoryStore::new());
        let inbound = request(MsgType::Non, GET, &[], &["sensor"], b"");
        let mut outbound = [0u8; MAX_DATAGRAM_LEN];

        let len = router.handle_datagram(&inbound, &mut outbound).unwrap();
        let response = MessageParser::new(&outbound[..len]).unwrap();

        assert_eq!(response.msg_type(), MsgType::Non);
        assert_eq!(response.payload(), b"NO_DATA");
    }

    #[test]
    fn multi_segment_path() {
        let mut router = Router::new(MemoryStore::new());
        let inbound = request(MsgType::Con, GET, &[9], &["sensor", "x"], b"");
        let mut outbound = [0u8; MAX_DATAGRAM_LEN];

        let len = router.handle_datagram(&inbound, &mut outbound).unwrap();
        let response = MessageParser::new(&outbound[..len]).unwrap();
        assert_eq!(response.msg_code(), Some(MsgCode::ClientErrorNotFound));
    }

    #[test]
    fn bad_version_is_dropped() {
        let mut router = Router::new(MemoryStore::new());
        let mut inbound = request(MsgType::Con, PUT, &[], &["sensor"], b"v");
        inbound[0] = (inbound[0] & 0x3F) | 0x80;
        let mut outbound = [0u8; MAX_DATAGRAM_LEN];

        assert_eq!(
            router.handle_datagram(&inbound, &mut outbound),
            Err(Error::Parse(ParseError::UnsupportedVersion))
        );
        assert!(outbound.iter().all(|&b| b == 0));
        assert!(router.store().history().is_empty());
    }

    #[test]
    fn truncated_length_extension_is_dropped() {
        let mut router = Router::new(MemoryStore::new());
        // Uri-Path with length nibble 14 and only one of its two extension bytes.
        let inbound = [0x40, GET, 0x00, 0x01, 0xBE, 0x01];
        let mut outbound = [0u8; MAX_DATAGRAM_LEN];

        assert_eq!(
            router.handle_datagram(&inbound, &mut outbound),
            Err(Error::Parse(ParseError::MalformedOption))
        );
    }

    #[test]
    fn short_datagram_is_dropped() {
        let mut router = Router::new(MemoryStore::new());
        let mut outbound = [0u8; MAX_DATAGRAM_LEN];
        assert_eq!(
            router.handle_datagram(&[0x40, 0x01], &mut outbound),
            Err(Error::Parse(ParseError::TooShort))
        );
    }

    #[test]
    fn response_too_large_is_dropped() {
        let mut router = Router::new(MemoryStore::new());
        let inbound = request(MsgType::Con, GET, &[0; 8], &["sensor"], b"");
        let mut outbound = [0u8; 16];

        assert_eq!(
            router.handle_datagram(&inbound, &mut outbound),
            Err(Error::BufferTooSmall)
        );
    }
}
