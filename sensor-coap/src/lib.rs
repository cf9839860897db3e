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

//! A minimal implementation of the Constrained Application Protocol (CoAP) message format,
//! together with the request router used by the sensor gateway.
//!
//! This crate is deliberately small. It understands just enough of [RFC7252] to serve a
//! handful of plain-text resources:
//!
//! * [`message::MessageParser`] validates an inbound datagram and extracts the header, token,
//!   Uri-Path and payload.
//! * [`message::BufferMessageEncoder`] writes messages into a caller-supplied, bounded buffer.
//!   Every write is capacity-checked.
//! * [`Router`] dispatches `GET /sensor`, `PUT /sensor` and `POST /echo` against a
//!   [`StateStore`], which owns the persisted "current value" and its history.
//!
//! Networking lives in the `sensor-coap-tokio` crate.
//!
//! ## Example
//!
//! ```
//! use sensor_coap::{MemoryStore, Router};
//! use sensor_coap::message::{BufferMessageEncoder, MessageParser, MsgCode, MsgToken, MsgType};
//! use sensor_coap::option::OptionNumber;
//!
//! let mut router = Router::new(MemoryStore::new());
//!
//! // Build a `PUT /sensor` request carrying "21.5".
//! let mut request = [0u8; 64];
//! let mut encoder = BufferMessageEncoder::new(&mut request).unwrap();
//! encoder.set_msg_type(MsgType::Con);
//! encoder.set_msg_code(MsgCode::MethodPut);
//! encoder.set_msg_id(0x1234);
//! encoder.set_msg_token(MsgToken::new(&[0xAB])).unwrap();
//! encoder.insert_option(OptionNumber::URI_PATH, b"sensor").unwrap();
//! encoder.append_payload(b"21.5").unwrap();
//! let request_len = encoder.len();
//!
//! let mut response = [0u8; 64];
//! let len = router.handle_datagram(&request[..request_len], &mut response).unwrap();
//!
//! let parsed = MessageParser::new(&response[..len]).unwrap();
//! assert_eq!(parsed.msg_type(), MsgType::Ack);
//! assert_eq!(parsed.msg_code(), Some(MsgCode::SuccessChanged));
//! assert_eq!(parsed.payload(), b"UPDATED");
//! ```
//!
//! [RFC7252]: https://tools.ietf.org/html/rfc7252

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;

pub mod message;
pub mod option;

mod content_format;
pub use content_format::ContentFormat;

pub mod consts;
#[doc(hidden)]
pub use consts::*;

mod error;
pub use error::*;

mod util;
use util::*;

mod router;
pub use router::*;

pub mod store;
pub use store::{FileStore, MemoryStore, StateStore};

use message::*;
use option::*;
