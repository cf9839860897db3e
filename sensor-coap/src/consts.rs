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

//! Module defining various CoAP-related constants.

/// The standard default IP port number used for CoAP-over-UDP.
pub const DEFAULT_PORT_COAP_UDP: u16 = 5683;

/// The only protocol version defined by RFC7252.
pub const COAP_VERSION: u8 = 1;

/// Size of the fixed message header: version/type/token-length, code, and message id.
pub const COAP_HEADER_LEN: usize = 4;

/// The largest token length permitted by RFC7252.
pub const MAX_TOKEN_LEN: usize = 8;

/// Byte separating the options from the payload.
pub const PAYLOAD_MARKER: u8 = 0xFF;

/// Size of the inbound and outbound datagram buffers. Matches a typical Ethernet MTU.
pub const MAX_DATAGRAM_LEN: usize = 1500;

/// Resource path for reading and updating the sensor state.
pub const PATH_SENSOR: &str = "sensor";

/// Resource path for the echo-and-store resource.
pub const PATH_ECHO: &str = "echo";

/// Body returned by `GET /sensor` when nothing has been stored yet.
pub const BODY_NO_DATA: &str = "NO_DATA";

/// Body returned by `PUT /sensor` on success.
pub const BODY_UPDATED: &str = "UPDATED";

/// Body returned by `POST /echo` when the store could not be written.
pub const BODY_WRITE_FAIL: &str = "WRITE_FAIL";

/// Body returned by `PUT /sensor` when the store could not be written.
pub const BODY_UPDATE_FAIL: &str = "UPDATE_FAIL";

/// Body returned for an unknown resource path.
pub const BODY_NOT_FOUND: &str = "NOT_FOUND";

/// Body returned when a known resource does not support the requested method.
pub const BODY_METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";

/// Prefix prepended to the stored value in the `POST /echo` response.
pub const ECHO_PREFIX: &str = "echo: ";

/// Marker preceding the value in a history line.
pub const HISTORY_VALUE_TAG: &str = "payload=";
