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

use sensor_coap::message::{
    BufferMessageEncoder, CoapByteDisplayFormatter, DottedCode, MessageParser, MsgCode, MsgId,
    MsgToken, MsgType,
};
use sensor_coap::option::OptionNumber;
use sensor_coap::{ContentFormat, ParseError, MAX_DATAGRAM_LEN};
use std::borrow::Cow;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{lookup_host, ToSocketAddrs, UdpSocket};

/// Errors reported by [`CoapClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Socket setup, send or receive failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No response with the request's token arrived in time.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The request could not be encoded into a single datagram.
    #[error("unable to encode request: {0}")]
    Encode(#[from] sensor_coap::Error),

    /// The server sent a datagram that is not a valid CoAP message.
    #[error("unable to parse response: {0}")]
    Parse(#[from] ParseError),
}

/// A request to send with [`CoapClient::send`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ClientRequest {
    /// Request method.
    pub method: MsgCode,

    /// Resource path. Each `/`-separated segment becomes one Uri-Path option.
    pub path: String,

    /// Request body. Sent only if not empty.
    pub payload: Vec<u8>,

    /// Optional Content-Format of the body.
    pub content_format: Option<ContentFormat>,
}

impl ClientRequest {
    /// Creates a request with an empty body.
    pub fn new(method: MsgCode, path: impl Into<String>) -> ClientRequest {
        ClientRequest {
            method,
            path: path.into(),
            payload: Vec::new(),
            content_format: None,
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> ClientRequest {
        Self::new(MsgCode::MethodGet, path)
    }

    /// Creates a POST request carrying `payload`.
    pub fn post(path: impl Into<String>, payload: impl Into<Vec<u8>>) -> ClientRequest {
        Self::new(MsgCode::MethodPost, path).with_payload(payload)
    }

    /// Creates a PUT request carrying `payload`.
    pub fn put(path: impl Into<String>, payload: impl Into<Vec<u8>>) -> ClientRequest {
        Self::new(MsgCode::MethodPut, path).with_payload(payload)
    }

    /// Replaces the body.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> ClientRequest {
        self.payload = payload.into();
        self
    }

    /// Sets the Content-Format option.
    pub fn with_content_format(mut self, content_format: ContentFormat) -> ClientRequest {
        self.content_format = Some(content_format);
        self
    }

    /// Encodes this request as a `CON` message into `buffer`, returning its length.
    pub fn encode(
        &self,
        msg_id: MsgId,
        token: MsgToken,
        buffer: &mut [u8],
    ) -> Result<usize, sensor_coap::Error> {
        let mut encoder = BufferMessageEncoder::new(buffer)?;
        encoder.set_msg_type(MsgType::Con);
        encoder.set_msg_code(self.method);
        encoder.set_msg_id(msg_id);
        encoder.set_msg_token(token)?;

        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            encoder.insert_option(OptionNumber::URI_PATH, segment.as_bytes())?;
        }

        if let Some(content_format) = self.content_format {
            encoder.insert_option_with_u16(OptionNumber::CONTENT_FORMAT, content_format.0)?;
        }

        encoder.append_payload(&self.payload)?;
        Ok(encoder.len())
    }
}

/// A response received by [`CoapClient::send`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ClientResponse {
    /// Message type, normally `ACK`.
    pub msg_type: MsgType,

    /// Raw response code.
    pub code: u8,

    /// Message id of the response.
    pub msg_id: MsgId,

    /// Token, equal to the request's token.
    pub token: MsgToken,

    /// Content-Format option, if present.
    pub content_format: Option<ContentFormat>,

    /// Response body.
    pub payload: Vec<u8>,
}

impl ClientResponse {
    fn from_message(msg: &MessageParser<'_>) -> ClientResponse {
        ClientResponse {
            msg_type: msg.msg_type(),
            code: msg.code(),
            msg_id: msg.msg_id(),
            token: msg.msg_token(),
            content_format: msg.content_format(),
            payload: msg.payload().to_vec(),
        }
    }

    /// The response code, if it is one this crate knows.
    pub fn msg_code(&self) -> Option<MsgCode> {
        MsgCode::try_from(self.code)
    }

    /// The response code in `class.detail` form.
    pub fn dotted_code(&self) -> DottedCode {
        DottedCode(self.code)
    }

    /// The body as text, lossily decoded.
    pub fn payload_as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Sends requests to one CoAP server and waits for the matching responses.
#[derive(Debug)]
pub struct CoapClient {
    socket: UdpSocket,
    peer: SocketAddr,
    timeout: Duration,
}

impl CoapClient {
    /// Resolves `peer` and binds a local socket connected to it. Each exchange waits at
    /// most `timeout` for its response.
    pub async fn connect<A: ToSocketAddrs>(
        peer: A,
        timeout: Duration,
    ) -> Result<CoapClient, ClientError> {
        let peer = lookup_host(peer).await?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "Address lookup failed")
        })?;

        let local: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;

        Ok(CoapClient {
            socket,
            peer,
            timeout,
        })
    }

    /// Address of the server.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Sends `request` with a random message id and a random four-byte token, then waits
    /// for a response carrying the same token.
    ///
    /// Responses with another token are ignored. There is no retransmission.
    pub async fn send(&self, request: &ClientRequest) -> Result<ClientResponse, ClientError> {
        let msg_id: MsgId = rand::random();
        let token = MsgToken::from(rand::random::<u32>());

        let mut outbound = [0u8; MAX_DATAGRAM_LEN];
        let len = request.encode(msg_id, token, &mut outbound)?;
        debug!(
            "OUTBOUND to {}: {}",
            self.peer,
            CoapByteDisplayFormatter(&outbound[..len])
        );
        self.socket.send(&outbound[..len]).await?;

        tokio::time::timeout(self.timeout, self.receive_response(token))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
    }

    async fn receive_response(&self, token: MsgToken) -> Result<ClientResponse, ClientError> {
        let mut inbound = [0u8; MAX_DATAGRAM_LEN];

        loop {
            let len = self.socket.recv(&mut inbound).await?;
            let datagram = &inbound[..len];
            debug!("INBOUND from {}: {}", self.peer, CoapByteDisplayFormatter(datagram));

            let msg = MessageParser::new(datagram)?;
            if msg.msg_token() == token {
                return Ok(ClientResponse::from_message(&msg));
            }

            debug!("Ignoring response with token {}, expected {}", msg.msg_token(), token);
        }
    }
}
