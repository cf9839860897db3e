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
use sensor_coap::message::CoapByteDisplayFormatter;
use sensor_coap::{Router, StateStore, MAX_DATAGRAM_LEN};
use std::io;
use std::net::SocketAddr;
use tokio::net::{ToSocketAddrs, UdpSocket};

/// A CoAP server that answers every request on one UDP socket, one datagram at a time.
///
/// Each datagram is parsed, routed and answered before the next one is received, so the
/// router and its store never see concurrent access.
#[derive(Debug)]
pub struct CoapServer<S> {
    socket: UdpSocket,
    router: Router<S>,
}

impl<S: StateStore> CoapServer<S> {
    /// Binds a UDP socket to `addr` for serving `router`.
    pub async fn bind<A: ToSocketAddrs>(addr: A, router: Router<S>) -> io::Result<CoapServer<S>> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(CoapServer { socket, router })
    }

    /// Local address of the bound socket.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Shared access to the router.
    pub fn router(&self) -> &Router<S> {
        &self.router
    }

    /// Serves requests until `shutdown` fires, then returns the router.
    ///
    /// Invalid datagrams, and datagrams longer than [`MAX_DATAGRAM_LEN`], are dropped without
    /// a reply. Receive and send errors are logged and do not stop the loop.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> io::Result<Router<S>> {
        // One spare byte so that a datagram truncated by `recv_from` is detectable.
        let mut inbound = [0u8; MAX_DATAGRAM_LEN + 1];
        let mut outbound = [0u8; MAX_DATAGRAM_LEN];

        info!("Serving CoAP on {}", self.socket.local_addr()?);

        loop {
            if shutdown.is_triggered() {
                break;
            }

            let (len, peer) = tokio::select! {
                _ = shutdown.triggered() => break,
                received = self.socket.recv_from(&mut inbound) => match received {
                    Ok(received) => received,
                    Err(e) => {
                        warn!("recv_from failed: {}", e);
                        continue;
                    }
                },
            };

            if len > MAX_DATAGRAM_LEN {
                debug!("Dropping datagram from {}: larger than {} bytes", peer, MAX_DATAGRAM_LEN);
                continue;
            }

            let datagram = &inbound[..len];
            debug!("INBOUND from {}: {}", peer, CoapByteDisplayFormatter(datagram));

            let response_len = match self.router.handle_datagram(datagram, &mut outbound) {
                Ok(response_len) => response_len,
                Err(_) => continue,
            };

            let response = &outbound[..response_len];
            debug!("OUTBOUND to {}: {}", peer, CoapByteDisplayFormatter(response));

            if let Err(e) = self.socket.send_to(response, peer).await {
                error!("send_to {} failed: {}", peer, e);
            }
        }

        info!("CoAP server stopped");
        Ok(self.router)
    }
}
