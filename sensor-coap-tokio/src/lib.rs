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

//! This crate puts [`sensor_coap`] on the network using [Tokio][]:
//!
//! * [`CoapServer`] runs the sequential receive, process and respond loop for a
//!   [`Router`](sensor_coap::Router) on one UDP socket.
//! * [`CoapClient`] performs single confirmable request/response exchanges with a timeout.
//! * [`ServerConfig`] and [`StoreConfig`] describe how the `sensor-coap-server` binary is
//!   set up.
//!
//! # Example
//!
//! ```no_run
//! use sensor_coap::{MemoryStore, Router};
//! use sensor_coap_tokio::{shutdown_channel, ClientRequest, CoapClient, CoapServer};
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = CoapServer::bind("127.0.0.1:0", Router::new(MemoryStore::new())).await?;
//!     let addr = server.local_addr()?;
//!
//!     let (trigger, signal) = shutdown_channel();
//!     let running = tokio::spawn(server.run(signal));
//!
//!     let client = CoapClient::connect(addr, Duration::from_secs(2)).await?;
//!     let response = client.send(&ClientRequest::put("sensor", "21.5")).await?;
//!     assert_eq!(response.payload_as_str(), "UPDATED");
//!
//!     trigger.trigger();
//!     running.await??;
//!     Ok(())
//! }
//! ```
//!
//! [Tokio]: https://tokio.rs/

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;

mod shutdown;
pub use shutdown::*;

mod server;
pub use server::CoapServer;

mod client;
pub use client::*;

mod config;
pub use config::*;
