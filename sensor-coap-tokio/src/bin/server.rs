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

//! CoAP server for the sensor gateway.
//!
//! # Usage
//!
//! ```bash
//! # Store state under /opt/coap (or $COAP_CURRENTFILE / $COAP_DATAFILE)
//! sensor-coap-server --bind 0.0.0.0:5683
//!
//! # Keep state in memory only
//! sensor-coap-server --memory --log-level debug
//! ```

use clap::Parser;
use log::{error, info};
use sensor_coap::Router;
use sensor_coap_tokio::{
    shutdown_channel, CoapServer, ServerConfig, StoreConfig, DEFAULT_CURRENT_FILE,
    DEFAULT_HISTORY_FILE,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Minimal CoAP server for sensor readings
#[derive(Parser, Debug)]
#[command(name = "sensor-coap-server")]
#[command(about = "Serves GET/PUT /sensor and POST /echo over CoAP")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:5683")]
    bind: String,

    /// File holding the current value
    #[arg(long, env = "COAP_CURRENTFILE", default_value = DEFAULT_CURRENT_FILE)]
    current_file: PathBuf,

    /// Append-only history file
    #[arg(long, env = "COAP_DATAFILE", default_value = DEFAULT_HISTORY_FILE)]
    data_file: PathBuf,

    /// Keep state in memory instead of files
    #[arg(long)]
    memory: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> ServerConfig {
        let store = if self.memory {
            StoreConfig::Memory
        } else {
            StoreConfig::Files {
                current: self.current_file.clone(),
                history: self.data_file.clone(),
            }
        };

        ServerConfig {
            bind: self.bind.clone(),
            store,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = args.config();
    info!("Sensor CoAP server starting");
    info!("Store: {}", config.store);

    let server = CoapServer::bind(config.bind.as_str(), Router::new(config.store.open()))
        .await
        .map_err(|e| {
            error!("Unable to bind {}: {}", config.bind, e);
            e
        })?;

    info!("Listening on {}", server.local_addr()?);

    let (trigger, signal) = shutdown_channel();
    tokio::spawn(async move {
        match wait_for_termination().await {
            Ok(()) => {
                info!("Shutdown requested");
                trigger.trigger();
            }
            Err(e) => error!("Unable to listen for termination signals: {}", e),
        }
    });

    server.run(signal).await?;

    Ok(())
}

#[cfg(unix)]
async fn wait_for_termination() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
