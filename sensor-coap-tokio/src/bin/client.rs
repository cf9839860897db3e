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

//! Command-line CoAP client for the sensor gateway.
//!
//! # Usage
//!
//! ```bash
//! # Read the current value
//! sensor-coap-client --host 127.0.0.1 --path sensor
//!
//! # Echo and store a text value
//! sensor-coap-client --method post --path echo --data hello
//!
//! # Report a distance reading every 5 seconds, like the ultrasonic sensor node
//! sensor-coap-client --distance 42.7 --interval 5 --count 0
//! ```

use clap::{Parser, ValueEnum};
use log::debug;
use sensor_coap::message::MsgCode;
use sensor_coap::{ContentFormat, DEFAULT_PORT_COAP_UDP};
use sensor_coap_tokio::{ClientError, ClientRequest, CoapClient};
use serde_json::json;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }

    fn code(self) -> MsgCode {
        match self {
            Method::Get => MsgCode::MethodGet,
            Method::Post => MsgCode::MethodPost,
            Method::Put => MsgCode::MethodPut,
        }
    }
}

/// Minimal CoAP client for the sensor gateway
#[derive(Parser, Debug)]
#[command(name = "sensor-coap-client")]
#[command(version)]
struct Args {
    /// Server host name or IP address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server UDP port
    #[arg(long, default_value_t = DEFAULT_PORT_COAP_UDP)]
    port: u16,

    /// Request method [default: GET, or PUT when a body is given]
    #[arg(short, long, value_enum, ignore_case = true)]
    method: Option<Method>,

    /// Resource path, such as `sensor` or `echo`
    #[arg(long, default_value = "sensor")]
    path: String,

    /// Text payload
    #[arg(short, long, conflicts_with_all = ["distance", "temperature"])]
    data: Option<String>,

    /// Send a distance reading in centimeters as JSON
    #[arg(long, conflicts_with = "temperature")]
    distance: Option<f64>,

    /// Send a temperature reading in degrees Celsius as JSON
    #[arg(long)]
    temperature: Option<f64>,

    /// Seconds to wait for each response
    #[arg(long, default_value_t = 5.0)]
    timeout: f64,

    /// Repeat the request every INTERVAL seconds
    #[arg(long)]
    interval: Option<f64>,

    /// Number of requests to send with --interval (0 means forever)
    #[arg(long, default_value_t = 1)]
    count: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn body(&self) -> Option<(String, Option<ContentFormat>)> {
        let json = ContentFormat::APPLICATION_JSON;
        if let Some(d) = self.distance {
            Some((json!({ "d": d, "unit": "cm" }).to_string(), Some(json)))
        } else if let Some(t) = self.temperature {
            Some((json!({ "t": t, "unit": "C" }).to_string(), Some(json)))
        } else {
            self.data.clone().map(|data| (data, None))
        }
    }

    fn method(&self) -> Method {
        match self.method {
            Some(method) => method,
            None if self.body().is_some() => Method::Put,
            None => Method::Get,
        }
    }

    fn request(&self) -> ClientRequest {
        let method = self.method();
        let body = self.body();

        let mut request = ClientRequest::new(method.code(), self.path.clone());
        // GET carries no body.
        if method != Method::Get {
            if let Some((payload, content_format)) = body {
                request = request.with_payload(payload);
                if let Some(content_format) = content_format {
                    request = request.with_content_format(content_format);
                }
            }
        }
        request
    }

    fn uri(&self) -> String {
        let path = self.path.trim_start_matches('/');
        if self.port == DEFAULT_PORT_COAP_UDP {
            format!("coap://{}/{}", self.host, path)
        } else {
            format!("coap://{}:{}/{}", self.host, self.port, path)
        }
    }
}

fn seconds(value: f64, name: &str) -> Result<Duration, String> {
    if value.is_finite() && value > 0.0 {
        Ok(Duration::from_secs_f64(value))
    } else {
        Err(format!("--{} must be a positive number of seconds", name))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let timeout = seconds(args.timeout, "timeout")?;
    let interval = args.interval.map(|i| seconds(i, "interval")).transpose()?;
    let count = if interval.is_some() { args.count } else { 1 };

    let request = args.request();
    let uri = args.uri();
    let method = args.method().as_str();
    debug!("Request: {:?}", request);

    let client = CoapClient::connect((args.host.as_str(), args.port), timeout).await?;

    let mut sent = 0u32;
    let mut ticker = interval.map(tokio::time::interval);
    loop {
        if let Some(ticker) = ticker.as_mut() {
            ticker.tick().await;
        }

        match client.send(&request).await {
            Ok(response) => println!(
                "[OK] {} {} -> {} | {}",
                method,
                uri,
                response.dotted_code(),
                response.payload_as_str()
            ),
            Err(ClientError::Timeout(t)) => {
                println!("[TIMEOUT] {} {} (>{}s)", method, uri, t.as_secs_f64())
            }
            Err(e) => println!("[ERROR] {} {}: {}", method, uri, e),
        }

        sent += 1;
        if count != 0 && sent >= count {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("sensor-coap-client").chain(argv.iter().copied()))
    }

    #[test]
    fn get_by_default() {
        let args = args(&[]);
        assert_eq!(args.method(), Method::Get);
        assert_eq!(args.request(), ClientRequest::get("sensor"));
        assert_eq!(args.uri(), "coap://127.0.0.1/sensor");
    }

    #[test]
    fn distance_reading_is_json() {
        let args = args(&["--distance", "12.5", "--port", "5700"]);
        let request = args.request();
        assert_eq!(request.method, MsgCode::MethodPut);
        assert_eq!(request.payload, br#"{"d":12.5,"unit":"cm"}"#.to_vec());
        assert_eq!(request.content_format, Some(ContentFormat::APPLICATION_JSON));
        assert_eq!(args.uri(), "coap://127.0.0.1:5700/sensor");
    }

    #[test]
    fn temperature_reading_is_json() {
        let request = args(&["--temperature", "21.0", "-m", "POST", "--path", "echo"]).request();
        assert_eq!(request.method, MsgCode::MethodPost);
        assert_eq!(request.path, "echo");
        assert_eq!(request.payload, br#"{"t":21.0,"unit":"C"}"#.to_vec());
    }

    #[test]
    fn get_drops_data() {
        let request = args(&["--method", "get", "--data", "x"]).request();
        assert_eq!(request, ClientRequest::get("sensor"));
    }

    #[test]
    fn durations_must_be_positive() {
        assert_eq!(seconds(1.5, "timeout"), Ok(Duration::from_millis(1500)));
        assert!(seconds(0.0, "interval").is_err());
        assert!(seconds(f64::NAN, "timeout").is_err());
    }
}
