//! Serverless proxy local invoker.
//!
//! Runs one platform event through the full adapter → filter chain → dispatch pipeline
//! and prints the native reply, standing in for the host runtime.
//!
//! ```text
//! serverless-proxy invoke --platform api-gateway --event event.json
//! cat event.json | serverless-proxy invoke --platform request-object --event -
//! ```
//!
//! The dispatch engine is a small echo application: every request is answered with a JSON
//! description of what the application received.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, Uri},
    Json, Router,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};

use serverless_proxy::config::{load_config, load_from_env};
use serverless_proxy::observability::logging::init_logging;
use serverless_proxy::platform::HttpRequestMessage;
use serverless_proxy::{
    ApiGatewayAdapter, Invoker, LazyFacade, ProxyBuilder, ProxyConfig, RequestObjectAdapter,
};

#[derive(Parser)]
#[command(name = "serverless-proxy")]
#[command(about = "Run FaaS events through the serverless web proxy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke the echo application with one native event
    Invoke {
        /// Event shape
        #[arg(short, long, value_enum)]
        platform: Platform,

        /// Event JSON file, or `-` for stdin
        #[arg(short, long)]
        event: String,

        /// Configuration file (defaults to $SERVERLESS_PROXY_CONFIG, then built-in defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Platform {
    ApiGateway,
    RequestObject,
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: Vec<Value> = headers
        .iter()
        .map(|(name, value)| json!([name.as_str(), String::from_utf8_lossy(value.as_bytes())]))
        .collect();
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

fn echo_app() -> Router {
    Router::new().fallback(echo)
}

fn read_event(source: &str) -> io::Result<Vec<u8>> {
    if source == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(source)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Invoke {
            platform,
            event,
            config,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => load_from_env()?,
            };
            init_logging(&config.observability);
            tracing::info!("serverless-proxy v{} invoking", env!("CARGO_PKG_VERSION"));

            let input = read_event(&event)?;
            let facade = Arc::new(facade_for(config.clone()));

            let output = match platform {
                Platform::ApiGateway => {
                    Invoker::new(ApiGatewayAdapter::new(&config.api_gateway), facade)
                        .invoke_json(&input)?
                }
                Platform::RequestObject => {
                    let message: HttpRequestMessage = serde_json::from_slice(&input)?;
                    let invoker =
                        Invoker::new(RequestObjectAdapter::new(&config.request_object), facade);
                    serde_json::to_vec(&invoker.invoke(message)?)?
                }
            };

            let reply: Value = serde_json::from_slice(&output)?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }

    Ok(())
}

fn facade_for(config: ProxyConfig) -> LazyFacade {
    LazyFacade::new(move || ProxyBuilder::new(config.clone()).build_router(echo_app()))
}
