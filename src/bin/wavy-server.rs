// ABOUTME: HTTP server binary for the WAVY nutrition planner API
// ABOUTME: Loads environment configuration, opens the database, and serves the REST routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 WAVY.ai

#![recursion_limit = "256"]

//! # WAVY Nutrition API Server Binary
//!
//! ```bash
//! PORT=8080 OPENAI_API_KEY=sk-... wavy-server
//! wavy-server --port 9000 --host 127.0.0.1
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use wavy_nutrition::{config::ServerConfig, logging, resources::ServerResources, server};

#[derive(Parser)]
#[command(name = "wavy-server")]
#[command(about = "WAVY nutrition planner - patient directory, meal plans, and procurement API")]
pub struct Args {
    /// Override the HTTP port (PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Override the bind host (HOST)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    info!("Starting WAVY nutrition API");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::from_config(config).await?);

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
