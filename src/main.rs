// Copyright 2026 Sitelens Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use sitelens::config::Config;
use sitelens::rest::{self, AppState};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let state = Arc::new(AppState::new());

    rest::serve(config.port, state).await
}
