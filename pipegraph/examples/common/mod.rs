// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Common setup shared across examples.

/// Initializes logging and the framework for an example run.
///
/// Logging goes to stdout with an INFO level filter, respecting the
/// `RUST_LOG` environment variable; the framework is initialized afterwards
/// so its own log integration is already in place.
pub fn init() -> Result<(), pipegraph::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
    gstreamer::init()?;
    Ok(())
}
