//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and decide the network capability once
//! - Build the resolver and processor, then dispatch to a command handler
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers read their sources through the
//! [`crate::input::Resolver`], assemble a [`crate::request::ProcessingRequest`]
//! and hand the result to [`crate::ui::output`]. Each invocation runs on a
//! single-threaded tokio runtime.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::{debug, Level};

use crate::core::config::Config;
use crate::input::{network_fetcher, Resolver};
use crate::processor::basic::BasicProcessor;
use crate::processor::{DocumentLoader, Processor};
use commands::CommandContext;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args()?;

    if cli.debug {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = Config::load()?;
    debug!(path = ?config.path(), "configuration loaded");

    let network = config.network_enabled() && !cli.offline;
    let fetcher = network_fetcher(network, &config.user_agent())
        .context("failed to initialize network access")?;
    debug!(
        network = fetcher.is_some(),
        encoding = %config.encoding(),
        "input capabilities"
    );

    let mut resolver = Resolver::new(config.encoding());
    if let Some(fetcher) = fetcher {
        resolver = resolver.with_fetcher(fetcher);
    }
    let resolver = Arc::new(resolver);

    let loader: Arc<dyn DocumentLoader> = resolver.clone();
    let processor: Arc<dyn Processor> = Arc::new(BasicProcessor::with_loader(loader));

    let ctx = CommandContext {
        resolver,
        processor,
        config,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runtime.block_on(commands::dispatch(cli.command, &ctx, &mut out))
}
