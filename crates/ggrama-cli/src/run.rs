//! One `ggrama` invocation: configuration, input, generation, output.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use ggrama_config::{ConfigResolver, StandardDirs};
use ggrama_core::GenerationPipeline;
use ggrama_llm::BackendFactory;

use crate::cli::Cli;
use crate::{input, output};

/// Resources shipped with the binary.
///
/// Looked up next to the executable (`resources/`), then in an install prefix
/// (`../share/ggrama`), then in the source tree for development builds.
pub fn bundled_resources_dir() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
    {
        candidates.push(exe_dir.join("resources"));
        candidates.push(exe_dir.join("..").join("share").join("ggrama"));
    }
    candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources"));

    candidates.into_iter().find(|dir| dir.is_dir())
}

pub async fn run(cli: Cli) -> Result<()> {
    let request = input::assemble(&cli.prompt, cli.input.as_deref())?;

    let bundled = bundled_resources_dir();
    debug!("Bundled resources: {:?}", bundled);
    let config = ConfigResolver::discover(&StandardDirs::system(bundled))
        .resolve(&cli.config_files, &cli.to_overrides())
        .context("failed to load configuration")?;
    debug!("Effective configuration: {:?}", config);

    let mut factory = BackendFactory::from_config(&config);
    if let Some(secs) = cli.timeout {
        factory = factory.with_timeout(Duration::from_secs(secs));
    }

    let value = GenerationPipeline::new(config, factory).run(&request).await?;

    output::emit(cli.output.as_deref(), &value)
}
