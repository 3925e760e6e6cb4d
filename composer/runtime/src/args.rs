use crate::{
    batch::{self, RenderOptions},
    input, log,
    render::{Format, Mode},
};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Parser)]
#[clap(
    name = "service-composer",
    about = "Composes EventDrivenService claims into Kubernetes resources"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "service_composer=info,warn",
        env = "SERVICE_COMPOSER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    /// The time budget of each composition, in milliseconds. `0` disables the deadline.
    #[clap(long, default_value = "5000")]
    deadline_ms: u64,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Composes claims and prints the resulting resources.
    Render(RenderArgs),

    /// Validates claims without composing them.
    Validate(ValidateArgs),
}

#[derive(Debug, clap::Args)]
struct RenderArgs {
    /// Claim files. Reads standard input when none are given or for `-`.
    files: Vec<PathBuf>,

    #[clap(long, value_enum, default_value_t)]
    mode: Mode,

    #[clap(long, value_enum, default_value_t)]
    format: Format,

    /// The provider config referenced by wrapped objects.
    #[clap(long, env = "SERVICE_COMPOSER_PROVIDER_CONFIG")]
    provider_config: Option<String>,
}

#[derive(Debug, clap::Args)]
struct ValidateArgs {
    /// Claim files. Reads standard input when none are given or for `-`.
    files: Vec<PathBuf>,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            deadline_ms,
            command,
        } = self;

        log::init(log_format, log_level)?;

        let budget = deadline_budget(deadline_ms);
        let failures = match command {
            Command::Render(args) => args.run(budget).await?,
            Command::Validate(args) => args.run().await?,
        };
        if failures > 0 {
            bail!("{failures} claim(s) failed");
        }
        Ok(())
    }
}

// === impl RenderArgs ===

impl RenderArgs {
    async fn run(self, budget: Option<Duration>) -> Result<usize> {
        let Self {
            files,
            mode,
            format,
            provider_config,
        } = self;

        let sources = input::read_sources(&files).await?;
        let options = RenderOptions {
            mode,
            format,
            provider_config,
            budget,
        };
        batch::render_sources(
            &sources,
            &options,
            &mut std::io::stdout(),
            &mut std::io::stderr(),
        )
        .await
    }
}

// === impl ValidateArgs ===

impl ValidateArgs {
    async fn run(self) -> Result<usize> {
        let sources = input::read_sources(&self.files).await?;
        batch::validate_sources(&sources, &mut std::io::stdout(), &mut std::io::stderr())
    }
}

fn deadline_budget(deadline_ms: u64) -> Option<Duration> {
    (deadline_ms > 0).then(|| Duration::from_millis(deadline_ms))
}
