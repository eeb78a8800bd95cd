//! loadcontrol-demo - a paged comment feed scrolled by a scripted user.
//!
//! The feed is served from an embedded fixture, rendered into a simulated table, and every
//! load-more transition is logged. The final state is printed as JSON on stdout.
//!
//! `RUST_LOG=loadcontrol=debug` shows the control's own decisions.

use anyhow::{Context, Result};
use clap::Parser;
use loadcontrol::Direction;

mod feed;
mod session;
mod table;


use feed::CommentSource;
use session::{Session, SessionConfig};

/// Scripted infinite-scroll session over a paged comment feed
#[derive(Parser, Debug)]
#[command(name = "loadcontrol-demo")]
#[command(about = "Drives a load-more control through a scripted scroll session", long_about = None)]
struct Cli {
    /// Pages the feed can serve
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,

    /// Comments per page
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: u32,

    /// Row extent along the scroll axis, in points
    #[arg(long, default_value_t = 88.0)]
    row_height: f32,

    /// Viewport extent along the scroll axis, in points
    #[arg(long, default_value_t = 812.0)]
    viewport: f32,

    /// Scroll and load horizontally
    #[arg(long)]
    horizontal: bool,

    /// Start loading this many points before the end
    #[arg(long, default_value_t = 0.0)]
    trigger_offset: f32,

    /// Stop asking for pages after this many
    #[arg(long)]
    max_pages: Option<u32>,

    /// Simulated network latency per page
    #[arg(long, default_value_t = 500)]
    latency_ms: u64,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            row_height: self.row_height,
            viewport: self.viewport,
            direction: if self.horizontal {
                Direction::Horizontal
            } else {
                Direction::Vertical
            },
            trigger_offset: self.trigger_offset,
            max_pages: self.max_pages,
            latency_ms: self.latency_ms,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if !(cli.row_height > 0.0 && cli.viewport > 0.0) {
        anyhow::bail!("--row-height and --viewport must be positive");
    }

    let source = CommentSource::embedded(cli.pages, cli.page_size)
        .context("failed to load the comment fixture")?;
    let report = Session::new(cli.session_config(), source)
        .run()
        .context("scripted session failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
