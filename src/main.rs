mod aggregate;
mod batch;
mod error;
mod fetch;
mod matcher;
mod model;
mod output;
mod parser;
mod pipeline;
mod query;
mod search;
mod settings;
mod source;
#[cfg(test)]
mod testutil;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;

use batch::{DelayPolicy, Pacer, TokioSleeper};
use fetch::{HttpFetcher, InteractiveLogin, LoginGate, PresetCookie};
use pipeline::RunState;
use search::TargetSession;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "genealogy_scraper",
    about = "Match family-tree records against statutory death registers"
)]
struct Cli {
    /// First source page to process
    #[arg(default_value_t = 1)]
    start_page: u32,
    /// Last source page to process (inclusive)
    #[arg(default_value_t = 5)]
    end_page: u32,
    /// Max target searches per page (0 = no cap)
    #[arg(short = 'n', long)]
    limit: Option<usize>,
    /// Only scrape the source pages and save the people found
    #[arg(long)]
    source_only: bool,
    /// Directory for output files
    #[arg(short = 'o', long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    if cli.start_page < 1 {
        bail!("start page must be at least 1");
    }
    if cli.start_page > cli.end_page {
        bail!("start page {} is after end page {}", cli.start_page, cli.end_page);
    }

    let mut settings = Settings::load()?;
    if let Some(limit) = cli.limit {
        settings.max_searches_per_page = limit;
    }
    if let Some(dir) = cli.out_dir {
        settings.output_dir = dir;
    }
    std::fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("Failed to create {}", settings.output_dir.display()))?;

    let pages = cli.start_page..=cli.end_page;
    let pacer = Pacer::new(DelayPolicy::from_settings(&settings), TokioSleeper);
    let mut source = HttpFetcher::new(&settings.user_agent)?;
    let mut state = RunState::default();

    let result = if cli.source_only {
        println!("Scraping source pages {} to {}", cli.start_page, cli.end_page);
        pipeline::run_source_only(&mut state, &settings, pages, &mut source, &pacer).await
    } else {
        println!(
            "Integrated run over source pages {} to {}, up to {} searches per page",
            cli.start_page,
            cli.end_page,
            match settings.max_searches_per_page {
                0 => "unlimited".to_string(),
                n => n.to_string(),
            }
        );
        let mut session = TargetSession::new(HttpFetcher::new(&settings.user_agent)?, &settings);
        let mut gate: Box<dyn LoginGate> = match settings.session_cookie.clone() {
            Some(cookie) => Box::new(PresetCookie(cookie)),
            None => Box::new(InteractiveLogin::stdio()),
        };
        pipeline::run_integrated(
            &mut state,
            &settings,
            pages,
            &mut source,
            &mut session,
            &mut gate,
            &pacer,
        )
        .await
    };

    let summary = state.summary();
    summary.print();
    if !cli.source_only {
        pipeline::save_summary(&summary, &settings);
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
