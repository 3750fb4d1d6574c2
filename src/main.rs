use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use notion_upload::config::Config;
use notion_upload::notion::NotionClient;
use notion_upload::{Limits, parse_and_partition};

#[derive(Parser)]
#[command(name = "notion-upload")]
#[command(about = "Upload Markdown files to Notion pages")]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// Title for the Notion page (defaults to the file stem)
    #[arg(short, long)]
    title: Option<String>,

    /// Override the database ID from config/environment
    #[arg(long)]
    database_id: Option<String>,

    /// Settings file
    #[arg(long, default_value = "notion-upload.toml")]
    config: PathBuf,

    /// Show the page layout without uploading anything
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let markdown = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let title = cli.title.clone().unwrap_or_else(|| {
        cli.input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    });

    let groups = parse_and_partition(&markdown, &Limits::default());
    let total: usize = groups.iter().map(Vec::len).sum();
    info!(blocks = total, pages = groups.len().max(1), "converted document");

    if cli.dry_run {
        for (n, group) in groups.iter().enumerate() {
            println!("page part {}: {} blocks", n + 1, group.len());
        }
        return Ok(());
    }

    let credentials = Config::load(&cli.config).resolve(cli.database_id)?;
    let client = NotionClient::new(credentials);
    let handle = client.upload(&title, &groups).await?;

    println!("Created {}", handle.url());
    Ok(())
}
