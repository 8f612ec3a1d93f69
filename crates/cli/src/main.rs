// Copyright (C) 2025 Micah R Ledbetter
// SPDX-License-Identifier: Apache-2.0

//! This module is the entrypoint of the patronym command line.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

mod fetch;
mod joke;

/// Where the Pantheon dataset comes from, see
/// <https://pantheon.media.mit.edu/about/datasets>.
const PANTHEON_TSV_URL: &str = "https://pantheon.media.mit.edu/pantheon.tsv";

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InitMode {
    /// Assume the store is already initialized
    No,
    /// Initialize the store unless it already is
    Init,
    /// Drop the store, then initialize it
    Reinit,
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    #[clap(long, help = "Append a random sexting emoji")]
    emoji: bool,

    #[clap(
        long,
        value_enum,
        default_value_t = InitMode::No,
        help = "Dataset initialization mode"
    )]
    initialize: InitMode,

    #[clap(
        long,
        help = "Path to the sqlite store, created when initializing",
        value_name = "FILE"
    )]
    db: Option<PathBuf>,

    #[clap(long, help = "Path to the pantheon tsv dataset", value_name = "FILE")]
    tsv: Option<PathBuf>,

    #[clap(
        long,
        default_value = PANTHEON_TSV_URL,
        help = "Url to download the dataset from when the tsv is missing",
        value_name = "URL"
    )]
    tsv_url: String,

    #[clap(
        long,
        help = "Give up with an error after that many random draws",
        value_name = "COUNT"
    )]
    max_draws: Option<usize>,

    #[clap(long, help = "Post the joke to the status server")]
    post: bool,

    #[clap(long, help = "Check the status server credentials and exit")]
    test_access: bool,

    #[clap(
        long,
        env = "SALLYPAT_SERVER",
        help = "Status server url, also settable via $SALLYPAT_SERVER",
        value_name = "URL"
    )]
    server_url: Option<String>,

    #[clap(
        long,
        env = "SALLYPAT_ACCESS_TOKEN",
        hide_env_values = true,
        help = "Status server access token, also settable via $SALLYPAT_ACCESS_TOKEN",
        value_name = "TOKEN"
    )]
    access_token: Option<String>,

    #[clap(short, long, help = "Include debugging output")]
    verbose: bool,

    #[clap(
        help = "Quotify the string instead of drawing a random pantheon name",
        value_name = "STRING"
    )]
    string: Option<String>,
}

impl Cli {
    fn run(self) -> Result<()> {
        let agent = new_agent()?;

        if self.test_access {
            let client = publisher::Client::new(agent, &self.credentials()?)?;
            let account = client
                .verify_credentials()
                .context("Status server authentication failed")?;
            tracing::info!(
                account = account.acct.as_str(),
                "Status server authentication successful"
            );
            return Ok(());
        }

        // Resolve credentials before making the joke so a missing token
        // does not burn a random draw.
        let credentials = if self.post {
            Some(self.credentials()?)
        } else {
            None
        };

        let joek = match &self.string {
            Some(string) => quotify::quotify(string, self.emoji, "")?,
            None => self.random_joke(&agent)?,
        };

        println!("{}", joek);

        if let Some(credentials) = credentials {
            let client = publisher::Client::new(agent, &credentials)?;
            let status = client
                .post_status(&joek)
                .context("Posting the joke failed")?;
            tracing::info!(id = status.id.as_str(), "Posted the joke");
        }
        Ok(())
    }

    fn credentials(&self) -> Result<publisher::Credentials> {
        match (&self.server_url, &self.access_token) {
            (Some(server_url), Some(access_token)) => Ok(publisher::Credentials {
                server_url: server_url.clone(),
                access_token: access_token.clone(),
            }),
            _ => Err(anyhow::anyhow!(
                "Missing credentials, please provide --server-url and --access-token"
            )),
        }
    }

    fn random_joke(&self, agent: &ureq::Agent) -> Result<String> {
        let rt = tokio::runtime::Runtime::new().context("Tokio runtime")?;
        let (default_db, default_tsv) = default_paths()?;
        let db_path = self.db.clone().unwrap_or(default_db);
        let tsv_path = self.tsv.clone().unwrap_or(default_tsv);

        if self.initialize == InitMode::Reinit {
            pantheon::Db::reset(&db_path)?;
        }
        let db = rt.block_on(pantheon::Db::open(&db_path))?;
        let initialized = rt.block_on(db.is_initialized())?;
        match self.initialize {
            InitMode::No if !initialized => anyhow::bail!(
                "The store at {:?} is not initialized, please run with `--initialize init`",
                db_path
            ),
            InitMode::Init | InitMode::Reinit if !initialized => {
                if !tsv_path.exists() {
                    fetch::download(agent, &self.tsv_url, &tsv_path)?;
                }
                let count = rt.block_on(db.load(&tsv_path))?;
                tracing::info!(count, "Loaded the pantheon dataset");
            }
            _ => {}
        }

        let resolver = joke::WikipediaResolver(wikipedia::Client::new(agent.clone()));
        let joek = joke::pick_random_suitable(&rt, &db, &resolver, self.emoji, self.max_draws)?;
        Ok(joek)
    }
}

fn default_paths() -> Result<(PathBuf, PathBuf)> {
    let xdg = xdg::BaseDirectories::with_prefix("patronym")
        .context("Failed to get the xdg data directory")?;
    let db = xdg.place_data_file("pantheon.sqlite")?;
    let tsv = xdg.place_data_file("pantheon.tsv")?;
    Ok((db, tsv))
}

fn http_proxy() -> Result<String, std::env::VarError> {
    std::env::var("HTTPS_PROXY")
        .or_else(|_| std::env::var("https_proxy"))
        .or_else(|_| std::env::var("HTTP_PROXY"))
        .or_else(|_| std::env::var("http_proxy"))
}

fn new_agent() -> Result<ureq::Agent> {
    let mut builder = ureq::builder();
    if let Ok(proxy) = http_proxy() {
        let proxy = ureq::Proxy::new(&proxy).with_context(|| format!("Bad proxy {}", proxy))?;
        builder = builder.proxy(proxy);
    }
    Ok(builder.build())
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let cli = Cli::parse();
    let logger = tracing_subscriber::Registry::default();
    match std::env::var_os("PATRONYM_LOG") {
        None => {
            // Default stdout logger
            let level = if cli.verbose {
                tracing_subscriber::filter::LevelFilter::DEBUG
            } else {
                tracing_subscriber::filter::LevelFilter::INFO
            };
            logger
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .compact()
                        .with_filter(level),
                )
                .init();
        }
        Some(_level) => {
            // Tracing spans
            logger
                .with(
                    tracing_tree::HierarchicalLayer::new(1)
                        .with_targets(true)
                        .with_bracketed_fields(true)
                        .with_filter(tracing_subscriber::filter::EnvFilter::from_env(
                            "PATRONYM_LOG",
                        )),
                )
                .init();
        }
    }
    cli.run()
}
