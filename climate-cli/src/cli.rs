use anyhow::Context;
use clap::{Parser, Subcommand};
use climate_core::{CallContext, ClimateClient, Config, QueryArgs};
use inquire::Text;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "climate", version, about = "World Bank rainfall CLI")]
pub struct Cli {
    /// Override the configured API base URL for this run.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Year range and country shared by the query commands.
#[derive(Debug, Clone, clap::Args)]
pub struct QueryOpts {
    /// First year of the range, e.g. 1980.
    #[arg(long)]
    pub from: i64,

    /// Last year of the range, e.g. 1999.
    #[arg(long)]
    pub to: i64,

    /// ISO 3166-1 alpha-3 country code, e.g. GBR.
    #[arg(long)]
    pub country: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API endpoint (`--base-url`) and request timeout.
    Configure {
        /// Per-request timeout in seconds; 0 disables it.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show the average annual rainfall for a country.
    Average(QueryOpts),

    /// List the annual rainfall records for a country.
    Series {
        #[command(flatten)]
        query: QueryOpts,

        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure { timeout } => configure(&mut config, self.base_url, timeout),
            Command::Average(query) => {
                let (client, ctx) = connect(&config, self.base_url.as_deref())?;
                let call =
                    client.get_ave_annual_rainfall(&ctx, query.from, query.to, &query.country);
                let average = with_ctrl_c(&ctx, call).await.with_context(|| {
                    format!(
                        "Could not compute average rainfall for {} ({}-{})",
                        query.country.to_uppercase(),
                        query.from,
                        query.to
                    )
                })?;

                println!(
                    "Average annual rainfall for {} ({}-{}): {:.2} mm",
                    query.country.to_uppercase(),
                    query.from,
                    query.to,
                    average
                );
                Ok(())
            }
            Command::Series { query, json } => {
                let (client, ctx) = connect(&config, self.base_url.as_deref())?;
                let args = QueryArgs::from_years(query.from, query.to, &query.country);
                let list = with_ctrl_c(&ctx, client.get_annual_rainfall(&ctx, &args))
                    .await
                    .context("Could not fetch annual rainfall")?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&list)?);
                } else if list.is_empty() {
                    println!(
                        "No rainfall data for {} ({}-{}).",
                        query.country.to_uppercase(),
                        query.from,
                        query.to
                    );
                } else {
                    for point in &list {
                        let period = match (point.from_year, point.to_year) {
                            (Some(from), Some(to)) => format!("{from}-{to}"),
                            _ => "unknown period".to_string(),
                        };
                        println!(
                            "{:<24} {:<14} {} mm",
                            point.gcm.as_deref().unwrap_or("-"),
                            period,
                            point.value
                        );
                    }
                }
                Ok(())
            }
        }
    }
}

fn configure(
    config: &mut Config,
    base_url: Option<String>,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    let interactive = base_url.is_none() && timeout.is_none();

    let base_url = match base_url {
        Some(url) => Some(url),
        None if interactive => Some(
            Text::new("Climate API base URL:")
                .with_default(config.base_url())
                .prompt()
                .context("Failed to read base URL")?,
        ),
        None => None,
    };

    if let Some(url) = base_url {
        config.set_base_url(&url)?;
    }
    if timeout.is_some() {
        config.set_timeout_secs(timeout);
    }

    config.save()?;
    println!(
        "Saved configuration to {} (base URL: {})",
        Config::config_file_path()?.display(),
        config.base_url()
    );
    Ok(())
}

fn connect(
    config: &Config,
    base_url: Option<&str>,
) -> anyhow::Result<(ClimateClient, CallContext)> {
    let mut config = config.clone();
    if let Some(url) = base_url {
        config.set_base_url(url)?;
    }
    info!(base_url = config.base_url(), "using climate API");

    let mut ctx = CallContext::new().with_cancellation(CancellationToken::new());
    if let Some(timeout) = config.timeout() {
        ctx = ctx.with_timeout(timeout);
    }

    Ok((ClimateClient::from_config(&config), ctx))
}

/// Cancels the call's context when Ctrl-C arrives.
async fn with_ctrl_c<F: Future>(ctx: &CallContext, call: F) -> F::Output {
    let token = ctx.cancellation_token().clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling request");
            token.cancel();
        }
    });

    let output = call.await;
    watcher.abort();
    output
}
