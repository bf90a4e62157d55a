//! Payoff CLI - Command line interface for the options payoff engine.
//!
//! Every command prints an `ApiResponse` as JSON on stdout. Logs go to stderr.

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use payoff_engine::{
    compute_payoff_and_metrics_with, estimate_premium, generate_strike_ladder, get_template,
    instantiate_template, list_templates, ApiResponse, EngineConfig, OptionLeg, OptionType,
    UnderlyingSnapshot,
};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "payoff")]
#[command(about = "Options strategy payoff and risk metrics")]
#[command(version)]
struct Cli {
    /// Engine config file (defaults to ~/.zee/payoff/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the strike ladder around spot
    Ladder {
        /// Current price of the underlying
        #[arg(short, long)]
        spot: f64,
        /// Strike gap (config value if omitted)
        #[arg(short, long)]
        gap: Option<f64>,
        /// Strikes on each side of ATM (config value if omitted)
        #[arg(short, long)]
        count: Option<u32>,
    },
    /// Estimate the premium of a single option
    Premium {
        #[arg(long)]
        spot: f64,
        #[arg(long)]
        strike: f64,
        #[arg(long = "type", value_enum)]
        option_type: OptionType,
        /// Implied volatility in percent
        #[arg(long)]
        iv: f64,
        #[arg(long)]
        days: f64,
    },
    /// Strategy template commands
    Strategy {
        #[command(subcommand)]
        action: StrategyAction,
    },
    /// Compute the payoff curve and metrics of a strategy
    Analyze(AnalyzeArgs),
}

#[derive(Subcommand)]
enum StrategyAction {
    /// List built-in templates
    List,
    /// Get template details
    Get {
        /// Template ID
        #[arg(short, long)]
        id: String,
    },
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Built-in template to instantiate at the ATM strike
    #[arg(short, long, conflicts_with = "legs", required_unless_present = "legs")]
    template: Option<String>,
    /// JSON file holding an array of legs
    #[arg(long)]
    legs: Option<PathBuf>,
    #[arg(long)]
    spot: f64,
    #[arg(long)]
    lot_size: u32,
    /// Implied volatility in percent
    #[arg(long)]
    iv: f64,
    /// Days to expiry
    #[arg(long, conflicts_with = "expiry", required_unless_present = "expiry")]
    days: Option<f64>,
    /// Expiry date (YYYY-MM-DD), counted from today
    #[arg(long)]
    expiry: Option<NaiveDate>,
    /// Payoff window half-width as a fraction of spot
    #[arg(long)]
    range: Option<f64>,
    /// Number of curve samples
    #[arg(long)]
    samples: Option<usize>,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output = match run(cli) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            render(&ApiResponse::<()>::err(format!("{:#}", e)))
        }
    };

    println!("{}", output);
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_path(path),
        None => EngineConfig::load(),
    }
    .context("Failed to load engine config")?;

    match cli.command {
        Commands::Ladder { spot, gap, count } => {
            let gap = gap.unwrap_or(config.strike_gap);
            let ladder =
                generate_strike_ladder(spot, gap, count.unwrap_or(config.ladder_half_width))?;
            Ok(render(&ApiResponse::ok(json!({
                "spot": spot,
                "gap": gap,
                "atm_strike": ladder.atm_strike,
                "strikes": ladder.strikes,
            }))))
        }
        Commands::Premium {
            spot,
            strike,
            option_type,
            iv,
            days,
        } => {
            let premium = estimate_premium(spot, strike, option_type, iv, days)?;
            Ok(render(&ApiResponse::ok(json!({
                "strike": strike,
                "option_type": option_type,
                "premium": premium,
            }))))
        }
        Commands::Strategy { action } => Ok(handle_strategy(action)),
        Commands::Analyze(args) => handle_analyze(args, config),
    }
}

fn handle_strategy(action: StrategyAction) -> String {
    match action {
        StrategyAction::List => render(&ApiResponse::ok(json!({
            "strategies": list_templates(),
        }))),
        StrategyAction::Get { id } => match get_template(&id) {
            Some(template) => render(&ApiResponse::ok(template)),
            None => render(&ApiResponse::<()>::err(format!(
                "Strategy not found: {}",
                id
            ))),
        },
    }
}

fn handle_analyze(args: AnalyzeArgs, mut config: EngineConfig) -> anyhow::Result<String> {
    if let Some(range) = args.range {
        config.range_fraction = range;
    }
    if let Some(samples) = args.samples {
        config.sample_count = samples;
    }
    config.validate()?;

    let snapshot = match (args.days, args.expiry) {
        (Some(days), _) => UnderlyingSnapshot::new(args.spot, args.lot_size, args.iv, days)?,
        (None, Some(expiry)) => UnderlyingSnapshot::with_expiry(
            args.spot,
            args.lot_size,
            args.iv,
            expiry,
            Utc::now().date_naive(),
        )?,
        (None, None) => anyhow::bail!("Either --days or --expiry is required"),
    };

    let legs = match (&args.template, &args.legs) {
        (Some(id), _) => {
            let template = get_template(id)
                .ok_or_else(|| payoff_engine::Error::UnknownStrategy(id.clone()))?;
            let ladder = generate_strike_ladder(snapshot.spot_price, config.strike_gap, 0)?;
            instantiate_template(&template, ladder.atm_strike, config.strike_gap, &snapshot)?
        }
        (None, Some(path)) => read_legs(path)?,
        (None, None) => anyhow::bail!("Either --template or --legs is required"),
    };

    let analysis = compute_payoff_and_metrics_with(&legs, &snapshot, &config)?;
    tracing::info!(
        legs = legs.len(),
        breakevens = analysis.metrics.breakevens.len(),
        "Analysis complete"
    );

    Ok(render(&ApiResponse::ok(json!({
        "snapshot": snapshot,
        "legs": legs,
        "curve": analysis.curve,
        "metrics": analysis.metrics,
    }))))
}

fn read_legs(path: &Path) -> anyhow::Result<Vec<OptionLeg>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read legs file {}", path.display()))?;
    let legs = OptionLeg::list_from_json(&content)
        .with_context(|| format!("Invalid legs in {}", path.display()))?;
    Ok(legs)
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"Serialization failed: {}"}}"#, e))
}
