use anyhow::Context;
use clap::{Parser, Subcommand};
use nutrank::{
    RankRequest, RankerConfig, Recommender, RecommenderConfig, ReferenceData, ReferenceDataset,
    SearchQueryPayload, SynthesizerConfig, UserProfile,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Adaptive nutrient-based food ranking
#[derive(Parser, Debug)]
#[command(name = "nutrank")]
#[command(about = "Adaptive nutrient-based food ranking", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Number of results per ranking
    #[arg(long, default_value_t = 5, global = true)]
    top_n: usize,

    /// Drop candidates containing avoided ingredients instead of penalizing them
    #[arg(long, global = true)]
    hard_filter_avoided: bool,

    /// Disable half-rectification of normalized nutrients
    #[arg(long, global = true)]
    no_rectify: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend recipes for one or more user profiles
    Recommend {
        /// Recipe dataset (JSON array of records)
        #[arg(short, long, default_value = "./data/recipes.json")]
        dataset: PathBuf,

        /// Guideline corpus (JSON array of {condition, guideline})
        #[arg(short, long, default_value = "./data/guidelines.json")]
        guidelines: PathBuf,

        /// Guidelines retrieved per user
        #[arg(short, long, default_value_t = 3)]
        k: usize,

        /// Seed for synthetic profile noise
        #[arg(long)]
        seed: Option<u64>,

        /// Profile files; each holds one profile or an array of profiles
        #[arg(required = true)]
        profiles: Vec<PathBuf>,
    },
    /// Rank a candidate file against a search query payload
    Rank {
        /// Search query payload (JSON)
        #[arg(short, long)]
        payload: PathBuf,

        /// Candidate recipes (JSON array of records)
        #[arg(short, long)]
        candidates: PathBuf,
    },
}

fn read_profiles(path: &Path) -> anyhow::Result<Vec<UserProfile>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile file {:?}", path))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in {:?}", path))?;

    let profiles = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(profiles)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting nutrank v{}", env!("CARGO_PKG_VERSION"));

    let ranker = RankerConfig {
        top_n: args.top_n,
        hard_filter_avoided: args.hard_filter_avoided,
        rectify: !args.no_rectify,
        ..RankerConfig::default()
    };

    match args.command {
        Command::Recommend {
            dataset,
            guidelines,
            k,
            seed,
            profiles,
        } => {
            info!("Dataset: {:?}", dataset);
            info!("Guidelines: {:?}", guidelines);
            let data = Arc::new(
                ReferenceData::load(&dataset, &guidelines)
                    .context("failed to load reference data")?,
            );

            let mut users = Vec::new();
            for path in &profiles {
                users.extend(read_profiles(path)?);
            }
            info!("Loaded {} profiles", users.len());

            let config = RecommenderConfig {
                k,
                ranker,
                synthesizer: SynthesizerConfig {
                    seed,
                    ..SynthesizerConfig::default()
                },
            };
            let recommender = Recommender::new(data, config);

            let recommendations = users
                .par_iter()
                .map(|profile| {
                    recommender
                        .recommend(profile)
                        .with_context(|| format!("recommendation failed for user {}", profile.user_id))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            print_json(&recommendations, args.pretty)?;
        }
        Command::Rank {
            payload,
            candidates,
        } => {
            let text = std::fs::read_to_string(&payload)
                .with_context(|| format!("failed to read payload {:?}", payload))?;
            let payload: SearchQueryPayload =
                serde_json::from_str(&text).context("invalid search query payload")?;
            let request = RankRequest::from_payload(&payload)?;

            let dataset = ReferenceDataset::load(&candidates)
                .with_context(|| format!("failed to load candidates {:?}", candidates))?;
            let aligned = request.align(&dataset)?;
            info!("Ranking {} candidates", aligned.len());

            let ranked = request.rank(&aligned, ranker)?;
            print_json(&ranked, args.pretty)?;
        }
    }

    Ok(())
}
