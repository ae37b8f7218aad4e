use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use court_shuffle::{generate_schedule, History, Match, ScheduleConfig, ScheduleReport};

#[derive(Parser)]
#[command(name = "court-shuffle")]
#[command(about = "Doubles court rotation with partner/opponent repeat avoidance")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a schedule from a JSON config
    Generate {
        /// Path to the schedule config
        #[arg(long)]
        config: PathBuf,

        /// Override the number of courts
        #[arg(long)]
        courts: Option<usize>,

        /// Override the rounds per court
        #[arg(long)]
        matches_per_court: Option<usize>,

        /// Override the date seed
        #[arg(long)]
        seed: Option<String>,

        /// Mix fresh entropy into the seed
        #[arg(long)]
        randomize: bool,

        /// Rotate rests so nobody sits twice before everyone has sat once
        #[arg(long)]
        no_double_rest: bool,

        /// JSON array of past matches folded into the history tables
        #[arg(long)]
        history: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn init_tracing(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    let json = cli
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let plain = (!cli.json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();
}

fn load_history(path: &Path) -> Result<History> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading history {}", path.display()))?;
    let matches: Vec<Match> = serde_json::from_str(&content)
        .with_context(|| format!("parsing history {}", path.display()))?;
    tracing::info!("Loaded {} past matches from {}", matches.len(), path.display());
    Ok(History::from_matches(&matches))
}

fn print_table(matches: &[Match], config: &ScheduleConfig) {
    for game in matches {
        let [a, b] = game.team_a();
        let [c, d] = game.team_b();
        println!("#{:<3} R{:<2} C{:<2} {a} & {b}  vs  {c} & {d}", game.match_index, game.round, game.court);
    }
    println!();
    println!("{}", ScheduleReport::from_matches(matches, &config.players));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command {
        Commands::Generate {
            config,
            courts,
            matches_per_court,
            seed,
            randomize,
            no_double_rest,
            history,
            format,
        } => {
            let mut schedule_config = ScheduleConfig::from_path(&config)
                .with_context(|| format!("loading config {}", config.display()))?;
            if let Some(courts) = courts {
                schedule_config.courts = courts;
            }
            if let Some(matches_per_court) = matches_per_court {
                schedule_config.matches_per_court = matches_per_court;
            }
            if let Some(seed) = seed {
                schedule_config.date_seed = seed;
            }
            schedule_config.randomize |= randomize;
            schedule_config.no_double_rest |= no_double_rest;
            if let Some(path) = history {
                let past = load_history(&path)?;
                schedule_config.history.merge(&past);
            }

            let matches = generate_schedule(&schedule_config)?;
            if matches.is_empty() {
                tracing::warn!("Fewer than 4 distinct players, nothing to schedule");
            }

            match format {
                OutputFormat::Table => print_table(&matches, &schedule_config),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matches)?),
            }
        }
    }

    Ok(())
}
