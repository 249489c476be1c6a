use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use rewindow::benchmark::run_benchmarks;
use rewindow::record::{Observation, RecordLayout, read_records};
use rewindow::station::{Satellite, list_window_files, parse_hour};
use rewindow::{Error, MigrationConfig, migrate};

#[derive(Parser, Debug)]
#[command(name = "rewindow")]
#[command(about = "Split satellite radiance data from old assimilation windows into new ones")]
struct Cli {
    /// Number of satellites swept concurrently
    #[arg(short, long, global = true, default_value_t = 1)]
    jobs: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Migrate every satellite listed in a YAML configuration
    Run {
        #[arg(short, long, env = "REWINDOW_CONFIG", default_value = "./config/config.yml")]
        config: PathBuf,
    },
    /// Migrate with 6 h old windows and 3 h new windows starting at a target hour
    Split {
        old_dir: PathBuf,
        new_dir: PathBuf,
        /// First new window center, YYYYMMDDHH
        target: String,
        /// Last new window center, YYYYMMDDHH (defaults to the target)
        #[arg(long)]
        end: Option<String>,
        /// Restrict to these satellites
        #[arg(long = "sat")]
        satellites: Vec<String>,
    },
    /// List the window files of a satellite in a directory
    Inventory {
        dir: PathBuf,
        #[arg(long)]
        sat: String,
        /// YYYYMMDDHH
        #[arg(long)]
        from: Option<String>,
        /// YYYYMMDDHH
        #[arg(long)]
        to: Option<String>,
    },
    /// Print the decoded records of one window file
    Dump {
        file: PathBuf,
        #[arg(long)]
        channels: usize,
    },
    /// Time a sweep over synthetic old windows
    Bench {
        #[arg(long, default_value_t = 2)]
        days: i64,
        #[arg(long, default_value_t = 10_000)]
        records_per_window: usize,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Error> {
    let config = match cli.command {
        Command::Run { config } => MigrationConfig::load(&config)?,
        Command::Split {
            old_dir,
            new_dir,
            target,
            end,
            satellites,
        } => {
            let satellites = satellites
                .iter()
                .map(|s| s.parse::<Satellite>())
                .collect::<Result<Vec<_>, _>>()?;
            let end = end.as_deref().map(parse_hour).transpose()?;
            MigrationConfig::fixed(old_dir, new_dir, parse_hour(&target)?, end, &satellites)?
        }
        Command::Inventory { dir, sat, from, to } => {
            let satellite = sat.parse::<Satellite>()?;
            let from = match from {
                Some(s) => parse_hour(&s)?,
                None => DateTime::<Utc>::MIN_UTC,
            };
            let to = match to {
                Some(s) => parse_hour(&s)?,
                None => DateTime::<Utc>::MAX_UTC,
            };
            for (time, path) in list_window_files(satellite, &dir, from, to)? {
                println!("{}  {}", time.format("%Y-%m-%d %H:%M"), path.display());
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Dump { file, channels } => {
            let layout = RecordLayout::new(channels)?;
            for (record, _) in read_records(&file, &layout)? {
                println!("{:?}", Observation::decode(&layout, &record)?);
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Bench {
            days,
            records_per_window,
        } => {
            run_benchmarks(days, records_per_window)?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    let outcomes = migrate(&config, cli.jobs)?;
    let failed: Vec<_> = outcomes
        .iter()
        .filter(|o| o.result.is_err())
        .map(|o| o.satellite.to_string())
        .collect();
    if failed.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        log::error!("{} of {} satellites failed: {}", failed.len(), outcomes.len(), failed.join(", "));
        Ok(ExitCode::FAILURE)
    }
}
