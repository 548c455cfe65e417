use std::fmt;

use chrono::{DateTime, Duration, Utc};
use ladders_core::GameConfig;
use ladders_core::model::{GameMode, Identity, PlayerAnswer, Round, SessionSummary};
use ladders_core::numbers::{NumberSource, RandomNumbers};
use ladders_core::opponent::{OpponentSource, SimulatedOpponent};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use storage::repository::Storage;

/// Chance that a seeded player answers a round correctly.
const SEED_PLAYER_ACCURACY: f64 = 0.6;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    sessions: u32,
    identity: Identity,
    seed: u64,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSessions { raw: String },
    InvalidIdentity { raw: String },
    InvalidSeed { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSessions { raw } => write!(f, "invalid --sessions value: {raw}"),
            ArgsError::InvalidIdentity { raw } => write!(f, "invalid --identity value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_identity(raw: String) -> Result<Identity, ArgsError> {
    raw.parse::<Identity>()
        .map_err(|_| ArgsError::InvalidIdentity { raw })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("LADDERS_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut sessions = std::env::var("LADDERS_SESSIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(6);
        let mut identity = std::env::var("LADDERS_IDENTITY")
            .ok()
            .and_then(|value| value.parse::<Identity>().ok())
            .unwrap_or_else(Identity::new_guest);
        let mut seed = std::env::var("LADDERS_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(7);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--sessions" => {
                    let value = require_value(&mut args, "--sessions")?;
                    sessions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidSessions { raw: value.clone() })?;
                }
                "--identity" => {
                    let value = require_value(&mut args, "--identity")?;
                    identity = parse_identity(value)?;
                }
                "--seed" => {
                    let value = require_value(&mut args, "--seed")?;
                    seed = value
                        .parse::<u64>()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            sessions,
            identity,
            seed,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --sessions <n>            Number of finished games to append (default: 6)");
    eprintln!("  --identity <id>           Player identity (default: a new guest id)");
    eprintln!("  --seed <n>                RNG seed for numbers and answers (default: 7)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  LADDERS_DB_URL, LADDERS_SESSIONS, LADDERS_IDENTITY, LADDERS_SEED");
}

/// Plays one game with scripted-by-seed answers and no real timers.
fn simulate_game(
    config: &GameConfig,
    identity: &Identity,
    numbers: &mut impl NumberSource,
    opponent: &mut impl OpponentSource,
    rng: &mut ChaCha8Rng,
    completed_at: DateTime<Utc>,
) -> Result<SessionSummary, Box<dyn std::error::Error>> {
    let time_per_round = config.time_per_round_secs();
    let mut rounds = Vec::new();
    for index in 1..=config.total_rounds() {
        let number = numbers.next_number();
        let answer = if rng.random_bool(SEED_PLAYER_ACCURACY) {
            PlayerAnswer::Answered(number.root().to_string())
        } else if rng.random_bool(0.5) {
            PlayerAnswer::Answered(rng.random_range(1..=9_u8).to_string())
        } else {
            PlayerAnswer::Skipped
        };
        let time_taken = f64::from(rng.random_range(1..time_per_round));
        let attempt = config
            .mode()
            .has_opponent()
            .then(|| opponent.attempt(time_per_round));
        rounds.push(Round::close(index, number, answer, time_taken, attempt));
    }

    let elapsed_secs = i64::from(config.total_rounds())
        * i64::from(time_per_round + config.round_break_secs());
    let summary = SessionSummary::from_rounds(
        identity.clone(),
        config.mode(),
        config.total_rounds(),
        rounds,
        config.opponent_label().map(str::to_owned),
        completed_at - Duration::seconds(elapsed_secs),
        completed_at,
    )?;
    Ok(summary)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut numbers = RandomNumbers::seeded(args.seed.wrapping_add(1));
    let mut opponent = SimulatedOpponent::seeded(args.seed.wrapping_add(2));

    for i in 0..args.sessions {
        let mode = GameMode::ALL[(i as usize) % GameMode::ALL.len()];
        let config = GameConfig::new(mode);
        config.validate()?;
        let completed_at = now - Duration::hours(i64::from(i) * 6);
        let summary = simulate_game(
            &config,
            &args.identity,
            &mut numbers,
            &mut opponent,
            &mut rng,
            completed_at,
        )?;
        let id = storage.session_summaries.append_summary(&summary).await?;
        log::debug!("seeded {mode} session {id} with score {}", summary.score());
    }

    println!(
        "Seeded {} sessions for {} into {}",
        args.sessions, args.identity, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
