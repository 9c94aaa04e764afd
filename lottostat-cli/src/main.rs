mod display;
mod import;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::display::{
    display_combinations, display_draws, display_frequencies, display_import_summary,
    display_match, display_position_frequencies,
};
use lottostat_core::generator::{make_rng, GenerationMode};
use lottostat_core::models::{LotteryType, MAIN_COUNT};
use lottostat_core::snapshot::LotterySnapshot;
use lottostat_db::db::{count_draws, db_path, load_draws, migrate, open_db};
use lottostat_db::rusqlite::Connection;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Game {
    #[default]
    Powerball,
    MegaMillions,
}

impl From<Game> for LotteryType {
    fn from(game: Game) -> Self {
        match game {
            Game::Powerball => LotteryType::Powerball,
            Game::MegaMillions => LotteryType::MegaMillions,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Mode {
    #[default]
    Random,
    Optimized,
}

impl From<Mode> for GenerationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Random => GenerationMode::Random,
            Mode::Optimized => GenerationMode::Optimized,
        }
    }
}

#[derive(Parser)]
#[command(name = "lottostat", about = "Powerball / Mega Millions statistics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import draws from a CSV file (scraper format)
    Import {
        /// Which lottery the file belongs to
        #[arg(short, long, default_value = "powerball")]
        game: Game,

        /// Path to the CSV file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the database path
    DbPath,

    /// List the most recent draws
    List {
        #[arg(short, long, default_value = "powerball")]
        game: Game,

        /// Number of draws to display
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Show overall main-number and special-ball frequencies
    Stats {
        #[arg(short, long, default_value = "powerball")]
        game: Game,
    },

    /// Show position-specific frequencies (rank in the sorted draw)
    Positions {
        #[arg(short, long, default_value = "powerball")]
        game: Game,

        /// Restrict to one position (1-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        position: Option<u8>,
    },

    /// Check whether a combination ever came up
    Check {
        #[arg(short, long, default_value = "powerball")]
        game: Game,

        /// The 5 main numbers
        #[arg(required = true, num_args = 5)]
        numbers: Vec<u8>,

        /// Optional special ball for an exact match
        #[arg(short, long)]
        special: Option<u8>,
    },

    /// Generate combinations that never came up in the history
    Generate {
        #[arg(short, long, default_value = "powerball")]
        game: Game,

        /// random: uniform draw; optimized: weighted by position frequencies
        #[arg(short, long, default_value = "random")]
        mode: Mode,

        /// Number of combinations to generate
        #[arg(short, long, default_value = "3")]
        count: usize,

        /// Seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { game, file } => cmd_import(&conn, game.into(), &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { game, last } => cmd_list(&conn, game.into(), last),
        Command::Stats { game } => cmd_stats(&conn, game.into()),
        Command::Positions { game, position } => cmd_positions(&conn, game.into(), position),
        Command::Check {
            game,
            numbers,
            special,
        } => cmd_check(&conn, game.into(), &numbers, special),
        Command::Generate {
            game,
            mode,
            count,
            seed,
        } => cmd_generate(&conn, game.into(), mode.into(), count, seed),
    }
}

fn load_snapshot(conn: &Connection, lottery_type: LotteryType) -> Result<Option<LotterySnapshot>> {
    if count_draws(conn, lottery_type)? == 0 {
        println!(
            "No {} draws in the database. Run: lottostat import --game {} --file <csv>",
            lottery_type, lottery_type
        );
        return Ok(None);
    }
    let draws = load_draws(conn, lottery_type)?;
    Ok(Some(LotterySnapshot::build(lottery_type, draws)?))
}

fn cmd_import(conn: &Connection, lottery_type: LotteryType, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(conn, file, lottery_type)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, lottery_type: LotteryType, last: usize) -> Result<()> {
    let Some(snapshot) = load_snapshot(conn, lottery_type)? else {
        return Ok(());
    };
    display_draws(snapshot.latest(0, last));
    Ok(())
}

fn cmd_stats(conn: &Connection, lottery_type: LotteryType) -> Result<()> {
    let Some(snapshot) = load_snapshot(conn, lottery_type)? else {
        return Ok(());
    };
    let config = snapshot.config();

    display_frequencies(
        snapshot.frequencies().overall(),
        &format!("Main numbers (1-{})", config.main_max),
        snapshot.len(),
    );
    display_frequencies(
        snapshot.frequencies().special(),
        &format!("Special ball (1-{})", config.special_max),
        snapshot.len(),
    );
    Ok(())
}

fn cmd_positions(conn: &Connection, lottery_type: LotteryType, position: Option<u8>) -> Result<()> {
    let Some(snapshot) = load_snapshot(conn, lottery_type)? else {
        return Ok(());
    };
    println!(
        "\nPosition frequencies over {} draws (position = rank in the sorted draw)\n",
        snapshot.len()
    );
    display_position_frequencies(&snapshot.frequencies().position_rows(position));
    Ok(())
}

fn cmd_check(
    conn: &Connection,
    lottery_type: LotteryType,
    numbers: &[u8],
    special: Option<u8>,
) -> Result<()> {
    if numbers.len() != MAIN_COUNT {
        bail!("expected exactly {} main numbers", MAIN_COUNT);
    }
    let mut main_numbers = [0u8; MAIN_COUNT];
    main_numbers.copy_from_slice(numbers);

    let Some(snapshot) = load_snapshot(conn, lottery_type)? else {
        return Ok(());
    };
    let result = snapshot.check_combination(&main_numbers, special)?;
    display_match(&result, &main_numbers, special);
    Ok(())
}

fn cmd_generate(
    conn: &Connection,
    lottery_type: LotteryType,
    mode: GenerationMode,
    count: usize,
    seed: Option<u64>,
) -> Result<()> {
    let Some(snapshot) = load_snapshot(conn, lottery_type)? else {
        return Ok(());
    };

    let mut rng = make_rng(seed);
    let mut combinations = Vec::with_capacity(count);
    for _ in 0..count {
        combinations.push(snapshot.generate(mode, &mut rng)?);
    }
    display_combinations(&combinations);
    Ok(())
}
