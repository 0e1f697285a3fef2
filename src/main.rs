//! Diamond Dice headless runner
//!
//! Loads the player, fielding chart and team files, plays one game and
//! prints the play-by-play and the final tables.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde_json::json;

use diamond_dice::cards::PlayerRepository;
use diamond_dice::settings::Settings;
use diamond_dice::sim::{FieldingChart, Game, GameResult, GameSetup, InfieldAlignment, SeededDice, SendPolicy};

#[derive(Parser)]
#[command(name = "diamond-dice")]
#[command(about = "Play a dice-and-card baseball game from the command line")]
struct Args {
    /// Player card file
    #[arg(long, default_value = "data/players.json")]
    players: PathBuf,

    /// Fielding chart file
    #[arg(long, default_value = "data/fielding_chart.json")]
    chart: PathBuf,

    /// Team sheets (away and home)
    #[arg(long, default_value = "data/teams.json")]
    teams: PathBuf,

    /// Settings file; values given on the command line win
    #[arg(long)]
    settings: Option<PathBuf>,

    /// RNG seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Runner send policy
    #[arg(long)]
    policy: Option<PolicyArg>,

    /// Lowest chance worth sending a runner on (with `--policy chance`)
    #[arg(long, default_value = "12")]
    min_chance: u8,

    /// Infield alignment
    #[arg(long)]
    infield: Option<InfieldArg>,

    /// Regulation innings
    #[arg(long)]
    innings: Option<u32>,

    /// Print the whole game as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Skip the play-by-play
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Always,
    Never,
    Chance,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InfieldArg {
    Normal,
    CornersIn,
    InfieldIn,
}

impl Args {
    /// Settings file (or defaults) with command-line overrides applied
    fn settings(&self) -> diamond_dice::Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(policy) = self.policy {
            settings.send_policy = match policy {
                PolicyArg::Always => SendPolicy::Always,
                PolicyArg::Never => SendPolicy::Never,
                PolicyArg::Chance => SendPolicy::Chance {
                    min_chance: self.min_chance,
                },
            };
        }
        if let Some(infield) = self.infield {
            settings.infield = match infield {
                InfieldArg::Normal => InfieldAlignment::Normal,
                InfieldArg::CornersIn => InfieldAlignment::CornersIn,
                InfieldArg::InfieldIn => InfieldAlignment::InfieldIn,
            };
        }
        if let Some(innings) = self.innings {
            settings.regulation_innings = innings;
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let settings = args.settings()?;

    let players = PlayerRepository::load(&args.players)?;
    let chart = FieldingChart::load(&args.chart)?;
    let setup = GameSetup::load(&args.teams)?;

    let seed = settings.seed_or_random();
    log::info!("Diamond Dice starting with seed {seed}");

    let mut game = Game::new(&players, chart, &setup, SeededDice::new(seed), settings.send_policy)?
        .with_regulation_innings(settings.regulation_innings)
        .with_infield(settings.infield);

    let mut plays = Vec::new();
    while game.result() == GameResult::InProgress
        && game.plate_appearances() < settings.max_plate_appearances
    {
        let pa = game.plate_appearance()?;
        if !args.json && !args.quiet {
            println!("{pa}");
        }
        plays.push(pa);
    }

    if args.json {
        let dump = json!({
            "seed": seed,
            "result": game.result(),
            "snapshot": game.snapshot(),
            "plays": plays,
            "scoreboard": game.scoreboard(),
            "box_score": game.box_score(),
            "scorecard": game.scorecard(),
        });
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    println!();
    println!("{}", game.scoreboard());
    println!("{}", game.box_score());
    println!("{}", game.scorecard());
    match game.result() {
        GameResult::HomeWin => println!("{} win (seed {seed})", setup.home.name),
        GameResult::AwayWin => println!("{} win (seed {seed})", setup.away.name),
        GameResult::InProgress => println!(
            "Stopped after {} plate appearances (seed {seed})",
            game.plate_appearances()
        ),
    }
    Ok(())
}
