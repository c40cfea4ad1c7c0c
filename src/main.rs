mod config;
mod game;
mod input;
mod render;
mod screen;
mod snake;
mod term;

use anyhow::Result;
use clap::Parser;

use crate::config::GameConfig;
use crate::game::SnakeGame;
use crate::term::TermManager;

pub type GridInt = i32;
pub type Coords = (GridInt, GridInt);

#[derive(Parser, Debug)]
#[command(name = "console-snake", version, about = "Snake in the terminal")]
struct Args {
    /// Grid width in characters
    #[arg(long, default_value_t = 120)]
    width: GridInt,

    /// Grid height in characters, including the 3 score rows
    #[arg(long, default_value_t = 50)]
    height: GridInt,

    /// Die on the edges instead of wrapping around
    #[arg(long)]
    walls: bool,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = GameConfig::new(args.width, args.height)
        .with_mirroring(!args.walls)
        .with_seed(args.seed);
    config.validate()?;
    log::info!("starting with {:?}", config);

    let mut term = TermManager::new()?;
    term.setup()?;

    let mut game = SnakeGame::new(config, term);
    game.initialize()?;

    // Only returns on Esc; the terminal is restored when `game` drops
    game.run()
}
