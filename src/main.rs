use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use core48::engine::board::RngTileSource;
use core48::engine::transition::{self, Direction};

/// Self-play demo: drives the board-transition engine with uniformly random
/// moves and reports the outcome.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Seed for tile spawning and move selection; omit for entropy.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many attempted moves even if the game is not over.
    #[arg(long, default_value_t = 10_000)]
    max_moves: u32,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message,
            ))
        })
        .level(args.verbosity.log_level_filter())
        .chain(std::io::stderr())
        .apply()?;

    let (spawn_rng, mut move_rng) = match args.seed {
        Some(seed) => (
            StdRng::seed_from_u64(seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        ),
        None => (StdRng::from_entropy(), StdRng::from_entropy()),
    };

    let mut board = transition::new_game(RngTileSource::new(spawn_rng));
    let mut attempted = 0u32;

    while attempted < args.max_moves && !transition::is_game_over(&board) {
        let direction = Direction::ALL[move_rng.gen_range(0..Direction::ALL.len())];
        let result = transition::apply_move(&mut board, direction)?;
        attempted += 1;

        log::debug!(
            "move {}: {} changed={} merges={} score={}",
            attempted,
            direction,
            result.changed,
            result.moves.iter().filter(|m| m.merged).count(),
            board.score(),
        );
        if let Some(record) = result.new_record {
            log::info!("new record tile: {}", record);
        }
    }

    log::info!(
        "finished after {} moves, game over: {}",
        attempted,
        transition::is_game_over(&board),
    );
    print!("{}", board);
    println!("score: {}", board.score());
    println!("highest tile: {}", board.highest_tile());

    Ok(())
}
