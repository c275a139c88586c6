//! core48: the deterministic board-transition engine of a 2048-style
//! sliding-tile merge puzzle.
//!
//! Given a 4x4 grid and a compass direction the engine computes the resulting
//! grid, the score delta, per-tile movement records for animation, and
//! terminal-state detection. Randomness (tile spawning) is injected through
//! [`engine::board::TileSource`], so identical inputs always produce
//! identical outputs. Rendering, input handling, and timing belong to the
//! caller.
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! use core48::engine::board::RngTileSource;
//! use core48::engine::transition::{self, Direction};
//!
//! let source = RngTileSource::new(StdRng::seed_from_u64(42));
//! let mut board = transition::new_game(source);
//! let result = transition::apply_move(&mut board, Direction::Left)?;
//! assert_eq!(result.changed, result.spawned.is_some());
//! # Ok::<(), core48::error::Error>(())
//! ```

pub mod engine;
pub mod error;

pub use engine::board::{Board, SpawnedTile};
pub use engine::transition::{Direction, TileMove, TransitionResult};
pub use error::{Error, Result};
