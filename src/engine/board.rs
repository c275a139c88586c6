use rand::distributions::Distribution;
use rand::distributions::WeightedIndex;
use rand::Rng;

pub type Tile = u32;

pub type Score = u32;

pub const BOARD_SIZE: usize = 4;

pub type Grid = [[Tile; BOARD_SIZE]; BOARD_SIZE];

const NEW_TILE_CHOICES: [Tile; 2] = [2, 4];
const NEW_TILE_WEIGHTS: [u8; 2] = [9, 1];

/// Idx addresses a single board cell as (row, col).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Idx(pub usize, pub usize);

impl std::fmt::Display for Idx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx({0},{1})", self.0, self.1)
    }
}

impl Idx {
    pub fn row(&self) -> usize {
        self.0
    }

    pub fn col(&self) -> usize {
        self.1
    }
}

/// TileSource is the sole source of randomness in the engine. Spawning makes
/// exactly one cell choice and one value choice per tile, so a scripted
/// implementation can pin down spawn outcomes exactly.
pub trait TileSource {
    /// Choose uniformly among `n` empty cells; must return a value in `0..n`.
    fn choose_cell(&mut self, n: usize) -> usize;

    /// Choose the value of a freshly spawned tile: 2 with probability 0.9,
    /// otherwise 4.
    fn choose_value(&mut self) -> Tile;
}

/// TileSource backed by any rand generator, with the standard 9:1 bias
/// between 2s and 4s.
pub struct RngTileSource<R: Rng> {
    rng: R,
    weighted: WeightedIndex<u8>,
}

impl<R: Rng> RngTileSource<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            weighted: WeightedIndex::new(NEW_TILE_WEIGHTS)
                .expect("NEW_TILE_WEIGHTS should never be empty"),
        }
    }
}

impl<R: Rng> TileSource for RngTileSource<R> {
    fn choose_cell(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }

    fn choose_value(&mut self) -> Tile {
        NEW_TILE_CHOICES[self.weighted.sample(&mut self.rng)]
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GameState {
    Playing,
    GameOver,
}

/// A tile placed by a spawn.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnedTile {
    pub idx: Idx,
    pub value: Tile,
}

/// Board holds the 4x4 grid along with its score and highest-tile trackers.
/// All non-zero cells are powers of two; `score` and `highest_tile` never
/// decrease over a board's lifetime.
pub struct Board {
    source: Box<dyn TileSource>,
    cells: Grid,
    score: Score,
    highest_tile: Tile,
    state: GameState,
}

impl Board {
    /// Initialize a new board using the given tile source: empty grid, two
    /// spawned tiles, zero score.
    pub fn new(source: impl TileSource + 'static) -> Self {
        let mut board = Self {
            source: Box::new(source),
            cells: [[0; BOARD_SIZE]; BOARD_SIZE],
            score: 0,
            highest_tile: 0,
            state: GameState::Playing,
        };
        board.spawn_random_tile();
        board.spawn_random_tile();
        board.refresh_state();
        board
    }

    /// Start a new game on the same board: clear everything and respawn the
    /// two initial tiles.
    pub fn reset(&mut self) {
        self.cells = [[0; BOARD_SIZE]; BOARD_SIZE];
        self.score = 0;
        self.highest_tile = 0;
        self.state = GameState::Playing;
        self.spawn_random_tile();
        self.spawn_random_tile();
        self.refresh_state();
    }

    pub fn cells(&self) -> &Grid {
        &self.cells
    }

    pub fn get(&self, idx: &Idx) -> Tile {
        self.cells[idx.0][idx.1]
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn highest_tile(&self) -> Tile {
        self.highest_tile
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (BOARD_SIZE, BOARD_SIZE)
    }

    /// Place a new tile on a uniformly random empty cell, or return None if
    /// the grid is full. The value is 2 with probability 0.9, else 4.
    pub fn spawn_random_tile(&mut self) -> Option<SpawnedTile> {
        let empties: Vec<Idx> = (0..BOARD_SIZE)
            .flat_map(|r| (0..BOARD_SIZE).map(move |c| Idx(r, c)))
            .filter(|idx| self.cells[idx.0][idx.1] == 0)
            .collect();
        if empties.is_empty() {
            return None;
        }
        let idx = empties[self.source.choose_cell(empties.len())].clone();
        let value = self.source.choose_value();
        self.cells[idx.0][idx.1] = value;
        if value > self.highest_tile {
            self.highest_tile = value;
        }
        Some(SpawnedTile { idx, value })
    }

    /// True iff the grid is full and no two orthogonally adjacent cells hold
    /// equal values. Pure scan, no side effects.
    pub fn is_terminal(&self) -> bool {
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                let value = self.cells[r][c];
                if value == 0 {
                    return false;
                }
                if r + 1 < BOARD_SIZE && self.cells[r + 1][c] == value {
                    return false;
                }
                if c + 1 < BOARD_SIZE && self.cells[r][c + 1] == value {
                    return false;
                }
            }
        }
        true
    }
}

// crate-private mutators used by the transition engine
impl Board {
    pub(crate) fn commit(&mut self, cells: Grid, score_gain: Score) {
        self.cells = cells;
        self.score += score_gain;
    }

    pub(crate) fn raise_record(&mut self, value: Tile) {
        debug_assert!(value > self.highest_tile);
        self.highest_tile = value;
    }

    pub(crate) fn refresh_state(&mut self) {
        if self.is_terminal() {
            self.state = GameState::GameOver;
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.cells {
            for value in row {
                write!(f, "{:>6}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl Board {
    /// Build a board with a fixed grid for tests; `highest_tile` is seeded
    /// from the grid's current maximum.
    pub(crate) fn with_cells(cells: Grid, source: impl TileSource + 'static) -> Self {
        let highest_tile = cells.iter().flatten().copied().max().unwrap_or(0);
        let mut board = Self {
            source: Box::new(source),
            cells,
            score: 0,
            highest_tile,
            state: GameState::Playing,
        };
        board.refresh_state();
        board
    }
}

/// Replays a fixed script of cell and value choices; exhausted scripts fall
/// back to the first empty cell and a 2.
#[cfg(test)]
pub(crate) struct ScriptedTileSource {
    cells: std::collections::VecDeque<usize>,
    values: std::collections::VecDeque<Tile>,
}

#[cfg(test)]
impl ScriptedTileSource {
    pub(crate) fn new(cells: &[usize], values: &[Tile]) -> Self {
        Self {
            cells: cells.iter().copied().collect(),
            values: values.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl TileSource for ScriptedTileSource {
    fn choose_cell(&mut self, n: usize) -> usize {
        self.cells.pop_front().unwrap_or(0).min(n - 1)
    }

    fn choose_value(&mut self) -> Tile {
        self.values.pop_front().unwrap_or(2)
    }
}
