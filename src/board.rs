use crate::error::BoardError;
use crate::heuristic::{self, HeuristicWeights};
use crate::random::RandomGenerator;
use crate::state::{GameState, Spawn, SpawnPolicy, Successor, Turn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Side length of the grid.
pub const DIM: usize = 4;
/// Number of cells on the grid.
pub const CELLS: usize = DIM * DIM;

/// Cumulative lookup table for spawned tile values: `(value, probability)`.
pub const SPAWN_TABLE: [(u32, f64); 2] = [(4, 0.1), (2, 0.9)];

/// Probability that a spawn produces `value`, or 0 for values that never spawn.
pub fn spawn_probability(value: u32) -> f64 {
    SPAWN_TABLE
        .iter()
        .find(|(v, _)| *v == value)
        .map_or(0.0, |(_, p)| *p)
}

/// Draws a tile value from [`SPAWN_TABLE`] with a single roll.
pub fn pick_spawn_value<K: RandomGenerator>(random: &mut K) -> u32 {
    let roll = random.next_f64();
    let mut cumulative = 0.0;
    for (value, probability) in SPAWN_TABLE {
        cumulative += probability;
        if cumulative >= roll {
            return value;
        }
    }
    2
}

/// A slide direction.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// All directions in the order agent successors are generated.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Flat indices of one row (Left/Right) or column (Up/Down), ordered from the
    /// edge tiles slide toward.
    pub fn line_indices(self, line: usize) -> [usize; DIM] {
        let mut indices = [0; DIM];
        for (pos, slot) in indices.iter_mut().enumerate() {
            let along = match self {
                Direction::Left | Direction::Up => pos,
                Direction::Right | Direction::Down => DIM - 1 - pos,
            };
            *slot = match self {
                Direction::Left | Direction::Right => DIM * line + along,
                Direction::Up | Direction::Down => DIM * along + line,
            };
        }
        indices
    }
}

impl TryFrom<u8> for Direction {
    type Error = BoardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Direction::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| BoardError::InvalidDirection(value.to_string()))
    }
}

impl FromStr for Direction {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            _ => Err(BoardError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(name)
    }
}

/// Row-major copy of the board contents handed to presentation code. 0 is an empty cell.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    pub cells: [u32; CELLS],
}

impl Snapshot {
    /// The cells as a slice, row-major.
    pub fn as_slice(&self) -> &[u32] {
        &self.cells
    }

    /// Largest tile in the snapshot.
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }
}

/// The 4x4 grid of tile values.
///
/// Cells are stored row-major; `(x, y)` addresses column `x` of row `y`. The number of empty
/// cells is cached and kept in sync by every mutation. Serialized boards go through
/// [`Snapshot`], so deserializing validates the tiles and recomputes the empty count.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
#[serde(try_from = "Snapshot", into = "Snapshot")]
pub struct Board {
    cells: [u32; CELLS],
    empty: usize,
}

impl TryFrom<Snapshot> for Board {
    type Error = BoardError;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        Board::from_cells(&snapshot.cells)
    }
}

impl From<Board> for Snapshot {
    fn from(board: Board) -> Self {
        board.snapshot()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

impl Board {
    /// A board with no tiles.
    pub const fn empty() -> Self {
        Self {
            cells: [0; CELLS],
            empty: CELLS,
        }
    }

    /// The initial game state: an empty board seeded with two random tiles.
    pub fn new<K: RandomGenerator>(random: &mut K) -> Self {
        let mut board = Board::empty();
        board.spawn_into_empty(random);
        board.spawn_into_empty(random);
        board
    }

    /// Builds a board from exactly [`CELLS`] row-major values.
    pub fn from_cells(cells: &[u32]) -> Result<Self, BoardError> {
        if cells.len() != CELLS {
            return Err(BoardError::MalformedBoardOverride {
                expected: CELLS,
                actual: cells.len(),
            });
        }
        let mut board = Board::empty();
        for (index, &value) in cells.iter().enumerate() {
            if value != 0 && (value < 2 || !value.is_power_of_two()) {
                return Err(BoardError::InvalidTile { index, value });
            }
            board.set(index, value);
        }
        Ok(board)
    }

    /// Replaces the whole board. On error the current contents are kept.
    pub fn replace(&mut self, cells: &[u32]) -> Result<(), BoardError> {
        *self = Board::from_cells(cells)?;
        Ok(())
    }

    /// Row-major tile values, 0 for empty cells.
    pub fn cells(&self) -> &[u32; CELLS] {
        &self.cells
    }

    /// An owned copy of the cells for presentation code.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { cells: self.cells }
    }

    /// Flat index of column `x` in row `y`.
    pub const fn index(x: usize, y: usize) -> usize {
        DIM * y + x
    }

    /// Inverse of [`Board::index`]: `(x, y)` of a flat index.
    pub const fn coordinates(index: usize) -> (usize, usize) {
        (index % DIM, index / DIM)
    }

    /// Tile value at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.cells[Board::index(x, y)]
    }

    /// Cached number of empty cells.
    pub fn empty_count(&self) -> usize {
        self.empty
    }

    /// Flat indices of the empty cells, in ascending order.
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..CELLS).filter(|&i| self.cells[i] == 0).collect()
    }

    /// Largest tile on the board, 0 when it is empty.
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values; moves never change it.
    pub fn sum(&self) -> u64 {
        self.cells.iter().map(|&v| u64::from(v)).sum()
    }

    /// Slides every row or column toward the edge named by `direction`.
    ///
    /// Each destination cell accepts at most one merge per call, so `[2, 2, 2, 2]` moved
    /// left becomes `[4, 4, 0, 0]`. Returns whether any cell changed.
    pub fn apply_move(&mut self, direction: Direction) -> bool {
        let mut moved = false;
        for line in 0..DIM {
            let indices = direction.line_indices(line);
            for (pos, &target) in indices.iter().enumerate() {
                for &source in &indices[pos + 1..] {
                    if self.cells[source] == 0 {
                        continue;
                    }
                    if self.cells[target] == 0 {
                        self.slide(target, source);
                        moved = true;
                        continue;
                    }
                    if self.cells[target] == self.cells[source] {
                        self.merge(target, source);
                        moved = true;
                    }
                    break;
                }
            }
        }
        moved
    }

    /// Places a 2 or a 4 on an empty cell chosen uniformly at random.
    pub fn spawn_random_tile<K: RandomGenerator>(
        &mut self,
        random: &mut K,
    ) -> Result<Spawn, BoardError> {
        self.spawn_into_empty(random).ok_or_else(|| {
            log::warn!("spawn requested on a board without empty cells");
            BoardError::NoEmptyCell
        })
    }

    /// True when the board is full and no two orthogonal neighbours are equal.
    pub fn is_terminal(&self) -> bool {
        if self.empty > 0 {
            return false;
        }
        for i in 0..DIM {
            for j in 1..DIM {
                if self.get(j, i) == self.get(j - 1, i) || self.get(i, j) == self.get(i, j - 1) {
                    return false;
                }
            }
        }
        true
    }

    /// Copy of this board with `spawn` applied.
    pub fn with_spawn(&self, spawn: Spawn) -> Board {
        let mut child = *self;
        child.set(spawn.index, spawn.value);
        child
    }

    fn spawn_into_empty<K: RandomGenerator>(&mut self, random: &mut K) -> Option<Spawn> {
        let empty = self.empty_cells();
        let index = *random.choose(empty.as_slice())?;
        let spawn = Spawn {
            index,
            value: pick_spawn_value(random),
        };
        self.set(spawn.index, spawn.value);
        Some(spawn)
    }

    fn set(&mut self, index: usize, value: u32) {
        match (self.cells[index] == 0, value == 0) {
            (true, false) => self.empty -= 1,
            (false, true) => self.empty += 1,
            _ => {}
        }
        self.cells[index] = value;
    }

    fn slide(&mut self, to: usize, from: usize) {
        self.cells[to] = self.cells[from];
        self.cells[from] = 0;
    }

    fn merge(&mut self, to: usize, from: usize) {
        self.cells[to] += self.cells[from];
        self.cells[from] = 0;
        self.empty += 1;
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..DIM {
            write!(f, "|")?;
            for x in 0..DIM {
                write!(f, "{}\t", self.get(x, y))?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

impl GameState for Board {
    type Move = Direction;

    fn generate_successors<K: RandomGenerator>(
        &self,
        turn: Turn,
        policy: SpawnPolicy,
        random: &mut K,
    ) -> Vec<Successor<Self>> {
        match turn {
            Turn::Agent => Direction::ALL
                .iter()
                .filter_map(|&direction| {
                    let mut child = *self;
                    child.apply_move(direction).then_some(Successor {
                        state: child,
                        prev_move: Some(direction),
                        spawn: None,
                    })
                })
                .collect(),
            Turn::Environment => {
                let empty = self.empty_cells();
                let exhaustive = policy.is_exhaustive(empty.len());
                let mut successors = Vec::with_capacity(empty.len() * 2);
                for index in empty {
                    if exhaustive {
                        for value in [2, 4] {
                            let spawn = Spawn { index, value };
                            successors.push(Successor {
                                state: self.with_spawn(spawn),
                                prev_move: None,
                                spawn: Some(spawn),
                            });
                        }
                    } else {
                        let spawn = Spawn {
                            index,
                            value: pick_spawn_value(random),
                        };
                        successors.push(Successor {
                            state: self.with_spawn(spawn),
                            prev_move: None,
                            spawn: Some(spawn),
                        });
                    }
                }
                successors
            }
        }
    }

    fn evaluate(&self, weights: &HeuristicWeights) -> f64 {
        heuristic::evaluate(self, weights)
    }

    fn is_terminal(&self) -> bool {
        Board::is_terminal(self)
    }

    fn chance(&self, spawn: &Spawn) -> f64 {
        if self.empty == 0 {
            return 0.0;
        }
        spawn_probability(spawn.value) / self.empty as f64
    }
}
