/// Errors raised by board construction and state transitions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid direction: {0}")]
    InvalidDirection(String),
    #[error("no empty cell to spawn a tile into")]
    NoEmptyCell,
    #[error("board override has {actual} values, expected {expected}")]
    MalformedBoardOverride { expected: usize, actual: usize },
    #[error("cell {index} holds {value}, which is neither 0 nor a power of two")]
    InvalidTile { index: usize, value: u32 },
}
