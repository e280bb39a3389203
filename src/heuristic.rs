//! Static evaluation of a board at search cutoffs.
//!
//! The score is a weighted sum of four terms. Open space and monotonicity carry most of the
//! weight; corner placement and merge potential break ties between otherwise similar boards.
//! The preferred layout grows toward the bottom-right corner.

use crate::board::{Board, CELLS, DIM};
use serde::{Deserialize, Serialize};

/// Largest magnitude [`monotonicity`] can reach before normalisation.
const MONOTONICITY_MAX: f64 = 48.0;

/// Flat index of the corner the largest tile should sit in.
pub const ANCHOR_CORNER: usize = CELLS - 1;

/// Multipliers applied to each heuristic term.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    pub open_space: f64,
    pub monotonicity: f64,
    pub corner: f64,
    pub merge: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            open_space: 4500.0,
            monotonicity: 4000.0,
            corner: 500.0,
            merge: 1000.0,
        }
    }
}

/// Weighted desirability of `board`.
pub fn evaluate(board: &Board, weights: &HeuristicWeights) -> f64 {
    weights.open_space * open_space(board)
        + weights.monotonicity * monotonicity(board)
        + weights.corner * corner_max(board)
        + weights.merge * merge_potential(board)
}

/// Fraction of cells that are empty, in `[0, 1]`.
pub fn open_space(board: &Board) -> f64 {
    board.empty_count() as f64 / CELLS as f64
}

/// Agreement with values increasing rightward along rows and downward along columns,
/// in `[-1, 1]`. Pairs further along a line weigh more.
pub fn monotonicity(board: &Board) -> f64 {
    let mut score: i64 = 0;
    for i in 0..DIM {
        for j in 1..DIM {
            let weight = j as i64;
            score += weight * order(board.get(j - 1, i), board.get(j, i));
            score += weight * order(board.get(i, j - 1), board.get(i, j));
        }
    }
    score as f64 / MONOTONICITY_MAX
}

fn order(lead: u32, trail: u32) -> i64 {
    match lead.cmp(&trail) {
        std::cmp::Ordering::Less => 1,
        std::cmp::Ordering::Greater => -1,
        std::cmp::Ordering::Equal => 0,
    }
}

/// 1 when the largest tile sits in [`ANCHOR_CORNER`], 0 otherwise.
pub fn corner_max(board: &Board) -> f64 {
    if board.cells()[ANCHOR_CORNER] >= board.max_tile() {
        1.0
    } else {
        0.0
    }
}

/// Sum over equal non-empty neighbours of `log2(value) / log2(max_tile)`.
pub fn merge_potential(board: &Board) -> f64 {
    let largest = board.max_tile();
    if largest < 2 {
        return 0.0;
    }
    let largest = f64::from(largest).log2();
    let ratio = |value: u32| f64::from(value).log2() / largest;

    let mut score = 0.0;
    for i in 0..DIM {
        for j in 1..DIM {
            let value = board.get(j, i);
            if value > 0 && value == board.get(j - 1, i) {
                score += ratio(value);
            }
            let value = board.get(i, j);
            if value > 0 && value == board.get(i, j - 1) {
                score += ratio(value);
            }
        }
    }
    score
}
