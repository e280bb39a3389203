//! Move selection for the 2048 sliding-tile puzzle by bounded game-tree search.
//!
//! The game alternates between the agent, who slides every tile in one direction, and the
//! environment, which drops a 2 or a 4 on a random empty cell. A [`search::Solver`] expands
//! that alternation a fixed number of plies from the live board, scores the frontier with a
//! weighted heuristic, and backs the values up either with alpha-beta minimax or with
//! expectimax.
//!
//! # Example
//!
//! ```rust
//! use twenty48_search::board::Board;
//! use twenty48_search::random::SeededRandomGenerator;
//! use twenty48_search::search::{Solver, SolverBuilder, Strategy};
//!
//! let mut rg = SeededRandomGenerator::new(42);
//! let mut board = Board::new(&mut rg);
//!
//! let mut solver: Solver<Board, SeededRandomGenerator> = SolverBuilder::new()
//!     .with_strategy(Strategy::Expectimax)
//!     .with_max_depth(2)
//!     .build();
//!
//! if let Some(decision) = solver.search(board) {
//!     println!("The best move is: {:?}", decision.prev_move());
//!     board = *decision.state();
//!     board.spawn_random_tile(&mut rg).unwrap();
//! }
//! ```

/// The concrete 4x4 board, move resolution and tile spawning.
pub mod board;
/// Error types for board operations.
pub mod error;
/// The decision loop that feeds search results back into a live game.
pub mod game;
/// The static evaluation used at search cutoffs.
pub mod heuristic;
/// Contains the `SearchNode` struct, which represents a node in the search tree.
pub mod node;
/// Contains traits and implementations for random number generation.
pub mod random;
/// Alpha-beta and expectimax search over an arena tree.
pub mod search;
/// The `GameState` capability trait and the turn and spawn types it works with.
pub mod state;
