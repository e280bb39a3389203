use crate::heuristic::HeuristicWeights;
use crate::random::RandomGenerator;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The capability interface the search engines walk.
///
/// A state knows how to expand itself for either ply, how to score itself at a cutoff,
/// and whether play has ended. The searches never look inside the state beyond this.
pub trait GameState: Clone {
    /// The type representing an agent action, e.g. a slide direction.
    type Move: Copy + Debug + PartialEq;

    /// Returns the children of this state for the given ply.
    ///
    /// For [`Turn::Agent`] only moves that change the state are emitted. For
    /// [`Turn::Environment`] the `policy` decides between enumerating every outcome per cell
    /// and drawing one outcome per cell from `random`.
    fn generate_successors<K: RandomGenerator>(
        &self,
        turn: Turn,
        policy: SpawnPolicy,
        random: &mut K,
    ) -> Vec<Successor<Self>>;

    /// Static desirability of this state, used only at cutoff nodes.
    fn evaluate(&self, weights: &HeuristicWeights) -> f64;

    /// True when no move can change the state any more.
    fn is_terminal(&self) -> bool;

    /// Probability that the environment produces `spawn` from this state.
    fn chance(&self, spawn: &Spawn) -> f64;
}

/// Whose ply it is at a node.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum Turn {
    /// The maximizing player choosing a slide direction.
    Agent,
    /// The stochastic side placing a new tile.
    Environment,
}

impl Turn {
    /// The side that moves next.
    pub fn opponent(self) -> Turn {
        match self {
            Turn::Agent => Turn::Environment,
            Turn::Environment => Turn::Agent,
        }
    }
}

/// How environment successors are generated.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// One child per empty cell, its tile value drawn from the spawn table.
    #[default]
    Sampled,
    /// Two children per empty cell, one for each possible tile value.
    Exhaustive,
    /// Exhaustive while at most `max_empty` cells are empty, sampled above that.
    Adaptive { max_empty: usize },
}

impl SpawnPolicy {
    /// Whether a state with `empty` free cells is expanded exhaustively.
    pub fn is_exhaustive(self, empty: usize) -> bool {
        match self {
            SpawnPolicy::Sampled => false,
            SpawnPolicy::Exhaustive => true,
            SpawnPolicy::Adaptive { max_empty } => empty <= max_empty,
        }
    }
}

/// A tile placed by the environment.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct Spawn {
    pub index: usize,
    pub value: u32,
}

/// One generated child state and what produced it.
#[derive(Debug, Clone)]
pub struct Successor<T: GameState> {
    pub state: T,
    /// Set for agent plies.
    pub prev_move: Option<T::Move>,
    /// Set for environment plies.
    pub spawn: Option<Spawn>,
}
