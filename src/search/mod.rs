//! Bounded-depth tree search over [`GameState`]s.
//!
//! Every call to [`Solver::search`] builds a fresh arena tree from the given root, walks it with
//! the configured [`Strategy`], and returns the best immediate child of the root. Nothing is
//! cached between calls.

/// Depth-bounded minimax with alpha-beta pruning.
pub mod alpha_beta;
/// Depth-bounded expectimax over exhaustive environment children.
pub mod expectimax;

use crate::heuristic::HeuristicWeights;
use crate::node::SearchNode;
use crate::random::{RandomGenerator, StandardRandomGenerator};
use crate::state::{GameState, SpawnPolicy};
use ego_tree::{NodeId, Tree};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use alpha_beta::AlphaBeta;
pub use expectimax::Expectimax;

/// Default number of nodes reserved in the arena up front.
pub const DEFAULT_NODE_CAPACITY: usize = 4096;
/// Default number of plies searched below the root.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// The tree-search algorithm used to pick a move.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    AlphaBeta,
    Expectimax,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "alpha_beta" | "alphabeta" | "minimax" => Ok(Strategy::AlphaBeta),
            "expectimax" => Ok(Strategy::Expectimax),
            other => Err(format!("unknown search strategy: {other}")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::AlphaBeta => f.write_str("alpha_beta"),
            Strategy::Expectimax => f.write_str("expectimax"),
        }
    }
}

/// Everything that parameterises a search call.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub strategy: Strategy,
    /// Plies explored below the root. 0 scores the root and selects nothing.
    pub max_depth: usize,
    /// Environment expansion for alpha-beta. Expectimax always expands exhaustively.
    pub spawn_policy: SpawnPolicy,
    pub weights: HeuristicWeights,
    pub node_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            spawn_policy: SpawnPolicy::default(),
            weights: HeuristicWeights::default(),
            node_capacity: DEFAULT_NODE_CAPACITY,
        }
    }
}

/// The child of the root a search settled on.
#[derive(Debug, Clone)]
pub struct Decision<T: GameState> {
    pub node: SearchNode<T>,
    /// Backed-up value of `node`.
    pub value: f64,
    /// Number of nodes whose successors were generated during the search.
    pub expanded: usize,
}

impl<T: GameState> Decision<T> {
    /// The chosen child's state, before any environment spawn.
    pub fn state(&self) -> &T {
        &self.node.state
    }

    /// The move that leads from the root to the chosen child.
    pub fn prev_move(&self) -> Option<T::Move> {
        self.node.prev_move
    }
}

/// Arena holding one search call's tree.
///
/// Parent links are arena indices, so ancestry can be queried without any node owning another.
pub struct SearchTree<T: GameState> {
    tree: Tree<SearchNode<T>>,
    len: usize,
}

impl<T: GameState> SearchTree<T> {
    /// A tree holding only `root`, with room reserved for `capacity` nodes.
    pub fn new(root: T, capacity: usize) -> Self {
        Self {
            tree: Tree::with_capacity(SearchNode::root(root), capacity),
            len: 1,
        }
    }

    /// Id of the node the search started from.
    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    /// Returns the node for `id`.
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &SearchNode<T> {
        self.tree
            .get(id)
            .expect("BUG: node id does not belong to this search tree")
            .value()
    }

    /// Arena id of the parent of `id`; `None` for the root or a foreign id.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.parent().map(|parent| parent.id())
    }

    /// Children of `id` in generation order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|node| node.children().map(|child| child.id()).collect())
            .unwrap_or_default()
    }

    /// Nodes from the parent of `id` up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<&SearchNode<T>> {
        self.tree
            .get(id)
            .map(|node| node.ancestors().map(|ancestor| ancestor.value()).collect())
            .unwrap_or_default()
    }

    /// Total number of nodes in the tree, root included. Never below 1.
    pub fn node_count(&self) -> usize {
        self.len
    }

    /// Generates the successors of `id` for its turn and attaches them as children.
    pub fn expand<K: RandomGenerator>(
        &mut self,
        id: NodeId,
        policy: SpawnPolicy,
        random: &mut K,
    ) -> Vec<NodeId> {
        let parent = self.node(id).clone();
        let successors = parent.state.generate_successors(parent.turn, policy, random);
        let mut parent_mut = self
            .tree
            .get_mut(id)
            .expect("BUG: node id does not belong to this search tree");
        let mut ids = Vec::with_capacity(successors.len());
        for successor in successors {
            ids.push(parent_mut.append(parent.child(successor)).id());
        }
        self.len += ids.len();
        ids
    }
}

/// Walks a tree inside a [`SearchContext`] and returns the root's backed-up value.
pub trait TreeSearch {
    fn run<T: GameState, K: RandomGenerator>(ctx: &mut SearchContext<'_, T, K>) -> f64;
}

/// State shared by one search call: the arena, the depth bound and the root recordings.
pub struct SearchContext<'a, T: GameState, K: RandomGenerator> {
    pub tree: SearchTree<T>,
    config: &'a SearchConfig,
    max_depth: usize,
    random: &'a mut K,
    evaluations: Vec<(f64, NodeId)>,
    expanded: usize,
}

impl<'a, T: GameState, K: RandomGenerator> SearchContext<'a, T, K> {
    /// A context whose tree holds only `root`.
    pub fn new(root: T, max_depth: usize, config: &'a SearchConfig, random: &'a mut K) -> Self {
        Self {
            tree: SearchTree::new(root, config.node_capacity),
            config,
            max_depth,
            random,
            evaluations: Vec::new(),
            expanded: 0,
        }
    }

    /// Id of the root node.
    pub fn root_id(&self) -> NodeId {
        self.tree.root_id()
    }

    /// See [`SearchTree::node`].
    pub fn node(&self, id: NodeId) -> &SearchNode<T> {
        self.tree.node(id)
    }

    /// True when `id` is at the depth bound or its state is terminal.
    pub fn is_cutoff(&self, id: NodeId) -> bool {
        self.node(id).is_cutoff(self.max_depth)
    }

    /// Heuristic value of the state at `id`.
    pub fn evaluate(&self, id: NodeId) -> f64 {
        self.node(id).state.evaluate(&self.config.weights)
    }

    /// Expands `id` using the configured environment policy.
    pub fn expand(&mut self, id: NodeId) -> Vec<NodeId> {
        self.expand_with(id, self.config.spawn_policy)
    }

    /// Expands `id` with an explicit environment policy.
    pub fn expand_with(&mut self, id: NodeId, policy: SpawnPolicy) -> Vec<NodeId> {
        self.expanded += 1;
        self.tree.expand(id, policy, &mut *self.random)
    }

    /// Probability of reaching `child` from its parent through the environment's spawn.
    pub fn chance(&self, parent: NodeId, child: NodeId) -> f64 {
        self.node(child)
            .last_tile
            .map_or(0.0, |spawn| self.node(parent).state.chance(&spawn))
    }

    /// Records the value of a root child for final selection.
    pub fn record(&mut self, value: f64, child: NodeId) {
        log::trace!(
            "root child {:?} valued {value:.3}",
            self.node(child).prev_move
        );
        self.evaluations.push((value, child));
    }

    /// Picks the recorded child with the highest value; the first one wins ties.
    fn select(&self) -> Option<Decision<T>> {
        let mut best: Option<(f64, NodeId)> = None;
        for &(value, id) in &self.evaluations {
            if best.is_none_or(|(best_value, _)| value > best_value) {
                best = Some((value, id));
            }
        }
        best.map(|(value, id)| Decision {
            node: self.node(id).clone(),
            value,
            expanded: self.expanded,
        })
    }
}

/// Runs the configured search strategy against successive roots.
pub struct Solver<T: GameState, K: RandomGenerator = StandardRandomGenerator> {
    config: SearchConfig,
    random: K,
    last_tree: Option<SearchTree<T>>,
}

/// A builder for creating instances of [`Solver`].
pub struct SolverBuilder<K: RandomGenerator> {
    config: SearchConfig,
    random_generator: K,
}

impl<K: RandomGenerator> Default for SolverBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RandomGenerator> SolverBuilder<K> {
    /// A builder with [`SearchConfig::default`] and a default-constructed generator.
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
            random_generator: K::default(),
        }
    }

    /// Replaces every setting at once.
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the search algorithm.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Sets the number of plies searched below the root.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Sets how alpha-beta expands environment turns.
    pub fn with_spawn_policy(mut self, policy: SpawnPolicy) -> Self {
        self.config.spawn_policy = policy;
        self
    }

    /// Sets the heuristic weights used at cutoffs.
    pub fn with_weights(mut self, weights: HeuristicWeights) -> Self {
        self.config.weights = weights;
        self
    }

    /// Sets the number of arena nodes reserved per search.
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.config.node_capacity = capacity;
        self
    }

    /// Sets the generator used to sample environment children.
    pub fn with_random_generator(mut self, rg: K) -> Self {
        self.random_generator = rg;
        self
    }

    /// Builds a [`Solver`] for states of type `T`.
    pub fn build<T: GameState>(self) -> Solver<T, K> {
        Solver {
            config: self.config,
            random: self.random_generator,
            last_tree: None,
        }
    }
}

impl<T: GameState, K: RandomGenerator> Solver<T, K> {
    /// Settings every search of this solver uses.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Tree built by the most recent search, kept for inspection until the next one.
    pub fn last_tree(&self) -> Option<&SearchTree<T>> {
        self.last_tree.as_ref()
    }

    /// Searches `root` to the configured depth.
    pub fn search(&mut self, root: T) -> Option<Decision<T>> {
        self.search_to_depth(root, self.config.max_depth)
    }

    /// Searches `root` exploring at most `max_depth` plies.
    ///
    /// Returns `None` when the root has no move that changes it, or when `max_depth` is 0.
    pub fn search_to_depth(&mut self, root: T, max_depth: usize) -> Option<Decision<T>> {
        let mut ctx = SearchContext::new(root, max_depth, &self.config, &mut self.random);
        let root_value = match self.config.strategy {
            Strategy::AlphaBeta => AlphaBeta::run(&mut ctx),
            Strategy::Expectimax => Expectimax::run(&mut ctx),
        };
        let decision = ctx.select();
        match &decision {
            Some(decision) => log::debug!(
                "{} depth {max_depth}: chose {:?} valued {:.3} after expanding {} nodes",
                self.config.strategy,
                decision.prev_move(),
                decision.value,
                decision.expanded
            ),
            None => log::debug!(
                "{} depth {max_depth}: no move available, root valued {root_value:.3}",
                self.config.strategy
            ),
        }
        self.last_tree = Some(ctx.tree);
        decision
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, CELLS, Direction};
    use crate::random::SeededRandomGenerator;
    use crate::search::{SearchConfig, SearchTree, Solver, SolverBuilder, Strategy};
    use crate::state::{SpawnPolicy, Turn};

    fn sample_board() -> Board {
        let mut cells = [0; CELLS];
        cells[0] = 2;
        cells[1] = 2;
        cells[15] = 4;
        Board::from_cells(&cells).unwrap()
    }

    #[test]
    fn expand_links_children_to_parent() {
        // arrange
        let mut rg = SeededRandomGenerator::default();
        let mut tree = SearchTree::new(sample_board(), 16);
        let root = tree.root_id();

        // act
        let moves = tree.expand(root, SpawnPolicy::Sampled, &mut rg);
        let spawns = tree.expand(moves[0], SpawnPolicy::Exhaustive, &mut rg);

        // assert
        assert_eq!(tree.node_count(), 1 + moves.len() + spawns.len());
        assert_eq!(tree.children(root), moves);
        let leaf = spawns[0];
        assert_eq!(tree.parent(leaf), Some(moves[0]));
        assert_eq!(tree.node(leaf).depth, 2);
        assert_eq!(tree.node(leaf).turn, Turn::Agent);
        let ancestors = tree.ancestors(leaf);
        assert_eq!(ancestors.len(), 2);
        assert_eq!(ancestors[1].depth, 0);
    }

    #[test]
    fn successors_never_touch_the_parent_state() {
        let mut rg = SeededRandomGenerator::default();
        let mut tree = SearchTree::new(sample_board(), 16);
        let root = tree.root_id();
        tree.expand(root, SpawnPolicy::Sampled, &mut rg);
        assert_eq!(tree.node(root).state, sample_board());
    }

    #[test]
    fn depth_zero_selects_nothing() {
        for strategy in [Strategy::AlphaBeta, Strategy::Expectimax] {
            let mut solver: Solver<Board, SeededRandomGenerator> =
                SolverBuilder::new().with_strategy(strategy).build();
            assert!(solver.search_to_depth(sample_board(), 0).is_none());
            assert_eq!(solver.last_tree().map(|tree| tree.node_count()), Some(1));
        }
    }

    #[test]
    fn terminal_root_selects_nothing() {
        let cells = [
            2, 4, 8, 16, //
            4, 8, 16, 2, //
            2, 4, 8, 16, //
            4, 8, 16, 2,
        ];
        let board = Board::from_cells(&cells).unwrap();
        for strategy in [Strategy::AlphaBeta, Strategy::Expectimax] {
            let mut solver: Solver<Board, SeededRandomGenerator> =
                SolverBuilder::new().with_strategy(strategy).build();
            assert!(solver.search(board).is_none());
        }
    }

    #[test]
    fn decision_is_a_legal_root_child() {
        let mut solver: Solver<Board, SeededRandomGenerator> = SolverBuilder::new()
            .with_max_depth(2)
            .with_node_capacity(64)
            .build();
        let decision = solver.search(sample_board()).unwrap();
        let direction = decision.prev_move().unwrap();
        let mut expected = sample_board();
        assert!(expected.apply_move(direction));
        assert_eq!(decision.state(), &expected);
        assert_eq!(decision.node.depth, 1);
        assert!(Direction::ALL.contains(&direction));
    }

    #[test]
    fn strategy_parsing() {
        assert_eq!("alpha-beta".parse::<Strategy>(), Ok(Strategy::AlphaBeta));
        assert_eq!("Expectimax".parse::<Strategy>(), Ok(Strategy::Expectimax));
        assert!("mcts".parse::<Strategy>().is_err());
        assert_eq!(Strategy::Expectimax.to_string(), "expectimax");
    }

    #[test]
    fn default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.strategy, Strategy::AlphaBeta);
        assert_eq!(config.spawn_policy, SpawnPolicy::Sampled);
        assert_eq!(config.max_depth, 4);
    }
}
