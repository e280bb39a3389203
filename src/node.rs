use crate::state::{GameState, Spawn, Successor, Turn};

/// A single node of the search tree.
///
/// The node owns its state outright. Parent links live in the tree arena, so a node never
/// holds a reference to its ancestors.
#[derive(Debug, Clone)]
pub struct SearchNode<T: GameState> {
    /// Ply distance from the root. The root is 0.
    pub depth: usize,
    /// Who moves from this node.
    pub turn: Turn,
    /// The game state that this node represents.
    pub state: T,
    /// The agent move that led here. `None` for the root and for spawn children.
    pub prev_move: Option<T::Move>,
    /// The tile the environment placed to reach this node.
    pub last_tile: Option<Spawn>,
}

impl<T: GameState> SearchNode<T> {
    /// A root node; the agent is always the one to move at the root.
    pub fn root(state: T) -> Self {
        SearchNode {
            depth: 0,
            turn: Turn::Agent,
            state,
            prev_move: None,
            last_tile: None,
        }
    }

    /// Wraps a successor of `self` one ply deeper, with the turn flipped.
    pub fn child(&self, successor: Successor<T>) -> Self {
        SearchNode {
            depth: self.depth + 1,
            turn: self.turn.opponent(),
            state: successor.state,
            prev_move: successor.prev_move,
            last_tile: successor.spawn,
        }
    }

    /// True for the node a search started from.
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// True when the search must score this node instead of expanding it.
    pub fn is_cutoff(&self, max_depth: usize) -> bool {
        self.depth >= max_depth || self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, Direction};
    use crate::node::SearchNode;
    use crate::random::SeededRandomGenerator;
    use crate::state::{GameState, SpawnPolicy, Turn};

    #[test]
    fn children_are_one_ply_deeper_with_flipped_turn() {
        let mut rg = SeededRandomGenerator::default();
        let root = SearchNode::root(Board::new(&mut rg));
        assert!(root.is_root());

        let successors = root
            .state
            .generate_successors(root.turn, SpawnPolicy::Sampled, &mut rg);
        let child = root.child(successors[0].clone());
        assert_eq!(child.depth, 1);
        assert_eq!(child.turn, Turn::Environment);
        assert!(child.prev_move.is_some());
        assert!(child.last_tile.is_none());

        let spawns = child
            .state
            .generate_successors(child.turn, SpawnPolicy::Sampled, &mut rg);
        let grandchild = child.child(spawns[0].clone());
        assert_eq!(grandchild.depth, 2);
        assert_eq!(grandchild.turn, Turn::Agent);
        assert!(grandchild.last_tile.is_some());
    }

    #[test]
    fn cutoff_at_depth_bound() {
        let mut cells = [0; 16];
        cells[0] = 2;
        let root = SearchNode::root(Board::from_cells(&cells).unwrap());
        assert!(root.is_cutoff(0));
        assert!(!root.is_cutoff(1));

        let mut board = root.state;
        board.apply_move(Direction::Right);
        assert_eq!(root.state.cells()[0], 2);
    }
}
