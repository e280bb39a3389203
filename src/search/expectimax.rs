use crate::random::RandomGenerator;
use crate::search::{SearchContext, TreeSearch};
use crate::state::{GameState, SpawnPolicy, Turn};
use ego_tree::NodeId;

/// Maximises over agent moves and averages over every possible spawn, weighted by its chance.
///
/// Environment nodes are always expanded exhaustively; no pruning is attempted.
pub struct Expectimax;

impl TreeSearch for Expectimax {
    fn run<T: GameState, K: RandomGenerator>(ctx: &mut SearchContext<'_, T, K>) -> f64 {
        let root = ctx.root_id();
        value(ctx, root)
    }
}

fn value<T: GameState, K: RandomGenerator>(ctx: &mut SearchContext<'_, T, K>, id: NodeId) -> f64 {
    if ctx.is_cutoff(id) {
        return ctx.evaluate(id);
    }
    match ctx.node(id).turn {
        Turn::Agent => max_value(ctx, id),
        Turn::Environment => exp_value(ctx, id),
    }
}

fn max_value<T: GameState, K: RandomGenerator>(
    ctx: &mut SearchContext<'_, T, K>,
    id: NodeId,
) -> f64 {
    let children = ctx.expand(id);
    if children.is_empty() {
        return ctx.evaluate(id);
    }

    let is_root = ctx.node(id).is_root();
    let mut best = f64::NEG_INFINITY;
    for child in children {
        let child_value = value(ctx, child);
        if is_root {
            ctx.record(child_value, child);
        }
        best = best.max(child_value);
    }
    best
}

fn exp_value<T: GameState, K: RandomGenerator>(
    ctx: &mut SearchContext<'_, T, K>,
    id: NodeId,
) -> f64 {
    let children = ctx.expand_with(id, SpawnPolicy::Exhaustive);
    if children.is_empty() {
        return ctx.evaluate(id);
    }

    let mut expected = 0.0;
    for child in children {
        let weight = ctx.chance(id, child);
        expected += weight * value(ctx, child);
    }
    expected
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, Direction};
    use crate::heuristic::HeuristicWeights;
    use crate::random::SeededRandomGenerator;
    use crate::search::{Solver, SolverBuilder, Strategy};
    use crate::state::{GameState, SpawnPolicy, Turn};

    fn expectimax(board: &Board, turn: Turn, depth: usize, max_depth: usize) -> f64 {
        let weights = HeuristicWeights::default();
        if depth >= max_depth || board.is_terminal() {
            return board.evaluate(&weights);
        }
        let mut rg = SeededRandomGenerator::default();
        let children = board.generate_successors(turn, SpawnPolicy::Exhaustive, &mut rg);
        if children.is_empty() {
            return board.evaluate(&weights);
        }
        match turn {
            Turn::Agent => children
                .iter()
                .map(|child| expectimax(&child.state, Turn::Environment, depth + 1, max_depth))
                .fold(f64::NEG_INFINITY, f64::max),
            Turn::Environment => children
                .iter()
                .map(|child| {
                    let spawn = child.spawn.unwrap();
                    let value = expectimax(&child.state, Turn::Agent, depth + 1, max_depth);
                    board.chance(&spawn) * value
                })
                .sum(),
        }
    }

    fn solver() -> Solver<Board, SeededRandomGenerator> {
        // the sampled policy must be ignored
        SolverBuilder::new()
            .with_strategy(Strategy::Expectimax)
            .with_spawn_policy(SpawnPolicy::Sampled)
            .build()
    }

    fn board() -> Board {
        Board::from_cells(&[
            2, 4, 8, 16, //
            4, 8, 0, 2, //
            0, 2, 4, 0, //
            2, 0, 0, 4,
        ])
        .unwrap()
    }

    #[test]
    fn matches_reference_expectation() {
        for depth in 1..=3 {
            // arrange
            let mut solver = solver();

            // act
            let decision = solver.search_to_depth(board(), depth).unwrap();

            // assert
            let mut rg = SeededRandomGenerator::default();
            let mut best: Option<(Direction, f64)> = None;
            for child in board().generate_successors(Turn::Agent, SpawnPolicy::Exhaustive, &mut rg)
            {
                let value = expectimax(&child.state, Turn::Environment, 1, depth);
                if best.is_none_or(|(_, best_value)| value > best_value) {
                    best = Some((child.prev_move.unwrap(), value));
                }
            }
            let (direction, value) = best.unwrap();
            assert_eq!(decision.prev_move(), Some(direction));
            assert!((decision.value - value).abs() < 1e-9);
        }
    }

    #[test]
    fn environment_weights_sum_to_one() {
        let mut solver = solver();
        solver.search_to_depth(board(), 2).unwrap();
        let tree = solver.last_tree().unwrap();

        for environment in tree.children(tree.root_id()) {
            let parent = &tree.node(environment).state;
            let children = tree.children(environment);
            assert_eq!(children.len(), 2 * parent.empty_count());
            let total: f64 = children
                .iter()
                .filter_map(|&child| tree.node(child).last_tile)
                .map(|spawn| parent.chance(&spawn))
                .sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn every_root_child_is_evaluated() {
        let mut solver = solver();
        let decision = solver.search_to_depth(board(), 2).unwrap();
        let tree = solver.last_tree().unwrap();
        let legal = Direction::ALL
            .iter()
            .filter(|&&direction| board().apply_move(direction))
            .count();
        assert_eq!(tree.children(tree.root_id()).len(), legal);
        assert_eq!(decision.expanded, 1 + legal);
    }
}
