use crate::random::RandomGenerator;
use crate::search::{SearchContext, TreeSearch};
use crate::state::GameState;
use ego_tree::NodeId;

/// Minimax where the environment is treated as an adversary placing the worst tile.
///
/// Environment children come from the configured spawn policy, so the sampled policy trades
/// exactness for a smaller branching factor.
pub struct AlphaBeta;

impl TreeSearch for AlphaBeta {
    fn run<T: GameState, K: RandomGenerator>(ctx: &mut SearchContext<'_, T, K>) -> f64 {
        let root = ctx.root_id();
        max_value(ctx, root, f64::NEG_INFINITY, f64::INFINITY)
    }
}

fn max_value<T: GameState, K: RandomGenerator>(
    ctx: &mut SearchContext<'_, T, K>,
    id: NodeId,
    mut alpha: f64,
    beta: f64,
) -> f64 {
    if ctx.is_cutoff(id) {
        return ctx.evaluate(id);
    }
    let children = ctx.expand(id);
    if children.is_empty() {
        return ctx.evaluate(id);
    }

    let is_root = ctx.node(id).is_root();
    let mut value = f64::NEG_INFINITY;
    for child in children {
        let child_value = min_value(ctx, child, alpha, beta);
        if is_root {
            ctx.record(child_value, child);
        }
        value = value.max(child_value);
        if value >= beta {
            return value;
        }
        alpha = alpha.max(value);
    }
    value
}

fn min_value<T: GameState, K: RandomGenerator>(
    ctx: &mut SearchContext<'_, T, K>,
    id: NodeId,
    alpha: f64,
    mut beta: f64,
) -> f64 {
    if ctx.is_cutoff(id) {
        return ctx.evaluate(id);
    }
    let children = ctx.expand(id);
    if children.is_empty() {
        return ctx.evaluate(id);
    }

    let mut value = f64::INFINITY;
    for child in children {
        value = value.min(max_value(ctx, child, alpha, beta));
        if value <= alpha {
            return value;
        }
        beta = beta.min(value);
    }
    value
}
