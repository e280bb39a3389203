//! The decision loop around the search.
//!
//! [`Game`] owns the live board and applies either manual moves or the solver's choice,
//! followed by the environment's spawn. [`Autoplay`] runs that loop on a worker thread and
//! streams board snapshots back over a channel.

use crate::board::{Board, Direction, Snapshot};
use crate::error::BoardError;
use crate::random::RandomGenerator;
use crate::search::{Decision, SearchConfig, Solver, SolverBuilder};
use crate::state::Spawn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

/// Bound of the event queue between the worker and the presentation side.
const EVENT_QUEUE_DEPTH: usize = 64;

/// Notifications for whoever displays the board.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The agent moved; the snapshot is taken before the spawn.
    Moved {
        direction: Option<Direction>,
        snapshot: Snapshot,
    },
    /// The environment placed a tile.
    Spawned { spawn: Spawn, snapshot: Snapshot },
    /// No move changes the board any more.
    GameOver { snapshot: Snapshot, moves: usize },
}

/// One completed decision cycle.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub decision: Decision<Board>,
    pub spawn: Spawn,
}

/// A live game: the board plus the generator driving its spawns.
#[derive(Debug, Clone)]
pub struct Game<K: RandomGenerator> {
    board: Board,
    random: K,
    moves: usize,
}

impl<K: RandomGenerator> Game<K> {
    /// Starts a game on a fresh board with two random tiles.
    pub fn new(mut random: K) -> Self {
        let board = Board::new(&mut random);
        Self::from_board(board, random)
    }

    /// Starts a game on an existing board.
    pub fn from_board(board: Board, random: K) -> Self {
        Self {
            board,
            random,
            moves: 0,
        }
    }

    /// The live board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// A copy of the live cells for display.
    pub fn snapshot(&self) -> Snapshot {
        self.board.snapshot()
    }

    /// Number of moves that changed the board so far.
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// True once no move changes the board.
    pub fn is_over(&self) -> bool {
        self.board.is_terminal()
    }

    /// Replaces the board for seeding or debugging. On error the current board is kept.
    pub fn override_board(&mut self, cells: &[u32]) -> Result<(), BoardError> {
        self.board.replace(cells)
    }

    /// Applies a manual move and, only if it changed the board, one random spawn.
    pub fn action(&mut self, direction: Direction) -> Result<Option<Spawn>, BoardError> {
        if !self.board.apply_move(direction) {
            return Ok(None);
        }
        self.moves += 1;
        self.board.spawn_random_tile(&mut self.random).map(Some)
    }

    /// Runs one decision cycle: search, adopt the chosen child's board, then spawn.
    ///
    /// Returns `None` once the solver finds no legal move.
    pub fn advance<S: RandomGenerator>(
        &mut self,
        solver: &mut Solver<Board, S>,
    ) -> Result<Option<Cycle>, BoardError> {
        let Some(decision) = solver.search(self.board) else {
            log::info!(
                "game over after {} moves, largest tile {}",
                self.moves,
                self.board.max_tile()
            );
            return Ok(None);
        };
        self.board = *decision.state();
        self.moves += 1;
        let spawn = self.board.spawn_random_tile(&mut self.random)?;
        Ok(Some(Cycle { decision, spawn }))
    }
}

/// Handle to a game being played by the solver on a worker thread.
///
/// The worker checks the stop flag between decision cycles, so a stop takes effect once the
/// search in flight has finished.
pub struct Autoplay<K: RandomGenerator> {
    events: Receiver<GameEvent>,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Game<K>>,
}

impl<K> Autoplay<K>
where
    K: RandomGenerator + Send + 'static,
{
    /// Starts playing `game` with a solver built from `config`.
    ///
    /// `max_moves` ends the game early after that many decision cycles.
    pub fn spawn<S>(game: Game<K>, config: SearchConfig, max_moves: Option<usize>) -> Self
    where
        S: RandomGenerator + 'static,
    {
        let (sender, events) = mpsc::sync_channel(EVENT_QUEUE_DEPTH);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let handle = thread::spawn(move || {
            let solver = SolverBuilder::<S>::new().with_config(config).build();
            play(game, solver, sender, &stop_flag, max_moves)
        });
        Self {
            events,
            stop,
            handle,
        }
    }

    /// Events from the worker. Iteration ends when the worker exits.
    pub fn events(&self) -> &Receiver<GameEvent> {
        &self.events
    }

    /// Asks the worker to stop before its next search.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Waits for the worker to finish and returns the final game.
    ///
    /// Undelivered events are dropped, so a worker blocked on a full queue is released.
    pub fn join(self) -> thread::Result<Game<K>> {
        drop(self.events);
        self.handle.join()
    }
}

fn play<K: RandomGenerator, S: RandomGenerator>(
    mut game: Game<K>,
    mut solver: Solver<Board, S>,
    sender: SyncSender<GameEvent>,
    stop: &AtomicBool,
    max_moves: Option<usize>,
) -> Game<K> {
    let mut cycles = 0;
    while !stop.load(Ordering::Relaxed) {
        if max_moves.is_some_and(|limit| cycles >= limit) {
            log::info!("stopping after {cycles} moves");
            break;
        }
        let events = match game.advance(&mut solver) {
            Ok(Some(cycle)) => {
                cycles += 1;
                vec![
                    GameEvent::Moved {
                        direction: cycle.decision.prev_move(),
                        snapshot: cycle.decision.state().snapshot(),
                    },
                    GameEvent::Spawned {
                        spawn: cycle.spawn,
                        snapshot: game.snapshot(),
                    },
                ]
            }
            Ok(None) => {
                let _ = sender.send(GameEvent::GameOver {
                    snapshot: game.snapshot(),
                    moves: game.moves(),
                });
                break;
            }
            Err(err) => {
                log::error!("decision cycle failed: {err}");
                break;
            }
        };
        if events.into_iter().any(|event| sender.send(event).is_err()) {
            log::debug!("event receiver dropped, stopping");
            break;
        }
    }
    game
}
