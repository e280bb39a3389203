use clap::Parser;
use twenty48_search::board::{Board, DIM};
use twenty48_search::game::{Autoplay, Game, GameEvent};
use twenty48_search::random::SeededRandomGenerator;
use twenty48_search::search::{SearchConfig, Strategy};
use twenty48_search::state::SpawnPolicy;

#[derive(Parser, Debug)]
#[command(about = "Let the solver play one game of 2048")]
struct Args {
    /// Search algorithm: alpha_beta or expectimax.
    #[arg(long, default_value_t = Strategy::AlphaBeta)]
    strategy: Strategy,
    /// Plies searched below the live board.
    #[arg(long, default_value_t = 4)]
    depth: usize,
    /// Expand both tile values on every empty cell during alpha-beta.
    #[arg(long)]
    exhaustive: bool,
    /// Seed for tile spawns; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many moves.
    #[arg(long)]
    max_moves: Option<usize>,
    /// Log filter, e.g. "info", "debug".
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new().parse_filters(&args.log).init();

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("seed {seed}, {} to depth {}", args.strategy, args.depth);

    let config = SearchConfig {
        strategy: args.strategy,
        max_depth: args.depth,
        spawn_policy: if args.exhaustive {
            SpawnPolicy::Exhaustive
        } else {
            SpawnPolicy::Sampled
        },
        ..SearchConfig::default()
    };

    let game = Game::new(SeededRandomGenerator::new(seed));
    print_board(game.board());
    let autoplay = Autoplay::spawn::<SeededRandomGenerator>(game, config, args.max_moves);

    for event in autoplay.events().iter() {
        match event {
            GameEvent::Moved { direction, .. } => {
                if let Some(direction) = direction {
                    println!("-> {direction}");
                }
            }
            GameEvent::Spawned { snapshot, .. } => {
                print_cells(snapshot.as_slice());
            }
            GameEvent::GameOver { snapshot, moves } => {
                println!(
                    "Game over after {moves} moves, largest tile {}",
                    snapshot.max_tile()
                );
            }
        }
    }

    match autoplay.join() {
        Ok(game) => println!(
            "Moves made: {}, largest tile: {}",
            game.moves(),
            game.board().max_tile()
        ),
        Err(_) => eprintln!("solver thread panicked"),
    }
}

fn print_board(board: &Board) {
    print_cells(board.cells());
}

fn print_cells(cells: &[u32]) {
    for row in cells.chunks(DIM) {
        let line: Vec<String> = row.iter().map(|v| format!("{v:>5}")).collect();
        println!("{}", line.join(""));
    }
    println!();
}
