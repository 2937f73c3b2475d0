//! The peripheral shell (spec §2's ≈15%): accepts a FEN, runs one bounded
//! search, and prints the chosen UCI move plus the debug summary. Thin by
//! design - none of the interesting engineering lives here, it's all in
//! `harrier::mcts`.

use clap::Parser;
use harrier::config::SearchConfig;
use harrier::evaluator::Evaluator;
use harrier::game::chess::ChessAdapter;
use harrier::Search;

/// Runs a single MCTS search from a FEN position and prints the best move.
#[derive(Parser, Debug)]
#[command(name = "search_cli")]
struct Args {
    /// Starting position in FEN notation.
    #[arg(long, default_value = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")]
    fen: String,

    /// Iteration budget.
    #[arg(long, default_value_t = SearchConfig::default().max_iterations)]
    max_iterations: u32,

    /// Wall-clock budget in seconds.
    #[arg(long, default_value_t = SearchConfig::default().max_seconds)]
    max_seconds: f64,

    /// PUCT exploration constant.
    #[arg(long, default_value_t = SearchConfig::default().cpuct)]
    cpuct: f64,

    /// Print the per-search debug summary (spec §6's observability surface).
    #[arg(long)]
    summary: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let evaluator: Option<Box<dyn Evaluator<ChessAdapter>>> = None; // rollout-only shell
    let mut search = match Search::new_search(
        &args.fen,
        args.max_iterations,
        args.max_seconds,
        args.cpuct,
        evaluator,
    ) {
        Ok(search) => search,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let (best, summary) = search.best_move_with_summary();
    if args.summary {
        print!("{summary}");
    }
    match best {
        Some(uci) => println!("{uci}"),
        None => println!("(none - no legal moves from this position)"),
    }
}
