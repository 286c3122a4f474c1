//! One-shot strategy run from the command line

use std::path::PathBuf;
use std::process;

use chess_strategist_core::parser::parse_pgn_file;
use chess_strategist_core::{Error, LlmConfig, PipelineInput, Result, Side, StrategyService};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strategy")]
#[command(about = "Build a verified strategic plan for a chess position", long_about = None)]
struct Args {
    /// Starting position; defaults to the initial position
    #[arg(short, long)]
    fen: Option<String>,

    /// Moves played from the starting position, e.g. "1. e4 e5 2. Nf3"
    #[arg(short, long, conflicts_with = "pgn")]
    moves: Option<String>,

    /// PGN file; the first game's mainline is used
    #[arg(short, long)]
    pgn: Option<PathBuf>,

    /// Side to plan for
    #[arg(short, long, default_value = "white")]
    side: Side,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let input = pipeline_input(args)?;
    let service = StrategyService::from_config(LlmConfig::from_env()?)?;
    let output = service.pipeline().run(input).await?;

    println!("Position features:");
    println!("{}", serde_json::to_string_pretty(&output.position_features)?);
    println!();
    println!("Structure insights:");
    println!("{}", serde_json::to_string_pretty(&output.structure_insights)?);
    println!();
    println!("Verification:");
    println!("{}", serde_json::to_string_pretty(&output.verification)?);
    println!();
    println!("{}", output.formatted_strategy);
    println!();
    println!("Draft narrative:");
    println!("{}", output.draft_narrative);

    Ok(())
}

fn pipeline_input(args: Args) -> Result<PipelineInput> {
    let fen = args.fen.unwrap_or_default();

    match (args.moves, args.pgn) {
        (Some(moves), _) => Ok(PipelineInput::new(fen, moves, args.side)),
        (None, Some(path)) => {
            let mut games = parse_pgn_file(&path)?;
            let game = games.swap_remove(0);
            let fen = if fen.is_empty() {
                game.fen.clone().unwrap_or_default()
            } else {
                fen
            };
            Ok(PipelineInput::new(fen, game.movetext(), args.side))
        }
        (None, None) => Err(Error::validation("either --moves or --pgn must be given")),
    }
}
