use mcts_ant_colony::config::{SolverConfig, SolverMode};
use mcts_ant_colony::error::Result;
use mcts_ant_colony::location::Location;
use mcts_ant_colony::solver::Solver;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    // Two arms meeting at (1, 1) and one far point
    let points = [
        (1.0, 1.0),
        (1.0, 2.0),
        (1.0, 3.0),
        (1.0, 4.0),
        (1.0, 5.0),
        (2.0, 1.0),
        (3.0, 1.0),
        (4.0, 1.0),
        (5.0, 1.0),
        (10.0, 10.0),
    ];
    let locations: Vec<Location> = points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Location::new(i + 1, x, y))
        .collect();

    println!("Shortest possible: {:.4}", 8.0 + 2.0 * 106f64.sqrt());
    for mode in [
        SolverMode::AntSystem,
        SolverMode::MinMaxAntSystem,
        SolverMode::MonteCarlo,
    ] {
        let solver = Solver::new(SolverConfig::new(mode).with_seed(7))?;
        let tour = solver.solve(&locations)?;
        println!("{:?}: {:.4} via {:?}", mode, tour.length(), tour.ids());
    }

    Ok(())
}
