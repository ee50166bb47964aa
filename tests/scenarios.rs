//! End-to-end runs on small instances with known optima.

mod common;

use common::{arms, arms_optimum, brute_force, convex_twelve, held_karp, is_permutation};
use mcts_ant_colony::budget::Budget;
use mcts_ant_colony::config::{SolverConfig, SolverMode};
use mcts_ant_colony::driver::Driver;
use mcts_ant_colony::environment::Environment;
use mcts_ant_colony::location::Location;
use mcts_ant_colony::random::SeededRandomGenerator;
use mcts_ant_colony::solver::Solver;

const SEEDS: [u64; 10] = [1, 2, 3, 5, 8, 13, 21, 34, 55, 89];

/// Number of seeds whose tour is no longer than `accepted`.
fn hits(mode: SolverMode, locations: &[Location], optimum: f64, accepted: f64) -> usize {
    SEEDS
        .iter()
        .filter(|&&seed| {
            let solver = Solver::new(SolverConfig::new(mode).with_seed(seed)).unwrap();
            let tour = solver.solve(locations).unwrap();
            assert!(is_permutation(tour.ids(), locations.len()));
            assert!(tour.length() >= optimum - 1e-9);
            tour.length() <= accepted
        })
        .count()
}

#[test]
fn arms_oracle_matches_the_known_optimum() {
    let environment = Environment::build(&arms(), 50).unwrap();
    assert!((brute_force(&environment) - arms_optimum()).abs() < 1e-9);
    assert!((held_karp(&environment) - arms_optimum()).abs() < 1e-9);

    let tour = environment
        .score_tour(&[1, 2, 3, 4, 5, 10, 9, 8, 7, 6])
        .unwrap();
    assert!((tour - arms_optimum()).abs() < 1e-9);
}

#[test]
fn ant_system_finds_the_arms_tour() {
    let found = hits(SolverMode::AntSystem, &arms(), arms_optimum(), arms_optimum() * 1.01);
    assert!(found >= 8, "only {found} of 10 seeds within 1%");
}

#[test]
fn min_max_ant_system_finds_the_arms_tour() {
    let found = hits(SolverMode::MinMaxAntSystem, &arms(), arms_optimum(), arms_optimum() * 1.01);
    assert!(found >= 8, "only {found} of 10 seeds within 1%");
}

#[test]
fn monte_carlo_finds_the_arms_tour() {
    let found = hits(SolverMode::MonteCarlo, &arms(), arms_optimum(), arms_optimum() * 1.01);
    assert!(found >= 8, "only {found} of 10 seeds within 1%");
}

#[test]
fn tree_search_improves_on_its_first_rollout() {
    let mut environment = Environment::build(&arms(), 50).unwrap();
    environment
        .explore(5, &mut SeededRandomGenerator::new(4))
        .unwrap();

    let single = Driver::new(1)
        .run(&environment, Budget::Iterations(1))
        .unwrap();
    let searched = Driver::new(1)
        .run(&environment, Budget::Iterations(500))
        .unwrap();

    assert!(searched.length() <= single.length());
    assert!(is_permutation(searched.ids(), 10));
}

#[test]
fn colonies_find_the_convex_twelve() {
    let locations = convex_twelve();
    let optimum = held_karp(&Environment::build(&locations, 50).unwrap());

    for mode in [SolverMode::AntSystem, SolverMode::MinMaxAntSystem] {
        let found = hits(mode, &locations, optimum, optimum + 0.001);
        assert!(found >= 7, "{mode:?}: only {found} of 10 seeds within 0.001");
    }
}

#[test]
fn same_seed_same_tour() {
    for mode in [
        SolverMode::AntSystem,
        SolverMode::MinMaxAntSystem,
        SolverMode::MonteCarlo,
    ] {
        let config = SolverConfig::new(mode).with_seed(2024).with_iterations(30);
        let first = Solver::new(config.clone()).unwrap().solve(&arms()).unwrap();
        let second = Solver::new(config).unwrap().solve(&arms()).unwrap();
        assert_eq!(first, second, "{mode:?}");
    }
}
