//! Shared instances and exact oracles for the integration tests.

#![allow(dead_code)]

use mcts_ant_colony::environment::Environment;
use mcts_ant_colony::location::Location;

pub fn locations(points: &[(f64, f64)]) -> Vec<Location> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Location::new(i + 1, x, y))
        .collect()
}

/// Length of the closed tour through `ids`, summed straight from the
/// coordinates.
pub fn edge_sum(instance: &[Location], ids: &[usize]) -> f64 {
    let point = |id: usize| {
        instance
            .iter()
            .find(|location| location.id == id)
            .unwrap()
    };
    ids.iter()
        .zip(ids.iter().cycle().skip(1))
        .map(|(&from, &to)| {
            let (a, b) = (point(from), point(to));
            (a.x - b.x).hypot(a.y - b.y)
        })
        .sum()
}

/// Nearest-neighbour walk from `start` over the raw coordinates.
pub fn nearest_neighbour_walk(instance: &[Location], start: usize) -> Vec<usize> {
    let mut walk = vec![start];
    while walk.len() < instance.len() {
        let current = instance.iter().find(|l| l.id == *walk.last().unwrap()).unwrap();
        let next = instance
            .iter()
            .filter(|l| !walk.contains(&l.id))
            .min_by(|a, b| current.distance_to(a).total_cmp(&current.distance_to(b)))
            .unwrap();
        walk.push(next.id);
    }
    walk
}

/// Two arms of unit-spaced points meeting at (1, 1) and one far point.
/// The shortest tour walks out one arm, over to the far point and back down
/// the other arm.
pub fn arms() -> Vec<Location> {
    locations(&[
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
    ])
}

pub fn arms_optimum() -> f64 {
    8.0 + 2.0 * 106f64.sqrt()
}

/// Twelve points on an ellipse at irregular angles, listed out of angular
/// order. Points in convex position are visited in hull order by the
/// shortest tour.
pub fn convex_twelve() -> Vec<Location> {
    let degrees = [
        172.0, 27.0, 295.0, 110.0, 0.0, 228.0, 80.0, 330.0, 140.0, 55.0, 260.0, 200.0,
    ];
    let points: Vec<(f64, f64)> = degrees
        .iter()
        .map(|d: &f64| {
            let angle = d.to_radians();
            (50.0 + 40.0 * angle.cos(), 50.0 + 25.0 * angle.sin())
        })
        .collect();
    locations(&points)
}

/// Exact optimum by trying every tour that starts at location 1.
pub fn brute_force(environment: &Environment) -> f64 {
    fn extend(
        environment: &Environment,
        current: usize,
        visited: &mut [bool],
        remaining: usize,
        length: f64,
        best: &mut f64,
    ) {
        if length >= *best {
            return;
        }
        if remaining == 0 {
            let closed = length + environment.distance(current, 1).unwrap();
            if closed < *best {
                *best = closed;
            }
            return;
        }
        for next in 2..=environment.len() {
            if visited[next] {
                continue;
            }
            visited[next] = true;
            let step = environment.distance(current, next).unwrap();
            extend(environment, next, visited, remaining - 1, length + step, best);
            visited[next] = false;
        }
    }

    let size = environment.len();
    let mut visited = vec![false; size + 1];
    visited[1] = true;
    let mut best = f64::INFINITY;
    extend(environment, 1, &mut visited, size - 1, 0.0, &mut best);
    best
}

/// Exact optimum by dynamic programming over subsets (Held-Karp).
pub fn held_karp(environment: &Environment) -> f64 {
    let size = environment.len();
    let others = size - 1;
    let distance = |i: usize, j: usize| environment.distance(i + 1, j + 1).unwrap();

    // cost[set][last]: shortest path from location 1 through `set`, ending at `last`.
    // Bit k of `set` stands for location k + 2.
    let full = 1usize << others;
    let mut cost = vec![vec![f64::INFINITY; others]; full];
    for last in 0..others {
        cost[1 << last][last] = distance(0, last + 1);
    }
    for set in 1..full {
        for last in 0..others {
            if set & (1 << last) == 0 || !cost[set][last].is_finite() {
                continue;
            }
            for next in 0..others {
                if set & (1 << next) != 0 {
                    continue;
                }
                let extended = set | (1 << next);
                let candidate = cost[set][last] + distance(last + 1, next + 1);
                if candidate < cost[extended][next] {
                    cost[extended][next] = candidate;
                }
            }
        }
    }
    (0..others)
        .map(|last| cost[full - 1][last] + distance(last + 1, 0))
        .fold(f64::INFINITY, f64::min)
}

pub fn is_permutation(ids: &[usize], size: usize) -> bool {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted == (1..=size).collect::<Vec<_>>()
}
