// Waypoint pathfinding around static obstacles.
//
// Movement orders go through `find_path`: direct line when nothing is in the
// way, otherwise A* over a coarse walkability grid followed by string-pulling
// so units cut corners instead of hugging grid cells.

use super::content::MapConfig;
use super::math::{Vec2, blocked_by_obstacles};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Grid cell edge length. Coarse on purpose: obstacles in content are large
/// and the per-tick collision pass catches everything finer.
const CELL: f32 = 50.0;
/// Sampling step for line-of-sight tests.
const LOS_STEP: f32 = 25.0;

/// True when a unit of `radius` can walk the straight segment `a -> b`.
pub fn line_of_sight(map: &MapConfig, a: Vec2, b: Vec2, radius: f32) -> bool {
    let dist = a.distance(b);
    if dist <= f32::EPSILON {
        return true;
    }
    let steps = (dist / LOS_STEP).ceil() as usize;
    let dir = a.direction_to(b);
    for i in 1..=steps {
        let p = if i == steps {
            b
        } else {
            a.add(dir.scale(LOS_STEP * i as f32))
        };
        if blocked_by_obstacles(&map.obstacles, p, radius) {
            return false;
        }
    }
    true
}

/// Waypoint path from `from` to `to`, excluding `from`, ending at `to`.
///
/// Falls back to the straight line when the goal is unreachable on the grid;
/// the collision pass then stops the unit at the obstacle edge.
pub fn find_path(map: &MapConfig, from: Vec2, to: Vec2, radius: f32) -> Vec<Vec2> {
    let to = map.bounds.clamp(to);
    if line_of_sight(map, from, to, radius) {
        return vec![to];
    }

    let Some(cells) = grid_search(map, from, to, radius) else {
        return vec![to];
    };

    simplify(map, from, cells, to, radius)
}

fn cols(map: &MapConfig) -> i32 {
    ((map.bounds.max.x - map.bounds.min.x) / CELL).ceil() as i32
}

fn rows(map: &MapConfig) -> i32 {
    ((map.bounds.max.z - map.bounds.min.z) / CELL).ceil() as i32
}

fn cell_of(map: &MapConfig, p: Vec2) -> (i32, i32) {
    (
        ((p.x - map.bounds.min.x) / CELL) as i32,
        ((p.z - map.bounds.min.z) / CELL) as i32,
    )
}

fn cell_center(map: &MapConfig, c: (i32, i32)) -> Vec2 {
    Vec2::new(
        map.bounds.min.x + (c.0 as f32 + 0.5) * CELL,
        map.bounds.min.z + (c.1 as f32 + 0.5) * CELL,
    )
}

fn walkable(map: &MapConfig, c: (i32, i32), radius: f32) -> bool {
    c.0 >= 0
        && c.1 >= 0
        && c.0 < cols(map)
        && c.1 < rows(map)
        && !blocked_by_obstacles(&map.obstacles, cell_center(map, c), radius)
}

/// A* over grid cells; returns the cell chain from start (exclusive) to the
/// goal cell (inclusive), or None when no route exists.
fn grid_search(map: &MapConfig, from: Vec2, to: Vec2, radius: f32) -> Option<Vec<(i32, i32)>> {
    let start = cell_of(map, from);
    let goal = cell_of(map, to);
    let w = cols(map);
    let h = rows(map);
    let idx = |c: (i32, i32)| (c.1 * w + c.0) as usize;

    let mut open: BinaryHeap<Reverse<(u32, (i32, i32))>> = BinaryHeap::new();
    let mut cost = vec![u32::MAX; (w * h) as usize];
    let mut came: Vec<Option<(i32, i32)>> = vec![None; (w * h) as usize];

    let heuristic = |c: (i32, i32)| -> u32 {
        let dx = (c.0 - goal.0).unsigned_abs();
        let dz = (c.1 - goal.1).unsigned_abs();
        // Octile distance scaled by 10 to stay in integers.
        let (lo, hi) = if dx < dz { (dx, dz) } else { (dz, dx) };
        lo * 14 + (hi - lo) * 10
    };

    cost[idx(start)] = 0;
    open.push(Reverse((heuristic(start), start)));

    const DIRS: [(i32, i32); 8] = [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];

    while let Some(Reverse((_, current))) = open.pop() {
        if current == goal {
            let mut chain = vec![current];
            let mut c = current;
            while let Some(prev) = came[idx(c)] {
                if prev == start {
                    break;
                }
                chain.push(prev);
                c = prev;
            }
            chain.reverse();
            return Some(chain);
        }

        for (dx, dz) in DIRS {
            let next = (current.0 + dx, current.1 + dz);
            if !walkable(map, next, radius) {
                continue;
            }
            // Diagonal steps must not cut a blocked corner.
            if dx != 0 && dz != 0 {
                if !walkable(map, (current.0 + dx, current.1), radius)
                    || !walkable(map, (current.0, current.1 + dz), radius)
                {
                    continue;
                }
            }
            let step = if dx != 0 && dz != 0 { 14 } else { 10 };
            let next_cost = cost[idx(current)].saturating_add(step);
            if next_cost < cost[idx(next)] {
                cost[idx(next)] = next_cost;
                came[idx(next)] = Some(current);
                open.push(Reverse((next_cost + heuristic(next), next)));
            }
        }
    }

    None
}

/// String-pulling: drop every waypoint that keeps line of sight to the one
/// after it, then terminate the path at the exact requested point.
fn simplify(
    map: &MapConfig,
    from: Vec2,
    cells: Vec<(i32, i32)>,
    to: Vec2,
    radius: f32,
) -> Vec<Vec2> {
    let mut points: Vec<Vec2> = cells.iter().map(|&c| cell_center(map, c)).collect();
    points.push(to);

    let mut out = Vec::new();
    let mut anchor = from;
    let mut i = 0;
    while i < points.len() {
        // Furthest point still visible from the anchor.
        let mut furthest = i;
        for (j, &p) in points.iter().enumerate().skip(i + 1) {
            if line_of_sight(map, anchor, p, radius) {
                furthest = j;
            }
        }
        anchor = points[furthest];
        out.push(anchor);
        i = furthest + 1;
    }

    if out.last() != Some(&to) {
        out.push(to);
    }
    out
}
