//! Deterministic weighted shortest-path search over the tile grid.
//! This module exists so traversal rules are shared by every goal category.
//! It does not own target selection or movement execution.

use std::collections::{BTreeMap, BTreeSet};

use super::danger::DangerMap;
use crate::state::{Bomb, Grid};
use crate::types::{Pos, TileKey, TileKind};

/// Surcharge for entering a soft block when digging is allowed; keeps open
/// routes preferred over routes that need a bomb first.
const SOFT_BLOCK_COST: u32 = 10;

/// Surcharge for entering a tile in the caller's danger set; a long safe
/// detour beats a short dangerous one, but a dangerous route still beats none.
const DANGER_COST: u32 = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    cost: u32,
    seq: u32,
    y: i32,
    x: i32,
}

/// Shortest path from `start` to `goal`, excluding `start` itself.
///
/// Returns `Some(vec![])` when start equals goal and `None` when no
/// traversable route exists. Hard blocks never traverse; soft blocks only
/// with `allow_dig`; bomb tiles never traverse except the searcher's own
/// start tile. Equal-cost frontier entries expand first-in-first-out with
/// neighbors generated up, down, left, right.
pub fn find_path(
    grid: &Grid,
    bombs: &BTreeMap<TileKey, Bomb>,
    start: Pos,
    goal: Pos,
    allow_dig: bool,
    danger: Option<&DangerMap>,
) -> Option<Vec<Pos>> {
    if !grid.in_bounds(start) || !grid.in_bounds(goal) {
        return None;
    }
    if start == goal {
        return Some(Vec::new());
    }
    if !is_walkable(grid, bombs, goal, allow_dig, None) {
        return None;
    }

    let mut open = BTreeSet::new();
    let mut dist: BTreeMap<Pos, u32> = BTreeMap::new();
    let mut came_from: BTreeMap<Pos, Pos> = BTreeMap::new();
    let mut seq = 0u32;

    dist.insert(start, 0);
    open.insert(OpenNode { cost: 0, seq, y: start.y, x: start.x });

    while let Some(node) = open.pop_first() {
        let current = Pos { y: node.y, x: node.x };
        let current_cost = *dist.get(&current).expect("open node must have a distance");
        if node.cost > current_cost {
            continue; // stale entry superseded by a cheaper relaxation
        }
        if current == goal {
            return Some(reconstruct_path(&came_from, start, goal));
        }

        for next in neighbors(current) {
            if !is_walkable(grid, bombs, next, allow_dig, Some(start)) {
                continue;
            }
            let tentative = current_cost.saturating_add(edge_cost(grid, next, danger));
            if tentative < dist.get(&next).copied().unwrap_or(u32::MAX) {
                came_from.insert(next, current);
                dist.insert(next, tentative);
                seq += 1;
                open.insert(OpenNode { cost: tentative, seq, y: next.y, x: next.x });
            }
        }
    }

    None
}

pub(super) fn is_walkable(
    grid: &Grid,
    bombs: &BTreeMap<TileKey, Bomb>,
    pos: Pos,
    allow_dig: bool,
    own_tile: Option<Pos>,
) -> bool {
    if !grid.in_bounds(pos) {
        return false;
    }
    match grid.tile_at(pos) {
        TileKind::HardBlock => return false,
        TileKind::SoftBlock if !allow_dig => return false,
        TileKind::SoftBlock | TileKind::Empty => {}
    }
    if own_tile != Some(pos) && bombs.contains_key(&grid.key(pos)) {
        return false;
    }
    true
}

fn edge_cost(grid: &Grid, into: Pos, danger: Option<&DangerMap>) -> u32 {
    let mut cost = 1;
    if grid.tile_at(into) == TileKind::SoftBlock {
        cost += SOFT_BLOCK_COST;
    }
    if danger.is_some_and(|set| set.contains(&grid.key(into))) {
        cost += DANGER_COST;
    }
    cost
}

fn reconstruct_path(came_from: &BTreeMap<Pos, Pos>, start: Pos, goal: Pos) -> Vec<Pos> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = *came_from.get(&current).expect("path must be reconstructible");
        path.push(current);
    }
    path.reverse();
    path.remove(0);
    path
}

pub fn neighbors(pos: Pos) -> [Pos; 4] {
    [
        Pos { y: pos.y - 1, x: pos.x },
        Pos { y: pos.y + 1, x: pos.x },
        Pos { y: pos.y, x: pos.x - 1 },
        Pos { y: pos.y, x: pos.x + 1 },
    ]
}

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[cfg(test)]
mod tests {
    #![allow(unused_imports)]

    use super::*;
    use crate::bot::test_support::*;
    use crate::types::*;

    #[test]
    fn straight_line_path_has_expected_waypoints() {
        let grid = open_grid(7, 7);
        let path = find_path(&grid, &BTreeMap::new(), Pos { y: 3, x: 2 }, Pos { y: 3, x: 5 }, false, None)
            .expect("path");
        assert_eq!(path, vec![Pos { y: 3, x: 3 }, Pos { y: 3, x: 4 }, Pos { y: 3, x: 5 }]);
    }

    #[test]
    fn start_equals_goal_yields_empty_path() {
        let grid = open_grid(7, 7);
        let path = find_path(&grid, &BTreeMap::new(), Pos { y: 3, x: 3 }, Pos { y: 3, x: 3 }, false, None);
        assert_eq!(path, Some(Vec::new()));
    }

    #[test]
    fn hard_block_goal_is_not_found() {
        let mut grid = open_grid(7, 7);
        grid.set_tile(Pos { y: 3, x: 5 }, TileKind::HardBlock);
        let path = find_path(&grid, &BTreeMap::new(), Pos { y: 3, x: 2 }, Pos { y: 3, x: 5 }, true, None);
        assert_eq!(path, None);
    }

    #[test]
    fn out_of_bounds_goal_is_not_found() {
        let grid = open_grid(7, 7);
        let path = find_path(&grid, &BTreeMap::new(), Pos { y: 3, x: 2 }, Pos { y: 9, x: 2 }, true, None);
        assert_eq!(path, None);
    }

    #[test]
    fn soft_blocks_wall_off_the_goal_unless_digging() {
        let mut grid = open_grid(5, 7);
        for y in 1..4 {
            grid.set_tile(Pos { y, x: 3 }, TileKind::SoftBlock);
        }
        let start = Pos { y: 2, x: 2 };
        let goal = Pos { y: 2, x: 5 };

        assert_eq!(find_path(&grid, &BTreeMap::new(), start, goal, false, None), None);

        let dug = find_path(&grid, &BTreeMap::new(), start, goal, true, None).expect("dig path");
        assert!(dug.contains(&Pos { y: 2, x: 3 }), "dig route passes through the wall");
    }

    #[test]
    fn digging_is_dispreferred_when_an_open_detour_exists() {
        // Direct route digs one soft block (cost 11 + 1); the detour is 4
        // plain steps. The planner must take the detour.
        let mut grid = open_grid(5, 5);
        grid.set_tile(Pos { y: 2, x: 2 }, TileKind::SoftBlock);
        let start = Pos { y: 2, x: 1 };
        let goal = Pos { y: 2, x: 3 };

        let path = find_path(&grid, &BTreeMap::new(), start, goal, true, None).expect("path");
        assert_eq!(path.len(), 4);
        assert!(!path.contains(&Pos { y: 2, x: 2 }));
    }

    #[test]
    fn danger_surcharge_prefers_the_longer_safe_route() {
        let grid = open_grid(5, 5);
        let start = Pos { y: 2, x: 1 };
        let goal = Pos { y: 2, x: 3 };
        let mut danger = DangerMap::new();
        danger.insert(grid.key(Pos { y: 2, x: 2 }));

        let path =
            find_path(&grid, &BTreeMap::new(), start, goal, false, Some(&danger)).expect("path");
        assert_eq!(path.len(), 4);
        assert!(!path.contains(&Pos { y: 2, x: 2 }));
    }

    #[test]
    fn dangerous_route_is_still_produced_when_it_is_the_only_one() {
        let mut grid = open_grid(5, 7);
        for y in 1..4 {
            grid.set_tile(Pos { y, x: 3 }, TileKind::HardBlock);
        }
        grid.set_tile(Pos { y: 2, x: 3 }, TileKind::Empty);
        let mut danger = DangerMap::new();
        danger.insert(grid.key(Pos { y: 2, x: 3 }));

        let path = find_path(
            &grid,
            &BTreeMap::new(),
            Pos { y: 2, x: 2 },
            Pos { y: 2, x: 4 },
            false,
            Some(&danger),
        )
        .expect("only route runs through danger");
        assert_eq!(path, vec![Pos { y: 2, x: 3 }, Pos { y: 2, x: 4 }]);
    }

    #[test]
    fn bomb_tiles_block_except_the_own_start_tile() {
        let grid = open_grid(5, 7);
        let start = Pos { y: 2, x: 2 };
        let bombs = bombs_at(&grid, &[bomb(start, 1), bomb(Pos { y: 2, x: 4 }, 1)]);

        // Standing on one's own fresh bomb must not strand the search.
        let path = find_path(&grid, &bombs, start, Pos { y: 2, x: 5 }, false, None)
            .expect("route around the second bomb");
        assert!(!path.contains(&Pos { y: 2, x: 4 }), "other bombs stay impassable");
        assert!(!path.contains(&start));

        // A goal tile under a bomb is unreachable.
        assert_eq!(find_path(&grid, &bombs, start, Pos { y: 2, x: 4 }, false, None), None);
    }

    #[test]
    fn unreachable_goal_returns_none_not_a_partial_path() {
        let mut grid = open_grid(7, 7);
        for pos in neighbors(Pos { y: 3, x: 3 }) {
            grid.set_tile(pos, TileKind::HardBlock);
        }
        let path = find_path(&grid, &BTreeMap::new(), Pos { y: 3, x: 3 }, Pos { y: 1, x: 1 }, false, None);
        assert_eq!(path, None);
    }

    #[test]
    fn returned_paths_are_cardinally_adjacent_throughout() {
        let mut grid = open_grid(9, 9);
        grid.set_tile(Pos { y: 4, x: 4 }, TileKind::HardBlock);
        grid.set_tile(Pos { y: 3, x: 4 }, TileKind::HardBlock);
        let start = Pos { y: 4, x: 2 };
        let goal = Pos { y: 4, x: 6 };

        let path = find_path(&grid, &BTreeMap::new(), start, goal, false, None).expect("path");
        let mut prev = start;
        for step in &path {
            assert_eq!(manhattan(prev, *step), 1, "{prev:?} -> {step:?}");
            assert_ne!(grid.tile_at(*step), TileKind::HardBlock);
            prev = *step;
        }
        assert_eq!(prev, goal);
    }

    #[test]
    fn equal_cost_expansion_prefers_the_up_down_left_right_order() {
        // Both L-shaped routes around the blocked center cost the same; the
        // fixed neighbor order makes the search settle the upper detour.
        let mut grid = open_grid(7, 7);
        grid.set_tile(Pos { y: 3, x: 3 }, TileKind::HardBlock);
        let path = find_path(&grid, &BTreeMap::new(), Pos { y: 3, x: 2 }, Pos { y: 3, x: 4 }, false, None)
            .expect("path");
        assert_eq!(path[0], Pos { y: 2, x: 2 });
    }
}
