//! Seeded arena layout: bordered grid, hard-block pillars, corner spawn
//! pockets and a random soft-block fill.

use super::*;

pub(super) fn generate_grid(rng: &mut ChaCha8Rng, rows: usize, cols: usize) -> Grid {
    let mut grid = Grid::new(rows, cols);
    for y in 1..rows - 1 {
        for x in 1..cols - 1 {
            let pos = Pos { y: y as i32, x: x as i32 };
            if x % 2 == 0 && y % 2 == 0 {
                grid.set_tile(pos, TileKind::HardBlock);
            } else if is_spawn_pocket(pos, rows, cols) {
                // Corner pockets stay open so no player starts walled in.
            } else if percent_roll(rng, SOFT_BLOCK_CHANCE_PCT) {
                grid.set_tile(pos, TileKind::SoftBlock);
            }
        }
    }
    grid
}

/// Corner spawn centers, clockwise from top-left.
pub(super) fn spawn_positions(rows: usize, cols: usize) -> [(f64, f64); 4] {
    let (rows, cols) = (rows as f64, cols as f64);
    [
        (1.5, 1.5),
        (cols - 1.5, 1.5),
        (1.5, rows - 1.5),
        (cols - 1.5, rows - 1.5),
    ]
}

fn is_spawn_pocket(pos: Pos, rows: usize, cols: usize) -> bool {
    let (rows, cols) = (rows as i32, cols as i32);
    let pockets = [
        (1, 1),
        (2, 1),
        (1, 2),
        (cols - 2, 1),
        (cols - 3, 1),
        (cols - 2, 2),
        (1, rows - 2),
        (1, rows - 3),
        (2, rows - 2),
        (cols - 2, rows - 2),
        (cols - 2, rows - 3),
        (cols - 3, rows - 2),
    ];
    pockets.iter().any(|&(x, y)| pos.x == x && pos.y == y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::neighbors;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn layout_has_border_pillars_and_open_spawn_pockets() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let grid = generate_grid(&mut rng, DEFAULT_ROWS, DEFAULT_COLS);

        for x in 0..DEFAULT_COLS as i32 {
            assert_eq!(grid.tile_at(Pos { y: 0, x }), TileKind::HardBlock);
            assert_eq!(grid.tile_at(Pos { y: DEFAULT_ROWS as i32 - 1, x }), TileKind::HardBlock);
        }
        for y in (2..DEFAULT_ROWS as i32 - 1).step_by(2) {
            for x in (2..DEFAULT_COLS as i32 - 1).step_by(2) {
                assert_eq!(grid.tile_at(Pos { y, x }), TileKind::HardBlock);
            }
        }
        for (x, y) in spawn_positions(DEFAULT_ROWS, DEFAULT_COLS) {
            let tile = Pos { y: y.floor() as i32, x: x.floor() as i32 };
            assert_eq!(grid.tile_at(tile), TileKind::Empty, "spawn tile {tile:?}");
            // Each pocket keeps at least one open neighbor to walk out through.
            let open_exit =
                neighbors(tile).iter().any(|&n| grid.tile_at(n) == TileKind::Empty);
            assert!(open_exit, "spawn {tile:?} must not be sealed");
        }
    }

    #[test]
    fn same_seed_generates_the_same_layout() {
        let mut a = ChaCha8Rng::seed_from_u64(77);
        let mut b = ChaCha8Rng::seed_from_u64(77);
        let left = generate_grid(&mut a, DEFAULT_ROWS, DEFAULT_COLS);
        let right = generate_grid(&mut b, DEFAULT_ROWS, DEFAULT_COLS);
        assert_eq!(left.tiles, right.tiles);
    }
}
