//! Floor generation: recursive-backtracking maze with dead-end relief.
//!
//! 1. Carve a perfect maze from the entry cell on the odd lattice, two cells
//!    per step, using an explicit stack instead of call recursion.
//! 2. Relief pass: every interior dead end opens one random interior wall
//!    neighbour, which adds loops without breaking connectivity.
//! 3. Place a single stairs cell on a random path cell other than the entry.
//! 4. Re-assert the outer wall ring.

// Grid algorithms use index-based loops for clarity.
#![allow(clippy::needless_range_loop)]

use rand::seq::SliceRandom;
use rand::Rng;

use super::state::{Cell, Floor};

/// Smallest width/height that leaves a carvable interior.
pub const MIN_DIMENSION: usize = 5;

/// Where the player arrives on every floor.
pub const ENTRY: (usize, usize) = (1, 1);

const STAIRS_ATTEMPT_LIMIT: u32 = 10_000;

const DIRS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FloorError {
    #[error("floor {width}x{height} is too small to carve (minimum {min}x{min})")]
    TooSmall { width: usize, height: usize, min: usize },

    #[error("no path cell for the stairs after {attempts} attempts")]
    StairsPlacement { attempts: u32 },
}

// ── Generation ────────────────────────────────────────────────

pub fn generate_floor<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    rng: &mut R,
) -> Result<Floor, FloorError> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(FloorError::TooSmall { width, height, min: MIN_DIMENSION });
    }

    let mut floor = Floor::filled(width, height, Cell::Wall);
    carve(&mut floor, ENTRY, rng);
    let opened = relieve_dead_ends(&mut floor, rng);
    let (sx, sy) = place_stairs(&mut floor, rng)?;
    enforce_border(&mut floor);

    tracing::debug!(width, height, opened, stairs_x = sx, stairs_y = sy, "generated floor");
    Ok(floor)
}

/// Strictly inside the outer wall ring.
fn is_interior(floor: &Floor, x: i32, y: i32) -> bool {
    x >= 1 && y >= 1 && x <= floor.width as i32 - 2 && y <= floor.height as i32 - 2
}

// ── Carve ─────────────────────────────────────────────────────

/// One suspended `carve(x, y)` call: its cell, its shuffled directions and
/// how many of them it has tried so far.
struct Frame {
    x: usize,
    y: usize,
    dirs: [(i32, i32); 4],
    next: usize,
}

fn open_frame<R: Rng + ?Sized>(floor: &mut Floor, x: usize, y: usize, rng: &mut R) -> Frame {
    floor.grid[y][x] = Cell::Path;
    let mut dirs = DIRS;
    dirs.shuffle(rng);
    Frame { x, y, dirs, next: 0 }
}

fn carve<R: Rng + ?Sized>(floor: &mut Floor, start: (usize, usize), rng: &mut R) {
    let mut stack = vec![open_frame(floor, start.0, start.1, rng)];

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.dirs.len() {
            stack.pop();
            continue;
        }
        let (dx, dy) = frame.dirs[frame.next];
        frame.next += 1;

        let (x, y) = (frame.x as i32, frame.y as i32);
        let (nx, ny) = (x + dx * 2, y + dy * 2);
        if !is_interior(floor, nx, ny) || floor.grid[ny as usize][nx as usize] != Cell::Wall {
            continue;
        }
        floor.grid[(y + dy) as usize][(x + dx) as usize] = Cell::Path;
        let child = open_frame(floor, nx as usize, ny as usize, rng);
        stack.push(child);
    }
}

// ── Relief pass ───────────────────────────────────────────────

/// Opens one wall next to each dead end, in raster order. Carves are visible
/// to cells visited later in the same pass. Returns how many walls opened.
fn relieve_dead_ends<R: Rng + ?Sized>(floor: &mut Floor, rng: &mut R) -> usize {
    let mut opened = 0;

    for y in 1..floor.height - 1 {
        for x in 1..floor.width - 1 {
            if floor.grid[y][x] != Cell::Path {
                continue;
            }
            let (cx, cy) = (x as i32, y as i32);
            let walls = DIRS
                .iter()
                .filter(|(dx, dy)| floor.cell_at(cx + dx, cy + dy) == Cell::Wall)
                .count();
            if walls < 3 {
                continue;
            }

            let mut dirs = DIRS;
            dirs.shuffle(rng);
            let candidate = dirs
                .iter()
                .map(|(dx, dy)| (cx + dx, cy + dy))
                .find(|&(nx, ny)| is_interior(floor, nx, ny) && floor.cell_at(nx, ny) == Cell::Wall);

            if let Some((nx, ny)) = candidate {
                floor.grid[ny as usize][nx as usize] = Cell::Path;
                opened += 1;
            }
        }
    }
    opened
}

// ── Stairs / border ───────────────────────────────────────────

fn place_stairs<R: Rng + ?Sized>(floor: &mut Floor, rng: &mut R) -> Result<(usize, usize), FloorError> {
    for _ in 0..STAIRS_ATTEMPT_LIMIT {
        let x = rng.gen_range(1..floor.width - 1);
        let y = rng.gen_range(1..floor.height - 1);
        if floor.grid[y][x] == Cell::Path && (x, y) != ENTRY {
            floor.grid[y][x] = Cell::Stairs;
            return Ok((x, y));
        }
    }
    Err(FloorError::StairsPlacement { attempts: STAIRS_ATTEMPT_LIMIT })
}

fn enforce_border(floor: &mut Floor) {
    let (w, h) = (floor.width, floor.height);
    for x in 0..w {
        floor.grid[0][x] = Cell::Wall;
        floor.grid[h - 1][x] = Cell::Wall;
    }
    for y in 0..h {
        floor.grid[y][0] = Cell::Wall;
        floor.grid[y][w - 1] = Cell::Wall;
    }
}
