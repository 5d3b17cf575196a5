//! Fog of war: the explored overlay only ever grows.

use super::state::Floor;

/// Reveal the 3×3 block around `(x, y)`, clipped to the floor.
/// Returns how many cells were newly revealed.
pub fn reveal(floor: &mut Floor, x: i32, y: i32) -> usize {
    let mut revealed = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            let (cx, cy) = (x + dx, y + dy);
            if !floor.in_bounds(cx, cy) {
                continue;
            }
            let seen = &mut floor.explored[cy as usize][cx as usize];
            if !*seen {
                *seen = true;
                revealed += 1;
            }
        }
    }
    revealed
}
