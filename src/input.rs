//! Browser input for the crawler: key normalisation and tap targets.
//!
//! Every frame the renderer registers click targets in terminal cells.
//! A tap arrives in DOM pixels relative to the grid element; [`ClickState::action_at`]
//! scales it onto the cell grid and returns the topmost target under it.

use ratzilla::event::KeyCode;
use ratzilla::ratatui::layout::{Position, Rect};

/// Enter / Return.
pub const KEY_ENTER: char = '\n';
/// Escape.
pub const KEY_ESC: char = '\u{1b}';

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(char),
    /// Tap on a registered target (see `crawler::actions`).
    Click(u16),
}

#[derive(Debug, Clone)]
struct ClickTarget {
    rect: Rect,
    action_id: u16,
}

/// Targets of the frame currently on screen, plus the grid size they live in.
#[derive(Debug, Default)]
pub struct ClickState {
    targets: Vec<ClickTarget>,
    cols: u16,
    rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame's targets and record the new grid size.
    pub fn begin_frame(&mut self, cols: u16, rows: u16) {
        self.targets.clear();
        self.cols = cols;
        self.rows = rows;
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// One-row target spanning `area`; rows outside `area` are dropped.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.bottom() {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Later targets sit on top of earlier ones.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets
            .iter()
            .rev()
            .find(|t| t.rect.contains(Position::new(col, row)))
            .map(|t| t.action_id)
    }

    /// Action under a pixel offset inside a grid element of `width × height` px.
    pub fn action_at(&self, x: f64, y: f64, width: f64, height: f64) -> Option<u16> {
        let col = cell_index(x, width, self.cols)?;
        let row = cell_index(y, height, self.rows)?;
        let action = self.hit_test(col, row);
        tracing::debug!(col, row, ?action, "tap");
        action
    }
}

/// Which of `cells` equal slices of `extent` pixels contains `offset`.
fn cell_index(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 || offset >= extent {
        return None;
    }
    let index = (offset * cells as f64 / extent) as u16;
    Some(index.min(cells - 1))
}

/// Normalize a browser key into the character the game dispatches on.
///
/// Arrow keys alias WASD (up/down move, left/right turn).
pub fn key_to_char(code: &KeyCode) -> Option<char> {
    match code {
        KeyCode::Char(c) => Some(c.to_ascii_lowercase()),
        KeyCode::Up => Some('w'),
        KeyCode::Down => Some('s'),
        KeyCode::Left => Some('a'),
        KeyCode::Right => Some('d'),
        KeyCode::Enter => Some(KEY_ENTER),
        KeyCode::Esc => Some(KEY_ESC),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 40×20 grid of 10×20 px cells.
    fn sized() -> ClickState {
        let mut cs = ClickState::new();
        cs.begin_frame(40, 20);
        cs
    }

    #[test]
    fn cell_index_scales_pixels_onto_cells() {
        assert_eq!(cell_index(0.0, 400.0, 40), Some(0));
        assert_eq!(cell_index(9.9, 400.0, 40), Some(0));
        assert_eq!(cell_index(10.0, 400.0, 40), Some(1));
        assert_eq!(cell_index(399.0, 400.0, 40), Some(39));
        // 13 rows in 200 px: non-integral cell height.
        assert_eq!(cell_index(199.9, 200.0, 13), Some(12));
    }

    #[test]
    fn cell_index_rejects_outside_and_degenerate() {
        assert_eq!(cell_index(-0.5, 400.0, 40), None);
        assert_eq!(cell_index(400.0, 400.0, 40), None);
        assert_eq!(cell_index(5.0, 0.0, 40), None);
        assert_eq!(cell_index(5.0, 400.0, 0), None);
    }

    #[test]
    fn unsized_state_never_hits() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 10, 10), 1);
        assert_eq!(cs.action_at(5.0, 5.0, 100.0, 100.0), None);
    }

    #[test]
    fn control_buttons_side_by_side() {
        // Dungeon control bar: a 3-row block, one target per label.
        let mut cs = sized();
        cs.add_click_target(Rect::new(2, 17, 8, 3), 110);
        cs.add_click_target(Rect::new(10, 17, 5, 3), 111);

        assert_eq!(cs.action_at(25.0, 17.0 * 20.0 + 1.0, 400.0, 400.0), Some(110));
        assert_eq!(cs.action_at(105.0, 19.0 * 20.0 + 19.0, 400.0, 400.0), Some(111));
        assert_eq!(cs.action_at(155.0, 18.0 * 20.0, 400.0, 400.0), None);
        assert_eq!(cs.action_at(25.0, 16.0 * 20.0 + 19.0, 400.0, 400.0), None);
    }

    #[test]
    fn later_target_wins_on_overlap() {
        let mut cs = sized();
        cs.add_click_target(Rect::new(0, 5, 40, 1), 1);
        cs.add_click_target(Rect::new(5, 5, 10, 1), 2);
        assert_eq!(cs.hit_test(7, 5), Some(2));
        assert_eq!(cs.hit_test(0, 5), Some(1));
        assert_eq!(cs.hit_test(7, 6), None);
    }

    #[test]
    fn row_targets_stay_inside_their_area() {
        let mut cs = sized();
        let town = Rect::new(1, 4, 30, 10);
        cs.add_row_target(town, 3, 10);
        cs.add_row_target(town, 6, 20);
        cs.add_row_target(town, 14, 30);
        assert_eq!(cs.hit_test(1, 6), Some(20));
        assert_eq!(cs.hit_test(30, 6), Some(20));
        assert_eq!(cs.hit_test(31, 6), None);
        assert_eq!(cs.hit_test(1, 3), None);
        assert_eq!(cs.hit_test(1, 14), None);
    }

    #[test]
    fn new_frame_drops_old_targets() {
        let mut cs = sized();
        cs.add_click_target(Rect::new(0, 0, 40, 20), 130);
        assert_eq!(cs.hit_test(3, 3), Some(130));
        cs.begin_frame(30, 10);
        assert_eq!(cs.hit_test(3, 3), None);
        // Same pixel maps onto the new, coarser grid.
        cs.add_click_target(Rect::new(0, 0, 1, 1), 131);
        assert_eq!(cs.action_at(9.0, 19.0, 300.0, 200.0), Some(131));
    }

    #[test]
    fn arrows_alias_wasd() {
        assert_eq!(key_to_char(&KeyCode::Up), Some('w'));
        assert_eq!(key_to_char(&KeyCode::Down), Some('s'));
        assert_eq!(key_to_char(&KeyCode::Left), Some('a'));
        assert_eq!(key_to_char(&KeyCode::Right), Some('d'));
    }

    #[test]
    fn chars_are_lowercased() {
        assert_eq!(key_to_char(&KeyCode::Char('W')), Some('w'));
        assert_eq!(key_to_char(&KeyCode::Char('3')), Some('3'));
        assert_eq!(key_to_char(&KeyCode::Char(' ')), Some(' '));
    }

    #[test]
    fn confirm_and_cancel_keys() {
        assert_eq!(key_to_char(&KeyCode::Enter), Some(KEY_ENTER));
        assert_eq!(key_to_char(&KeyCode::Esc), Some(KEY_ESC));
        assert_eq!(key_to_char(&KeyCode::Tab), None);
    }
}
