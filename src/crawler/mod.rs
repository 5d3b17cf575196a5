//! Maze Crawler: first-person dungeon crawler.
//!
//! Screen-based input dispatch: digits pick options, WASD (or arrows) walk
//! the dungeon, Enter confirms, Esc/M/C open and close the menu.

pub mod actions;
pub mod config;
pub mod dialogue;
pub mod dungeon_map;
pub mod dungeon_view;
pub mod fog;
pub mod logic;
pub mod minimap;
pub mod projector;
pub mod raster;
pub mod render;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent, KEY_ENTER, KEY_ESC};

use actions::*;
use render::JOB_KEYS;
use state::{BattlePhase, CrawlerState, Screen, ALL_JOBS};

pub struct CrawlerGame {
    state: CrawlerState,
}

impl CrawlerGame {
    pub fn new(state: CrawlerState) -> Self {
        Self { state }
    }

    /// Returns whether the event changed anything.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(ch) => handle_key(&mut self.state, *ch),
            InputEvent::Click(id) => handle_click(&mut self.state, *id),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.state, f, area, click_state);
    }
}

fn is_confirm(ch: char) -> bool {
    ch == KEY_ENTER || ch == ' '
}

// ── Input Handling ──────────────────────────────────────────

fn handle_key(state: &mut CrawlerState, ch: char) -> bool {
    match state.screen {
        Screen::Town => handle_town_key(state, ch),
        Screen::Dungeon => handle_dungeon_key(state, ch),
        Screen::Dialogue => is_confirm(ch) && logic::confirm_dialogue(state),
        Screen::Battle => handle_battle_key(state, ch),
        Screen::Menu => handle_menu_key(state, ch),
        Screen::GameOver => is_confirm(ch) && logic::revive(state),
    }
}

fn handle_click(state: &mut CrawlerState, id: u16) -> bool {
    match id {
        CONFIRM => match state.screen {
            Screen::Dialogue => logic::confirm_dialogue(state),
            Screen::Battle => logic::confirm_battle(state),
            _ => logic::clear_message(state),
        },
        REVIVE => logic::revive(state),
        OPEN_MENU => logic::open_menu(state),
        CLOSE_MENU => logic::close_menu(state),
        ENTER_DUNGEON => logic::enter_dungeon(state),
        MOVE_FORWARD => logic::move_forward(state),
        MOVE_BACK => logic::move_back(state),
        TURN_LEFT => logic::turn_left(state),
        TURN_RIGHT => logic::turn_right(state),
        BATTLE_ATTACK => logic::battle_attack(state),
        BATTLE_RUN => logic::battle_run(state),
        id if (SHOP_BUY_BASE..JOB_BASE).contains(&id) => {
            logic::buy_item(state, (id - SHOP_BUY_BASE) as usize)
        }
        id if (JOB_BASE..JOB_BASE + ALL_JOBS.len() as u16).contains(&id) => {
            logic::change_job(state, ALL_JOBS[(id - JOB_BASE) as usize])
        }
        id if (ITEM_USE_BASE..CLOSE_MENU).contains(&id) => {
            state.screen == Screen::Menu && logic::use_item(state, (id - ITEM_USE_BASE) as usize)
        }
        _ => false,
    }
}

// ── Town ────────────────────────────────────────────────────

fn handle_town_key(state: &mut CrawlerState, ch: char) -> bool {
    if let Some(i) = JOB_KEYS.iter().position(|&k| k == ch) {
        return logic::change_job(state, ALL_JOBS[i]);
    }
    match ch {
        '1' => logic::enter_dungeon(state),
        '2' | 'm' => logic::open_menu(state),
        '3'..='6' => logic::buy_item(state, (ch as u8 - b'3') as usize),
        c if is_confirm(c) => logic::clear_message(state),
        _ => false,
    }
}

// ── Dungeon ─────────────────────────────────────────────────

fn handle_dungeon_key(state: &mut CrawlerState, ch: char) -> bool {
    match ch {
        'w' => logic::move_forward(state),
        's' => logic::move_back(state),
        'a' => logic::turn_left(state),
        'd' => logic::turn_right(state),
        'm' | KEY_ESC => logic::open_menu(state),
        c if is_confirm(c) => logic::clear_message(state),
        _ => false,
    }
}

// ── Battle ──────────────────────────────────────────────────

fn handle_battle_key(state: &mut CrawlerState, ch: char) -> bool {
    let phase = state.battle.as_ref().map(|b| b.phase);
    match (phase, ch) {
        (Some(BattlePhase::SelectAction), '1') => logic::battle_attack(state),
        (Some(BattlePhase::SelectAction), '2' | 'm') => logic::open_menu(state),
        (Some(BattlePhase::SelectAction), '3') => logic::battle_run(state),
        (Some(BattlePhase::Victory | BattlePhase::Defeat), c) if is_confirm(c) => {
            logic::confirm_battle(state)
        }
        _ => false,
    }
}

// ── Menu ────────────────────────────────────────────────────

fn handle_menu_key(state: &mut CrawlerState, ch: char) -> bool {
    match ch {
        'c' | 'm' | KEY_ESC => logic::close_menu(state),
        '1'..='9' => logic::use_item(state, (ch as u8 - b'1') as usize),
        c if is_confirm(c) => logic::clear_message(state),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::config::CrawlerConfig;
    use crate::crawler::dialogue::Narrator;
    use crate::crawler::state::{Facing, ItemKind, Job, Pose};
    use crate::time::ManualClock;
    use ratzilla::ratatui::backend::TestBackend;
    use ratzilla::ratatui::buffer::Buffer;
    use ratzilla::ratatui::Terminal;

    fn new_game() -> CrawlerGame {
        let config = CrawlerConfig { encounter_percent: 0, ..CrawlerConfig::default() };
        let narrator = Narrator::new(Box::new(ManualClock::new()), &config);
        CrawlerGame::new(CrawlerState::new(config, narrator, 1))
    }

    fn key(game: &mut CrawlerGame, ch: char) -> bool {
        game.handle_input(&InputEvent::Key(ch))
    }

    fn click(game: &mut CrawlerGame, id: u16) -> bool {
        game.handle_input(&InputEvent::Click(id))
    }

    /// Draw one frame the way the browser loop does.
    fn draw(g: &CrawlerGame, cols: u16, rows: u16) -> (Buffer, Rc<RefCell<ClickState>>) {
        let cs = Rc::new(RefCell::new(ClickState::new()));
        let mut terminal = Terminal::new(TestBackend::new(cols, rows)).unwrap();
        terminal
            .draw(|f| {
                let size = f.area();
                cs.borrow_mut().begin_frame(size.width, size.height);
                g.render(f, size, &cs);
            })
            .unwrap();
        (terminal.backend().buffer().clone(), cs)
    }

    /// Cell where `needle` (ASCII) starts on screen.
    fn locate(buf: &Buffer, needle: &str) -> Option<(u16, u16)> {
        for y in 0..buf.area.height {
            let mut text = String::new();
            let mut starts = Vec::new();
            for x in 0..buf.area.width {
                starts.push((text.len(), x));
                text.push_str(buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "));
            }
            if let Some(at) = text.find(needle) {
                return starts.iter().find(|&&(i, _)| i == at).map(|&(_, x)| (x, y));
            }
        }
        None
    }

    fn tap(g: &CrawlerGame, cols: u16, rows: u16, label: &str) -> Option<u16> {
        let (buf, cs) = draw(g, cols, rows);
        let (x, y) = locate(&buf, label)?;
        let hit = cs.borrow().hit_test(x, y);
        hit
    }

    #[test]
    fn town_options_are_tappable_where_drawn() {
        let mut g = new_game();
        assert_eq!(tap(&g, 80, 40, "[1]"), Some(ENTER_DUNGEON));
        assert_eq!(tap(&g, 80, 40, "[2]"), Some(OPEN_MENU));
        assert_eq!(tap(&g, 80, 40, "[3]"), Some(SHOP_BUY_BASE));
        assert_eq!(tap(&g, 80, 40, "[8]"), Some(JOB_BASE + 1));

        let id = tap(&g, 80, 40, "[1]").unwrap();
        assert!(click(&mut g, id));
        assert_eq!(g.state.screen, Screen::Dialogue);
    }

    #[test]
    fn town_options_on_a_narrow_screen() {
        let g = new_game();
        assert_eq!(tap(&g, 40, 60, "[1]"), Some(ENTER_DUNGEON));
        assert_eq!(tap(&g, 40, 60, "[0]"), Some(JOB_BASE + 3));
    }

    #[test]
    fn control_bar_buttons_are_separate_targets() {
        let mut g = new_game();
        key(&mut g, '1');
        key(&mut g, KEY_ENTER);
        assert_eq!(g.state.screen, Screen::Dungeon);

        assert_eq!(tap(&g, 80, 30, "[W]"), Some(MOVE_FORWARD));
        assert_eq!(tap(&g, 80, 30, "[A]"), Some(TURN_LEFT));
        assert_eq!(tap(&g, 80, 30, "[D]"), Some(TURN_RIGHT));
        assert_eq!(tap(&g, 80, 30, "[S]"), Some(MOVE_BACK));
        assert_eq!(tap(&g, 80, 30, "[M]"), Some(OPEN_MENU));

        let id = tap(&g, 80, 30, "[D]").unwrap();
        assert!(click(&mut g, id));
        assert_eq!(g.state.player.pose.facing, Facing::East);
    }

    #[test]
    fn town_to_dungeon_by_keys() {
        let mut g = new_game();
        assert!(key(&mut g, '1'));
        assert_eq!(g.state.screen, Screen::Dialogue);
        assert!(!key(&mut g, 'w'));
        assert!(key(&mut g, KEY_ENTER));
        assert_eq!(g.state.screen, Screen::Dungeon);
    }

    #[test]
    fn dungeon_keys_turn_and_open_menu() {
        let mut g = new_game();
        key(&mut g, '1');
        key(&mut g, KEY_ENTER);
        assert!(key(&mut g, 'd'));
        assert_eq!(g.state.player.pose, Pose::new(1, 1, Facing::East));
        assert!(key(&mut g, 'a'));
        assert!(key(&mut g, KEY_ESC));
        assert_eq!(g.state.screen, Screen::Menu);
        assert!(key(&mut g, 'c'));
        assert_eq!(g.state.screen, Screen::Dungeon);
    }

    #[test]
    fn town_shop_and_job_keys() {
        let mut g = new_game();
        assert!(key(&mut g, '3'));
        assert_eq!(g.state.player.inventory.last(), Some(&ItemKind::Herb));
        assert!(key(&mut g, '8'));
        assert_eq!(g.state.player.job, Job::Mage);
        assert!(key(&mut g, KEY_ENTER));
        assert!(g.state.message.is_none());
    }

    #[test]
    fn clicks_mirror_keys() {
        let mut g = new_game();
        assert!(click(&mut g, SHOP_BUY_BASE + 1));
        assert_eq!(g.state.player.inventory.last(), Some(&ItemKind::HighHerb));
        assert!(click(&mut g, JOB_BASE + 3));
        assert_eq!(g.state.player.job, Job::Thief);
        assert!(click(&mut g, ENTER_DUNGEON));
        assert!(click(&mut g, CONFIRM));
        assert!(click(&mut g, TURN_RIGHT));
        assert_eq!(g.state.player.pose.facing, Facing::East);
        assert!(click(&mut g, OPEN_MENU));
        assert!(click(&mut g, CLOSE_MENU));
        assert!(!click(&mut g, 999));
    }

    #[test]
    fn item_clicks_only_in_menu() {
        let mut g = new_game();
        g.state.player.stats.hp = 10;
        assert!(!click(&mut g, ITEM_USE_BASE));
        click(&mut g, OPEN_MENU);
        assert!(click(&mut g, ITEM_USE_BASE));
        assert_eq!(g.state.player.stats.hp, 40);
    }

    #[test]
    fn battle_keys() {
        let mut g = new_game();
        key(&mut g, '1');
        key(&mut g, KEY_ENTER);
        logic::start_battle(&mut g.state, "スライム");
        g.state.battle.as_mut().unwrap().enemy.hp = 1;
        assert!(!key(&mut g, KEY_ENTER));
        assert!(key(&mut g, '1'));
        assert!(key(&mut g, ' '));
        assert_eq!(g.state.screen, Screen::Dungeon);
    }

    #[test]
    fn game_over_confirm_revives() {
        let mut g = new_game();
        g.state.screen = Screen::GameOver;
        assert!(!key(&mut g, 'x'));
        assert!(key(&mut g, KEY_ENTER));
        assert_eq!(g.state.screen, Screen::Town);
    }
}
