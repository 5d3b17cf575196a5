//! Maze Crawler rendering: one screen per `Screen`.
//!
//! Layout: status bar + screen body + log. The dungeon body is the
//! first-person view drawn as a half-block raster with a control bar below.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;
use crate::widgets::{raster_size, ClickableList, RasterView};

use super::actions::*;
use super::dungeon_view;
use super::state::{
    item_info, job_info, shop_items, BattlePhase, CrawlerState, Screen, ALL_JOBS,
};

/// Keys for the job-change rows, in `ALL_JOBS` order.
pub const JOB_KEYS: [char; 4] = ['7', '8', '9', '0'];

pub fn render(
    state: &CrawlerState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let borders = borders_for(area.width);
    let status_h = if state.message.is_some() { 4 } else { 3 };
    let log_h = if state.screen == Screen::Dungeon { 3 } else { 5 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(status_h),
            Constraint::Min(6),
            Constraint::Length(log_h),
        ])
        .split(area);

    render_status_bar(state, f, chunks[0], borders);
    match state.screen {
        Screen::Town => render_town(state, f, chunks[1], borders, click_state),
        Screen::Dungeon => render_dungeon(state, f, chunks[1], borders, click_state),
        Screen::Dialogue => render_dialogue(state, f, chunks[1], borders, click_state),
        Screen::Battle => render_battle(state, f, chunks[1], borders, click_state),
        Screen::Menu => render_menu(state, f, chunks[1], borders, click_state),
        Screen::GameOver => render_game_over(state, f, chunks[1], borders, click_state),
    }
    render_log(state, f, chunks[2], borders);
}

// ── Helpers ─────────────────────────────────────────────────

fn hp_bar(current: u32, max: u32, width: usize) -> (String, Color) {
    let ratio = if max > 0 { current as f64 / max as f64 } else { 0.0 };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    let bar = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(empty);
    let color = if ratio > 0.5 { Color::Green } else if ratio > 0.25 { Color::Yellow } else { Color::Red };
    (bar, color)
}

/// Phones in portrait get fewer columns than this.
const NARROW_WIDTH: u16 = 60;

fn is_narrow(width: u16) -> bool {
    width < NARROW_WIDTH
}

fn borders_for(area_width: u16) -> Borders {
    if is_narrow(area_width) { Borders::TOP | Borders::BOTTOM } else { Borders::ALL }
}

fn push_option(cl: &mut ClickableList, key: char, label: String, action_id: u16) {
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                format!(" [{}] ", key.to_ascii_uppercase()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(label, Style::default().fg(Color::White)),
        ]),
        action_id,
    );
}

fn push_confirm(cl: &mut ClickableList, label: &str, action_id: u16) {
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [Enter] ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(label.to_string(), Style::default().fg(Color::White)),
        ]),
        action_id,
    );
}

fn section(cl: &mut ClickableList, title: &str) {
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        format!(" \u{2500}\u{2500} {} \u{2500}\u{2500}", title),
        Style::default().fg(Color::DarkGray),
    )));
}

fn render_list(
    cl: ClickableList,
    f: &mut Frame,
    area: Rect,
    block: Block,
    click_state: &Rc<RefCell<ClickState>>,
) {
    cl.register_targets(area, &block, &mut click_state.borrow_mut());
    f.render_widget(
        Paragraph::new(cl.into_lines()).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn plain_block(borders: Borders, title: &str, color: Color) -> Block<'static> {
    Block::default()
        .borders(borders)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
}

// ── Status bar ──────────────────────────────────────────────

fn render_status_bar(state: &CrawlerState, f: &mut Frame, area: Rect, borders: Borders) {
    let p = &state.player;
    let narrow = is_narrow(area.width);
    let (bar, color) = hp_bar(p.stats.hp, p.stats.max_hp, if narrow { 8 } else { 12 });

    let place = if p.floor > 0 { format!(" {}階", p.floor) } else { " 町".to_string() };
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!(" Lv.{} {}", p.stats.level, job_info(p.job).name),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" HP", Style::default().fg(Color::Gray)),
        Span::styled(bar, Style::default().fg(color)),
        Span::styled(format!("{}/{}", p.stats.hp, p.stats.max_hp), Style::default().fg(Color::White)),
        Span::styled(format!(" MP{}/{}", p.stats.mp, p.stats.max_mp), Style::default().fg(Color::Blue)),
        Span::styled(format!(" {}G", p.gold), Style::default().fg(Color::Yellow)),
        Span::styled(place, Style::default().fg(Color::Cyan)),
    ])];
    if let Some(msg) = &state.message {
        lines.push(Line::from(Span::styled(
            format!(" \u{25b6} {}", msg),
            Style::default().fg(Color::Yellow),
        )));
    }

    let title = if narrow { "迷宮" } else { "Maze Crawler" };
    f.render_widget(Paragraph::new(lines).block(plain_block(borders, title, Color::Cyan)), area);
}

// ── Town ────────────────────────────────────────────────────

fn render_town(
    state: &CrawlerState,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        " 迷宮の入口にある小さな町。",
        Style::default().fg(Color::White),
    )));
    cl.push(Line::from(""));
    push_option(&mut cl, '1', "ダンジョンに入る".into(), ENTER_DUNGEON);
    push_option(&mut cl, '2', "メニュー".into(), OPEN_MENU);

    section(&mut cl, "ショップ");
    for (i, &kind) in shop_items().iter().enumerate() {
        let info = item_info(kind);
        let key = char::from(b'3' + i as u8);
        push_option(
            &mut cl,
            key,
            format!("{} {}G  {}", info.name, info.price, info.description),
            SHOP_BUY_BASE + i as u16,
        );
    }

    section(&mut cl, "転職");
    for (i, &job) in ALL_JOBS.iter().enumerate() {
        let info = job_info(job);
        let current = if state.player.job == job { " \u{2605}" } else { "" };
        push_option(
            &mut cl,
            JOB_KEYS[i],
            format!(
                "{}{} (ATK {} / DEF {})  {}",
                info.name, current, info.base_atk, info.base_def, info.description
            ),
            JOB_BASE + i as u16,
        );
    }

    render_list(cl, f, area, plain_block(borders, "町", Color::Green), click_state);
}

// ── Dungeon ─────────────────────────────────────────────────

const CONTROLS: [(&str, u16); 5] = [
    ("[W]前進", MOVE_FORWARD),
    ("[A]左", TURN_LEFT),
    ("[D]右", TURN_RIGHT),
    ("[S]後退", MOVE_BACK),
    ("[M]メニュー", OPEN_MENU),
];

fn render_dungeon(
    state: &CrawlerState,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let Some(floor) = &state.floor else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(3)])
        .split(area);

    let pose = &state.player.pose;
    let title = format!("{}階  {}向き", state.player.floor, pose.facing.label());
    let block = plain_block(borders, &title, Color::DarkGray);
    let view = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);

    let (w, h) = raster_size(view);
    if w > 0 && h > 0 {
        let image = dungeon_view::render(pose, floor, &state.config.camera(w, h));
        f.render_widget(RasterView::new(&image), view);
    }

    render_control_bar(f, chunks[1], borders, click_state);
}

/// One row of bracket-key buttons, each its own click target.
fn render_control_bar(
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);

    let mut spans = vec![Span::raw(" ")];
    let mut cs = click_state.borrow_mut();
    let mut x = inner.x + 1;
    for (i, &(label, action_id)) in CONTROLS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
            x += 1;
        }
        let width = Line::from(label).width() as u16;
        // Whole block height for easier taps; include the gap to the next label.
        cs.add_click_target(Rect::new(x, area.y, width + 1, area.height), action_id);
        spans.push(Span::styled(label, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)));
        x += width;
    }
    drop(cs);

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// ── Dialogue ────────────────────────────────────────────────

fn render_dialogue(
    state: &CrawlerState,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    let speaker = state.dialogue.as_ref().map(|d| d.speaker.as_str()).unwrap_or("");
    if let Some(dialogue) = &state.dialogue {
        cl.push(Line::from(""));
        cl.push(Line::from(Span::styled(
            format!(" 「{}」", dialogue.message),
            Style::default().fg(Color::White),
        )));
    }
    push_confirm(&mut cl, "進む", CONFIRM);
    render_list(cl, f, area, plain_block(borders, speaker, Color::Magenta), click_state);
}

// ── Battle ──────────────────────────────────────────────────

fn render_battle(
    state: &CrawlerState,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let Some(battle) = &state.battle else {
        return;
    };
    let narrow = is_narrow(area.width);
    let mut cl = ClickableList::new();

    let enemy = &battle.enemy;
    cl.push(Line::from(Span::styled(
        format!(" \u{300a}戦闘\u{300b} {}", enemy.name),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )));
    let (bar, color) = hp_bar(enemy.hp, enemy.max_hp, if narrow { 10 } else { 16 });
    cl.push(Line::from(vec![
        Span::styled(" HP ", Style::default().fg(Color::Gray)),
        Span::styled(bar, Style::default().fg(color)),
        Span::styled(format!(" {}/{}", enemy.hp, enemy.max_hp), Style::default().fg(Color::White)),
    ]));
    cl.push(Line::from(""));

    let shown = if narrow { 4 } else { 6 };
    let start = battle.log.len().saturating_sub(shown);
    for text in &battle.log[start..] {
        cl.push(Line::from(Span::styled(format!(" {}", text), Style::default().fg(Color::White))));
    }
    cl.push(Line::from(""));

    match battle.phase {
        BattlePhase::SelectAction => {
            push_option(&mut cl, '1', "攻撃".into(), BATTLE_ATTACK);
            push_option(&mut cl, '2', "メニュー".into(), OPEN_MENU);
            push_option(&mut cl, '3', "逃げる".into(), BATTLE_RUN);
        }
        BattlePhase::Victory => push_confirm(&mut cl, "探索に戻る", CONFIRM),
        BattlePhase::Defeat => push_confirm(&mut cl, "続ける", CONFIRM),
    }

    render_list(cl, f, area, plain_block(borders, "戦闘", Color::Red), click_state);
}

// ── Menu ────────────────────────────────────────────────────

fn render_menu(
    state: &CrawlerState,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let p = &state.player;
    let mut cl = ClickableList::new();
    let weapon = p.weapon.map(|w| item_info(w).name).unwrap_or("なし");
    let armor = p.armor.map(|a| item_info(a).name).unwrap_or("なし");

    cl.push(Line::from(Span::styled(
        format!(" {}  {} Lv.{}", p.name, job_info(p.job).name, p.stats.level),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(Span::styled(
        format!(" ATK {}  DEF {}  EXP {}/{}", p.total_atk(), p.total_def(), p.stats.exp, p.stats.level * 50),
        Style::default().fg(Color::White),
    )));
    cl.push(Line::from(Span::styled(
        format!(" 武器: {}  防具: {}", weapon, armor),
        Style::default().fg(Color::Gray),
    )));

    section(&mut cl, "持ち物");
    if p.inventory.is_empty() {
        cl.push(Line::from(Span::styled(" (空)", Style::default().fg(Color::DarkGray))));
    }
    for (i, &kind) in p.inventory.iter().enumerate() {
        let info = item_info(kind);
        let mark = if p.is_equipped(kind) { " [E]" } else { "" };
        let label = format!("{}{}  {}", info.name, mark, info.description);
        let action = ITEM_USE_BASE + i as u16;
        match char::from_digit(i as u32 + 1, 10) {
            Some(key) if i < 9 => push_option(&mut cl, key, label, action),
            _ => cl.push_clickable(Line::from(format!("     {}", label)), action),
        }
    }

    cl.push(Line::from(""));
    push_option(&mut cl, 'c', "閉じる".into(), CLOSE_MENU);

    render_list(cl, f, area, plain_block(borders, "メニュー", Color::Yellow), click_state);
}

// ── Game over ───────────────────────────────────────────────

fn render_game_over(
    state: &CrawlerState,
    f: &mut Frame,
    area: Rect,
    borders: Borders,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        " GAME OVER",
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(Span::styled(
        format!(" {}は力尽きた。所持金の半分を失って町へ戻る。", state.player.name),
        Style::default().fg(Color::White),
    )));
    push_confirm(&mut cl, "町で目を覚ます", REVIVE);
    render_list(cl, f, area, plain_block(borders, "GAME OVER", Color::Red), click_state);
}

// ── Log ─────────────────────────────────────────────────────

fn render_log(state: &CrawlerState, f: &mut Frame, area: Rect, borders: Borders) {
    let max_lines = area.height.saturating_sub(2) as usize;
    let start = state.log.len().saturating_sub(max_lines);
    let lines: Vec<Line> = state.log[start..].iter()
        .map(|msg| Line::from(Span::styled(format!(" > {}", msg), Style::default().fg(Color::DarkGray))))
        .collect();
    let block = Block::default().borders(borders).border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}
