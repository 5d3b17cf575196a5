//! Semantic action IDs for Maze Crawler click targets.

// ── Town ───────────────────────────────────────────────────────
pub const ENTER_DUNGEON: u16 = 10;
/// Shop purchase base: + index into `shop_items()`.
pub const SHOP_BUY_BASE: u16 = 20;
/// Job change base: + index into `ALL_JOBS`.
pub const JOB_BASE: u16 = 30;

// ── Menu ───────────────────────────────────────────────────────
/// Inventory use base: + inventory index.
pub const ITEM_USE_BASE: u16 = 60;

// ── Menu open / close ─────────────────────────────────────────
pub const CLOSE_MENU: u16 = 100;
pub const OPEN_MENU: u16 = 101;

// ── Dungeon movement ──────────────────────────────────────────
pub const MOVE_FORWARD: u16 = 110;
pub const TURN_LEFT: u16 = 111;
pub const TURN_RIGHT: u16 = 112;
pub const MOVE_BACK: u16 = 113;

// ── Battle ────────────────────────────────────────────────────
pub const BATTLE_ATTACK: u16 = 120;
pub const BATTLE_RUN: u16 = 121;

// ── Confirmations ─────────────────────────────────────────────
/// Dismiss the current dialogue, finished battle or message.
pub const CONFIRM: u16 = 130;
pub const REVIVE: u16 = 131;
