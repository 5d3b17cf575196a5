//! Maze Crawler state types: data only, no logic.
//!
//! Grid coordinates are `(x, y)` with `grid[y][x]`; the pose uses `i32` so
//! that view-space offsets can step outside the floor and read as walls.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::CrawlerConfig;
use super::dialogue::{Dialogue, Narrator};

// ── Grid ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Path,
    Wall,
    Stairs,
}

impl Cell {
    /// `Wall` blocks movement; `Path` and `Stairs` do not.
    pub fn is_walkable(self) -> bool {
        !matches!(self, Cell::Wall)
    }
}

/// Facing direction, indexed clockwise from north (0–3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    pub fn from_index(index: u8) -> Facing {
        match index % 4 {
            0 => Facing::North,
            1 => Facing::East,
            2 => Facing::South,
            _ => Facing::West,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Facing::North => 0,
            Facing::East => 1,
            Facing::South => 2,
            Facing::West => 3,
        }
    }

    pub fn dx(self) -> i32 {
        match self {
            Facing::East => 1,
            Facing::West => -1,
            _ => 0,
        }
    }

    pub fn dy(self) -> i32 {
        match self {
            Facing::North => -1,
            Facing::South => 1,
            _ => 0,
        }
    }

    pub fn turn_left(self) -> Facing {
        Facing::from_index(self.index() + 3)
    }

    pub fn turn_right(self) -> Facing {
        Facing::from_index(self.index() + 1)
    }

    pub fn reverse(self) -> Facing {
        Facing::from_index(self.index() + 2)
    }

    /// Forward unit vector.
    pub fn forward(self) -> (i32, i32) {
        (self.dx(), self.dy())
    }

    /// Forward rotated +90° (screen coordinates, y down).
    pub fn right(self) -> (i32, i32) {
        self.turn_right().forward()
    }

    pub fn label(self) -> &'static str {
        match self {
            Facing::North => "北",
            Facing::East => "東",
            Facing::South => "南",
            Facing::West => "西",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pose {
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
}

impl Pose {
    pub fn new(x: i32, y: i32, facing: Facing) -> Self {
        Self { x, y, facing }
    }

    /// World cell at `depth` cells ahead and `lateral` cells to the right.
    pub fn view_cell(&self, depth: i32, lateral: i32) -> (i32, i32) {
        let (fx, fy) = self.facing.forward();
        let (rx, ry) = self.facing.right();
        (
            self.x + fx * depth + rx * lateral,
            self.y + fy * depth + ry * lateral,
        )
    }
}

/// One dungeon floor: the cell grid plus its fog-of-war overlay.
#[derive(Clone, Debug)]
pub struct Floor {
    pub width: usize,
    pub height: usize,
    pub grid: Vec<Vec<Cell>>,
    pub explored: Vec<Vec<bool>>,
}

impl Floor {
    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            grid: vec![vec![cell; width]; height],
            explored: vec![vec![false; width]; height],
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Out-of-bounds reads are walls.
    pub fn cell_at(&self, x: i32, y: i32) -> Cell {
        if self.in_bounds(x, y) {
            self.grid[y as usize][x as usize]
        } else {
            Cell::Wall
        }
    }

    pub fn is_explored(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.explored[y as usize][x as usize]
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.cell_at(x, y).is_walkable()
    }

    pub fn stairs(&self) -> Option<(usize, usize)> {
        for (y, row) in self.grid.iter().enumerate() {
            if let Some(x) = row.iter().position(|&c| c == Cell::Stairs) {
                return Some((x, y));
            }
        }
        None
    }

    pub fn explored_count(&self) -> usize {
        self.explored.iter().flatten().filter(|&&e| e).count()
    }
}

// ── Jobs ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Job {
    Warrior,
    Mage,
    Cleric,
    Thief,
}

pub const ALL_JOBS: [Job; 4] = [Job::Warrior, Job::Mage, Job::Cleric, Job::Thief];

pub struct JobInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub base_atk: u32,
    pub base_def: u32,
}

pub fn job_info(job: Job) -> JobInfo {
    match job {
        Job::Warrior => JobInfo {
            name: "戦士",
            description: "力強く、防御にも優れる。",
            base_atk: 15,
            base_def: 10,
        },
        Job::Mage => JobInfo {
            name: "魔導士",
            description: "強力な魔法を操る。",
            base_atk: 8,
            base_def: 5,
        },
        Job::Cleric => JobInfo {
            name: "聖職者",
            description: "癒やしの力を持つ。",
            base_atk: 10,
            base_def: 8,
        },
        Job::Thief => JobInfo {
            name: "盗賊",
            description: "素早さに優れる。",
            base_atk: 12,
            base_def: 6,
        },
    }
}

// ── Items ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Herb,
    HighHerb,
    RustySword,
    SteelSword,
    ClothArmor,
    ChainMail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemCategory {
    Consumable,
    Weapon,
    Armor,
}

pub struct ItemInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub category: ItemCategory,
    pub price: u32,
    pub value: u32,
}

pub fn item_info(kind: ItemKind) -> ItemInfo {
    match kind {
        ItemKind::Herb => ItemInfo {
            name: "薬草",
            description: "HPを30回復する",
            category: ItemCategory::Consumable,
            price: 10,
            value: 30,
        },
        ItemKind::HighHerb => ItemInfo {
            name: "高級薬草",
            description: "HPを70回復する",
            category: ItemCategory::Consumable,
            price: 40,
            value: 70,
        },
        ItemKind::RustySword => ItemInfo {
            name: "錆びた剣",
            description: "古びた鉄の剣",
            category: ItemCategory::Weapon,
            price: 50,
            value: 5,
        },
        ItemKind::SteelSword => ItemInfo {
            name: "鋼の剣",
            description: "鋭い切れ味の剣",
            category: ItemCategory::Weapon,
            price: 150,
            value: 15,
        },
        ItemKind::ClothArmor => ItemInfo {
            name: "布の服",
            description: "薄手の冒険着",
            category: ItemCategory::Armor,
            price: 30,
            value: 3,
        },
        ItemKind::ChainMail => ItemInfo {
            name: "鎖帷子",
            description: "身の守りを固める",
            category: ItemCategory::Armor,
            price: 120,
            value: 10,
        },
    }
}

pub fn shop_items() -> &'static [ItemKind] {
    &[ItemKind::Herb, ItemKind::HighHerb, ItemKind::SteelSword, ItemKind::ChainMail]
}

// ── Enemies ───────────────────────────────────────────────────

pub const ENEMY_NAMES: [&str; 5] = ["スライム", "ゴブリン", "コウモリ", "ガイコツ", "魔導士"];

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub name: &'static str,
    pub hp: u32,
    pub max_hp: u32,
    pub atk: u32,
    pub def: u32,
    pub exp: u32,
    pub gold: u32,
}

impl Enemy {
    /// Stats scale linearly with the floor number.
    pub fn for_floor(name: &'static str, floor: u32) -> Self {
        let hp = 20 + floor * 10;
        Self {
            name,
            hp,
            max_hp: hp,
            atk: 5 + floor * 3,
            def: 2 + floor * 2,
            exp: 10 * floor,
            gold: 15 * floor,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    SelectAction,
    Victory,
    Defeat,
}

#[derive(Clone, Debug)]
pub struct BattleState {
    pub enemy: Enemy,
    pub phase: BattlePhase,
    pub log: Vec<String>,
}

// ── Player ────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub hp: u32,
    pub max_hp: u32,
    pub mp: u32,
    pub max_mp: u32,
    pub atk: u32,
    pub def: u32,
    pub level: u32,
    pub exp: u32,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub name: &'static str,
    pub job: Job,
    pub stats: Stats,
    pub inventory: Vec<ItemKind>,
    pub weapon: Option<ItemKind>,
    pub armor: Option<ItemKind>,
    pub gold: u32,
    /// Current dungeon floor number, 1-based. 0 while in town before the first descent.
    pub floor: u32,
    pub pose: Pose,
}

impl Player {
    pub fn new() -> Self {
        Self {
            name: "冒険者",
            job: Job::Warrior,
            stats: Stats {
                hp: 100, max_hp: 100,
                mp: 20, max_mp: 20,
                atk: 15, def: 10,
                level: 1, exp: 0,
            },
            inventory: vec![ItemKind::Herb, ItemKind::RustySword, ItemKind::ClothArmor],
            weapon: Some(ItemKind::RustySword),
            armor: Some(ItemKind::ClothArmor),
            gold: 100,
            floor: 0,
            pose: Pose::new(1, 1, Facing::North),
        }
    }

    pub fn total_atk(&self) -> u32 {
        let weapon_bonus = self.weapon.map(|w| item_info(w).value).unwrap_or(0);
        self.stats.atk + weapon_bonus
    }

    pub fn total_def(&self) -> u32 {
        let armor_bonus = self.armor.map(|a| item_info(a).value).unwrap_or(0);
        self.stats.def + armor_bonus
    }

    pub fn is_equipped(&self, kind: ItemKind) -> bool {
        self.weapon == Some(kind) || self.armor == Some(kind)
    }
}

// ── Screens ───────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Town,
    Dungeon,
    Dialogue,
    Battle,
    Menu,
    GameOver,
}

// ── Root Game State ───────────────────────────────────────────

pub struct CrawlerState {
    pub config: CrawlerConfig,
    pub player: Player,
    pub floor: Option<Floor>,
    pub battle: Option<BattleState>,
    pub dialogue: Option<Dialogue>,
    pub screen: Screen,
    /// Last informational message; cleared on confirm.
    pub message: Option<String>,
    pub log: Vec<String>,
    pub narrator: Narrator,
    pub rng: StdRng,
}

impl CrawlerState {
    pub fn new(config: CrawlerConfig, narrator: Narrator, seed: u64) -> Self {
        Self {
            config,
            player: Player::new(),
            floor: None,
            battle: None,
            dialogue: None,
            screen: Screen::Town,
            message: None,
            log: Vec::new(),
            narrator,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn add_log(&mut self, text: &str) {
        self.log.push(text.to_string());
        if self.log.len() > 30 {
            self.log.remove(0);
        }
    }

    /// Show a message and record it in the log.
    pub fn notify(&mut self, text: &str) {
        self.message = Some(text.to_string());
        self.add_log(text);
    }

    /// Screen to return to when the menu closes.
    pub fn menu_return_screen(&self) -> Screen {
        if self.battle.is_some() {
            Screen::Battle
        } else if self.floor.is_some() {
            Screen::Dungeon
        } else {
            Screen::Town
        }
    }
}
