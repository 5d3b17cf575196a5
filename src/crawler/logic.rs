//! Maze Crawler: pure game logic (no rendering / IO).
//!
//! Core loop: Town → Dungeon floor (first-person exploration) → Battle → Dungeon,
//! descending by stairs until the last floor is cleared.
//! Every action returns whether it was accepted in the current screen.

use rand::Rng;

use super::dialogue::DialogueRequest;
use super::dungeon_map::{generate_floor, ENTRY};
use super::fog;
use super::state::{
    item_info, job_info, shop_items, BattlePhase, BattleState, Cell, CrawlerState, Enemy,
    Facing, ItemCategory, Job, Pose, Screen, ENEMY_NAMES,
};

// ── Floors ────────────────────────────────────────────────────

pub fn enter_dungeon(state: &mut CrawlerState) -> bool {
    if state.screen != Screen::Town {
        return false;
    }
    enter_floor(state, 1)
}

/// Generate floor `number`, place the player at the entry facing north and
/// show the floor-entry narration.
fn enter_floor(state: &mut CrawlerState, number: u32) -> bool {
    let (width, height) = (state.config.floor_width, state.config.floor_height);
    let mut floor = match generate_floor(width, height, &mut state.rng) {
        Ok(floor) => floor,
        Err(err) => {
            tracing::error!(%err, floor = number, "floor generation failed");
            state.floor = None;
            state.player.floor = 0;
            state.screen = Screen::Town;
            state.notify("ダンジョンへの道が見つからなかった。");
            return false;
        }
    };

    let pose = Pose::new(ENTRY.0 as i32, ENTRY.1 as i32, Facing::North);
    fog::reveal(&mut floor, pose.x, pose.y);
    tracing::info!(floor = number, stairs = ?floor.stairs(), "entered floor");
    state.floor = Some(floor);
    state.player.floor = number;
    state.player.pose = pose;

    let request = DialogueRequest::FloorEntry { floor: number, job: state.player.job };
    let line = state.narrator.narrate(&request, &mut state.rng);
    state.dialogue = Some(line.into_inner());
    state.screen = Screen::Dialogue;
    state.add_log(&format!("{}階に降り立った。", number));
    true
}

pub fn confirm_dialogue(state: &mut CrawlerState) -> bool {
    if state.screen != Screen::Dialogue {
        return false;
    }
    state.dialogue = None;
    state.screen = Screen::Dungeon;
    true
}

fn descend(state: &mut CrawlerState) {
    let current = state.player.floor;
    if current >= state.config.max_floors {
        tracing::info!(floor = current, "dungeon cleared");
        state.floor = None;
        state.player.floor = 0;
        state.screen = Screen::Town;
        state.notify("おめでとう！ダンジョンを制覇した！");
        return;
    }
    enter_floor(state, current + 1);
}

// ── Movement ──────────────────────────────────────────────────

pub fn move_forward(state: &mut CrawlerState) -> bool {
    let facing = state.player.pose.facing;
    step(state, facing)
}

/// Step backwards without turning around.
pub fn move_back(state: &mut CrawlerState) -> bool {
    let facing = state.player.pose.facing;
    step(state, facing.reverse())
}

fn step(state: &mut CrawlerState, dir: Facing) -> bool {
    if state.screen != Screen::Dungeon {
        return false;
    }
    let Some(floor) = state.floor.as_mut() else {
        return false;
    };

    let pose = state.player.pose;
    let (nx, ny) = (pose.x + dir.dx(), pose.y + dir.dy());
    if !floor.is_walkable(nx, ny) {
        state.add_log("壁だ。");
        return false;
    }

    let revealed = fog::reveal(floor, nx, ny);
    let on_stairs = floor.cell_at(nx, ny) == Cell::Stairs;
    tracing::debug!(x = nx, y = ny, revealed, explored = floor.explored_count(), "moved");
    state.player.pose = Pose::new(nx, ny, pose.facing);

    if on_stairs {
        descend(state);
    } else {
        roll_encounter(state);
    }
    true
}

pub fn turn_left(state: &mut CrawlerState) -> bool {
    turn(state, Facing::turn_left)
}

pub fn turn_right(state: &mut CrawlerState) -> bool {
    turn(state, Facing::turn_right)
}

fn turn(state: &mut CrawlerState, rotate: fn(Facing) -> Facing) -> bool {
    if state.screen != Screen::Dungeon || state.floor.is_none() {
        return false;
    }
    let pose = &mut state.player.pose;
    pose.facing = rotate(pose.facing);
    true
}

fn roll_encounter(state: &mut CrawlerState) {
    if state.rng.gen_range(0..100) < state.config.encounter_percent {
        let name = ENEMY_NAMES[state.rng.gen_range(0..ENEMY_NAMES.len())];
        start_battle(state, name);
    }
}

// ── Battle ────────────────────────────────────────────────────

pub fn start_battle(state: &mut CrawlerState, name: &'static str) {
    let enemy = Enemy::for_floor(name, state.player.floor.max(1));
    let request = DialogueRequest::BattleIntro { enemy: name.to_string() };
    let intro = state.narrator.narrate(&request, &mut state.rng).into_inner();

    state.battle = Some(BattleState {
        enemy,
        phase: BattlePhase::SelectAction,
        log: vec![intro.message],
    });
    state.screen = Screen::Battle;
    state.add_log(&format!("{}が現れた！", name));
    tracing::info!(enemy = name, floor = state.player.floor, "battle started");
}

fn awaiting_action(state: &CrawlerState) -> bool {
    state.screen == Screen::Battle
        && state.battle.as_ref().is_some_and(|b| b.phase == BattlePhase::SelectAction)
}

/// `max(1, atk - def + roll)`.
fn hit(atk: u32, def: u32, roll: u32) -> u32 {
    (atk + roll).saturating_sub(def).max(1)
}

pub fn battle_attack(state: &mut CrawlerState) -> bool {
    if !awaiting_action(state) {
        return false;
    }
    let roll = state.rng.gen_range(0..5);
    let atk = state.player.total_atk();
    let player_name = state.player.name;
    let Some(battle) = state.battle.as_mut() else {
        return false;
    };

    let damage = hit(atk, battle.enemy.def, roll);
    battle.enemy.hp = battle.enemy.hp.saturating_sub(damage);
    battle.log.push(format!("{}の攻撃！ {}に{}のダメージ！", player_name, battle.enemy.name, damage));

    if battle.enemy.hp == 0 {
        let (name, exp, gold) = (battle.enemy.name, battle.enemy.exp, battle.enemy.gold);
        battle.log.push(format!("{}を倒した！", name));
        battle.log.push(format!("{}の経験値と{}Gを手に入れた。", exp, gold));
        battle.phase = BattlePhase::Victory;
        state.player.stats.exp += exp;
        state.player.gold += gold;
        tracing::info!(enemy = name, exp, gold, "battle won");
        check_level_up(state);
        return true;
    }

    let roll = state.rng.gen_range(0..3);
    let enemy_atk = battle.enemy.atk;
    let damage = hit(enemy_atk, state.player.total_def(), roll);
    enemy_strikes(state, "攻撃", damage);
    true
}

pub fn battle_run(state: &mut CrawlerState) -> bool {
    if !awaiting_action(state) {
        return false;
    }
    if state.rng.gen_bool(0.5) {
        state.battle = None;
        state.screen = Screen::Dungeon;
        state.notify("うまく逃げ出した！");
        tracing::info!("escaped from battle");
        return true;
    }

    let def = state.player.total_def();
    let Some(battle) = state.battle.as_mut() else {
        return false;
    };
    battle.log.push("逃げられなかった！".to_string());
    let damage = hit(battle.enemy.atk, def, 0);
    enemy_strikes(state, "追撃", damage);
    true
}

fn enemy_strikes(state: &mut CrawlerState, verb: &str, damage: u32) {
    let player = &mut state.player;
    player.stats.hp = player.stats.hp.saturating_sub(damage);
    let fallen = player.stats.hp == 0;
    let Some(battle) = state.battle.as_mut() else {
        return;
    };

    battle.log.push(format!("{}の{}！ {}は{}のダメージ！", battle.enemy.name, verb, player.name, damage));
    if fallen {
        battle.log.push(format!("{}は倒れてしまった...", player.name));
        battle.phase = BattlePhase::Defeat;
        tracing::info!(enemy = battle.enemy.name, "player defeated");
    }
}

fn check_level_up(state: &mut CrawlerState) {
    let stats = &mut state.player.stats;
    if stats.exp < stats.level * 50 {
        return;
    }
    stats.level += 1;
    stats.max_hp += 10;
    stats.hp = stats.max_hp;
    stats.atk += 2;
    stats.def += 1;
    let text = format!("レベルが上がった！ レベル{}になった！", stats.level);
    if let Some(battle) = state.battle.as_mut() {
        battle.log.push(text.clone());
    }
    state.add_log(&text);
}

/// Leave a finished battle: victory returns to the dungeon, defeat ends the run.
pub fn confirm_battle(state: &mut CrawlerState) -> bool {
    let Some(phase) = state.battle.as_ref().map(|b| b.phase) else {
        return false;
    };
    match phase {
        BattlePhase::SelectAction => return false,
        BattlePhase::Victory => state.screen = Screen::Dungeon,
        BattlePhase::Defeat => state.screen = Screen::GameOver,
    }
    state.battle = None;
    true
}

pub fn revive(state: &mut CrawlerState) -> bool {
    if state.screen != Screen::GameOver {
        return false;
    }
    let player = &mut state.player;
    player.gold /= 2;
    player.stats.hp = player.stats.max_hp;
    player.floor = 0;
    state.floor = None;
    state.battle = None;
    state.dialogue = None;
    state.screen = Screen::Town;
    state.notify("町で目を覚ました。所持金が半分になった。");
    true
}

// ── Menu / Items ──────────────────────────────────────────────

pub fn open_menu(state: &mut CrawlerState) -> bool {
    let allowed = match state.screen {
        Screen::Town | Screen::Dungeon => true,
        Screen::Battle => awaiting_action(state),
        _ => false,
    };
    if allowed {
        state.screen = Screen::Menu;
    }
    allowed
}

pub fn close_menu(state: &mut CrawlerState) -> bool {
    if state.screen != Screen::Menu {
        return false;
    }
    state.screen = state.menu_return_screen();
    true
}

pub fn use_item(state: &mut CrawlerState, index: usize) -> bool {
    let Some(&kind) = state.player.inventory.get(index) else {
        return false;
    };
    let info = item_info(kind);
    let player = &mut state.player;
    match info.category {
        ItemCategory::Consumable => {
            player.stats.hp = (player.stats.hp + info.value).min(player.stats.max_hp);
            player.inventory.remove(index);
            state.notify(&format!("{}を使用した。", info.name));
        }
        ItemCategory::Weapon => {
            player.weapon = Some(kind);
            state.notify(&format!("{}を装備した。", info.name));
        }
        ItemCategory::Armor => {
            player.armor = Some(kind);
            state.notify(&format!("{}を装備した。", info.name));
        }
    }
    true
}

// ── Town ──────────────────────────────────────────────────────

pub fn buy_item(state: &mut CrawlerState, shop_index: usize) -> bool {
    if state.screen != Screen::Town {
        return false;
    }
    let Some(&kind) = shop_items().get(shop_index) else {
        return false;
    };
    let info = item_info(kind);
    if state.player.gold < info.price {
        state.notify("お金が足りない。");
        return false;
    }
    state.player.gold -= info.price;
    state.player.inventory.push(kind);
    state.notify(&format!("{}を購入した。", info.name));
    true
}

/// Switch job. Only ATK/DEF are reset to the job's base values.
pub fn change_job(state: &mut CrawlerState, job: Job) -> bool {
    if state.screen != Screen::Town || state.player.job == job {
        return false;
    }
    let info = job_info(job);
    let player = &mut state.player;
    player.job = job;
    player.stats.atk = info.base_atk;
    player.stats.def = info.base_def;
    state.notify(&format!("{}に転職した。", info.name));
    true
}

pub fn clear_message(state: &mut CrawlerState) -> bool {
    state.message.take().is_some()
}

// ── Tests ────────────────────────────────────────────────────
