//! Sail-screen game logic.
//!
//! Every public function takes an immutable reference to the current
//! `SailState` (plus tuning and, where needed, an RNG handle) and returns a
//! brand-new `SailState`.  Side effects are limited to the injected RNG and
//! log output.

pub mod collision;
pub mod health_bars;
pub mod living;
pub mod npc;
pub mod player;

use std::f32::consts::{FRAC_PI_2, TAU};

use rand::Rng;
use tracing::{info, warn};

use crate::config::{MapTuning, Tuning};
use crate::crew::{CrewBank, CrewKind};
use crate::entities::{
    Camera, College, CollegeId, EntityId, GameStatus, HealthBars, Key, LivingEntity, Player,
    Reward, SailState, Volley, PLAYER_ID,
};
use crate::error::GameError;
use crate::geometry::Rect;
use crate::map::IslandMap;

use collision::{resolve_projectile_hits, resolve_ship_collisions};
use npc::{find_spawn_point, launch_all, npc_fire, spawn_npc, steer};

pub use living::{Bump, ShipSpec};
pub use player::LevelProgress;

pub const DEFAULT_ZOOM: f32 = 1.5;
pub const MINIMAP_ZOOM: f32 = 3.0;

/// HUD message log length.
const MAX_MESSAGES: usize = 5;

/// Roaming boats never spawn closer than this to the player.
const SPAWN_CLEARANCE: f32 = 300.0;

/// Which guns to fire, relative to the ship's heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Broadside {
    Bow,
    Port,
    Starboard,
}

impl Broadside {
    fn offset(self) -> f32 {
        match self {
            Broadside::Bow => 0.0,
            Broadside::Port => -FRAC_PI_2,
            Broadside::Starboard => FRAC_PI_2,
        }
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Ring the colleges around the map centre.
fn place_colleges(cfg: &MapTuning) -> Vec<College> {
    let (cx, cy) = (cfg.width / 2.0, cfg.height / 2.0);
    let radius = cfg.width.min(cfg.height) * 0.38;
    let count = cfg.colleges.len().max(1) as f32;
    cfg.colleges
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let theta = i as f32 / count * TAU;
            let x = cx + theta.sin() * radius - cfg.college_size / 2.0;
            let y = cy - theta.cos() * radius - cfg.college_size / 2.0;
            College {
                id: CollegeId(i as u32),
                name: name.clone(),
                bounds: Rect::new(x, y, cfg.college_size, cfg.college_size),
                reward: Reward {
                    gold: cfg.college_gold,
                    xp: cfg.college_xp,
                },
                captured: false,
            }
        })
        .collect()
}

/// Build a new voyage: player at the centre, colleges ringed around it, guards
/// at every college and a boss at the last one.
pub fn init_state(tuning: &Tuning, rng: &mut impl Rng) -> SailState {
    let map_cfg = &tuning.map;
    let ship_cfg = &tuning.ship;

    let player = Player::new(
        map_cfg.width / 2.0 - ship_cfg.width / 2.0,
        map_cfg.height / 2.0 - ship_cfg.height / 2.0,
        ship_cfg,
    );
    let colleges = place_colleges(map_cfg);

    let mut keep_clear: Vec<Rect> = colleges
        .iter()
        .map(|c| c.bounds.inflate(c.bounds.width * 1.5))
        .collect();
    keep_clear.push(player.ship.bounds().inflate(ship_cfg.width * 4.0));
    let map = IslandMap::generate(map_cfg, &keep_clear, rng);

    let mut state = SailState {
        camera: Camera {
            x: 0.0,
            y: 0.0,
            zoom: DEFAULT_ZOOM,
        },
        player,
        npcs: Vec::new(),
        projectiles: Vec::new(),
        map,
        colleges,
        health_bars: HealthBars::default(),
        status: GameStatus::Sailing,
        next_id: PLAYER_ID.0 + 1,
        frame: 0,
        messages: Vec::new(),
    };

    let last = state.colleges.len().saturating_sub(1);
    let guard_posts: Vec<(CollegeId, Rect, bool)> = state
        .colleges
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, c.bounds, i == last))
        .collect();
    for (college, bounds, has_boss) in guard_posts {
        for g in 0..map_cfg.guards_per_college {
            let area = bounds.inflate(bounds.width * 1.5);
            let spot = find_spawn_point(
                &state.map,
                area,
                (ship_cfg.width, ship_cfg.height),
                bounds.center(),
                0.0,
                rng,
            );
            if let Some((x, y)) = spot {
                let id = allocate_id(&mut state);
                let boss = has_boss && g == 0;
                state
                    .npcs
                    .push(spawn_npc(id, x, y, ship_cfg, &tuning.npc, Some(college), boss));
            }
        }
    }
    for _ in 0..tuning.npc.count {
        spawn_roamer(&mut state, tuning, rng);
    }

    follow_player(&mut state);
    state
}

fn allocate_id(state: &mut SailState) -> EntityId {
    let id = EntityId(state.next_id);
    state.next_id += 1;
    id
}

fn spawn_roamer(state: &mut SailState, tuning: &Tuning, rng: &mut impl Rng) {
    let area = Rect::new(0.0, 0.0, state.map.width, state.map.height);
    let spot = find_spawn_point(
        &state.map,
        area,
        (tuning.ship.width, tuning.ship.height),
        state.player.ship.center(),
        SPAWN_CLEARANCE,
        rng,
    );
    if let Some((x, y)) = spot {
        let id = allocate_id(state);
        state
            .npcs
            .push(spawn_npc(id, x, y, &tuning.ship, &tuning.npc, None, false));
    }
}

pub fn push_message(state: &mut SailState, message: impl Into<String>) {
    state.messages.push(message.into());
    if state.messages.len() > MAX_MESSAGES {
        let excess = state.messages.len() - MAX_MESSAGES;
        state.messages.drain(..excess);
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

pub fn key_down(state: &SailState, key: Key) -> SailState {
    let mut next = state.clone();
    if key == Key::Minimap {
        next.camera.zoom = MINIMAP_ZOOM;
    } else {
        next.player.key_down(key);
    }
    next
}

pub fn key_up(state: &SailState, key: Key) -> SailState {
    let mut next = state.clone();
    if key == Key::Minimap {
        next.camera.zoom = DEFAULT_ZOOM;
    } else {
        next.player.key_up(key);
    }
    next
}

/// Fire the player's guns (or selected crew member) off the given side.
pub fn player_fire(state: &SailState, side: Broadside, tuning: &Tuning) -> SailState {
    let mut next = state.clone();
    if next.status != GameStatus::Sailing {
        return next;
    }
    let angle = next.player.ship.entity.angle + side.offset();
    match next.player.fire(angle) {
        Volley::Shots(shots) => {
            let launched = launch_all(
                &next.player.ship,
                &shots,
                &mut next.next_id,
                &tuning.projectile,
            );
            next.projectiles.extend(launched);
        }
        Volley::Boost { .. } => push_message(&mut next, "Boost!"),
        Volley::Reloading => {}
    }
    next
}

pub fn cycle_projectile(state: &SailState) -> SailState {
    let mut next = state.clone();
    next.player.ship.cycle_projectile();
    next
}

/// Hire a crew member by key, charging its cost.
pub fn hire_crew(state: &SailState, bank: &CrewBank, key: &str) -> Result<SailState, GameError> {
    let mut next = state.clone();
    let kind = next.player.hire_crew(bank, key)?;
    push_message(&mut next, format!("{kind} joined the crew"));
    Ok(next)
}

/// Select an owned crew member; unowned kinds leave the state unchanged.
pub fn select_crew(state: &SailState, kind: Option<CrewKind>) -> SailState {
    let mut next = state.clone();
    next.player.select_crew(kind);
    next
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by `delta` seconds.  All randomness comes through
/// `rng` so callers control determinism.
pub fn tick(state: &SailState, delta: f32, tuning: &Tuning, rng: &mut impl Rng) -> SailState {
    let mut next = state.clone();
    next.frame += 1;

    if next.status != GameStatus::Sailing {
        return next;
    }
    if next.player.ship.dead {
        info!(frame = next.frame, "player sunk");
        next.status = GameStatus::Lost;
        return next;
    }

    // ── 1. Move, steer and fire ──────────────────────────────────────────────
    if next.player.ship.is_alive() {
        move_ships(&mut next, delta, tuning);
    }
    for victim in advance_status(&mut next, delta, tuning) {
        pay_kill(&mut next, victim);
    }

    // ── 2. Despawn and respawn ───────────────────────────────────────────────
    next.npcs.retain(|n| !n.ship.dead);
    next.projectiles.retain(|p| p.active);
    if next.player.ship.is_alive() {
        let roamers = next.npcs.iter().filter(|n| n.allegiance.is_none()).count();
        if roamers < tuning.npc.count {
            spawn_roamer(&mut next, tuning, rng);
        }
    }

    // ── 3. Collisions ────────────────────────────────────────────────────────
    let hits = {
        let SailState {
            player,
            npcs,
            projectiles,
            map,
            ..
        } = &mut next;
        let mut ships: Vec<&mut LivingEntity> = std::iter::once(&mut player.ship)
            .chain(npcs.iter_mut().map(|n| &mut n.ship))
            .collect();
        let hits = resolve_projectile_hits(
            projectiles,
            &mut ships,
            &*map,
            tuning.collision.map_hit,
            tuning.projectile.burn_time,
        );
        resolve_ship_collisions(&mut ships, &*map, &tuning.collision);
        hits
    };
    next.projectiles.retain(|p| p.active);

    // ── 4. Rewards and progression ───────────────────────────────────────────
    for hit in hits.iter().filter(|h| h.sunk && h.shooter == PLAYER_ID) {
        pay_kill(&mut next, hit.victim);
    }
    if hits.iter().any(|h| h.victim == PLAYER_ID && h.sunk) {
        warn!("player ship sinking");
    }
    if let LevelProgress::LeveledUp { level } = next.player.try_level_up() {
        push_message(&mut next, format!("Reached level {level}"));
    }
    capture_colleges(&mut next);

    // ── 5. Health bars and camera ────────────────────────────────────────────
    let SailState {
        player,
        npcs,
        health_bars,
        ..
    } = &mut next;
    health_bars.sync(std::iter::once(&player.ship).chain(npcs.iter().map(|n| &n.ship)));
    follow_player(&mut next);

    next
}

fn move_ships(state: &mut SailState, delta: f32, tuning: &Tuning) {
    state.player.act(delta);

    let target = state.player.ship.center();
    let SailState {
        npcs,
        projectiles,
        next_id,
        ..
    } = state;
    for npc in npcs.iter_mut() {
        if let Some(angle) = steer(npc, target, delta, &tuning.npc) {
            if let Volley::Shots(shots) = npc_fire(npc, angle, &tuning.npc) {
                projectiles.extend(launch_all(&npc.ship, &shots, next_id, &tuning.projectile));
            }
        }
        if npc.ship.is_alive() {
            npc.ship.advance(delta);
        }
    }

    for projectile in projectiles.iter_mut() {
        projectile.advance(delta);
    }
}

/// Burning and sinking keep going even while the player is sinking.
/// Returns the NPCs that burned down from a fire the player lit.
fn advance_status(state: &mut SailState, delta: f32, tuning: &Tuning) -> Vec<EntityId> {
    let burn = tuning.projectile.burn_damage;
    if state
        .player
        .ship
        .tick_status(delta, burn, tuning.ship.dying_time)
        .is_some()
    {
        warn!("player ship burned down");
    }
    let mut burned = Vec::new();
    for npc in state.npcs.iter_mut() {
        if npc.ship.tick_status(delta, burn, tuning.npc.dying_time) == Some(PLAYER_ID) {
            burned.push(npc.ship.id());
        }
    }
    burned
}

/// Pay the player for sinking `victim`.
fn pay_kill(state: &mut SailState, victim: EntityId) {
    let Some(reward) = state
        .npcs
        .iter()
        .find(|n| n.ship.id() == victim)
        .map(|n| n.reward)
    else {
        return;
    };
    state.player.issue_reward(reward);
    info!(victim = victim.0, gold = reward.gold, xp = reward.xp, "ship sunk");
    push_message(state, format!("Sunk a ship: +{} gold", reward.gold));
}

/// A college falls when the player docks at it and none of its guards are
/// still afloat.
fn capture_colleges(state: &mut SailState) {
    if !state.player.ship.is_alive() {
        return;
    }
    let dock = state.player.ship.bounds();
    let mut captured: Vec<usize> = Vec::new();
    for (i, college) in state.colleges.iter().enumerate() {
        let guarded = state
            .npcs
            .iter()
            .any(|n| n.allegiance == Some(college.id) && n.ship.is_alive());
        if !college.captured && !guarded && college.bounds.overlaps(&dock) {
            captured.push(i);
        }
    }
    for i in captured {
        state.colleges[i].captured = true;
        let college = state.colleges[i].clone();
        state.player.capture(&college);
        state.player.issue_reward(college.reward);
        info!(college = %college.name, gold = college.reward.gold, "college captured");
        push_message(state, format!("Captured {}!", college.name));
    }
    if !state.colleges.is_empty() && state.colleges.iter().all(|c| c.captured) {
        state.status = GameStatus::Won;
    }
}

fn follow_player(state: &mut SailState) {
    let (x, y) = state.player.ship.center();
    state.camera.x = x;
    state.camera.y = y;
}
