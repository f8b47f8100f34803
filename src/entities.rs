//! All game entity types: pure data, no logic.
//!
//! State transitions live in `compute`; this module only describes shapes.

use std::collections::BTreeSet;

use crate::crew::{CrewKind, CrewMember};
use crate::geometry::Rect;
use crate::map::IslandMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Id reserved for the player's ship.
pub const PLAYER_ID: EntityId = EntityId(0);

/// Texture handle; the display layer decides what each one looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sprite {
    PlayerShip,
    EnemyShip,
    BossShip,
}

// ── Projectile kinds ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    Cannonball,
    /// Light, fast, weak.
    Chainshot,
    /// Sets the target on fire.
    Incendiary,
}

/// One projectile to be spawned, relative to the firing ship.
#[derive(Clone, Debug, PartialEq)]
pub struct Shot {
    pub angle: f32,
    pub kind: ProjectileKind,
    /// Multiplies the shooter's damage on top of the kind's base damage.
    pub damage_factor: f64,
}

/// Result of pulling the trigger.
#[derive(Clone, Debug, PartialEq)]
pub enum Volley {
    Shots(Vec<Shot>),
    /// The ship surged forward instead of firing.
    Boost { speed: f32 },
    /// Still on cooldown; nothing happened.
    Reloading,
}

// ── Ships ─────────────────────────────────────────────────────────────────────

/// Positioned, moving thing on the sea.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Radians clockwise from north.
    pub angle: f32,
    pub speed: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub accelerating: bool,
    pub braking: bool,
    pub sprite: Sprite,
}

/// An entity that can be shot, burn and sink.
#[derive(Clone, Debug, PartialEq)]
pub struct LivingEntity {
    pub entity: Entity,
    pub health: f64,
    pub max_health: f64,
    /// Multiplier applied to every projectile this ship fires.
    pub damage: f64,
    pub on_fire: bool,
    pub burn_timer: f32,
    /// Ship whose shot started the current fire.
    pub ignited_by: Option<EntityId>,
    /// Sinking: no longer steers, fires or collides.
    pub dying: bool,
    pub dying_timer: f32,
    pub dead: bool,
    /// Seconds until the ship's own guns are reloaded.
    pub current_cooldown: f32,
    pub projectile_kinds: Vec<ProjectileKind>,
    pub selected_projectile: ProjectileKind,
    pub turning_speed: f32,
    /// Frames left before the map can bounce this ship again.
    pub collided_with_island: u32,
    /// Frames left before another ship can bounce this ship again.
    pub collided_with_boat: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub ship: LivingEntity,
    pub balance: u32,
    pub xp: u32,
    pub level: u32,
    pub captured: Vec<CollegeId>,
    pub crew: Vec<CrewMember>,
    pub selected_crew: Option<CrewKind>,
    pub turning_left: bool,
    pub turning_right: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Npc {
    pub ship: LivingEntity,
    /// College this boat guards, if any.
    pub allegiance: Option<CollegeId>,
    pub boss: bool,
    /// Paid to the player on a kill.
    pub reward: Reward,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub shooter: EntityId,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub angle: f32,
    pub speed: f32,
    pub damage: f64,
    pub kind: ProjectileKind,
    pub sets_on_fire: bool,
    pub active: bool,
    /// Seconds of flight left.
    pub ttl: f32,
}

// ── World ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reward {
    pub gold: u32,
    pub xp: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollegeId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct College {
    pub id: CollegeId,
    pub name: String,
    pub bounds: Rect,
    pub reward: Reward,
    pub captured: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World point shown at the centre of the screen.
    pub x: f32,
    pub y: f32,
    /// World units per screen unit; larger shows more of the map.
    pub zoom: f32,
}

/// Ids of ships that currently show a health bar.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HealthBars {
    pub attached: BTreeSet<EntityId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Sailing,
    Won,
    Lost,
}

/// Engine-agnostic keys the sail screen responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Accelerate,
    Brake,
    TurnLeft,
    TurnRight,
    Minimap,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Everything the sail screen simulates.  Cloneable so pure update functions
/// can return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct SailState {
    pub player: Player,
    pub npcs: Vec<Npc>,
    pub projectiles: Vec<Projectile>,
    pub map: IslandMap,
    pub colleges: Vec<College>,
    pub health_bars: HealthBars,
    pub camera: Camera,
    pub status: GameStatus,
    pub next_id: u64,
    pub frame: u64,
    /// Recent events for the HUD, newest last.
    pub messages: Vec<String>,
}
