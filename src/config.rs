//! Gameplay tuning.
//!
//! Every section falls back to its `Default`, so a TOML file only needs the
//! keys it wants to override:
//!
//! ```toml
//! [npc]
//! count = 12
//!
//! [collision]
//! gating = "first_come_first_served"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::GameError;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tuning {
    pub ship: ShipTuning,
    pub npc: NpcTuning,
    pub projectile: ProjectileTuning,
    pub collision: CollisionTuning,
    pub map: MapTuning,
}

impl Tuning {
    /// Load from `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, GameError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// The player's ship.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShipTuning {
    pub width: f32,
    pub height: f32,
    pub health: f64,
    /// World units per second.
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Radians per second at full speed.
    pub turning_speed: f32,
    /// Seconds spent sinking before the game is lost.
    pub dying_time: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            width: 24.0,
            height: 16.0,
            health: 20.0,
            max_speed: 100.0,
            acceleration: 50.0,
            deceleration: 25.0,
            turning_speed: 2.0,
            dying_time: 2.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct NpcTuning {
    /// Hostile boats kept alive at once (bosses excluded).
    pub count: usize,
    pub health: f64,
    pub max_speed: f32,
    pub turning_speed: f32,
    /// Distance at which an NPC starts chasing the player.
    pub sight_range: f32,
    pub fire_range: f32,
    /// Minimum seconds between NPC volleys.
    pub fire_interval: f32,
    pub kill_gold: u32,
    pub kill_xp: u32,
    /// Seconds an NPC spends sinking before it is removed.
    pub dying_time: f32,
}

impl Default for NpcTuning {
    fn default() -> Self {
        Self {
            count: 8,
            health: 10.0,
            max_speed: 60.0,
            turning_speed: 1.5,
            sight_range: 260.0,
            fire_range: 160.0,
            fire_interval: 2.0,
            kill_gold: 10,
            kill_xp: 5,
            dying_time: 1.5,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectileTuning {
    pub size: f32,
    /// Seconds a projectile stays in flight.
    pub life_time: f32,
    /// Damage per second while a ship is burning.
    pub burn_damage: f64,
    pub burn_time: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            size: 4.0,
            life_time: 1.2,
            burn_damage: 1.0,
            burn_time: 3.0,
        }
    }
}

/// How two overlapping ships respond to each other within one frame.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BounceGating {
    /// Only the first ship of the pair, in iteration order, reacts.  Its own
    /// cooldown is the only gate that is consulted.
    FirstComeFirstServed,
    /// Both ships react together, and only when neither is cooling down.
    #[default]
    Mutual,
}

/// What the projectile pass does after a projectile hits map geometry.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MapHitPolicy {
    /// End the pass for this frame.
    StopScan,
    /// Keep checking the remaining projectiles.
    #[default]
    Continue,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollisionTuning {
    /// Frames during which a ship ignores the map after bouncing off it.
    pub island_cooldown_frames: u32,
    /// Frames during which a ship ignores other ships after a bounce.
    pub boat_cooldown_frames: u32,
    /// Speed is multiplied by this on every bounce.
    pub bounce_speed_factor: f32,
    /// Minimum speed after a bounce so stationary ships still separate.
    pub bounce_min_speed: f32,
    pub gating: BounceGating,
    pub map_hit: MapHitPolicy,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            island_cooldown_frames: 20,
            boat_cooldown_frames: 20,
            bounce_speed_factor: 0.5,
            bounce_min_speed: 30.0,
            gating: BounceGating::default(),
            map_hit: MapHitPolicy::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapTuning {
    pub width: f32,
    pub height: f32,
    pub island_count: usize,
    pub island_min_size: f32,
    pub island_max_size: f32,
    pub colleges: Vec<String>,
    pub college_size: f32,
    pub college_gold: u32,
    pub college_xp: u32,
    /// Guards spawned around each college.
    pub guards_per_college: usize,
}

impl Default for MapTuning {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1000.0,
            island_count: 14,
            island_min_size: 40.0,
            island_max_size: 120.0,
            colleges: vec![
                "Derwent".to_string(),
                "Vanbrugh".to_string(),
                "James".to_string(),
                "Langwith".to_string(),
            ],
            college_size: 60.0,
            college_gold: 100,
            college_xp: 20,
            guards_per_college: 2,
        }
    }
}
