//! Player-only rules: steering, crew dispatch, gold and levelling.

use tracing::{debug, info};

use crate::config::ShipTuning;
use crate::crew::{CrewBank, CrewKind, CrewMember};
use crate::entities::{
    College, Key, LivingEntity, Player, ProjectileKind, Reward, Sprite, Volley, PLAYER_ID,
};
use crate::error::GameError;
use crate::geometry::normalize_angle;

use super::living::ShipSpec;

// ── Progression curve ────────────────────────────────────────────────────────

/// XP needed for the next level is `(level + 1) * XP_PER_LEVEL`.
pub const XP_PER_LEVEL: u32 = 10;
pub const LEVEL_MAX_HEALTH_STEP: f64 = 5.0;
pub const LEVEL_MAX_SPEED_STEP: f32 = 20.0;
pub const LEVEL_DAMAGE_STEP: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelProgress {
    LeveledUp { level: u32 },
    Unchanged,
}

impl Player {
    /// Fresh player at `(x, y)` facing north with an empty purse.
    pub fn new(x: f32, y: f32, tuning: &ShipTuning) -> Self {
        let mut ship = LivingEntity::new(ShipSpec {
            id: PLAYER_ID,
            x,
            y,
            width: tuning.width,
            height: tuning.height,
            angle: 0.0,
            health: tuning.health,
            max_speed: tuning.max_speed,
            acceleration: tuning.acceleration,
            deceleration: tuning.deceleration,
            turning_speed: tuning.turning_speed,
            sprite: Sprite::PlayerShip,
        });
        ship.projectile_kinds.push(ProjectileKind::Chainshot);
        Self {
            ship,
            balance: 0,
            xp: 0,
            level: 1,
            captured: Vec::new(),
            crew: Vec::new(),
            selected_crew: None,
            turning_left: false,
            turning_right: false,
        }
    }

    // ── Per-frame ────────────────────────────────────────────────────────────

    /// Steer, tick crew cooldowns and move.  Does nothing once sinking.
    pub fn act(&mut self, delta: f32) {
        if !self.ship.is_alive() {
            return;
        }
        let mut angular_speed = 0.0;
        if self.turning_left {
            angular_speed -= self.ship.turning_speed;
        }
        if self.turning_right {
            angular_speed += self.ship.turning_speed;
        }
        let e = &mut self.ship.entity;
        // Turning bites harder the faster the ship is going.
        let throttle = if e.max_speed > 0.0 {
            e.speed / e.max_speed
        } else {
            0.0
        };
        e.angle = normalize_angle(e.angle + angular_speed * delta * throttle);

        self.decrement_crew_cooldown(delta);
        self.ship.advance(delta);
    }

    pub fn decrement_crew_cooldown(&mut self, delta: f32) {
        for member in &mut self.crew {
            member.decrement_cooldown(delta);
        }
    }

    /// Fire at `angle`, through the selected crew member when there is one.
    pub fn fire(&mut self, angle: f32) -> Volley {
        if !self.ship.is_alive() {
            return Volley::Reloading;
        }
        let Some(kind) = self.selected_crew else {
            return self.ship.fire(angle);
        };
        let Some(member) = self.crew.iter_mut().find(|m| m.kind == kind) else {
            return self.ship.fire(angle);
        };
        let volley = member.fire(&self.ship, angle);
        if let Volley::Boost { speed } = volley {
            self.ship.entity.speed = speed;
        }
        volley
    }

    // ── Input ────────────────────────────────────────────────────────────────

    /// Returns `true` when the key was handled.  `Minimap` belongs to the
    /// camera, not the ship.
    pub fn key_down(&mut self, key: Key) -> bool {
        self.set_key(key, true)
    }

    pub fn key_up(&mut self, key: Key) -> bool {
        self.set_key(key, false)
    }

    fn set_key(&mut self, key: Key, down: bool) -> bool {
        match key {
            Key::Accelerate => self.ship.entity.accelerating = down,
            Key::Brake => self.ship.entity.braking = down,
            Key::TurnLeft => self.turning_left = down,
            Key::TurnRight => self.turning_right = down,
            Key::Minimap => return false,
        }
        true
    }

    // ── Levels ───────────────────────────────────────────────────────────────

    pub fn current_level(&self) -> u32 {
        self.level
    }

    pub fn xp_for_next_level(&self) -> u32 {
        (self.level + 1) * XP_PER_LEVEL
    }

    /// Apply at most one level-up.  XP beyond the threshold is discarded.
    pub fn try_level_up(&mut self) -> LevelProgress {
        if self.xp < self.xp_for_next_level() {
            return LevelProgress::Unchanged;
        }
        self.level += 1;
        self.xp = 0;
        self.ship.max_health += LEVEL_MAX_HEALTH_STEP;
        self.ship.health = self.ship.max_health;
        self.ship.entity.max_speed += LEVEL_MAX_SPEED_STEP;
        self.ship.damage += LEVEL_DAMAGE_STEP;
        info!(level = self.level, "player levelled up");
        LevelProgress::LeveledUp { level: self.level }
    }

    // ── Gold ─────────────────────────────────────────────────────────────────

    pub fn add_balance(&mut self, gold: u32) {
        self.balance = self.balance.saturating_add(gold);
    }

    pub fn add_xp(&mut self, xp: u32) {
        self.xp = self.xp.saturating_add(xp);
    }

    pub fn issue_reward(&mut self, reward: Reward) {
        self.add_balance(reward.gold);
        self.add_xp(reward.xp);
    }

    /// Take `deduction` gold.  Leaves the balance alone and returns `false`
    /// if there is not enough.
    pub fn deduct_balance(&mut self, deduction: u32) -> bool {
        if deduction > self.balance {
            return false;
        }
        self.balance -= deduction;
        true
    }

    pub fn capture(&mut self, college: &College) {
        if !self.captured.contains(&college.id) {
            self.captured.push(college.id);
        }
        debug!(college = %college.name, "captured");
    }

    // ── Crew ─────────────────────────────────────────────────────────────────

    pub fn has_crew(&self, kind: CrewKind) -> bool {
        self.crew.iter().any(|m| m.kind == kind)
    }

    pub fn add_crew_member(&mut self, member: CrewMember) {
        self.crew.push(member);
    }

    /// Pay for and sign on the crew member registered under `key`.
    pub fn hire_crew(&mut self, bank: &CrewBank, key: &str) -> Result<CrewKind, GameError> {
        let member = bank
            .by_key(key)
            .ok_or_else(|| GameError::UnknownCrew(key.to_string()))?;
        let kind = member.kind;
        if self.has_crew(kind) {
            return Err(GameError::CrewAlreadyHired(kind));
        }
        if !self.deduct_balance(kind.cost()) {
            return Err(GameError::InsufficientFunds {
                cost: kind.cost(),
                balance: self.balance,
            });
        }
        self.add_crew_member(member.clone());
        info!(crew = %kind, balance = self.balance, "crew hired");
        Ok(kind)
    }

    /// Select an owned crew member, or `None` for the ship's own guns.
    pub fn select_crew(&mut self, kind: Option<CrewKind>) -> bool {
        match kind {
            Some(kind) if !self.has_crew(kind) => false,
            _ => {
                self.selected_crew = kind;
                true
            }
        }
    }
}
