//! Per-ship state transitions shared by the player and NPC boats.

use std::f32::consts::PI;

use tracing::debug;

use crate::config::CollisionTuning;
use crate::entities::{Entity, EntityId, LivingEntity, Projectile, ProjectileKind, Shot, Sprite, Volley};
use crate::geometry::{heading_vector, normalize_angle, Rect};

// ── Projectile table ─────────────────────────────────────────────────────────

pub fn projectile_base_damage(kind: ProjectileKind) -> f64 {
    match kind {
        ProjectileKind::Cannonball => 2.0,
        ProjectileKind::Chainshot => 1.0,
        ProjectileKind::Incendiary => 1.5,
    }
}

/// World units per second.
pub fn projectile_speed(kind: ProjectileKind) -> f32 {
    match kind {
        ProjectileKind::Cannonball => 280.0,
        ProjectileKind::Chainshot => 360.0,
        ProjectileKind::Incendiary => 240.0,
    }
}

/// Seconds the ship's guns need after firing this kind.
pub fn projectile_reload(kind: ProjectileKind) -> f32 {
    match kind {
        ProjectileKind::Cannonball => 0.8,
        ProjectileKind::Chainshot => 0.5,
        ProjectileKind::Incendiary => 1.2,
    }
}

pub fn projectile_sets_on_fire(kind: ProjectileKind) -> bool {
    matches!(kind, ProjectileKind::Incendiary)
}

// ── Construction ─────────────────────────────────────────────────────────────

/// Everything needed to launch a ship.
#[derive(Clone, Debug)]
pub struct ShipSpec {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
    pub health: f64,
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub turning_speed: f32,
    pub sprite: Sprite,
}

/// How a ship was bounced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bump {
    Island,
    /// Pushed away along the given heading.
    Boat { away: f32 },
}

impl LivingEntity {
    pub fn new(spec: ShipSpec) -> Self {
        Self {
            entity: Entity {
                id: spec.id,
                x: spec.x,
                y: spec.y,
                width: spec.width,
                height: spec.height,
                angle: normalize_angle(spec.angle),
                speed: 0.0,
                max_speed: spec.max_speed,
                acceleration: spec.acceleration,
                deceleration: spec.deceleration,
                accelerating: false,
                braking: false,
                sprite: spec.sprite,
            },
            health: spec.health,
            max_health: spec.health,
            damage: 1.0,
            on_fire: false,
            burn_timer: 0.0,
            ignited_by: None,
            dying: false,
            dying_timer: 0.0,
            dead: false,
            current_cooldown: 0.0,
            projectile_kinds: vec![ProjectileKind::Cannonball],
            selected_projectile: ProjectileKind::Cannonball,
            turning_speed: spec.turning_speed,
            collided_with_island: 0,
            collided_with_boat: 0,
        }
    }

    pub fn id(&self) -> EntityId {
        self.entity.id
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.entity.x, self.entity.y, self.entity.width, self.entity.height)
    }

    pub fn center(&self) -> (f32, f32) {
        self.bounds().center()
    }

    /// Neither sinking nor sunk.
    pub fn is_alive(&self) -> bool {
        !self.dying && !self.dead
    }

    // ── Movement ─────────────────────────────────────────────────────────────

    /// Integrate speed and position for one frame and tick the gun reload.
    pub fn advance(&mut self, delta: f32) {
        let e = &mut self.entity;
        if e.accelerating && e.speed < e.max_speed {
            e.speed = (e.speed + e.acceleration * delta).min(e.max_speed);
        } else if e.accelerating {
            // A boost above the cap bleeds off down to it.
            e.speed = (e.speed - e.deceleration * delta).max(e.max_speed);
        } else {
            let drag = if e.braking {
                e.deceleration * 2.0
            } else {
                e.deceleration
            };
            e.speed = (e.speed - drag * delta).max(0.0);
        }

        let (dx, dy) = heading_vector(e.angle);
        e.x += dx * e.speed * delta;
        e.y += dy * e.speed * delta;

        self.current_cooldown = (self.current_cooldown - delta).max(0.0);
    }

    /// Bounce response.  The matching cooldown starts at its configured length.
    pub fn collide(&mut self, bump: Bump, cfg: &CollisionTuning) {
        let e = &mut self.entity;
        match bump {
            Bump::Island => {
                e.angle = normalize_angle(e.angle + PI);
                self.collided_with_island = cfg.island_cooldown_frames;
            }
            Bump::Boat { away } => {
                e.angle = normalize_angle(away);
                self.collided_with_boat = cfg.boat_cooldown_frames;
            }
        }
        e.speed = (e.speed * cfg.bounce_speed_factor).max(cfg.bounce_min_speed);
        debug!(ship = e.id.0, ?bump, "bounced");
    }

    // ── Combat ───────────────────────────────────────────────────────────────

    /// Reduce health, clamped at zero.  Returns `true` when this hit sank the
    /// ship.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        if self.health <= 0.0 {
            self.dying = true;
            self.on_fire = false;
            self.ignited_by = None;
            self.entity.accelerating = false;
            return true;
        }
        false
    }

    /// Apply a projectile hit.  Returns `true` when the hit sank the ship.
    pub fn hit_by(&mut self, projectile: &Projectile, burn_time: f32) -> bool {
        let sunk = self.take_damage(projectile.damage);
        if !sunk && projectile.sets_on_fire {
            self.on_fire = true;
            self.burn_timer = burn_time;
            self.ignited_by = Some(projectile.shooter);
        }
        sunk
    }

    pub fn heal(&mut self, amount: f64) {
        self.health = (self.health + amount).clamp(0.0, self.max_health);
    }

    /// Burn damage and sinking.  Returns the ship that lit the fire when
    /// burning sank this ship this frame.
    pub fn tick_status(
        &mut self,
        delta: f32,
        burn_damage: f64,
        dying_time: f32,
    ) -> Option<EntityId> {
        let mut sunk_by = None;
        if self.on_fire && self.is_alive() {
            let igniter = self.ignited_by;
            if self.take_damage(burn_damage * f64::from(delta)) {
                sunk_by = igniter;
            } else {
                self.burn_timer -= delta;
                if self.burn_timer <= 0.0 {
                    self.on_fire = false;
                    self.burn_timer = 0.0;
                    self.ignited_by = None;
                }
            }
        }
        if self.dying && !self.dead {
            self.dying_timer += delta;
            if self.dying_timer >= dying_time {
                self.dead = true;
            }
        }
        sunk_by
    }

    /// Fire the ship's own guns with the selected projectile kind.
    pub fn fire(&mut self, angle: f32) -> Volley {
        if !self.is_alive() || self.current_cooldown > 0.0 {
            return Volley::Reloading;
        }
        let kind = self.selected_projectile;
        self.current_cooldown = projectile_reload(kind);
        Volley::Shots(vec![Shot {
            angle,
            kind,
            damage_factor: 1.0,
        }])
    }

    /// Switch to the next allowed projectile kind.
    pub fn cycle_projectile(&mut self) -> ProjectileKind {
        if let Some(pos) = self
            .projectile_kinds
            .iter()
            .position(|k| *k == self.selected_projectile)
        {
            let next = (pos + 1) % self.projectile_kinds.len();
            self.selected_projectile = self.projectile_kinds[next];
        } else if let Some(first) = self.projectile_kinds.first() {
            self.selected_projectile = *first;
        }
        self.selected_projectile
    }

    /// Turn a shot into a projectile leaving the centre of this ship.
    pub fn launch(&self, shot: &Shot, id: EntityId, size: f32, life_time: f32) -> Projectile {
        let (cx, cy) = self.center();
        Projectile {
            id,
            shooter: self.id(),
            x: cx - size / 2.0,
            y: cy - size / 2.0,
            size,
            angle: normalize_angle(shot.angle),
            speed: projectile_speed(shot.kind),
            damage: projectile_base_damage(shot.kind) * self.damage * shot.damage_factor,
            kind: shot.kind,
            sets_on_fire: projectile_sets_on_fire(shot.kind),
            active: true,
            ttl: life_time,
        }
    }
}

impl Projectile {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    /// Fly for one frame; expire when the fuse runs out.
    pub fn advance(&mut self, delta: f32) {
        let (dx, dy) = heading_vector(self.angle);
        self.x += dx * self.speed * delta;
        self.y += dy * self.speed * delta;
        self.ttl -= delta;
        if self.ttl <= 0.0 {
            self.active = false;
        }
    }
}
