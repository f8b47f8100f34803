//! Hostile boats: spawning, chase-and-shoot steering, and projectile
//! launching for any ship.

use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::config::{NpcTuning, ProjectileTuning, ShipTuning};
use crate::entities::{
    CollegeId, EntityId, LivingEntity, Npc, Projectile, Reward, Shot, Sprite, Volley,
};
use crate::geometry::{angle_towards, distance, normalize_angle, Rect};
use crate::map::CollisionMap;

use super::living::ShipSpec;

/// Bosses are this much tougher and richer than a regular boat.
const BOSS_FACTOR: u32 = 3;

/// Spawn attempts before giving up for this frame.
const SPAWN_ATTEMPTS: usize = 20;

pub fn spawn_npc(
    id: EntityId,
    x: f32,
    y: f32,
    ship: &ShipTuning,
    cfg: &NpcTuning,
    allegiance: Option<CollegeId>,
    boss: bool,
) -> Npc {
    let factor = if boss { BOSS_FACTOR } else { 1 };
    let mut living = LivingEntity::new(ShipSpec {
        id,
        x,
        y,
        width: ship.width,
        height: ship.height,
        angle: 0.0,
        health: cfg.health * f64::from(factor),
        max_speed: cfg.max_speed,
        acceleration: ship.acceleration,
        deceleration: ship.deceleration,
        turning_speed: cfg.turning_speed,
        sprite: if boss { Sprite::BossShip } else { Sprite::EnemyShip },
    });
    if boss {
        living.damage = 1.5;
    }
    Npc {
        ship: living,
        allegiance,
        boss,
        reward: Reward {
            gold: cfg.kill_gold * factor,
            xp: cfg.kill_xp * factor,
        },
    }
}

/// Pick an open-water spot at least `min_distance` from `avoid`.
pub fn find_spawn_point(
    map: &impl CollisionMap,
    area: Rect,
    size: (f32, f32),
    avoid: (f32, f32),
    min_distance: f32,
    rng: &mut impl Rng,
) -> Option<(f32, f32)> {
    if area.width <= size.0 || area.height <= size.1 {
        return None;
    }
    (0..SPAWN_ATTEMPTS).find_map(|_| {
        let x = rng.gen_range(area.x..area.x + area.width - size.0);
        let y = rng.gen_range(area.y..area.y + area.height - size.1);
        let rect = Rect::new(x, y, size.0, size.1);
        let clear = !map.is_colliding(&rect.inflate(size.0))
            && distance(rect.center(), avoid) >= min_distance;
        clear.then_some((x, y))
    })
}

/// Signed shortest turn from `from` to `to`, in `(-π, π]`.
fn turn_between(from: f32, to: f32) -> f32 {
    let diff = normalize_angle(to - from);
    if diff > PI {
        diff - TAU
    } else {
        diff
    }
}

/// Chase `target` once it is in sight and return a firing heading when it is
/// in range.  Movement itself happens in `LivingEntity::advance`.
pub fn steer(npc: &mut Npc, target: (f32, f32), delta: f32, cfg: &NpcTuning) -> Option<f32> {
    let ship = &mut npc.ship;
    if !ship.is_alive() {
        return None;
    }
    let here = ship.center();
    let range = distance(here, target);
    if range > cfg.sight_range {
        ship.entity.accelerating = false;
        return None;
    }

    let desired = angle_towards(here, target);
    let max_turn = ship.turning_speed * delta;
    let turn = turn_between(ship.entity.angle, desired).clamp(-max_turn, max_turn);
    ship.entity.angle = normalize_angle(ship.entity.angle + turn);
    // Close in, but hold off at broadside distance.
    ship.entity.accelerating = range > cfg.fire_range * 0.6;

    (range <= cfg.fire_range).then_some(desired)
}

/// Fire an NPC's guns, holding the next shot back by the NPC fire interval.
pub fn npc_fire(npc: &mut Npc, angle: f32, cfg: &NpcTuning) -> Volley {
    let volley = npc.ship.fire(angle);
    if matches!(volley, Volley::Shots(_)) {
        npc.ship.current_cooldown = npc.ship.current_cooldown.max(cfg.fire_interval);
    }
    volley
}

/// Create projectiles for every shot, drawing ids from `next_id`.
pub fn launch_all(
    ship: &LivingEntity,
    shots: &[Shot],
    next_id: &mut u64,
    cfg: &ProjectileTuning,
) -> Vec<Projectile> {
    shots
        .iter()
        .map(|shot| {
            let id = EntityId(*next_id);
            *next_id += 1;
            ship.launch(shot, id, cfg.size, cfg.life_time)
        })
        .collect()
}
