//! Collision and combat resolution, run once per frame.
//!
//! Both passes work over slices, so deactivating a projectile or bouncing a
//! ship mid-scan never disturbs the iteration.

use std::collections::HashSet;
use std::f32::consts::PI;

use tracing::debug;

use crate::config::{BounceGating, CollisionTuning, MapHitPolicy};
use crate::entities::{EntityId, LivingEntity, Projectile};
use crate::geometry::{angle_towards, normalize_angle};
use crate::map::CollisionMap;

use super::living::Bump;

/// A bounce that happened this frame.  `other` is `None` for the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    pub ship: EntityId,
    pub other: Option<EntityId>,
}

/// A projectile that struck a ship this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub projectile: EntityId,
    pub shooter: EntityId,
    pub victim: EntityId,
    pub damage: f64,
    /// This hit took the victim's last health.
    pub sunk: bool,
}

// ── Ships ────────────────────────────────────────────────────────────────────

/// Bounce ships off the map and off each other, then tick every collision
/// cooldown down by one frame.
pub fn resolve_ship_collisions(
    ships: &mut [&mut LivingEntity],
    map: &impl CollisionMap,
    cfg: &CollisionTuning,
) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for ship in ships.iter_mut() {
        if ship.collided_with_island == 0 && map.is_colliding(&ship.bounds()) {
            ship.collide(Bump::Island, cfg);
            contacts.push(Contact {
                ship: ship.id(),
                other: None,
            });
        }
    }

    match cfg.gating {
        BounceGating::FirstComeFirstServed => first_come_first_served(ships, cfg, &mut contacts),
        BounceGating::Mutual => mutual(ships, cfg, &mut contacts),
    }

    for ship in ships.iter_mut() {
        ship.collided_with_island = ship.collided_with_island.saturating_sub(1);
        ship.collided_with_boat = ship.collided_with_boat.saturating_sub(1);
    }

    contacts
}

fn touching(a: &LivingEntity, b: &LivingEntity) -> bool {
    a.is_alive() && b.is_alive() && a.bounds().overlaps(&b.bounds())
}

/// Heading that carries `a` directly away from `b`.
fn away_from(a: &LivingEntity, b: &LivingEntity) -> f32 {
    normalize_angle(angle_towards(a.center(), b.center()) + PI)
}

/// Ordered scan: the first ship of a pair whose own cooldown is clear reacts,
/// and the pair is settled for the rest of the frame.
fn first_come_first_served(
    ships: &mut [&mut LivingEntity],
    cfg: &CollisionTuning,
    contacts: &mut Vec<Contact>,
) {
    let mut settled: HashSet<(usize, usize)> = HashSet::new();
    for i in 0..ships.len() {
        for j in 0..ships.len() {
            if i == j || settled.contains(&(i.min(j), i.max(j))) {
                continue;
            }
            let (a, b) = (&*ships[i], &*ships[j]);
            if !touching(a, b) || a.collided_with_boat != 0 {
                continue;
            }
            let away = away_from(a, b);
            let other = b.id();
            ships[i].collide(Bump::Boat { away }, cfg);
            settled.insert((i.min(j), i.max(j)));
            contacts.push(Contact {
                ship: ships[i].id(),
                other: Some(other),
            });
        }
    }
}

/// Each pair is checked once; both ships bounce, and only when neither is
/// cooling down.
fn mutual(ships: &mut [&mut LivingEntity], cfg: &CollisionTuning, contacts: &mut Vec<Contact>) {
    for i in 0..ships.len() {
        for j in (i + 1)..ships.len() {
            let (a, b) = (&*ships[i], &*ships[j]);
            if !touching(a, b) || a.collided_with_boat != 0 || b.collided_with_boat != 0 {
                continue;
            }
            let away_a = away_from(a, b);
            let away_b = away_from(b, a);
            let (id_a, id_b) = (a.id(), b.id());
            ships[i].collide(Bump::Boat { away: away_a }, cfg);
            ships[j].collide(Bump::Boat { away: away_b }, cfg);
            contacts.push(Contact {
                ship: id_a,
                other: Some(id_b),
            });
            contacts.push(Contact {
                ship: id_b,
                other: Some(id_a),
            });
        }
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// Retire projectiles that hit the map and apply damage for those that hit
/// ships.  A projectile keeps scanning after its first hit, so it can damage
/// every ship it overlaps in the same frame.
pub fn resolve_projectile_hits(
    projectiles: &mut [Projectile],
    ships: &mut [&mut LivingEntity],
    map: &impl CollisionMap,
    policy: MapHitPolicy,
    burn_time: f32,
) -> Vec<Hit> {
    let mut hits = Vec::new();

    for projectile in projectiles.iter_mut().filter(|p| p.active) {
        let bounds = projectile.bounds();
        if map.is_colliding(&bounds) {
            projectile.active = false;
            match policy {
                MapHitPolicy::StopScan => break,
                MapHitPolicy::Continue => continue,
            }
        }

        for ship in ships.iter_mut() {
            if ship.id() == projectile.shooter || !ship.is_alive() {
                continue;
            }
            if !bounds.overlaps(&ship.bounds()) {
                continue;
            }
            let sunk = ship.hit_by(projectile, burn_time);
            projectile.active = false;
            debug!(
                victim = ship.id().0,
                shooter = projectile.shooter.0,
                projectile = projectile.id.0,
                health = ship.health,
                "ship hit"
            );
            hits.push(Hit {
                projectile: projectile.id,
                shooter: projectile.shooter,
                victim: ship.id(),
                damage: projectile.damage,
                sunk,
            });
        }
    }

    hits
}
