use std::collections::HashSet;

use pirate_sail::compute::npc::spawn_npc;
use pirate_sail::compute::*;
use pirate_sail::config::Tuning;
use pirate_sail::crew::{CrewBank, CrewKind};
use pirate_sail::entities::*;
use pirate_sail::geometry::Rect;
use pirate_sail::map::{CollisionMap, IslandMap};

use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

/// No roaming boats, so nothing spawns behind a test's back.
fn quiet_tuning() -> Tuning {
    let mut tuning = Tuning::default();
    tuning.npc.count = 0;
    tuning
}

/// Player alone in the middle of an empty 1000×1000 sea.
fn make_state(tuning: &Tuning) -> SailState {
    SailState {
        player: Player::new(488.0, 492.0, &tuning.ship),
        npcs: Vec::new(),
        projectiles: Vec::new(),
        map: IslandMap::open(1000.0, 1000.0),
        colleges: Vec::new(),
        health_bars: HealthBars::default(),
        camera: Camera {
            x: 500.0,
            y: 500.0,
            zoom: DEFAULT_ZOOM,
        },
        status: GameStatus::Sailing,
        next_id: 1,
        frame: 0,
        messages: Vec::new(),
    }
}

fn npc_at(state: &mut SailState, tuning: &Tuning, x: f32, y: f32) -> EntityId {
    let id = EntityId(state.next_id);
    state.next_id += 1;
    state
        .npcs
        .push(spawn_npc(id, x, y, &tuning.ship, &tuning.npc, None, false));
    id
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_puts_player_at_centre() {
    let tuning = Tuning::default();
    let s = init_state(&tuning, &mut seeded_rng());
    let (x, y) = s.player.ship.center();
    assert_eq!(x, tuning.map.width / 2.0);
    assert_eq!(y, tuning.map.height / 2.0);
    assert_eq!(s.player.balance, 0);
    assert_eq!(s.player.current_level(), 1);
    assert_eq!(s.status, GameStatus::Sailing);
    assert_eq!((s.camera.x, s.camera.y), (x, y));
    assert_eq!(s.camera.zoom, DEFAULT_ZOOM);
}

#[test]
fn init_state_places_every_college() {
    let tuning = Tuning::default();
    let s = init_state(&tuning, &mut seeded_rng());
    let names: Vec<&str> = s.colleges.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Derwent", "Vanbrugh", "James", "Langwith"]);
    assert!(s.colleges.iter().all(|c| !c.captured));
    for college in &s.colleges {
        assert!(s.map.in_bounds(&college.bounds));
        assert!(!s.map.islands.iter().any(|i| i.overlaps(&college.bounds)));
    }
}

#[test]
fn init_state_spawns_ships_in_open_water() {
    let tuning = Tuning::default();
    let s = init_state(&tuning, &mut seeded_rng());
    assert!(!s.map.is_colliding(&s.player.ship.bounds()));
    assert!(!s.npcs.is_empty());
    assert!(s.npcs.iter().filter(|n| n.boss).count() <= 1);
    let mut ids = HashSet::new();
    ids.insert(s.player.ship.id());
    for npc in &s.npcs {
        assert!(!s.map.is_colliding(&npc.ship.bounds()));
        assert!(ids.insert(npc.ship.id()), "duplicate id {:?}", npc.ship.id());
    }
}

#[test]
fn init_state_is_deterministic_per_seed() {
    let tuning = Tuning::default();
    let a = init_state(&tuning, &mut StdRng::seed_from_u64(7));
    let b = init_state(&tuning, &mut StdRng::seed_from_u64(7));
    assert_eq!(a.map, b.map);
    assert_eq!(a.npcs, b.npcs);
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[test]
fn minimap_key_changes_zoom() {
    let tuning = quiet_tuning();
    let s = make_state(&tuning);
    let zoomed = key_down(&s, Key::Minimap);
    assert_eq!(zoomed.camera.zoom, MINIMAP_ZOOM);
    assert_eq!(s.camera.zoom, DEFAULT_ZOOM); // input state untouched
    let back = key_up(&zoomed, Key::Minimap);
    assert_eq!(back.camera.zoom, DEFAULT_ZOOM);
}

#[test]
fn steering_keys_reach_the_player() {
    let tuning = quiet_tuning();
    let s = key_down(&make_state(&tuning), Key::Accelerate);
    assert!(s.player.ship.entity.accelerating);
    let s = key_up(&s, Key::Accelerate);
    assert!(!s.player.ship.entity.accelerating);
}

#[test]
fn bow_gun_launches_one_projectile() {
    let tuning = quiet_tuning();
    let s = make_state(&tuning);
    let fired = player_fire(&s, Broadside::Bow, &tuning);
    assert_eq!(fired.projectiles.len(), 1);
    let p = &fired.projectiles[0];
    assert_eq!(p.shooter, PLAYER_ID);
    assert_eq!(p.angle, 0.0);
    assert_eq!(p.id, EntityId(1));
    assert_eq!(fired.next_id, 2);
    assert!(s.projectiles.is_empty());

    // Still reloading.
    let again = player_fire(&fired, Broadside::Port, &tuning);
    assert_eq!(again.projectiles.len(), 1);
}

#[test]
fn broadsides_fire_abeam() {
    let tuning = quiet_tuning();
    let s = make_state(&tuning);
    let port = player_fire(&s, Broadside::Port, &tuning);
    let starboard = player_fire(&s, Broadside::Starboard, &tuning);
    assert!((port.projectiles[0].angle - 3.0 * std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    assert!((starboard.projectiles[0].angle - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
}

#[test]
fn hired_crew_changes_the_volley() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    s.player.balance = 100;
    let s = hire_crew(&s, &CrewBank::new(), "triple_shot").expect("affordable");
    assert_eq!(s.player.balance, 20);
    let s = select_crew(&s, Some(CrewKind::TripleShot));
    let fired = player_fire(&s, Broadside::Bow, &tuning);
    assert_eq!(fired.projectiles.len(), 3);
    let ids: HashSet<EntityId> = fired.projectiles.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn failed_hire_leaves_state_alone() {
    let tuning = quiet_tuning();
    let s = make_state(&tuning);
    assert!(hire_crew(&s, &CrewBank::new(), "double_shot").is_err());
    assert!(s.player.crew.is_empty());
}

#[test]
fn cycle_projectile_switches_shot() {
    let tuning = quiet_tuning();
    let s = cycle_projectile(&make_state(&tuning));
    assert_eq!(s.player.ship.selected_projectile, ProjectileKind::Chainshot);
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_increments_frame() {
    let tuning = quiet_tuning();
    let s = make_state(&tuning);
    let next = tick(&s, DT, &tuning, &mut seeded_rng());
    assert_eq!(next.frame, 1);
    assert_eq!(s.frame, 0);
}

#[test]
fn tick_moves_accelerating_player_and_camera() {
    let tuning = quiet_tuning();
    let s = key_down(&make_state(&tuning), Key::Accelerate);
    let next = tick(&s, 0.5, &tuning, &mut seeded_rng());
    assert!(next.player.ship.entity.y < s.player.ship.entity.y);
    assert_eq!(next.camera.y, next.player.ship.center().1);
}

#[test]
fn tick_drops_expired_projectiles() {
    let tuning = quiet_tuning();
    let s = player_fire(&make_state(&tuning), Broadside::Bow, &tuning);
    let mut s = tick(&s, 0.5, &tuning, &mut seeded_rng());
    assert_eq!(s.projectiles.len(), 1);
    for _ in 0..3 {
        s = tick(&s, 0.5, &tuning, &mut seeded_rng());
    }
    assert!(s.projectiles.is_empty());
}

#[test]
fn player_kill_pays_the_npc_reward() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    let victim = npc_at(&mut s, &tuning, 600.0, 500.0);
    s.npcs[0].ship.health = 1.0;
    s.projectiles.push(Projectile {
        id: EntityId(99),
        shooter: PLAYER_ID,
        x: 608.0,
        y: 504.0,
        size: 4.0,
        angle: 0.0,
        speed: 0.0,
        damage: 2.0,
        kind: ProjectileKind::Cannonball,
        sets_on_fire: false,
        active: true,
        ttl: 1.0,
    });

    let next = tick(&s, DT, &tuning, &mut seeded_rng());
    assert_eq!(next.player.balance, tuning.npc.kill_gold);
    assert_eq!(next.player.xp, tuning.npc.kill_xp);
    let npc = next.npcs.iter().find(|n| n.ship.id() == victim).unwrap();
    assert!(npc.ship.dying);
    assert!(!next.projectiles.iter().any(|p| p.id == EntityId(99)));
}

#[test]
fn npc_kill_by_other_npc_pays_nothing() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    npc_at(&mut s, &tuning, 100.0, 100.0);
    s.npcs[0].ship.health = 1.0;
    s.projectiles.push(Projectile {
        id: EntityId(99),
        shooter: EntityId(42),
        x: 108.0,
        y: 104.0,
        size: 4.0,
        angle: 0.0,
        speed: 0.0,
        damage: 2.0,
        kind: ProjectileKind::Cannonball,
        sets_on_fire: false,
        active: true,
        ttl: 1.0,
    });
    let next = tick(&s, DT, &tuning, &mut seeded_rng());
    assert!(next.npcs[0].ship.dying);
    assert_eq!(next.player.balance, 0);
}

#[test]
fn player_fire_that_burns_a_ship_down_pays_the_reward() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    let victim = npc_at(&mut s, &tuning, 100.0, 100.0);
    s.npcs[0].ship.health = 1.6;
    s.projectiles.push(Projectile {
        id: EntityId(99),
        shooter: PLAYER_ID,
        x: 108.0,
        y: 104.0,
        size: 4.0,
        angle: 0.0,
        speed: 0.0,
        damage: 1.5,
        kind: ProjectileKind::Incendiary,
        sets_on_fire: true,
        active: true,
        ttl: 1.0,
    });

    let mut rng = seeded_rng();
    let mut next = tick(&s, DT, &tuning, &mut rng);
    assert!(next.npcs[0].ship.on_fire);
    assert_eq!(next.player.balance, 0);

    for _ in 0..60 {
        next = tick(&next, DT, &tuning, &mut rng);
    }
    let npc = next.npcs.iter().find(|n| n.ship.id() == victim).unwrap();
    assert!(npc.ship.dying);
    assert_eq!(next.player.balance, tuning.npc.kill_gold);
    assert_eq!(next.player.xp, tuning.npc.kill_xp);
}

#[test]
fn fire_lit_by_another_npc_pays_nothing() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    npc_at(&mut s, &tuning, 100.0, 100.0);
    s.npcs[0].ship.health = 0.05;
    s.npcs[0].ship.on_fire = true;
    s.npcs[0].ship.burn_timer = 3.0;
    s.npcs[0].ship.ignited_by = Some(EntityId(42));

    let mut rng = seeded_rng();
    let mut next = s;
    for _ in 0..10 {
        next = tick(&next, DT, &tuning, &mut rng);
    }
    assert!(next.npcs[0].ship.dying);
    assert_eq!(next.player.balance, 0);
}

#[test]
fn dead_npcs_are_despawned() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    npc_at(&mut s, &tuning, 100.0, 100.0);
    s.npcs[0].ship.dead = true;
    let next = tick(&s, DT, &tuning, &mut seeded_rng());
    assert!(next.npcs.is_empty());
}

#[test]
fn roamers_respawn_up_to_count() {
    let mut tuning = quiet_tuning();
    tuning.npc.count = 1;
    let s = make_state(&tuning);
    let next = tick(&s, DT, &tuning, &mut seeded_rng());
    assert_eq!(next.npcs.len(), 1);
    assert!(next.npcs[0].allegiance.is_none());
    assert_ne!(next.npcs[0].ship.id(), PLAYER_ID);
}

#[test]
fn damaged_npc_shows_health_bar() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    let id = npc_at(&mut s, &tuning, 100.0, 100.0);
    s.npcs[0].ship.health = 5.0;
    let next = tick(&s, DT, &tuning, &mut seeded_rng());
    assert!(next.health_bars.is_attached(id));
    assert!(!next.health_bars.is_attached(PLAYER_ID));
}

#[test]
fn level_up_happens_during_tick() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    s.player.xp = 45;
    let next = tick(&s, DT, &tuning, &mut seeded_rng());
    assert_eq!(next.player.current_level(), 2);
    assert_eq!(next.player.xp, 0);
    // One level per tick, however much XP there was.
    let next = tick(&next, DT, &tuning, &mut seeded_rng());
    assert_eq!(next.player.current_level(), 2);
}

// ── Colleges and end states ──────────────────────────────────────────────────

fn college(id: u32, bounds: Rect) -> College {
    College {
        id: CollegeId(id),
        name: format!("College {id}"),
        bounds,
        reward: Reward { gold: 100, xp: 20 },
        captured: false,
    }
}

#[test]
fn docking_at_last_unguarded_college_wins() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    s.colleges.push(college(0, Rect::new(480.0, 480.0, 60.0, 60.0)));
    let next = tick(&s, DT, &tuning, &mut seeded_rng());
    assert!(next.colleges[0].captured);
    assert_eq!(next.player.captured, vec![CollegeId(0)]);
    assert_eq!(next.player.balance, 100);
    assert_eq!(next.status, GameStatus::Won);
}

#[test]
fn guarded_college_cannot_be_captured() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    s.colleges.push(college(0, Rect::new(480.0, 480.0, 60.0, 60.0)));
    npc_at(&mut s, &tuning, 100.0, 100.0);
    s.npcs[0].allegiance = Some(CollegeId(0));
    let next = tick(&s, DT, &tuning, &mut seeded_rng());
    assert!(!next.colleges[0].captured);
    assert_eq!(next.status, GameStatus::Sailing);
}

#[test]
fn capturing_one_of_two_keeps_sailing() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    s.colleges.push(college(0, Rect::new(480.0, 480.0, 60.0, 60.0)));
    s.colleges.push(college(1, Rect::new(900.0, 900.0, 60.0, 60.0)));
    let next = tick(&s, DT, &tuning, &mut seeded_rng());
    assert!(next.colleges[0].captured);
    assert!(!next.colleges[1].captured);
    assert_eq!(next.status, GameStatus::Sailing);
}

#[test]
fn sinking_player_loses_after_dying_time() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    s.player.ship.take_damage(1000.0);
    s.player.ship.entity.speed = 50.0;
    let start_y = s.player.ship.entity.y;

    let mut rng = seeded_rng();
    let s = tick(&s, 1.0, &tuning, &mut rng);
    assert_eq!(s.status, GameStatus::Sailing);
    assert_eq!(s.player.ship.entity.y, start_y); // no longer sails
    let s = tick(&s, 1.0, &tuning, &mut rng);
    assert!(s.player.ship.dead);
    let s = tick(&s, 1.0, &tuning, &mut rng);
    assert_eq!(s.status, GameStatus::Lost);
}

#[test]
fn finished_game_only_counts_frames() {
    let tuning = quiet_tuning();
    let mut s = make_state(&tuning);
    s.status = GameStatus::Won;
    s.player.ship.entity.accelerating = true;
    let next = tick(&s, 1.0, &tuning, &mut seeded_rng());
    assert_eq!(next.frame, 1);
    assert_eq!(next.player, s.player);
}
