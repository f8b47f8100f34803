//! Crew members the player can hire.  Each one replaces the ship's normal
//! broadside with its own firing behaviour and keeps its own cooldown.

use std::fmt;

use crate::entities::{LivingEntity, ProjectileKind, Shot, Volley};

/// Speed multiplier applied by the boost crew.
pub const BOOST_FACTOR: f32 = 1.5;

const DOUBLE_SHOT_SPREAD: f32 = 0.12;
const TRIPLE_SHOT_SPREAD: f32 = 0.2;
const POWER_SHOT_FACTOR: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrewKind {
    DoubleShot,
    FireShot,
    Boost,
    PowerShot,
    TripleShot,
}

impl CrewKind {
    pub const ALL: [CrewKind; 5] = [
        CrewKind::DoubleShot,
        CrewKind::FireShot,
        CrewKind::Boost,
        CrewKind::PowerShot,
        CrewKind::TripleShot,
    ];

    pub fn id(self) -> u32 {
        match self {
            CrewKind::DoubleShot => 1,
            CrewKind::FireShot => 2,
            CrewKind::Boost => 3,
            CrewKind::PowerShot => 4,
            CrewKind::TripleShot => 5,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            CrewKind::DoubleShot => "double_shot",
            CrewKind::FireShot => "fire_shot",
            CrewKind::Boost => "boost",
            CrewKind::PowerShot => "power_shot",
            CrewKind::TripleShot => "triple_shot",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CrewKind::DoubleShot => "Double Shot",
            CrewKind::FireShot => "Fire Shot",
            CrewKind::Boost => "Boost",
            CrewKind::PowerShot => "Power Shot",
            CrewKind::TripleShot => "Triple Shot",
        }
    }

    /// Seconds between uses.
    pub fn cooldown(self) -> f32 {
        match self {
            CrewKind::DoubleShot => 2.0,
            CrewKind::FireShot => 3.0,
            CrewKind::Boost => 5.0,
            CrewKind::PowerShot => 2.5,
            CrewKind::TripleShot => 3.0,
        }
    }

    /// Hiring price in gold.
    pub fn cost(self) -> u32 {
        match self {
            CrewKind::DoubleShot => 30,
            CrewKind::FireShot => 50,
            CrewKind::Boost => 40,
            CrewKind::PowerShot => 60,
            CrewKind::TripleShot => 80,
        }
    }
}

impl fmt::Display for CrewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CrewMember {
    pub kind: CrewKind,
    /// Seconds until this crew member can act again.
    pub cooldown: f32,
}

impl CrewMember {
    pub fn new(kind: CrewKind) -> Self {
        Self { kind, cooldown: 0.0 }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    pub fn decrement_cooldown(&mut self, delta: f32) {
        self.cooldown = (self.cooldown - delta).max(0.0);
    }

    /// Fire on behalf of `ship`.  Ignores the ship's own reload timer.
    pub fn fire(&mut self, ship: &LivingEntity, angle: f32) -> Volley {
        if !self.is_ready() {
            return Volley::Reloading;
        }
        let kind = ship.selected_projectile;
        let shot = |offset: f32, kind: ProjectileKind, damage_factor: f64| Shot {
            angle: angle + offset,
            kind,
            damage_factor,
        };
        let volley = match self.kind {
            CrewKind::DoubleShot => Volley::Shots(vec![
                shot(-DOUBLE_SHOT_SPREAD, kind, 1.0),
                shot(DOUBLE_SHOT_SPREAD, kind, 1.0),
            ]),
            CrewKind::FireShot => Volley::Shots(vec![shot(0.0, ProjectileKind::Incendiary, 1.0)]),
            CrewKind::Boost => Volley::Boost {
                speed: ship.entity.max_speed * BOOST_FACTOR,
            },
            CrewKind::PowerShot => Volley::Shots(vec![shot(0.0, kind, POWER_SHOT_FACTOR)]),
            CrewKind::TripleShot => Volley::Shots(vec![
                shot(-TRIPLE_SHOT_SPREAD, kind, 1.0),
                shot(0.0, kind, 1.0),
                shot(TRIPLE_SHOT_SPREAD, kind, 1.0),
            ]),
        };
        self.cooldown = self.kind.cooldown();
        volley
    }
}

/// Registry of every crew member that can be hired.  Fixed at construction.
#[derive(Clone, Debug)]
pub struct CrewBank {
    crew: Vec<CrewMember>,
}

impl Default for CrewBank {
    fn default() -> Self {
        Self::new()
    }
}

impl CrewBank {
    pub fn new() -> Self {
        Self {
            crew: CrewKind::ALL.iter().copied().map(CrewMember::new).collect(),
        }
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.crew.iter().map(|c| c.kind.key()).collect()
    }

    pub fn members(&self) -> &[CrewMember] {
        &self.crew
    }

    pub fn by_id(&self, id: u32) -> Option<&CrewMember> {
        self.crew.iter().find(|c| c.kind.id() == id)
    }

    /// Case-insensitive.
    pub fn by_key(&self, key: &str) -> Option<&CrewMember> {
        self.crew.iter().find(|c| c.kind.key().eq_ignore_ascii_case(key))
    }
}
