//! Quick-draw duel played in the tavern for gold.
//!
//! The player pays the stake, waits for the signal, then has to shoot before
//! the opponent does.  Shooting before the signal forfeits the stake.

use rand::Rng;
use tracing::info;

use crate::entities::Player;

/// Seconds the result stays on screen before returning to the menu.
pub const RESULT_DISPLAY_SECS: f32 = 3.0;

/// The signal comes between this many seconds after the stake is paid…
pub const COUNTDOWN_MIN_SECS: f32 = 1.0;
/// …and strictly before this many.
pub const COUNTDOWN_MAX_SECS: f32 = 4.0;

// ── Difficulty table ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MinigameDifficulty {
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl MinigameDifficulty {
    pub const ALL: [MinigameDifficulty; 4] = [
        MinigameDifficulty::Easy,
        MinigameDifficulty::Medium,
        MinigameDifficulty::Hard,
        MinigameDifficulty::VeryHard,
    ];

    /// Stake in gold.
    pub fn cost(self) -> u32 {
        match self {
            MinigameDifficulty::Easy => 1,
            MinigameDifficulty::Medium => 10,
            MinigameDifficulty::Hard => 20,
            MinigameDifficulty::VeryHard => 50,
        }
    }

    /// Gold paid out on a win.
    pub fn reward(self) -> u32 {
        match self {
            MinigameDifficulty::Easy => 2,
            MinigameDifficulty::Medium => 50,
            MinigameDifficulty::Hard => 200,
            MinigameDifficulty::VeryHard => 500,
        }
    }

    /// How long after the signal the opponent fires.
    pub fn reaction_time(self) -> f32 {
        match self {
            MinigameDifficulty::Easy => 0.5,
            MinigameDifficulty::Medium => 0.3,
            MinigameDifficulty::Hard => 0.26,
            MinigameDifficulty::VeryHard => 0.23,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MinigameDifficulty::Easy => "Easy",
            MinigameDifficulty::Medium => "Medium",
            MinigameDifficulty::Hard => "Hard",
            MinigameDifficulty::VeryHard => "Very Hard",
        }
    }
}

// ── State machine ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Menu,
    /// Waiting for the signal.
    Countdown,
    /// Signal given; first to shoot wins.
    ShootWindow,
    /// Result on screen.
    Resolved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won { reward: u32 },
    Lost,
    TooEarly,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Minigame {
    phase: Phase,
    difficulty: Option<MinigameDifficulty>,
    start_countdown: f32,
    enemy_timer: f32,
    result_timer: f32,
    last_outcome: Option<Outcome>,
    /// Set when the last selection was refused for lack of gold.
    cannot_afford: bool,
}

impl Default for Minigame {
    fn default() -> Self {
        Self::new()
    }
}

impl Minigame {
    pub fn new() -> Self {
        Self {
            phase: Phase::Menu,
            difficulty: None,
            start_countdown: 0.0,
            enemy_timer: 0.0,
            result_timer: 0.0,
            last_outcome: None,
            cannot_afford: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn difficulty(&self) -> Option<MinigameDifficulty> {
        self.difficulty
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    pub fn cannot_afford(&self) -> bool {
        self.cannot_afford
    }

    /// Seconds left until the signal (non-positive once it has been given).
    pub fn start_countdown(&self) -> f32 {
        self.start_countdown
    }

    /// Seconds left until the opponent shoots.
    pub fn enemy_timer(&self) -> f32 {
        self.enemy_timer
    }

    /// Pay the stake and start a duel with a random signal time.  The RNG is
    /// only drawn from once the duel can actually start.
    pub fn select(
        &mut self,
        difficulty: MinigameDifficulty,
        player: &mut Player,
        rng: &mut impl Rng,
    ) -> bool {
        if self.phase != Phase::Menu {
            return false;
        }
        if player.balance < difficulty.cost() {
            self.cannot_afford = true;
            return false;
        }
        let countdown = rng.gen_range(COUNTDOWN_MIN_SECS..COUNTDOWN_MAX_SECS);
        self.start_with(difficulty, player, countdown)
    }

    /// Pay the stake and start a duel whose signal comes after `countdown`
    /// seconds.  Does nothing outside the menu or when the player is short of
    /// gold.
    pub fn start_with(
        &mut self,
        difficulty: MinigameDifficulty,
        player: &mut Player,
        countdown: f32,
    ) -> bool {
        if self.phase != Phase::Menu {
            return false;
        }
        if !player.deduct_balance(difficulty.cost()) {
            self.cannot_afford = true;
            return false;
        }
        self.cannot_afford = false;
        self.difficulty = Some(difficulty);
        self.start_countdown = countdown;
        self.enemy_timer = countdown + difficulty.reaction_time();
        self.result_timer = 0.0;
        self.last_outcome = None;
        self.phase = Phase::Countdown;
        info!(difficulty = difficulty.label(), countdown, "duel started");
        true
    }

    pub fn tick(&mut self, delta: f32) {
        match self.phase {
            Phase::Menu => {}
            Phase::Countdown | Phase::ShootWindow => {
                self.start_countdown -= delta;
                self.enemy_timer -= delta;
                if self.start_countdown <= 0.0 {
                    self.phase = Phase::ShootWindow;
                    if self.enemy_timer <= 0.0 {
                        self.resolve(Outcome::Lost);
                    }
                }
            }
            Phase::Resolved => {
                self.result_timer += delta;
                if self.result_timer > RESULT_DISPLAY_SECS {
                    self.reset();
                }
            }
        }
    }

    /// The player pulls the trigger.
    pub fn shoot(&mut self, player: &mut Player) -> Option<Outcome> {
        match self.phase {
            Phase::Countdown => {
                info!("shot before the signal");
                self.reset();
                self.last_outcome = Some(Outcome::TooEarly);
                Some(Outcome::TooEarly)
            }
            Phase::ShootWindow => {
                let reward = self.difficulty.map(|d| d.reward()).unwrap_or(0);
                player.add_balance(reward);
                let outcome = Outcome::Won { reward };
                self.resolve(outcome);
                Some(outcome)
            }
            Phase::Menu | Phase::Resolved => None,
        }
    }

    /// Back to the menu, keeping the last outcome for display.
    pub fn reset(&mut self) {
        let last_outcome = self.last_outcome;
        *self = Self::new();
        self.last_outcome = last_outcome;
    }

    fn resolve(&mut self, outcome: Outcome) {
        info!(?outcome, difficulty = ?self.difficulty, "duel resolved");
        self.phase = Phase::Resolved;
        self.result_timer = 0.0;
        self.last_outcome = Some(outcome);
    }

    /// Line shown under the duelists.
    pub fn prompt(&self) -> &'static str {
        match (self.phase, self.last_outcome) {
            (Phase::Countdown, _) => "Wait for it...",
            (Phase::ShootWindow, _) => "SHOOT! (Z)",
            (Phase::Resolved, Some(Outcome::Won { .. })) => "You Won!",
            (Phase::Resolved, _) => "You Lost!",
            (Phase::Menu, Some(Outcome::TooEarly)) => "Too early! You forfeit the stake.",
            (Phase::Menu, _) if self.cannot_afford => "You can't afford that stake.",
            (Phase::Menu, _) => "Choose a stake.",
        }
    }
}
