use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use pirate_sail::compute::{
    cycle_projectile, hire_crew, init_state, key_down, key_up, player_fire, push_message,
    select_crew, tick, Broadside,
};
use pirate_sail::config::Tuning;
use pirate_sail::crew::{CrewBank, CrewKind};
use pirate_sail::display;
use pirate_sail::entities::{GameStatus, Key, SailState};
use pirate_sail::minigame::{Minigame, MinigameDifficulty, Phase};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest step fed to the simulation, so a stalled terminal does not
/// teleport ships through islands.
const MAX_DELTA: f32 = 0.1;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

#[derive(Parser, Debug)]
#[command(name = "pirate_sail", about = "Sail, fight and capture the colleges")]
struct Args {
    /// TOML tuning file; built-in values are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for map generation and spawns.
    #[arg(long)]
    seed: Option<u64>,

    /// Where log output goes while the terminal is in raw mode.
    #[arg(long, default_value = "pirate_sail.log")]
    log_file: PathBuf,
}

fn init_tracing(log_file: &std::path::Path) -> anyhow::Result<()> {
    let file = File::create(log_file)
        .with_context(|| format!("creating log file {}", log_file.display()))?;
    let writer = Mutex::new(file);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(writer)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
    Ok(())
}

// ── Held keys ─────────────────────────────────────────────────────────────────

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn held_any(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

/// Which steering keys are live this frame.
fn held_keys(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> HashSet<Key> {
    let bindings: [(Key, &[KeyCode]); 5] = [
        (Key::Accelerate, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')]),
        (Key::Brake, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')]),
        (Key::TurnLeft, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
        (Key::TurnRight, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
        (Key::Minimap, &[KeyCode::Char('m'), KeyCode::Char('M')]),
    ];
    bindings
        .iter()
        .filter(|(_, codes)| held_any(key_frame, codes, frame))
        .map(|(key, _)| *key)
        .collect()
}

/// Turn changes in the held set into key-down / key-up transitions.
fn apply_held(state: &SailState, before: &HashSet<Key>, now: &HashSet<Key>) -> SailState {
    let mut next = state.clone();
    for key in now.difference(before) {
        next = key_down(&next, *key);
    }
    for key in before.difference(now) {
        next = key_up(&next, *key);
    }
    next
}

// ── Screens ───────────────────────────────────────────────────────────────────

enum Screen {
    Sail,
    Tavern,
}

enum LoopExit {
    Quit,
    Restart,
}

fn digit(code: &KeyCode) -> Option<usize> {
    match code {
        KeyCode::Char(c) => c.to_digit(10).map(|d| d as usize),
        _ => None,
    }
}

/// Number keys pick a crew member: select when owned, otherwise try to hire.
fn crew_key(state: &SailState, bank: &CrewBank, n: usize) -> SailState {
    if n == 0 {
        return select_crew(state, None);
    }
    let Some(kind) = CrewKind::ALL.get(n - 1).copied() else {
        return state.clone();
    };
    if state.player.has_crew(kind) {
        return select_crew(state, Some(kind));
    }
    match hire_crew(state, bank, kind.key()) {
        Ok(next) => select_crew(&next, Some(kind)),
        Err(e) => {
            warn!(error = %e, "could not hire crew");
            let mut next = state.clone();
            push_message(&mut next, e.to_string());
            next
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame the set of fresh steering keys is diffed
/// against the previous frame and turned into key-down / key-up transitions,
/// so W + A can be held together.  One-shot actions (fire, crew, tavern) run
/// on the press event itself.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut SailState,
    tuning: &Tuning,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<LoopExit> {
    let bank = CrewBank::new();
    let mut tavern = Minigame::new();
    let mut screen = Screen::Sail;

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut held: HashSet<Key> = HashSet::new();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        let delta = frame_start.duration_since(last).as_secs_f32().min(MAX_DELTA);
        last = frame_start;
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code.clone(), frame);
                    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(LoopExit::Quit);
                    }
                    match screen {
                        Screen::Sail => match (state.status, code) {
                            (_, KeyCode::Esc) => return Ok(LoopExit::Quit),
                            (GameStatus::Won | GameStatus::Lost, KeyCode::Char('r' | 'R')) => {
                                return Ok(LoopExit::Restart);
                            }
                            (GameStatus::Sailing, KeyCode::Char(' ')) => {
                                *state = player_fire(state, Broadside::Bow, tuning);
                            }
                            (GameStatus::Sailing, KeyCode::Char('q' | 'Q')) => {
                                *state = player_fire(state, Broadside::Port, tuning);
                            }
                            (GameStatus::Sailing, KeyCode::Char('e' | 'E')) => {
                                *state = player_fire(state, Broadside::Starboard, tuning);
                            }
                            (GameStatus::Sailing, KeyCode::Tab) => {
                                *state = cycle_projectile(state);
                            }
                            (GameStatus::Sailing, KeyCode::Char('g' | 'G')) => {
                                // Let go of the helm before stepping ashore.
                                *state = apply_held(state, &held, &HashSet::new());
                                held.clear();
                                screen = Screen::Tavern;
                                info!("entered tavern");
                            }
                            (GameStatus::Sailing, code) => {
                                if let Some(n) = digit(&code) {
                                    *state = crew_key(state, &bank, n);
                                }
                            }
                            _ => {}
                        },
                        Screen::Tavern => match code {
                            KeyCode::Esc if tavern.phase() == Phase::Menu => {
                                screen = Screen::Sail;
                            }
                            KeyCode::Char('z' | 'Z') => {
                                tavern.shoot(&mut state.player);
                            }
                            code => {
                                let choice = digit(&code)
                                    .and_then(|n| n.checked_sub(1))
                                    .and_then(|i| MinigameDifficulty::ALL.get(i).copied());
                                if let Some(difficulty) = choice {
                                    tavern.select(difficulty, &mut state.player, rng);
                                }
                            }
                        },
                    }
                }
                // Repeat: refresh timestamp so key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code.clone(), frame);
                }
                // Release: remove key immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let (width, height) = terminal::size()?;
        match screen {
            Screen::Sail => {
                let now = if state.status == GameStatus::Sailing {
                    held_keys(&key_frame, frame)
                } else {
                    HashSet::new()
                };
                *state = apply_held(state, &held, &now);
                held = now;

                *state = tick(state, delta, tuning, rng);
                display::render(out, state, width, height)?;
            }
            Screen::Tavern => {
                tavern.tick(delta);
                display::minigame::render(out, &tavern, &state.player, width, height)?;
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_file)?;

    let tuning = Tuning::load(args.config.as_deref()).context("loading tuning")?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(seed = ?args.seed, "starting voyage");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &tuning, &mut rng, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        tracing::error!(error = %e, "game aborted");
    }
    result
}

fn run<W: Write>(
    out: &mut W,
    tuning: &Tuning,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<()> {
    loop {
        let mut state = init_state(tuning, rng);
        match game_loop(out, &mut state, tuning, rng, rx)? {
            LoopExit::Quit => {
                info!(
                    gold = state.player.balance,
                    level = state.player.current_level(),
                    status = ?state.status,
                    "voyage ended"
                );
                break;
            }
            LoopExit::Restart => {
                info!(status = ?state.status, "restarting voyage");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_does_not_count_as_minimap() {
        let mut key_frame = HashMap::new();
        key_frame.insert(KeyCode::Tab, 10);
        key_frame.insert(KeyCode::Char('w'), 10);
        let held = held_keys(&key_frame, 11);
        assert!(held.contains(&Key::Accelerate));
        assert!(!held.contains(&Key::Minimap));
    }

    #[test]
    fn keys_expire_after_hold_window() {
        let mut key_frame = HashMap::new();
        key_frame.insert(KeyCode::Char('a'), 1);
        assert!(held_keys(&key_frame, 1 + HOLD_WINDOW).contains(&Key::TurnLeft));
        assert!(held_keys(&key_frame, 2 + HOLD_WINDOW).is_empty());
    }

    #[test]
    fn zero_deselects_crew() {
        let mut rng = StdRng::seed_from_u64(42);
        let state = init_state(&Tuning::default(), &mut rng);
        let next = crew_key(&state, &CrewBank::new(), 0);
        assert_eq!(next.player.selected_crew, None);
    }
}
