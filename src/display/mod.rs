//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state.  No game logic is performed; this module only translates
//! state into terminal commands.

pub mod minigame;

use std::f32::consts::{FRAC_PI_8, TAU};
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use crate::entities::{Camera, GameStatus, LivingEntity, SailState, Sprite};
use crate::geometry::Rect;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_SEA: Color = Color::Blue;
const C_ISLAND: Color = Color::DarkYellow;
const C_COLLEGE: Color = Color::Cyan;
const C_COLLEGE_CAPTURED: Color = Color::Green;
const C_HUD_GOLD: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_LEVEL: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Red;
const C_BOSS: Color = Color::Magenta;
const C_SINKING: Color = Color::DarkGrey;
const C_FIRE: Color = Color::DarkRed;
const C_PROJECTILE: Color = Color::Grey;
const C_MESSAGE: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// World units covered by one terminal cell at zoom 1.  Cells are about
/// twice as tall as they are wide.
const CELL_WIDTH: f32 = 8.0;
const CELL_HEIGHT: f32 = 16.0;

/// Screen rectangle the sea is drawn into (inside the border).
#[derive(Clone, Copy, Debug)]
struct Viewport {
    left: u16,
    top: u16,
    right: u16,
    bottom: u16,
}

impl Viewport {
    fn new(width: u16, height: u16) -> Self {
        Self {
            left: 1,
            top: 2,
            right: width.saturating_sub(2),
            bottom: height.saturating_sub(3),
        }
    }

    fn centre(&self) -> (f32, f32) {
        (
            (self.left + self.right) as f32 / 2.0,
            (self.top + self.bottom) as f32 / 2.0,
        )
    }

    /// Screen cell for a world point, if it is visible.
    fn project(&self, camera: &Camera, x: f32, y: f32) -> Option<(u16, u16)> {
        let (cx, cy) = self.centre();
        let col = (cx + (x - camera.x) / (CELL_WIDTH * camera.zoom)).floor();
        let row = (cy + (y - camera.y) / (CELL_HEIGHT * camera.zoom)).floor();
        let visible = col >= self.left as f32
            && col <= self.right as f32
            && row >= self.top as f32
            && row <= self.bottom as f32;
        visible.then_some((col as u16, row as u16))
    }

    /// World-space rectangle covered by one screen cell.
    fn cell_bounds(&self, camera: &Camera, col: u16, row: u16) -> Rect {
        let (cx, cy) = self.centre();
        let w = CELL_WIDTH * camera.zoom;
        let h = CELL_HEIGHT * camera.zoom;
        Rect::new(
            camera.x + (col as f32 - cx) * w,
            camera.y + (row as f32 - cy) * h,
            w,
            h,
        )
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame of the sail screen.
pub fn render<W: Write>(
    out: &mut W,
    state: &SailState,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let view = Viewport::new(width, height);

    draw_border(out, width, height)?;
    draw_terrain(out, state, &view)?;
    draw_colleges(out, state, &view)?;
    for projectile in state.projectiles.iter().filter(|p| p.active) {
        let (x, y) = projectile.bounds().center();
        if let Some((col, row)) = view.project(&state.camera, x, y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_PROJECTILE))?;
            out.queue(Print("•"))?;
        }
    }
    for npc in &state.npcs {
        draw_ship(out, state, &view, &npc.ship)?;
    }
    draw_ship(out, state, &view, &state.player.ship)?;

    draw_hud(out, state, width)?;
    draw_messages(out, state, height)?;
    draw_controls_hint(out, height)?;

    match state.status {
        GameStatus::Sailing => {}
        GameStatus::Won => draw_end_banner(out, width, height, true)?,
        GameStatus::Lost => draw_end_banner(out, width, height, false)?,
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── Sea, islands and colleges ────────────────────────────────────────────────

fn draw_terrain<W: Write>(out: &mut W, state: &SailState, view: &Viewport) -> std::io::Result<()> {
    for row in view.top..=view.bottom {
        for col in view.left..=view.right {
            let cell = view.cell_bounds(&state.camera, col, row);
            let land = state.map.islands.iter().any(|island| island.overlaps(&cell));
            let off_map = cell.x + cell.width < 0.0
                || cell.y + cell.height < 0.0
                || cell.x > state.map.width
                || cell.y > state.map.height;
            let (glyph, color) = if land {
                ("▓", C_ISLAND)
            } else if off_map {
                (" ", C_SEA)
            } else if (col + row) % 7 == 0 {
                ("~", C_SEA)
            } else {
                continue;
            };
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(glyph))?;
        }
    }
    Ok(())
}

fn draw_colleges<W: Write>(out: &mut W, state: &SailState, view: &Viewport) -> std::io::Result<()> {
    for college in &state.colleges {
        let (x, y) = college.bounds.center();
        let Some((col, row)) = view.project(&state.camera, x, y) else {
            continue;
        };
        let color = if college.captured {
            C_COLLEGE_CAPTURED
        } else {
            C_COLLEGE
        };
        out.queue(style::SetForegroundColor(color))?;
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("⌂"))?;
        let label_col = col.saturating_sub(college.name.chars().count() as u16 / 2);
        if row > view.top {
            out.queue(cursor::MoveTo(label_col.max(view.left), row - 1))?;
            out.queue(Print(&college.name))?;
        }
    }
    Ok(())
}

// ── Ships ─────────────────────────────────────────────────────────────────────

/// Arrow pointing along a heading, in eight steps.
fn heading_glyph(angle: f32) -> &'static str {
    const ARROWS: [&str; 8] = ["↑", "↗", "→", "↘", "↓", "↙", "←", "↖"];
    let sector = ((angle + FRAC_PI_8).rem_euclid(TAU) / (TAU / 8.0)) as usize;
    ARROWS[sector % 8]
}

fn draw_ship<W: Write>(
    out: &mut W,
    state: &SailState,
    view: &Viewport,
    ship: &LivingEntity,
) -> std::io::Result<()> {
    if ship.dead {
        return Ok(());
    }
    let (x, y) = ship.center();
    let Some((col, row)) = view.project(&state.camera, x, y) else {
        return Ok(());
    };

    let (glyph, color) = if ship.dying {
        ("≈", C_SINKING)
    } else {
        let color = match ship.entity.sprite {
            Sprite::PlayerShip => C_PLAYER,
            Sprite::EnemyShip => C_ENEMY,
            Sprite::BossShip => C_BOSS,
        };
        (heading_glyph(ship.entity.angle), color)
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;

    if ship.on_fire && col < view.right {
        out.queue(style::SetForegroundColor(C_FIRE))?;
        out.queue(Print("*"))?;
    }

    if state.health_bars.is_attached(ship.id()) && row > view.top {
        draw_health_bar(out, ship, col.saturating_sub(2).max(view.left), row - 1)?;
    }
    Ok(())
}

fn draw_health_bar<W: Write>(
    out: &mut W,
    ship: &LivingEntity,
    col: u16,
    row: u16,
) -> std::io::Result<()> {
    const SEGMENTS: usize = 5;
    let ratio = if ship.max_health > 0.0 {
        (ship.health / ship.max_health).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * SEGMENTS as f64).ceil() as usize;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print("█".repeat(filled)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("░".repeat(SEGMENTS - filled)))?;
    Ok(())
}

// ── HUD (row 0) and messages ─────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &SailState, width: u16) -> std::io::Result<()> {
    let p = &state.player;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_GOLD))?;
    out.queue(Print(format!("Gold:{:>6}", p.balance)))?;

    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(format!(
        "  Lv {} ({}/{} xp)",
        p.current_level(),
        p.xp,
        p.xp_for_next_level()
    )))?;

    let crew = p
        .selected_crew
        .map(|k| k.name())
        .unwrap_or("Ship's guns");
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(format!(
        "  [{}] {:?}",
        crew, p.ship.selected_projectile
    )))?;

    let captured = state.colleges.iter().filter(|c| c.captured).count();
    let health_text = format!(
        "Colleges {}/{}  HP {:.0}/{:.0}",
        captured,
        state.colleges.len(),
        p.ship.health,
        p.ship.max_health
    );
    let rx = width.saturating_sub(health_text.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(&health_text))?;

    Ok(())
}

fn draw_messages<W: Write>(out: &mut W, state: &SailState, height: u16) -> std::io::Result<()> {
    let Some(latest) = state.messages.last() else {
        return Ok(());
    };
    out.queue(cursor::MoveTo(2, height.saturating_sub(2)))?;
    out.queue(style::SetForegroundColor(C_MESSAGE))?;
    out.queue(Print(format!(" {latest} ")))?;
    Ok(())
}

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "WASD sail  SPACE bow  Q/E broadside  TAB shot  1-5 crew  0 guns  M map  G tavern  ESC quit",
    ))?;
    Ok(())
}

// ── End overlay ──────────────────────────────────────────────────────────────

fn draw_end_banner<W: Write>(
    out: &mut W,
    width: u16,
    height: u16,
    won: bool,
) -> std::io::Result<()> {
    let (title, color) = if won {
        ("║     YOU  WON!    ║", Color::Yellow)
    } else {
        ("║    YOU  LOST!    ║", Color::Red)
    };
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", color),
        (title, color),
        ("╚══════════════════╝", color),
        ("R - Sail Again  ESC - Quit", Color::White),
    ];

    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn heading_glyphs_follow_compass() {
        assert_eq!(heading_glyph(0.0), "↑");
        assert_eq!(heading_glyph(FRAC_PI_2), "→");
        assert_eq!(heading_glyph(PI), "↓");
        assert_eq!(heading_glyph(TAU - 0.01), "↑");
    }

    #[test]
    fn camera_centre_projects_to_viewport_centre() {
        let view = Viewport::new(80, 24);
        let camera = Camera {
            x: 500.0,
            y: 300.0,
            zoom: 1.5,
        };
        let (col, row) = view.project(&camera, 500.0, 300.0).unwrap();
        let (cx, cy) = view.centre();
        assert_eq!(col, cx.floor() as u16);
        assert_eq!(row, cy.floor() as u16);
        assert!(view.project(&camera, -5000.0, 300.0).is_none());
    }
}
