//! Tavern duel screen.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use crate::entities::Player;
use crate::minigame::{Minigame, MinigameDifficulty, Outcome, Phase};

fn difficulty_color(difficulty: MinigameDifficulty) -> Color {
    match difficulty {
        MinigameDifficulty::Easy => Color::Green,
        MinigameDifficulty::Medium => Color::Yellow,
        MinigameDifficulty::Hard => Color::Red,
        MinigameDifficulty::VeryHard => Color::DarkGrey,
    }
}

fn centred<W: Write>(out: &mut W, width: u16, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    let col = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

pub fn render<W: Write>(
    out: &mut W,
    game: &Minigame,
    player: &Player,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let cy = height / 2;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(format!("Gold: {}", player.balance)))?;

    if game.phase() == Phase::Menu {
        centred(
            out,
            width,
            cy.saturating_sub(7),
            "How much will you stake? Higher stakes, faster opponents, bigger rewards!",
            Color::Grey,
        )?;
        centred(
            out,
            width,
            cy.saturating_sub(6),
            "Wait for the signal, then press Z to shoot before your opponent does.",
            Color::DarkGrey,
        )?;
        for (i, difficulty) in MinigameDifficulty::ALL.iter().enumerate() {
            let line = format!(
                "[{}] {:<10} stake {:>3} gold  win {:>3} gold",
                i + 1,
                difficulty.label(),
                difficulty.cost(),
                difficulty.reward()
            );
            centred(
                out,
                width,
                cy.saturating_sub(3) + i as u16,
                &line,
                difficulty_color(*difficulty),
            )?;
        }
        centred(out, width, cy + 3, "ESC - Back to sea", Color::Red)?;
    } else {
        let enemy_color = game.difficulty().map(difficulty_color).unwrap_or(Color::White);
        let enemy = match (game.phase(), game.last_outcome()) {
            (Phase::Resolved, Some(Outcome::Lost)) => "o-==",
            _ => "o  |",
        };
        let hero = match (game.phase(), game.last_outcome()) {
            (Phase::Resolved, Some(Outcome::Won { .. })) => "==-o",
            _ => "|  o",
        };
        let third = width / 3;
        out.queue(cursor::MoveTo(third.saturating_sub(2), cy.saturating_sub(2)))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(hero))?;
        out.queue(cursor::MoveTo((third * 2).saturating_sub(2), cy.saturating_sub(2)))?;
        out.queue(style::SetForegroundColor(enemy_color))?;
        out.queue(Print(enemy))?;
    }

    let prompt_color = match game.phase() {
        Phase::ShootWindow => Color::Red,
        _ => Color::White,
    };
    centred(out, width, cy + 1, game.prompt(), prompt_color)?;

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}
