pub mod compute;
pub mod config;
pub mod crew;
pub mod display;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod map;
pub mod minigame;
