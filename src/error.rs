use std::path::PathBuf;

use thiserror::Error;

use crate::crew::CrewKind;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no crew member called `{0}`")]
    UnknownCrew(String),

    #[error("not enough gold: costs {cost}, balance is {balance}")]
    InsufficientFunds { cost: u32, balance: u32 },

    #[error("{0} is already part of the crew")]
    CrewAlreadyHired(CrewKind),
}
