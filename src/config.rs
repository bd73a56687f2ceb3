//! Settings file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::chess::PieceColor;
use crate::domain::transform::Orientation;

pub const DEFAULT_SETTINGS_FILE: &str = "chess-board.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    #[default]
    White,
    Black,
}

impl From<PlayerColor> for PieceColor {
    fn from(color: PlayerColor) -> Self {
        match color {
            PlayerColor::White => PieceColor::White,
            PlayerColor::Black => PieceColor::Black,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Pointer,
    Touch,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub player_color: PlayerColor,
    /// Search time per computer move
    pub reply_time_ms: u64,
    /// Pause between the human move and the computer reply
    pub reply_delay_ms: u64,
    pub use_opening_book: bool,
    /// UCI engine binary; the built-in mover is used when unset
    pub engine_path: Option<PathBuf>,
    pub input_mode: InputMode,
    /// Directory holding the piece images
    pub assets_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_color: PlayerColor::White,
            reply_time_ms: 1000,
            reply_delay_ms: 250,
            use_opening_book: true,
            engine_path: None,
            input_mode: InputMode::Pointer,
            assets_dir: "assets".to_string(),
        }
    }
}

impl Settings {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Load settings from `path`. A missing file gives the defaults; an
    /// unreadable or malformed one is logged and also gives the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("no settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(settings) => {
                info!("loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Settings path from the first command-line argument
    pub fn path_from_args(mut args: impl Iterator<Item = String>) -> PathBuf {
        args.nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_color(self.player_color.into())
    }

    pub fn reply_time(&self) -> Duration {
        Duration::from_millis(self.reply_time_ms)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn using_touch(&self) -> bool {
        self.input_mode == InputMode::Touch
    }
}
