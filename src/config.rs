use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

pub const DB_FILE_NAME: &str = "memo_board.db";

#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    pub db_path: Option<PathBuf>,
    pub upload: UploadLimits,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path().ok(),
            upload: UploadLimits::default(),
        }
    }
}

impl BoardConfig {
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            upload: UploadLimits::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub background_max_dimension: u32,
    pub cover_max_dimension: u32,
    pub max_input_bytes: usize,
    pub jpeg_quality: u8,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            background_max_dimension: 1920,
            cover_max_dimension: 800,
            max_input_bytes: 20 * 1024 * 1024,
            jpeg_quality: 90,
        }
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj =
        ProjectDirs::from("com", "MemoBoard", "memo_board").context("Cannot determine project dirs")?;
    Ok(proj.data_dir().join(DB_FILE_NAME))
}
