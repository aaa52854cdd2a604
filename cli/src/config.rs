use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

const DATA_FILE_NAME: &str = "food_diary_data.json";

pub struct Config {
    pub data_file: PathBuf,
}

impl Config {
    /// Resolve the backing file. An explicit path (from `--data-file` or
    /// `FOOD_DIARY_DATA`) wins; otherwise the platform data directory is
    /// used and created if needed.
    pub fn load(data_file: Option<PathBuf>) -> Result<Self> {
        if let Some(data_file) = data_file {
            return Ok(Config { data_file });
        }

        let proj_dirs = ProjectDirs::from("", "", "food-diary")
            .context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config {
            data_file: data_dir.join(DATA_FILE_NAME),
        })
    }
}
