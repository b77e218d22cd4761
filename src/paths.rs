// File: src/paths.rs
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment override for the configuration directory.
pub const CONFIG_DIR_ENV: &str = "UNICAL_CONFIG_DIR";

/// Where the batch run writes its result, relative to the working directory.
pub const OUTPUT_DIR: &str = "ical";
pub const OUTPUT_FILE: &str = "filtered_calendar.ics";

pub struct AppPaths;

impl AppPaths {
    fn get_proj_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "unical", "unical")
    }

    /// Helper to ensure a directory exists before returning it.
    fn ensure_exists(path: PathBuf) -> Result<PathBuf> {
        if !path.exists() {
            fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        }
        Ok(path)
    }

    fn resolve_base(subdir: &str) -> Option<PathBuf> {
        if let Ok(dir) = env::var(CONFIG_DIR_ENV)
            && !dir.is_empty()
        {
            let root = PathBuf::from(dir);
            return Some(if subdir == "config" {
                root
            } else {
                root.join(subdir)
            });
        }

        let proj = Self::get_proj_dirs()?;

        let dir = match subdir {
            "config" => proj.config_dir(),
            "data" => proj.data_dir(),
            _ => return None,
        };

        Some(dir.to_path_buf())
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let path = Self::resolve_base("config")
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        Self::ensure_exists(path)
    }

    pub fn get_data_dir() -> Result<PathBuf> {
        let path = Self::resolve_base("data")
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))?;
        Self::ensure_exists(path)
    }

    pub fn get_config_file_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_log_dir() -> Result<PathBuf> {
        Self::ensure_exists(Self::get_data_dir()?.join("logs"))
    }

    /// The fixed output path of the batch run, under `base`.
    pub fn output_file(base: &Path) -> PathBuf {
        base.join(OUTPUT_DIR).join(OUTPUT_FILE)
    }
}
