use crate::error::{Error, Result};
use crate::paths::AppPaths;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user choices: where the feed lives, which titles to drop, and
/// which notes to attach.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub origin_url: String,

    #[serde(default)]
    pub blocklist: Vec<String>,

    /// Keyed by lower-cased event title.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, String>,
}

/// Canonical form of a note key.
pub fn note_key(title: &str) -> String {
    title.to_lowercase()
}

impl Config {
    pub fn is_blocked(&self, title: &str) -> bool {
        self.blocklist.iter().any(|b| b == title)
    }

    /// Flips blocklist membership of `title`. Returns whether it is now blocked.
    pub fn toggle_blocked(&mut self, title: &str) -> bool {
        if self.is_blocked(title) {
            self.blocklist.retain(|b| b != title);
            false
        } else {
            self.blocklist.push(title.to_string());
            true
        }
    }

    pub fn note(&self, title: &str) -> Option<&str> {
        self.notes.get(&note_key(title)).map(String::as_str)
    }

    /// Sets the note for `title`, stored as typed. Empty text removes the entry.
    pub fn set_note(&mut self, title: &str, text: &str) {
        if text.is_empty() {
            self.notes.remove(&note_key(title));
        } else {
            self.notes.insert(note_key(title), text.to_string());
        }
    }

    /// Drops duplicate blocklist entries and empty notes, and folds note keys
    /// to lower case.
    /// Files written by hand or by older versions may carry any of these.
    fn normalize(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.blocklist.len());
        self.blocklist.retain(|b| {
            if seen.contains(b) {
                false
            } else {
                seen.push(b.clone());
                true
            }
        });

        let mut notes = BTreeMap::new();
        for (title, note) in std::mem::take(&mut self.notes) {
            if note.is_empty() {
                continue;
            }
            notes.entry(note_key(&title)).or_insert(note);
        }
        self.notes = notes;
        self
    }
}

/// Loads and saves [`Config`] as a TOML document at a fixed location.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config directory (or `UNICAL_CONFIG_DIR`).
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(AppPaths::get_config_file_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty configuration, not an error.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!("No config at {:?}, starting empty", self.path);
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", self.path.display(), e)))?;
        Ok(config.normalize())
    }

    /// Like [`load`](Self::load) but never fails; the error is returned
    /// alongside the empty fallback so callers can report it.
    pub fn load_or_default(&self) -> (Config, Option<Error>) {
        match self.load() {
            Ok(cfg) => (cfg, None),
            Err(e) => {
                warn!("Falling back to empty configuration: {}", e);
                (Config::default(), Some(e))
            }
        }
    }

    /// Replaces the whole file.
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
        atomic_write(&self.path, toml_str)
    }
}

/// Atomic write: Write to .tmp file then rename
fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
    let path = path.as_ref();
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents).map_err(|e| Error::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_blocklist() {
        let mut cfg = Config {
            blocklist: vec!["Lab".to_string()],
            ..Default::default()
        };
        let original = cfg.blocklist.clone();

        assert!(cfg.toggle_blocked("Seminar"));
        assert_eq!(cfg.blocklist, vec!["Lab", "Seminar"]);
        assert!(!cfg.toggle_blocked("Seminar"));
        assert_eq!(cfg.blocklist, original);
    }

    #[test]
    fn test_toggle_never_duplicates() {
        let mut cfg = Config::default();
        for _ in 0..5 {
            cfg.toggle_blocked("Seminar");
            assert!(cfg.blocklist.iter().filter(|b| *b == "Seminar").count() <= 1);
        }
        // odd number of toggles leaves it blocked exactly once
        assert_eq!(cfg.blocklist, vec!["Seminar"]);
    }

    #[test]
    fn test_block_match_is_case_sensitive() {
        let mut cfg = Config::default();
        cfg.toggle_blocked("Seminar");
        assert!(cfg.is_blocked("Seminar"));
        assert!(!cfg.is_blocked("seminar"));
    }

    #[test]
    fn test_empty_note_removes_entry() {
        let mut cfg = Config::default();
        cfg.set_note("Seminar", "Bring laptop");
        cfg.set_note("Lab", "Goggles");
        assert_eq!(cfg.notes.len(), 2);

        cfg.set_note("Seminar", "");
        assert_eq!(cfg.notes.len(), 1);
        assert_eq!(cfg.note("Seminar"), None);
    }

    #[test]
    fn test_note_keys_are_lowercased() {
        let mut cfg = Config::default();
        cfg.set_note("Math 101", "Chapter 3");
        assert_eq!(cfg.notes.get("math 101").map(String::as_str), Some("Chapter 3"));
        assert_eq!(cfg.note("MATH 101"), Some("Chapter 3"));
    }

    #[test]
    fn test_note_stored_as_typed() {
        let mut cfg = Config::default();
        cfg.set_note("Seminar", "  Chapter 3  ");
        assert_eq!(cfg.note("Seminar"), Some("  Chapter 3  "));

        // only empty text removes
        cfg.set_note("Seminar", " ");
        assert_eq!(cfg.note("Seminar"), Some(" "));
        cfg.set_note("Seminar", "");
        assert!(cfg.notes.is_empty());
    }

    #[test]
    fn test_normalize_dedups_and_folds_keys() {
        let cfg = Config {
            origin_url: "https://example.com/a.ics".to_string(),
            blocklist: vec!["A".into(), "B".into(), "A".into()],
            notes: BTreeMap::from([
                ("Seminar".to_string(), "x".to_string()),
                ("Empty".to_string(), String::new()),
            ]),
        }
        .normalize();

        assert_eq!(cfg.blocklist, vec!["A", "B"]);
        assert_eq!(cfg.notes.len(), 1);
        assert_eq!(cfg.note("seminar"), Some("x"));
    }

    #[test]
    fn test_parse_without_notes_table() {
        let cfg: Config = toml::from_str(
            r#"
origin_url = "https://example.com/feed.ics"
blocklist = ["Sport"]
"#,
        )
        .unwrap();
        assert!(cfg.notes.is_empty());
        assert_eq!(cfg.blocklist, vec!["Sport"]);
    }
}
