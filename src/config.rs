use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub words_per_minute: u16,
    pub countdown_secs: u8,
    pub max_secs: Option<u64>,
    pub builtin_script: String,
    pub min_wpm: u16,
    pub max_wpm: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            words_per_minute: 110,
            countdown_secs: 3,
            max_secs: None,
            builtin_script: "peppers".to_string(),
            min_wpm: 60,
            max_wpm: 200,
        }
    }
}

impl Config {
    /// Clamps a requested pace into the configured bounds.
    pub fn clamp_wpm(&self, wpm: u16) -> u16 {
        wpm.clamp(self.min_wpm, self.max_wpm)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "patter") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("patter_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
