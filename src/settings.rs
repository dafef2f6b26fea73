//! Process-wide settings.
//!
//! A small TOML file stands in for the desktop-wide settings store; the
//! only key the display core consumes is the orientation lock. Handles
//! are cheap clones of one shared object, and runtime changes notify
//! subscribers the same way a settings daemon would.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::Receiver;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::events::EventBus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEvent {
    OrientationLockChanged(bool),
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    orientation_lock: bool,
}

struct Inner {
    orientation_lock: AtomicBool,
    bus: EventBus<SettingsEvent>,
}

#[derive(Clone)]
pub struct Settings {
    inner: Arc<Inner>,
}

impl Settings {
    /// Load settings from `path`, or from the per-user configuration
    /// directory when no path is given. A missing file yields defaults;
    /// an unreadable or malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) => path,
                None => {
                    warn!("no configuration directory available, using default settings");
                    return Ok(Self::from_file(SettingsFile::default()));
                }
            },
        };

        if !path.exists() {
            debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::from_file(SettingsFile::default()));
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| Error::SettingsRead {
            path: path.clone(),
            source,
        })?;
        let file = toml::from_str(&raw).map_err(|source| Error::SettingsParse { path, source })?;

        Ok(Self::from_file(file))
    }

    fn from_file(file: SettingsFile) -> Self {
        Self {
            inner: Arc::new(Inner {
                orientation_lock: AtomicBool::new(file.orientation_lock),
                bus: EventBus::new(),
            }),
        }
    }

    pub fn orientation_lock(&self) -> bool {
        self.inner.orientation_lock.load(Ordering::SeqCst)
    }

    /// Flip the orientation lock at runtime, notifying subscribers when
    /// the value actually changes.
    pub fn set_orientation_lock(&self, locked: bool) {
        let previous = self.inner.orientation_lock.swap(locked, Ordering::SeqCst);
        if previous != locked {
            self.inner
                .bus
                .emit(SettingsEvent::OrientationLockChanged(locked));
        }
    }

    pub fn subscribe(&self) -> Receiver<SettingsEvent> {
        self.inner.bus.subscribe()
    }
}

fn default_path() -> Option<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "flashback-display")?;
    Some(dirs.config_dir().join("config.toml"))
}
