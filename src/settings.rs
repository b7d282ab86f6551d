use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// Knobs for the recording flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSettings {
    /// Arm the accidental-stop lock as soon as a session starts.
    pub lock_on_start: bool,
    /// Write running progress back to the store every this many ticks.
    pub persist_every_ticks: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            lock_on_start: true,
            persist_every_ticks: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    recording: RecordingSettings,
}

/// JSON-file-backed user settings. A missing or unreadable file falls back
/// to defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn recording(&self) -> RecordingSettings {
        self.data.read().unwrap().recording.clone()
    }

    pub fn update_recording(&self, settings: RecordingSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            guard.recording = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
