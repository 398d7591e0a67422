//! User preference store

use crate::models::{Settings, SettingsPatch};

/// Holds the current settings and applies merge patches
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    current: Settings,
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self { current: settings }
    }

    pub fn current(&self) -> &Settings {
        &self.current
    }

    /// Shallow-merge `patch` into the current settings. Any currency label is
    /// accepted; returns whether a value actually changed.
    pub fn update(&mut self, patch: &SettingsPatch) -> bool {
        let before = self.current.clone();
        patch.apply_to(&mut self.current);
        before != self.current
    }
}
