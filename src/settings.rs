//! Viewer settings and preferences
//!
//! Persisted separately from the seen history in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{PARTICLE_COUNT, STAR_COUNT};
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Next preset for the quality button (wraps around)
    pub fn next(&self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Ambient dust particles for this preset
    pub fn particle_count(&self) -> usize {
        match self {
            QualityPreset::Low => PARTICLE_COUNT / 3,
            QualityPreset::Medium => PARTICLE_COUNT,
            QualityPreset::High => PARTICLE_COUNT * 2,
        }
    }

    /// Background stars for this preset
    pub fn star_count(&self) -> usize {
        match self {
            QualityPreset::Low => STAR_COUNT / 3,
            QualityPreset::Medium => STAR_COUNT,
            QualityPreset::High => STAR_COUNT * 5 / 3,
        }
    }
}

/// Viewer preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Particle density
    #[serde(default)]
    pub quality: QualityPreset,
    /// Explicit animation toggle; `None` follows the system reduced-motion preference
    #[serde(default)]
    pub animation_override: Option<bool>,
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "void_settings";

    /// Whether the disk should move, given the system preference
    pub fn animation_enabled(&self, prefers_reduced_motion: bool) -> bool {
        self.animation_override.unwrap_or(!prefers_reduced_motion)
    }

    /// Load settings from client storage
    pub fn load(kv: &dyn KeyValueStore) -> Self {
        match load_json(kv, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, kv: &dyn KeyValueStore) {
        save_json(kv, Self::STORAGE_KEY, self);
        log::info!("Settings saved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryKv;

    #[test]
    fn test_override_beats_system_preference() {
        let mut settings = Settings::default();
        assert!(settings.animation_enabled(false));
        assert!(!settings.animation_enabled(true));

        settings.animation_override = Some(true);
        assert!(settings.animation_enabled(true));
        settings.animation_override = Some(false);
        assert!(!settings.animation_enabled(false));
    }

    #[test]
    fn test_preset_cycle_and_density() {
        let start = QualityPreset::default();
        assert_eq!(start.next(), QualityPreset::High);
        assert_eq!(start.next().next(), QualityPreset::Low);
        assert_eq!(start.next().next().next(), start);
        assert!(QualityPreset::Low.particle_count() < QualityPreset::High.particle_count());
        assert_eq!(QualityPreset::Medium.star_count(), STAR_COUNT);
    }

    #[test]
    fn test_settings_persist() {
        let kv = MemoryKv::new();
        let settings = Settings {
            quality: QualityPreset::High,
            animation_override: Some(false),
        };
        settings.save(&kv);
        assert_eq!(Settings::load(&kv), settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let kv = MemoryKv::new();
        kv.set("void_settings", r#"{"animation_override":true}"#);
        let loaded = Settings::load(&kv);
        assert_eq!(loaded.quality, QualityPreset::Medium);
        assert_eq!(loaded.animation_override, Some(true));
    }
}
