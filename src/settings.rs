//! Game settings
//!
//! Read from a JSON file; anything missing takes its default. Command-line
//! flags are applied on top by the runner.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{D20_FACES, REGULATION_INNINGS};
use crate::error::{Error, Result};
use crate::sim::{InfieldAlignment, SendPolicy};

/// Headless game settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed; a fresh one is drawn when unset
    pub seed: Option<u64>,
    /// Innings before a result can stand
    pub regulation_innings: u32,
    /// Who sends runners on optional advances
    pub send_policy: SendPolicy,
    /// Starting infield alignment for both defenses
    pub infield: InfieldAlignment,
    /// Safety cap on plate appearances in one run
    pub max_plate_appearances: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            regulation_innings: REGULATION_INNINGS,
            send_policy: SendPolicy::default(),
            infield: InfieldAlignment::Normal,
            max_plate_appearances: 2000,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values no game can be played with
    pub fn validate(&self) -> Result<()> {
        if self.regulation_innings == 0 {
            return Err(Error::InvalidSettings("regulation_innings must be at least 1".into()));
        }
        if self.max_plate_appearances == 0 {
            return Err(Error::InvalidSettings("max_plate_appearances must be at least 1".into()));
        }
        if let SendPolicy::Chance { min_chance } = self.send_policy {
            if !(1..=D20_FACES).contains(&min_chance) {
                return Err(Error::InvalidSettings(format!(
                    "min_chance {min_chance} is outside 1..={D20_FACES}"
                )));
            }
        }
        Ok(())
    }

    /// Seed to play with, drawing one from the OS when unset
    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.regulation_innings, 9);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "seed": 7, "send_policy": { "chance": { "min_chance": 9 } } }"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.send_policy, SendPolicy::Chance { min_chance: 9 });
        assert_eq!(settings.infield, InfieldAlignment::Normal);
        assert_eq!(settings.seed_or_random(), 7);

        let settings: Settings = serde_json::from_str(r#"{ "send_policy": "always", "infield": "infield_in" }"#).unwrap();
        assert_eq!(settings.send_policy, SendPolicy::Always);
        assert_eq!(settings.infield, InfieldAlignment::InfieldIn);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let settings = Settings {
            regulation_innings: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));

        let settings = Settings {
            send_policy: SendPolicy::Chance { min_chance: 21 },
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
    }
}
