//! Difficulty presets and the timing constants every component is built from.

use std::borrow::Cow;

use crate::error::GameError;

/// One difficulty preset.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyLevel {
    /// Label written to the difficulty stat display.
    pub name: Cow<'static, str>,
    /// Milliseconds between mole group refreshes.
    pub speed_ms: u64,
    /// Seconds per round.
    pub total_time: u32,
    /// Moles visible at once.
    pub moles_per_round: usize,
}

impl DifficultyLevel {
    pub const fn new(
        name: &'static str,
        speed_ms: u64,
        total_time: u32,
        moles_per_round: usize,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            speed_ms,
            total_time,
            moles_per_round,
        }
    }
}

/// Easy, Medium, Hard, Very Hard.
pub const DIFFICULTIES: [DifficultyLevel; 4] = [
    DifficultyLevel::new("EASY", 5000, 60, 7),
    DifficultyLevel::new("MEDIUM", 3000, 50, 5),
    DifficultyLevel::new("HARD", 2000, 40, 4),
    DifficultyLevel::new("VERY HARD", 1000, 30, 3),
];

/// Delay before the first mole group and the first countdown tick.
pub const START_DELAY_MS: u64 = 2200;
/// Pause between game over and the next difficulty selection.
pub const RESTART_DELAY_MS: u64 = 2000;
pub const TICK_MS: u64 = 1000;
pub const HAMMER_STRIKE_MS: u64 = 200;
/// Mole indices that double as the difficulty buttons, in preset order.
pub const DIFFICULTY_SLOTS: [usize; 4] = [8, 9, 10, 11];

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub start_delay_ms: u64,
    pub restart_delay_ms: u64,
    pub tick_ms: u64,
    pub hammer_strike_ms: u64,
    /// Hammer position relative to the pointer, in pixels.
    pub hammer_offset: (i32, i32),
    pub difficulty_slots: [usize; 4],
    /// Overrides are merged over the built-in presets by position.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "preset_overrides::deserialize"))]
    pub difficulties: [DifficultyLevel; 4],
}

#[cfg(feature = "serde")]
mod preset_overrides {
    use std::borrow::Cow;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    use super::{DIFFICULTIES, DifficultyLevel};

    #[derive(Deserialize)]
    struct LevelOverride {
        name: Option<Cow<'static, str>>,
        speed_ms: Option<u64>,
        total_time: Option<u32>,
        moles_per_round: Option<usize>,
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[DifficultyLevel; 4], D::Error> {
        let overrides = Vec::<LevelOverride>::deserialize(deserializer)?;
        if overrides.len() > DIFFICULTIES.len() {
            return Err(D::Error::invalid_length(
                overrides.len(),
                &"at most 4 difficulty presets",
            ));
        }
        let mut levels = DIFFICULTIES;
        for (level, o) in levels.iter_mut().zip(overrides) {
            if let Some(name) = o.name {
                level.name = name;
            }
            level.speed_ms = o.speed_ms.unwrap_or(level.speed_ms);
            level.total_time = o.total_time.unwrap_or(level.total_time);
            level.moles_per_round = o.moles_per_round.unwrap_or(level.moles_per_round);
        }
        Ok(levels)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: START_DELAY_MS,
            restart_delay_ms: RESTART_DELAY_MS,
            tick_ms: TICK_MS,
            hammer_strike_ms: HAMMER_STRIKE_MS,
            hammer_offset: (1, -35),
            difficulty_slots: DIFFICULTY_SLOTS,
            difficulties: DIFFICULTIES,
        }
    }
}

impl GameConfig {
    /// Parse a JSON override; missing fields keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        serde_json::from_str(json).map_err(|e| GameError::MalformedConfig {
            reason: e.to_string(),
        })
    }

    /// Check every value against a board of `slot_count` holes.
    pub fn validate(&self, slot_count: usize) -> Result<(), GameError> {
        let timings = [
            ("start_delay_ms", self.start_delay_ms),
            ("restart_delay_ms", self.restart_delay_ms),
            ("tick_ms", self.tick_ms),
            ("hammer_strike_ms", self.hammer_strike_ms),
        ];
        if let Some((name, _)) = timings.iter().find(|(_, ms)| *ms == 0) {
            return Err(GameError::invalid(format!("{name} must be positive")));
        }
        for level in &self.difficulties {
            if level.speed_ms == 0 || level.total_time == 0 || level.moles_per_round == 0 {
                return Err(GameError::invalid(format!(
                    "difficulty {} needs positive speed, time and moles",
                    level.name
                )));
            }
            if level.moles_per_round > slot_count {
                return Err(GameError::TooFewSlots {
                    needed: level.moles_per_round,
                    found: slot_count,
                });
            }
        }
        for (i, &slot) in self.difficulty_slots.iter().enumerate() {
            if slot >= slot_count {
                return Err(GameError::TooFewSlots {
                    needed: slot + 1,
                    found: slot_count,
                });
            }
            if self.difficulty_slots[..i].contains(&slot) {
                return Err(GameError::invalid(format!("difficulty slot {slot} used twice")));
            }
        }
        Ok(())
    }

    /// Preset chosen by whacking `slot`, if it is one of the difficulty slots.
    pub fn difficulty_for_slot(&self, slot: usize) -> Option<&DifficultyLevel> {
        self.difficulty_slots
            .iter()
            .position(|&s| s == slot)
            .map(|k| &self.difficulties[k])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_positive_and_fit_the_board() {
        for level in &DIFFICULTIES {
            assert!(level.speed_ms > 0, "{} speed", level.name);
            assert!(level.total_time > 0, "{} time", level.name);
            assert!(level.moles_per_round > 0, "{} moles", level.name);
            assert!(level.moles_per_round <= 12, "{} moles", level.name);
        }
    }

    #[test]
    fn default_config_validates_on_standard_board() {
        assert!(GameConfig::default().validate(12).is_ok());
        assert!(GameConfig::default().validate(16).is_ok());
    }

    #[test]
    fn small_board_is_rejected() {
        let err = GameConfig::default().validate(6).unwrap_err();
        assert!(matches!(err, GameError::TooFewSlots { needed: 7, found: 6 }));
        // Enough for the moles but not for the difficulty buttons.
        let err = GameConfig::default().validate(10).unwrap_err();
        assert!(matches!(err, GameError::TooFewSlots { needed: 11, .. }));
    }

    #[test]
    fn duplicate_difficulty_slot_is_rejected() {
        let cfg = GameConfig {
            difficulty_slots: [0, 1, 1, 2],
            ..GameConfig::default()
        };
        assert!(matches!(cfg.validate(16), Err(GameError::InvalidConfig { .. })));
    }

    #[test]
    fn zero_speed_is_rejected() {
        let mut cfg = GameConfig::default();
        cfg.difficulties[1].speed_ms = 0;
        assert!(cfg.validate(16).is_err());
    }

    #[test]
    fn zero_delays_are_rejected() {
        let defaults = GameConfig::default();
        let zeroed = [
            GameConfig { start_delay_ms: 0, ..defaults.clone() },
            GameConfig { restart_delay_ms: 0, ..defaults.clone() },
            GameConfig { tick_ms: 0, ..defaults.clone() },
            GameConfig { hammer_strike_ms: 0, ..defaults },
        ];
        for cfg in &zeroed {
            assert!(
                matches!(cfg.validate(12), Err(GameError::InvalidConfig { .. })),
                "{cfg:?}"
            );
        }
    }

    #[test]
    fn difficulty_slot_lookup() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.difficulty_for_slot(10).map(|d| d.name.as_ref()), Some("HARD"));
        assert_eq!(cfg.difficulty_for_slot(8).map(|d| d.name.as_ref()), Some("EASY"));
        assert!(cfg.difficulty_for_slot(3).is_none());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_override_keeps_defaults() {
        let cfg = GameConfig::from_json(r#"{"start_delay_ms": 500}"#).unwrap();
        assert_eq!(cfg.start_delay_ms, 500);
        assert_eq!(cfg.difficulties, DIFFICULTIES);
        assert!(GameConfig::from_json("{nope").is_err());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_presets_merge_over_defaults() {
        let cfg = GameConfig::from_json(
            r#"{"difficulties":[{"name":"A"},{"speed_ms":2500},{},{"moles_per_round":2}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.difficulties[0].name, "A");
        assert_eq!(cfg.difficulties[0].speed_ms, 5000);
        assert_eq!(cfg.difficulties[1].speed_ms, 2500);
        assert_eq!(cfg.difficulties[1].name, "MEDIUM");
        assert_eq!(cfg.difficulties[2], DIFFICULTIES[2]);
        assert_eq!(cfg.difficulties[3].moles_per_round, 2);
        assert_eq!(cfg.difficulties[3].total_time, 30);
        assert!(cfg.validate(12).is_ok());

        // A short list leaves the remaining presets alone.
        let cfg = GameConfig::from_json(r#"{"difficulties":[{"total_time":10}]}"#).unwrap();
        assert_eq!(cfg.difficulties[0].total_time, 10);
        assert_eq!(cfg.difficulties[1..], DIFFICULTIES[1..]);

        let five = r#"{"difficulties":[{},{},{},{},{}]}"#;
        assert!(matches!(
            GameConfig::from_json(five),
            Err(GameError::MalformedConfig { .. })
        ));
    }
}
