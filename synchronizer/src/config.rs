//! Synchronizer configuration.

use std::fmt;
use std::time::Duration;

use codec::CodecLimits;
use world::{MobKind, ViewabilityResolver, MAX_LOCAL_MOBS, MAX_VIEWING_DISTANCE};

/// Tunables for the update pass.
///
/// Every field has the classic default. Validate with
/// [`validate`](Self::validate) before handing a loaded config to
/// [`Synchronizer::new`](crate::Synchronizer::new), which does so as well.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SyncConfig {
    /// Maximum per-axis tile offset at which a mob is viewable.
    pub viewing_distance: u16,
    /// Order admissions by priority when there are more candidates than slots.
    pub staggered_updating: bool,
    pub max_local_players: usize,
    pub max_local_npcs: usize,
    /// Additions per local view set per tick.
    pub new_mobs_per_tick: usize,
    pub tick_interval_ms: u64,
    /// Payload limit of one sync message.
    pub max_message_bytes: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            viewing_distance: MAX_VIEWING_DISTANCE,
            staggered_updating: false,
            max_local_players: MAX_LOCAL_MOBS,
            max_local_npcs: MAX_LOCAL_MOBS,
            new_mobs_per_tick: 15,
            tick_interval_ms: 600,
            max_message_bytes: 5000,
        }
    }
}

impl SyncConfig {
    /// Small caps so tests reach them quickly.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            staggered_updating: true,
            max_local_players: 32,
            max_local_npcs: 32,
            new_mobs_per_tick: 4,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewing_distance == 0 || self.viewing_distance > MAX_VIEWING_DISTANCE {
            return Err(ConfigError::ViewingDistance {
                distance: self.viewing_distance,
                max: MAX_VIEWING_DISTANCE,
            });
        }
        for (field, value) in [
            ("max_local_players", self.max_local_players),
            ("max_local_npcs", self.max_local_npcs),
            ("new_mobs_per_tick", self.new_mobs_per_tick),
        ] {
            if value == 0 || value > MAX_LOCAL_MOBS {
                return Err(ConfigError::Capacity {
                    field,
                    value,
                    max: MAX_LOCAL_MOBS,
                });
            }
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        let max_payload = usize::from(u16::MAX);
        if self.max_message_bytes == 0 || self.max_message_bytes > max_payload {
            return Err(ConfigError::MessageLimit {
                value: self.max_message_bytes,
                max: max_payload,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn resolver(&self) -> Result<ViewabilityResolver, ConfigError> {
        ViewabilityResolver::new(self.viewing_distance).map_err(|_| ConfigError::ViewingDistance {
            distance: self.viewing_distance,
            max: MAX_VIEWING_DISTANCE,
        })
    }

    /// Codec caps for local view sets of `kind`.
    #[must_use]
    pub const fn codec_limits(&self, kind: MobKind) -> CodecLimits {
        CodecLimits {
            max_local_mobs: match kind {
                MobKind::Player => self.max_local_players,
                MobKind::Npc => self.max_local_npcs,
            },
            max_additions_per_tick: self.new_mobs_per_tick,
        }
    }

    #[must_use]
    pub fn wire_limits(&self) -> wire::Limits {
        wire::Limits {
            max_payload_bytes: self.max_message_bytes,
            ..wire::Limits::default()
        }
    }
}

/// A configuration value out of range.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    ViewingDistance {
        distance: u16,
        max: u16,
    },
    Capacity {
        field: &'static str,
        value: usize,
        max: usize,
    },
    ZeroTickInterval,
    MessageLimit {
        value: usize,
        max: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewingDistance { distance, max } => {
                write!(f, "viewing distance {distance} outside 1..={max}")
            }
            Self::Capacity { field, value, max } => {
                write!(f, "{field} = {value} outside 1..={max}")
            }
            Self::ZeroTickInterval => write!(f, "tick interval must be positive"),
            Self::MessageLimit { value, max } => {
                write!(f, "max message bytes {value} outside 1..={max}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SyncConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.tick_interval(), Duration::from_millis(600));
        assert_eq!(config.codec_limits(MobKind::Npc), CodecLimits::default());
        assert_eq!(config.wire_limits().max_payload_bytes, 5000);
        assert_eq!(SyncConfig::for_testing().validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let config = SyncConfig {
            viewing_distance: 16,
            ..SyncConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ViewingDistance { distance: 16, .. })
        ));
        assert!(config.resolver().is_err());

        let config = SyncConfig {
            max_local_npcs: 256,
            ..SyncConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_local_npcs"));

        let config = SyncConfig {
            tick_interval_ms: 0,
            ..SyncConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickInterval));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_defaults() {
        let config: SyncConfig =
            serde_json::from_str(r#"{ "staggered_updating": true, "new_mobs_per_tick": 5 }"#)
                .unwrap();
        assert!(config.staggered_updating);
        assert_eq!(config.new_mobs_per_tick, 5);
        assert_eq!(config.viewing_distance, 15);
    }
}
