//! Constant-valued forcing source.
//!
//! The reference runs drive the simulation with flat forcing: one value
//! per channel, repeated for every band, cell, and year. This module
//! implements that source behind the engine's `Forcing` seam, with the
//! per-channel constants overridable from the `[forcing]` section of the
//! controller configuration and the offered channel set restrictable
//! from the run configuration.

use std::collections::{BTreeMap, HashMap, HashSet};

use coupler_core::{Forcing, InputKind};
use tracing::{debug, warn};

/// Built-in constant for a channel when no override is configured.
fn default_value(kind: InputKind) -> f32 {
    match kind {
        InputKind::Co2 => 288.0,
        InputKind::LandUse => 0.001,
        _ => 0.0,
    }
}

/// Forcing source that answers every fill with a per-channel constant.
///
/// By default all channels from the input table are offered; a run
/// configuration can narrow that set so the controller answers 0 bands
/// for everything outside the run.
pub struct ConstantForcing {
    /// `None` offers every known channel.
    offered: Option<HashSet<InputKind>>,
    overrides: HashMap<InputKind, f32>,
}

impl ConstantForcing {
    pub fn new() -> Self {
        Self {
            offered: None,
            overrides: HashMap::new(),
        }
    }

    /// Applies `[forcing]` overrides keyed by channel name. Unknown
    /// names are warned about and skipped.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, f32>) {
        for (name, value) in overrides {
            match InputKind::from_name(name) {
                Some(kind) => {
                    debug!(channel = name.as_str(), value, "forcing override applied");
                    self.overrides.insert(kind, *value);
                }
                None => warn!(channel = name.as_str(), "unknown forcing channel name ignored"),
            }
        }
    }

    /// Restricts the offered channel set to the named channels. Unknown
    /// names are warned about and skipped; an empty result offers
    /// nothing, so every negotiation answers 0 bands.
    pub fn restrict(&mut self, names: &[String]) {
        let mut set = HashSet::new();
        for name in names {
            match InputKind::from_name(name) {
                Some(kind) => {
                    set.insert(kind);
                }
                None => warn!(channel = name.as_str(), "unknown run-config channel name ignored"),
            }
        }
        self.offered = Some(set);
    }

    /// The constant this source serves for `kind`.
    pub fn value_for(&self, kind: InputKind) -> f32 {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| default_value(kind))
    }
}

impl Default for ConstantForcing {
    fn default() -> Self {
        Self::new()
    }
}

impl Forcing for ConstantForcing {
    fn band_count(&self, kind: InputKind) -> Option<i32> {
        match &self.offered {
            Some(set) if !set.contains(&kind) => None,
            _ => Some(kind.band_count()),
        }
    }

    fn fill(&mut self, kind: InputKind, _year: i32, values: &mut [f32]) -> Result<(), String> {
        values.fill(self.value_for(kind));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offers_every_channel_by_default() {
        let forcing = ConstantForcing::new();

        for kind in InputKind::ALL {
            assert_eq!(forcing.band_count(kind), Some(kind.band_count()));
        }
    }

    #[test]
    fn test_restrict_narrows_the_offered_set() {
        let mut forcing = ConstantForcing::new();

        forcing.restrict(&[
            "co2".to_string(),
            "temperature".to_string(),
            "not_a_channel".to_string(),
        ]);

        assert_eq!(forcing.band_count(InputKind::Co2), Some(1));
        assert_eq!(forcing.band_count(InputKind::Temperature), Some(1));
        assert_eq!(forcing.band_count(InputKind::LandUse), None);
    }

    #[test]
    fn test_fill_uses_override_value() {
        let mut forcing = ConstantForcing::new();
        let mut overrides = BTreeMap::new();
        overrides.insert("co2".to_string(), 400.5);
        overrides.insert("bogus".to_string(), 1.0);
        forcing.apply_overrides(&overrides);

        let mut values = [0.0f32; 3];
        forcing
            .fill(InputKind::Co2, 2001, &mut values)
            .expect("fill must succeed");

        assert_eq!(values, [400.5, 400.5, 400.5]);
    }

    #[test]
    fn test_fill_defaults_match_reference_runs() {
        let mut forcing = ConstantForcing::new();
        let mut value = [0.0f32; 1];

        forcing.fill(InputKind::Co2, 2001, &mut value).expect("fill");
        assert_eq!(value, [288.0]);

        forcing.fill(InputKind::LandUse, 2001, &mut value).expect("fill");
        assert_eq!(value, [0.001]);

        forcing.fill(InputKind::Temperature, 2001, &mut value).expect("fill");
        assert_eq!(value, [0.0]);
    }
}
