//! Synthesis parameter names and the override-merge parameter map.
//!
//! Parameters form a closed set known at compile time, so voice and modifier
//! tables can never reference an unknown key at runtime.

use std::collections::BTreeMap;

/// A synthesis parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Param {
    /// Peak amplitude of a note, or the level bus amplitude.
    Amp,
    /// Seconds over which a level bus change ramps to its target.
    AmpSlide,
    /// Stereo position, -1.0 (left) to 1.0 (right).
    Pan,
    /// Envelope attack time in seconds.
    Attack,
    /// Level reached at the end of the attack phase (0.0–1.0).
    AttackLevel,
    /// Sustain duration in seconds.
    Sustain,
    /// Level held during the sustain phase (0.0–1.0).
    SustainLevel,
    /// Envelope release time in seconds.
    Release,
    /// FM modulator frequency as carrier / divisor.
    Divisor,
    /// FM modulation index.
    Depth,
}

/// An ordered mapping of parameter name to value.
///
/// Merging is override-by-key: a later value for the same key replaces the
/// earlier one. Iteration order is the key order, so resolution is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap {
    values: BTreeMap<Param, f64>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single parameter, replacing any existing value.
    pub fn set(&mut self, param: Param, value: f64) {
        self.values.insert(param, value);
    }

    pub fn get(&self, param: Param) -> Option<f64> {
        self.values.get(&param).copied()
    }

    /// Read a parameter, falling back to `default` when unset.
    pub fn get_or(&self, param: Param, default: f64) -> f64 {
        self.get(param).unwrap_or(default)
    }

    /// Layer `other` on top of this map. Last-applied-wins on key collision.
    pub fn merge(&mut self, other: &ParamMap) {
        for (&param, &value) in &other.values {
            self.values.insert(param, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Param, f64)> + '_ {
        self.values.iter().map(|(&p, &v)| (p, v))
    }
}

impl<const N: usize> From<[(Param, f64); N]> for ParamMap {
    fn from(entries: [(Param, f64); N]) -> Self {
        Self {
            values: BTreeMap::from(entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut params = ParamMap::new();
        params.set(Param::Amp, 0.6);
        assert_eq!(params.get(Param::Amp), Some(0.6));
        assert_eq!(params.get(Param::Attack), None);
    }

    #[test]
    fn get_or_falls_back() {
        let params = ParamMap::from([(Param::Amp, 0.6)]);
        assert_eq!(params.get_or(Param::Amp, 1.0), 0.6);
        assert_eq!(params.get_or(Param::Release, 1.0), 1.0);
    }

    #[test]
    fn merge_overrides_by_key() {
        let mut base = ParamMap::from([(Param::Amp, 0.6), (Param::Attack, 0.05)]);
        let delta = ParamMap::from([(Param::Amp, 3.0), (Param::Release, 0.001)]);
        base.merge(&delta);

        assert_eq!(base.get(Param::Amp), Some(3.0));
        assert_eq!(base.get(Param::Attack), Some(0.05));
        assert_eq!(base.get(Param::Release), Some(0.001));
    }

    #[test]
    fn merge_last_applied_wins() {
        let mut params = ParamMap::new();
        params.merge(&ParamMap::from([(Param::Amp, 1.0)]));
        params.merge(&ParamMap::from([(Param::Amp, 3.0)]));
        assert_eq!(params.get(Param::Amp), Some(3.0));
    }

    #[test]
    fn merge_empty_is_noop() {
        let mut params = ParamMap::from([(Param::Amp, 0.5)]);
        let before = params.clone();
        params.merge(&ParamMap::new());
        assert_eq!(params, before);
    }

    #[test]
    fn iteration_order_is_stable() {
        let a = ParamMap::from([(Param::Release, 1.0), (Param::Amp, 0.5)]);
        let b = ParamMap::from([(Param::Amp, 0.5), (Param::Release, 1.0)]);
        let order_a: Vec<_> = a.iter().collect();
        let order_b: Vec<_> = b.iter().collect();
        assert_eq!(order_a, order_b);
    }
}
