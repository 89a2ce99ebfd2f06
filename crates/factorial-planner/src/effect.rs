//! Module effects and the layouts that produce them.
//!
//! An [`Effect`] maps effect names ("productivity", "speed", ...) to exact
//! magnitudes. A recipe's output and rate are multiplied by
//! `1 + magnitude`, see [`Effect::total`].

use crate::catalog::{CatalogError, GameData};
use crate::id::ModuleId;
use factorial_rational::Rational;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

pub const PRODUCTIVITY: &str = "productivity";
pub const SPEED: &str = "speed";

/// Beacon-transmitted modules contribute half their effect.
pub fn beacon_efficiency() -> Rational {
    Rational::one() / Rational::from(2u32)
}

/// Summed effect magnitudes keyed by effect name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Effect(BTreeMap<String, Rational>);

impl Effect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Magnitude of `name`, zero when absent.
    pub fn get(&self, name: &str) -> Rational {
        self.0.get(name).cloned().unwrap_or_default()
    }

    /// Multiplier for `name`: `1 + get(name)`.
    pub fn total(&self, name: &str) -> Rational {
        self.get(name).inc()
    }

    pub fn scaled(&self, factor: &Rational) -> Self {
        Self(
            self.0
                .iter()
                .map(|(name, value)| (name.clone(), value * factor))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rational)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Names with a non-zero magnitude.
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, v)| !v.is_zero()).map(|(name, _)| name)
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

impl FromIterator<(String, Rational)> for Effect {
    fn from_iter<I: IntoIterator<Item = (String, Rational)>>(iter: I) -> Self {
        let mut effect = Effect::new();
        for (name, value) in iter {
            *effect.0.entry(name).or_default() += value;
        }
        effect
    }
}

impl AddAssign<&Effect> for Effect {
    fn add_assign(&mut self, other: &Effect) {
        for (name, value) in &other.0 {
            *self.0.entry(name.clone()).or_default() += value;
        }
    }
}

impl Add<&Effect> for &Effect {
    type Output = Effect;

    fn add(self, other: &Effect) -> Effect {
        let mut sum = self.clone();
        sum += other;
        sum
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .filter(|(_, v)| !v.is_zero())
            .map(|(name, value)| format!("{name} {value}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Multiset of modules: module -> count.
pub type ModuleCounts = BTreeMap<ModuleId, u32>;

/// Modules inserted directly into a machine plus modules in surrounding
/// beacons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLayout {
    pub modules: ModuleCounts,
    pub beacons: ModuleCounts,
}

impl ModuleLayout {
    pub fn new(modules: ModuleCounts, beacons: ModuleCounts) -> Self {
        Self { modules, beacons }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.values().chain(self.beacons.values()).all(|&n| n == 0)
    }

    /// Number of modules occupying the machine's own slots.
    pub fn module_count(&self) -> u64 {
        self.modules.values().map(|&n| u64::from(n)).sum()
    }

    /// Every distinct module in the layout, direct or beaconed.
    pub fn used_modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        let mut ids: Vec<ModuleId> = self
            .modules
            .iter()
            .chain(&self.beacons)
            .filter(|&(_, &n)| n > 0)
            .map(|(&id, _)| id)
            .collect();
        ids.sort();
        ids.dedup();
        ids.into_iter()
    }

    /// Direct effects plus beacon effects scaled by [`beacon_efficiency`].
    pub fn effect(&self, data: &GameData) -> Result<Effect, CatalogError> {
        let direct = counts_effect(data, &self.modules)?;
        let beaconed = counts_effect(data, &self.beacons)?;
        Ok(&direct + &beaconed.scaled(&beacon_efficiency()))
    }
}

fn counts_effect(data: &GameData, counts: &ModuleCounts) -> Result<Effect, CatalogError> {
    let mut effect = Effect::new();
    for (&id, &count) in counts {
        let module = data.module(id)?;
        effect += &module.effect.scaled(&Rational::from(count));
    }
    Ok(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn frac(n: i64, d: i64) -> Rational {
        Rational::new(n, d).unwrap()
    }

    #[test]
    fn missing_effect_is_zero() {
        let effect = Effect::new();
        assert!(effect.get(SPEED).is_zero());
        assert_eq!(effect.total(SPEED), Rational::one());
    }

    #[test]
    fn from_iter_merges_duplicates() {
        let effect: Effect = vec![
            (SPEED.to_string(), frac(1, 5)),
            (SPEED.to_string(), frac(1, 10)),
        ]
        .into_iter()
        .collect();
        assert_eq!(effect.get(SPEED), frac(3, 10));
    }

    #[test]
    fn add_and_scale() {
        let a: Effect = vec![(PRODUCTIVITY.to_string(), frac(1, 10))].into_iter().collect();
        let b: Effect = vec![(SPEED.to_string(), frac(-1, 20))].into_iter().collect();
        let sum = &a + &b;
        assert_eq!(sum.get(PRODUCTIVITY), frac(1, 10));
        assert_eq!(sum.get(SPEED), frac(-1, 20));
        let doubled = sum.scaled(&Rational::from(2));
        assert_eq!(doubled.total(PRODUCTIVITY), frac(6, 5));
    }

    #[test]
    fn zero_magnitudes_are_inactive() {
        let effect: Effect = vec![("pollution".to_string(), Rational::zero())].into_iter().collect();
        assert!(effect.is_empty());
        assert_eq!(effect.to_string(), "");
    }

    #[test]
    fn layout_effect_halves_beacons() {
        let data = sample_data();
        let speed = data.module_id("speed-module").unwrap();
        let productivity = data.module_id("productivity-module").unwrap();
        let layout = ModuleLayout::new(
            [(productivity, 1)].into_iter().collect(),
            [(speed, 2)].into_iter().collect(),
        );
        let effect = layout.effect(&data).unwrap();
        // 1 x productivity module (+1/10, speed -1/20) and 2 x 1/2 x speed module (+1/5).
        assert_eq!(effect.total(PRODUCTIVITY), frac(11, 10));
        assert_eq!(effect.get(SPEED), frac(-1, 20) + frac(1, 5));
        assert_eq!(layout.module_count(), 1);
        assert_eq!(layout.used_modules().collect::<Vec<_>>().len(), 2);
    }

    #[test]
    fn beacons_are_half_strength() {
        assert_eq!(beacon_efficiency(), frac(1, 2));
    }

    #[test]
    fn module_count_does_not_wrap() {
        let data = sample_data();
        let speed = data.module_id("speed-module").unwrap();
        let productivity = data.module_id("productivity-module").unwrap();
        let layout = ModuleLayout::new(
            [(speed, u32::MAX), (productivity, u32::MAX)].into_iter().collect(),
            ModuleCounts::new(),
        );
        assert_eq!(layout.module_count(), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn empty_layout_has_no_effect() {
        let data = sample_data();
        let layout = ModuleLayout::default();
        assert!(layout.is_empty());
        assert!(layout.effect(&data).unwrap().is_empty());
    }
}
