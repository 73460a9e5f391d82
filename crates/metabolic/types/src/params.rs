//! Governed metabolic parameters.
//!
//! The set of governed parameters is closed: [`ParamKey`] enumerates every
//! one of them, so safety bounds and drift caps are exhaustive `match` arms
//! rather than string lookups.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownParamKey;

// ── Parameter Keys ──────────────────────────────────────────────────────

/// A governed metabolic parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKey {
    /// Weight applied to healing (falling strain score).
    WHeal,
    /// Weight applied to authoritative confirmations.
    WTruth,
    /// Weight applied to rot (rising strain score and violations).
    WRot,
    /// Gain converting ache into a metabolic multiplier.
    Beta,
    /// Lower clamp of the metabolic multiplier.
    MMin,
    /// Upper clamp of the metabolic multiplier.
    MMax,
}

impl ParamKey {
    /// Every governed key, in canonical order.
    pub const ALL: [ParamKey; 6] = [
        ParamKey::WHeal,
        ParamKey::WTruth,
        ParamKey::WRot,
        ParamKey::Beta,
        ParamKey::MMin,
        ParamKey::MMax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::WHeal => "w_heal",
            ParamKey::WTruth => "w_truth",
            ParamKey::WRot => "w_rot",
            ParamKey::Beta => "beta",
            ParamKey::MMin => "m_min",
            ParamKey::MMax => "m_max",
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamKey {
    type Err = UnknownParamKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownParamKey(s.to_string()))
    }
}

/// A (possibly partial) assignment of governed parameters.
pub type ParamMap = BTreeMap<ParamKey, f64>;

// ── Parameter Values ────────────────────────────────────────────────────

/// The complete set of governed metabolic values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetabolicParams {
    pub w_heal: f64,
    pub w_truth: f64,
    pub w_rot: f64,
    pub beta: f64,
    pub m_min: f64,
    pub m_max: f64,
}

impl Default for MetabolicParams {
    fn default() -> Self {
        Self {
            w_heal: 0.5,
            w_truth: 0.2,
            w_rot: 1.0,
            beta: 0.05,
            m_min: 0.5,
            m_max: 1.5,
        }
    }
}

impl MetabolicParams {
    pub fn get(&self, key: ParamKey) -> f64 {
        match key {
            ParamKey::WHeal => self.w_heal,
            ParamKey::WTruth => self.w_truth,
            ParamKey::WRot => self.w_rot,
            ParamKey::Beta => self.beta,
            ParamKey::MMin => self.m_min,
            ParamKey::MMax => self.m_max,
        }
    }

    pub fn set(&mut self, key: ParamKey, value: f64) {
        match key {
            ParamKey::WHeal => self.w_heal = value,
            ParamKey::WTruth => self.w_truth = value,
            ParamKey::WRot => self.w_rot = value,
            ParamKey::Beta => self.beta = value,
            ParamKey::MMin => self.m_min = value,
            ParamKey::MMax => self.m_max = value,
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: ParamKey, value: f64) -> Self {
        self.set(key, value);
        self
    }

    /// All six values as a map.
    pub fn to_map(&self) -> ParamMap {
        ParamKey::ALL.iter().map(|k| (*k, self.get(*k))).collect()
    }
}
