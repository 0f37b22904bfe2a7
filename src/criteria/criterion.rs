use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction in which raw values improve suitability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Higher raw values are better.
    #[serde(rename = "+", alias = "positive", alias = "Positive")]
    Positive,
    /// Lower raw values are better.
    #[serde(rename = "-", alias = "negative", alias = "Negative")]
    Negative,
}

impl Effect {
    pub fn to_str(&self) -> &'static str {
        match self {
            Effect::Positive => "+",
            Effect::Negative => "-",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// One indicator attribute: its valid range, relative weight, and effect direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub weight: f64,
    pub effect: Effect,
}

impl Criterion {
    pub fn new(name: impl Into<String>, lower: f64, upper: f64, weight: f64, effect: Effect) -> Self {
        Self { name: name.into(), lower, upper, weight, effect }
    }

    /// True if `value` lies within the closed range `[lower, upper]`.
    #[inline] pub fn contains(&self, value: f64) -> bool { value >= self.lower && value <= self.upper }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Criterion(name='{}', range=[{}, {}], weight={}, effect={})",
            self.name, self.lower, self.upper, self.weight, self.effect)
    }
}
