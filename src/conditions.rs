//! Ambient weather conditions
//!
//! A lightweight current-conditions report refreshed on a timer tick for the
//! rendering collaborator's weather widget. The sampling source is pluggable
//! so a live weather provider can replace the built-in rotation.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Coarse sky state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rain,
    Snow,
    Storm,
    Windy,
}

impl WeatherCondition {
    /// Fixed display description per condition.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Clear => "Sunny day",
            Self::Cloudy => "Partly cloudy",
            Self::Rain => "Light rain",
            Self::Snow => "Light snow",
            Self::Storm => "Thunderstorm",
            Self::Windy => "Strong winds",
        }
    }
}

/// Current ambient conditions snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature_c: i32,
    pub condition: WeatherCondition,
    pub description: String,
}

impl WeatherReport {
    fn from_condition(temperature_c: i32, condition: WeatherCondition) -> Self {
        Self {
            temperature_c,
            condition,
            description: condition.description().to_string(),
        }
    }
}

impl Default for WeatherReport {
    fn default() -> Self {
        Self::from_condition(25, WeatherCondition::Clear)
    }
}

/// Source of the current ambient conditions.
pub trait ConditionSource: Send + Sync {
    fn sample(&self) -> WeatherReport;
}

const CONDITION_CYCLE: [WeatherCondition; 6] = [
    WeatherCondition::Clear,
    WeatherCondition::Cloudy,
    WeatherCondition::Rain,
    WeatherCondition::Snow,
    WeatherCondition::Storm,
    WeatherCondition::Windy,
];

/// Deterministic rotation through the fixed condition set, with the
/// temperature stepping over a 10-40°C band.
#[derive(Debug, Default)]
pub struct RotationSource {
    samples: AtomicU64,
}

impl RotationSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConditionSource for RotationSource {
    fn sample(&self) -> WeatherReport {
        let sample = self.samples.fetch_add(1, Ordering::Relaxed);
        let condition = CONDITION_CYCLE[(sample % CONDITION_CYCLE.len() as u64) as usize];
        let temperature_c = 10 + ((sample * 7) % 30) as i32;
        WeatherReport::from_condition(temperature_c, condition)
    }
}

/// Holds the latest report and refreshes it on `tick`.
pub struct AmbientConditions {
    report: WeatherReport,
    source: Box<dyn ConditionSource>,
}

impl AmbientConditions {
    #[must_use]
    pub fn new(source: Box<dyn ConditionSource>) -> Self {
        Self {
            report: WeatherReport::default(),
            source,
        }
    }

    /// Refresh the report from the source. Idempotent entry point for the
    /// periodic timer.
    pub fn tick(&mut self) {
        self.report = self.source.sample();
    }

    #[must_use]
    pub fn report(&self) -> &WeatherReport {
        &self.report
    }
}
