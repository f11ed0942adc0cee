//! Trend analysis over the reading window
//!
//! The analysis is recomputed from scratch on every cycle: averages over the
//! whole window, and a trend from the difference between the two most recent
//! readings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reading::Reading;

/// Color used for the stable trend
pub const STABLE_COLOR: &str = "#f1c40f";
/// Color used before the first reading arrives
pub const PENDING_COLOR: &str = "#999";
pub const PENDING_STATUS: &str = "Waiting...";

/// A tracked quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Temperature,
    Humidity,
}

impl Quantity {
    /// Decimal places the average is rounded to
    pub fn precision(self) -> i32 {
        match self {
            Quantity::Temperature => 1,
            Quantity::Humidity => 0,
        }
    }

    fn value(self, reading: &Reading) -> f64 {
        match self {
            Quantity::Temperature => reading.temperature,
            Quantity::Humidity => reading.humidity,
        }
    }

    /// Status label for a trend. The wording differs per quantity.
    pub fn label(self, trend: Trend) -> &'static str {
        match (self, trend) {
            (Quantity::Temperature, Trend::RisingFast) => "Heating fast",
            (Quantity::Temperature, Trend::FallingFast) => "Cooling fast",
            (Quantity::Humidity, Trend::RisingFast) => "Increasing fast",
            (Quantity::Humidity, Trend::FallingFast) => "Decreasing fast",
            (_, Trend::Stable) => "Stable",
        }
    }

    /// Display color for a trend. Not symmetric across quantities.
    pub fn color(self, trend: Trend) -> &'static str {
        match (self, trend) {
            (Quantity::Temperature, Trend::RisingFast) => "#e74c3c",
            (Quantity::Temperature, Trend::FallingFast) => "#3498db",
            (Quantity::Humidity, Trend::RisingFast) => "#3498db",
            (Quantity::Humidity, Trend::FallingFast) => "#e67e22",
            (_, Trend::Stable) => STABLE_COLOR,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Temperature => write!(f, "temperature"),
            Quantity::Humidity => write!(f, "humidity"),
        }
    }
}

/// Short-term direction of a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    RisingFast,
    FallingFast,
    Stable,
}

impl Trend {
    /// Classify a delta; the threshold itself counts as stable
    pub fn classify(delta: f64, threshold: f64) -> Self {
        if delta > threshold {
            Trend::RisingFast
        } else if delta < -threshold {
            Trend::FallingFast
        } else {
            Trend::Stable
        }
    }
}

/// Derived statistics for one quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityAnalysis {
    pub average: f64,
    pub trend: Option<Trend>,
    pub status: String,
    pub color: String,
}

impl QuantityAnalysis {
    fn pending() -> Self {
        Self {
            average: 0.0,
            trend: None,
            status: PENDING_STATUS.to_string(),
            color: PENDING_COLOR.to_string(),
        }
    }
}

/// Derived statistics for the whole window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub temperature: QuantityAnalysis,
    pub humidity: QuantityAnalysis,
}

impl Analysis {
    /// Placeholder published until the first reading is recorded
    pub fn pending() -> Self {
        Self {
            temperature: QuantityAnalysis::pending(),
            humidity: QuantityAnalysis::pending(),
        }
    }
}

impl Default for Analysis {
    fn default() -> Self {
        Self::pending()
    }
}

/// Analyze a window snapshot (oldest first). Returns `None` for an empty window.
pub fn analyze(snapshot: &[Reading], threshold: f64) -> Option<Analysis> {
    Some(Analysis {
        temperature: analyze_quantity(snapshot, Quantity::Temperature, threshold)?,
        humidity: analyze_quantity(snapshot, Quantity::Humidity, threshold)?,
    })
}

pub fn analyze_quantity(
    snapshot: &[Reading],
    quantity: Quantity,
    threshold: f64,
) -> Option<QuantityAnalysis> {
    let current = snapshot.last()?;
    // a lone reading is its own predecessor, so its trend is stable
    let previous = snapshot
        .len()
        .checked_sub(2)
        .and_then(|i| snapshot.get(i))
        .unwrap_or(current);

    let sum: f64 = snapshot.iter().map(|r| quantity.value(r)).sum();
    let average = round_to(sum / snapshot.len() as f64, quantity.precision());

    let delta = quantity.value(current) - quantity.value(previous);
    let trend = Trend::classify(delta, threshold);

    Some(QuantityAnalysis {
        average,
        trend: Some(trend),
        status: quantity.label(trend).to_string(),
        color: quantity.color(trend).to_string(),
    })
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
