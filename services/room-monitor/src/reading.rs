//! Sensor reading types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Time-of-day format shown next to each reading
pub const DISPLAY_TIME_FORMAT: &str = "%H:%M:%S";

/// A raw (temperature, humidity) pair as returned by the sensor source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub temperature: f64,
    pub humidity: f64,
}

/// One timestamped sample, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Local>,
    pub display_time: String,
    pub temperature: f64,
    pub humidity: f64,
}

impl Reading {
    pub fn new(temperature: f64, humidity: f64, timestamp: DateTime<Local>) -> Self {
        Self {
            display_time: timestamp.format(DISPLAY_TIME_FORMAT).to_string(),
            timestamp,
            temperature,
            humidity,
        }
    }

    pub fn from_sample(sample: RawSample, timestamp: DateTime<Local>) -> Self {
        Self::new(sample.temperature, sample.humidity, timestamp)
    }
}
