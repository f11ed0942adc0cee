//! Sensor data source: the remote "room sensor" record

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::SourceConfig;
use crate::io::HttpClient;
use crate::reading::RawSample;
use crate::RoomMonitorError;

/// Trait for fetching the current sensor values
#[async_trait]
pub trait SensorSource: Send + Sync + std::fmt::Debug {
    /// Fetch the current record. `Ok(None)` means the record is absent.
    async fn fetch(&self) -> crate::Result<Option<RawSample>>;
}

/// Field names for each value; the firmware writes the Portuguese ones.
/// The first name present wins.
const TEMPERATURE_FIELDS: [&str; 2] = ["temperature", "temperatura"];
const HUMIDITY_FIELDS: [&str; 2] = ["humidity", "umidade"];

/// Firebase Realtime Database REST client for the sensor record
pub struct FirebaseSource {
    url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for FirebaseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // url may carry the auth token
        f.debug_struct("FirebaseSource").finish_non_exhaustive()
    }
}

impl FirebaseSource {
    pub fn new(config: &SourceConfig, http: Arc<dyn HttpClient>) -> Self {
        let base = config.base_url.trim_end_matches('/');
        let path = config.path.trim_matches('/');
        let mut url = format!("{}/{}.json", base, path);
        if let Some(token) = &config.auth_token {
            url.push_str("?auth=");
            url.push_str(token);
        }

        tracing::debug!("Created FirebaseSource for {}/{}", base, path);

        Self { url, http }
    }
}

#[async_trait]
impl SensorSource for FirebaseSource {
    async fn fetch(&self) -> crate::Result<Option<RawSample>> {
        let response = self.http.get(&self.url).await?;

        if !response.is_success() {
            return Err(RoomMonitorError::Source(format!(
                "Sensor source returned status {}: {}",
                response.status, response.body
            )));
        }

        parse_record(&response.body)
    }
}

/// Parse a record body into a sample; `null` means no record
pub fn parse_record(body: &str) -> crate::Result<Option<RawSample>> {
    let value: Value = serde_json::from_str(body)?;
    if value.is_null() {
        return Ok(None);
    }

    let record = value.as_object().ok_or_else(|| {
        RoomMonitorError::Source(format!("Sensor record is not an object: {}", value))
    })?;
    let temperature = coerce_number("temperature", lookup(record, &TEMPERATURE_FIELDS))?;
    let humidity = coerce_number("humidity", lookup(record, &HUMIDITY_FIELDS))?;

    Ok(Some(RawSample {
        temperature,
        humidity,
    }))
}

fn lookup<'a>(record: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| record.get(*name))
}

/// Accept JSON numbers and numeric strings
fn coerce_number(field: &str, value: Option<&Value>) -> crate::Result<f64> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite()).ok_or_else(|| {
        RoomMonitorError::Source(format!(
            "Field '{}' is missing or not numeric: {:?}",
            field, value
        ))
    })
}
