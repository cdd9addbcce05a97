//! Position records matching the tracker's JSON schema

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::propagation::StateSample;

/// A single position report as served by `/api/satellites/<id>/position`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Sample time, ISO-8601 (with or without offset; naive times are UTC)
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(flatten)]
    pub state: StateSample,

    /// Reported speed (km/s)
    #[serde(default)]
    pub velocity: Option<f64>,
}

/// Envelope wrapping API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<PositionRecord>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Any of the accepted input document shapes
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PositionDocument {
    Envelope(ApiResponse),
    Batch(Vec<PositionRecord>),
    Single(PositionRecord),
}

impl PositionDocument {
    /// Flatten into records, surfacing API failures as errors
    pub fn into_records(self) -> Result<Vec<PositionRecord>> {
        match self {
            Self::Envelope(response) => {
                if !response.success {
                    let message = response
                        .message
                        .unwrap_or_else(|| "no message".to_string());
                    return Err(anyhow!("Position API reported failure: {}", message));
                }
                let record = response
                    .data
                    .ok_or_else(|| anyhow!("Position API response has no data"))?;
                Ok(vec![record])
            }
            Self::Batch(records) => Ok(records),
            Self::Single(record) => Ok(vec![record]),
        }
    }
}

impl PositionRecord {
    pub fn new(state: StateSample) -> Self {
        Self {
            timestamp: None,
            state,
            velocity: None,
        }
    }

    /// Parsed sample time, if present and readable
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
            return Some(time.with_timezone(&Utc));
        }
        match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            Ok(naive) => Some(naive.and_utc()),
            Err(e) => {
                log::warn!("Ignoring unreadable timestamp {:?}: {}", raw, e);
                None
            }
        }
    }

    /// Speed in km/s (reported value, else |v|)
    pub fn speed_km_s(&self) -> f64 {
        self.velocity
            .unwrap_or_else(|| self.state.velocity_km_s().norm())
    }
}
