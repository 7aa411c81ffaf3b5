use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A raw track point as read from the source file. The timestamp is kept as
/// text; the pipeline is responsible for parsing it.
#[derive(Debug, Clone)]
pub struct Sample {
    pub timestamp: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
    pub temperature: Option<f32>,
    pub heart_rate: Option<u16>,
    pub cadence: Option<u16>,
}

impl Sample {
    /// `0.0 / 0.0` is how recorders write "no satellite fix".
    pub fn has_fix(&self) -> bool {
        !(self.lat == 0.0 && self.lon == 0.0)
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon, self.elevation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    Gpx,
    Fit,
}

impl FileFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "gpx" => Some(FileFormat::Gpx),
            "fit" => Some(FileFormat::Fit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FileFormat::Gpx => "gpx",
            FileFormat::Fit => "fit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedActivity {
    pub samples: Vec<Sample>,
    pub file_format: FileFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub climb: f64,
    pub time: f64,
    pub distance: f64,
    pub distance_3d: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Maximums {
    pub temperature: Option<f32>,
    pub heart_rate: Option<u16>,
    pub cadence: Option<u16>,
}

/// An accepted sample together with everything derived from the drops
/// before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDrop {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub has_fix: bool,
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
    pub temperature: Option<f32>,
    pub heart_rate: Option<u16>,
    pub cadence: Option<u16>,
    pub elapsed_seconds: f64,
    pub distance: f64,
    pub distance_3d: f64,
    /// Minutes per kilometre over the segment, 0 when there is no segment.
    pub pace: f64,
    pub aggregates: Aggregates,
    pub maximums: Maximums,
}

impl EnrichedDrop {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon, self.elevation)
    }
}

fn reading<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for EnrichedDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}][{}] {},{} ^{:.0} s{} t{} h{} c{} d{} ({}) <{}> [A] ^{:.0} +{} {:.0} ({:.0}) [M] t{} h{} c{}",
            self.timestamp.to_rfc3339(),
            self.index,
            self.lat,
            self.lon,
            self.elevation,
            self.elapsed_seconds,
            reading(self.temperature),
            reading(self.heart_rate),
            reading(self.cadence),
            self.distance,
            self.distance_3d,
            self.pace,
            self.aggregates.climb,
            self.aggregates.time,
            self.aggregates.distance,
            self.aggregates.distance_3d,
            reading(self.maximums.temperature),
            reading(self.maximums.heart_rate),
            reading(self.maximums.cadence),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    pub distance_m: f64,
    pub distance_3d_m: f64,
    pub elevation_gain_m: f64,
    pub duration_seconds: f64,
    pub max_temperature: Option<f32>,
    pub max_heart_rate: Option<u16>,
    pub max_cadence: Option<u16>,
    pub samples_received: usize,
    pub samples_accepted: usize,
    pub samples_rejected: usize,
}

#[derive(Debug, Clone)]
pub struct ProcessedActivity {
    pub drops: Vec<EnrichedDrop>,
    pub metrics: Metrics,
    pub file_format: FileFormat,
}
