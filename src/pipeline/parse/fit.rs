use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::activity::{FileFormat, ParsedActivity, Sample};
use chrono::{SecondsFormat, Utc};
use fitparser::profile::MesgNum;

pub struct FitParser;

impl Parser for FitParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedActivity, ParseError> {
        let data = fitparser::from_bytes(bytes)
            .map_err(|e| ParseError::InvalidFit(format!("Failed to parse FIT file: {}", e)))?;

        let mut samples = Vec::new();

        for record in data {
            if record.kind() != MesgNum::Record {
                continue;
            }

            // Records without position_lat/position_long stay at 0/0, which
            // the pipeline reads as "no fix".
            let mut sample = blank_sample();
            for field in record.fields() {
                apply_field(&mut sample, field.name(), field.value());
            }

            // An empty timestamp is kept; the pipeline rejects it as fatal.
            if sample.timestamp.is_empty() {
                tracing::warn!("FIT record {} has no timestamp", samples.len());
            }

            samples.push(sample);
        }

        if samples.is_empty() {
            return Err(ParseError::EmptyFile);
        }

        Ok(ParsedActivity {
            samples,
            file_format: FileFormat::Fit,
        })
    }
}

fn blank_sample() -> Sample {
    Sample {
        timestamp: String::new(),
        lat: 0.0,
        lon: 0.0,
        elevation: 0.0,
        temperature: None,
        heart_rate: None,
        cadence: None,
    }
}

fn apply_field(sample: &mut Sample, name: &str, value: &fitparser::Value) {
    match (name, value) {
        ("position_lat", fitparser::Value::SInt32(val)) => {
            sample.lat = semicircles_to_degrees(*val);
        }
        ("position_long", fitparser::Value::SInt32(val)) => {
            sample.lon = semicircles_to_degrees(*val);
        }
        ("altitude" | "enhanced_altitude", fitparser::Value::Float64(val)) => {
            sample.elevation = *val;
        }
        ("timestamp", fitparser::Value::Timestamp(val)) => {
            sample.timestamp = val
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true);
        }
        ("heart_rate", fitparser::Value::UInt8(val)) => {
            sample.heart_rate = Some(*val as u16);
        }
        ("cadence", fitparser::Value::UInt8(val)) => {
            sample.cadence = Some(*val as u16);
        }
        ("temperature", fitparser::Value::SInt8(val)) => {
            sample.temperature = Some(*val as f32);
        }
        _ => {}
    }
}

fn semicircles_to_degrees(semicircles: i32) -> f64 {
    (semicircles as f64) * (180.0 / 2_147_483_648.0)
}
