use chrono::{DateTime, Utc};

use crate::error::ProcessError;
use crate::geo::{spatial_distance_metres, surface_distance_metres, GeoPoint};
use crate::types::activity::{EnrichedDrop, Maximums, Metrics, ParsedActivity, ProcessedActivity, Sample};

/// Marathon world-record pace in minutes per kilometre. Anything faster over
/// a segment is treated as a GPS glitch.
pub const DEFAULT_MIN_PACE: f64 = 2.9139;

pub fn process(parsed: &ParsedActivity, min_pace: f64) -> Result<ProcessedActivity, ProcessError> {
    let mut pipeline = TrackPipeline::new(min_pace);
    for sample in &parsed.samples {
        pipeline.process_sample(sample)?;
    }

    let received = pipeline.received();
    let rejected = pipeline.rejected();
    let drops = pipeline.into_drops();
    let metrics = compute_metrics(&drops, received, rejected);

    Ok(ProcessedActivity {
        drops,
        metrics,
        file_format: parsed.file_format,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy)]
struct Fix {
    point: GeoPoint,
    timestamp: DateTime<Utc>,
}

/// Turns raw samples into enriched drops, one at a time and in order.
///
/// The last element of `drops` is the previous accepted drop every new
/// sample is measured against. `last_fix` trails it to the most recent
/// accepted drop that had a position, so a no-fix drop never becomes the
/// origin of a distance.
#[derive(Debug)]
pub struct TrackPipeline {
    min_pace: f64,
    drops: Vec<EnrichedDrop>,
    last_fix: Option<Fix>,
    received: usize,
    rejected: usize,
}

impl Default for TrackPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PACE)
    }
}

impl TrackPipeline {
    pub fn new(min_pace: f64) -> Self {
        Self {
            min_pace,
            drops: Vec::new(),
            last_fix: None,
            received: 0,
            rejected: 0,
        }
    }

    pub fn process_sample(&mut self, sample: &Sample) -> Result<Outcome, ProcessError> {
        let index = self.received;
        let timestamp = parse_timestamp(index, &sample.timestamp)?;
        self.received += 1;

        let (enriched, has_segment) = self.derive(sample, timestamp);

        // Going back in time would make the running time shrink.
        let backwards = enriched.elapsed_seconds < 0.0;
        if backwards || (has_segment && enriched.pace < self.min_pace) {
            self.rejected += 1;
            tracing::debug!("Rejected sample {}: {}", index, enriched);
            return Ok(Outcome::Rejected);
        }

        if enriched.has_fix {
            self.last_fix = Some(Fix {
                point: enriched.point(),
                timestamp,
            });
        }
        self.drops.push(enriched);

        Ok(Outcome::Accepted)
    }

    pub fn previous(&self) -> Option<&EnrichedDrop> {
        self.drops.last()
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn into_drops(self) -> Vec<EnrichedDrop> {
        self.drops
    }

    /// Builds the drop for `sample` and reports whether it closes a segment
    /// (has a fix and an earlier fix to measure from).
    fn derive(&self, sample: &Sample, timestamp: DateTime<Utc>) -> (EnrichedDrop, bool) {
        let previous = self.previous();

        let index = previous.map_or(1, |p| p.index + 1);
        let elapsed_seconds = previous.map_or(0.0, |p| seconds_between(p.timestamp, timestamp));

        let mut aggregates = previous.map(|p| p.aggregates).unwrap_or_default();
        aggregates.time += elapsed_seconds;

        let temperature = sample.temperature.filter(|t| *t != 0.0);
        let heart_rate = sample.heart_rate.filter(|hr| *hr != 0);
        let cadence = sample.cadence.filter(|cad| *cad != 0);

        let previous_max = previous.map(|p| p.maximums).unwrap_or_default();
        let maximums = Maximums {
            temperature: fold_max(previous_max.temperature, temperature),
            heart_rate: fold_max(previous_max.heart_rate, heart_rate),
            cadence: fold_max(previous_max.cadence, cadence),
        };

        let mut enriched = EnrichedDrop {
            index,
            timestamp,
            has_fix: sample.has_fix(),
            lat: 0.0,
            lon: 0.0,
            elevation: 0.0,
            temperature,
            heart_rate,
            cadence,
            elapsed_seconds,
            distance: 0.0,
            distance_3d: 0.0,
            pace: 0.0,
            aggregates,
            maximums,
        };

        if !enriched.has_fix {
            return (enriched, false);
        }

        enriched.lat = sample.lat;
        enriched.lon = sample.lon;
        enriched.elevation = sample.elevation;

        let Some(fix) = self.last_fix else {
            return (enriched, false);
        };

        let current = sample.point();
        enriched.distance = surface_distance_metres(current, fix.point);
        enriched.distance_3d = spatial_distance_metres(current, fix.point);
        enriched.pace = pace_min_per_km(
            seconds_between(fix.timestamp, timestamp),
            enriched.distance_3d,
        );

        let climb = current.elevation - fix.point.elevation;
        if climb > 0.0 {
            enriched.aggregates.climb += climb;
        }
        enriched.aggregates.distance += enriched.distance;
        enriched.aggregates.distance_3d += enriched.distance_3d;

        (enriched, true)
    }
}

fn parse_timestamp(index: usize, raw: &str) -> Result<DateTime<Utc>, ProcessError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ProcessError::InvalidTimestamp {
            index,
            raw: raw.to_string(),
        })
}

fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}

fn fold_max<T: PartialOrd + Copy>(running: Option<T>, current: Option<T>) -> Option<T> {
    match (running, current) {
        (Some(max), Some(value)) if value > max => Some(value),
        (Some(max), _) => Some(max),
        (None, value) => value,
    }
}

/// Minutes per kilometre, rounded to 4 decimals. A zero-length segment has
/// pace 0.
pub fn pace_min_per_km(seconds: f64, distance_3d: f64) -> f64 {
    if distance_3d == 0.0 {
        return 0.0;
    }

    let pace = (1000.0 * seconds) / (distance_3d * 60.0);
    (pace * 10_000.0).round() / 10_000.0
}

fn compute_metrics(drops: &[EnrichedDrop], received: usize, rejected: usize) -> Metrics {
    let totals = drops.last().map(|d| d.aggregates).unwrap_or_default();
    let maximums = drops.last().map(|d| d.maximums).unwrap_or_default();

    Metrics {
        distance_m: totals.distance,
        distance_3d_m: totals.distance_3d,
        elevation_gain_m: totals.climb,
        duration_seconds: totals.time,
        max_temperature: maximums.temperature,
        max_heart_rate: maximums.heart_rate,
        max_cadence: maximums.cadence,
        samples_received: received,
        samples_accepted: drops.len(),
        samples_rejected: rejected,
    }
}
