use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::activity::{FileFormat, ParsedActivity, Sample};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub struct GpxParser;

impl Parser for GpxParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedActivity, ParseError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut samples = Vec::new();
        let mut in_trkpt = false;
        let mut current_sample: Option<Sample> = None;
        let mut current_element = String::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = e.local_name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if name_str == "trkpt" {
                        in_trkpt = true;
                        current_sample = sample_from_attributes(&e)?;
                    } else if in_trkpt {
                        current_element = name_str.to_string();
                    }
                }
                Ok(Event::Empty(e)) => {
                    // A self-closing trkpt has no <time>; keep it so the
                    // pipeline reports it instead of silently losing it.
                    if e.local_name().as_ref() == b"trkpt" {
                        if let Some(sample) = sample_from_attributes(&e)? {
                            samples.push(sample);
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    if in_trkpt {
                        if let Some(sample) = current_sample.as_mut() {
                            let text = e
                                .unescape()
                                .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
                            let text = text.trim();

                            match current_element.as_str() {
                                "ele" => sample.elevation = text.parse().unwrap_or(0.0),
                                "time" => sample.timestamp = text.to_string(),
                                "atemp" => sample.temperature = text.parse().ok(),
                                "hr" => sample.heart_rate = text.parse().ok(),
                                "cad" => sample.cadence = text.parse().ok(),
                                _ => {}
                            }
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    let name = e.local_name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if name_str == "trkpt" {
                        if let Some(sample) = current_sample.take() {
                            samples.push(sample);
                        }
                        in_trkpt = false;
                    }
                    current_element.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::InvalidGpx(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if samples.is_empty() {
            return Err(ParseError::EmptyFile);
        }

        Ok(ParsedActivity {
            samples,
            file_format: FileFormat::Gpx,
        })
    }
}

fn sample_from_attributes(e: &BytesStart<'_>) -> Result<Option<Sample>, ParseError> {
    let mut lat = None;
    let mut lon = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

        match key {
            "lat" => lat = value.trim().parse().ok(),
            "lon" => lon = value.trim().parse().ok(),
            _ => {}
        }
    }

    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some(Sample {
            timestamp: String::new(),
            lat,
            lon,
            elevation: 0.0,
            temperature: None,
            heart_rate: None,
            cadence: None,
        })),
        _ => {
            tracing::warn!("Skipping trkpt without lat/lon");
            Ok(None)
        }
    }
}
