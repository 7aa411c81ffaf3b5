use chrono::SecondsFormat;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::ExportError;
use crate::types::activity::EnrichedDrop;

const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";
const TPX_NS: &str = "http://www.garmin.com/xmlschemas/TrackPointExtension/v1";

/// Serializes accepted drops into a GPX 1.1 track. Only position, time and
/// the sensor readings are written; aggregates stay in the JSON report.
pub fn to_gpx(drops: &[EnrichedDrop], name: &str) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("version", "1.1"));
    gpx.push_attribute(("creator", "gpxfix-rs"));
    gpx.push_attribute(("xmlns", GPX_NS));
    gpx.push_attribute(("xmlns:gpxtpx", TPX_NS));
    writer.write_event(Event::Start(gpx)).map_err(xml_error)?;

    writer.write_event(Event::Start(BytesStart::new("trk"))).map_err(xml_error)?;
    writer
        .create_element("name")
        .write_text_content(BytesText::new(name))
        .map_err(xml_error)?;
    writer.write_event(Event::Start(BytesStart::new("trkseg"))).map_err(xml_error)?;

    for enriched in drops {
        write_trkpt(&mut writer, enriched)?;
    }

    writer.write_event(Event::End(BytesEnd::new("trkseg"))).map_err(xml_error)?;
    writer.write_event(Event::End(BytesEnd::new("trk"))).map_err(xml_error)?;
    writer.write_event(Event::End(BytesEnd::new("gpx"))).map_err(xml_error)?;

    Ok(writer.into_inner())
}

fn write_trkpt(writer: &mut Writer<Vec<u8>>, enriched: &EnrichedDrop) -> Result<(), ExportError> {
    let lat = enriched.lat.to_string();
    let lon = enriched.lon.to_string();
    let mut trkpt = BytesStart::new("trkpt");
    trkpt.push_attribute(("lat", lat.as_str()));
    trkpt.push_attribute(("lon", lon.as_str()));
    writer.write_event(Event::Start(trkpt)).map_err(xml_error)?;

    text_element(writer, "ele", &enriched.elevation.to_string())?;
    text_element(
        writer,
        "time",
        &enriched.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    )?;

    let readings = [
        ("gpxtpx:atemp", enriched.temperature.map(|t| t.to_string())),
        ("gpxtpx:hr", enriched.heart_rate.map(|hr| hr.to_string())),
        ("gpxtpx:cad", enriched.cadence.map(|cad| cad.to_string())),
    ];

    if readings.iter().any(|(_, value)| value.is_some()) {
        writer
            .write_event(Event::Start(BytesStart::new("extensions")))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Start(BytesStart::new("gpxtpx:TrackPointExtension")))
            .map_err(xml_error)?;

        for (tag, value) in &readings {
            if let Some(value) = value {
                text_element(writer, tag, value)?;
            }
        }

        writer
            .write_event(Event::End(BytesEnd::new("gpxtpx:TrackPointExtension")))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("extensions")))
            .map_err(xml_error)?;
    }

    writer.write_event(Event::End(BytesEnd::new("trkpt"))).map_err(xml_error)?;
    Ok(())
}

fn text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), ExportError> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))
        .map_err(xml_error)?;
    Ok(())
}

fn xml_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(e.to_string())
}
