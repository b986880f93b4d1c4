//! EXIF fields for image files.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Fields pulled out of an image's EXIF block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifSummary {
    /// Original capture time, read as local wall-clock time
    pub date_taken: Option<DateTime<Local>>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    /// Signed decimal degrees
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ExifSummary {
    /// "Make Model", without repeating the make when the model already has it
    pub fn camera(&self) -> Option<String> {
        match (&self.camera_make, &self.camera_model) {
            (Some(make), Some(model)) if model.starts_with(make.as_str()) => Some(model.clone()),
            (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
            (None, Some(model)) => Some(model.clone()),
            (Some(make), None) => Some(make.clone()),
            (None, None) => None,
        }
    }

    pub fn has_location(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Read EXIF from `path`. Files without EXIF (or unreadable ones) yield `None`.
pub fn read_exif(path: &Path) -> Option<ExifSummary> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;

    let field = |tag: Tag| exif.get_field(tag, In::PRIMARY).map(|f| &f.value);

    let mut summary = ExifSummary {
        date_taken: field(Tag::DateTimeOriginal)
            .or_else(|| field(Tag::DateTime))
            .and_then(parse_exif_date),
        width: field(Tag::PixelXDimension).and_then(u32_value),
        height: field(Tag::PixelYDimension).and_then(u32_value),
        camera_make: field(Tag::Make).and_then(string_value),
        camera_model: field(Tag::Model).and_then(string_value),
        latitude: None,
        longitude: None,
    };

    if summary.width.is_none() {
        summary.width = field(Tag::ImageWidth).and_then(u32_value);
    }
    if summary.height.is_none() {
        summary.height = field(Tag::ImageLength).and_then(u32_value);
    }

    summary.latitude = field(Tag::GPSLatitude)
        .and_then(degrees)
        .map(|deg| signed(deg, field(Tag::GPSLatitudeRef), "S"));
    summary.longitude = field(Tag::GPSLongitude)
        .and_then(degrees)
        .map(|deg| signed(deg, field(Tag::GPSLongitudeRef), "W"));

    Some(summary)
}

/// EXIF date format: "YYYY:MM:DD HH:MM:SS"
fn parse_exif_date(value: &Value) -> Option<DateTime<Local>> {
    let text = string_value(value)?;
    let naive = NaiveDateTime::parse_from_str(&text, "%Y:%m:%d %H:%M:%S").ok()?;
    Local.from_local_datetime(&naive).earliest()
}

fn u32_value(value: &Value) -> Option<u32> {
    match value {
        Value::Long(vec) => vec.first().copied(),
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        _ => None,
    }
}

fn string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(vec) = value {
        let bytes = vec.first()?;
        let text = std::str::from_utf8(bytes).ok()?;
        let trimmed = text.trim_end_matches('\0').trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    None
}

/// Degrees/minutes/seconds rationals to decimal degrees
fn degrees(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(parts) if parts.len() >= 3 => {
            let d = parts[0].to_f64();
            let m = parts[1].to_f64();
            let s = parts[2].to_f64();
            let total = d + m / 60.0 + s / 3600.0;
            total.is_finite().then_some(total)
        }
        _ => None,
    }
}

fn signed(degrees: f64, reference: Option<&Value>, negative: &str) -> f64 {
    match reference.and_then(string_value) {
        Some(r) if r.eq_ignore_ascii_case(negative) => -degrees,
        _ => degrees,
    }
}
