mod csv;
mod json;
mod text;

use chrono::Utc;
use serde::Serialize;

use crate::estimation::{CollisionDetector, HeadingIntegrator};

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// One line of the motion log
#[derive(Debug, Clone, Serialize)]
pub struct MotionReport {
    /// Timestamp of the last accepted accelerometer sample
    pub millis: u32,
    pub x: i16,
    pub y: i16,
    /// Instantaneous magnitude metric (see `CollisionDetector::instant_magnitude`)
    pub len: f32,
    pub dir: f32,
    /// Magnitude of the smoothed vector
    pub len_avg: f32,
    pub dir_avg: f32,
    pub ss_avg: i64,
    pub contact: bool,
    pub heading: i32,
    pub rate_dps: f32,
}

impl MotionReport {
    pub fn from_estimators<const N: usize>(
        collision: &CollisionDetector<N>,
        heading: &HeadingIntegrator,
    ) -> Self {
        let last = collision.last_sample();
        let ss_avg = collision.smoothed_squared_magnitude();
        Self {
            millis: last.timestamp_ms,
            x: last.x,
            y: last.y,
            len: collision.instant_magnitude(),
            dir: collision.instant_direction(),
            len_avg: (ss_avg as f32).sqrt(),
            dir_avg: collision.smoothed_direction(),
            ss_avg,
            contact: collision.is_contact(),
            heading: heading.signed_heading_degrees(),
            rate_dps: heading.rate_dps(),
        }
    }
}

pub trait Formatter {
    fn format(&self, report: &MotionReport) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollisionConfig;
    use crate::sensors::Vector3;

    pub(super) fn sample_report() -> MotionReport {
        let mut collision = CollisionDetector::new(&CollisionConfig { threshold: 100 });
        collision.ingest(Vector3::new(30, 40, 0), 1234);
        MotionReport::from_estimators(&collision, &HeadingIntegrator::new())
    }

    #[test]
    fn test_report_from_estimators() {
        let report = sample_report();
        assert_eq!(report.millis, 1234);
        assert_eq!((report.x, report.y), (30, 40));
        assert!((report.len - 50.0).abs() < 1e-4);
        assert!((report.len_avg - 50.0).abs() < 1e-4);
        assert_eq!(report.ss_avg, 2500);
        assert!(!report.contact);
        assert_eq!(report.heading, 0);
    }

    #[test]
    fn test_every_format_produces_one_line() {
        let report = sample_report();
        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Csv] {
            let line = create_formatter(format, true).format(&report);
            assert!(!line.contains('\n'), "{:?} output spans lines", format);
        }
    }
}
