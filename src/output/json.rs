use serde::Serialize;

use super::{Formatter, MotionReport, iso8601_timestamp};

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonLine<'a> {
    ts: String,
    #[serde(flatten)]
    report: &'a MotionReport,
}

impl Formatter for JsonFormatter {
    fn format(&self, report: &MotionReport) -> String {
        let line = JsonLine {
            ts: iso8601_timestamp(),
            report,
        };
        // Only plain numbers and strings; NaN magnitudes become null
        serde_json::to_string(&line).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_report;

    #[test]
    fn test_json_fields() {
        let line = JsonFormatter.format(&sample_report());
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["millis"], 1234);
        assert_eq!(value["ss_avg"], 2500);
        assert_eq!(value["contact"], false);
        assert!(value["ts"].is_string());
    }

    #[test]
    fn test_json_nan_is_null() {
        let mut report = sample_report();
        report.len = f32::NAN;
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format(&report)).unwrap();
        assert!(value["len"].is_null());
    }
}
