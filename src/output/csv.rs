use super::{Formatter, MotionReport, iso8601_timestamp};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, report: &MotionReport) -> String {
        format!(
            "{},{},{},{},{:.1},{:.1},{:.1},{:.1},{},{},{},{:.2}",
            iso8601_timestamp(),
            report.millis,
            report.x,
            report.y,
            report.len,
            report.dir,
            report.len_avg,
            report.dir_avg,
            report.ss_avg,
            u8::from(report.contact),
            report.heading,
            report.rate_dps
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,millis,x,y,len,dir,len_avg,dir_avg,ss_avg,contact,heading,rate_dps")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_report;

    #[test]
    fn test_csv_columns_match_header() {
        let formatter = CsvFormatter;
        let line = formatter.format(&sample_report());
        let header = formatter.header().unwrap();
        assert_eq!(line.split(',').count(), header.split(',').count());
        assert!(line.contains(",1234,30,40,"));
    }
}
