use super::{Formatter, MotionReport};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &MotionReport) -> String {
        let contact = if report.contact { " CONTACT" } else { "" };
        if self.verbose {
            format!(
                "{:>8} {:>6} {:>6} {:>7.1} {:>7.1} | {:>7.1} {:>7.1} | {:>9} | hdg: {:>4}° rate: {:>7.1} dps{}",
                report.millis,
                report.x,
                report.y,
                report.len,
                report.dir,
                report.len_avg,
                report.dir_avg,
                report.ss_avg,
                report.heading,
                report.rate_dps,
                contact
            )
        } else {
            format!(
                "{:>8} ms  accel: {:>7.1}  heading: {:>4}°{}",
                report.millis, report.len_avg, report.heading, contact
            )
        }
    }

    fn header(&self) -> Option<&'static str> {
        if self.verbose {
            Some("  millis      x      y     len     dir | len_avg dir_avg |    ss_avg")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_report;

    #[test]
    fn test_text_contact_marker() {
        let mut report = sample_report();
        let formatter = TextFormatter::new(false);
        assert!(!formatter.format(&report).contains("CONTACT"));
        report.contact = true;
        assert!(formatter.format(&report).ends_with("CONTACT"));
    }
}
