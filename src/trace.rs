//! Recorded IMU traces
//!
//! A trace is a CSV file with one row per control loop iteration:
//!
//! ```text
//! millis,micros,ax,ay,gz
//! 0,0,-12,40,-31
//! 2,2048,-10,38,-29
//! ```
//!
//! The header is optional and lines starting with `#` are ignored.
//! [`Trace::replay`] turns a trace back into an IMU bus and clock so the
//! real estimators can run against it.

use std::cell::Cell;
use std::fmt::Write as _;
use std::path::Path;
use std::rc::Rc;

use crate::config::{AccelConfig, GyroFilterConfig};
use crate::error::{Result, SenseError};
use crate::sensors::{Accelerometer, Clock, Gyroscope, ImuBus, Vector3};

pub const TRACE_HEADER: &str = "millis,micros,ax,ay,gz";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceRow {
    pub millis: u32,
    pub micros: u32,
    pub ax: i16,
    pub ay: i16,
    pub gz: i16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    rows: Vec<TraceRow>,
}

impl Trace {
    pub fn new(rows: Vec<TraceRow>) -> Self {
        Self { rows }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut rows = Vec::new();
        let mut seen_data = false;

        for (i, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if !seen_data && line.eq_ignore_ascii_case(TRACE_HEADER) {
                seen_data = true;
                continue;
            }
            seen_data = true;
            rows.push(parse_row(line, i + 1)?);
        }

        Ok(Self { rows })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_csv())?;
        Ok(())
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(self.rows.len() * 24 + TRACE_HEADER.len() + 1);
        out.push_str(TRACE_HEADER);
        out.push('\n');
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{},{},{},{},{}",
                row.millis, row.micros, row.ax, row.ay, row.gz
            );
        }
        out
    }

    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bus and clock that step through the trace together
    ///
    /// Nothing is current until the first [`TraceBus::advance`] (or a gyro
    /// data-ready poll, which advances too).
    pub fn replay(&self) -> (TraceBus, TraceClock) {
        let cursor = ReplayCursor {
            rows: Rc::from(self.rows.as_slice()),
            position: Rc::new(Cell::new(None)),
        };
        (
            TraceBus {
                cursor: cursor.clone(),
            },
            TraceClock { cursor },
        )
    }
}

fn parse_row(line: &str, line_number: usize) -> Result<TraceRow> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 5 {
        return Err(SenseError::TraceParse {
            line: line_number,
            reason: format!("expected 5 fields, found {}", fields.len()),
        });
    }

    fn field<T: std::str::FromStr>(value: &str, name: &str, line: usize) -> Result<T> {
        value.parse().map_err(|_| SenseError::TraceParse {
            line,
            reason: format!("invalid {}: {:?}", name, value),
        })
    }

    Ok(TraceRow {
        millis: field(fields[0], "millis", line_number)?,
        micros: field(fields[1], "micros", line_number)?,
        ax: field(fields[2], "ax", line_number)?,
        ay: field(fields[3], "ay", line_number)?,
        gz: field(fields[4], "gz", line_number)?,
    })
}

#[derive(Debug, Clone)]
struct ReplayCursor {
    rows: Rc<[TraceRow]>,
    position: Rc<Cell<Option<usize>>>,
}

impl ReplayCursor {
    fn current(&self) -> TraceRow {
        self.position
            .get()
            .and_then(|i| self.rows.get(i).copied())
            .unwrap_or_default()
    }

    fn advance(&self) -> bool {
        let next = self.position.get().map_or(0, |i| i + 1);
        if next < self.rows.len() {
            self.position.set(Some(next));
            true
        } else {
            false
        }
    }
}

/// IMU bus side of a replayed trace
#[derive(Debug, Clone)]
pub struct TraceBus {
    cursor: ReplayCursor,
}

impl TraceBus {
    /// Move to the next row; false once the trace is exhausted
    pub fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    pub fn current_row(&self) -> TraceRow {
        self.cursor.current()
    }

    /// Rows not yet made current
    pub fn remaining(&self) -> usize {
        let consumed = self.cursor.position.get().map_or(0, |i| i + 1);
        self.cursor.rows.len() - consumed
    }
}

impl Accelerometer for TraceBus {
    fn read_acceleration(&mut self) -> Vector3<i16> {
        let row = self.cursor.current();
        Vector3::new(row.ax, row.ay, 0)
    }
}

impl Gyroscope for TraceBus {
    /// Every recorded row is a fresh gyro sample; not ready at end of trace
    fn data_ready(&mut self) -> bool {
        self.cursor.advance()
    }

    fn read_rate(&mut self) -> Vector3<i16> {
        Vector3::new(0, 0, self.cursor.current().gz)
    }
}

impl ImuBus for TraceBus {
    fn configure_accelerometer(&mut self, config: &AccelConfig) {
        log::debug!("Replay ignores accelerometer setup {:?}", config);
    }

    fn configure_gyro(&mut self, filter: &GyroFilterConfig) {
        log::debug!("Replay ignores gyro filter setup {:?}", filter);
    }
}

/// Clock side of a replayed trace, reading the current row's timestamps
#[derive(Debug, Clone)]
pub struct TraceClock {
    cursor: ReplayCursor,
}

impl Clock for TraceClock {
    fn millis(&self) -> u32 {
        self.cursor.current().millis
    }

    fn micros(&self) -> u32 {
        self.cursor.current().micros
    }

    /// Skip rows until `ms` of recorded time have passed
    fn delay_ms(&mut self, ms: u32) {
        let start = self.millis();
        while self.millis().wrapping_sub(start) < ms {
            if !self.cursor.advance() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# recorded on the practice ring
millis,micros,ax,ay,gz
0,0,10,20,-3
5,5000,11,21,-4

10,10000,12,22,-5
";

    #[test]
    fn test_parse_skips_header_comments_and_blanks() {
        let trace = Trace::parse(SAMPLE).unwrap();
        assert_eq!(trace.len(), 3);
        assert_eq!(
            trace.rows()[1],
            TraceRow {
                millis: 5,
                micros: 5000,
                ax: 11,
                ay: 21,
                gz: -4
            }
        );
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = Trace::parse("millis,micros,ax,ay,gz\n0,0,1,2,3\n1,1000,x,2,3\n").unwrap_err();
        match err {
            SenseError::TraceParse { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("ax"));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = Trace::parse("0,0,1,2\n").unwrap_err();
        assert!(matches!(err, SenseError::TraceParse { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_out_of_range_axis() {
        assert!(Trace::parse("0,0,40000,0,0\n").is_err());
    }

    #[test]
    fn test_csv_round_trip() {
        let trace = Trace::parse(SAMPLE).unwrap();
        assert_eq!(Trace::parse(&trace.to_csv()).unwrap(), trace);
    }

    #[test]
    fn test_replay_steps_bus_and_clock_together() {
        let trace = Trace::parse(SAMPLE).unwrap();
        let (mut bus, clock) = trace.replay();
        assert_eq!(bus.remaining(), 3);

        assert!(bus.advance());
        assert_eq!(bus.read_acceleration(), Vector3::new(10, 20, 0));
        assert_eq!(clock.micros(), 0);

        assert!(bus.data_ready());
        assert_eq!(bus.read_rate().z, -4);
        assert_eq!(clock.millis(), 5);

        assert!(bus.advance());
        assert_eq!(bus.remaining(), 0);
        assert!(!bus.advance());
        assert!(!bus.data_ready());
        assert_eq!(clock.millis(), 10);
    }

    #[test]
    fn test_replay_delay_skips_rows() {
        let trace = Trace::parse(SAMPLE).unwrap();
        let (mut bus, mut clock) = trace.replay();
        bus.advance();
        clock.delay_ms(7);
        assert_eq!(clock.millis(), 10);
        assert_eq!(bus.current_row().gz, -5);
    }
}
