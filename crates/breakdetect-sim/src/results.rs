//! Delimited results-file format
//!
//! ```text
//! # Monte Carlo Simulation Results
//! # 1000 simulations of 45 cycles
//! # Format:  Simulation Number, Resistance In Ohms, List of Failed Sensors
//! 0,437.9,
//! 0,526.3,4000
//! 0,inf,4000,1000,5000,2000,3000
//! ```
//!
//! The first two comma fields are fixed; everything after the second comma is the
//! variable-length list of failed part names.

use crate::error::{SimError, SimResult};
use crate::network::StatusLog;
use std::io::Write;
use std::str::FromStr;

/// Lines starting with this character are header or comment lines
pub const COMMENT_PREFIX: char = '#';

/// Header written before any trial rows
pub fn header_lines(num_simulations: usize, cycle_ceiling: u64) -> Vec<String> {
    vec![
        "# Monte Carlo Simulation Results".to_string(),
        format!(
            "# {} simulations of {} cycles",
            num_simulations, cycle_ceiling
        ),
        "# Format:  Simulation Number, Resistance In Ohms, List of Failed Sensors".to_string(),
    ]
}

/// True for lines that carry a data row
pub fn is_data_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(COMMENT_PREFIX)
}

/// Writes trial status logs as result rows
pub struct ResultsWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl<W: Write> ResultsWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, rows: 0 }
    }

    pub fn write_header(&mut self, num_simulations: usize, cycle_ceiling: u64) -> SimResult<()> {
        for line in header_lines(num_simulations, cycle_ceiling) {
            writeln!(self.inner, "{}", line)?;
        }
        Ok(())
    }

    /// Write one row per status-log entry; returns the number of rows written
    pub fn write_trial(&mut self, simulation: usize, log: &StatusLog) -> SimResult<usize> {
        for (reading, failed) in log {
            writeln!(self.inner, "{},{},{}", simulation, reading, failed.join(","))?;
        }
        self.rows += log.len();
        Ok(log.len())
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> SimResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// One parsed data row
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub simulation: usize,
    /// Reading exactly as written, used as the collision key
    pub reading: String,
    /// Reading in ohms
    pub ohms: f64,
    /// Failed part names in fail order; empty before the first failure
    pub failed: Vec<String>,
}

impl ResultRecord {
    /// Failed names sorted lexically, for order-insensitive comparison
    pub fn failed_set(&self) -> Vec<String> {
        let mut set = self.failed.clone();
        set.sort();
        set
    }
}

impl FromStr for ResultRecord {
    type Err = SimError;

    fn from_str(line: &str) -> SimResult<Self> {
        let mut fields = line.trim().splitn(3, ',');
        let simulation = fields.next().unwrap_or_default().trim();
        let reading = fields
            .next()
            .ok_or_else(|| SimError::MalformedRecord(format!("missing reading in '{}'", line)))?
            .trim();

        let simulation = simulation.parse().map_err(|_| {
            SimError::MalformedRecord(format!("bad simulation index '{}'", simulation))
        })?;
        let ohms = reading
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            .ok_or_else(|| SimError::MalformedRecord(format!("bad reading '{}'", reading)))?;
        let failed = fields
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            simulation,
            reading: reading.to_string(),
            ohms,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(entries: &[(&str, &[&str])]) -> StatusLog {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_writer_output() {
        let mut writer = ResultsWriter::new(Vec::new());
        writer.write_header(2, 45).unwrap();
        writer
            .write_trial(0, &log(&[("437.9", &[]), ("inf", &["1000", "2000"])]))
            .unwrap();
        writer.write_trial(1, &log(&[("437.2", &[])])).unwrap();
        assert_eq!(writer.rows(), 3);

        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "# 2 simulations of 45 cycles");
        assert_eq!(&lines[3..], &["0,437.9,", "0,inf,1000,2000", "1,437.2,"]);
    }

    #[test]
    fn test_parse_record() {
        let record: ResultRecord = "12,526.3,4000,1000".parse().unwrap();
        assert_eq!(record.simulation, 12);
        assert_eq!(record.reading, "526.3");
        assert!((record.ohms - 526.3).abs() < 1e-9);
        assert_eq!(record.failed, vec!["4000", "1000"]);
        assert_eq!(record.failed_set(), vec!["1000", "4000"]);
    }

    #[test]
    fn test_parse_record_without_failures() {
        let record: ResultRecord = "0,437.9,".parse().unwrap();
        assert!(record.failed.is_empty());
        let record: ResultRecord = "0,437.9".parse().unwrap();
        assert!(record.failed.is_empty());
    }

    #[test]
    fn test_parse_open_circuit() {
        let record: ResultRecord = "3,inf,a,b,c".parse().unwrap();
        assert!(record.ohms.is_infinite());
        assert_eq!(record.failed.len(), 3);
    }

    #[test]
    fn test_parse_malformed() {
        for bad in ["", "7", "x,12.0,a", "1,abc,a", "1,NaN,a"] {
            assert!(
                matches!(bad.parse::<ResultRecord>(), Err(SimError::MalformedRecord(_))),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_data_lines() {
        assert!(!is_data_line("# header"));
        assert!(!is_data_line("   "));
        assert!(is_data_line("0,1.0,"));
    }
}
