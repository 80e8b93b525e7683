//! Plain-text report writer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::session::SessionReport;

/// Write `report` to `path`: a statistics section with the per-file
/// inventory, then the matched lines in order of appearance.
pub fn write_report(path: &Path, report: &SessionReport) -> io::Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "-- statistics --")?;
    writeln!(out, "date: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "elapsed: {:?}", report.elapsed)?;
    writeln!(out, "files:")?;
    for record in &report.files {
        writeln!(out, " - {record}")?;
    }
    writeln!(out)?;
    writeln!(out, "-- logs --")?;
    for line in &report.lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LogFileRecord;
    use std::time::Duration;

    fn sample_report() -> SessionReport {
        let mut first = LogFileRecord::new("/var/log/messages");
        first.device_count = 2;
        first.extracted_count = 2;
        first.done = true;
        let mut second = LogFileRecord::new("/var/log/messages.0");
        second.device_count = 3;
        second.extracted_count = 1;
        second.done = true;

        SessionReport {
            files: vec![first, second],
            lines: vec![
                "Aug 25 10:00:01 ERROR one".to_string(),
                "Aug 25 10:00:02 ERROR two".to_string(),
                "Aug 25 10:00:03 ERROR three".to_string(),
            ],
            elapsed: Duration::from_millis(1234),
        }
    }

    #[test]
    fn test_report_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        write_report(&path, &sample_report()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        let stats_at = text.find("-- statistics --").unwrap();
        let logs_at = text.find("-- logs --").unwrap();
        assert!(stats_at < logs_at, "statistics must precede logs");

        assert!(text.contains("date: "));
        assert!(text.contains(" - /var/log/messages: expected 2, extracted 2, done: true"));
        assert!(text.contains(" - /var/log/messages.0: expected 3, extracted 1, done: true"));

        let logs = &text[logs_at..];
        assert!(logs.contains("ERROR one\nAug 25 10:00:02 ERROR two\n"));
        assert!(text.ends_with("ERROR three\n"));
        assert!(!text.contains('\r'));
    }

    #[test]
    fn test_empty_report_still_has_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        write_report(&path, &SessionReport::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert!(text.contains("-- statistics --"));
        assert!(text.contains("-- logs --"));
    }
}
