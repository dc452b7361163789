// LogPulse - core/export.rs
//
// CSV and JSON export of the visible slice.
// Core layer: writes to any Write trait object.

use crate::core::model::LogRecord;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export records to CSV format.
///
/// Columns: timestamp, level, service, message, id
pub fn export_csv<W: Write>(
    records: &[LogRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["timestamp", "level", "service", "message", "id"])
        .map_err(csv_err)?;

    for record in records {
        csv_writer
            .write_record([
                record.timestamp.to_rfc3339().as_str(),
                record.level.as_str(),
                &record.service,
                &record.message,
                &record.id,
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(records.len())
}

/// Export records to JSON format (array of objects in wire shape).
pub fn export_json<W: Write>(
    records: &[LogRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Level;
    use chrono::DateTime;

    fn make_record(id: &str, message: &str) -> LogRecord {
        LogRecord {
            id: id.to_string(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            level: Level::Error,
            service: "auth".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_csv_export() {
        let records = vec![
            make_record("1", "Error one"),
            make_record("2", "Error, with comma"),
        ];
        let mut buf = Vec::new();
        let count = export_csv(&records, &mut buf, Path::new("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("timestamp,level,service,message,id"));
        assert_eq!(
            lines.next(),
            Some("2023-11-14T22:13:20+00:00,ERROR,auth,Error one,1")
        );
        assert!(output.contains("\"Error, with comma\""));
    }

    #[test]
    fn test_json_export() {
        let records = vec![make_record("abc", "Test message")];
        let mut buf = Vec::new();
        let count = export_json(&records, &mut buf, Path::new("out.json")).unwrap();
        assert_eq!(count, 1);

        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["_id"], "abc");
        assert_eq!(parsed[0]["message"], "Test message");
        assert_eq!(parsed[0]["level"], "ERROR");
    }
}
