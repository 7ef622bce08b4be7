use crate::error::{ExperimentError, Result};
use periphery_core::ResultRecord;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Destination for completed staircase results.
pub trait ResultSink {
    fn append(&mut self, record: &ResultRecord) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        (**self).append(record)
    }
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        (**self).append(record)
    }
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl ResultSink for Vec<ResultRecord> {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        self.push(*record);
        Ok(())
    }
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Used when the participant declined data recording.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl ResultSink for DiscardSink {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        debug!(?record, "recording disabled, result not saved");
        Ok(())
    }
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// `<directory>/<participant>_<date>_<experiment>.csv`
pub fn session_path(directory: &Path, participant: &str, date: &str, experiment: &str) -> PathBuf {
    directory.join(format!("{participant}_{date}_{experiment}.csv"))
}

/// Appends result rows to a CSV file, one flush per row.
///
/// The header row is written when the file is missing or empty, so a second
/// session on the same day continues the same file.
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ExperimentError::persistence(&path, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ExperimentError::persistence(&path, e))?;
        let is_new = file
            .metadata()
            .map_err(|e| ExperimentError::persistence(&path, e))?
            .len()
            == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer
                .write_record(ResultRecord::HEADER)
                .map_err(|e| ExperimentError::persistence(&path, e))?;
            writer
                .flush()
                .map_err(|e| ExperimentError::persistence(&path, e))?;
        }
        info!(path = %path.display(), new_file = is_new, "recording results");
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for CsvSink {
    fn append(&mut self, record: &ResultRecord) -> Result<()> {
        self.writer
            .serialize(record)
            .map_err(|e| ExperimentError::persistence(&self.path, e))?;
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| ExperimentError::persistence(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use periphery_core::Direction;

    fn record(direction: Direction, size: f64, angle: f64) -> ResultRecord {
        ResultRecord {
            direction,
            size_deg: size,
            angle_deg: angle,
        }
    }

    #[test]
    fn path_joins_participant_date_and_name() {
        let p = session_path(Path::new("Data"), "p01", "11-29", "Crowded Periphery");
        assert_eq!(p, Path::new("Data").join("p01_11-29_Crowded Periphery.csv"));
    }

    #[test]
    fn new_file_gets_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("s.csv");
        let mut sink = CsvSink::open(&path).unwrap();
        sink.append(&record(Direction::Down, 0.25, 17.0)).unwrap();
        sink.append(&record(Direction::Up, 4.0, 43.0)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Direction,Letter Height (degrees),Eccentricity (degrees)"
        );
        assert_eq!(lines[1], "2,0.25,17");
        assert_eq!(lines[2], "4,4,43");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn header_is_written_before_any_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        drop(CsvSink::open(&path).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Direction,Letter Height (degrees),Eccentricity (degrees)\n"
        );
    }

    #[test]
    fn session_aborted_before_first_row_keeps_header_for_next_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        {
            let mut sink = CsvSink::open(&path).unwrap();
            sink.flush().unwrap();
        }
        {
            let mut sink = CsvSink::open(&path).unwrap();
            sink.append(&record(Direction::Up, 1.0, 17.0)).unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Direction,"));
        assert_eq!(text.matches("Direction").count(), 1);
        assert_eq!(text.lines().nth(1), Some("4,1,17"));
    }

    #[test]
    fn empty_file_left_behind_gets_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        std::fs::write(&path, b"").unwrap();
        let mut sink = CsvSink::open(&path).unwrap();
        sink.append(&record(Direction::Right, 0.5, 9.0)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Direction,"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn existing_file_is_appended_without_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.csv");
        {
            let mut sink = CsvSink::open(&path).unwrap();
            sink.append(&record(Direction::Right, 1.0, 30.0)).unwrap();
        }
        {
            let mut sink = CsvSink::open(&path).unwrap();
            sink.append(&record(Direction::Left, 1.5, 12.0)).unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("Direction").count(), 1);
        assert_eq!(text.lines().count(), 3);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<ResultRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows[1], record(Direction::Left, 1.5, 12.0));
    }

    #[test]
    fn unwritable_location_reports_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let err = CsvSink::open(blocker.join("s.csv")).err().unwrap();
        assert!(matches!(err, ExperimentError::PersistenceWriteFailed { .. }));
    }
}
