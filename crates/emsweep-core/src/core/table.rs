use super::energy::EnergyPoint;
use super::scrape::ScrapedRun;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

/// Column names of the result table, in order.
pub const HEADER: [&str; 5] = [
    "Energy_MeV",
    "Total_Deposit_MeV",
    "Ionization_Loss",
    "Radiative_Loss",
    "Process_Info",
];

/// Sentinel written to a loss column when the run did not report a value.
pub const UNAVAILABLE: &str = "unavailable";

/// Marker written to any column whose value is missing because the run failed.
pub const ERROR_MARKER: &str = "error";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to open result table '{path}': {source}")]
    Open { path: String, source: csv::Error },

    #[error("Failed to write result table row: {0}")]
    Write(#[from] csv::Error),

    #[error("Result table I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Result table '{path}' has unexpected header: {found}")]
    Header { path: String, found: String },
}

/// The value of one scraped column.
///
/// Keeps "not reported" and "missing because the run failed" apart so the
/// table renderer can flag them differently.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Value(T),
    Unavailable,
    Error(String),
}

impl<T> Field<T> {
    /// Wraps a scraped value, choosing the absent variant from the run outcome.
    pub fn from_scrape(value: Option<T>, failure: Option<&str>) -> Self {
        match (value, failure) {
            (Some(v), _) => Field::Value(v),
            (None, Some(cause)) => Field::Error(cause.to_string()),
            (None, None) => Field::Unavailable,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Field::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// One row of the result table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub energy: EnergyPoint,
    pub total_deposit: Field<f64>,
    pub ionization_loss: Field<String>,
    pub radiative_loss: Field<String>,
    pub process_info: String,
    pub failure: Option<String>,
}

impl RunRecord {
    /// Builds the row for one run from its scraped output.
    ///
    /// `failure` carries the cause when the process exited unsuccessfully; the
    /// scraped values are still used where present.
    pub fn assemble(energy: EnergyPoint, scraped: &ScrapedRun, failure: Option<&str>) -> Self {
        let process_info = match failure {
            Some(cause) if scraped.process_lines.is_empty() => format!("run failed: {}", cause),
            Some(cause) => format!("run failed: {}; {}", cause, scraped.process_info()),
            None => scraped.process_info(),
        };

        Self {
            energy,
            total_deposit: Field::from_scrape(scraped.deposit_mev(), failure),
            ionization_loss: Field::from_scrape(scraped.ionization_loss(), failure),
            radiative_loss: Field::from_scrape(scraped.radiative_loss(), failure),
            process_info,
            failure: failure.map(str::to_string),
        }
    }

    /// True when at least one loss column holds a scraped value.
    pub fn has_loss_value(&self) -> bool {
        self.ionization_loss.is_value() || self.radiative_loss.is_value()
    }

    pub fn deposit_text(&self) -> String {
        match &self.total_deposit {
            Field::Value(v) => v.to_string(),
            Field::Unavailable => String::new(),
            Field::Error(_) => ERROR_MARKER.to_string(),
        }
    }

    pub fn ionization_text(&self) -> String {
        loss_text(&self.ionization_loss)
    }

    pub fn radiative_text(&self) -> String {
        loss_text(&self.radiative_loss)
    }

    /// The row as written to the CSV file, in [`HEADER`] order.
    pub fn to_fields(&self) -> [String; 5] {
        [
            self.energy.to_string(),
            self.deposit_text(),
            self.ionization_text(),
            self.radiative_text(),
            self.process_info.clone(),
        ]
    }
}

fn loss_text(field: &Field<String>) -> String {
    match field {
        Field::Value(v) => v.clone(),
        Field::Unavailable => UNAVAILABLE.to_string(),
        Field::Error(_) => ERROR_MARKER.to_string(),
    }
}

/// Append-only CSV sink. The header is written on creation; every appended
/// row is flushed immediately so an interrupted sweep keeps completed rows.
pub struct ResultTable<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl ResultTable<File> {
    pub fn create(path: &Path) -> Result<Self, TableError> {
        let writer = csv::Writer::from_path(path).map_err(|e| TableError::Open {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::with_writer(writer)
    }
}

impl<W: Write> ResultTable<W> {
    pub fn from_writer(inner: W) -> Result<Self, TableError> {
        Self::with_writer(csv::Writer::from_writer(inner))
    }

    fn with_writer(mut writer: csv::Writer<W>) -> Result<Self, TableError> {
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn append(&mut self, record: &RunRecord) -> Result<(), TableError> {
        self.writer.write_record(record.to_fields())?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> Result<W, TableError> {
        self.writer
            .into_inner()
            .map_err(|e| TableError::Io(e.into_error()))
    }
}

/// A row read back from a result table.
///
/// Columns stay textual because the deposit may be empty or flagged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableRow {
    #[serde(rename = "Energy_MeV")]
    pub energy_mev: f64,
    #[serde(rename = "Total_Deposit_MeV")]
    pub total_deposit: String,
    #[serde(rename = "Ionization_Loss")]
    pub ionization_loss: String,
    #[serde(rename = "Radiative_Loss")]
    pub radiative_loss: String,
    #[serde(rename = "Process_Info")]
    pub process_info: String,
}

impl TableRow {
    pub fn deposit_mev(&self) -> Option<f64> {
        self.total_deposit.trim().parse().ok()
    }
}

pub fn read_table(path: &Path) -> Result<Vec<TableRow>, TableError> {
    let path_str = path.to_string_lossy().to_string();
    let reader = csv::Reader::from_path(path).map_err(|e| TableError::Open {
        path: path_str.clone(),
        source: e,
    })?;
    read_rows(reader, &path_str)
}

pub fn read_table_from<R: io::Read>(inner: R) -> Result<Vec<TableRow>, TableError> {
    read_rows(csv::Reader::from_reader(inner), "<reader>")
}

fn read_rows<R: io::Read>(mut reader: csv::Reader<R>, origin: &str) -> Result<Vec<TableRow>, TableError> {
    let headers = reader.headers()?.clone();
    if headers.iter().ne(HEADER.iter().copied()) {
        return Err(TableError::Header {
            path: origin.to_string(),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }
    reader
        .deserialize()
        .collect::<Result<Vec<TableRow>, csv::Error>>()
        .map_err(TableError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scrape::scrape;
    use tempfile::tempdir;

    fn record_for(energy: f64, output: &str, failure: Option<&str>) -> RunRecord {
        RunRecord::assemble(EnergyPoint::from_mev(energy), &scrape(output), failure)
    }

    fn written(records: &[RunRecord]) -> String {
        let mut table = ResultTable::from_writer(Vec::new()).unwrap();
        for record in records {
            table.append(record).unwrap();
        }
        String::from_utf8(table.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn header_is_written_before_any_row() {
        let csv = written(&[]);
        assert_eq!(
            csv.lines().collect::<Vec<_>>(),
            vec!["Energy_MeV,Total_Deposit_MeV,Ionization_Loss,Radiative_Loss,Process_Info"]
        );
    }

    #[test]
    fn rows_follow_append_order() {
        let csv = written(&[
            record_for(1.0, "Total energy deposit: 1.4847 MeV", None),
            record_for(2.0, "Total energy deposit: 2.5513 MeV", None),
        ]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1,1.4847,unavailable,unavailable,");
        assert_eq!(lines[2], "2,2.5513,unavailable,unavailable,");
    }

    #[test]
    fn missing_deposit_renders_empty_but_missing_loss_renders_sentinel() {
        let record = record_for(5.0, "nothing useful", None);
        assert_eq!(record.total_deposit, Field::Unavailable);
        assert_eq!(record.deposit_text(), "");
        assert_eq!(record.ionization_text(), UNAVAILABLE);
        assert_eq!(record.radiative_text(), UNAVAILABLE);
    }

    #[test]
    fn failed_run_flags_missing_fields_and_process_info() {
        let record = record_for(5.0, "", Some("exit status: 1"));
        assert_eq!(
            record.total_deposit,
            Field::Error("exit status: 1".to_string())
        );
        assert_eq!(record.deposit_text(), ERROR_MARKER);
        assert_eq!(record.ionization_text(), ERROR_MARKER);
        assert_eq!(record.process_info, "run failed: exit status: 1");
    }

    #[test]
    fn failed_run_keeps_values_that_were_printed() {
        let record = record_for(
            5.0,
            "Total energy deposit: 3 MeV\nPhysics list: opt4",
            Some("signal: 11"),
        );
        assert_eq!(record.total_deposit, Field::Value(3.0));
        assert_eq!(
            record.process_info,
            "run failed: signal: 11; Physics list: opt4"
        );
    }

    #[test]
    fn process_info_with_separators_is_quoted() {
        let record = record_for(
            1.0,
            "Process calls, frequency\nphysics \"list\"",
            None,
        );
        let csv = written(&[record]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "1,,unavailable,unavailable,\"Process calls, frequency; physics \"\"list\"\"\""
        );
    }

    #[test]
    fn has_loss_value_requires_a_scraped_loss() {
        let without = record_for(1.0, "muIoni: table from 100 eV", None);
        assert!(!without.has_loss_value());

        let with = record_for(1.0, "muBrems mean loss 0.2 MeV", None);
        assert!(with.has_loss_value());
        assert_eq!(with.radiative_loss.value().map(String::as_str), Some("0.2 MeV"));
    }

    #[test]
    fn table_written_to_disk_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        {
            let mut table = ResultTable::create(&path).unwrap();
            table
                .append(&record_for(100.0, "Total energy deposit: 150 keV", None))
                .unwrap();
            table.append(&record_for(200.0, "", Some("exit status: 2"))).unwrap();
            assert_eq!(table.rows(), 2);
        }

        let rows = read_table(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].energy_mev, 100.0);
        assert_eq!(rows[0].deposit_mev(), Some(0.15));
        assert_eq!(rows[1].total_deposit, ERROR_MARKER);
        assert_eq!(rows[1].deposit_mev(), None);
        assert_eq!(rows[1].process_info, "run failed: exit status: 2");
    }

    #[test]
    fn kev_deposit_is_written_without_float_noise() {
        let csv = written(&[record_for(1.0, "Total energy deposit: 1484.7 keV", None)]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "1,1.4847,unavailable,unavailable,");
    }

    #[test]
    fn reader_rejects_foreign_header() {
        let data = "a,b,c\n1,2,3\n";
        let result = read_table_from(data.as_bytes());
        assert!(matches!(result, Err(TableError::Header { .. })));
    }

    #[test]
    fn create_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let result = ResultTable::create(&dir.path().join("missing/dir/out.csv"));
        assert!(matches!(result, Err(TableError::Open { .. })));
    }
}
