use crate::core::table::RunRecord;
use std::fmt;

/// Status of one finished sweep point, as shown on the status stream.
#[derive(Debug, Clone, PartialEq)]
pub struct PointReport {
    pub index: usize,
    pub total: usize,
    pub energy: String,
    pub deposit: String,
    pub ionization: String,
    pub radiative: String,
    pub failure: Option<String>,
}

impl PointReport {
    pub fn new(index: usize, total: usize, record: &RunRecord) -> Self {
        Self {
            index,
            total,
            energy: record.energy.to_string(),
            deposit: record.deposit_text(),
            ionization: record.ionization_text(),
            radiative: record.radiative_text(),
            failure: record.failure.clone(),
        }
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.index + 1) as f64 * 100.0 / self.total as f64
    }
}

impl fmt::Display for PointReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deposit = if self.deposit.is_empty() {
            "-"
        } else {
            self.deposit.as_str()
        };
        write!(
            f,
            "[{}/{}] {:5.1}% E = {} MeV | deposit = {} MeV | ionization = {} | radiative = {}",
            self.index + 1,
            self.total,
            self.percent(),
            self.energy,
            deposit,
            self.ionization,
            self.radiative
        )?;
        if let Some(cause) = &self.failure {
            write!(f, " | FAILED ({})", cause)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    PointComplete(PointReport),
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::energy::EnergyPoint;
    use crate::core::scrape::scrape;
    use std::sync::{Arc, Mutex};

    #[test]
    fn point_report_formats_index_percentage_and_values() {
        let record = RunRecord::assemble(
            EnergyPoint::from_mev(2.0),
            &scrape("Total energy deposit: 2.5513 MeV"),
            None,
        );
        let report = PointReport::new(1, 4, &record);
        assert_eq!(
            report.to_string(),
            "[2/4]  50.0% E = 2 MeV | deposit = 2.5513 MeV | ionization = unavailable | radiative = unavailable"
        );
    }

    #[test]
    fn point_report_marks_failed_runs() {
        let record = RunRecord::assemble(EnergyPoint::from_mev(3.0), &scrape(""), Some("signal: 9"));
        let text = PointReport::new(0, 1, &record).to_string();
        assert!(text.starts_with("[1/1] 100.0% E = 3 MeV | deposit = error MeV"));
        assert!(text.ends_with("| FAILED (signal: 9)"));
    }

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::TaskIncrement);
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(format!("{:?}", event));
        }));

        reporter.report(Progress::PhaseStart { name: "Sweep" });
        reporter.report(Progress::Message("hello".into()));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("Sweep"));
        assert!(seen[1].contains("hello"));
    }
}
