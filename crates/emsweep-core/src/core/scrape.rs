//! Line rules that mine values out of TestEm1 console output.
//!
//! Geant4 offers no structured output contract for this example, so every
//! value is located by keyword matching on free text. The rules live here and
//! nowhere else; swapping to a structured source only touches this module.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Maximum number of process/physics lines kept for the excerpt field.
pub const MAX_PROCESS_LINES: usize = 3;

/// Maximum number of radiative lines echoed for high-energy points.
pub const MAX_RADIATIVE_EXCERPT_LINES: usize = 3;

/// Separator joining excerpt lines into a single field.
pub const EXCERPT_SEPARATOR: &str = "; ";

static DEPOSIT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Total energy deposit[^0-9+\-.]*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*([A-Za-z]+)?",
    )
    .expect("deposit pattern is valid")
});

static IONIZATION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\w*ioni(?:[sz]ation)?\b").expect("ionization pattern is valid"));

static RADIATIVE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\w*brem\w*\b|radiative").expect("radiative pattern is valid"));

static RADIATIVE_EXCERPT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\w*brem\w*\b|radiative|\w*pairprod\w*|pair[ -]production")
        .expect("radiative excerpt pattern is valid")
});

static PROCESS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bprocess(?:es)?\b|physics").expect("process pattern is valid"));

static VERBOSITY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)verbose").expect("verbosity pattern is valid"));

static LOSS_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?\s*[kM]eV")
        .expect("loss value pattern is valid")
});

/// The "Total energy deposit" reading as printed, before unit normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositReading {
    pub value: f64,
    pub unit: Option<String>,
}

impl DepositReading {
    /// Converts the reading to MeV. Only `keV` is converted; any other or
    /// missing unit passes the value through unchanged.
    pub fn to_mev(&self) -> f64 {
        match self.unit.as_deref() {
            Some("keV") => to_significant_digits(self.value / 1000.0),
            Some("MeV") | None => self.value,
            Some(other) => {
                debug!(unit = other, "Unrecognized deposit unit; keeping raw value.");
                self.value
            }
        }
    }
}

/// Significant digits kept after a unit conversion. Console values carry far
/// fewer, so this only strips the binary noise of the division.
const CONVERTED_SIGNIFICANT_DIGITS: usize = 12;

fn to_significant_digits(value: f64) -> f64 {
    format!("{:.*e}", CONVERTED_SIGNIFICANT_DIGITS - 1, value)
        .parse()
        .unwrap_or(value)
}

/// Everything the line rules found in one run's console output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedRun {
    pub deposit: Option<DepositReading>,
    pub ionization_line: Option<String>,
    pub radiative_line: Option<String>,
    pub process_lines: Vec<String>,
    pub radiative_excerpt: Vec<String>,
}

impl ScrapedRun {
    pub fn deposit_mev(&self) -> Option<f64> {
        self.deposit.as_ref().map(DepositReading::to_mev)
    }

    pub fn ionization_loss(&self) -> Option<String> {
        self.ionization_line.as_deref().and_then(extract_loss_value)
    }

    pub fn radiative_loss(&self) -> Option<String> {
        self.radiative_line.as_deref().and_then(extract_loss_value)
    }

    pub fn process_info(&self) -> String {
        self.process_lines.join(EXCERPT_SEPARATOR)
    }
}

/// Runs every line rule over the captured output in a single pass.
pub fn scrape(output: &str) -> ScrapedRun {
    let mut run = ScrapedRun::default();

    for raw_line in output.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if run.deposit.is_none() {
            run.deposit = parse_deposit_line(line);
        }
        if run.ionization_line.is_none() && IONIZATION_LINE.is_match(line) {
            run.ionization_line = Some(line.to_string());
        }
        if run.radiative_line.is_none() && RADIATIVE_LINE.is_match(line) {
            run.radiative_line = Some(line.to_string());
        }
        if run.process_lines.len() < MAX_PROCESS_LINES
            && PROCESS_LINE.is_match(line)
            && !VERBOSITY_LINE.is_match(line)
        {
            run.process_lines.push(line.to_string());
        }
        if run.radiative_excerpt.len() < MAX_RADIATIVE_EXCERPT_LINES
            && RADIATIVE_EXCERPT_LINE.is_match(line)
        {
            run.radiative_excerpt.push(line.to_string());
        }
    }

    run
}

/// Parses a "Total energy deposit" line into its value and unit.
///
/// Returns `None` when the line is not a deposit line or its number is garbled.
pub fn parse_deposit_line(line: &str) -> Option<DepositReading> {
    let captures = DEPOSIT_LINE.captures(line)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2).map(|m| m.as_str().to_string());
    Some(DepositReading { value, unit })
}

/// Extracts the first `<number><ws?>keV|MeV` run from a matched loss line.
pub fn extract_loss_value(line: &str) -> Option<String> {
    LOSS_VALUE.find(line).map(|m| m.as_str().to_string())
}
