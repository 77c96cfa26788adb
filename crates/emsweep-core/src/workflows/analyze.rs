use crate::core::numeric::interpolation::{CubicSpline, log_space};
use crate::core::numeric::regression::LinearFit;
use crate::core::numeric::statistics::{Summary, argmin};
use crate::core::physics::bethe_bloch::{mean_energy_loss, theory_curve};
use crate::core::physics::kinematics::Kinematics;
use crate::core::table::{TableRow, read_table};
use crate::engine::config::AnalysisConfig;
use crate::engine::error::{AnalysisError, EngineError};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Energy bands summarized in the report: `(name, min MeV, max MeV, regime)`.
pub const REGIONS: [(&str, f64, f64, &str); 7] = [
    ("Very low energy", 1.0, 50.0, "1/beta^2 dominated"),
    ("Low energy", 50.0, 200.0, "transition to relativistic"),
    ("Minimum region", 200.0, 1.0e3, "minimum ionization"),
    ("Relativistic", 1.0e3, 5.0e4, "relativistic plateau"),
    ("Ultra-high GeV", 5.0e4, 1.0e6, "density effect"),
    ("TeV scale", 1.0e6, 1.0e8, "onset of radiative losses"),
    ("PeV scale", 1.0e8, 1.0e9, "ultra-extreme regime"),
];

/// Coarse kinematic bands: `(name, min MeV, max MeV)`.
pub const BANDS: [(&str, f64, f64); 3] = [
    ("Non-relativistic", 1.0, 100.0),
    ("Relativistic", 100.0, 1.0e4),
    ("Ultra-relativistic", 1.0e4, 1.0e9),
];

/// A band is reported once it holds more than this many points.
const MIN_BAND_POINTS: usize = 1;

/// Sub-ranges fitted with a power law `dE/dx ∝ E^s`.
pub const TREND_RANGES: [(&str, f64, f64); 5] = [
    ("1-10 GeV", 1.0e3, 1.0e4),
    ("10 GeV - 1 TeV", 1.0e4, 1.0e6),
    ("1 TeV - 1 PeV", 1.0e6, 1.0e9),
    ("1-100 TeV", 1.0e6, 1.0e8),
    ("100 TeV - 1 PeV", 1.0e8, 1.0e9),
];

/// Minimum number of distinct usable rows; the log-log spline needs three knots.
pub const MIN_USABLE_ROWS: usize = CubicSpline::MIN_KNOTS;

/// A fit needs more than this many points inside its range.
const MIN_TREND_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IonizationMinimum {
    pub energy_mev: f64,
    pub deposit_mev: f64,
    pub kinematics: Kinematics,
    /// Set when no data point fell inside the search window and the global
    /// minimum was used instead.
    pub window_fallback: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub name: &'static str,
    pub regime: &'static str,
    pub first_energy_mev: f64,
    pub last_energy_mev: f64,
    pub deposit: Summary,
    /// Mean deposit of the region divided by the minimum deposit.
    pub increase_factor: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandSummary {
    pub name: &'static str,
    pub first_energy_mev: f64,
    pub last_energy_mev: f64,
    pub points: usize,
    pub mean_deposit_mev: f64,
    /// Last deposit in the band divided by the minimum deposit.
    pub increase_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Constant,
    Gradual,
    Significant,
}

impl Trend {
    pub fn classify(slope: f64) -> Self {
        if slope.abs() < 0.001 {
            Trend::Constant
        } else if slope > 0.01 {
            Trend::Significant
        } else {
            Trend::Gradual
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Trend::Constant => "practically constant",
            Trend::Gradual => "very gradual logarithmic rise",
            Trend::Significant => "significant logarithmic rise",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendFit {
    pub label: &'static str,
    pub points: usize,
    pub slope: f64,
    /// Last deposit in the range over the first.
    pub range_increase: f64,
    /// Last deposit in the range over the minimum deposit.
    pub increase_from_minimum: f64,
    pub trend: Trend,
}

/// One row of the exported curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    #[serde(rename = "Energy_MeV")]
    pub energy_mev: f64,
    #[serde(rename = "Interpolated_Deposit_MeV")]
    pub interpolated_deposit_mev: f64,
    #[serde(rename = "Ratio_To_Minimum")]
    pub ratio_to_minimum: f64,
    /// Theory value for the 1 mm slab; empty where the formula is undefined.
    #[serde(rename = "Bethe_Bloch_MeV_per_mm")]
    pub bethe_bloch_mev_per_mm: Option<f64>,
}

/// One sample of the standalone Bethe-Bloch curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TheoryPoint {
    #[serde(rename = "Energy_MeV")]
    pub energy_mev: f64,
    #[serde(rename = "Bethe_Bloch_MeV_per_cm")]
    pub mev_per_cm: f64,
    #[serde(rename = "Bethe_Bloch_MeV_per_mm")]
    pub mev_per_mm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub rows_total: usize,
    pub rows_used: usize,
    pub energy_range_mev: (f64, f64),
    pub minimum: IonizationMinimum,
    pub regions: Vec<RegionSummary>,
    pub bands: Vec<BandSummary>,
    pub trends: Vec<TrendFit>,
    pub curve: Vec<CurvePoint>,
    /// Formula sampled over the configured theory range, undefined points dropped.
    pub theory: Vec<TheoryPoint>,
}

impl AnalysisReport {
    pub fn write_curve_csv(&self, path: &Path) -> Result<(), AnalysisError> {
        export_csv(path, &self.curve)?;
        info!("Curve data written to {:?}", path);
        Ok(())
    }

    pub fn write_curve_to<W: Write>(&self, inner: W) -> Result<(), csv::Error> {
        serialize_rows(inner, &self.curve)
    }

    pub fn write_theory_csv(&self, path: &Path) -> Result<(), AnalysisError> {
        export_csv(path, &self.theory)?;
        info!("Theory curve written to {:?}", path);
        Ok(())
    }

    /// Theory sample with the lowest stopping power.
    pub fn theory_minimum(&self) -> Option<&TheoryPoint> {
        self.theory
            .iter()
            .min_by(|a, b| a.mev_per_cm.total_cmp(&b.mev_per_cm))
    }
}

fn export_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), AnalysisError> {
    let path_str = path.to_string_lossy().to_string();
    let file = File::create(path).map_err(|e| AnalysisError::CurveExport {
        path: path_str.clone(),
        source: e.into(),
    })?;
    serialize_rows(file, rows).map_err(|source| AnalysisError::CurveExport {
        path: path_str,
        source,
    })
}

fn serialize_rows<W: Write, T: Serialize>(inner: W, rows: &[T]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(inner);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.energy_range_mev;
        writeln!(
            f,
            "Dataset: {} usable row(s) of {}, {} - {} MeV",
            self.rows_used, self.rows_total, lo, hi
        )?;
        writeln!(f)?;

        let m = &self.minimum;
        writeln!(
            f,
            "Ionization minimum: {:.4} MeV deposited at {} MeV{}",
            m.deposit_mev,
            m.energy_mev,
            if m.window_fallback {
                " (no data in search window; global minimum)"
            } else {
                ""
            }
        )?;
        writeln!(
            f,
            "  beta = {:.4} | gamma = {:.3} | p = {:.1} MeV/c | E_total = {:.1} MeV",
            m.kinematics.beta,
            m.kinematics.gamma,
            m.kinematics.momentum_mev,
            m.kinematics.total_energy_mev
        )?;
        if let Some(theory) = self.theory_minimum() {
            writeln!(
                f,
                "  Bethe-Bloch minimum: {:.4} MeV/cm ({:.4} MeV/mm) at {:.1} MeV",
                theory.mev_per_cm, theory.mev_per_mm, theory.energy_mev
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Regions:")?;
        for region in &self.regions {
            writeln!(
                f,
                "  {:<16}: {:>10.1} - {:<10.0} MeV | points {:>2} | deposit {:.4} ± {:.4} MeV | range {:.4} - {:.4} | {:.3}x minimum | {}",
                region.name,
                region.first_energy_mev,
                region.last_energy_mev,
                region.deposit.count,
                region.deposit.mean,
                region.deposit.std_dev,
                region.deposit.min,
                region.deposit.max,
                region.increase_factor,
                region.regime
            )?;
        }

        if !self.bands.is_empty() {
            writeln!(f)?;
            writeln!(f, "Kinematic bands:")?;
            for band in &self.bands {
                writeln!(
                    f,
                    "  {:<18}: {:>10.0} - {:<10.0} MeV | points {:>2} | mean deposit {:.4} MeV | {:.2}x minimum",
                    band.name,
                    band.first_energy_mev,
                    band.last_energy_mev,
                    band.points,
                    band.mean_deposit_mev,
                    band.increase_factor
                )?;
            }
        }

        if !self.trends.is_empty() {
            writeln!(f)?;
            writeln!(f, "High-energy trends:")?;
            for fit in &self.trends {
                writeln!(
                    f,
                    "  {:<16}: dE/dx ∝ E^{:.6} over {} points | {:.4}x across range | {:.3}x minimum | {}",
                    fit.label,
                    fit.slope,
                    fit.points,
                    fit.range_increase,
                    fit.increase_from_minimum,
                    fit.trend
                )?;
            }
        }
        Ok(())
    }
}

/// Reads a result table from disk and analyzes it.
pub fn run_from_path(path: &Path, config: &AnalysisConfig) -> Result<AnalysisReport, EngineError> {
    let rows = read_table(path)?;
    info!("Loaded {} row(s) from {:?}", rows.len(), path);
    run(&rows, config)
}

/// Builds the curve report from result-table rows.
///
/// Rows without a positive deposit (empty, flagged or garbled) are skipped.
/// The remaining rows are sorted by energy; a repeated energy keeps its first
/// row.
#[instrument(skip_all, name = "analyze_workflow")]
pub fn run(rows: &[TableRow], config: &AnalysisConfig) -> Result<AnalysisReport, EngineError> {
    config.validate()?;

    let (energies, deposits) = usable_points(rows);
    if energies.len() < MIN_USABLE_ROWS {
        return Err(AnalysisError::InsufficientData {
            required: MIN_USABLE_ROWS,
            usable: energies.len(),
        }
        .into());
    }
    let energy_range_mev = (energies[0], energies[energies.len() - 1]);
    info!(
        usable = energies.len(),
        total = rows.len(),
        "Analyzing {} - {} MeV.",
        energy_range_mev.0,
        energy_range_mev.1
    );

    let minimum = find_minimum(&energies, &deposits, config);
    debug!(
        energy = minimum.energy_mev,
        deposit = minimum.deposit_mev,
        "Ionization minimum located."
    );

    let regions = REGIONS
        .iter()
        .filter_map(|&(name, lo, hi, regime)| {
            summarize_region(&energies, &deposits, name, lo, hi, regime, minimum.deposit_mev)
        })
        .collect();

    let bands = BANDS
        .iter()
        .filter_map(|&(name, lo, hi)| {
            summarize_band(&energies, &deposits, name, lo, hi, minimum.deposit_mev)
        })
        .collect();

    let trends = fit_trends(&energies, &deposits, minimum.deposit_mev)?;

    let curve = build_curve(&energies, &deposits, minimum.deposit_mev, config)?;
    let theory = build_theory(config);
    debug!(points = theory.len(), "Sampled the Bethe-Bloch curve.");

    Ok(AnalysisReport {
        rows_total: rows.len(),
        rows_used: energies.len(),
        energy_range_mev,
        minimum,
        regions,
        bands,
        trends,
        curve,
        theory,
    })
}

fn usable_points(rows: &[TableRow]) -> (Vec<f64>, Vec<f64>) {
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(rows.len());
    for row in rows {
        match row.deposit_mev() {
            Some(d) if d.is_finite() && d > 0.0 && row.energy_mev > 0.0 => {
                points.push((row.energy_mev, d));
            }
            _ => warn!(
                energy = row.energy_mev,
                deposit = %row.total_deposit,
                "Skipping row without a positive deposit."
            ),
        }
    }

    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    let before = points.len();
    points.dedup_by(|later, earlier| later.0 == earlier.0);
    if points.len() < before {
        warn!("Dropped {} row(s) with a repeated energy.", before - points.len());
    }

    points.into_iter().unzip()
}

fn find_minimum(energies: &[f64], deposits: &[f64], config: &AnalysisConfig) -> IonizationMinimum {
    let (lo, hi) = config.minimum_window_mev;
    let windowed: Vec<usize> = (0..energies.len())
        .filter(|&i| energies[i] >= lo && energies[i] <= hi)
        .collect();

    let (index, window_fallback) = if windowed.is_empty() {
        warn!("No data inside the minimum search window [{}, {}] MeV; using the global minimum.", lo, hi);
        (argmin(deposits).unwrap_or(0), true)
    } else {
        let window_deposits: Vec<f64> = windowed.iter().map(|&i| deposits[i]).collect();
        (windowed[argmin(&window_deposits).unwrap_or(0)], false)
    };

    IonizationMinimum {
        energy_mev: energies[index],
        deposit_mev: deposits[index],
        kinematics: Kinematics::from_kinetic(energies[index], &config.particle),
        window_fallback,
    }
}

fn in_range(energies: &[f64], lo: f64, hi: f64) -> std::ops::Range<usize> {
    let start = energies.partition_point(|&e| e < lo);
    let end = energies.partition_point(|&e| e <= hi);
    start..end.max(start)
}

fn summarize_region(
    energies: &[f64],
    deposits: &[f64],
    name: &'static str,
    lo: f64,
    hi: f64,
    regime: &'static str,
    minimum_deposit: f64,
) -> Option<RegionSummary> {
    let range = in_range(energies, lo, hi);
    let deposit = Summary::of(&deposits[range.clone()])?;
    Some(RegionSummary {
        name,
        regime,
        first_energy_mev: energies[range.start],
        last_energy_mev: energies[range.end - 1],
        increase_factor: deposit.mean / minimum_deposit,
        deposit,
    })
}

fn summarize_band(
    energies: &[f64],
    deposits: &[f64],
    name: &'static str,
    lo: f64,
    hi: f64,
    minimum_deposit: f64,
) -> Option<BandSummary> {
    let range = in_range(energies, lo, hi);
    if range.len() <= MIN_BAND_POINTS {
        return None;
    }
    let band_deposits = &deposits[range.clone()];
    Some(BandSummary {
        name,
        first_energy_mev: energies[range.start],
        last_energy_mev: energies[range.end - 1],
        points: range.len(),
        mean_deposit_mev: band_deposits.iter().sum::<f64>() / band_deposits.len() as f64,
        increase_factor: band_deposits[band_deposits.len() - 1] / minimum_deposit,
    })
}

fn fit_trends(
    energies: &[f64],
    deposits: &[f64],
    minimum_deposit: f64,
) -> Result<Vec<TrendFit>, AnalysisError> {
    let mut fits = Vec::new();
    for &(label, lo, hi) in &TREND_RANGES {
        let range = in_range(energies, lo, hi);
        if range.len() <= MIN_TREND_POINTS {
            debug!(label, points = range.len(), "Too few points for a trend fit.");
            continue;
        }
        let xs = &energies[range.clone()];
        let ys = &deposits[range];
        let fit = LinearFit::fit_power_law(xs, ys)?;
        let first = ys[0];
        let last = ys[ys.len() - 1];
        fits.push(TrendFit {
            label,
            points: xs.len(),
            slope: fit.slope,
            range_increase: last / first,
            increase_from_minimum: last / minimum_deposit,
            trend: Trend::classify(fit.slope),
        });
    }
    Ok(fits)
}

fn build_curve(
    energies: &[f64],
    deposits: &[f64],
    minimum_deposit: f64,
    config: &AnalysisConfig,
) -> Result<Vec<CurvePoint>, AnalysisError> {
    let log_e: Vec<f64> = energies.iter().map(|e| e.log10()).collect();
    let log_d: Vec<f64> = deposits.iter().map(|d| d.log10()).collect();
    let spline = CubicSpline::new(&log_e, &log_d)?;

    let (lo, hi) = (energies[0], energies[energies.len() - 1]);
    let curve = log_space(lo, hi, config.curve_points)
        .into_iter()
        .map(|energy_mev| {
            let interpolated = 10f64.powf(spline.eval(energy_mev.log10()));
            CurvePoint {
                energy_mev,
                interpolated_deposit_mev: interpolated,
                ratio_to_minimum: interpolated / minimum_deposit,
                // MeV/cm to MeV/mm
                bethe_bloch_mev_per_mm: mean_energy_loss(energy_mev, &config.particle, &config.material)
                    .filter(|loss| *loss > 0.0)
                    .map(|loss| loss / 10.0),
            }
        })
        .collect();
    Ok(curve)
}

fn build_theory(config: &AnalysisConfig) -> Vec<TheoryPoint> {
    let (lo, hi) = config.theory_range_mev;
    theory_curve(lo, hi, config.theory_points, &config.particle, &config.material)
        .into_iter()
        .map(|(energy_mev, mev_per_cm)| TheoryPoint {
            energy_mev,
            mev_per_cm,
            // MeV/cm to MeV/mm
            mev_per_mm: mev_per_cm / 10.0,
        })
        .collect()
}
