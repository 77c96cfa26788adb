use super::kinematics::Kinematics;
use super::materials::{ELECTRON_MASS_MEV, MaterialProperties, Particle};
use crate::core::numeric::interpolation::log_space;

/// `4π N_A r_e² m_e c²` in MeV·cm²/mol.
pub const K_MEV_CM2_PER_MOL: f64 = 0.307075;

/// Above this kinetic energy the density-effect correction is applied.
const DENSITY_CORRECTION_ONSET_MEV: f64 = 100.0;

/// Below this kinetic energy the shell correction is applied.
const SHELL_CORRECTION_CUTOFF_MEV: f64 = 100.0;

/// Largest energy transfer to a free electron in a single collision, in MeV.
pub fn max_energy_transfer(kinematics: &Kinematics, particle: &Particle) -> f64 {
    let mass_ratio = ELECTRON_MASS_MEV / particle.mass_mev;
    let gamma = kinematics.gamma;
    2.0 * ELECTRON_MASS_MEV * kinematics.beta_squared() * gamma * gamma
        / (1.0 + 2.0 * gamma * mass_ratio + mass_ratio * mass_ratio)
}

/// Mean energy loss per unit path length in MeV/cm.
///
/// Includes a simplified density-effect correction above 100 MeV and an
/// empirical shell correction below it. Returns `None` outside the domain
/// where the logarithm is defined (particle at rest, non-physical input).
pub fn mean_energy_loss(
    kinetic_mev: f64,
    particle: &Particle,
    material: &MaterialProperties,
) -> Option<f64> {
    if !kinetic_mev.is_finite() || kinetic_mev <= 0.0 {
        return None;
    }

    let kinematics = Kinematics::from_kinetic(kinetic_mev, particle);
    let beta2 = kinematics.beta_squared();
    if beta2 <= 0.0 || beta2 >= 1.0 {
        return None;
    }

    let gamma = kinematics.gamma;
    let t_max = max_energy_transfer(&kinematics, particle);
    let excitation_mev = material.mean_excitation_ev * 1e-6;

    let argument =
        2.0 * ELECTRON_MASS_MEV * beta2 * gamma * gamma * t_max / (excitation_mev * excitation_mev);
    if argument <= 0.0 {
        return None;
    }

    let prefactor = material.loss_prefactor(K_MEV_CM2_PER_MOL);
    let main_term = prefactor / beta2 * (0.5 * argument.ln() - beta2);

    let density_correction = if kinetic_mev > DENSITY_CORRECTION_ONSET_MEV {
        let plasma_mev = material.plasma_energy_ev * 1e-6;
        (kinematics.beta_gamma().ln() + (plasma_mev / excitation_mev).ln() - 0.5).max(0.0)
    } else {
        0.0
    };

    let shell_correction = if kinetic_mev < SHELL_CORRECTION_CUTOFF_MEV {
        prefactor / beta2 * 0.1 * (SHELL_CORRECTION_CUTOFF_MEV / kinetic_mev).sqrt()
    } else {
        0.0
    };

    let loss = main_term - density_correction - shell_correction;
    loss.is_finite().then_some(loss)
}

/// Samples the formula on `points` log-spaced energies between `min_mev` and
/// `max_mev`, keeping only finite positive values.
pub fn theory_curve(
    min_mev: f64,
    max_mev: f64,
    points: usize,
    particle: &Particle,
    material: &MaterialProperties,
) -> Vec<(f64, f64)> {
    log_space(min_mev, max_mev, points)
        .into_iter()
        .filter_map(|e| {
            mean_energy_loss(e, particle, material)
                .filter(|&loss| loss > 0.0)
                .map(|loss| (e, loss))
        })
        .collect()
}
