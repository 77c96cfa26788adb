/// Electron rest mass in MeV.
pub const ELECTRON_MASS_MEV: f64 = 0.511;

/// A charged projectile, described by its rest mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub name: &'static str,
    pub mass_mev: f64,
}

pub const MUON: Particle = Particle {
    name: "mu-",
    mass_mev: 105.66,
};

/// Absorber properties entering the Bethe-Bloch formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProperties {
    pub name: &'static str,
    pub atomic_number: f64,
    /// g/mol
    pub atomic_mass: f64,
    /// g/cm³
    pub density: f64,
    pub mean_excitation_ev: f64,
    pub plasma_energy_ev: f64,
}

impl MaterialProperties {
    /// `K·Z/A·ρ` in MeV/cm, the common prefactor of every loss term.
    pub fn loss_prefactor(&self, k: f64) -> f64 {
        k * self.atomic_number / self.atomic_mass * self.density
    }
}

pub const COPPER: MaterialProperties = MaterialProperties {
    name: "G4_Cu",
    atomic_number: 29.0,
    atomic_mass: 63.5,
    density: 8.96,
    mean_excitation_ev: 322.0,
    plasma_energy_ev: 28.8,
};
