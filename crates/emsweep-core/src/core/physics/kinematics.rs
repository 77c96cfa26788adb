use super::materials::Particle;

/// Relativistic quantities of a particle with a given kinetic energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub kinetic_mev: f64,
    pub gamma: f64,
    pub beta: f64,
    pub momentum_mev: f64,
    pub total_energy_mev: f64,
}

impl Kinematics {
    pub fn from_kinetic(kinetic_mev: f64, particle: &Particle) -> Self {
        let mass = particle.mass_mev;
        let total_energy_mev = kinetic_mev + mass;
        let gamma = total_energy_mev / mass;
        let beta = (1.0 - 1.0 / (gamma * gamma)).max(0.0).sqrt();
        let momentum_mev = (kinetic_mev * (kinetic_mev + 2.0 * mass)).max(0.0).sqrt();
        Self {
            kinetic_mev,
            gamma,
            beta,
            momentum_mev,
            total_energy_mev,
        }
    }

    #[inline]
    pub fn beta_squared(&self) -> f64 {
        self.beta * self.beta
    }

    #[inline]
    pub fn beta_gamma(&self) -> f64 {
        self.beta * self.gamma
    }
}
