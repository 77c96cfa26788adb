use emsweep::core::template::DEFAULT_PLACEHOLDER;

/// Energies swept when neither the config file nor the command line names any.
pub const DEFAULT_ENERGIES_MEV: [f64; 24] = [
    0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 300.0, 500.0, 1.0e3, 2.0e3,
    5.0e3, 1.0e4, 1.0e5, 1.0e6, 1.0e7, 1.0e8, 2.0e8, 5.0e8, 1.0e9,
];

pub struct DefaultsConfig {
    pub executable: String,
    pub placeholder: String,
    pub energies_mev: Vec<f64>,
    pub radiative_echo_threshold_mev: f64,
    pub table: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            executable: "./TestEm1".to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            energies_mev: DEFAULT_ENERGIES_MEV.to_vec(),
            radiative_echo_threshold_mev: 1.0e6,
            table: "detailed_results.csv".to_string(),
        }
    }
}
