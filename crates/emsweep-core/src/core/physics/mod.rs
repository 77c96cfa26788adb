//! Relativistic kinematics and the Bethe-Bloch mean energy-loss formula used
//! to put a theory curve next to the simulated deposits.

pub mod bethe_bloch;
pub mod kinematics;
pub mod materials;
