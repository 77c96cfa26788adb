use std::fmt;

/// A kinetic energy in MeV at which one simulation run is performed.
///
/// The [`Display`](fmt::Display) form is the shortest decimal string that
/// round-trips the value (`1`, `0.1`, `1000000000`). It is used both inside
/// rendered macros and as the first field of each result-table row.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct EnergyPoint(f64);

impl EnergyPoint {
    pub const fn from_mev(mev: f64) -> Self {
        Self(mev)
    }

    #[inline]
    pub const fn mev(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl From<f64> for EnergyPoint {
    fn from(mev: f64) -> Self {
        Self(mev)
    }
}

impl fmt::Display for EnergyPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Converts a list of plain MeV values into energy points, preserving order.
pub fn energy_points(values: &[f64]) -> Vec<EnergyPoint> {
    values.iter().copied().map(EnergyPoint::from_mev).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_shortest_decimal_form() {
        assert_eq!(EnergyPoint::from_mev(1.0).to_string(), "1");
        assert_eq!(EnergyPoint::from_mev(0.1).to_string(), "0.1");
        assert_eq!(EnergyPoint::from_mev(2.5).to_string(), "2.5");
        assert_eq!(EnergyPoint::from_mev(1.0e9).to_string(), "1000000000");
    }

    #[test]
    fn energy_points_preserves_input_order() {
        let points = energy_points(&[5.0, 1.0, 3.0]);
        let mev: Vec<f64> = points.iter().map(|p| p.mev()).collect();
        assert_eq!(mev, vec![5.0, 1.0, 3.0]);
    }

    #[test]
    fn non_finite_values_are_detected() {
        assert!(!EnergyPoint::from_mev(f64::NAN).is_finite());
        assert!(!EnergyPoint::from_mev(f64::INFINITY).is_finite());
        assert!(EnergyPoint::from_mev(100.0).is_finite());
    }
}
