use super::NumericError;

/// A least-squares line `y = slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self, NumericError> {
        if xs.len() != ys.len() {
            return Err(NumericError::LengthMismatch {
                x_len: xs.len(),
                y_len: ys.len(),
            });
        }
        if xs.len() < 2 {
            return Err(NumericError::TooFewPoints {
                required: 2,
                found: xs.len(),
            });
        }

        let n = xs.len() as f64;
        let x_mean = xs.iter().sum::<f64>() / n;
        let y_mean = ys.iter().sum::<f64>() / n;

        let (sxy, sxx) = xs
            .iter()
            .zip(ys)
            .fold((0.0, 0.0), |(sxy, sxx), (&x, &y)| {
                let dx = x - x_mean;
                (sxy + dx * (y - y_mean), sxx + dx * dx)
            });

        if sxx == 0.0 {
            return Err(NumericError::DegenerateAbscissae);
        }

        let slope = sxy / sxx;
        Ok(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }

    /// Fits `log10(y) = s·log10(x) + c`, i.e. the power law `y ∝ x^s`.
    ///
    /// Pairs with a non-positive coordinate are dropped before fitting.
    pub fn fit_power_law(xs: &[f64], ys: &[f64]) -> Result<Self, NumericError> {
        if xs.len() != ys.len() {
            return Err(NumericError::LengthMismatch {
                x_len: xs.len(),
                y_len: ys.len(),
            });
        }
        let (log_x, log_y): (Vec<f64>, Vec<f64>) = xs
            .iter()
            .zip(ys)
            .filter(|&(&x, &y)| x > 0.0 && y > 0.0)
            .map(|(&x, &y)| (x.log10(), y.log10()))
            .unzip();
        Self::fit(&log_x, &log_y)
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fit_recovers_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.5 * x - 1.0).collect();
        let fit = LinearFit::fit(&xs, &ys).unwrap();
        assert_relative_eq!(fit.slope, 2.5, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, -1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.eval(10.0), 24.0, epsilon = 1e-10);
    }

    #[test]
    fn power_law_fit_recovers_exponent() {
        let xs = [1.0e6, 1.0e7, 1.0e8, 1.0e9];
        let ys: Vec<f64> = xs.iter().map(|x: &f64| 3.0 * x.powf(0.05)).collect();
        let fit = LinearFit::fit_power_law(&xs, &ys).unwrap();
        assert_relative_eq!(fit.slope, 0.05, epsilon = 1e-10);
        assert_relative_eq!(fit.intercept, 3.0_f64.log10(), epsilon = 1e-10);
    }

    #[test]
    fn fit_rejects_mismatched_and_short_inputs() {
        assert_eq!(
            LinearFit::fit(&[1.0, 2.0], &[1.0]),
            Err(NumericError::LengthMismatch { x_len: 2, y_len: 1 })
        );
        assert_eq!(
            LinearFit::fit(&[1.0], &[1.0]),
            Err(NumericError::TooFewPoints {
                required: 2,
                found: 1
            })
        );
    }

    #[test]
    fn fit_rejects_constant_abscissae() {
        assert_eq!(
            LinearFit::fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(NumericError::DegenerateAbscissae)
        );
    }
}
