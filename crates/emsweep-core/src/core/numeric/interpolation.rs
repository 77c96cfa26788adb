use super::NumericError;

/// `points` evenly spaced values from `start` to `end`, both inclusive.
pub fn lin_space(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points).map(|i| start + step * i as f64).collect()
        }
    }
}

/// `points` logarithmically spaced values from `start` to `end` (both > 0).
pub fn log_space(start: f64, end: f64, points: usize) -> Vec<f64> {
    lin_space(start.log10(), end.log10(), points)
        .into_iter()
        .map(|exponent| 10f64.powf(exponent))
        .collect()
}

/// Cubic spline through a set of knots with not-a-knot end conditions.
///
/// The third derivative is continuous across the second and the next-to-last
/// knot, so four or more samples of a cubic are reproduced exactly. With three
/// knots the spline is the parabola through them. Queries outside the knot
/// range extrapolate with the polynomial of the nearest end segment.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    pub const MIN_KNOTS: usize = 3;

    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, NumericError> {
        if xs.len() != ys.len() {
            return Err(NumericError::LengthMismatch {
                x_len: xs.len(),
                y_len: ys.len(),
            });
        }
        if xs.len() < Self::MIN_KNOTS {
            return Err(NumericError::TooFewPoints {
                required: Self::MIN_KNOTS,
                found: xs.len(),
            });
        }
        if let Some(index) = xs.windows(2).position(|w| w[1] <= w[0]) {
            return Err(NumericError::NotIncreasing { index: index + 1 });
        }

        let second_derivatives = solve_not_a_knot_moments(xs, ys);
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            second_derivatives,
        })
    }

    pub fn eval(&self, x: f64) -> f64 {
        let last_segment = self.xs.len() - 2;
        let segment = self
            .xs
            .partition_point(|&knot| knot <= x)
            .saturating_sub(1)
            .min(last_segment);

        let (x0, x1) = (self.xs[segment], self.xs[segment + 1]);
        let (y0, y1) = (self.ys[segment], self.ys[segment + 1]);
        let (m0, m1) = (
            self.second_derivatives[segment],
            self.second_derivatives[segment + 1],
        );
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

/// Solves for the knot second derivatives (moments).
///
/// The two end moments are eliminated through the not-a-knot conditions,
/// which leaves a tridiagonal system over the interior knots for the Thomas
/// algorithm. Three knots have a single interior equation and a constant
/// moment.
fn solve_not_a_knot_moments(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let rhs: Vec<f64> = (0..n - 2)
        .map(|j| 6.0 * ((ys[j + 2] - ys[j + 1]) / h[j + 1] - (ys[j + 1] - ys[j]) / h[j]))
        .collect();

    if n == 3 {
        let moment = rhs[0] / (3.0 * (h[0] + h[1]));
        return vec![moment; 3];
    }

    let interior = n - 2;
    let mut sub = vec![0.0; interior];
    let mut diag = vec![0.0; interior];
    let mut sup = vec![0.0; interior];
    for j in 0..interior {
        sub[j] = h[j];
        diag[j] = 2.0 * (h[j] + h[j + 1]);
        sup[j] = h[j + 1];
    }

    // M0 = ((h0 + h1) M1 - h0 M2) / h1
    let (h0, h1) = (h[0], h[1]);
    diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
    sup[0] = (h1 * h1 - h0 * h0) / h1;
    sub[0] = 0.0;

    // M[n-1] = ((a + b) M[n-2] - b M[n-3]) / a
    let (a, b) = (h[n - 3], h[n - 2]);
    let last = interior - 1;
    diag[last] = (a + b) * (2.0 * a + b) / a;
    sub[last] = (a * a - b * b) / a;
    sup[last] = 0.0;

    let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs);

    let mut moments = vec![0.0; n];
    moments[1..n - 1].copy_from_slice(&inner);
    moments[0] = ((h0 + h1) * moments[1] - h0 * moments[2]) / h1;
    moments[n - 1] = ((a + b) * moments[n - 2] - b * moments[n - 3]) / a;
    moments
}

/// Thomas algorithm. `sub[0]` and the last `sup` entry are ignored.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let m = diag.len();
    let mut c_prime = vec![0.0; m];
    let mut d_prime = vec![0.0; m];

    c_prime[0] = sup[0] / diag[0];
    d_prime[0] = rhs[0] / diag[0];
    for j in 1..m {
        let denom = diag[j] - sub[j] * c_prime[j - 1];
        c_prime[j] = sup[j] / denom;
        d_prime[j] = (rhs[j] - sub[j] * d_prime[j - 1]) / denom;
    }

    let mut x = vec![0.0; m];
    x[m - 1] = d_prime[m - 1];
    for j in (0..m - 1).rev() {
        x[j] = d_prime[j] - c_prime[j] * x[j + 1];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lin_space_includes_both_ends() {
        assert_eq!(lin_space(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(lin_space(3.0, 9.0, 1), vec![3.0]);
        assert!(lin_space(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn log_space_spans_decades() {
        let values = log_space(1.0, 1000.0, 4);
        let expected = [1.0, 10.0, 100.0, 1000.0];
        for (v, e) in values.iter().zip(expected) {
            assert_relative_eq!(*v, e, max_relative = 1e-12);
        }
    }

    #[test]
    fn spline_passes_through_every_knot() {
        let xs = [0.0, 1.0, 2.5, 4.0, 5.0];
        let ys = [1.0, 3.0, -1.0, 2.0, 0.5];
        let spline = CubicSpline::new(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys) {
            assert_relative_eq!(spline.eval(*x), y, epsilon = 1e-12);
        }
    }

    #[test]
    fn spline_reproduces_linear_data_everywhere() {
        let xs = [0.0, 1.0, 3.0, 6.0];
        let ys: Vec<f64> = xs.iter().map(|x| 0.5 * x + 2.0).collect();
        let spline = CubicSpline::new(&xs, &ys).unwrap();

        for x in [0.5, 2.0, 4.5, 5.9] {
            assert_relative_eq!(spline.eval(x), 0.5 * x + 2.0, epsilon = 1e-12);
        }
        // Extrapolation continues the end segments.
        assert_relative_eq!(spline.eval(-2.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(spline.eval(8.0), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn three_knots_give_the_parabola_through_them() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 0.0];
        let spline = CubicSpline::new(&xs, &ys).unwrap();
        // y = 1 - (x - 1)^2
        for x in [-0.5, 0.25, 0.5, 1.5, 2.5] {
            assert_relative_eq!(spline.eval(x), 1.0 - (x - 1.0).powi(2), epsilon = 1e-12);
        }
    }

    #[test]
    fn four_samples_of_a_cubic_are_reproduced_exactly() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x: &f64| x.powi(3)).collect();
        let spline = CubicSpline::new(&xs, &ys).unwrap();

        assert_relative_eq!(spline.eval(0.5), 0.125, epsilon = 1e-12);
        assert_relative_eq!(spline.eval(1.5), 3.375, epsilon = 1e-12);
        assert_relative_eq!(spline.eval(2.75), 2.75f64.powi(3), epsilon = 1e-12);
    }

    #[test]
    fn uneven_knots_reproduce_a_cubic() {
        let cubic = |x: f64| 2.0 * x.powi(3) - x * x + 0.5 * x - 3.0;
        let xs = [-1.0, 0.2, 0.5, 1.7, 2.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|&x| cubic(x)).collect();
        let spline = CubicSpline::new(&xs, &ys).unwrap();

        for x in [-0.7, 0.35, 1.0, 1.9, 3.1] {
            assert_relative_eq!(spline.eval(x), cubic(x), epsilon = 1e-9);
        }
    }

    #[test]
    fn spline_rejects_invalid_knots() {
        assert_eq!(
            CubicSpline::new(&[0.0, 1.0], &[0.0, 1.0]).unwrap_err(),
            NumericError::TooFewPoints {
                required: 3,
                found: 2
            }
        );
        assert_eq!(
            CubicSpline::new(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]).unwrap_err(),
            NumericError::NotIncreasing { index: 2 }
        );
        assert_eq!(
            CubicSpline::new(&[0.0, 1.0, 2.0], &[0.0, 1.0]).unwrap_err(),
            NumericError::LengthMismatch { x_len: 3, y_len: 2 }
        );
    }
}
