/// Discrete plane wave carrying a Gaussian pulse.
///
/// `eps` and `mu` are the relative material parameters at the injection point,
/// which set the phase velocity of the wave on the grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GaussianPlaneWave {
    /// Delay of the pulse peak, in time steps.
    pub delay: f64,
    /// Width of the pulse, in time steps.
    pub width: f64,
    pub courant: f64,
    pub eps: f64,
    pub mu: f64,
}

impl GaussianPlaneWave {
    #[inline]
    pub fn new(delay: f64, width: f64, courant: f64, eps: f64, mu: f64) -> Self {
        Self { delay, width, courant, eps, mu }
    }

    /// Electric field of the wave at space index `m` and time index `q`.
    ///
    /// Both indices may be fractional, which is how the half cell and half step
    /// offsets of the staggered grid are expressed.
    #[inline]
    pub fn get_e(&self, m: f64, q: f64) -> f64 {
        let retarded = q - m * f64::sqrt(self.eps * self.mu) / self.courant;
        f64::exp(-((retarded - self.delay) / self.width).powi(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn peak_at_delay() {
        let source = GaussianPlaneWave::new(30.0, 10.0, 1.0, 9.0, 1.0);
        assert_relative_eq!(source.get_e(0.0, 30.0), 1.0);
        assert!(source.get_e(0.0, 29.0) < 1.0);
        assert!(source.get_e(0.0, 31.0) < 1.0);
    }

    #[test]
    fn one_width_from_peak() {
        let source = GaussianPlaneWave::new(30.0, 10.0, 1.0, 1.0, 1.0);
        assert_relative_eq!(source.get_e(0.0, 40.0), f64::exp(-1.0), max_relative = 1e-12);
        assert_relative_eq!(source.get_e(0.0, 20.0), f64::exp(-1.0), max_relative = 1e-12);
    }

    #[test]
    fn space_offset_acts_as_delay() {
        // n = 3 and Sc = 1 means half a cell costs 1.5 time steps
        let source = GaussianPlaneWave::new(30.0, 10.0, 1.0, 9.0, 1.0);
        assert_relative_eq!(
            source.get_e(-0.5, 12.5),
            source.get_e(0.0, 14.0),
            max_relative = 1e-12,
        );

        let slow = GaussianPlaneWave::new(30.0, 10.0, 0.5, 1.0, 1.0);
        assert_relative_eq!(slow.get_e(2.0, 40.0), slow.get_e(0.0, 36.0), max_relative = 1e-12);
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let source = GaussianPlaneWave::new(30.0, 10.0, 1.0, 9.0, 1.0);
        for q in 0..120 {
            for &m in &[-0.5, 0.0, 0.5] {
                let value = source.get_e(m, q as f64 + 0.5);
                assert!(value > 0.0 && value <= 1.0);
            }
        }
    }
}
