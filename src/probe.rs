//! Field recording at fixed grid nodes.

use ndarray::{s, Array1, ArrayView1};

/// Records the time history of the fields at one grid node.
#[derive(Clone, Debug)]
pub struct Probe {
    position: usize,
    ez: Array1<f64>,
    hy: Array1<f64>,
    time: usize,
}

impl Probe {
    /// Creates a probe at `position` with room for `history_len` time steps.
    pub fn new(position: usize, history_len: usize) -> Self {
        Self {
            position,
            ez: Array1::zeros(history_len),
            hy: Array1::zeros(history_len),
            time: 0,
        }
    }

    /// Appends the field values at the probe position.
    ///
    /// The last electric node has no magnetic node to its right, so a probe
    /// there records zero for `hy`. Fields that do not reach the probe position
    /// are skipped.
    pub fn add_data(&mut self, ez: ArrayView1<f64>, hy: ArrayView1<f64>) {
        let value = match ez.get(self.position) {
            Some(&value) => value,
            None => {
                log::warn!(
                    "probe at {} is outside a field of {} nodes, skipping sample",
                    self.position,
                    ez.len(),
                );
                return;
            }
        };
        if self.time >= self.ez.len() {
            log::warn!(
                "probe at {} is full after {} samples, dropping data",
                self.position,
                self.time,
            );
            return;
        }
        self.ez[self.time] = value;
        self.hy[self.time] = hy.get(self.position).copied().unwrap_or(0.0);
        self.time += 1;
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Recorded electric field, one value per time step.
    #[inline]
    pub fn ez(&self) -> ArrayView1<f64> {
        self.ez.slice(s![..self.time])
    }

    /// Recorded magnetic field, one value per time step.
    #[inline]
    pub fn hy(&self) -> ArrayView1<f64> {
        self.hy.slice(s![..self.time])
    }

    /// The number of recorded time steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.time
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time == 0
    }

    /// Largest electric field magnitude seen so far.
    pub fn peak_ez(&self) -> f64 {
        self.ez().fold(0.0, |peak: f64, &v| peak.max(v.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn records_values_at_position() {
        let mut probe = Probe::new(1, 3);
        probe.add_data(array![0.0, 1.0, 2.0].view(), array![10.0, 11.0].view());
        probe.add_data(array![0.0, -3.0, 2.0].view(), array![10.0, 12.0].view());

        assert_eq!(probe.len(), 2);
        assert_eq!(probe.ez().to_vec(), vec![1.0, -3.0]);
        assert_eq!(probe.hy().to_vec(), vec![11.0, 12.0]);
        assert_eq!(probe.peak_ez(), 3.0);
    }

    #[test]
    fn last_node_has_no_magnetic_field() {
        let mut probe = Probe::new(2, 1);
        probe.add_data(array![0.0, 1.0, 2.0].view(), array![10.0, 11.0].view());
        assert_eq!(probe.ez().to_vec(), vec![2.0]);
        assert_eq!(probe.hy().to_vec(), vec![0.0]);
    }

    #[test]
    fn drops_data_past_history_length() {
        let mut probe = Probe::new(0, 2);
        for value in 1..=4 {
            probe.add_data(array![value as f64, 0.0].view(), array![0.0].view());
        }
        assert_eq!(probe.len(), 2);
        assert_eq!(probe.ez().to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn skips_fields_shorter_than_position() {
        let mut probe = Probe::new(5, 4);
        probe.add_data(array![1.0, 2.0, 3.0].view(), array![0.5, 0.5].view());
        assert!(probe.is_empty());

        probe.add_data(array![0.0, 0.0, 0.0, 0.0, 0.0, 7.0].view(), Array1::from_elem(5, 0.0).view());
        assert_eq!(probe.ez().to_vec(), vec![7.0]);
    }

    #[test]
    fn starts_empty() {
        let probe = Probe::new(4, 10);
        assert!(probe.is_empty());
        assert_eq!(probe.peak_ez(), 0.0);
    }
}
