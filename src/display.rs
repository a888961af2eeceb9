//! Live views of the electric field while a simulation runs.

use std::path::{Path, PathBuf};

use ndarray::ArrayView1;

use crate::plot::{plot_field, Markers};
use crate::Error;

/// Shows a field distribution as it evolves.
///
/// A run calls `activate` and the `draw_*` methods once before stepping,
/// `update_data` after every even time step, and `stop` once at the end.
pub trait FieldDisplay {
    fn activate(&mut self);
    fn draw_probes(&mut self, positions: &[usize]);
    fn draw_sources(&mut self, positions: &[usize]);
    fn draw_boundary(&mut self, index: usize);
    fn update_data(&mut self, field: ArrayView1<f64>, time_index: usize);
    fn stop(&mut self);
}

/// Describes the axes of a display.
#[derive(Clone, Debug)]
pub struct DisplayDescriptor {
    /// The number of grid nodes shown.
    pub domain_size: usize,
    pub y_min: f64,
    pub y_max: f64,
    pub y_label: String,
}

/// A display that shows nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullDisplay;

impl FieldDisplay for NullDisplay {
    fn activate(&mut self) {}
    fn draw_probes(&mut self, _positions: &[usize]) {}
    fn draw_sources(&mut self, _positions: &[usize]) {}
    fn draw_boundary(&mut self, _index: usize) {}
    fn update_data(&mut self, _field: ArrayView1<f64>, _time_index: usize) {}
    fn stop(&mut self) {}
}

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Logs the field as a strip of block characters.
///
/// Each column covers a run of grid nodes and shows the node with the largest
/// magnitude. Only every `frame_period`-th update is logged.
pub struct ConsoleDisplay {
    desc: DisplayDescriptor,
    columns: usize,
    frame_period: usize,
    markers: Vec<char>,
    updates: usize,
    clipped: usize,
}

impl ConsoleDisplay {
    pub fn new(desc: DisplayDescriptor, columns: usize, frame_period: usize) -> Self {
        let columns = columns.clamp(1, desc.domain_size.max(1));
        Self {
            desc,
            columns,
            frame_period: frame_period.max(1),
            markers: vec![' '; columns],
            updates: 0,
            clipped: 0,
        }
    }

    /// Renders `field` as one character per column.
    pub fn render(&self, field: ArrayView1<f64>) -> String {
        let npoints = field.len();
        let span = self.desc.y_max - self.desc.y_min;
        (0..self.columns)
            .map(|c| {
                let start = c * npoints / self.columns;
                let end = ((c + 1) * npoints / self.columns).max(start + 1).min(npoints);
                let value = field
                    .iter()
                    .take(end)
                    .skip(start)
                    .fold(0.0f64, |acc, &v| if v.abs() > acc.abs() { v } else { acc });
                let t = ((value - self.desc.y_min) / span).clamp(0.0, 1.0);
                LEVELS[(t * (LEVELS.len() - 1) as f64).round() as usize]
            })
            .collect()
    }

    /// The line of probe, source and boundary markers.
    pub fn markers(&self) -> String {
        self.markers.iter().collect()
    }

    /// The number of field samples that fell outside `[y_min, y_max]`.
    pub fn clipped(&self) -> usize {
        self.clipped
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    fn mark(&mut self, index: usize, marker: char) {
        let column = index * self.columns / self.desc.domain_size.max(1);
        if let Some(slot) = self.markers.get_mut(column) {
            *slot = marker;
        }
    }
}

impl FieldDisplay for ConsoleDisplay {
    fn activate(&mut self) {
        self.updates = 0;
        self.clipped = 0;
        self.markers.iter_mut().for_each(|m| *m = ' ');
    }

    fn draw_probes(&mut self, positions: &[usize]) {
        for &position in positions {
            self.mark(position, 'P');
        }
    }

    fn draw_sources(&mut self, positions: &[usize]) {
        for &position in positions {
            self.mark(position, 'S');
        }
    }

    fn draw_boundary(&mut self, index: usize) {
        self.mark(index, '|');
    }

    fn update_data(&mut self, field: ArrayView1<f64>, time_index: usize) {
        let (y_min, y_max) = (self.desc.y_min, self.desc.y_max);
        self.clipped += field.iter().filter(|&&v| v < y_min || v > y_max).count();

        if self.updates == 0 {
            log::info!("{:>16} |{}|", "", self.markers());
        }
        if self.updates % self.frame_period == 0 {
            log::info!("{} q = {:>6} |{}|", self.desc.y_label, time_index, self.render(field));
        }
        self.updates += 1;
    }

    fn stop(&mut self) {
        if self.clipped > 0 {
            log::warn!(
                "{} samples fell outside of [{}, {}]",
                self.clipped,
                self.desc.y_min,
                self.desc.y_max,
            );
        }
        log::info!("display stopped after {} updates", self.updates);
    }
}

/// Writes the field as a sequence of PNG frames.
///
/// Every `frame_period`-th update is drawn to `<output_dir>/ez_<time index>.png`.
/// Plotting errors are logged and the run carries on.
pub struct PlotDisplay {
    desc: DisplayDescriptor,
    output_dir: PathBuf,
    frame_period: usize,
    size: (u32, u32),
    markers: Markers,
    updates: usize,
    frames: Vec<PathBuf>,
}

impl PlotDisplay {
    /// Creates the display, creating `output_dir` if needed.
    pub fn new<P: AsRef<Path>>(
        desc: DisplayDescriptor,
        output_dir: P,
        frame_period: usize,
        size: (u32, u32),
    ) -> Result<Self, Error> {
        if !(desc.y_min.is_finite() && desc.y_max.is_finite() && desc.y_min < desc.y_max) {
            return Err(Error::BadParameter {
                name: "display range",
                value: desc.y_max - desc.y_min,
            });
        }
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            desc,
            output_dir,
            frame_period: frame_period.max(1),
            size,
            markers: Markers::default(),
            updates: 0,
            frames: Vec::new(),
        })
    }

    /// Frames written since the display was last activated.
    pub fn frames(&self) -> &[PathBuf] {
        &self.frames
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }
}

impl FieldDisplay for PlotDisplay {
    fn activate(&mut self) {
        self.markers = Markers::default();
        self.updates = 0;
        self.frames.clear();
    }

    fn draw_probes(&mut self, positions: &[usize]) {
        self.markers.probes.extend_from_slice(positions);
    }

    fn draw_sources(&mut self, positions: &[usize]) {
        self.markers.sources.extend_from_slice(positions);
    }

    fn draw_boundary(&mut self, index: usize) {
        self.markers.boundaries.push(index);
    }

    fn update_data(&mut self, field: ArrayView1<f64>, time_index: usize) {
        if self.updates % self.frame_period == 0 {
            let path = self.output_dir.join(format!("ez_{:06}.png", time_index));
            match plot_field(field, time_index, &self.desc, &self.markers, &path, self.size) {
                Ok(()) => self.frames.push(path),
                Err(err) => log::warn!("Could not write frame {:?}: {}", path, err),
            }
        }
        self.updates += 1;
    }

    fn stop(&mut self) {
        log::info!(
            "wrote {} frames to {:?}",
            self.frames.len(),
            self.output_dir,
        );
    }
}
