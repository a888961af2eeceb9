use std::cmp::min;
use std::path::Path;

use crate::display::FieldDisplay;
use crate::probe::Probe;
use crate::{Error, Solver};

/// Wave impedance of free space used by default, in ohms.
pub const FREE_SPACE_IMPEDANCE: f64 = 120.0 * std::f64::consts::PI;

/// Upper bound on the number of field samples buffered before a full save is flushed.
const FULL_SAVE_BUFFER: usize = 10_000_000;

/// Simulation specific parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimulationParameters {
    /// The Courant number tying the spacial and temporal steps together.
    pub courant: f64,
    /// The wave impedance of free space.
    pub impedance: f64,
}

impl SimulationParameters {
    /// Parameters for the given Courant number in free space units.
    #[inline]
    pub fn new(courant: f64) -> Self {
        Self {
            courant,
            impedance: FREE_SPACE_IMPEDANCE,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !(self.courant.is_finite() && self.courant > 0.0) {
            return Err(Error::BadParameter {
                name: "Courant number",
                value: self.courant,
            });
        }
        if !(self.impedance.is_finite() && self.impedance > 0.0) {
            return Err(Error::BadParameter {
                name: "impedance",
                value: self.impedance,
            });
        }
        Ok(())
    }
}

/// Describes the field state at the current time step.
#[derive(Clone, Debug)]
pub struct SimulationState {
    /// The index of the next time step to compute.
    pub time_index: usize,
    /// The electric field at every node of the grid.
    pub ez: ndarray::Array1<f64>,
    /// The magnetic field between every pair of electric nodes.
    pub hy: ndarray::Array1<f64>,
}

impl SimulationState {
    /// A field free state for a grid of `npoints` electric nodes.
    #[inline]
    pub fn zeros(npoints: usize) -> Self {
        Self {
            time_index: 0,
            ez: ndarray::Array1::zeros(npoints),
            hy: ndarray::Array1::zeros(npoints.saturating_sub(1)),
        }
    }
}

/// Whether a simulation still has time steps left.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SimulationPhase {
    Running,
    Done,
}

/// Describes a simulation.
pub struct SimulationDescriptor<S: Solver> {
    /// The `Solver` for the simulation.
    pub solver: S,
    /// The total number of time steps.
    pub max_time: usize,
    /// Grid nodes at which field histories are recorded.
    pub probe_positions: Vec<usize>,
    /// The state that the simulation starts in.
    pub init_state: Option<SimulationState>,
}

/// Describes a simulation run.
pub struct RunDescriptor<'a, P: AsRef<Path>> {
    /// Whether or not to print information to the console.
    pub verbose: bool,
    /// What, if any, information to save to file.
    pub save_settings: Option<SaveSettings<P>>,
    /// Where, if anywhere, to show the electric field while running.
    pub display: Option<&'a mut dyn FieldDisplay>,
}

/// How data should be saved to file.
#[derive(Debug)]
pub struct SaveSettings<P: AsRef<Path>> {
    /// The path to the save file.
    pub filename: P,
    /// What information to save.
    pub save_type: SaveType,
    /// Whether or not to overwrite an existing file.
    pub overwrite: bool,
}

/// Represents what data to save.
#[derive(PartialEq, Debug)]
pub enum SaveType {
    /// Save the field at every node for every time step, along with probe data.
    Full,
    /// Save only the probe histories.
    Probes,
}

/// The main `struct` of the framework.
pub struct Simulation<S: Solver> {
    solver: S,
    state: SimulationState,
    probes: Vec<Probe>,
    max_time: usize,
}

impl<S: Solver> Simulation<S> {
    /// Creates a new `Simulation` instance.
    #[inline]
    pub fn new(desc: SimulationDescriptor<S>) -> Result<Self, Error> {
        let npoints = desc.solver.npoints();
        if npoints < 2 {
            return Err(Error::BadParameter {
                name: "number of grid points",
                value: npoints as f64,
            });
        }

        let state = desc.init_state.unwrap_or_else(|| SimulationState::zeros(npoints));
        if state.ez.len() != npoints {
            return Err(Error::BadInit {
                array_name: "Ez".to_string(),
                input_length: state.ez.len(),
                expected_length: npoints,
            })
        }
        if state.hy.len() != npoints - 1 {
            return Err(Error::BadInit {
                array_name: "Hy".to_string(),
                input_length: state.hy.len(),
                expected_length: npoints - 1,
            })
        }
        if state.time_index >= desc.max_time {
            return Err(Error::Finished { max_time: desc.max_time });
        }

        let mut probes = Vec::with_capacity(desc.probe_positions.len());
        for position in desc.probe_positions {
            if position >= npoints {
                return Err(Error::PositionOutOfRange {
                    name: "Probe".to_string(),
                    position,
                    min: 0,
                    max: npoints - 1,
                });
            }
            probes.push(Probe::new(position, desc.max_time));
        }

        Ok(Self {
            solver: desc.solver,
            state,
            probes,
            max_time: desc.max_time,
        })
    }

    #[inline]
    pub fn phase(&self) -> SimulationPhase {
        if self.state.time_index < self.max_time {
            SimulationPhase::Running
        } else {
            SimulationPhase::Done
        }
    }

    /// Computes one time step and records it in every probe.
    ///
    /// Returns the index of the computed step.
    pub fn step(&mut self) -> Result<usize, Error> {
        if self.phase() == SimulationPhase::Done {
            return Err(Error::Finished { max_time: self.max_time });
        }

        self.solver.step(&mut self.state);
        for probe in self.probes.iter_mut() {
            probe.add_data(self.state.ez.view(), self.state.hy.view());
        }

        let time_index = self.state.time_index;
        self.state.time_index += 1;
        Ok(time_index)
    }

    /// Steps until every time step is computed.
    pub fn run<P: AsRef<Path>>(
        &mut self,
        desc: RunDescriptor<P>,
    ) -> Result<(), Error> {
        let npoints = self.solver.npoints();
        let start_index = self.state.time_index;
        let nsteps = self.max_time.saturating_sub(start_index);

        // optionally create file
        let full_save = match desc.save_settings {
            Some(ref settings) => {
                self.create_file(settings)?;
                settings.save_type == SaveType::Full
            }
            None => false,
        };
        let store_size = if full_save {
            min(nsteps, FULL_SAVE_BUFFER / npoints).max(1)
        } else {
            0
        };
        let mut ez_store = ndarray::Array2::<f64>::zeros((store_size, npoints));
        let mut hy_store = ndarray::Array2::<f64>::zeros((store_size, npoints - 1));
        let mut stored = 0;

        // setup output if verbose
        let bar = if desc.verbose {
            log::info!(
                "running {} time steps on {} cells (Sc = {})",
                nsteps,
                npoints,
                self.solver.sim_params().courant,
            );
            Some(indicatif::ProgressBar::new(nsteps as u64))
        } else {
            None
        };
        let energy_period = (nsteps / 10).max(1);

        let mut display = desc.display;
        if let Some(display) = display.as_deref_mut() {
            display.activate();
            display.draw_probes(&self.probe_positions());
            display.draw_sources(&self.solver.source_positions());
            for boundary in self.solver.boundaries() {
                display.draw_boundary(boundary);
            }
        }

        while self.phase() == SimulationPhase::Running {
            let time_index = self.step()?;

            if time_index % 2 == 0 {
                if let Some(display) = display.as_deref_mut() {
                    display.update_data(self.state.ez.view(), time_index);
                }
            }

            if full_save {
                ez_store.row_mut(stored).assign(&self.state.ez);
                hy_store.row_mut(stored).assign(&self.state.hy);
                stored += 1;
                if stored == store_size || self.phase() == SimulationPhase::Done {
                    if let Some(ref settings) = desc.save_settings {
                        let first = time_index + 1 - stored;
                        write_full(settings, &ez_store, &hy_store, first, stored)?;
                    }
                    stored = 0;
                }
            }

            if desc.verbose && (time_index - start_index) % energy_period == 0 {
                log::debug!("step {}: field energy {:.6e}", time_index, self.energy());
            }
            if let Some(ref bar) = bar {
                bar.inc(1)
            }
        }

        if let Some(display) = display.as_deref_mut() {
            display.stop();
        }

        if let Some(ref settings) = desc.save_settings {
            self.write_probes(settings)?;
        }

        if let Some(ref bar) = bar {
            bar.finish();
            log::info!("finished with field energy {:.6e}", self.energy());
        }

        Ok(())
    }

    #[inline]
    pub fn state(&self) -> &SimulationState {
        &self.state
    }
    #[inline]
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }
    /// The probe recording at `position`, if there is one.
    pub fn probe(&self, position: usize) -> Option<&Probe> {
        self.probes.iter().find(|probe| probe.position() == position)
    }
    #[inline]
    pub fn solver(&self) -> &S {
        &self.solver
    }
    #[inline]
    pub fn max_time(&self) -> usize {
        self.max_time
    }
    #[inline]
    pub fn energy(&self) -> f64 {
        self.solver.energy(&self.state)
    }

    fn probe_positions(&self) -> Vec<usize> {
        self.probes.iter().map(Probe::position).collect()
    }

    fn create_file<P: AsRef<Path>>(&self, settings: &SaveSettings<P>) -> Result<(), Error> {
        let filename = settings.filename.as_ref();
        if filename.exists() && !settings.overwrite {
            return Err(Error::OutputExists(filename.to_path_buf()));
        }
        let npoints = self.solver.npoints();
        let file = hdf5::File::create(filename)?;

        // create probe datasets
        let probe_group = file.create_group("probes")?;
        for probe in self.probes.iter() {
            let group = probe_group.create_group(&format!("probe_{}", probe.position()))?;
            group.new_dataset::<f64>()
                .shape(self.max_time)
                .create("ez")?;
            group.new_dataset::<f64>()
                .shape(self.max_time)
                .create("hy")?;
            let position_attr = group.new_attr::<u64>()
                .shape(hdf5::Extents::Scalar)
                .create("position");
            if let Ok(attr) = position_attr {
                attr.write_scalar(&(probe.position() as u64))?;
            }
        }

        if settings.save_type == SaveType::Full {
            // create full datasets
            let full_group = file.create_group("full")?;
            full_group.new_dataset::<f64>()
                .shape((self.max_time, npoints))
                .create("ez")?;
            full_group.new_dataset::<f64>()
                .shape((self.max_time, npoints - 1))
                .create("hy")?;
        }

        // save run constants as file attributes
        let sim_params = self.solver.sim_params();
        let courant_attr = file.new_attr::<f64>()
            .shape(hdf5::Extents::Scalar)
            .create("courant");
        if let Ok(attr) = courant_attr {
            attr.write_scalar(&sim_params.courant)?;
        }
        let impedance_attr = file.new_attr::<f64>()
            .shape(hdf5::Extents::Scalar)
            .create("impedance");
        if let Ok(attr) = impedance_attr {
            attr.write_scalar(&sim_params.impedance)?;
        }

        file.close()?;
        Ok(())
    }

    fn write_probes<P: AsRef<Path>>(&self, settings: &SaveSettings<P>) -> Result<(), Error> {
        let file = hdf5::File::open_rw(&settings.filename)?;
        for probe in self.probes.iter() {
            // probes only see the steps taken since the simulation was created
            let first = self.max_time - probe.len();
            let name = format!("probes/probe_{}", probe.position());
            file.dataset(&format!("{}/ez", name))?
                .write_slice(probe.ez(), ndarray::s![first..])?;
            file.dataset(&format!("{}/hy", name))?
                .write_slice(probe.hy(), ndarray::s![first..])?;
        }
        file.close()?;
        Ok(())
    }
}

fn write_full<P: AsRef<Path>>(
    settings: &SaveSettings<P>,
    ez_store: &ndarray::Array2<f64>,
    hy_store: &ndarray::Array2<f64>,
    first: usize,
    rows: usize,
) -> Result<(), Error> {
    let file = hdf5::File::open_rw(&settings.filename)?;
    file.dataset("full/ez")?
        .write_slice(
            ez_store.slice(ndarray::s![..rows, ..]),
            ndarray::s![first..(first + rows), ..],
        )?;
    file.dataset("full/hy")?
        .write_slice(
            hy_store.slice(ndarray::s![..rows, ..]),
            ndarray::s![first..(first + rows), ..],
        )?;
    file.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shifts the electric field one cell to the right each step.
    struct ShiftSolver {
        npoints: usize,
    }

    impl Solver for ShiftSolver {
        fn step(&self, state: &mut SimulationState) {
            for i in (1..self.npoints).rev() {
                state.ez[i] = state.ez[i - 1];
            }
            state.ez[0] = state.time_index as f64 + 1.0;
        }
        fn npoints(&self) -> usize {
            self.npoints
        }
        fn sim_params(&self) -> SimulationParameters {
            SimulationParameters::new(1.0)
        }
        fn energy(&self, state: &SimulationState) -> f64 {
            state.ez.iter().map(|e| e * e).sum()
        }
        fn source_positions(&self) -> Vec<usize> {
            vec![0]
        }
        fn boundaries(&self) -> Vec<usize> {
            vec![3]
        }
    }

    #[derive(Default)]
    struct RecordingDisplay {
        calls: Vec<String>,
        frames: Vec<(usize, f64)>,
    }

    impl FieldDisplay for RecordingDisplay {
        fn activate(&mut self) {
            self.calls.push("activate".to_string());
        }
        fn draw_probes(&mut self, positions: &[usize]) {
            self.calls.push(format!("probes {:?}", positions));
        }
        fn draw_sources(&mut self, positions: &[usize]) {
            self.calls.push(format!("sources {:?}", positions));
        }
        fn draw_boundary(&mut self, index: usize) {
            self.calls.push(format!("boundary {}", index));
        }
        fn update_data(&mut self, field: ndarray::ArrayView1<f64>, time_index: usize) {
            self.frames.push((time_index, field[0]));
        }
        fn stop(&mut self) {
            self.calls.push("stop".to_string());
        }
    }

    fn simulation(max_time: usize) -> Simulation<ShiftSolver> {
        Simulation::new(SimulationDescriptor {
            solver: ShiftSolver { npoints: 6 },
            max_time,
            probe_positions: vec![0, 5],
            init_state: None,
        })
        .unwrap()
    }

    #[test]
    fn display_sees_even_steps_only() {
        let mut sim = simulation(7);
        let mut display = RecordingDisplay::default();
        sim.run(RunDescriptor {
            verbose: false,
            save_settings: None::<SaveSettings<&str>>,
            display: Some(&mut display),
        })
        .unwrap();

        assert_eq!(
            display.calls,
            vec!["activate", "probes [0, 5]", "sources [0]", "boundary 3", "stop"],
        );
        // each frame is taken after the step finished
        assert_eq!(display.frames, vec![(0, 1.0), (2, 3.0), (4, 5.0), (6, 7.0)]);
    }

    #[test]
    fn probes_record_every_step() {
        let mut sim = simulation(8);
        sim.run(RunDescriptor {
            verbose: false,
            save_settings: None::<SaveSettings<&str>>,
            display: None,
        })
        .unwrap();

        let probe = sim.probe(0).unwrap();
        assert_eq!(probe.len(), 8);
        assert_eq!(probe.ez().to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let far = sim.probe(5).unwrap();
        assert_eq!(far.ez().to_vec(), vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn step_after_last_time_step_fails() {
        let mut sim = simulation(2);
        assert_eq!(sim.step().unwrap(), 0);
        assert_eq!(sim.phase(), SimulationPhase::Running);
        assert_eq!(sim.step().unwrap(), 1);
        assert_eq!(sim.phase(), SimulationPhase::Done);
        assert!(matches!(sim.step(), Err(Error::Finished { max_time: 2 })));
    }

    #[test]
    fn run_continues_after_manual_steps() {
        let mut sim = simulation(5);
        sim.step().unwrap();
        sim.step().unwrap();
        let mut display = RecordingDisplay::default();
        sim.run(RunDescriptor {
            verbose: false,
            save_settings: None::<SaveSettings<&str>>,
            display: Some(&mut display),
        })
        .unwrap();
        assert_eq!(sim.state().time_index, 5);
        assert_eq!(display.frames, vec![(2, 3.0), (4, 5.0)]);
    }

    #[test]
    fn rejects_bad_init_state() {
        let err = Simulation::new(SimulationDescriptor {
            solver: ShiftSolver { npoints: 6 },
            max_time: 4,
            probe_positions: vec![],
            init_state: Some(SimulationState {
                time_index: 0,
                ez: ndarray::Array1::zeros(6),
                hy: ndarray::Array1::zeros(6),
            }),
        })
        .err()
        .unwrap();
        assert!(matches!(err, Error::BadInit { input_length: 6, expected_length: 5, .. }));
    }

    #[test]
    fn rejects_init_state_with_no_steps_left() {
        let err = Simulation::new(SimulationDescriptor {
            solver: ShiftSolver { npoints: 6 },
            max_time: 4,
            probe_positions: vec![],
            init_state: Some(SimulationState {
                time_index: 4,
                ..SimulationState::zeros(6)
            }),
        })
        .err()
        .unwrap();
        assert!(matches!(err, Error::Finished { max_time: 4 }));
    }

    #[test]
    fn rejects_grid_without_magnetic_node() {
        for npoints in 0..2 {
            let err = Simulation::new(SimulationDescriptor {
                solver: ShiftSolver { npoints },
                max_time: 4,
                probe_positions: vec![],
                init_state: None,
            })
            .err()
            .unwrap();
            assert!(matches!(err, Error::BadParameter { name: "number of grid points", .. }));
        }
    }

    #[test]
    fn rejects_probe_outside_grid() {
        let err = Simulation::new(SimulationDescriptor {
            solver: ShiftSolver { npoints: 6 },
            max_time: 4,
            probe_positions: vec![2, 6],
            init_state: None,
        })
        .err()
        .unwrap();
        assert!(matches!(err, Error::PositionOutOfRange { position: 6, max: 5, .. }));
    }

    #[test]
    fn refuses_to_clobber_output() {
        let path = std::env::temp_dir().join(format!("yee1d-clobber-{}.h5", std::process::id()));
        std::fs::write(&path, b"keep").unwrap();

        let mut sim = simulation(2);
        let err = sim
            .run(RunDescriptor {
                verbose: false,
                save_settings: Some(SaveSettings {
                    filename: &path,
                    save_type: SaveType::Probes,
                    overwrite: false,
                }),
                display: None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::OutputExists(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep");
        std::fs::remove_file(&path).unwrap();
    }
}
