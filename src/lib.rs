//! A framework for simulating 1-dimensional plane wave propagation on a Yee grid.
//!
//! The domain is bounded on the left by a perfect electric conductor and on the
//! right by a lossy layer that absorbs outgoing waves. Plane waves are launched
//! with a total-field/scattered-field source.
//!
//! To get started, refer to the `demos` directory in the main repository.

mod simulation;

pub mod display;
pub mod fdtd;
pub mod plot;
pub mod prelude;
pub mod probe;

pub use simulation::{
    RunDescriptor, SaveSettings, SaveType, Simulation, SimulationDescriptor, SimulationParameters,
    SimulationPhase, SimulationState, FREE_SPACE_IMPEDANCE,
};

use std::path::PathBuf;

/// Represents an error in the simulation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Init {array_name} array does not have expected length \
        ( {array_name} array length: {input_length}, \
        expected length: {expected_length} )")]
    BadInit {
        array_name: String,
        input_length: usize,
        expected_length: usize,
    },
    #[error("{name} position {position} is outside of the allowed range [{min}, {max}]")]
    PositionOutOfRange {
        name: String,
        position: usize,
        min: usize,
        max: usize,
    },
    #[error("Invalid {array_name} value {value} at cell {index}: {reason}")]
    BadMaterial {
        array_name: String,
        index: usize,
        value: f64,
        reason: &'static str,
    },
    #[error("Invalid {name}: {value}")]
    BadParameter {
        name: &'static str,
        value: f64,
    },
    #[error("Medium was built for impedance {medium} but the solver uses {solver}")]
    ImpedanceMismatch {
        medium: f64,
        solver: f64,
    },
    #[error("The simulation already completed all {max_time} time steps")]
    Finished {
        max_time: usize,
    },
    #[error("Output file {0:?} already exists")]
    OutputExists(PathBuf),
    #[error("Could not draw plot: {0}")]
    Plot(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    H5Error(#[from] hdf5::Error),
}

impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>> for Error {
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Error::Plot(err.to_string())
    }
}

/// Advances the field state of a simulation.
pub trait Solver {
    /// Advances `state` by one full time step.
    ///
    /// `state.time_index` is the index of the step being computed and is left
    /// untouched; the caller moves it forward.
    fn step(&self, state: &mut SimulationState);

    /// The number of electric field nodes.
    fn npoints(&self) -> usize;

    fn sim_params(&self) -> SimulationParameters;

    /// Normalized electromagnetic energy held in `state`.
    fn energy(&self, state: &SimulationState) -> f64;

    /// Cells where the solver injects excitation.
    fn source_positions(&self) -> Vec<usize>;

    /// Cells where the medium changes in a way worth marking on a display.
    fn boundaries(&self) -> Vec<usize>;
}
