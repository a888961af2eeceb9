//! Includes commonly used library components.

pub use crate::{
    Error,
    RunDescriptor,
    SaveSettings,
    SaveType,
    Simulation,
    SimulationDescriptor,
    SimulationParameters,
    SimulationPhase,
    SimulationState,
    Solver,
    FREE_SPACE_IMPEDANCE,
};
pub use crate::display::{
    ConsoleDisplay, DisplayDescriptor, FieldDisplay, NullDisplay, PlotDisplay,
};
pub use crate::fdtd::{FdtdSolver, FdtdSolverDescriptor};
pub use crate::fdtd::components::{GaussianPlaneWave, Medium, MediumDescriptor};
pub use crate::plot::{plot_field, plot_probe_signals, Markers};
pub use crate::probe::Probe;
