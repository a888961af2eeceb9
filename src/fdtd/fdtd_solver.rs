use ndarray::s;

use crate::{Error, Solver, SimulationParameters, SimulationState};
use crate::fdtd::components::{GaussianPlaneWave, Medium};

/// Describes the composition of an `FdtdSolver`.
pub struct FdtdSolverDescriptor {
    pub medium: Medium,
    /// First cell of the total-field region.
    pub source_position: usize,
    /// Delay of the injected pulse, in time steps.
    pub source_delay: f64,
    /// Width of the injected pulse, in time steps.
    pub source_width: f64,
    pub sim_params: SimulationParameters,
}

/// Does single threaded leapfrog updates on the CPU.
///
/// The electric field at both ends of the grid is never updated. The left end
/// acts as a perfect electric conductor and the right end relies on the loss
/// layer to damp outgoing waves before they arrive.
pub struct FdtdSolver {
    medium: Medium,
    source: GaussianPlaneWave,
    source_position: usize,
    sim_params: SimulationParameters,
}

impl FdtdSolver {
    pub fn new(desc: FdtdSolverDescriptor) -> Result<Self, Error> {
        desc.sim_params.validate()?;
        let medium = desc.medium;
        if medium.impedance() != desc.sim_params.impedance {
            return Err(Error::ImpedanceMismatch {
                medium: medium.impedance(),
                solver: desc.sim_params.impedance,
            });
        }

        // the magnetic injection writes one cell to the left of the source and
        // the electric injection reads the permeability at the source
        let npoints = medium.npoints();
        let source_position = desc.source_position;
        if source_position < 1 || source_position > npoints - 2 {
            return Err(Error::PositionOutOfRange {
                name: "Source".to_string(),
                position: source_position,
                min: 1,
                max: npoints - 2,
            });
        }
        if !(desc.source_width.is_finite() && desc.source_width > 0.0) {
            return Err(Error::BadParameter {
                name: "source width",
                value: desc.source_width,
            });
        }
        if !desc.source_delay.is_finite() {
            return Err(Error::BadParameter {
                name: "source delay",
                value: desc.source_delay,
            });
        }

        let source = GaussianPlaneWave::new(
            desc.source_delay,
            desc.source_width,
            desc.sim_params.courant,
            medium.eps()[source_position],
            medium.mu()[source_position],
        );

        Ok(Self {
            medium,
            source,
            source_position,
            sim_params: desc.sim_params,
        })
    }

    #[inline]
    pub fn medium(&self) -> &Medium {
        &self.medium
    }
    #[inline]
    pub fn source(&self) -> &GaussianPlaneWave {
        &self.source
    }
    #[inline]
    pub fn source_position(&self) -> usize {
        self.source_position
    }
}

impl Solver for FdtdSolver {
    fn step(&self, state: &mut SimulationState) {
        let q = state.time_index as f64;
        let courant = self.sim_params.courant;
        let impedance = self.sim_params.impedance;
        let src = self.source_position;
        let npoints = self.medium.npoints();
        let mu = self.medium.mu();

        // magnetic field over the whole grid
        ndarray::Zip::from(&mut state.hy)
            .and(self.medium.chyh())
            .and(self.medium.chye())
            .and(state.ez.windows(2))
            .for_each(|hy, &chyh, &chye, ez| {
                *hy = chyh * *hy + chye * (ez[1] - ez[0]);
            });

        // total-field/scattered-field correction for the magnetic node left of the source
        state.hy[src - 1] -= courant / (impedance * mu[src - 1]) * self.source.get_e(0.0, q);

        // electric field, leaving both end nodes alone
        ndarray::Zip::from(state.ez.slice_mut(s![1..npoints - 1]))
            .and(self.medium.ceze().slice(s![1..npoints - 1]))
            .and(self.medium.cezh().slice(s![1..npoints - 1]))
            .and(state.hy.windows(2))
            .for_each(|ez, &ceze, &cezh, hy| {
                *ez = ceze * *ez + cezh * (hy[1] - hy[0]);
            });

        // total-field/scattered-field correction for the electric node at the source
        let index = f64::sqrt(self.medium.eps()[src] * mu[src]);
        state.ez[src] += courant / index * self.source.get_e(-0.5, q + 0.5);
    }

    #[inline]
    fn npoints(&self) -> usize {
        self.medium.npoints()
    }

    #[inline]
    fn sim_params(&self) -> SimulationParameters {
        self.sim_params
    }

    fn energy(&self, state: &SimulationState) -> f64 {
        let impedance = self.sim_params.impedance;
        let electric: f64 = state.ez.iter()
            .zip(self.medium.eps().iter())
            .map(|(ez, eps)| eps * ez * ez)
            .sum();
        let magnetic: f64 = state.hy.iter()
            .zip(self.medium.mu().iter())
            .map(|(hy, mu)| mu * (impedance * hy).powi(2))
            .sum();
        electric + magnetic
    }

    fn source_positions(&self) -> Vec<usize> {
        vec![self.source_position]
    }

    fn boundaries(&self) -> Vec<usize> {
        vec![self.medium.layer_loss_x()]
    }
}
