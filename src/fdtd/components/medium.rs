use ndarray::{s, Array1, ArrayView1};

use crate::{Error, SimulationParameters};

/// Describes a medium by sampling per-cell material functions.
///
/// `loss_fn` is only evaluated at and beyond `layer_loss_x`; every cell before
/// the loss layer is lossless.
pub struct MediumDescriptor<
    Fe: Fn(usize) -> f64,
    Fm: Fn(usize) -> f64,
    Fl: Fn(usize) -> f64,
> {
    pub npoints: usize,
    pub layer_loss_x: usize,
    pub permittivity_fn: Fe,
    pub permeability_fn: Fm,
    pub loss_fn: Fl,
}

/// Material properties of the grid and the update coefficients derived from them.
///
/// The coefficients are computed once at construction and never change.
#[derive(Clone, Debug)]
pub struct Medium {
    eps: Array1<f64>,
    mu: Array1<f64>,
    loss: Array1<f64>,
    ceze: Array1<f64>,
    cezh: Array1<f64>,
    chyh: Array1<f64>,
    chye: Array1<f64>,
    layer_loss_x: usize,
    impedance: f64,
}

impl Medium {
    #[inline]
    pub fn new<Fe: Fn(usize) -> f64, Fm: Fn(usize) -> f64, Fl: Fn(usize) -> f64>(
        desc: MediumDescriptor<Fe, Fm, Fl>,
        sim_params: &SimulationParameters,
    ) -> Result<Self, Error> {
        let eps = (0..desc.npoints)
            .map(|n| (desc.permittivity_fn)(n))
            .collect::<Array1<_>>();
        let mu = (0..desc.npoints.saturating_sub(1))
            .map(|n| (desc.permeability_fn)(n))
            .collect::<Array1<_>>();
        let loss = (0..desc.npoints)
            .map(|n| if n < desc.layer_loss_x { 0.0 } else { (desc.loss_fn)(n) })
            .collect::<Array1<_>>();

        Self::from_arrays(eps, mu, loss, desc.layer_loss_x, sim_params)
    }

    /// Builds a medium from explicit per-cell arrays.
    ///
    /// `eps` and `loss` hold one value per electric node, `mu` one value per
    /// magnetic node (one fewer).
    pub fn from_arrays(
        eps: Array1<f64>,
        mu: Array1<f64>,
        loss: Array1<f64>,
        layer_loss_x: usize,
        sim_params: &SimulationParameters,
    ) -> Result<Self, Error> {
        sim_params.validate()?;

        let npoints = eps.len();
        if npoints < 4 {
            return Err(Error::BadParameter {
                name: "number of grid points",
                value: npoints as f64,
            });
        }
        check_length("Permeability", &mu, npoints - 1)?;
        check_length("Loss", &loss, npoints)?;
        if layer_loss_x < 1 || layer_loss_x > npoints - 2 {
            return Err(Error::PositionOutOfRange {
                name: "Loss layer".to_string(),
                position: layer_loss_x,
                min: 1,
                max: npoints - 2,
            });
        }

        check_positive("Permittivity", &eps)?;
        check_positive("Permeability", &mu)?;
        for (index, &value) in loss.iter().enumerate() {
            let reason = if !(0.0..1.0).contains(&value) {
                "loss must lie in [0, 1)"
            } else if index < layer_loss_x && value != 0.0 {
                "loss must be zero before the loss layer"
            } else {
                continue;
            };
            return Err(Error::BadMaterial {
                array_name: "Loss".to_string(),
                index,
                value,
                reason,
            });
        }

        let impedance = sim_params.impedance;

        let mut ceze = loss.mapv(|l| (1.0 - l) / (1.0 + l));
        let mut cezh = ndarray::Zip::from(&eps)
            .and(&loss)
            .map_collect(|&e, &l| impedance / (e * (1.0 + l)));

        let h_loss = loss.slice(s![..npoints - 1]);
        let chyh = h_loss.mapv(|l| (1.0 - l) / (1.0 + l));
        let chye = h_loss.mapv(|l| (impedance * (1.0 + l)).recip());

        // smooth the electric coefficients across the loss layer edge
        let x = layer_loss_x;
        ceze[x] = (ceze[x - 1] + ceze[x + 1]) / 2.0;
        cezh[x] = (cezh[x - 1] + cezh[x + 1]) / 2.0;

        log::debug!(
            "built medium with {} cells, loss layer from cell {}",
            npoints,
            layer_loss_x,
        );

        Ok(Self {
            eps,
            mu,
            loss,
            ceze,
            cezh,
            chyh,
            chye,
            layer_loss_x,
            impedance,
        })
    }

    /// The number of electric field nodes.
    #[inline]
    pub fn npoints(&self) -> usize {
        self.eps.len()
    }
    #[inline]
    pub fn layer_loss_x(&self) -> usize {
        self.layer_loss_x
    }
    #[inline]
    pub fn impedance(&self) -> f64 {
        self.impedance
    }
    #[inline]
    pub fn eps(&self) -> ArrayView1<f64> {
        self.eps.view()
    }
    #[inline]
    pub fn mu(&self) -> ArrayView1<f64> {
        self.mu.view()
    }
    #[inline]
    pub fn loss(&self) -> ArrayView1<f64> {
        self.loss.view()
    }
    #[inline]
    pub fn ceze(&self) -> ArrayView1<f64> {
        self.ceze.view()
    }
    #[inline]
    pub fn cezh(&self) -> ArrayView1<f64> {
        self.cezh.view()
    }
    #[inline]
    pub fn chyh(&self) -> ArrayView1<f64> {
        self.chyh.view()
    }
    #[inline]
    pub fn chye(&self) -> ArrayView1<f64> {
        self.chye.view()
    }
}

fn check_length(array_name: &str, array: &Array1<f64>, expected_length: usize) -> Result<(), Error> {
    if array.len() != expected_length {
        return Err(Error::BadInit {
            array_name: array_name.to_string(),
            input_length: array.len(),
            expected_length,
        });
    }
    Ok(())
}

fn check_positive(array_name: &str, array: &Array1<f64>) -> Result<(), Error> {
    match array.iter().position(|&v| !(v.is_finite() && v > 0.0)) {
        Some(index) => Err(Error::BadMaterial {
            array_name: array_name.to_string(),
            index,
            value: array[index],
            reason: "value must be finite and positive",
        }),
        None => Ok(()),
    }
}
