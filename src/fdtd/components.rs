//! Grid components.

mod gaussian;
mod medium;

pub use gaussian::GaussianPlaneWave;
pub use medium::{Medium, MediumDescriptor};
