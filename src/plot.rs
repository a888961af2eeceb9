//! PNG plots of field snapshots and probe signals.
//!
//! Text (titles, axis labels) needs a system font. When none can be loaded the
//! plot is still drawn, without text, and a warning is logged.

use std::path::Path;

use ndarray::ArrayView1;
use plotters::coord::types::{RangedCoordf64, RangedCoordusize};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::display::DisplayDescriptor;
use crate::probe::Probe;
use crate::Error;

/// Grid positions highlighted on a field snapshot.
#[derive(Clone, Debug, Default)]
pub struct Markers {
    pub probes: Vec<usize>,
    pub sources: Vec<usize>,
    pub boundaries: Vec<usize>,
}

/// Writes one snapshot of `field` to a PNG at `path`.
///
/// The axes follow `desc`. Probes are drawn as red vertical lines, sources as
/// green and boundaries as black.
pub fn plot_field<P: AsRef<Path>>(
    field: ArrayView1<f64>,
    time_index: usize,
    desc: &DisplayDescriptor,
    markers: &Markers,
    path: P,
    size: (u32, u32),
) -> Result<(), Error> {
    let root = BitMapBackend::new(path.as_ref(), size).into_drawing_area();
    root.fill(&WHITE)?;
    let area = titled(&root, &format!("Time step {}", time_index));

    let (y_min, y_max) = (desc.y_min, desc.y_max);
    let x_max = desc.domain_size.max(field.len()).max(2) - 1;
    let mut chart = ChartBuilder::on(&area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..x_max, y_min..y_max)?;
    draw_mesh(&mut chart, "Space, cells", &desc.y_label);

    for (positions, color) in [
        (&markers.probes, RED),
        (&markers.sources, GREEN),
        (&markers.boundaries, BLACK),
    ] {
        chart.draw_series(positions.iter().map(|&x| {
            PathElement::new(vec![(x, y_min), (x, y_max)], color.stroke_width(1))
        }))?;
    }

    chart.draw_series(LineSeries::new(
        field.iter().enumerate().map(|(x, &v)| (x, v)),
        BLUE.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}

/// Writes the electric field recorded by each probe to a PNG at `path`.
///
/// Probes are stacked top to bottom, each with its own time axis and the
/// shared field range `y_min..y_max`.
pub fn plot_probe_signals<P: AsRef<Path>>(
    probes: &[Probe],
    y_min: f64,
    y_max: f64,
    path: P,
) -> Result<(), Error> {
    if !(y_min.is_finite() && y_max.is_finite() && y_min < y_max) {
        return Err(Error::BadParameter { name: "plot range", value: y_max - y_min });
    }

    let rows = probes.len().max(1);
    let root = BitMapBackend::new(path.as_ref(), (800, 250 * rows as u32)).into_drawing_area();
    root.fill(&WHITE)?;

    for (probe, cell) in probes.iter().zip(root.split_evenly((rows, 1))) {
        let area = titled(&cell, &format!("Probe at cell {}", probe.position()));
        let ez = probe.ez();
        let mut chart = ChartBuilder::on(&area)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..ez.len().max(2) - 1, y_min..y_max)?;
        draw_mesh(&mut chart, "Time, steps", "Ez, V/m");
        chart.draw_series(LineSeries::new(
            ez.iter().enumerate().map(|(t, &v)| (t, v)),
            BLUE.stroke_width(2),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn titled<'a>(
    area: &DrawingArea<BitMapBackend<'a>, Shift>,
    title: &str,
) -> DrawingArea<BitMapBackend<'a>, Shift> {
    match area.titled(title, ("sans-serif", 20)) {
        Ok(inner) => inner,
        Err(err) => {
            log::warn!("Could not draw title {:?}: {}", title, err);
            area.clone()
        }
    }
}

fn draw_mesh(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<RangedCoordusize, RangedCoordf64>>,
    x_desc: &str,
    y_desc: &str,
) {
    if let Err(err) = chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw() {
        log::warn!("Could not draw axes: {}", err);
    }
}
