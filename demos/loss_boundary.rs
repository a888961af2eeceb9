use yee1d::prelude::*;

fn main() {
    env_logger::init();
    std::fs::create_dir_all("data").unwrap();

    let courant = 1.0;
    let max_time = 950;
    let npoints = 200;
    let source_position = 110;
    let layer_loss_x = 160; // absorbing dielectric starts here
    let probe_positions = vec![125];

    let sim_params = SimulationParameters::new(courant);

    // uniform dielectric with a lossy layer at the right end
    let medium = Medium::new(
        MediumDescriptor {
            npoints,
            layer_loss_x,
            permittivity_fn: |_| 9.0,
            permeability_fn: |_| 1.0,
            loss_fn: |_| 0.02, // sigma * dt / (2 * eps * eps0)
        },
        &sim_params,
    )
    .unwrap();

    let mut simulation = Simulation::new(SimulationDescriptor {
        solver: FdtdSolver::new(FdtdSolverDescriptor {
            medium,
            source_position,
            source_delay: 30.0,
            source_width: 10.0,
            sim_params,
        })
        .unwrap(),
        max_time,
        probe_positions,
        init_state: None,
    })
    .unwrap();

    println!(
        "\n-- General Simulation Info --\n\
        # of points:  {}\n\
        # of steps:   {}\n\
        Sc:           {}\n\
        W0:           {:.3} Ω\n",
        npoints,
        max_time,
        sim_params.courant,
        sim_params.impedance,
    );

    let mut display = PlotDisplay::new(
        DisplayDescriptor {
            domain_size: npoints,
            y_min: -1.1,
            y_max: 1.1,
            y_label: "Ez, V/m".to_string(),
        },
        "data/frames",
        10,
        (800, 400),
    )
    .unwrap();

    simulation.run(RunDescriptor {
        verbose: true,
        save_settings: Some(SaveSettings {
            filename: "data/loss_boundary.h5",
            save_type: SaveType::Probes,
            overwrite: true,
        }),
        display: Some(&mut display),
    })
    .unwrap();

    plot_probe_signals(simulation.probes(), -1.1, 1.1, "data/probe_signals.png").unwrap();

    println!("\n-- Probe Signals --");
    for probe in simulation.probes() {
        println!("probe at {:>4}: peak |Ez| = {:.4} V/m", probe.position(), probe.peak_ez());
    }
}
