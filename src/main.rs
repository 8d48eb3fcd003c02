//! Ether Fluid CLI - Run the simulation headless from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::PathBuf;
use std::time::Instant;

use ether_fluid::{
    runtime::{SimulationLoop, StatsCompositor},
    schema::{Command, DEFAULT_COLORS, FluidConfig, SurfaceSize},
};

/// Simulated display frame period in milliseconds.
const FRAME_MS: f64 = 1000.0 / 60.0;

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [frames] [width height]", args[0]);
        eprintln!();
        eprintln!("Run the fluid simulation headless with autopilot forcing.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to configuration file");
        eprintln!("  frames       Number of frames (default: 600)");
        eprintln!("  width height Surface size in CSS pixels (default: 800 600)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let frames: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(600);
    let width: f32 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(800.0);
    let height: f32 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(600.0);

    let mut config = FluidConfig::from_json_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });
    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    }
    // Nobody is at the pointer: let the autopilot start right away
    config.auto_resume_delay = 0.0;

    println!("Ether Fluid Simulation");
    println!("======================");
    println!("Surface: {}x{} @ resolution {}", width, height, config.resolution);
    println!(
        "dt: {}, Poisson iterations: {}, BFECC: {}, viscous: {}, bounce: {}",
        config.dt, config.iterations_poisson, config.bfecc, config.is_viscous, config.is_bounce
    );
    println!("Frames: {}", frames);
    println!();

    let report_every = (frames / 10).max(1);
    let mut sim = SimulationLoop::new(StatsCompositor::new(report_every), config);
    let posted = [
        Command::Init {
            surface: SurfaceSize::new(width, height),
            pixel_ratio: 1.0,
            initial_colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
        },
        Command::Start,
    ]
    .into_iter()
    .try_for_each(|command| sim.post(command));
    if let Err(e) = posted {
        eprintln!("Error queuing commands: {}", e);
        std::process::exit(1);
    }

    println!("Running simulation...");
    let start = Instant::now();

    for i in 0..frames {
        if !sim.tick(i as f64 * FRAME_MS) {
            eprintln!("Simulation did not start; see log output");
            std::process::exit(1);
        }

        if (i + 1) % report_every == 0 {
            if let Some(stats) = sim.compositor().last() {
                let elapsed = start.elapsed().as_secs_f32();
                println!(
                    "  Frame {}/{}: mean speed={:.5}, max speed={:.5}, mean |div|={:.2e}, {:.1} frames/s",
                    i + 1,
                    frames,
                    stats.mean_speed,
                    stats.max_speed,
                    stats.mean_abs_divergence,
                    (i + 1) as f32 / elapsed
                );
            }
        }
    }

    let elapsed = start.elapsed();
    if let Some(state) = sim.state() {
        let grid = state.solver.grid();
        println!();
        println!("Grid: {}x{}", grid.width, grid.height);
        println!("Simulated time: {:.3}", state.solver.time);
    }
    println!(
        "Time: {:.2}s ({:.1} frames/s)",
        elapsed.as_secs_f32(),
        frames as f32 / elapsed.as_secs_f32()
    );
}

fn print_example_config() {
    match serde_json::to_string_pretty(&FluidConfig::default()) {
        Ok(json) => {
            println!("Example configuration (config.json):");
            println!("{}", json);
        }
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
}
