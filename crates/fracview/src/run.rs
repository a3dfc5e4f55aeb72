use anyhow::{Context, Result};
use renderer::{run_viewer, EngineOptions, ViewerConfig};
use shaderlib::{formula_by_id, FractalFamily, FORMULAS};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

pub fn initialise_tracing() {
    let default_filter = "warn,fracview=info,renderer=info,framesink=info,naga=error,wgpu=error,wgpu_core=error,wgpu_hal=error,winit=error";
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    // Fail on a bad id here rather than after the window opens.
    formula_by_id(&cli.formula).with_context(|| {
        format!(
            "unknown formula `{}` (try --list-formulas)",
            cli.formula
        )
    })?;

    let (width, height) = cli.size.unwrap_or((1280, 720));
    let config = ViewerConfig {
        engine: EngineOptions {
            width,
            height,
            formula_id: cli.formula,
            ssaa: cli.ssaa,
            max_iterations: cli.max_iterations,
            palette_index: cli.palette,
        },
        capture_seconds: cli.capture_seconds,
        frame_server_url: cli.frame_server,
        randomize_spread: cli.randomize_spread,
    };
    tracing::debug!(
        formula = %config.engine.formula_id,
        width,
        height,
        "launching viewer"
    );
    run_viewer(config)
}

pub fn list_formulas() {
    println!("{:<16} {:<22} {:<10} notation", "id", "name", "family");
    for formula in FORMULAS {
        let family = match formula.family {
            FractalFamily::Escape => "escape",
            FractalFamily::Newton => "newton",
            FractalFamily::Nova => "nova",
            FractalFamily::Kleinian => "kleinian",
        };
        println!(
            "{:<16} {:<22} {:<10} {}",
            formula.id, formula.name, family, formula.notation
        );
    }
}
