use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fsic_case::Case;
use fsic_couple::{Components, CoupleOptions, CoupleProgressEvent, CoupleStage, run_coupled};

#[derive(Parser)]
#[command(name = "fsic-cli")]
#[command(about = "Partitioned fluid-structure interaction coupling kernel", long_about = None)]
struct Cli {
    /// Case directory; running with no subcommand defaults to `run`.
    case_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Raise the tracing log level (repeatable: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case's settings.txt without running it.
    Validate {
        case_path: PathBuf,
    },
    /// Run the coupled simulation for a case.
    Run {
        case_path: PathBuf,
        /// Root directory persisted component output is written under.
        #[arg(long, default_value = "data")]
        data_root: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let command = match (cli.command, cli.case_path) {
        (Some(cmd), _) => cmd,
        (None, Some(case_path)) => Commands::Run {
            case_path,
            data_root: PathBuf::from("data"),
        },
        (None, None) => {
            eprintln!("error: expected a case directory");
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Run { case_path, data_root } => cmd_run(&case_path, &data_root),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(case_path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating case: {}", case_path.display());
    let settings = fsic_case::Settings::load(&case_path.join("settings.txt"))?;
    println!(
        "settings ok: n_start={} n_stop={} k_stop={} dt={} segments={}",
        settings.n_start, settings.n_stop, settings.k_stop, settings.dt, settings.pipe_flow.m
    );
    Ok(())
}

fn cmd_run(
    case_path: &std::path::Path,
    data_root: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Running case in {}", case_path.display());

    let mut case = Case::load(case_path, data_root)?;
    let opts = CoupleOptions {
        n_start: case.settings.n_start,
        n_stop: case.settings.n_stop,
        k_stop: case.settings.k_stop,
        dt: case.settings.dt,
    };

    let components = Components {
        flow: &mut case.flow,
        structure: &mut case.structure,
        coupler: &mut case.coupler,
        extrapolator: &mut case.extrapolator,
        convergence: &mut case.convergence,
    };

    let mut cb = render_cli_progress;
    let summary = run_coupled(components, &opts, Some(&mut cb))?;
    println!();
    println!(
        "✓ Completed {} steps, output under {}",
        summary.steps_run(),
        case.datapath.display()
    );
    Ok(())
}

fn render_cli_progress(event: CoupleProgressEvent) {
    match event.stage {
        CoupleStage::StepStarted => {
            print!("\rstep {:>5}  starting...", event.step);
        }
        CoupleStage::IterationDone => {
            print!(
                "\rstep {:>5}  iter {:>3}  |r| = {:>10.3e}",
                event.step, event.iteration, event.residual_norm
            );
        }
        CoupleStage::StepConverged => {
            print!(
                "\rstep {:>5}  converged in {:>3} iterations, |r| = {:>10.3e}",
                event.step, event.iteration, event.residual_norm
            );
            println!();
        }
        CoupleStage::StepExhausted => {
            print!(
                "\rstep {:>5}  did not converge within {:>3} iterations, |r| = {:>10.3e}",
                event.step, event.iteration, event.residual_norm
            );
            println!();
        }
    }
    let _ = io::stdout().flush();
}
