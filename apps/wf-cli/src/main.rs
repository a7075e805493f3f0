use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use wf_core::Diagnostic;
use wf_equipment::{EquipmentConfig, EquipmentKind};
use wf_results::SolveResult;
use wf_solver::{Compiled, SolveOptions};

#[derive(Parser)]
#[command(name = "wf")]
#[command(about = "WaterFlow CLI - water-treatment flowsheet mass balance", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a request file and print the result as JSON
    Solve {
        /// Request file (.json, .yaml or .yml)
        request_path: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Validate a request without solving it
    Check {
        request_path: PathBuf,
    },
    /// Solve several request files in parallel and print one line each
    Batch {
        request_paths: Vec<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// List equipment types, their ports and default configs
    Types,
}

/// Solver settings; each one given here wins over the request's `options`.
#[derive(Args, Clone, Default)]
struct Overrides {
    #[arg(long)]
    tolerance: Option<f64>,
    #[arg(long)]
    max_iterations: Option<usize>,
    #[arg(long)]
    relaxation: Option<f64>,
    #[arg(long)]
    balance_tolerance: Option<f64>,
    /// Wall-clock limit in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl Overrides {
    fn resolve(&self, request: &wf_project::SolveRequest) -> SolveOptions {
        let mut opts = SolveOptions::from_request(&request.options);
        if let Some(v) = self.tolerance {
            opts.tolerance = v;
        }
        if let Some(v) = self.max_iterations {
            opts.max_iterations = v;
        }
        if let Some(v) = self.relaxation {
            opts.relaxation = v;
        }
        if let Some(v) = self.balance_tolerance {
            opts.balance_tolerance = v;
        }
        if let Some(ms) = self.timeout_ms {
            opts.timeout = Some(Duration::from_millis(ms));
        }
        opts
    }
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] wf_project::ProjectError),

    #[error(transparent)]
    Results(#[from] wf_results::ResultsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Solve {
            request_path,
            overrides,
            output,
            compact,
        } => cmd_solve(&request_path, &overrides, output.as_deref(), compact),
        Commands::Check { request_path } => cmd_check(&request_path),
        Commands::Batch {
            request_paths,
            overrides,
        } => cmd_batch(&request_paths, &overrides),
        Commands::Types => cmd_types(),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_solve(
    request_path: &Path,
    overrides: &Overrides,
    output: Option<&Path>,
    compact: bool,
) -> CliResult<ExitCode> {
    let request = wf_project::load(request_path)?;
    let options = overrides.resolve(&request);
    let result = wf_solver::solve_with(&request, &options);

    let json = if compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{}", json),
    }

    eprintln!("{}", status_line(request_path, &result)?);
    print_diagnostics(&result.diagnostics);
    Ok(exit_code(&result))
}

fn cmd_check(request_path: &Path) -> CliResult<ExitCode> {
    let request = wf_project::load(request_path)?;
    let options = SolveOptions::from_request(&request.options);
    match wf_solver::compile(&request, &options) {
        Compiled::Ready(flowsheet, advisories) => {
            let plan = flowsheet.graph.evaluation_plan();
            println!(
                "✓ Request is valid: {} equipment, {} streams, {} recycle loop(s)",
                flowsheet.graph.equipment().len(),
                flowsheet.graph.streams().len(),
                plan.iterative_blocks()
            );
            print_diagnostics(&advisories);
            Ok(ExitCode::SUCCESS)
        }
        Compiled::Rejected(mut diagnostics) => {
            wf_results::sort_diagnostics(&mut diagnostics);
            println!("✗ Request rejected");
            print_diagnostics(&diagnostics);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_batch(request_paths: &[PathBuf], overrides: &Overrides) -> CliResult<ExitCode> {
    let mut requests = Vec::with_capacity(request_paths.len());
    for path in request_paths {
        requests.push(wf_project::load(path)?);
    }

    let results = wf_solver::solve_batch_with(&requests, |r| overrides.resolve(r));

    let mut all_ok = true;
    for (path, result) in request_paths.iter().zip(&results) {
        println!("{}", status_line(path, result)?);
        all_ok &= result.converged && !result.summary.blocking;
    }
    Ok(if all_ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn cmd_types() -> CliResult<ExitCode> {
    for kind in EquipmentKind::ALL {
        println!("{}", kind);
        for port in kind.ports() {
            let kinds: Vec<String> = port
                .compatible
                .iter()
                .map(|k| format!("{:?}", k).to_lowercase())
                .collect();
            println!(
                "  {:<12} {:<7} [{}] Ø{:.0} mm, {:.0} bar{}",
                port.name,
                port.direction.to_string(),
                kinds.join(", "),
                port.diameter_m * 1000.0,
                port.max_pressure_bar,
                if port.required { ", required" } else { "" }
            );
        }
        let defaults = serde_json::to_value(EquipmentConfig::default_for(kind))?;
        if let Some(config) = defaults.get("config") {
            println!("  defaults: {}", config);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn status_line(path: &Path, result: &SolveResult) -> CliResult<String> {
    let fingerprint = result.fingerprint()?;
    Ok(format!(
        "{} {}: {} after {} iteration(s), recovery {:.1}%, residual {:.2e}, {} diagnostic(s) [{}]",
        if result.converged { "✓" } else { "✗" },
        path.display(),
        if result.converged { "converged" } else { "not converged" },
        result.iterations,
        result.system_recovery,
        result.max_residual,
        result.summary.total,
        &fingerprint[..12]
    ))
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        eprintln!("  {}", d);
    }
}

fn exit_code(result: &SolveResult) -> ExitCode {
    if result.converged && !result.summary.blocking {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
