use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use pt_app::{AppError, AppResult, LoadPolicy, RunRequest, RunResponse, project_service, run_service};
use pt_bus::{BusResult, Publisher, RateLimitedPublisher, RateLimiter};
use pt_graph::TransferPolicy;
use pt_layout::Diagnostic;
use pt_sim::{SimOptions, TickReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pt-cli")]
#[command(about = "ProcessTwin CLI - process plant digital twin", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a layout and list every problem found
    Validate {
        /// Path to the layout (.json, .yaml or .yml)
        layout_path: PathBuf,
        /// Exit with an error if any problem is found
        #[arg(long)]
        strict: bool,
    },
    /// List components, lines and controllers of a layout
    Inspect {
        /// Path to the layout (.json, .yaml or .yml)
        layout_path: PathBuf,
    },
    /// Run the tick loop
    Run {
        /// Path to the layout (.json, .yaml or .yml)
        layout_path: PathBuf,
        /// Tick period in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
        /// Stop after this many ticks (runs until killed if omitted)
        #[arg(long)]
        ticks: Option<u64>,
        /// Refuse layouts with any problem instead of skipping the bad parts
        #[arg(long)]
        strict: bool,
        /// Cap pump transfers by the target tank's headroom
        #[arg(long)]
        headroom_capped: bool,
        /// Maximum published messages per second
        #[arg(long)]
        rate_limit: Option<u32>,
        /// Traffic script of register writes and commands to inject
        #[arg(long)]
        inject: Option<PathBuf>,
        /// Do not print published messages
        #[arg(long)]
        quiet: bool,
    },
}

struct RunArgs {
    interval_ms: u64,
    ticks: Option<u64>,
    strict: bool,
    headroom_capped: bool,
    rate_limit: Option<u32>,
    inject: Option<PathBuf>,
    quiet: bool,
}

/// Prints every message as `topic payload`.
struct StdoutPublisher {
    quiet: bool,
}

impl Publisher for StdoutPublisher {
    fn publish(&self, topic: &str, payload: &str) -> BusResult<()> {
        if !self.quiet {
            println!("{topic} {payload}");
        }
        Ok(())
    }
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            layout_path,
            strict,
        } => cmd_validate(&layout_path, strict),
        Commands::Inspect { layout_path } => cmd_inspect(&layout_path),
        Commands::Run {
            layout_path,
            interval_ms,
            ticks,
            strict,
            headroom_capped,
            rate_limit,
            inject,
            quiet,
        } => cmd_run(
            &layout_path,
            RunArgs {
                interval_ms,
                ticks,
                strict,
                headroom_capped,
                rate_limit,
                inject,
                quiet,
            },
        ),
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        println!("  ✗ {:?}: {}", d.subject, d);
    }
}

fn cmd_validate(layout_path: &Path, strict: bool) -> AppResult<()> {
    println!("Validating layout: {}", layout_path.display());
    let layout = project_service::load_layout(layout_path)?;
    let diagnostics = project_service::validate(&layout);

    if diagnostics.is_empty() {
        println!("✓ Layout is valid");
        return Ok(());
    }
    print_diagnostics(&diagnostics);
    if strict {
        return Err(AppError::Invalid { diagnostics });
    }
    println!(
        "{} problem(s); the affected entities are skipped when running",
        diagnostics.len()
    );
    Ok(())
}

fn cmd_inspect(layout_path: &Path) -> AppResult<()> {
    let layout = project_service::load_layout(layout_path)?;
    let summary = project_service::summarize(&layout);
    let compiled = pt_app::compile(&layout, LoadPolicy::Lenient, TransferPolicy::default())?;

    println!(
        "{} tank(s), {} pump(s), {} splitter(s), {} line(s); capacity {} with {} stored",
        summary.tanks,
        summary.pumps,
        summary.splitters,
        summary.lines,
        summary.capacity,
        summary.initial_volume
    );

    println!("Components:");
    for component in compiled.graph.components() {
        let position = component
            .position
            .map(|p| format!(" @ ({}, {})", p.x, p.y))
            .unwrap_or_default();
        println!(
            "  {:<12} {:<9} value {:<8} {}{}",
            component.id,
            component.kind().as_str(),
            component.device.value(),
            component.name,
            position
        );
    }

    println!("Lines:");
    for line in compiled.graph.lines() {
        println!(
            "  {:<12} {} -> {}",
            line.id,
            compiled.graph.name_of(line.source),
            compiled.graph.name_of(line.target)
        );
    }

    println!("Controllers:");
    for controller in &compiled.controllers {
        let endpoint = controller
            .endpoint()
            .map(|e| format!("{}:{}", e.ip, e.port))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<12} {:<10} {:<21} {} register(s) bound, {} rule(s)",
            controller.id(),
            controller.kind().as_str(),
            endpoint,
            controller.map().len(),
            controller.actions().len()
        );
        for (device, address) in controller.map().iter() {
            println!("    r{address:<4} {device}");
        }
    }

    if !compiled.diagnostics.is_empty() {
        println!("Skipped:");
        print_diagnostics(&compiled.diagnostics);
    }
    Ok(())
}

fn cmd_run(layout_path: &Path, args: RunArgs) -> AppResult<()> {
    let options = SimOptions {
        interval: Duration::from_millis(args.interval_ms),
        max_ticks: args.ticks,
        transfer_policy: if args.headroom_capped {
            TransferPolicy::HeadroomCapped
        } else {
            TransferPolicy::Overflowing
        },
        ..SimOptions::default()
    };
    let request = RunRequest {
        layout_path,
        policy: if args.strict {
            LoadPolicy::Strict
        } else {
            LoadPolicy::Lenient
        },
        options,
        script_path: args.inject.as_deref(),
    };

    println!("Running layout: {}", layout_path.display());
    let stdout = StdoutPublisher { quiet: args.quiet };
    let mut on_tick = |report: &TickReport| {
        if !args.quiet {
            println!(
                "-- tick {} fired {} moved {} lost {}",
                report.tick,
                report.evaluation.fired,
                report.update.transferred(),
                report.lost()
            );
        }
    };

    let response = match args.rate_limit {
        Some(limit) => {
            let limited = RateLimitedPublisher::new(stdout, RateLimiter::per_second(limit));
            let response = run_service::run_observed(&request, &limited, &mut on_tick)?;
            if limited.dropped() > 0 {
                println!("  {} message(s) dropped by the rate limit", limited.dropped());
            }
            response
        }
        None => run_service::run_observed(&request, &stdout, &mut on_tick)?,
    };

    print_summary(&response);
    Ok(())
}

fn print_summary(response: &RunResponse) {
    let summary = &response.summary;
    if !response.diagnostics.is_empty() {
        println!("Skipped at load:");
        print_diagnostics(&response.diagnostics);
    }
    println!("✓ Ran {} tick(s)", summary.ticks);
    println!(
        "  Tick time: avg {:?}, max {:?}, {} overrun(s)",
        summary.stats.average(),
        summary.stats.max,
        summary.stats.overruns
    );
    println!(
        "  Volume lost: {} over {} event(s)",
        summary.lost, summary.events
    );
    println!(
        "  Alerts: {}, rejected inbound: {}, publish failures: {}",
        summary.alerts, summary.rejected, summary.publish_failures
    );
    if response.injected + response.injection_failures > 0 {
        println!(
            "  Injected: {} ({} refused)",
            response.injected, response.injection_failures
        );
    }
}
