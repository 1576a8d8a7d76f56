//! Simulation setup and execution.

use std::path::Path;

use pt_bus::Publisher;
use pt_layout::{Diagnostic, InjectKind, Script};
use pt_sim::{InboundSender, RunHooks, RunSummary, SimOptions, Simulation, TickReport};
use tracing::{info, warn};

use crate::compile::{self, LoadPolicy};
use crate::error::AppResult;
use crate::project_service;

/// Request to run a layout.
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    pub layout_path: &'a Path,
    pub policy: LoadPolicy,
    pub options: SimOptions,
    /// Traffic to inject while running.
    pub script_path: Option<&'a Path>,
}

/// A simulation ready to run, with what was dropped to build it.
pub struct Prepared {
    pub simulation: Simulation,
    pub diagnostics: Vec<Diagnostic>,
    pub script: Script,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub summary: RunSummary,
    pub diagnostics: Vec<Diagnostic>,
    /// Script entries handed to the mailbox.
    pub injected: usize,
    /// Script entries the mailbox refused.
    pub injection_failures: usize,
}

/// Delivers script entries before the tick they name.
#[derive(Debug, Clone, Default)]
pub struct ScriptHooks {
    script: Script,
    delivered: usize,
    failed: usize,
}

impl ScriptHooks {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            delivered: 0,
            failed: 0,
        }
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn failed(&self) -> usize {
        self.failed
    }
}

impl RunHooks for ScriptHooks {
    fn before_tick(&mut self, tick: u64, inbox: &InboundSender) {
        for entry in self.script.due(tick) {
            let sent = match entry {
                InjectKind::Register {
                    controller,
                    address,
                    value,
                } => inbox.write_register(controller, *address, *value),
                InjectKind::Command { topic, payload } => inbox.publish_command(topic, payload),
            };
            match sent {
                Ok(()) => self.delivered += 1,
                Err(e) => {
                    warn!(tick, entry = ?entry, error = %e, "injection refused");
                    self.failed += 1;
                }
            }
        }
    }
}

/// Load, compile and wire a layout into a simulation.
pub fn prepare(request: &RunRequest<'_>) -> AppResult<Prepared> {
    let layout = project_service::load_layout(request.layout_path)?;
    let compiled = compile::compile(&layout, request.policy, request.options.transfer_policy)?;
    let script = match request.script_path {
        Some(path) => project_service::load_script(path)?,
        None => Script::default(),
    };
    let simulation = Simulation::new(
        compiled.graph,
        compiled.controllers,
        request.options.clone(),
    )?;
    Ok(Prepared {
        simulation,
        diagnostics: compiled.diagnostics,
        script,
    })
}

/// Prepare and run a layout until `max_ticks` or a stop request.
pub fn run(request: &RunRequest<'_>, publisher: &dyn Publisher) -> AppResult<RunResponse> {
    run_observed(request, publisher, &mut |_: &TickReport| {})
}

/// [`run`], calling `on_tick` after every tick.
pub fn run_observed(
    request: &RunRequest<'_>,
    publisher: &dyn Publisher,
    on_tick: &mut dyn FnMut(&TickReport),
) -> AppResult<RunResponse> {
    struct Observed<'a> {
        script: ScriptHooks,
        on_tick: &'a mut dyn FnMut(&TickReport),
    }

    impl RunHooks for Observed<'_> {
        fn before_tick(&mut self, tick: u64, inbox: &InboundSender) {
            self.script.before_tick(tick, inbox);
        }

        fn after_tick(&mut self, report: &TickReport) {
            (self.on_tick)(report);
        }
    }

    let Prepared {
        mut simulation,
        diagnostics,
        script,
    } = prepare(request)?;
    info!(
        layout = %request.layout_path.display(),
        injections = script.entries.len(),
        "starting run"
    );
    let mut hooks = Observed {
        script: ScriptHooks::new(script),
        on_tick,
    };
    let summary = simulation.run_with_hooks(publisher, &mut hooks);
    Ok(RunResponse {
        summary,
        diagnostics,
        injected: hooks.script.delivered(),
        injection_failures: hooks.script.failed(),
    })
}
