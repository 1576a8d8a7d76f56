//! Rule evaluation.

use pt_graph::ProcessGraph;
use tracing::{debug, info, warn};

use crate::alert::Alert;
use crate::registers::RegisterMap;
use crate::rule::{Action, Effect, EffectAction, EffectTarget};

/// Stateless evaluator of one controller's rules against the graph.
#[derive(Debug, Clone, Copy)]
pub struct ActionEngine<'a> {
    controller: &'a str,
    map: &'a RegisterMap,
}

/// What one evaluation pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    pub evaluated: usize,
    pub fired: usize,
    /// Actions or effect targets skipped because of an error.
    pub skipped: usize,
    pub alerts: Vec<Alert>,
}

impl EvaluationReport {
    pub fn merge(&mut self, other: EvaluationReport) {
        self.evaluated += other.evaluated;
        self.fired += other.fired;
        self.skipped += other.skipped;
        self.alerts.extend(other.alerts);
    }
}

impl<'a> ActionEngine<'a> {
    pub fn new(controller: &'a str, map: &'a RegisterMap) -> Self {
        Self { controller, map }
    }

    /// Evaluate every action in order. A failing action never stops the batch.
    pub fn run(&self, actions: &[Action], graph: &mut ProcessGraph) -> EvaluationReport {
        let mut report = EvaluationReport::default();
        for action in actions {
            self.evaluate(action, graph, &mut report);
        }
        report
    }

    /// Evaluate one action and execute its effect if the trigger holds.
    pub fn evaluate(&self, action: &Action, graph: &mut ProcessGraph, report: &mut EvaluationReport) {
        report.evaluated += 1;
        let trigger = &action.trigger;

        let Some(device_id) = self.map.device_at(trigger.register) else {
            info!(controller = self.controller, register = trigger.register, "no device mapped to register");
            report.skipped += 1;
            return;
        };
        let Some(device) = graph.device(device_id) else {
            info!(controller = self.controller, device = device_id, "no device found for register");
            report.skipped += 1;
            return;
        };
        let actual = device.value();

        match trigger.condition.evaluate(actual, trigger.value) {
            None => {
                warn!(
                    controller = self.controller,
                    operator = trigger.condition.as_str(),
                    "unsupported condition operator, rule skipped"
                );
                report.skipped += 1;
            }
            Some(false) => {}
            Some(true) => {
                debug!(
                    controller = self.controller,
                    device = device_id,
                    actual,
                    operator = trigger.condition.as_str(),
                    expected = trigger.value,
                    "rule fired"
                );
                report.fired += 1;
                self.execute(&action.effect, graph, report);
            }
        }
    }

    fn execute(&self, effect: &Effect, graph: &mut ProcessGraph, report: &mut EvaluationReport) {
        for target in &effect.targets {
            let id = match target {
                EffectTarget::Supervisor => {
                    let message = effect
                        .message
                        .clone()
                        .unwrap_or_else(|| "alert raised".to_string());
                    warn!(target: "supervisor", controller = self.controller, %message, "supervisor alert");
                    report.alerts.push(Alert::new(self.controller, message));
                    continue;
                }
                EffectTarget::Device(id) => id,
            };

            let open = match &effect.action {
                Some(EffectAction::Open) => true,
                Some(EffectAction::Close) => false,
                Some(EffectAction::Unsupported(action)) => {
                    warn!(controller = self.controller, device = %id, %action, "unsupported effect action");
                    report.skipped += 1;
                    continue;
                }
                None => {
                    warn!(controller = self.controller, device = %id, "effect has no action");
                    report.skipped += 1;
                    continue;
                }
            };

            match graph.set_open(id, open) {
                Ok(()) => info!(controller = self.controller, device = %id, open, "effect applied"),
                Err(e) => {
                    warn!(controller = self.controller, device = %id, error = %e, "effect skipped");
                    report.skipped += 1;
                }
            }
        }
    }
}
