//! Simulation runner.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use pt_bus::{Publisher, topics};
use pt_controls::Controller;
use pt_core::TickTimer;
use pt_graph::{ProcessGraph, TransferPolicy};
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::inbox::{self, Inbound, InboundSender};
use crate::report::{RunSummary, TickReport};

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed tick period.
    pub interval: Duration,
    /// Stop after this many ticks (per `run` call). `None` runs until stopped.
    pub max_ticks: Option<u64>,
    /// Capacity of the inbound mailbox.
    pub inbound_capacity: usize,
    pub transfer_policy: TransferPolicy,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_ticks: None,
            inbound_capacity: 1024,
            transfer_policy: TransferPolicy::default(),
        }
    }
}

/// Cooperative stop flag shared with other threads.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Ask the loop to exit. The tick in progress runs to completion.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Callbacks around each tick of [`Simulation::run_with_hooks`].
pub trait RunHooks {
    /// Called before the inbox is drained; messages sent here land this tick.
    fn before_tick(&mut self, _tick: u64, _inbox: &InboundSender) {}

    fn after_tick(&mut self, _report: &TickReport) {}
}

impl RunHooks for () {}

/// A running process twin: the graph, its controllers and the tick loop.
pub struct Simulation {
    graph: ProcessGraph,
    controllers: Vec<Controller>,
    by_id: HashMap<String, usize>,
    sender: InboundSender,
    inbox: Receiver<Inbound>,
    options: SimOptions,
    tick: u64,
    stop: StopHandle,
}

impl Simulation {
    pub fn new(
        mut graph: ProcessGraph,
        controllers: Vec<Controller>,
        options: SimOptions,
    ) -> SimResult<Self> {
        if options.inbound_capacity == 0 {
            return Err(SimError::InvalidArg {
                what: "inbound_capacity must be positive",
            });
        }
        let mut by_id = HashMap::new();
        for (i, controller) in controllers.iter().enumerate() {
            if by_id.insert(controller.id().to_string(), i).is_some() {
                return Err(SimError::DuplicateController {
                    id: controller.id().to_string(),
                });
            }
        }
        graph.set_policy(options.transfer_policy);
        let (sender, inbox) = inbox::channel(options.inbound_capacity);

        Ok(Self {
            graph,
            controllers,
            by_id,
            sender,
            inbox,
            options,
            tick: 0,
            stop: StopHandle::default(),
        })
    }

    /// Handle for queueing register writes and commands from any thread.
    pub fn sender(&self) -> InboundSender {
        self.sender.clone()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn graph(&self) -> &ProcessGraph {
        &self.graph
    }

    pub fn controllers(&self) -> &[Controller] {
        &self.controllers
    }

    pub fn controller(&self, id: &str) -> Option<&Controller> {
        self.by_id.get(id).map(|&i| &self.controllers[i])
    }

    pub fn options(&self) -> &SimOptions {
        &self.options
    }

    /// Number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Execute one tick without pacing.
    ///
    /// Order: drain inbox, evaluate and push every controller, update the
    /// graph, publish the graph, publish supervisor alerts.
    pub fn step(&mut self, publisher: &dyn Publisher) -> TickReport {
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        self.drain_inbox(&mut report);

        for controller in &mut self.controllers {
            let evaluation = controller.tick(&mut self.graph);
            report.evaluation.merge(evaluation);
        }

        report.update = self.graph.update();
        report.publish = self.graph.publish(publisher);

        for alert in &report.evaluation.alerts {
            if let Err(e) = publisher.publish(topics::SUPERVISOR_ALERTS, &alert.to_string()) {
                warn!(error = %e, "alert publish failed");
                report.publish.failed.push(topics::SUPERVISOR_ALERTS.to_string());
            } else {
                report.publish.published += 1;
            }
        }

        debug!(
            tick = self.tick,
            fired = report.evaluation.fired,
            transferred = report.update.transferred(),
            events = report.update.events.len(),
            published = report.publish.published,
            "tick complete"
        );
        self.tick += 1;
        report
    }

    /// Apply queued messages, at most one mailbox worth per tick so a flooding
    /// producer cannot starve the loop.
    fn drain_inbox(&mut self, report: &mut TickReport) {
        for _ in 0..self.options.inbound_capacity {
            match self.inbox.try_recv() {
                Ok(message) => self.apply(message, report),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn apply(&mut self, message: Inbound, report: &mut TickReport) {
        match message {
            Inbound::RegisterWrite {
                controller,
                address,
                value,
            } => {
                let Some(&i) = self.by_id.get(&controller) else {
                    warn!(%controller, address, "register write for unknown controller");
                    report.rejected += 1;
                    return;
                };
                match self.controllers[i].apply_override(&mut self.graph, address, value) {
                    Ok(_) => report.overrides += 1,
                    Err(e) => {
                        warn!(%controller, address, value, error = %e, "register write rejected");
                        report.rejected += 1;
                    }
                }
            }
            Inbound::Command(command) => match self.graph.apply_command(&command) {
                Ok(event) => {
                    report.commands += 1;
                    report.command_events.extend(event);
                }
                Err(e) => {
                    warn!(topic = %command.topic(), error = %e, "command rejected");
                    report.rejected += 1;
                }
            },
        }
    }

    /// Run the paced loop until `max_ticks` or a stop request.
    pub fn run(&mut self, publisher: &dyn Publisher) -> RunSummary {
        self.run_with_hooks(publisher, &mut ())
    }

    /// Run the paced loop, calling `hooks` around every tick.
    ///
    /// Each tick sleeps for what is left of the interval. An overrunning tick
    /// is followed immediately by the next one; missed ticks are not replayed.
    pub fn run_with_hooks<H: RunHooks + ?Sized>(
        &mut self,
        publisher: &dyn Publisher,
        hooks: &mut H,
    ) -> RunSummary {
        let interval = self.options.interval;
        let mut summary = RunSummary::default();
        info!(
            interval_ms = interval.as_millis() as u64,
            max_ticks = ?self.options.max_ticks,
            controllers = self.controllers.len(),
            "simulation started"
        );

        loop {
            if self.stop.is_stopped() {
                summary.stopped = true;
                break;
            }
            if self.options.max_ticks.is_some_and(|max| summary.ticks >= max) {
                break;
            }

            let timer = TickTimer::start(interval);
            hooks.before_tick(self.tick, &self.sender);
            let report = self.step(publisher);
            hooks.after_tick(&report);
            summary.absorb(&report, timer.elapsed(), interval);

            let remaining = timer.remaining();
            if remaining.is_zero() {
                debug!(tick = report.tick, "tick overran its interval");
            } else {
                std::thread::sleep(remaining);
            }
        }

        info!(
            ticks = summary.ticks,
            overruns = summary.stats.overruns,
            lost = summary.lost,
            stopped = summary.stopped,
            "simulation finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.interval, Duration::from_secs(1));
        assert_eq!(opts.max_ticks, None);
        assert_eq!(opts.inbound_capacity, 1024);
        assert_eq!(opts.transfer_policy, TransferPolicy::Overflowing);
    }

    #[test]
    fn stop_handle_is_shared() {
        let handle = StopHandle::default();
        let other = handle.clone();
        other.stop();
        assert!(handle.is_stopped());
    }

    fn idle(max_ticks: Option<u64>) -> Simulation {
        let graph = pt_graph::GraphBuilder::new().build().unwrap();
        let options = SimOptions {
            interval: Duration::ZERO,
            max_ticks,
            inbound_capacity: 2,
            ..SimOptions::default()
        };
        Simulation::new(graph, Vec::new(), options).unwrap()
    }

    #[test]
    fn stop_before_run_runs_nothing() {
        let mut sim = idle(None);
        sim.stop_handle().stop();
        let summary = sim.run(&pt_bus::MemoryBus::new());
        assert_eq!(summary.ticks, 0);
        assert!(summary.stopped);
    }

    #[test]
    fn max_ticks_counts_per_run() {
        let mut sim = idle(Some(2));
        let bus = pt_bus::MemoryBus::new();
        assert_eq!(sim.run(&bus).ticks, 2);
        assert_eq!(sim.run(&bus).ticks, 2);
        assert_eq!(sim.tick_count(), 4);
    }

    #[test]
    fn full_mailbox_refuses_at_the_producer() {
        let mut sim = idle(Some(1));
        let tx = sim.sender();
        tx.write_register("nobody", 0, 1.0).unwrap();
        tx.write_register("nobody", 1, 1.0).unwrap();
        assert_eq!(tx.write_register("nobody", 2, 1.0), Err(SimError::InboxFull));

        let report = sim.step(&pt_bus::MemoryBus::new());
        assert_eq!(report.rejected, 2);
        assert_eq!(tx.pending(), 0);
    }
}
