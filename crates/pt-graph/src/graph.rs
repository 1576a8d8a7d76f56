//! Process graph: arena of components and lines plus the per-tick passes.

use std::collections::HashMap;

use pt_bus::{BusResult, Command, Publisher, topics};
use pt_components::{Component, Device, DeviceKind, Line, RegisterOverride};
use pt_core::{CompId, LineId, Volume};
use tracing::{debug, info, warn};

use crate::error::{GraphError, GraphResult};
use crate::events::{ProcessEvent, PublishReport, Transfer, UpdateReport};
use crate::indexing::NameIndex;

/// How a pump's transfer is bounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferPolicy {
    /// Bounded by source volume only; the target tank clamps and the excess is
    /// reported as overflow.
    #[default]
    Overflowing,
    /// Additionally bounded by the target tank's pre-tick headroom, shared pro
    /// rata among the pumps feeding it.
    HeadroomCapped,
}

/// Owner of every component and line of one simulated process.
///
/// Components reference each other only through [`CompId`] / [`LineId`], so
/// the whole graph can be moved or guarded as a single value.
#[derive(Debug, Clone)]
pub struct ProcessGraph {
    pub(crate) components: Vec<Component>,
    pub(crate) names: NameIndex,
    pub(crate) lines: Vec<Line>,
    pub(crate) line_names: NameIndex,
    pub(crate) policy: TransferPolicy,
}

struct PumpRequest {
    pump: CompId,
    source: CompId,
    line: LineId,
    amount: Volume,
    /// Target tank whose headroom bounds this transfer.
    capped_by: Option<CompId>,
}

/// `amount`'s share of `available` when `total` demand exceeds it.
fn pro_rata(amount: Volume, total: Volume, available: Volume) -> Volume {
    if total > available && total > 0.0 {
        amount * available / total
    } else {
        amount
    }
}

impl ProcessGraph {
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn component(&self, id: CompId) -> Option<&Component> {
        self.components.get(id.slot())
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id.slot())
    }

    /// Arena id of the component with external id `id`.
    pub fn lookup(&self, id: &str) -> Option<CompId> {
        self.names.get(id)
    }

    pub fn lookup_line(&self, id: &str) -> Option<LineId> {
        self.line_names.get(id)
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.lookup(id).and_then(|c| self.component(c))
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.get(id).map(|c| &c.device)
    }

    pub fn device_mut(&mut self, id: &str) -> Option<&mut Device> {
        let slot = self.lookup(id)?.slot();
        self.components.get_mut(slot).map(|c| &mut c.device)
    }

    /// External id of an arena component, for messages.
    pub fn name_of(&self, id: CompId) -> &str {
        self.names.name(id).unwrap_or("?")
    }

    pub fn line_name_of(&self, id: LineId) -> &str {
        self.line_names.name(id).unwrap_or("?")
    }

    pub fn policy(&self) -> TransferPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: TransferPolicy) {
        self.policy = policy;
    }

    /// Volume held in tanks plus volume in flight on lines.
    pub fn total_volume(&self) -> Volume {
        let stored: Volume = self.components.iter().map(|c| c.device.stored_volume()).sum();
        let in_flight: Volume = self.lines.iter().map(Line::buffer).sum();
        stored + in_flight
    }

    /// Advance the process by one tick.
    ///
    /// Phase one moves volume from every open pump's source into its outlet
    /// line, reading only pre-tick tank volumes. Phase two flushes lines into
    /// their targets until no line holds volume.
    pub fn update(&mut self) -> UpdateReport {
        let mut report = UpdateReport::default();
        self.transfer_phase(&mut report);
        self.flush_phase(&mut report);
        debug!(
            transfers = report.transfers.len(),
            transferred = report.transferred(),
            events = report.events.len(),
            "graph updated"
        );
        report
    }

    fn transfer_phase(&mut self, report: &mut UpdateReport) {
        let mut requests = Vec::new();
        for (slot, comp) in self.components.iter().enumerate() {
            let Device::Pump(pump) = &comp.device else {
                continue;
            };
            let requested = pump.requested();
            if requested <= 0.0 {
                continue;
            }
            let pump_id = CompId::from_index(slot as u32);

            let Some(line) = pump.outlet else {
                warn!(pump = %comp.id, "open pump has no outlet, nothing moved");
                report.events.push(ProcessEvent::UnsupportedTarget {
                    from: pump_id,
                    target: None,
                    amount: 0.0,
                });
                continue;
            };
            let target = self.lines[line.slot()].target;
            let target_comp = &self.components[target.slot()];
            let capped_by = match &target_comp.device {
                Device::Pump(_) => {
                    warn!(
                        pump = %comp.id,
                        to = %target_comp.id,
                        "pump cannot feed another pump, nothing moved"
                    );
                    report.events.push(ProcessEvent::UnsupportedTarget {
                        from: pump_id,
                        target: Some(target),
                        amount: 0.0,
                    });
                    continue;
                }
                Device::Tank(_) if self.policy == TransferPolicy::HeadroomCapped => Some(target),
                _ => None,
            };

            let Some(source) = pump.source else {
                debug!(pump = %comp.id, "pump has no source");
                continue;
            };
            requests.push(PumpRequest {
                pump: pump_id,
                source,
                line,
                amount: requested,
                capped_by,
            });
        }

        // Pumps feeding one capped tank split its pre-tick headroom pro rata.
        let mut inflow: HashMap<CompId, Volume> = HashMap::new();
        for r in &requests {
            if let Some(target) = r.capped_by {
                *inflow.entry(target).or_default() += r.amount;
            }
        }
        for r in &mut requests {
            let Some(target) = r.capped_by else {
                continue;
            };
            let headroom = self.components[target.slot()]
                .device
                .as_tank()
                .map_or(0.0, |t| t.headroom());
            let total = inflow.get(&target).copied().unwrap_or(0.0);
            r.amount = pro_rata(r.amount, total, headroom);
        }

        // Pumps sharing a source split its pre-tick volume pro rata.
        let mut demand: HashMap<CompId, Volume> = HashMap::new();
        for r in &requests {
            *demand.entry(r.source).or_default() += r.amount;
        }
        let available: HashMap<CompId, Volume> = demand
            .keys()
            .map(|&s| (s, self.components[s.slot()].device.stored_volume()))
            .collect();

        for r in requests {
            let total = demand.get(&r.source).copied().unwrap_or(0.0);
            let avail = available.get(&r.source).copied().unwrap_or(0.0);
            let share = pro_rata(r.amount, total, avail);
            let Some(tank) = self.components[r.source.slot()].device.as_tank_mut() else {
                continue;
            };
            let taken = tank.withdraw(share);
            self.lines[r.line.slot()].fill(taken);
            report.transfers.push(Transfer {
                pump: r.pump,
                source: r.source,
                line: r.line,
                amount: taken,
            });
        }
    }

    fn flush_phase(&mut self, report: &mut UpdateReport) {
        // An acyclic chain of splitters drains in at most one round per line.
        let rounds = self.lines.len() + 1;
        for _ in 0..rounds {
            let mut moved = false;
            for slot in 0..self.lines.len() {
                let amount = self.lines[slot].drain();
                if amount <= 0.0 {
                    continue;
                }
                moved = true;
                self.deliver(LineId::from_index(slot as u32), amount, report);
            }
            if !moved {
                return;
            }
        }

        for (slot, line) in self.lines.iter().enumerate() {
            if !line.is_empty() {
                warn!(line = %line.id, buffered = line.buffer(), "line did not drain this tick");
                report.events.push(ProcessEvent::FlushStalled {
                    line: LineId::from_index(slot as u32),
                    amount: line.buffer(),
                });
            }
        }
    }

    fn deliver(&mut self, line: LineId, amount: Volume, report: &mut UpdateReport) {
        let (from, target) = {
            let l = &self.lines[line.slot()];
            (l.source, l.target)
        };
        let comp = &mut self.components[target.slot()];
        match &mut comp.device {
            Device::Tank(tank) => match tank.receive(amount) {
                Ok(overflow) if overflow > 0.0 => {
                    warn!(tank = %comp.id, lost = overflow, "tank overflow");
                    report.events.push(ProcessEvent::Overflow {
                        tank: target,
                        amount: overflow,
                    });
                }
                Ok(_) => {}
                Err(e) => warn!(tank = %comp.id, error = %e, "tank rejected delivery"),
            },
            Device::Splitter(splitter) => {
                let division = splitter.divide(amount);
                if division.dropped > 0.0 {
                    warn!(splitter = %comp.id, lost = division.dropped, "splitter has no outputs, volume dropped");
                    report.events.push(ProcessEvent::SplitterDrop {
                        splitter: target,
                        amount: division.dropped,
                    });
                }
                for (out, share) in division.shares {
                    self.lines[out.slot()].fill(share);
                }
            }
            Device::Pump(_) => {
                warn!(
                    line = %self.lines[line.slot()].id,
                    pump = %comp.id,
                    lost = amount,
                    "pump cannot receive volume, dropped"
                );
                report.events.push(ProcessEvent::UnsupportedTarget {
                    from,
                    target: Some(target),
                    amount,
                });
            }
        }
    }

    /// Publish every component's state.
    ///
    /// A failing publish is logged and recorded against its component only;
    /// the pass always visits every component. Lines carry no published state.
    pub fn publish(&mut self, publisher: &dyn Publisher) -> PublishReport {
        let mut report = PublishReport::default();
        for comp in &mut self.components {
            match publish_component(comp, publisher) {
                Ok(count) => report.published += count,
                Err(e) => {
                    warn!(component = %comp.id, error = %e, "publish failed");
                    report.failed.push(comp.id.clone());
                }
            }
        }
        report
    }

    /// Apply a remote command. Returns the overflow caused by a capacity cut.
    pub fn apply_command(&mut self, command: &Command) -> GraphResult<Option<ProcessEvent>> {
        let id = command.target();
        let comp_id = self
            .lookup(id)
            .ok_or_else(|| GraphError::UnknownComponent { id: id.to_string() })?;
        let component_err = |source| GraphError::Component {
            id: id.to_string(),
            source,
        };

        let device = &mut self.components[comp_id.slot()].device;
        let mut event = None;
        match (command, device) {
            (Command::SetPumpRate { rate, .. }, Device::Pump(p)) => {
                p.set_rate(*rate).map_err(component_err)?;
            }
            (Command::SetPumpState { state, .. }, Device::Pump(p)) => p.set_open(state.is_open()),
            (Command::SetTankMaxCapacity { capacity, .. }, Device::Tank(t)) => {
                let spilled = t.set_max_capacity(*capacity).map_err(component_err)?;
                if spilled > 0.0 {
                    warn!(tank = id, lost = spilled, "capacity lowered below volume");
                    event = Some(ProcessEvent::Overflow {
                        tank: comp_id,
                        amount: spilled,
                    });
                }
            }
            (Command::SetTankMaxCapacity { .. }, other) => {
                return Err(GraphError::WrongKind {
                    id: id.to_string(),
                    expected: DeviceKind::Tank,
                    actual: other.kind(),
                });
            }
            (_, other) => {
                return Err(GraphError::WrongKind {
                    id: id.to_string(),
                    expected: DeviceKind::Pump,
                    actual: other.kind(),
                });
            }
        }
        info!(component = id, topic = %command.topic(), "command applied");
        Ok(event)
    }

    /// Open or close a device by external id.
    pub fn set_open(&mut self, id: &str, open: bool) -> GraphResult<()> {
        let device = self
            .device_mut(id)
            .ok_or_else(|| GraphError::UnknownComponent { id: id.to_string() })?;
        device.set_open(open).map_err(|source| GraphError::Component {
            id: id.to_string(),
            source,
        })
    }

    /// Apply an external register value to a device by external id.
    pub fn apply_register(&mut self, id: &str, value: f64) -> GraphResult<RegisterOverride> {
        let device = self
            .device_mut(id)
            .ok_or_else(|| GraphError::UnknownComponent { id: id.to_string() })?;
        device
            .apply_register(value)
            .map_err(|source| GraphError::Component {
                id: id.to_string(),
                source,
            })
    }
}

fn publish_component(comp: &mut Component, publisher: &dyn Publisher) -> BusResult<usize> {
    let id = comp.id.as_str();
    match &mut comp.device {
        Device::Tank(tank) => {
            publisher.publish(&topics::tank_volume(id), &tank.current_volume().to_string())?;
            publisher.publish(
                &topics::tank_max_capacity(id),
                &tank.max_capacity().to_string(),
            )?;
            // Kept pending until its topic is out, so a failed pass retries it.
            let overflow = tank.pending_overflow();
            if overflow > 0.0 {
                publisher.publish(&topics::tank_overflow(id), &overflow.to_string())?;
                tank.take_overflow();
                return Ok(3);
            }
            Ok(2)
        }
        Device::Pump(pump) => {
            publisher.publish(&topics::pump_rate(id), &pump.rate().to_string())?;
            let state = pt_bus::PumpState::from_open(pump.is_open());
            publisher.publish(&topics::pump_state(id), state.as_payload())?;
            Ok(2)
        }
        Device::Splitter(splitter) => {
            publisher.publish(&topics::splitter_status(id), splitter.status())?;
            Ok(1)
        }
    }
}
