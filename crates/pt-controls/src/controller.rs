//! Register-sync bridge: PLC and supervisor controllers.
//!
//! A controller exchanges state with the graph in two directions:
//! - **push**: canonical device values are written to the mapped registers
//! - **override**: an external register write is applied to the mapped device
//!
//! Overrides are applied as-is. There is no authentication and no rollback;
//! the next evaluation and push observe whatever was written.

use pt_components::{Device, RegisterOverride};
use pt_core::{MAX_REGISTER_COUNT, Real, RegisterAddr};
use pt_graph::ProcessGraph;
use tracing::{info, warn};

use crate::engine::{ActionEngine, EvaluationReport};
use crate::error::{ControlError, ControlResult};
use crate::registers::{RegisterBank, RegisterMap};
use crate::rule::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    /// Field controller bound to a subset of devices.
    Plc,
    /// Plant-wide supervisor.
    Supervisor,
}

impl ControllerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ControllerKind::Plc => "plc",
            ControllerKind::Supervisor => "supervisor",
        }
    }
}

/// Network endpoint the external register server binds for this controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub ip: String,
    pub port: u16,
}

/// Result of a push pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    pub written: usize,
    /// Mapped devices that do not exist in the graph.
    pub missing: Vec<String>,
}

/// What an external register write did.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideOutcome {
    /// The write reached a device.
    Applied {
        device: String,
        effect: RegisterOverride,
    },
    /// No device is mapped at that address; only the register changed.
    Stored,
}

/// A rule-evaluating, register-synchronizing controller.
#[derive(Debug, Clone)]
pub struct Controller {
    id: String,
    kind: ControllerKind,
    endpoint: Option<Endpoint>,
    map: RegisterMap,
    bank: RegisterBank,
    actions: Vec<Action>,
}

impl Controller {
    /// Create a controller with a register file of `register_count` slots.
    ///
    /// # Errors
    /// Fails if `register_count` is zero or exceeds [`MAX_REGISTER_COUNT`], or
    /// if the map binds an address outside the register file.
    pub fn new(
        id: impl Into<String>,
        kind: ControllerKind,
        map: RegisterMap,
        register_count: usize,
    ) -> ControlResult<Self> {
        if register_count == 0 || register_count > MAX_REGISTER_COUNT {
            return Err(ControlError::RegisterFileSize {
                size: register_count,
                max: MAX_REGISTER_COUNT,
            });
        }
        if let Some(address) = map.max_address()
            && address as usize >= register_count
        {
            return Err(ControlError::RegisterOutOfRange {
                address,
                size: register_count,
            });
        }
        Ok(Self {
            id: id.into(),
            kind,
            endpoint: None,
            map,
            bank: RegisterBank::new(register_count),
            actions: Vec::new(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn registers(&self) -> &[Real] {
        self.bank.as_slice()
    }

    pub fn read(&self, address: RegisterAddr) -> ControlResult<Real> {
        self.bank.read(address)
    }

    /// Evaluate this controller's rules against the current graph state.
    pub fn evaluate(&self, graph: &mut ProcessGraph) -> EvaluationReport {
        ActionEngine::new(&self.id, &self.map).run(&self.actions, graph)
    }

    /// Write every mapped device's canonical value to its register.
    pub fn push(&mut self, graph: &ProcessGraph) -> PushReport {
        let mut report = PushReport::default();
        for (device, address) in self.map.iter() {
            let Some(value) = graph.device(device).map(Device::value) else {
                report.missing.push(device.to_string());
                continue;
            };
            // Addresses were range-checked at construction.
            if self.bank.write(address, value).is_ok() {
                report.written += 1;
            }
        }
        if !report.missing.is_empty() {
            warn!(controller = %self.id, missing = ?report.missing, "mapped devices not in graph");
        }
        report
    }

    /// Rule evaluation followed by push, as done once per tick.
    pub fn tick(&mut self, graph: &mut ProcessGraph) -> EvaluationReport {
        let report = self.evaluate(graph);
        self.push(graph);
        report
    }

    /// Apply an external write of `value` to register `address`.
    ///
    /// The register is updated first, then the mapped device (if any). A tank
    /// volume outside `[0, max_capacity]` is clamped.
    ///
    /// # Errors
    /// Non-finite values and out-of-range addresses are rejected with the
    /// register left unchanged; a device that cannot take the value yields a
    /// graph error after the register was written.
    pub fn apply_override(
        &mut self,
        graph: &mut ProcessGraph,
        address: RegisterAddr,
        value: Real,
    ) -> ControlResult<OverrideOutcome> {
        if !value.is_finite() {
            return Err(ControlError::MalformedValue { address, value });
        }
        self.bank.write(address, value)?;

        let Some(device) = self.map.device_at(address) else {
            info!(controller = %self.id, address, value, "write to unmapped register stored");
            return Ok(OverrideOutcome::Stored);
        };
        let effect = graph.apply_register(device, value)?;
        match effect {
            RegisterOverride::TankVolume(o) if o.was_clamped() => warn!(
                controller = %self.id,
                device,
                requested = o.requested,
                applied = o.applied,
                "volume override clamped to tank bounds"
            ),
            _ => info!(controller = %self.id, device, address, value, "register override applied"),
        }
        Ok(OverrideOutcome::Applied {
            device: device.to_string(),
            effect,
        })
    }
}
