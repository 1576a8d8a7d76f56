//! Incremental graph builder.

use pt_components::{Component, Device, Pump, Splitter, Tank};
use pt_core::{CompId, LineId, Volume};

use crate::error::{GraphError, GraphResult};
use crate::graph::{ProcessGraph, TransferPolicy};
use crate::indexing::NameIndex;
use crate::validate;

/// Builder for constructing a process graph incrementally.
///
/// Components and lines are added by external id; cross references are only
/// resolved by `build()`, so insertion order does not matter.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    names: NameIndex,
    components: Vec<Component>,
    line_names: NameIndex,
    /// (line id, source id, target id), resolved at build time.
    lines: Vec<(String, String, String)>,
    pump_sources: Vec<(CompId, String)>,
    policy: TransferPolicy,
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fully formed component and return its arena id.
    pub fn add_component(&mut self, component: Component) -> GraphResult<CompId> {
        let id = self
            .names
            .insert(&component.id)
            .map_err(|_| GraphError::DuplicateComponent {
                id: component.id.clone(),
            })?;
        self.components.push(component);
        Ok(id)
    }

    pub fn add_tank(
        &mut self,
        id: &str,
        name: &str,
        max_capacity: Volume,
        initial_volume: Volume,
    ) -> GraphResult<CompId> {
        let tank = Tank::new(max_capacity, initial_volume).map_err(|source| {
            GraphError::Component {
                id: id.to_string(),
                source,
            }
        })?;
        self.add_component(Component::new(id, name, Device::Tank(tank)))
    }

    pub fn add_pump(&mut self, id: &str, name: &str, rate: Volume, open: bool) -> GraphResult<CompId> {
        let pump = Pump::new(rate, open).map_err(|source| GraphError::Component {
            id: id.to_string(),
            source,
        })?;
        self.add_component(Component::new(id, name, Device::Pump(pump)))
    }

    pub fn add_splitter(&mut self, id: &str, name: &str) -> GraphResult<CompId> {
        self.add_component(Component::new(id, name, Device::Splitter(Splitter::new())))
    }

    /// Add a line from `source` to `target`.
    ///
    /// Endpoints may be added later; they are resolved by `build()`.
    pub fn connect(&mut self, id: &str, source: &str, target: &str) -> GraphResult<LineId> {
        let line = self
            .line_names
            .insert(id)
            .map_err(|_| GraphError::DuplicateLine { id: id.to_string() })?;
        self.lines
            .push((id.to_string(), source.to_string(), target.to_string()));
        Ok(line)
    }

    /// Declare the tank a pump draws from.
    ///
    /// Without a declaration the pump's source is inferred from an incoming
    /// line whose source is a tank.
    pub fn set_pump_source(&mut self, pump: &str, source: &str) -> GraphResult<()> {
        let id = self
            .names
            .get(pump)
            .ok_or_else(|| GraphError::UnknownComponent {
                id: pump.to_string(),
            })?;
        let actual = self.components[id.slot()].kind();
        if actual != pt_components::DeviceKind::Pump {
            return Err(GraphError::WrongKind {
                id: pump.to_string(),
                expected: pt_components::DeviceKind::Pump,
                actual,
            });
        }
        self.pump_sources.push((id, source.to_string()));
        Ok(())
    }

    pub fn transfer_policy(&mut self, policy: TransferPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Number of components added so far.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Resolve references, wire lines into components and freeze the topology.
    pub fn build(mut self) -> GraphResult<ProcessGraph> {
        let lines = validate::resolve_lines(&self.names, &self.lines)?;
        validate::resolve_pump_sources(&mut self.components, &self.names, &self.pump_sources)?;
        validate::wire_lines(&mut self.components, &lines)?;
        validate::warn_idle_pumps(&self.components);

        Ok(ProcessGraph {
            components: self.components,
            names: self.names,
            lines,
            line_names: self.line_names,
            policy: self.policy,
        })
    }
}
