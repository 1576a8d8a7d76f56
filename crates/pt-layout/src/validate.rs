//! Layout validation.
//!
//! Validation never stops at the first problem: every finding is returned as
//! a [`Diagnostic`] naming the entity it disqualifies, so a caller can either
//! reject the layout or build the remaining valid subset.

use std::collections::{HashMap, HashSet};
use std::fmt;

use pt_core::{DEFAULT_REGISTER_COUNT, MAX_REGISTER_COUNT};

use crate::schema::{Layout, NodeKind};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },
}

/// Entity excluded by a diagnostic. Indices refer to positions in the layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Node(usize),
    Edge(usize),
    /// The declared `source` of the pump at this node index.
    PumpSource(usize),
    Plc(usize),
    PlcBinding { plc: usize, binding: usize },
    Scada,
    ScadaBinding(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub subject: Subject,
    pub error: ValidationError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

struct Collector(Vec<Diagnostic>);

impl Collector {
    fn push(&mut self, subject: Subject, error: ValidationError) {
        self.0.push(Diagnostic { subject, error });
    }
}

fn invalid(field: String, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn check_register_count(id: &str, size: usize) -> Option<ValidationError> {
    (size == 0 || size > MAX_REGISTER_COUNT).then(|| ValidationError::InvalidValue {
        field: format!("{id}.register_count"),
        value: size.to_string(),
        reason: format!("must be in 1..={MAX_REGISTER_COUNT}"),
    })
}

fn missing(id: &str, context: String) -> ValidationError {
    ValidationError::MissingReference {
        id: id.to_string(),
        context,
    }
}

/// Check a layout and return every problem found.
pub fn validate_layout(layout: &Layout) -> Vec<Diagnostic> {
    let mut out = Collector(Vec::new());

    // Nodes: ids unique, values physical. Later duplicates are the ones dropped.
    let mut kinds: HashMap<&str, &NodeKind> = HashMap::new();
    for (i, node) in layout.nodes.iter().enumerate() {
        if kinds.contains_key(node.id.as_str()) {
            out.push(
                Subject::Node(i),
                ValidationError::DuplicateId {
                    id: node.id.clone(),
                    context: "nodes".to_string(),
                },
            );
            continue;
        }
        if let Some(error) = check_node_values(&node.id, &node.kind) {
            out.push(Subject::Node(i), error);
            continue;
        }
        kinds.insert(&node.id, &node.kind);
    }

    // Edges: ids unique, endpoints known, at most one outlet per pump.
    let mut edge_ids = HashSet::new();
    let mut pump_outlets: HashSet<&str> = HashSet::new();
    for (i, edge) in layout.edges.iter().enumerate() {
        if !edge_ids.insert(edge.id.as_str()) {
            out.push(
                Subject::Edge(i),
                ValidationError::DuplicateId {
                    id: edge.id.clone(),
                    context: "edges".to_string(),
                },
            );
            continue;
        }
        let Some(source_kind) = kinds.get(edge.source.as_str()) else {
            out.push(
                Subject::Edge(i),
                missing(&edge.source, format!("edge '{}' source", edge.id)),
            );
            continue;
        };
        if !kinds.contains_key(edge.target.as_str()) {
            out.push(
                Subject::Edge(i),
                missing(&edge.target, format!("edge '{}' target", edge.id)),
            );
            continue;
        }
        if matches!(source_kind, NodeKind::Pump { .. }) && !pump_outlets.insert(edge.source.as_str())
        {
            out.push(
                Subject::Edge(i),
                ValidationError::Unsupported {
                    feature: format!("second outlet '{}' of pump '{}'", edge.id, edge.source),
                    reason: "a pump feeds exactly one line".to_string(),
                },
            );
        }
    }

    // Declared pump sources must name a tank.
    for (i, node) in layout.nodes.iter().enumerate() {
        let NodeKind::Pump {
            source: Some(source),
            ..
        } = &node.kind
        else {
            continue;
        };
        match kinds.get(source.as_str()) {
            None => out.push(
                Subject::PumpSource(i),
                missing(source, format!("pump '{}' source", node.id)),
            ),
            Some(NodeKind::Tank { .. }) => {}
            Some(other) => out.push(
                Subject::PumpSource(i),
                ValidationError::Unsupported {
                    feature: format!("pump '{}' drawing from a {}", node.id, other.type_name()),
                    reason: "pumps draw from tanks only".to_string(),
                },
            ),
        }
    }

    // Controllers: ids unique, register maps bijective and in range.
    let mut plc_ids = HashSet::new();
    for (p, plc) in layout.plcs.iter().enumerate() {
        if !plc_ids.insert(plc.id.as_str()) {
            out.push(
                Subject::Plc(p),
                ValidationError::DuplicateId {
                    id: plc.id.clone(),
                    context: "plcs".to_string(),
                },
            );
            continue;
        }
        let size = plc.register_count.unwrap_or(DEFAULT_REGISTER_COUNT);
        if let Some(error) = check_register_count(&plc.id, size) {
            out.push(Subject::Plc(p), error);
            continue;
        }
        let mut bindings = RegisterCheck::new(size, &kinds, format!("plc '{}'", plc.id));
        for (b, binding) in plc.devices.iter().enumerate() {
            if let Some(error) = bindings.check(&binding.id, binding.plc_input_register) {
                out.push(Subject::PlcBinding { plc: p, binding: b }, error);
            }
        }
    }

    if let Some(scada) = &layout.scada {
        if plc_ids.contains(scada.id.as_str()) {
            out.push(
                Subject::Scada,
                ValidationError::DuplicateId {
                    id: scada.id.clone(),
                    context: "controllers".to_string(),
                },
            );
        }
        let size = scada.register_count.unwrap_or(DEFAULT_REGISTER_COUNT);
        if let Some(error) = check_register_count(&scada.id, size) {
            out.push(Subject::Scada, error);
        } else {
            let mut bindings = RegisterCheck::new(size, &kinds, format!("scada '{}'", scada.id));
            for (device, &address) in &scada.register_map {
                if let Some(error) = bindings.check(device, address) {
                    out.push(Subject::ScadaBinding(device.clone()), error);
                }
            }
        }
    }

    out.0
}

fn check_node_values(id: &str, kind: &NodeKind) -> Option<ValidationError> {
    match *kind {
        NodeKind::Tank {
            max_capacity,
            initial_capacity,
        } => {
            for (field, value) in [("max_capacity", max_capacity), ("initial_capacity", initial_capacity)] {
                if !value.is_finite() || value < 0.0 {
                    return Some(invalid(format!("{id}.{field}"), value, "must be finite and >= 0"));
                }
            }
            (initial_capacity > max_capacity).then(|| {
                invalid(
                    format!("{id}.initial_capacity"),
                    initial_capacity,
                    "exceeds max_capacity",
                )
            })
        }
        NodeKind::Pump { flow_rate, .. } => (!flow_rate.is_finite() || flow_rate < 0.0)
            .then(|| invalid(format!("{id}.flow_rate"), flow_rate, "must be finite and >= 0")),
        NodeKind::Splitter => None,
    }
}

/// Bijectivity and range checks for one controller's bindings.
struct RegisterCheck<'a> {
    size: usize,
    nodes: &'a HashMap<&'a str, &'a NodeKind>,
    context: String,
    devices: HashSet<String>,
    registers: HashSet<u16>,
}

impl<'a> RegisterCheck<'a> {
    fn new(size: usize, nodes: &'a HashMap<&'a str, &'a NodeKind>, context: String) -> Self {
        Self {
            size,
            nodes,
            context,
            devices: HashSet::new(),
            registers: HashSet::new(),
        }
    }

    fn check(&mut self, device: &str, address: u16) -> Option<ValidationError> {
        if !self.nodes.contains_key(device) {
            return Some(missing(device, format!("{} register map", self.context)));
        }
        if address as usize >= self.size {
            return Some(invalid(
                format!("{}.{}", self.context, device),
                f64::from(address),
                "register outside the register file",
            ));
        }
        if !self.devices.insert(device.to_string()) {
            return Some(ValidationError::DuplicateId {
                id: device.to_string(),
                context: format!("{} register map", self.context),
            });
        }
        if !self.registers.insert(address) {
            self.devices.remove(device);
            return Some(ValidationError::DuplicateId {
                id: address.to_string(),
                context: format!("{} registers", self.context),
            });
        }
        None
    }
}
