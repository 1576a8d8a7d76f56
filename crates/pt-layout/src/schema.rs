//! Layout document schema.
//!
//! A layout lists nodes and the edges between them, plus optional PLC and
//! supervisor configurations bound to node ids through register addresses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layout {
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub edges: Vec<EdgeDef>,
    #[serde(default)]
    pub plcs: Vec<PlcDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scada: Option<ScadaDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    /// `[x, y]`, for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum NodeKind {
    Tank {
        #[serde(default = "default_max_capacity")]
        max_capacity: f64,
        #[serde(default)]
        initial_capacity: f64,
    },
    Pump {
        #[serde(default = "default_flow_rate")]
        flow_rate: f64,
        #[serde(default = "default_is_open")]
        is_open: bool,
        /// Tank the pump draws from; inferred from edges when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    Splitter,
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Tank { .. } => "Tank",
            NodeKind::Pump { .. } => "Pump",
            NodeKind::Splitter => "Splitter",
        }
    }
}

fn default_max_capacity() -> f64 {
    1000.0
}

fn default_flow_rate() -> f64 {
    10.0
}

fn default_is_open() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub source: String,
    pub target: String,
}

/// Device binding of a PLC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceBinding {
    pub id: String,
    pub plc_input_register: u16,
    /// Topic the device's state is mirrored on, informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mqtt_topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlcDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default)]
    pub devices: Vec<DeviceBinding>,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScadaDef {
    #[serde(default = "default_scada_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Device id -> register address.
    #[serde(default)]
    pub register_map: BTreeMap<String, u16>,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_count: Option<usize>,
}

fn default_scada_id() -> String {
    "scada".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionDef {
    pub trigger: TriggerDef,
    pub effect: EffectDef,
}

/// Operators stay strings here; unknown ones are reported when evaluated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerDef {
    pub register: u16,
    pub condition: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectDef {
    pub target: TargetDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One target id or a list of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TargetDef {
    One(String),
    Many(Vec<String>),
}

impl TargetDef {
    pub fn ids(&self) -> Vec<&str> {
        match self {
            TargetDef::One(id) => vec![id.as_str()],
            TargetDef::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_defaults() {
        let json = r#"{
            "nodes": [
                {"id": "t1", "name": "Tank", "type": "Tank"},
                {"id": "p1", "name": "Pump", "type": "Pump", "position": [1.5, 2.0]},
                {"id": "s1", "type": "Splitter"}
            ],
            "edges": []
        }"#;
        let layout: Layout = serde_json::from_str(json).unwrap();
        assert_eq!(
            layout.nodes[0].kind,
            NodeKind::Tank {
                max_capacity: 1000.0,
                initial_capacity: 0.0
            }
        );
        assert_eq!(
            layout.nodes[1].kind,
            NodeKind::Pump {
                flow_rate: 10.0,
                is_open: true,
                source: None
            }
        );
        assert_eq!(layout.nodes[1].position, Some([1.5, 2.0]));
        assert_eq!(layout.nodes[2].kind.type_name(), "Splitter");
        assert!(layout.plcs.is_empty());
        assert!(layout.scada.is_none());
    }

    #[test]
    fn effect_target_one_or_many() {
        let one: EffectDef = serde_json::from_str(r#"{"target": "pump1", "action": "close"}"#).unwrap();
        assert_eq!(one.target.ids(), vec!["pump1"]);
        let many: EffectDef =
            serde_json::from_str(r#"{"target": ["p1", "scada"], "message": "hi"}"#).unwrap();
        assert_eq!(many.target.ids(), vec!["p1", "scada"]);
        assert_eq!(many.action, None);
    }

    #[test]
    fn scada_defaults() {
        let scada: ScadaDef = serde_yaml::from_str("register_map:\n  tank1: 3\n").unwrap();
        assert_eq!(scada.id, "scada");
        assert_eq!(scada.register_map.get("tank1"), Some(&3));
    }
}
