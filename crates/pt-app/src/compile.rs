//! Compilation of a layout document into a graph and its controllers.

use std::collections::HashSet;

use pt_components::{Component, Device, Position, Pump, Splitter, Tank};
use pt_controls::{Action, Controller, ControllerKind, Effect, Endpoint, RegisterMap};
use pt_core::DEFAULT_REGISTER_COUNT;
use pt_graph::{GraphBuilder, ProcessGraph, TransferPolicy};
use pt_layout::{ActionDef, Diagnostic, Layout, NodeKind, Subject, validate_layout};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// How diagnostics found while loading a layout are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Any diagnostic rejects the layout.
    Strict,
    /// Entities named by a diagnostic are left out; the rest is built.
    #[default]
    Lenient,
}

/// A layout turned into runtime structures.
#[derive(Debug)]
pub struct Compiled {
    pub graph: ProcessGraph,
    pub controllers: Vec<Controller>,
    /// Problems found in the layout. Empty under [`LoadPolicy::Strict`].
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile a layout under `policy`.
pub fn compile(layout: &Layout, policy: LoadPolicy, transfer_policy: TransferPolicy) -> AppResult<Compiled> {
    let diagnostics = validate_layout(layout);
    if policy == LoadPolicy::Strict && !diagnostics.is_empty() {
        return Err(AppError::Invalid { diagnostics });
    }
    for d in &diagnostics {
        warn!(subject = ?d.subject, "{d}; skipped");
    }
    let skipped: HashSet<&Subject> = diagnostics.iter().map(|d| &d.subject).collect();

    let graph = build_graph(layout, &skipped, transfer_policy)?;
    let controllers = build_controllers(layout, &skipped)?;

    info!(
        components = graph.components().len(),
        lines = graph.lines().len(),
        controllers = controllers.len(),
        diagnostics = diagnostics.len(),
        "layout compiled"
    );
    Ok(Compiled {
        graph,
        controllers,
        diagnostics,
    })
}

fn build_graph(
    layout: &Layout,
    skipped: &HashSet<&Subject>,
    transfer_policy: TransferPolicy,
) -> AppResult<ProcessGraph> {
    let mut builder = GraphBuilder::new();
    builder.transfer_policy(transfer_policy);

    for (i, node) in layout.nodes.iter().enumerate() {
        if skipped.contains(&Subject::Node(i)) {
            continue;
        }
        let device = match node.kind {
            NodeKind::Tank {
                max_capacity,
                initial_capacity,
            } => Device::Tank(Tank::new(max_capacity, initial_capacity)?),
            NodeKind::Pump {
                flow_rate, is_open, ..
            } => Device::Pump(Pump::new(flow_rate, is_open)?),
            NodeKind::Splitter => Device::Splitter(Splitter::new()),
        };
        let name = if node.name.is_empty() {
            &node.id
        } else {
            &node.name
        };
        let mut component = Component::new(&node.id, name, device);
        if let Some([x, y]) = node.position {
            component = component.with_position(Position { x, y });
        }
        builder.add_component(component)?;
    }

    for (i, node) in layout.nodes.iter().enumerate() {
        if let NodeKind::Pump {
            source: Some(source),
            ..
        } = &node.kind
            && !skipped.contains(&Subject::Node(i))
            && !skipped.contains(&Subject::PumpSource(i))
        {
            builder.set_pump_source(&node.id, source)?;
        }
    }

    for (i, edge) in layout.edges.iter().enumerate() {
        if skipped.contains(&Subject::Edge(i)) {
            continue;
        }
        builder.connect(&edge.id, &edge.source, &edge.target)?;
    }

    Ok(builder.build()?)
}

fn build_controllers(layout: &Layout, skipped: &HashSet<&Subject>) -> AppResult<Vec<Controller>> {
    let mut controllers = Vec::with_capacity(layout.plcs.len() + 1);

    for (p, plc) in layout.plcs.iter().enumerate() {
        if skipped.contains(&Subject::Plc(p)) {
            continue;
        }
        let mut map = RegisterMap::new();
        for (b, binding) in plc.devices.iter().enumerate() {
            if !skipped.contains(&Subject::PlcBinding { plc: p, binding: b }) {
                map.insert(&binding.id, binding.plc_input_register)?;
            }
        }
        let size = plc.register_count.unwrap_or(DEFAULT_REGISTER_COUNT);
        let controller = Controller::new(&plc.id, ControllerKind::Plc, map, size)?
            .with_actions(compile_actions(&plc.actions));
        controllers.push(with_endpoint(controller, plc.ip.as_deref(), plc.port));
    }

    if let Some(scada) = &layout.scada
        && !skipped.contains(&Subject::Scada)
    {
        let mut map = RegisterMap::new();
        for (device, &address) in &scada.register_map {
            if !skipped.contains(&Subject::ScadaBinding(device.clone())) {
                map.insert(device, address)?;
            }
        }
        let size = scada.register_count.unwrap_or(DEFAULT_REGISTER_COUNT);
        let controller = Controller::new(&scada.id, ControllerKind::Supervisor, map, size)?
            .with_actions(compile_actions(&scada.actions));
        controllers.push(with_endpoint(controller, scada.ip.as_deref(), scada.port));
    }

    Ok(controllers)
}

fn with_endpoint(controller: Controller, ip: Option<&str>, port: Option<u16>) -> Controller {
    match port {
        Some(port) => controller.with_endpoint(Endpoint {
            ip: ip.unwrap_or("0.0.0.0").to_string(),
            port,
        }),
        None => controller,
    }
}

/// Convert action definitions into rules. Unknown operators and effect
/// actions are kept and skipped at evaluation time.
pub fn compile_actions(defs: &[ActionDef]) -> Vec<Action> {
    defs.iter()
        .map(|def| {
            Action::new(
                def.trigger.register,
                &def.trigger.condition,
                def.trigger.value,
                Effect::new(
                    def.effect.target.ids(),
                    def.effect.action.as_deref(),
                    def.effect.message.clone(),
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_controls::{Condition, EffectAction, EffectTarget};

    fn layout(json: &str) -> Layout {
        pt_layout::Format::Json.parse(json).unwrap()
    }

    const BASE: &str = r#"{
        "nodes": [
            {"id": "t1", "name": "Feed", "type": "Tank", "max_capacity": 100, "initial_capacity": 50, "position": [0, 1]},
            {"id": "p1", "type": "Pump", "flow_rate": 10, "source": "t1"},
            {"id": "t2", "type": "Tank", "max_capacity": 100}
        ],
        "edges": [
            {"id": "e1", "source": "t1", "target": "p1"},
            {"id": "e2", "source": "p1", "target": "t2"}
        ],
        "plcs": [
            {"id": "plc1", "ip": "10.0.0.2", "port": 5020,
             "devices": [{"id": "t1", "plc_input_register": 0}, {"id": "p1", "plc_input_register": 1}],
             "actions": [{"trigger": {"register": 0, "condition": "<", "value": 20},
                          "effect": {"target": "p1", "action": "close"}}]}
        ],
        "scada": {"register_map": {"t2": 0},
                  "actions": [{"trigger": {"register": 0, "condition": ">=", "value": 90},
                               "effect": {"target": ["scada", "p1"], "action": "close", "message": "t2 full"}}]}
    }"#;

    #[test]
    fn compiles_clean_layout() {
        let compiled = compile(&layout(BASE), LoadPolicy::Strict, TransferPolicy::default()).unwrap();
        assert!(compiled.diagnostics.is_empty());
        assert_eq!(compiled.graph.components().len(), 3);
        assert_eq!(compiled.graph.lines().len(), 2);

        let feed = compiled.graph.get("t1").unwrap();
        assert_eq!(feed.name, "Feed");
        assert_eq!(feed.position, Some(Position { x: 0.0, y: 1.0 }));
        assert_eq!(compiled.graph.get("t2").unwrap().name, "t2");

        let [plc, scada] = compiled.controllers.as_slice() else {
            panic!("expected two controllers");
        };
        assert_eq!(plc.kind(), ControllerKind::Plc);
        assert_eq!(plc.endpoint().map(|e| e.port), Some(5020));
        assert_eq!(plc.map().register_of("p1"), Some(1));
        assert_eq!(scada.id(), "scada");
        assert_eq!(scada.kind(), ControllerKind::Supervisor);
        assert!(scada.endpoint().is_none());
        assert_eq!(
            scada.actions()[0].effect.targets,
            vec![EffectTarget::Supervisor, EffectTarget::Device("p1".into())]
        );
    }

    #[test]
    fn action_conversion_keeps_unknown_operators() {
        let defs: Vec<ActionDef> = pt_layout::Format::Json
            .parse(
                r#"[{"trigger": {"register": 3, "condition": "~", "value": 1},
                     "effect": {"target": "p1", "action": "toggle"}}]"#,
            )
            .unwrap();
        let actions = compile_actions(&defs);
        assert_eq!(actions[0].trigger.register, 3);
        assert_eq!(actions[0].trigger.condition, Condition::Unsupported("~".into()));
        assert!(matches!(actions[0].effect.action, Some(EffectAction::Unsupported(_))));
    }

    #[test]
    fn lenient_skips_bad_entities() {
        let broken = BASE
            .replace(r#""max_capacity": 100}"#, r#""max_capacity": -1}"#)
            .replace(r#""source": "t1"}"#, r#""source": "nope"}"#);
        let l = layout(&broken);

        assert!(matches!(
            compile(&l, LoadPolicy::Strict, TransferPolicy::default()),
            Err(AppError::Invalid { diagnostics }) if !diagnostics.is_empty()
        ));

        let compiled = compile(&l, LoadPolicy::Lenient, TransferPolicy::default()).unwrap();
        let subjects: Vec<_> = compiled.diagnostics.iter().map(|d| d.subject.clone()).collect();
        assert!(subjects.contains(&Subject::Node(2)));
        assert!(subjects.contains(&Subject::Edge(1)));
        assert!(subjects.contains(&Subject::PumpSource(1)));
        assert!(subjects.contains(&Subject::ScadaBinding("t2".into())));

        assert!(compiled.graph.get("t2").is_none());
        assert_eq!(compiled.graph.lines().len(), 1);
        // Source inferred from the remaining tank -> pump line.
        let pump = compiled.graph.device("p1").and_then(|d| d.as_pump()).unwrap();
        assert!(pump.source.is_some());
        assert!(compiled.controllers[1].map().is_empty());
    }

    #[test]
    fn oversized_register_file_skips_the_controller() {
        let huge = BASE.replace(
            r#""id": "plc1", "ip""#,
            r#""id": "plc1", "register_count": 18446744073709551615, "ip""#,
        );
        let l = layout(&huge);
        assert!(matches!(
            compile(&l, LoadPolicy::Strict, TransferPolicy::default()),
            Err(AppError::Invalid { .. })
        ));
        let compiled = compile(&l, LoadPolicy::Lenient, TransferPolicy::default()).unwrap();
        assert_eq!(compiled.diagnostics[0].subject, Subject::Plc(0));
        assert_eq!(compiled.controllers.len(), 1);
        assert_eq!(compiled.controllers[0].kind(), ControllerKind::Supervisor);
    }

    #[test]
    fn duplicate_controller_is_skipped() {
        let dup = BASE.replace(r#""scada": {"#, r#""scada": {"id": "plc1", "#);
        let compiled = compile(&layout(&dup), LoadPolicy::Lenient, TransferPolicy::default()).unwrap();
        assert_eq!(compiled.controllers.len(), 1);
        assert_eq!(compiled.diagnostics[0].subject, Subject::Scada);
    }
}
