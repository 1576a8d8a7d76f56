//! Validation diagnostics name the entity they disqualify.

use pt_layout::{Layout, Subject, ValidationError, validate_layout};

fn parse(json: &str) -> Layout {
    serde_json::from_str(json).unwrap()
}

#[test]
fn edge_with_unknown_endpoint() {
    let layout = parse(
        r#"{
        "nodes": [{"id": "t1", "type": "Tank"}],
        "edges": [
            {"id": "e1", "source": "t1", "target": "ghost"},
            {"id": "e2", "source": "nowhere", "target": "t1"}
        ]
    }"#,
    );
    let diags = validate_layout(&layout);
    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0].subject, Subject::Edge(0));
    assert!(matches!(
        &diags[0].error,
        ValidationError::MissingReference { id, .. } if id == "ghost"
    ));
    assert_eq!(diags[1].subject, Subject::Edge(1));
}

#[test]
fn unresolved_and_non_tank_pump_sources() {
    let layout = parse(
        r#"{
        "nodes": [
            {"id": "s", "type": "Splitter"},
            {"id": "p1", "type": "Pump", "source": "missing"},
            {"id": "p2", "type": "Pump", "source": "s"}
        ]
    }"#,
    );
    let diags = validate_layout(&layout);
    let subjects: Vec<_> = diags.iter().map(|d| d.subject.clone()).collect();
    assert_eq!(subjects, vec![Subject::PumpSource(1), Subject::PumpSource(2)]);
    assert!(matches!(diags[1].error, ValidationError::Unsupported { .. }));
}

#[test]
fn duplicate_and_unphysical_nodes() {
    let layout = parse(
        r#"{
        "nodes": [
            {"id": "t", "type": "Tank", "max_capacity": 10, "initial_capacity": 20},
            {"id": "p", "type": "Pump", "flow_rate": -1},
            {"id": "ok", "type": "Splitter"},
            {"id": "ok", "type": "Splitter"}
        ]
    }"#,
    );
    let diags = validate_layout(&layout);
    let subjects: Vec<_> = diags.iter().map(|d| d.subject.clone()).collect();
    assert_eq!(
        subjects,
        vec![Subject::Node(0), Subject::Node(1), Subject::Node(3)]
    );
    assert!(matches!(diags[2].error, ValidationError::DuplicateId { .. }));
}

#[test]
fn pump_with_two_outlets() {
    let layout = parse(
        r#"{
        "nodes": [
            {"id": "p", "type": "Pump"},
            {"id": "a", "type": "Tank"},
            {"id": "b", "type": "Tank"}
        ],
        "edges": [
            {"id": "e1", "source": "p", "target": "a"},
            {"id": "e2", "source": "p", "target": "b"}
        ]
    }"#,
    );
    let diags = validate_layout(&layout);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].subject, Subject::Edge(1));
}

#[test]
fn register_maps_must_be_bijective_and_in_range() {
    let layout = parse(
        r#"{
        "nodes": [
            {"id": "t1", "type": "Tank"},
            {"id": "t2", "type": "Tank"},
            {"id": "p1", "type": "Pump"}
        ],
        "plcs": [{
            "id": "plc1",
            "register_count": 8,
            "devices": [
                {"id": "t1", "plc_input_register": 0},
                {"id": "t2", "plc_input_register": 0},
                {"id": "t1", "plc_input_register": 3},
                {"id": "p1", "plc_input_register": 8},
                {"id": "ghost", "plc_input_register": 4}
            ]
        }],
        "scada": {"id": "plc1", "register_map": {"t2": 100}}
    }"#,
    );
    let diags = validate_layout(&layout);
    let subjects: Vec<_> = diags.iter().map(|d| d.subject.clone()).collect();
    assert_eq!(
        subjects,
        vec![
            Subject::PlcBinding { plc: 0, binding: 1 },
            Subject::PlcBinding { plc: 0, binding: 2 },
            Subject::PlcBinding { plc: 0, binding: 3 },
            Subject::PlcBinding { plc: 0, binding: 4 },
            Subject::Scada,
            Subject::ScadaBinding("t2".into()),
        ]
    );
}

#[test]
fn register_count_out_of_range_disqualifies_the_controller() {
    let layout = parse(
        r#"{
        "nodes": [{"id": "t1", "type": "Tank"}],
        "plcs": [
            {"id": "huge", "register_count": 18446744073709551615,
             "devices": [{"id": "t1", "plc_input_register": 0}]},
            {"id": "empty", "register_count": 0,
             "devices": [{"id": "t1", "plc_input_register": 0}]},
            {"id": "widest", "register_count": 65536,
             "devices": [{"id": "t1", "plc_input_register": 65535}]}
        ],
        "scada": {"register_count": 65537, "register_map": {"t1": 0}}
    }"#,
    );
    let diags = validate_layout(&layout);
    let subjects: Vec<_> = diags.iter().map(|d| d.subject.clone()).collect();
    assert_eq!(subjects, vec![Subject::Plc(0), Subject::Plc(1), Subject::Scada]);
    assert!(matches!(
        &diags[0].error,
        ValidationError::InvalidValue { field, .. } if field == "huge.register_count"
    ));
}

#[test]
fn unknown_operators_are_not_load_errors() {
    let layout = parse(
        r#"{
        "nodes": [{"id": "t1", "type": "Tank"}],
        "plcs": [{
            "id": "plc1",
            "devices": [{"id": "t1", "plc_input_register": 0}],
            "actions": [{
                "trigger": {"register": 0, "condition": "=~", "value": 1},
                "effect": {"target": "t1", "action": "explode"}
            }]
        }]
    }"#,
    );
    assert!(validate_layout(&layout).is_empty());
}
