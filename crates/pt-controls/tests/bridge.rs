//! Register-sync bridge behaviour across ticks.

use proptest::prelude::*;
use pt_components::RegisterOverride;
use pt_controls::{
    Action, ControlError, Controller, ControllerKind, Effect, OverrideOutcome, RegisterMap,
};
use pt_core::MAX_REGISTER_COUNT;
use pt_graph::{GraphBuilder, ProcessGraph};

fn plant(tank_volume: f64) -> ProcessGraph {
    let mut b = GraphBuilder::new();
    b.add_tank("tank1", "Tank", 100.0, tank_volume).unwrap();
    b.add_pump("pump1", "Pump", 10.0, true).unwrap();
    b.add_tank("sink", "Sink", 1000.0, 0.0).unwrap();
    b.connect("in", "tank1", "pump1").unwrap();
    b.connect("out", "pump1", "sink").unwrap();
    b.build().unwrap()
}

fn plc() -> Controller {
    let mut map = RegisterMap::new();
    map.insert("tank1", 0).unwrap();
    map.insert("pump1", 1).unwrap();
    let close = Effect::new(["pump1"], Some("close"), None);
    Controller::new("plc1", ControllerKind::Plc, map, 10)
        .unwrap()
        .with_actions(vec![Action::new(0, ">", 50.0, close)])
}

#[test]
fn rule_closes_pump_when_threshold_exceeded() {
    let mut graph = plant(60.0);
    let mut ctl = plc();
    let report = ctl.tick(&mut graph);
    assert_eq!(report.fired, 1);
    assert_eq!(graph.device("pump1").unwrap().value(), 0.0);
    assert_eq!(ctl.read(1).unwrap(), 0.0);
    assert_eq!(ctl.read(0).unwrap(), 60.0);
}

#[test]
fn rule_leaves_pump_below_threshold() {
    let mut graph = plant(40.0);
    let mut ctl = plc();
    let report = ctl.tick(&mut graph);
    assert_eq!(report.fired, 0);
    assert_eq!(graph.device("pump1").unwrap().value(), 1.0);
    assert_eq!(ctl.read(1).unwrap(), 1.0);
}

#[test]
fn override_is_visible_to_next_evaluation_and_push() {
    let mut graph = plant(40.0);
    let mut ctl = plc();
    ctl.tick(&mut graph);
    graph.update();

    // External write between ticks pushes the tank over the threshold.
    let outcome = ctl.apply_override(&mut graph, 0, 75.0).unwrap();
    assert!(matches!(
        outcome,
        OverrideOutcome::Applied { effect: RegisterOverride::TankVolume(_), .. }
    ));

    let report = ctl.tick(&mut graph);
    assert_eq!(report.fired, 1);
    assert_eq!(ctl.read(0).unwrap(), 75.0);
    assert_eq!(ctl.read(1).unwrap(), 0.0);
}

#[test]
fn pump_override_interprets_one_as_open() {
    let mut graph = plant(60.0);
    let mut ctl = plc();
    ctl.tick(&mut graph);
    ctl.apply_override(&mut graph, 1, 1.0).unwrap();
    assert_eq!(graph.device("pump1").unwrap().value(), 1.0);
    ctl.apply_override(&mut graph, 1, 7.0).unwrap();
    assert_eq!(graph.device("pump1").unwrap().value(), 0.0);
}

#[test]
fn volume_override_is_clamped() {
    let mut graph = plant(10.0);
    let mut ctl = plc();
    ctl.apply_override(&mut graph, 0, 1e6).unwrap();
    assert_eq!(graph.device("tank1").unwrap().value(), 100.0);
    // The raw write sits in the register until the next push.
    assert_eq!(ctl.read(0).unwrap(), 1e6);
    ctl.push(&graph);
    assert_eq!(ctl.read(0).unwrap(), 100.0);
}

#[test]
fn bad_writes_keep_previous_value() {
    let mut graph = plant(10.0);
    let mut ctl = plc();
    ctl.push(&graph);
    assert!(matches!(
        ctl.apply_override(&mut graph, 0, f64::NAN),
        Err(ControlError::MalformedValue { .. })
    ));
    assert_eq!(ctl.read(0).unwrap(), 10.0);
    assert!(matches!(
        ctl.apply_override(&mut graph, 10, 1.0),
        Err(ControlError::RegisterOutOfRange { .. })
    ));
    assert_eq!(
        ctl.apply_override(&mut graph, 5, 3.0).unwrap(),
        OverrideOutcome::Stored
    );
    assert_eq!(ctl.read(5).unwrap(), 3.0);
}

#[test]
fn map_outside_register_file_is_rejected() {
    let mut map = RegisterMap::new();
    map.insert("tank1", 100).unwrap();
    assert!(matches!(
        Controller::new("plc", ControllerKind::Plc, map, 100),
        Err(ControlError::RegisterOutOfRange { address: 100, .. })
    ));
}

#[test]
fn register_file_size_is_bounded() {
    for size in [0, MAX_REGISTER_COUNT + 1, usize::MAX] {
        assert!(matches!(
            Controller::new("plc", ControllerKind::Plc, RegisterMap::new(), size),
            Err(ControlError::RegisterFileSize { .. })
        ));
    }
    let mut map = RegisterMap::new();
    map.insert("tank1", u16::MAX).unwrap();
    let ctl = Controller::new("plc", ControllerKind::Plc, map, MAX_REGISTER_COUNT).unwrap();
    assert_eq!(ctl.read(u16::MAX).unwrap(), 0.0);
}

#[test]
fn push_reports_missing_devices() {
    let graph = plant(10.0);
    let mut map = RegisterMap::new();
    map.insert("tank1", 0).unwrap();
    map.insert("ghost", 1).unwrap();
    let mut ctl = Controller::new("scada", ControllerKind::Supervisor, map, 4).unwrap();
    let report = ctl.push(&graph);
    assert_eq!(report.written, 1);
    assert_eq!(report.missing, vec!["ghost".to_string()]);
}

proptest! {
    #[test]
    fn push_is_idempotent(volume in 0.0f64..100.0, open in any::<bool>()) {
        let mut graph = plant(volume);
        graph.set_open("pump1", open).unwrap();
        let mut ctl = plc();
        ctl.push(&graph);
        let first = ctl.registers().to_vec();
        ctl.push(&graph);
        prop_assert_eq!(first, ctl.registers().to_vec());
    }
}
