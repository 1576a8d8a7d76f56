//! Tick ordering, inbox delivery and pacing of the scheduler.

use std::time::{Duration, Instant};

use pt_bus::{MemoryBus, topics};
use pt_controls::{Action, Controller, ControllerKind, Effect, RegisterMap};
use pt_graph::{GraphBuilder, ProcessEvent, ProcessGraph};
use pt_sim::{InboundSender, RunHooks, SimError, SimOptions, Simulation, TickReport};

fn plant() -> ProcessGraph {
    let mut b = GraphBuilder::new();
    b.add_tank("tank1", "Tank", 100.0, 40.0).unwrap();
    b.add_pump("pump1", "Pump", 10.0, true).unwrap();
    b.add_tank("sink", "Sink", 25.0, 0.0).unwrap();
    b.connect("in", "tank1", "pump1").unwrap();
    b.connect("out", "pump1", "sink").unwrap();
    b.build().unwrap()
}

fn plc() -> Controller {
    let mut map = RegisterMap::new();
    map.insert("tank1", 0).unwrap();
    map.insert("pump1", 1).unwrap();
    let actions = vec![
        Action::new(0, ">", 50.0, Effect::new(["pump1"], Some("close"), None)),
        Action::new(
            0,
            ">",
            90.0,
            Effect::new(["supervisor-alert"], None, Some("tank1 high".into())),
        ),
    ];
    Controller::new("plc1", ControllerKind::Plc, map, 10)
        .unwrap()
        .with_actions(actions)
}

fn options() -> SimOptions {
    SimOptions {
        interval: Duration::from_millis(1),
        max_ticks: Some(3),
        ..SimOptions::default()
    }
}

fn sim() -> Simulation {
    Simulation::new(plant(), vec![plc()], options()).unwrap()
}

#[test]
fn tick_order_is_evaluate_push_update_publish() {
    let mut sim = sim();
    let bus = MemoryBus::new();
    let report = sim.step(&bus);

    assert_eq!(report.tick, 0);
    assert_eq!(report.evaluation.fired, 0);
    // Push happened before the update moved 10 units.
    assert_eq!(sim.controller("plc1").unwrap().read(0).unwrap(), 40.0);
    assert_eq!(bus.latest("tank/tank1/volume").as_deref(), Some("30"));
    assert_eq!(sim.tick_count(), 1);
}

#[test]
fn override_between_ticks_drives_next_evaluation() {
    let mut sim = sim();
    let bus = MemoryBus::new();
    sim.step(&bus);

    sim.sender().write_register("plc1", 0, 95.0).unwrap();
    let report = sim.step(&bus);

    assert_eq!(report.overrides, 1);
    assert_eq!(report.evaluation.fired, 2);
    assert_eq!(sim.graph().device("pump1").unwrap().value(), 0.0);
    assert_eq!(sim.controller("plc1").unwrap().read(1).unwrap(), 0.0);
    assert_eq!(
        bus.latest(topics::SUPERVISOR_ALERTS).as_deref(),
        Some("[plc1] tank1 high")
    );
    assert_eq!(bus.latest("pump/pump1/state").as_deref(), Some("closed"));
}

#[test]
fn bad_inbound_messages_are_rejected_not_fatal() {
    let mut sim = sim();
    let tx = sim.sender();
    tx.write_register("nobody", 0, 1.0).unwrap();
    tx.write_register("plc1", 0, f64::NAN).unwrap();
    tx.write_register("plc1", 99, 1.0).unwrap();
    tx.publish_command("set/tank/pump1/max_capacity", "5").unwrap();
    tx.publish_command("set/pump/pump1/rate", "20").unwrap();

    let report = sim.step(&MemoryBus::new());
    assert_eq!(report.rejected, 4);
    assert_eq!(report.commands, 1);
    assert_eq!(report.update.transferred(), 20.0);
}

#[test]
fn capacity_command_overflow_is_reported() {
    let mut sim = sim();
    sim.sender()
        .publish_command("set/tank/tank1/max_capacity", "15")
        .unwrap();
    let bus = MemoryBus::new();
    let report = sim.step(&bus);
    assert!(matches!(
        report.command_events.as_slice(),
        [ProcessEvent::Overflow { amount, .. }] if *amount == 25.0
    ));
    assert_eq!(bus.latest("tank/tank1/overflow").as_deref(), Some("25"));
}

#[test]
fn overflow_into_sink_is_counted_in_summary() {
    let mut sim = Simulation::new(
        plant(),
        vec![],
        SimOptions {
            max_ticks: Some(4),
            ..options()
        },
    )
    .unwrap();
    let summary = sim.run(&MemoryBus::new());
    assert_eq!(summary.ticks, 4);
    // 40 units moved into a 25-unit sink.
    assert_eq!(summary.lost, 15.0);
    assert_eq!(summary.events, 2);
}

struct Script {
    seen: Vec<u64>,
}

impl RunHooks for Script {
    fn before_tick(&mut self, tick: u64, inbox: &InboundSender) {
        if tick == 1 {
            inbox.write_register("plc1", 1, 0.0).unwrap();
        }
    }

    fn after_tick(&mut self, report: &TickReport) {
        self.seen.push(report.tick);
        if report.tick == 1 {
            assert_eq!(report.overrides, 1);
        }
    }
}

#[test]
fn hooks_inject_before_the_tick_they_name() {
    let mut sim = sim();
    let mut hooks = Script { seen: vec![] };
    let summary = sim.run_with_hooks(&MemoryBus::new(), &mut hooks);
    assert_eq!(hooks.seen, vec![0, 1, 2]);
    assert_eq!(summary.ticks, 3);
    // Pump closed by the injected write at tick 1.
    assert_eq!(sim.graph().device("tank1").unwrap().value(), 30.0);
}

#[test]
fn run_is_paced_by_interval() {
    let mut sim = Simulation::new(
        plant(),
        vec![plc()],
        SimOptions {
            interval: Duration::from_millis(20),
            max_ticks: Some(3),
            ..SimOptions::default()
        },
    )
    .unwrap();
    let start = Instant::now();
    let summary = sim.run(&MemoryBus::new());
    assert_eq!(summary.ticks, 3);
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[test]
fn stop_handle_ends_an_unbounded_run() {
    let mut sim = Simulation::new(
        plant(),
        vec![plc()],
        SimOptions {
            max_ticks: None,
            ..options()
        },
    )
    .unwrap();
    let stop = sim.stop_handle();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        stop.stop();
    });
    let summary = sim.run(&MemoryBus::new());
    stopper.join().unwrap();
    assert!(summary.stopped);
    assert!(summary.ticks > 0);
}

#[test]
fn writes_from_another_thread_land_on_a_tick() {
    let mut sim = sim();
    let tx = sim.sender();
    std::thread::spawn(move || tx.write_register("plc1", 1, 0.0).unwrap())
        .join()
        .unwrap();
    let report = sim.step(&MemoryBus::new());
    assert_eq!(report.overrides, 1);
    assert_eq!(report.update.transferred(), 0.0);
}

#[test]
fn setup_errors() {
    assert!(matches!(
        Simulation::new(plant(), vec![plc(), plc()], options()),
        Err(SimError::DuplicateController { .. })
    ));
    assert!(matches!(
        Simulation::new(
            plant(),
            vec![],
            SimOptions {
                inbound_capacity: 0,
                ..options()
            }
        ),
        Err(SimError::InvalidArg { .. })
    ));
}
