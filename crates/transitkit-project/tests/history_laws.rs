//! Property tests for undo/redo over mixed command sequences.

use proptest::prelude::*;
use transitkit_network::{Direction, NetworkUnitOfWork, TrackKind};
use transitkit_project::commands::{
    AddMeanOfTransportCmd, AddStopCmd, ExtendWorldCmd, NetworkLayoutChangeCmd, RemoveStopCmd,
    UpdateStopCmd, UpdateStopsCmd,
};
use transitkit_project::{Command, CrudManager, History, MeanOfTransport, Project, Stop};

#[derive(Debug, Clone)]
enum Op {
    AddStop(u8),
    RenameStop(u8, u8),
    RemoveStop(u8),
    AddMeanOfTransport(u8),
    BatchStops(u8, u8),
    Extend(u8),
    AddTrack(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::AddStop),
        (any::<u8>(), any::<u8>()).prop_map(|(a, b)| Op::RenameStop(a, b)),
        any::<u8>().prop_map(Op::RemoveStop),
        any::<u8>().prop_map(Op::AddMeanOfTransport),
        (any::<u8>(), any::<u8>()).prop_map(|(a, b)| Op::BatchStops(a, b)),
        (0u8..4).prop_map(Op::Extend),
        (0u8..8).prop_map(Op::AddTrack),
    ]
}

fn pick(project: &Project, index: u8) -> Option<u64> {
    let stops = project.stops().items();
    (!stops.is_empty()).then(|| stops[index as usize % stops.len()].id)
}

fn stop(name: String) -> Stop {
    Stop {
        name,
        ..Default::default()
    }
}

fn build(project: &Project, op: &Op) -> Option<Box<dyn Command>> {
    let command: Box<dyn Command> = match *op {
        Op::AddStop(n) => Box::new(AddStopCmd::new(stop(format!("Stop {n}")))),
        Op::RenameStop(index, n) => {
            let id = pick(project, index)?;
            let mut renamed = project.stops().find_by_id(id)?.clone();
            renamed.name = format!("Renamed {n}");
            renamed.abbreviation = Some(format!("R{n}"));
            Box::new(UpdateStopCmd::new(renamed))
        }
        Op::RemoveStop(index) => Box::new(RemoveStopCmd::new(pick(project, index)?)),
        Op::AddMeanOfTransport(n) => Box::new(AddMeanOfTransportCmd::new(MeanOfTransport {
            name: format!("Mode {n}"),
            max_speed: f64::from(n) + 1.0,
            ..Default::default()
        })),
        Op::BatchStops(n, index) => {
            let mut cmd = UpdateStopsCmd::new().insert(stop(format!("Batch {n}")));
            if let Some(id) = pick(project, index) {
                cmd = cmd.remove(id);
            }
            Box::new(cmd)
        }
        Op::Extend(d) => {
            let direction = [
                Direction::North,
                Direction::East,
                Direction::South,
                Direction::West,
            ][d as usize];
            Box::new(ExtendWorldCmd::new(direction))
        }
        Op::AddTrack(n) => {
            let mut uow = NetworkUnitOfWork::new();
            let y = 50.0 + f64::from(n) * 100.0;
            let a = uow.new_vertex(100.0, y);
            let b = uow.new_vertex(400.0, y + 20.0);
            uow.new_track([a, b], TrackKind::Straight);
            Box::new(NetworkLayoutChangeCmd::new(uow))
        }
    };
    Some(command)
}

/// Executes `ops` and returns how many were accepted.
fn run(project: &mut Project, history: &mut History, ops: &[Op]) -> usize {
    let mut accepted = 0;
    for op in ops {
        if let Some(command) = build(project, op) {
            if history.execute(project, command).is_ok() {
                accepted += 1;
            }
        }
    }
    accepted
}

proptest! {
    #[test]
    fn test_undo_all_restores_initial_state(ops in prop::collection::vec(op(), 1..24)) {
        let mut project = Project::new("law");
        let initial = project.clone();
        let mut history = History::new();
        let accepted = run(&mut project, &mut history, &ops);
        for _ in 0..accepted {
            history.undo(&mut project).unwrap();
        }
        prop_assert_eq!(&project, &initial);
        prop_assert!(!history.can_undo());
    }

    #[test]
    fn test_redo_restores_exact_state(ops in prop::collection::vec(op(), 1..24)) {
        let mut project = Project::new("law");
        let mut history = History::new();
        let accepted = run(&mut project, &mut history, &ops);
        let after = project.clone();
        for _ in 0..accepted {
            history.undo(&mut project).unwrap();
        }
        for _ in 0..accepted {
            history.redo(&mut project).unwrap();
        }
        prop_assert_eq!(&project, &after);
    }

    #[test]
    fn test_jump_to_matches_single_steps(
        ops in prop::collection::vec(op(), 1..16),
        target in any::<prop::sample::Index>(),
    ) {
        let mut stepped = Project::new("law");
        let mut history = History::new();
        let accepted = run(&mut stepped, &mut history, &ops);
        let mut jumped = Project::new("law");
        let mut jump_history = History::new();
        run(&mut jumped, &mut jump_history, &ops);
        prop_assert_eq!(&stepped, &jumped);

        let index = target.index(accepted + 1);
        while history.cursor() > index {
            history.undo(&mut stepped).unwrap();
        }
        jump_history.jump_to(&mut jumped, index).unwrap();
        prop_assert_eq!(&stepped, &jumped);
        prop_assert_eq!(history.cursor(), jump_history.cursor());
    }
}

#[test]
fn test_capacity_evicts_oldest_entries() {
    let capacity = 5;
    let extra = 3;
    let mut project = Project::new("capacity");
    let mut history = History::with_capacity(capacity);
    for n in 0..capacity + extra {
        history
            .execute(
                &mut project,
                Box::new(AddStopCmd::new(stop(format!("Stop {n}")))),
            )
            .unwrap();
    }
    assert_eq!(history.len(), capacity);
    for _ in 0..capacity {
        history.undo(&mut project).unwrap();
    }
    assert!(history.undo(&mut project).is_err());
    let names: Vec<_> = project.stops().items().iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["Stop 0", "Stop 1", "Stop 2"]);
}
