//! Property tests for the world grid and vertex moves.

use proptest::prelude::*;
use transitkit_network::{Direction, Point2, TrackShape, World};

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::North),
        Just(Direction::East),
        Just(Direction::South),
        Just(Direction::West),
    ]
}

fn small_network() -> World {
    let mut world = World::new(2, 2);
    let a = world.add_vertex(100.0, 100.0).unwrap();
    let b = world.add_vertex(600.0, 120.0).unwrap();
    let c = world.add_vertex(900.0, 700.0).unwrap();
    world.add_track([a, b], TrackShape::Straight).unwrap();
    world
        .add_track(
            [b, c],
            TrackShape::Curved {
                center: None,
                convex: None,
            },
        )
        .unwrap();
    world
}

proptest! {
    #[test]
    fn test_extend_then_shrink_restores_world(dirs in prop::collection::vec(direction(), 1..6)) {
        let mut world = small_network();
        let before = world.clone();
        for d in &dirs {
            world.extend(*d);
        }
        for d in dirs.iter().rev() {
            world.shrink(*d).unwrap();
        }
        prop_assert_eq!(world, before);
    }

    #[test]
    fn test_vertex_move_is_all_or_nothing(x in 0.0f64..2000.0, y in 0.0f64..2000.0) {
        let mut world = small_network();
        let before = world.clone();
        let b = world
            .vertices()
            .find(|v| v.position() == Point2::new(600.0, 120.0))
            .map(|v| v.id())
            .unwrap();
        match world.move_vertex(b, x, y) {
            Ok(()) => {
                prop_assert_eq!(world.vertex(b).unwrap().position(), Point2::new(x, y));
                prop_assert!(world.check_consistency().is_ok());
            }
            Err(_) => prop_assert_eq!(world, before),
        }
    }
}

#[test]
fn test_free_end_vertex_move_reshapes_curve() {
    let mut world = small_network();
    let c = world
        .vertices()
        .find(|v| v.is_free_end() && v.position().x > 800.0)
        .map(|v| v.id())
        .unwrap();
    world.move_vertex(c, 800.0, 600.0).unwrap();
    let curve = world.tracks().find(|t| t.center().is_some()).unwrap();
    let center = curve.center().unwrap();
    let [start, end] = curve.geometry().ends();
    assert!(((start - center).norm() - (end - center).norm()).abs() < 1e-6);
    assert!(world.check_consistency().is_ok());
}
