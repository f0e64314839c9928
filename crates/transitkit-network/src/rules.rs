//! Named topology transforms and the rules that enable them.
//!
//! A [`RuleSet`] maps a [`TransformInput`] to the first rule whose condition
//! matches; the resulting [`Transform`] stages its records into a
//! [`NetworkUnitOfWork`].

use transitkit_core::NetworkError;

use crate::conditions::{
    and, both_vertices, has_one_track, is_open, mode, one_of_tracks, or, track, vertex,
    with_type, without_type, Condition, TransformInput,
};
use crate::geometry::Point2;
use crate::track::TrackKind;
use crate::unit_of_work::NetworkUnitOfWork;
use crate::vertex::{TrackId, VertexId};
use crate::world::World;

/// Tool mode bytes.
pub mod modes {
    pub const DRAW_STRAIGHT: u8 = 1;
    pub const DRAW_CURVED: u8 = 2;
    pub const DRAW_DOUBLY_CURVED: u8 = 3;
    pub const TO_STRAIGHT: u8 = 4;
    pub const TO_CURVED: u8 = 5;
    pub const TO_DOUBLY_CURVED: u8 = 6;
}

/// Track kind drawn by a drawing mode.
pub fn kind_for_mode(mode: u8) -> Option<TrackKind> {
    match mode {
        modes::DRAW_STRAIGHT => Some(TrackKind::Straight),
        modes::DRAW_CURVED => Some(TrackKind::Curved),
        modes::DRAW_DOUBLY_CURVED => Some(TrackKind::DoublyCurved),
        _ => None,
    }
}

/// A legal topology change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// New track from a free end to a new vertex.
    ExtendFreeEnd { vertex: VertexId, kind: TrackKind },
    /// New track between two free ends.
    ConnectFreeEnds {
        vertices: [VertexId; 2],
        kind: TrackKind,
    },
    ConvertToStraight { track: TrackId },
    ConvertToCurved { track: TrackId },
    ConvertToDoublyCurved { track: TrackId },
    /// Curved track continuing a straight track's free end into a curved
    /// track's free end.
    JoinStraightAndCurved {
        straight_end: VertexId,
        curved_end: VertexId,
    },
}

impl Transform {
    /// Writes the records of this transform into `uow`.
    ///
    /// `at` is the tool's cursor position, used by transforms that create a
    /// vertex.
    pub fn stage(
        &self,
        world: &World,
        at: Point2,
        uow: &mut NetworkUnitOfWork,
    ) -> Result<(), NetworkError> {
        match *self {
            Transform::ExtendFreeEnd { vertex, kind } => {
                uow.stage_vertex(world, vertex)?;
                let end = uow.new_vertex(at.x, at.y);
                uow.new_track([vertex, end], kind);
            }
            Transform::ConnectFreeEnds { vertices, kind } => {
                for v in vertices {
                    uow.stage_vertex(world, v)?;
                }
                uow.new_track(vertices, kind);
            }
            Transform::ConvertToStraight { track } => convert(world, uow, track, TrackKind::Straight)?,
            Transform::ConvertToCurved { track } => convert(world, uow, track, TrackKind::Curved)?,
            Transform::ConvertToDoublyCurved { track } => {
                convert(world, uow, track, TrackKind::DoublyCurved)?
            }
            Transform::JoinStraightAndCurved {
                straight_end,
                curved_end,
            } => {
                uow.stage_vertex(world, straight_end)?;
                uow.stage_vertex(world, curved_end)?;
                uow.new_track([straight_end, curved_end], TrackKind::Curved);
            }
        }
        Ok(())
    }
}

fn convert(
    world: &World,
    uow: &mut NetworkUnitOfWork,
    track: TrackId,
    kind: TrackKind,
) -> Result<(), NetworkError> {
    let record = uow.stage_track(world, track)?;
    record.kind = kind;
    record.convex = None;
    record.center = None;
    Ok(())
}

type Build = fn(&TransformInput) -> Option<Transform>;

/// A named condition and the transform it enables.
pub struct Rule {
    pub name: &'static str,
    condition: Box<dyn Condition<TransformInput> + Send + Sync>,
    build: Build,
}

impl Rule {
    pub fn new(
        name: &'static str,
        condition: impl Condition<TransformInput> + Send + Sync + 'static,
        build: Build,
    ) -> Self {
        Self {
            name,
            condition: Box::new(condition),
            build,
        }
    }

    pub fn matches(&self, input: &TransformInput) -> bool {
        self.condition.matches(input)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Ordered rules; the first match wins.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First matching rule name and its transform.
    pub fn resolve(&self, input: &TransformInput) -> Option<(&'static str, Transform)> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(input))
            .find_map(|rule| (rule.build)(input).map(|t| (rule.name, t)))
    }

    /// The editor's built-in rules.
    pub fn standard() -> Self {
        let drawing = || {
            or(
                mode(modes::DRAW_STRAIGHT),
                or(mode(modes::DRAW_CURVED), mode(modes::DRAW_DOUBLY_CURVED)),
            )
        };
        let free_end = || and(has_one_track(), is_open());
        let no_tracks = |input: &TransformInput| input.tracks.iter().all(Option::is_none);

        let mut set = Self::new();
        set.push(Rule::new(
            "extend-free-end",
            and(drawing(), and(vertex(free_end()), no_tracks)),
            |input| {
                let vertex = input.vertices[0].as_ref()?.id;
                let kind = kind_for_mode(input.mode)?;
                Some(Transform::ExtendFreeEnd { vertex, kind })
            },
        ));
        set.push(Rule::new(
            "join-straight-and-curved",
            and(
                mode(modes::DRAW_CURVED),
                and(
                    one_of_tracks(with_type(TrackKind::Straight), with_type(TrackKind::Curved)),
                    both_vertices(free_end()),
                ),
            ),
            build_join,
        ));
        set.push(Rule::new(
            "connect-free-ends",
            and(drawing(), both_vertices(free_end())),
            |input| {
                let a = input.vertices[0].as_ref()?.id;
                let b = input.vertices[1].as_ref()?.id;
                let kind = kind_for_mode(input.mode)?;
                Some(Transform::ConnectFreeEnds {
                    vertices: [a, b],
                    kind,
                })
            },
        ));
        set.push(Rule::new(
            "convert-to-straight",
            and(mode(modes::TO_STRAIGHT), track(without_type(TrackKind::Straight))),
            |input| {
                let track = input.tracks[0].as_ref()?.id;
                Some(Transform::ConvertToStraight { track })
            },
        ));
        set.push(Rule::new(
            "convert-to-curved",
            and(mode(modes::TO_CURVED), track(without_type(TrackKind::Curved))),
            |input| {
                let track = input.tracks[0].as_ref()?.id;
                Some(Transform::ConvertToCurved { track })
            },
        ));
        set.push(Rule::new(
            "convert-to-doubly-curved",
            and(
                mode(modes::TO_DOUBLY_CURVED),
                track(without_type(TrackKind::DoublyCurved)),
            ),
            |input| {
                let track = input.tracks[0].as_ref()?.id;
                Some(Transform::ConvertToDoublyCurved { track })
            },
        ));
        set
    }
}

/// Pairs each free end with the track it terminates.
fn build_join(input: &TransformInput) -> Option<Transform> {
    let straight = input
        .tracks
        .iter()
        .flatten()
        .find(|t| t.kind == TrackKind::Straight)?;
    let curved = input
        .tracks
        .iter()
        .flatten()
        .find(|t| t.kind == TrackKind::Curved)?;
    let end_of = |track: TrackId| {
        input
            .vertices
            .iter()
            .flatten()
            .find(|v| v.slots.contains(&Some(track)))
            .map(|v| v.id)
    };
    let straight_end = end_of(straight.id)?;
    let curved_end = end_of(curved.id)?;
    (straight_end != curved_end).then_some(Transform::JoinStraightAndCurved {
        straight_end,
        curved_end,
    })
}
