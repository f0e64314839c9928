//! Predicate combinators for validating topology edits.
//!
//! Conditions are total and pure: `matches` never mutates and never fails,
//! a candidate that does not fit simply yields `false`.

use serde::{Deserialize, Serialize};

use crate::track::TrackKind;
use crate::unit_of_work::{TrackRecord, VertexRecord};

/// A candidate edit: up to two vertices and two tracks picked by a tool,
/// plus the tool's mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformInput {
    pub vertices: [Option<VertexRecord>; 2],
    pub tracks: [Option<TrackRecord>; 2],
    pub mode: u8,
}

/// A predicate over `T`.
pub trait Condition<T: ?Sized> {
    fn matches(&self, input: &T) -> bool;
}

impl<T: ?Sized, F> Condition<T> for F
where
    F: Fn(&T) -> bool,
{
    fn matches(&self, input: &T) -> bool {
        self(input)
    }
}

pub struct And<A, B>(A, B);

impl<T: ?Sized, A: Condition<T>, B: Condition<T>> Condition<T> for And<A, B> {
    fn matches(&self, input: &T) -> bool {
        self.0.matches(input) && self.1.matches(input)
    }
}

pub struct Or<A, B>(A, B);

impl<T: ?Sized, A: Condition<T>, B: Condition<T>> Condition<T> for Or<A, B> {
    fn matches(&self, input: &T) -> bool {
        self.0.matches(input) || self.1.matches(input)
    }
}

pub struct Not<A>(A);

impl<T: ?Sized, A: Condition<T>> Condition<T> for Not<A> {
    fn matches(&self, input: &T) -> bool {
        !self.0.matches(input)
    }
}

pub fn and<A, B>(a: A, b: B) -> And<A, B> {
    And(a, b)
}

pub fn or<A, B>(a: A, b: B) -> Or<A, B> {
    Or(a, b)
}

pub fn not<A>(a: A) -> Not<A> {
    Not(a)
}

/// The tool runs in `mode`.
pub fn mode(mode: u8) -> impl Condition<TransformInput> {
    move |input: &TransformInput| input.mode == mode
}

/// Both tracks are present and match `condition`.
pub fn both_tracks<C: Condition<TrackRecord>>(condition: C) -> impl Condition<TransformInput> {
    move |input: &TransformInput| match &input.tracks {
        [Some(a), Some(b)] => condition.matches(a) && condition.matches(b),
        _ => false,
    }
}

/// Both tracks are present and one matches `first` while the other matches
/// `second`, in either order.
pub fn one_of_tracks<A, B>(first: A, second: B) -> impl Condition<TransformInput>
where
    A: Condition<TrackRecord>,
    B: Condition<TrackRecord>,
{
    move |input: &TransformInput| match &input.tracks {
        [Some(a), Some(b)] if a.id != b.id => {
            (first.matches(a) && second.matches(b)) || (first.matches(b) && second.matches(a))
        }
        _ => false,
    }
}

/// The first track is present and matches `condition`; the second is absent.
pub fn track<C: Condition<TrackRecord>>(condition: C) -> impl Condition<TransformInput> {
    move |input: &TransformInput| match &input.tracks {
        [Some(a), None] => condition.matches(a),
        _ => false,
    }
}

/// The first vertex is present and matches `condition`; the second is absent.
pub fn vertex<C: Condition<VertexRecord>>(condition: C) -> impl Condition<TransformInput> {
    move |input: &TransformInput| match &input.vertices {
        [Some(a), None] => condition.matches(a),
        _ => false,
    }
}

/// Two distinct vertices are present and both match `condition`.
pub fn both_vertices<C: Condition<VertexRecord>>(condition: C) -> impl Condition<TransformInput> {
    move |input: &TransformInput| match &input.vertices {
        [Some(a), Some(b)] if a.id != b.id => condition.matches(a) && condition.matches(b),
        _ => false,
    }
}

pub fn with_type(kind: TrackKind) -> impl Condition<TrackRecord> {
    move |track: &TrackRecord| track.kind == kind
}

pub fn without_type(kind: TrackKind) -> impl Condition<TrackRecord> {
    move |track: &TrackRecord| track.kind != kind
}

/// Exactly one track is bound: a free end.
pub fn has_one_track() -> impl Condition<VertexRecord> {
    |vertex: &VertexRecord| vertex.track_count() == 1
}

/// Every slot is filled.
pub fn has_all_tracks() -> impl Condition<VertexRecord> {
    |vertex: &VertexRecord| vertex.is_closed()
}

/// At least one slot is free.
pub fn is_open() -> impl Condition<VertexRecord> {
    |vertex: &VertexRecord| vertex.is_open()
}
