//! Constants shared across the TransitKit crates.

/// Edge length of a world segment in metres.
pub const SEGMENT_SIZE: f64 = 1000.0;

/// Geometric tolerance used for degeneracy and tie checks.
pub const EPSILON: f64 = 1e-8;

/// Default number of retained history entries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default number of track slots on a new vertex.
pub const DEFAULT_VERTEX_DEGREE: usize = 2;

/// Default zoom in metres per pixel.
pub const DEFAULT_METERS_PER_PIXEL: f64 = 1.0;

/// Smallest permitted zoom (most zoomed in).
pub const MIN_METERS_PER_PIXEL: f64 = 0.01;

/// Largest permitted zoom (most zoomed out).
pub const MAX_METERS_PER_PIXEL: f64 = 100.0;

/// Name of the model thread.
pub const MODEL_THREAD_NAME: &str = "transitkit-model";

/// Name of the UI queue thread.
pub const UI_THREAD_NAME: &str = "transitkit-ui";
