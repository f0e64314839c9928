//! # TransitKit Core
//!
//! Core types, traits, and utilities for TransitKit.
//! Provides the error taxonomy shared by every layer, the application
//! event bus, and the serial executors that implement the model-thread /
//! UI-thread split.

pub mod constants;
pub mod error;
pub mod event_bus;
pub mod executor;

pub use error::{
    CommandError, Error, ExecutorError, HistoryError, IntegrityError, NetworkError, Result,
    ValidationError, WorldError,
};

// Re-export event bus for convenience
pub use event_bus::{
    event_bus, AppEvent, CameraEvent, CameraSnapshotData, EventBus, EventBusConfig,
    EventCategory, EventFilter, HistoryEvent, ProjectEvent, ReplayDirection, SequencedEvent,
    SubscriptionId, WorldEvent,
};

pub use executor::{ExecutorHandle, SerialExecutor};
