//! # Event Bus Module
//!
//! Provides the publish/subscribe channel between the model thread and the
//! UI side of the application.
//!
//! ## Overview
//!
//! - Publishers emit immutable, typed events without knowing subscribers
//! - Synchronous handlers run on the publishing thread and must return quickly
//! - Queue subscribers get their own unbounded queue and drain it on their
//!   own thread, so a slow consumer never blocks the model thread
//! - A broadcast receiver is available for async tasks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use transitkit_core::event_bus::{event_bus, AppEvent, EventCategory, EventFilter, HistoryEvent};
//!
//! let (id, mut queue) = event_bus().subscribe_queue(EventFilter::Categories(vec![
//!     EventCategory::History,
//! ]));
//!
//! event_bus().publish(AppEvent::History(HistoryEvent::Changed {
//!     past: 1,
//!     future: 0,
//! }));
//!
//! while let Ok(event) = queue.try_recv() {
//!     println!("{}", event.description());
//! }
//! event_bus().unsubscribe(id);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
