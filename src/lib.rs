//! # TransitKit
//!
//! Editor core for public-transport track networks:
//! - A segmented world holding a graph of vertices and straight or curved
//!   tracks, with platforms and vehicles attached along the tracks
//! - A project model of stops, means of transport, vehicle types,
//!   vehicles, lines and routes with name and reference checks
//! - Undoable commands recorded in a bounded history
//! - A camera/scene snapshot pipeline painted through ordered render
//!   streams
//!
//! ## Architecture
//!
//! TransitKit is organized as a workspace with multiple crates:
//!
//! 1. **transitkit-core** - Errors, event bus, serial executors, constants
//! 2. **transitkit-network** - World, segments, track graph, unit of work, rules
//! 3. **transitkit-project** - Entities, managers, project, commands, history
//! 4. **transitkit-scene** - Camera, snapshots, scene manager, render streams
//! 5. **transitkit-settings** - Configuration and its persistence
//! 6. **transitkit** - Application context, startup sequence and the binary
//!
//! All mutations of the project run on the model thread; the camera lives
//! on the UI queue. The two only share the scene resources and the event
//! bus.

pub mod app;
pub mod startup;

pub use app::{AppContext, ModelContext, UiContext, INITIAL_VIEWPORT};
pub use startup::{run_startup, StartupOptions, StartupTask};

pub use transitkit_core::{event_bus, AppEvent, EventBus, Error, Result};
pub use transitkit_project::{Command, History, Project};
pub use transitkit_scene::{Renderer, SceneManager, SvgPainter};
pub use transitkit_settings::{Config, SettingsPersistence};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support, falling back to `default_level`
pub fn init_logging(default_level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
