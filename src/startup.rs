//! Ordered startup tasks run once the executors are up.

use std::path::{Path, PathBuf};

use transitkit_network::World;
use transitkit_project::Project;
use transitkit_scene::WorldRect;
use transitkit_settings::SettingsPersistence;

use crate::app::AppContext;

/// Options collected from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupOptions {
    pub show_splash: bool,
    pub project: Option<PathBuf>,
}

/// One step of the startup sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupTask {
    Splash,
    OpenProject(Option<PathBuf>),
    FitCamera,
    RememberProject(PathBuf),
}

impl StartupTask {
    pub fn name(&self) -> &'static str {
        match self {
            StartupTask::Splash => "splash",
            StartupTask::OpenProject(_) => "open-project",
            StartupTask::FitCamera => "fit-camera",
            StartupTask::RememberProject(_) => "remember-project",
        }
    }

    /// The tasks to run for `options`, in order.
    pub fn sequence(options: &StartupOptions) -> Vec<StartupTask> {
        let mut tasks = Vec::with_capacity(4);
        if options.show_splash {
            tasks.push(StartupTask::Splash);
        }
        tasks.push(StartupTask::OpenProject(options.project.clone()));
        tasks.push(StartupTask::FitCamera);
        if let Some(path) = &options.project {
            tasks.push(StartupTask::RememberProject(path.clone()));
        }
        tasks
    }

    fn run(&self, app: &AppContext, settings: &mut SettingsPersistence) -> anyhow::Result<()> {
        match self {
            StartupTask::Splash => {
                tracing::info!(
                    "TransitKit {} (built {})",
                    crate::VERSION,
                    crate::BUILD_DATE
                );
            }
            StartupTask::OpenProject(path) => {
                let world = &settings.config().world;
                let mut project = Project::with_world(
                    project_name(path.as_deref()),
                    World::new(world.default_columns, world.default_rows),
                );
                project.set_path(path.clone());
                app.open_project(project)?;
            }
            StartupTask::FitCamera => {
                let (min, max) = app
                    .model()
                    .call(|model| model.project().world().bounds())?;
                app.ui().call(move |ui| {
                    let camera = ui.camera_mut();
                    camera.set_world_bounds(WorldRect::new(min, max));
                    camera.center_on((min.x + max.x) / 2.0, (min.y + max.y) / 2.0)
                })?;
            }
            StartupTask::RememberProject(path) => {
                settings.config_mut().add_recent_project(path.clone());
                // Not being able to record a recent project is no reason to stop
                if let Err(e) = settings.save() {
                    tracing::warn!("Recent projects not saved: {}", e);
                }
            }
        }
        Ok(())
    }
}

fn project_name(path: Option<&Path>) -> String {
    path.and_then(|p| p.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}

/// Runs every task of `options`' sequence, stopping at the first failure.
pub fn run_startup(
    app: &AppContext,
    settings: &mut SettingsPersistence,
    options: &StartupOptions,
) -> anyhow::Result<()> {
    for task in StartupTask::sequence(options) {
        tracing::info!(task = task.name(), "Startup task");
        task.run(app, settings)
            .map_err(|e| e.context(format!("startup task '{}' failed", task.name())))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_without_project() {
        let tasks = StartupTask::sequence(&StartupOptions::default());
        assert_eq!(
            tasks,
            vec![StartupTask::OpenProject(None), StartupTask::FitCamera]
        );
    }

    #[test]
    fn test_sequence_with_project_and_splash() {
        let path = PathBuf::from("/tmp/city.tkp");
        let tasks = StartupTask::sequence(&StartupOptions {
            show_splash: true,
            project: Some(path.clone()),
        });
        let names: Vec<_> = tasks.iter().map(StartupTask::name).collect();
        assert_eq!(
            names,
            vec!["splash", "open-project", "fit-camera", "remember-project"]
        );
        assert_eq!(tasks[3], StartupTask::RememberProject(path));
    }

    #[test]
    fn test_project_name_from_path() {
        assert_eq!(project_name(Some(Path::new("/a/b/Lyon.tkp"))), "Lyon");
        assert_eq!(project_name(None), "Untitled");
    }
}
