//! Application context: the model thread, the UI queue and the wiring
//! between them.

use std::sync::Arc;

use transitkit_core::constants::{MODEL_THREAD_NAME, UI_THREAD_NAME};
use transitkit_core::{
    AppEvent, CameraEvent, EventBus, EventCategory, EventFilter, ExecutorHandle, HistoryError,
    NetworkError, ProjectEvent, SerialExecutor, SubscriptionId,
};
use transitkit_network::{NetworkUnitOfWork, World};
use transitkit_project::{Command, History, Project};
use transitkit_scene::{
    CameraController, CameraModel, CameraModelSnapshot, SceneManager, SceneUpdater, WorldRect,
};
use transitkit_settings::Config;

/// Viewport size used until the first resize arrives.
pub const INITIAL_VIEWPORT: (u32, u32) = (1280, 800);

/// State owned by the model thread.
pub struct ModelContext {
    project: Project,
    history: History,
    updater: SceneUpdater,
    bus: Arc<EventBus>,
    bounds: Option<WorldRect>,
}

impl ModelContext {
    pub fn new(project: Project, history: History, updater: SceneUpdater, bus: Arc<EventBus>) -> Self {
        Self {
            project: project.with_event_bus(bus.clone()),
            history: history.with_event_bus(bus.clone()),
            updater,
            bus,
            bounds: None,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn updater(&self) -> &SceneUpdater {
        &self.updater
    }

    /// Runs `command` through the history and refreshes the scene.
    ///
    /// Returns the new world bounds when the grid changed size.
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<Option<WorldRect>, HistoryError> {
        self.history.execute(&mut self.project, command)?;
        Ok(self.refresh_scene())
    }

    pub fn undo(&mut self) -> Result<Option<WorldRect>, HistoryError> {
        self.history.undo(&mut self.project)?;
        Ok(self.refresh_scene())
    }

    pub fn redo(&mut self) -> Result<Option<WorldRect>, HistoryError> {
        self.history.redo(&mut self.project)?;
        Ok(self.refresh_scene())
    }

    pub fn jump_to(&mut self, index: usize) -> Result<Option<WorldRect>, HistoryError> {
        self.history.jump_to(&mut self.project, index)?;
        Ok(self.refresh_scene())
    }

    /// Replaces the open project, dropping the history of the old one.
    pub fn replace_project(&mut self, project: Project) -> Option<WorldRect> {
        self.history.clear();
        self.project = project.with_event_bus(self.bus.clone());
        tracing::info!(project = self.project.name(), "Project opened");
        self.bus.publish(AppEvent::Project(ProjectEvent::NewProject {
            name: self.project.name().to_string(),
            path: self.project.path().map(|p| p.to_path_buf()),
        }));
        self.project.notify_world_changed();
        self.refresh_scene()
    }

    pub fn set_camera(&mut self, camera: CameraModelSnapshot) {
        self.updater.set_camera(camera);
    }

    /// Shows `uow` as the editable network on top of the current world.
    ///
    /// The world itself is not touched, so only the editable entry of the
    /// scene changes.
    pub fn preview(&mut self, uow: &NetworkUnitOfWork) -> Result<(), NetworkError> {
        self.updater.set_editable(self.project.world(), uow)
    }

    pub fn clear_preview(&mut self) {
        self.updater.clear_editable();
    }

    /// Rebuilds the scene from the world. Returns the world bounds if they
    /// differ from the last rebuild.
    pub fn refresh_scene(&mut self) -> Option<WorldRect> {
        self.updater.update_world(self.project.world());
        let (min, max) = self.project.world().bounds();
        let bounds = WorldRect::new(min, max);
        if self.bounds == Some(bounds) {
            return None;
        }
        self.bounds = Some(bounds);
        Some(bounds)
    }
}

/// State owned by the UI queue.
pub struct UiContext {
    camera: CameraController,
}

impl UiContext {
    pub fn new(camera: CameraController) -> Self {
        Self { camera }
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }
}

/// The running application: both executors plus the shared event bus and
/// scene.
pub struct AppContext {
    bus: Arc<EventBus>,
    scene: Arc<SceneManager>,
    camera_subscription: SubscriptionId,
    // Dropped before the model so camera jobs stop first
    ui: SerialExecutor<UiContext>,
    model: SerialExecutor<ModelContext>,
}

impl AppContext {
    /// Spawns the model thread and UI queue configured from `config`.
    pub fn start(config: &Config, bus: Arc<EventBus>) -> anyhow::Result<Self> {
        let scene = Arc::new(SceneManager::new());

        let model = {
            let bus = bus.clone();
            let scene = scene.clone();
            let capacity = config.history.capacity;
            let (columns, rows) = (config.world.default_columns, config.world.default_rows);
            SerialExecutor::spawn_with(MODEL_THREAD_NAME, move || {
                let project = Project::with_world("Untitled", World::new(columns, rows));
                ModelContext::new(
                    project,
                    History::with_capacity(capacity),
                    SceneUpdater::new(scene),
                    bus,
                )
            })?
        };

        // Camera snapshots flow from the UI queue to the model thread. The
        // subscription exists before the first zoom so no update is lost.
        let model_handle = model.handle();
        let camera_subscription = bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Camera]),
            move |event| {
                if let AppEvent::Camera(CameraEvent::Updated(data)) = event {
                    let snapshot = CameraModelSnapshot::from(data);
                    if let Err(e) = model_handle.post(move |model| model.set_camera(snapshot)) {
                        tracing::warn!("Camera update dropped: {}", e);
                    }
                }
            },
        );

        let ui = match Self::spawn_ui(config, &bus) {
            Ok(ui) => ui,
            Err(e) => {
                bus.unsubscribe(camera_subscription);
                return Err(e);
            }
        };

        tracing::info!("Application context started");
        Ok(Self {
            bus,
            scene,
            camera_subscription,
            ui,
            model,
        })
    }

    fn spawn_ui(config: &Config, bus: &Arc<EventBus>) -> anyhow::Result<SerialExecutor<UiContext>> {
        let camera = CameraModel::new(INITIAL_VIEWPORT.0, INITIAL_VIEWPORT.1)?.with_zoom_range(
            config.camera.min_meters_per_pixel,
            config.camera.max_meters_per_pixel,
        )?;
        let mut camera = CameraController::new(camera)
            .with_zoom_step(config.camera.zoom_step)?
            .with_event_bus(bus.clone());
        camera.set_zoom(config.camera.default_meters_per_pixel)?;
        Ok(SerialExecutor::spawn(UI_THREAD_NAME, UiContext::new(camera))?)
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn scene(&self) -> &Arc<SceneManager> {
        &self.scene
    }

    pub fn model(&self) -> ExecutorHandle<ModelContext> {
        self.model.handle()
    }

    pub fn ui(&self) -> ExecutorHandle<UiContext> {
        self.ui.handle()
    }

    /// Executes `command` on the model thread and waits for the outcome.
    pub fn execute(&self, command: Box<dyn Command>) -> anyhow::Result<()> {
        let bounds = self.model.call(move |model| model.execute(command))??;
        forward_bounds(&self.ui.handle(), bounds);
        Ok(())
    }

    /// Queues an undo on the model thread.
    pub fn post_undo(&self) -> anyhow::Result<()> {
        self.post_history(|model| model.undo())
    }

    /// Queues a redo on the model thread.
    pub fn post_redo(&self) -> anyhow::Result<()> {
        self.post_history(|model| model.redo())
    }

    fn post_history<F>(&self, step: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut ModelContext) -> Result<Option<WorldRect>, HistoryError> + Send + 'static,
    {
        let ui = self.ui.handle();
        self.model.post(move |model| match step(model) {
            Ok(bounds) => forward_bounds(&ui, bounds),
            Err(e) => tracing::warn!("History step failed: {}", e),
        })?;
        Ok(())
    }

    /// Shows a pending edit on the model thread.
    pub fn preview(&self, uow: NetworkUnitOfWork) -> anyhow::Result<()> {
        self.model.call(move |model| model.preview(&uow))??;
        Ok(())
    }

    /// Drops the pending edit from the scene.
    pub fn clear_preview(&self) -> anyhow::Result<()> {
        self.model.call(|model| model.clear_preview())?;
        Ok(())
    }

    /// Opens `project` on the model thread and fits the camera to it.
    pub fn open_project(&self, project: Project) -> anyhow::Result<()> {
        let bounds = self.model.call(move |model| model.replace_project(project))?;
        if let Some(bounds) = bounds {
            self.ui.call(move |ui| ui.camera_mut().set_world_bounds(bounds))?;
        }
        Ok(())
    }

    /// Stops both executors after their queues drain.
    pub fn shutdown(self) {
        self.bus.unsubscribe(self.camera_subscription);
        let Self { ui, model, .. } = self;
        ui.shutdown();
        model.shutdown();
        tracing::info!("Application context stopped");
    }
}

fn forward_bounds(ui: &ExecutorHandle<UiContext>, bounds: Option<WorldRect>) {
    if let Some(bounds) = bounds {
        if let Err(e) = ui.post(move |ui| {
            ui.camera_mut().set_world_bounds(bounds);
        }) {
            tracing::warn!("World bounds not forwarded: {}", e);
        }
    }
}
