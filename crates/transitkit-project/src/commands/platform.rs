//! Commands placing platforms on tracks.

use transitkit_core::{CommandError, IntegrityError, NetworkError, ValidationError};
use transitkit_network::{Orientation, Platform, TrackId, TrackObject, TrackObjectId};

use crate::command::{missing_memento, restore_failed, Command, CommandState};
use crate::entities::EntityKind;
use crate::project::Project;

fn check_stop(project: &Project, platform: &Platform) -> Result<(), ValidationError> {
    match platform.stop {
        Some(stop) if !project.exists(EntityKind::Stop, stop) => {
            Err(ValidationError::MissingReference {
                entity: EntityKind::Platform.as_str(),
                target: EntityKind::Stop.as_str(),
                id: stop,
            })
        }
        _ => Ok(()),
    }
}

/// Attaches a new platform to a track.
pub struct AddPlatformCmd {
    name: String,
    track: TrackId,
    position: f64,
    orientation: Orientation,
    platform: Platform,
    id: Option<TrackObjectId>,
    memento: Option<TrackObject<Platform>>,
    state: CommandState,
}

impl AddPlatformCmd {
    pub fn new(track: TrackId, position: f64, orientation: Orientation, platform: Platform) -> Self {
        Self {
            name: format!("Add platform {}", platform.name),
            track,
            position,
            orientation,
            platform,
            id: None,
            memento: None,
            state: CommandState::Created,
        }
    }

    /// Id of the attached platform once executed.
    pub fn id(&self) -> Option<TrackObjectId> {
        self.id
    }
}

impl Command for AddPlatformCmd {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        check_stop(project, &self.platform)?;
        let id = project.world_mut().attach(
            self.track,
            self.position,
            self.orientation,
            self.platform.clone(),
        )?;
        self.id = Some(id);
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        let id = self
            .id
            .ok_or_else(|| missing_memento(&self.name, "the platform id"))?;
        let object = project
            .world_mut()
            .detach::<Platform>(self.track, id)
            .map_err(|e| restore_failed(&self.name, e))?;
        self.memento = Some(object);
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        let object = self
            .memento
            .take()
            .ok_or_else(|| missing_memento(&self.name, "the detached platform"))?;
        project
            .world_mut()
            .restore_object(object)
            .map_err(|e| restore_failed(&self.name, e))?;
        self.state = CommandState::Redone;
        Ok(())
    }
}

/// Changes position, orientation and payload of a platform.
pub struct UpdatePlatformCmd {
    name: String,
    track: TrackId,
    object: TrackObjectId,
    position: f64,
    orientation: Orientation,
    platform: Platform,
    before: Option<TrackObject<Platform>>,
    state: CommandState,
}

impl UpdatePlatformCmd {
    pub fn new(
        track: TrackId,
        object: TrackObjectId,
        position: f64,
        orientation: Orientation,
        platform: Platform,
    ) -> Self {
        Self {
            name: format!("Update platform {}", platform.name),
            track,
            object,
            position,
            orientation,
            platform,
            before: None,
            state: CommandState::Created,
        }
    }

    fn apply(&self, project: &mut Project) -> Result<TrackObject<Platform>, NetworkError> {
        let (track, object) = (self.track, self.object);
        let current = project
            .world_mut()
            .object_mut::<Platform>(track, object)
            .ok_or(NetworkError::UnknownTrackObject { track, object })?;
        let before = current.clone();
        current.set_position(self.position)?;
        current.orientation = self.orientation;
        current.payload = self.platform.clone();
        Ok(before)
    }
}

impl Command for UpdatePlatformCmd {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        check_stop(project, &self.platform)?;
        self.before = Some(self.apply(project)?);
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        let before = self
            .before
            .clone()
            .ok_or_else(|| missing_memento(&self.name, "the previous platform"))?;
        let current = project
            .world_mut()
            .object_mut::<Platform>(self.track, self.object)
            .ok_or_else(|| IntegrityError::EntityNotFound {
                command: self.name.clone(),
                entity: "platform",
                id: self.object,
            })?;
        *current = before;
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        let before = self
            .apply(project)
            .map_err(|e| restore_failed(&self.name, e))?;
        self.before = Some(before);
        self.state = CommandState::Redone;
        Ok(())
    }
}

/// Detaches a platform; undo re-attaches it with the same id, position and
/// orientation.
pub struct RemovePlatformCmd {
    name: String,
    track: TrackId,
    object: TrackObjectId,
    memento: Option<TrackObject<Platform>>,
    state: CommandState,
}

impl RemovePlatformCmd {
    pub fn new(track: TrackId, object: TrackObjectId) -> Self {
        Self {
            name: "Remove platform".to_string(),
            track,
            object,
            memento: None,
            state: CommandState::Created,
        }
    }
}

impl Command for RemovePlatformCmd {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        let object = project
            .world_mut()
            .detach::<Platform>(self.track, self.object)?;
        self.memento = Some(object);
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        let object = self
            .memento
            .take()
            .ok_or_else(|| missing_memento(&self.name, "the removed platform"))?;
        project
            .world_mut()
            .restore_object(object)
            .map_err(|e| restore_failed(&self.name, e))?;
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        let object = project
            .world_mut()
            .detach::<Platform>(self.track, self.object)
            .map_err(|e| restore_failed(&self.name, e))?;
        self.memento = Some(object);
        self.state = CommandState::Redone;
        Ok(())
    }
}
