//! Commands editing the track network.
//!
//! Network edits touch many vertices and tracks at once, so these commands
//! keep whole-world mementos: the state before execution, and the state
//! captured when the command is undone.

use transitkit_core::{CommandError, IntegrityError, NetworkError};
use transitkit_network::{CommitReport, NetworkUnitOfWork, TrackId, VertexId, World};

use crate::command::{missing_memento, Command, CommandState};
use crate::project::Project;

#[derive(Debug, Default)]
struct WorldMementos {
    before: Option<World>,
    after: Option<World>,
}

impl WorldMementos {
    fn undo(&mut self, command: &str, project: &mut Project) -> Result<(), IntegrityError> {
        let before = self
            .before
            .clone()
            .ok_or_else(|| missing_memento(command, "the world before execution"))?;
        let after = std::mem::replace(project.world_mut(), before);
        self.after = Some(after);
        project.notify_world_changed();
        Ok(())
    }

    fn redo(&mut self, command: &str, project: &mut Project) -> Result<(), IntegrityError> {
        let after = self
            .after
            .take()
            .ok_or_else(|| missing_memento(command, "the world after execution"))?;
        *project.world_mut() = after;
        project.notify_world_changed();
        Ok(())
    }
}

/// Commits a [`NetworkUnitOfWork`] to the project's world.
pub struct NetworkLayoutChangeCmd {
    name: String,
    uow: NetworkUnitOfWork,
    report: Option<CommitReport>,
    mementos: WorldMementos,
    state: CommandState,
}

impl NetworkLayoutChangeCmd {
    pub fn new(uow: NetworkUnitOfWork) -> Self {
        Self::named("Change network layout", uow)
    }

    pub fn named(name: impl Into<String>, uow: NetworkUnitOfWork) -> Self {
        Self {
            name: name.into(),
            uow,
            report: None,
            mementos: WorldMementos::default(),
            state: CommandState::Created,
        }
    }

    /// Live ids assigned to the staged records.
    pub fn report(&self) -> Option<&CommitReport> {
        self.report.as_ref()
    }
}

impl Command for NetworkLayoutChangeCmd {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        let (report, before) = self.uow.commit_with_previous(project.world_mut())?;
        self.mementos.before = Some(before);
        self.report = Some(report);
        project.notify_world_changed();
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        self.mementos.undo(&self.name, project)?;
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        self.mementos.redo(&self.name, project)?;
        self.state = CommandState::Redone;
        Ok(())
    }
}

/// Removes tracks and then vertices from the world.
///
/// Tracks still carrying objects and vertices still bound to remaining
/// tracks make the whole command fail.
pub struct RemoveNetworkElementsCmd {
    name: String,
    tracks: Vec<TrackId>,
    vertices: Vec<VertexId>,
    mementos: WorldMementos,
    state: CommandState,
}

impl RemoveNetworkElementsCmd {
    pub fn new(tracks: Vec<TrackId>, vertices: Vec<VertexId>) -> Self {
        Self {
            name: "Remove network elements".to_string(),
            tracks,
            vertices,
            mementos: WorldMementos::default(),
            state: CommandState::Created,
        }
    }

    fn apply(&self, world: &mut World) -> Result<(), NetworkError> {
        for &track in &self.tracks {
            world.remove_track(track)?;
        }
        for &vertex in &self.vertices {
            world.remove_vertex(vertex)?;
        }
        Ok(())
    }
}

impl Command for RemoveNetworkElementsCmd {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        let before = project.world().clone();
        if let Err(err) = self.apply(project.world_mut()) {
            *project.world_mut() = before;
            return Err(err.into());
        }
        self.mementos.before = Some(before);
        project.notify_world_changed();
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        self.mementos.undo(&self.name, project)?;
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        self.mementos.redo(&self.name, project)?;
        self.state = CommandState::Redone;
        Ok(())
    }
}
