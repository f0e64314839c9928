//! Single-entity add, update and remove commands.

use std::marker::PhantomData;

use transitkit_core::{CommandError, IntegrityError, ValidationError};

use crate::command::{missing_memento, restore_failed, Command, CommandState};
use crate::entities::{Entity, EntityId};
use crate::managers::{CrudManager, ManagerMemento, Memento};
use crate::project::{Project, ProjectManager};

fn kind<M: ProjectManager>() -> &'static str {
    <M::Item as Entity>::KIND.as_str()
}

fn not_found<M: ProjectManager>(command: &str, id: EntityId) -> IntegrityError {
    IntegrityError::EntityNotFound {
        command: command.to_string(),
        entity: kind::<M>(),
        id: id as i64,
    }
}

/// Adds one entity. Redo restores the removed entity from its memento so it
/// keeps the id assigned by the first execution.
pub struct AtomicAdd<M: ProjectManager> {
    name: String,
    record: M::Item,
    memento: Option<Memento<M::Item>>,
    state: CommandState,
    _manager: PhantomData<fn() -> M>,
}

impl<M: ProjectManager> AtomicAdd<M> {
    pub fn new(record: M::Item) -> Self {
        Self {
            name: format!("Add {}", kind::<M>()),
            record,
            memento: None,
            state: CommandState::Created,
            _manager: PhantomData,
        }
    }

    /// The record, carrying the assigned id once executed.
    pub fn record(&self) -> &M::Item {
        &self.record
    }

    pub fn id(&self) -> EntityId {
        self.record.id()
    }
}

impl<M: ProjectManager> Command for AtomicAdd<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        let id = project.add::<M>(self.record.clone())?;
        self.record.set_id(id);
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        let id = self.record.id();
        let memento = M::select(project)
            .memento(id)
            .ok_or_else(|| not_found::<M>(&self.name, id))?;
        M::select_mut(project)
            .remove_item(id)
            .map_err(|e| restore_failed(&self.name, e))?;
        self.memento = Some(memento);
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        let memento = self
            .memento
            .take()
            .ok_or_else(|| missing_memento(&self.name, "the removed entity"))?;
        M::select_mut(project).restore_memento(memento);
        self.state = CommandState::Redone;
        Ok(())
    }
}

/// Replaces one entity with the record's fields.
pub struct AtomicUpdate<M: ProjectManager> {
    name: String,
    record: M::Item,
    before: Option<Memento<M::Item>>,
    state: CommandState,
    _manager: PhantomData<fn() -> M>,
}

impl<M: ProjectManager> AtomicUpdate<M> {
    pub fn new(record: M::Item) -> Self {
        Self {
            name: format!("Update {}", kind::<M>()),
            record,
            before: None,
            state: CommandState::Created,
            _manager: PhantomData,
        }
    }
}

impl<M: ProjectManager> Command for AtomicUpdate<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        let id = self.record.id();
        let before = M::select(project)
            .memento(id)
            .ok_or(ValidationError::NotFound {
                entity: kind::<M>(),
                id,
            })?;
        project.update::<M>(self.record.clone())?;
        self.before = Some(before);
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        let before = self
            .before
            .clone()
            .ok_or_else(|| missing_memento(&self.name, "the previous state"))?;
        M::select_mut(project).restore_memento(before);
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        let id = self.record.id();
        let before = M::select(project)
            .memento(id)
            .ok_or_else(|| not_found::<M>(&self.name, id))?;
        project
            .update::<M>(self.record.clone())
            .map_err(|e| restore_failed(&self.name, e))?;
        self.before = Some(before);
        self.state = CommandState::Redone;
        Ok(())
    }
}

/// Removes one entity; undo restores it from the memento.
pub struct AtomicRemove<M: ProjectManager> {
    name: String,
    id: EntityId,
    memento: Option<Memento<M::Item>>,
    state: CommandState,
    _manager: PhantomData<fn() -> M>,
}

impl<M: ProjectManager> AtomicRemove<M> {
    pub fn new(id: EntityId) -> Self {
        Self {
            name: format!("Remove {}", kind::<M>()),
            id,
            memento: None,
            state: CommandState::Created,
            _manager: PhantomData,
        }
    }
}

impl<M: ProjectManager> Command for AtomicRemove<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        let memento = M::select(project)
            .memento(self.id)
            .ok_or(ValidationError::NotFound {
                entity: kind::<M>(),
                id: self.id,
            })?;
        project.remove::<M>(self.id)?;
        self.memento = Some(memento);
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        let memento = self
            .memento
            .clone()
            .ok_or_else(|| missing_memento(&self.name, "the removed entity"))?;
        M::select_mut(project).restore_memento(memento);
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        let memento = M::select(project)
            .memento(self.id)
            .ok_or_else(|| not_found::<M>(&self.name, self.id))?;
        project
            .remove::<M>(self.id)
            .map_err(|e| restore_failed(&self.name, e))?;
        self.memento = Some(memento);
        self.state = CommandState::Redone;
        Ok(())
    }
}
