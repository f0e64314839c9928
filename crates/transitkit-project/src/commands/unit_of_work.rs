//! Batched insert/update/remove of one entity kind.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use transitkit_core::{CommandError, IntegrityError, ValidationError};

use crate::command::{missing_memento, restore_failed, Command, CommandState};
use crate::entities::{Entity, EntityId};
use crate::managers::{CrudManager, ManagerMemento, Memento};
use crate::project::{Project, ProjectManager};

/// Applies a set of inserts, updates and removes as one command.
///
/// Every direction processes inserts, then updates, then removes. Each
/// record keeps its own memento so it can be restored independently.
pub struct UnitOfWorkCmd<M: ProjectManager> {
    name: String,
    inserts: Vec<M::Item>,
    updates: Vec<M::Item>,
    removes: Vec<EntityId>,
    inserted: BTreeMap<EntityId, Memento<M::Item>>,
    updated: BTreeMap<EntityId, Memento<M::Item>>,
    removed: BTreeMap<EntityId, Memento<M::Item>>,
    state: CommandState,
    _manager: PhantomData<fn() -> M>,
}

impl<M: ProjectManager> Default for UnitOfWorkCmd<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ProjectManager> UnitOfWorkCmd<M> {
    pub fn new() -> Self {
        Self {
            name: format!("Update {}s", <M::Item as Entity>::KIND.as_str()),
            inserts: Vec::new(),
            updates: Vec::new(),
            removes: Vec::new(),
            inserted: BTreeMap::new(),
            updated: BTreeMap::new(),
            removed: BTreeMap::new(),
            state: CommandState::Created,
            _manager: PhantomData,
        }
    }

    pub fn insert(mut self, item: M::Item) -> Self {
        self.inserts.push(item);
        self
    }

    pub fn update(mut self, item: M::Item) -> Self {
        self.updates.push(item);
        self
    }

    pub fn remove(mut self, id: EntityId) -> Self {
        self.removes.push(id);
        self
    }

    /// Inserted records, carrying their assigned ids once executed.
    pub fn inserts(&self) -> &[M::Item] {
        &self.inserts
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.removes.is_empty()
    }

    fn check_distinct(&self) -> Result<(), ValidationError> {
        let mut seen = BTreeSet::new();
        let ids = self.updates.iter().map(|u| u.id()).chain(self.removes.iter().copied());
        for id in ids {
            if !seen.insert(id) {
                return Err(ValidationError::InvalidField {
                    field: "unit of work",
                    reason: format!("{} {} is staged twice", <M::Item as Entity>::KIND, id),
                });
            }
        }
        Ok(())
    }

    fn not_found(&self, id: EntityId) -> ValidationError {
        ValidationError::NotFound {
            entity: <M::Item as Entity>::KIND.as_str(),
            id,
        }
    }

    fn apply(&mut self, project: &mut Project) -> Result<(), ValidationError> {
        for item in &mut self.inserts {
            let id = project.add::<M>(item.clone())?;
            item.set_id(id);
        }
        for item in &self.updates {
            let before = M::select(project)
                .memento(item.id())
                .ok_or_else(|| self.not_found(item.id()))?;
            project.update::<M>(item.clone())?;
            self.updated.insert(item.id(), before);
        }
        for &id in &self.removes {
            let memento = M::select(project)
                .memento(id)
                .ok_or_else(|| self.not_found(id))?;
            project.remove::<M>(id)?;
            self.removed.insert(id, memento);
        }
        Ok(())
    }

    fn entity_not_found(&self, id: EntityId) -> IntegrityError {
        IntegrityError::EntityNotFound {
            command: self.name.clone(),
            entity: <M::Item as Entity>::KIND.as_str(),
            id: id as i64,
        }
    }
}

impl<M: ProjectManager> Command for UnitOfWorkCmd<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        self.check_distinct()?;
        let backup = M::select(project).clone();
        let originals = self.inserts.clone();
        if let Err(err) = self.apply(project) {
            *M::select_mut(project) = backup;
            self.inserts = originals;
            self.updated.clear();
            self.removed.clear();
            return Err(err.into());
        }
        tracing::debug!(
            command = %self.name,
            inserts = self.inserts.len(),
            updates = self.updates.len(),
            removes = self.removes.len(),
            "Unit of work applied"
        );
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        for item in &self.inserts {
            let id = item.id();
            let memento = M::select(project)
                .memento(id)
                .ok_or_else(|| self.entity_not_found(id))?;
            M::select_mut(project)
                .remove_item(id)
                .map_err(|e| restore_failed(&self.name, e))?;
            self.inserted.insert(id, memento);
        }
        for item in &self.updates {
            let before = self
                .updated
                .get(&item.id())
                .cloned()
                .ok_or_else(|| missing_memento(&self.name, format!("updated record {}", item.id())))?;
            M::select_mut(project).restore_memento(before);
        }
        for id in &self.removes {
            let memento = self
                .removed
                .get(id)
                .cloned()
                .ok_or_else(|| missing_memento(&self.name, format!("removed record {id}")))?;
            M::select_mut(project).restore_memento(memento);
        }
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        for item in &self.inserts {
            let memento = self
                .inserted
                .remove(&item.id())
                .ok_or_else(|| missing_memento(&self.name, format!("inserted record {}", item.id())))?;
            M::select_mut(project).restore_memento(memento);
        }
        for item in &self.updates {
            let before = M::select(project)
                .memento(item.id())
                .ok_or_else(|| self.entity_not_found(item.id()))?;
            project
                .update::<M>(item.clone())
                .map_err(|e| restore_failed(&self.name, e))?;
            self.updated.insert(item.id(), before);
        }
        for &id in &self.removes {
            let memento = M::select(project)
                .memento(id)
                .ok_or_else(|| self.entity_not_found(id))?;
            project
                .remove::<M>(id)
                .map_err(|e| restore_failed(&self.name, e))?;
            self.removed.insert(id, memento);
        }
        self.state = CommandState::Redone;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Stop;
    use crate::managers::StopManager;

    fn stop(name: &str) -> Stop {
        Stop {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_failure_rolls_back_earlier_records() {
        let mut project = Project::new("p");
        let existing = project.add::<StopManager>(stop("Central")).unwrap();
        let before = project.clone();
        let mut cmd = UnitOfWorkCmd::<StopManager>::new()
            .insert(stop("Harbour"))
            .remove(existing)
            .remove(99);
        assert!(matches!(
            cmd.execute(&mut project),
            Err(CommandError::Validation(ValidationError::NotFound { id: 99, .. }))
        ));
        assert_eq!(project, before);
        assert_eq!(cmd.inserts()[0].id, 0);
    }

    #[test]
    fn test_record_staged_twice_is_rejected() {
        let mut project = Project::new("p");
        let id = project.add::<StopManager>(stop("Central")).unwrap();
        let mut cmd = UnitOfWorkCmd::<StopManager>::new()
            .update(Stop {
                id,
                name: "Main".into(),
                abbreviation: None,
            })
            .remove(id);
        assert!(matches!(
            cmd.execute(&mut project),
            Err(CommandError::Validation(ValidationError::InvalidField { .. }))
        ));
    }

    #[test]
    fn test_full_round_trip() {
        let mut project = Project::new("p");
        let a = project.add::<StopManager>(stop("A")).unwrap();
        let b = project.add::<StopManager>(stop("B")).unwrap();
        let before = project.clone();
        let mut cmd = UnitOfWorkCmd::<StopManager>::new()
            .insert(stop("C"))
            .update(Stop {
                id: a,
                name: "A2".into(),
                abbreviation: None,
            })
            .remove(b);
        cmd.execute(&mut project).unwrap();
        let after = project.clone();
        cmd.undo(&mut project).unwrap();
        assert_eq!(project, before);
        cmd.redo(&mut project).unwrap();
        assert_eq!(project, after);
        cmd.undo(&mut project).unwrap();
        assert_eq!(project, before);
    }
}
