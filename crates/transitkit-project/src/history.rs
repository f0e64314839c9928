//! Linear undo/redo history of executed commands.

use std::collections::VecDeque;
use std::sync::Arc;

use transitkit_core::constants::DEFAULT_HISTORY_CAPACITY;
use transitkit_core::{AppEvent, EventBus, HistoryError, HistoryEvent, IntegrityError, ReplayDirection};

use crate::command::Command;
use crate::project::Project;

/// Bounded history of executed commands.
///
/// Entries before the cursor can be undone, entries from the cursor on can
/// be redone. Executing a command discards the redo tail; exceeding the
/// capacity evicts the oldest entry.
pub struct History {
    entries: VecDeque<Box<dyn Command>>,
    cursor: usize,
    capacity: usize,
    event_bus: Option<Arc<EventBus>>,
}

impl History {
    /// Create a history with the default capacity (100)
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a history retaining at most `capacity` entries (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
            event_bus: None,
        }
    }

    /// Publish history events on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of undoable entries
    pub fn past_count(&self) -> usize {
        self.cursor
    }

    /// Number of redoable entries
    pub fn future_count(&self) -> usize {
        self.entries.len() - self.cursor
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Names of all retained entries, oldest first
    pub fn entries(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.name()).collect()
    }

    /// Execute `command` and record it
    ///
    /// A failing command is not recorded and the history is left as it was.
    pub fn execute(
        &mut self,
        project: &mut Project,
        mut command: Box<dyn Command>,
    ) -> Result<(), HistoryError> {
        if let Err(err) = command.execute(project) {
            tracing::warn!(command = command.name(), error = %err, "Command rejected");
            return Err(err.into());
        }
        tracing::info!(command = command.name(), "Command executed");

        self.entries.truncate(self.cursor);
        self.entries.push_back(command);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::debug!(command = evicted.name(), "History entry evicted");
            }
        }
        self.cursor = self.entries.len();
        self.notify_changed();
        Ok(())
    }

    /// Undo the newest past entry
    pub fn undo(&mut self, project: &mut Project) -> Result<(), HistoryError> {
        self.undo_step(project)?;
        self.notify_changed();
        Ok(())
    }

    /// Redo the oldest future entry
    pub fn redo(&mut self, project: &mut Project) -> Result<(), HistoryError> {
        self.redo_step(project)?;
        self.notify_changed();
        Ok(())
    }

    /// Undo or redo one step at a time until the cursor equals `index`
    pub fn jump_to(&mut self, project: &mut Project, index: usize) -> Result<(), HistoryError> {
        if index > self.entries.len() {
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        while self.cursor > index {
            self.undo_step(project)?;
        }
        while self.cursor < index {
            self.redo_step(project)?;
        }
        self.notify_changed();
        Ok(())
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.notify_changed();
    }

    fn undo_step(&mut self, project: &mut Project) -> Result<(), HistoryError> {
        if self.cursor == 0 {
            return Err(HistoryError::NothingToUndo);
        }
        let index = self.cursor - 1;
        let result = self.entries[index].undo(project);
        self.finish_step(result, index, ReplayDirection::Undo)
    }

    fn redo_step(&mut self, project: &mut Project) -> Result<(), HistoryError> {
        if self.cursor >= self.entries.len() {
            return Err(HistoryError::NothingToRedo);
        }
        let index = self.cursor;
        let result = self.entries[index].redo(project);
        self.finish_step(result, index, ReplayDirection::Redo)
    }

    fn finish_step(
        &mut self,
        result: Result<(), IntegrityError>,
        index: usize,
        direction: ReplayDirection,
    ) -> Result<(), HistoryError> {
        let name = self.entries[index].name().to_string();
        if let Err(err) = result {
            tracing::error!(command = %name, ?direction, error = %err, "History integrity failure, clearing history");
            self.clear();
            return Err(err.into());
        }
        self.cursor = match direction {
            ReplayDirection::Undo => index,
            ReplayDirection::Redo => index + 1,
        };
        tracing::info!(command = %name, ?direction, cursor = self.cursor, "Command replayed");
        self.publish(HistoryEvent::CommandReplayed {
            name,
            direction,
            cursor: self.cursor,
        });
        Ok(())
    }

    fn notify_changed(&self) {
        self.publish(HistoryEvent::Changed {
            past: self.past_count(),
            future: self.future_count(),
        });
    }

    fn publish(&self, event: HistoryEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(AppEvent::History(event));
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("entries", &self.entries())
            .field("cursor", &self.cursor)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandState;
    use transitkit_core::{CommandError, EventFilter};

    /// Sets the project path; undo clears it.
    struct Rename {
        name: String,
        state: CommandState,
        fail_undo: bool,
    }

    impl Rename {
        fn boxed(name: &str) -> Box<dyn Command> {
            Box::new(Self {
                name: name.to_string(),
                state: CommandState::Created,
                fail_undo: false,
            })
        }
    }

    impl Command for Rename {
        fn name(&self) -> &str {
            &self.name
        }

        fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
            self.state.check_execute(&self.name)?;
            project.set_path(Some(self.name.clone().into()));
            self.state = CommandState::Executed;
            Ok(())
        }

        fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
            self.state.check_undo(&self.name)?;
            if self.fail_undo {
                return Err(IntegrityError::MissingMemento {
                    command: self.name.clone(),
                    what: "path".into(),
                });
            }
            project.set_path(None);
            self.state = CommandState::Undone;
            Ok(())
        }

        fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
            self.state.check_redo(&self.name)?;
            project.set_path(Some(self.name.clone().into()));
            self.state = CommandState::Redone;
            Ok(())
        }
    }

    #[test]
    fn test_execute_undo_redo() {
        let mut project = Project::new("p");
        let mut history = History::new();
        history.execute(&mut project, Rename::boxed("a")).unwrap();
        assert_eq!(history.past_count(), 1);
        history.undo(&mut project).unwrap();
        assert_eq!((history.past_count(), history.future_count()), (0, 1));
        assert!(project.path().is_none());
        history.redo(&mut project).unwrap();
        assert_eq!(project.path().unwrap().to_str(), Some("a"));
        assert_eq!(history.undo(&mut project), Ok(()));
        assert_eq!(history.undo(&mut project), Err(HistoryError::NothingToUndo));
    }

    #[test]
    fn test_execute_truncates_future() {
        let mut project = Project::new("p");
        let mut history = History::new();
        history.execute(&mut project, Rename::boxed("a")).unwrap();
        history.execute(&mut project, Rename::boxed("b")).unwrap();
        history.undo(&mut project).unwrap();
        history.execute(&mut project, Rename::boxed("c")).unwrap();
        assert_eq!(history.entries(), vec!["a", "c"]);
        assert_eq!(history.redo(&mut project), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn test_capacity_eviction() {
        let mut project = Project::new("p");
        let mut history = History::with_capacity(3);
        for name in ["a", "b", "c", "d", "e"] {
            history.execute(&mut project, Rename::boxed(name)).unwrap();
        }
        assert_eq!(history.entries(), vec!["c", "d", "e"]);
        for _ in 0..3 {
            history.undo(&mut project).unwrap();
        }
        assert_eq!(history.undo(&mut project), Err(HistoryError::NothingToUndo));
    }

    #[test]
    fn test_jump_to_emits_one_event_per_step() {
        let bus = Arc::new(EventBus::new());
        let (_, mut rx) = bus.subscribe_queue(EventFilter::All);
        let mut project = Project::new("p");
        let mut history = History::new().with_event_bus(bus);
        for name in ["a", "b", "c"] {
            history.execute(&mut project, Rename::boxed(name)).unwrap();
        }
        while rx.try_recv().is_ok() {}

        history.jump_to(&mut project, 0).unwrap();
        let mut replayed = Vec::new();
        let mut changed = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::History(HistoryEvent::CommandReplayed { name, .. }) => replayed.push(name),
                AppEvent::History(HistoryEvent::Changed { .. }) => changed += 1,
                _ => {}
            }
        }
        assert_eq!(replayed, vec!["c", "b", "a"]);
        assert_eq!(changed, 1);
        assert_eq!(
            history.jump_to(&mut project, 4),
            Err(HistoryError::IndexOutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn test_integrity_failure_clears_history() {
        let mut project = Project::new("p");
        let mut history = History::new();
        history
            .execute(
                &mut project,
                Box::new(Rename {
                    name: "broken".into(),
                    state: CommandState::Created,
                    fail_undo: true,
                }),
            )
            .unwrap();
        let err = history.undo(&mut project).unwrap_err();
        assert!(matches!(err, HistoryError::Integrity(_)));
        assert!(history.is_empty());
        assert_eq!(history.cursor(), 0);
    }
}
