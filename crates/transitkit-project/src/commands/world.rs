//! Commands resizing the world and editing segment backgrounds.

use transitkit_core::{CommandError, IntegrityError};
use transitkit_network::{Direction, Segment};

use crate::command::{missing_memento, restore_failed, Command, CommandState};
use crate::project::Project;

/// Appends a row or column of segments.
pub struct ExtendWorldCmd {
    name: String,
    direction: Direction,
    state: CommandState,
}

impl ExtendWorldCmd {
    pub fn new(direction: Direction) -> Self {
        Self {
            name: format!("Extend world {direction}"),
            direction,
            state: CommandState::Created,
        }
    }
}

impl Command for ExtendWorldCmd {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        project.world_mut().extend(self.direction);
        project.notify_world_changed();
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        project
            .world_mut()
            .shrink(self.direction)
            .map_err(|e| restore_failed(&self.name, e))?;
        project.notify_world_changed();
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        project.world_mut().extend(self.direction);
        project.notify_world_changed();
        self.state = CommandState::Redone;
        Ok(())
    }
}

/// Removes an unused border row or column.
pub struct ShrinkWorldCmd {
    name: String,
    direction: Direction,
    removed: Option<Vec<Segment>>,
    state: CommandState,
}

impl ShrinkWorldCmd {
    pub fn new(direction: Direction) -> Self {
        Self {
            name: format!("Shrink world {direction}"),
            direction,
            removed: None,
            state: CommandState::Created,
        }
    }
}

impl Command for ShrinkWorldCmd {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        let removed = project.world_mut().shrink(self.direction)?;
        self.removed = Some(removed);
        project.notify_world_changed();
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        let removed = self
            .removed
            .take()
            .ok_or_else(|| missing_memento(&self.name, "the removed border"))?;
        project.world_mut().restore_border(self.direction, removed);
        project.notify_world_changed();
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        let removed = project
            .world_mut()
            .shrink(self.direction)
            .map_err(|e| restore_failed(&self.name, e))?;
        self.removed = Some(removed);
        project.notify_world_changed();
        self.state = CommandState::Redone;
        Ok(())
    }
}

/// Sets or clears the background bitmap of one segment.
pub struct SetSegmentBackgroundCmd {
    name: String,
    column: usize,
    row: usize,
    background: Option<String>,
    previous: Option<String>,
    state: CommandState,
}

impl SetSegmentBackgroundCmd {
    pub fn new(column: usize, row: usize, background: Option<String>) -> Self {
        Self {
            name: format!("Set background of segment ({column}, {row})"),
            column,
            row,
            background,
            previous: None,
            state: CommandState::Created,
        }
    }

    fn apply(&mut self, project: &mut Project) -> Result<(), transitkit_core::WorldError> {
        self.previous = project.world_mut().set_segment_background(
            self.column,
            self.row,
            self.background.clone(),
        )?;
        Ok(())
    }
}

impl Command for SetSegmentBackgroundCmd {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, project: &mut Project) -> Result<(), CommandError> {
        self.state.check_execute(&self.name)?;
        self.apply(project)?;
        self.state = CommandState::Executed;
        Ok(())
    }

    fn undo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_undo(&self.name)?;
        project
            .world_mut()
            .set_segment_background(self.column, self.row, self.previous.clone())
            .map_err(|e| restore_failed(&self.name, e))?;
        self.state = CommandState::Undone;
        Ok(())
    }

    fn redo(&mut self, project: &mut Project) -> Result<(), IntegrityError> {
        self.state.check_redo(&self.name)?;
        self.apply(project)
            .map_err(|e| restore_failed(&self.name, e))?;
        self.state = CommandState::Redone;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transitkit_core::WorldError;
    use transitkit_network::TrackShape;

    #[test]
    fn test_shrink_occupied_border_fails() {
        let mut project = Project::new("p");
        project.world_mut().extend(Direction::South);
        project.world_mut().add_vertex(10.0, 1500.0).unwrap();
        let before = project.clone();
        let mut cmd = ShrinkWorldCmd::new(Direction::South);
        assert!(matches!(
            cmd.execute(&mut project),
            Err(CommandError::World(WorldError::BorderInUse { .. }))
        ));
        assert_eq!(project, before);
    }

    #[test]
    fn test_shrink_round_trip_keeps_background() {
        let mut project = Project::new("p");
        project.world_mut().extend(Direction::West);
        project
            .world_mut()
            .set_segment_background(0, 0, Some("west.png".into()))
            .unwrap();
        let a = project.world_mut().add_vertex(10.0, 10.0).unwrap();
        let b = project.world_mut().add_vertex(20.0, 10.0).unwrap();
        project
            .world_mut()
            .add_track([a, b], TrackShape::Straight)
            .unwrap();
        let before = project.clone();
        let mut cmd = ShrinkWorldCmd::new(Direction::West);
        cmd.execute(&mut project).unwrap();
        assert_eq!(project.world().columns(), 1);
        let after = project.clone();
        cmd.undo(&mut project).unwrap();
        assert_eq!(project, before);
        cmd.redo(&mut project).unwrap();
        assert_eq!(project, after);
    }

    #[test]
    fn test_set_background_round_trip() {
        let mut project = Project::new("p");
        let mut cmd = SetSegmentBackgroundCmd::new(0, 0, Some("city.png".into()));
        cmd.execute(&mut project).unwrap();
        assert_eq!(project.world().segment(0, 0).unwrap().background(), Some("city.png"));
        cmd.undo(&mut project).unwrap();
        assert_eq!(project.world().segment(0, 0).unwrap().background(), None);
        let mut bad = SetSegmentBackgroundCmd::new(5, 5, None);
        assert!(matches!(
            bad.execute(&mut project),
            Err(CommandError::World(WorldError::UnknownSegment { column: 5, row: 5 }))
        ));
    }
}
