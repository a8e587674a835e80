//! Scenario constants

/// Upper bound of participants joining one room (drawn from `1..=MAX_JOINERS`)
pub const MAX_JOINERS: u32 = 5;
/// Chance, in percent, that a participant refreshes presence
pub const REFRESH_PERCENT: u32 = 50;
/// Chance, in percent, that a participant leaves manually
pub const LEAVE_PERCENT: u32 = 60;
/// Chance, in percent, that the owner deletes the room
pub const DELETE_PERCENT: u32 = 80;

pub const ROOM_NAME: &str = "UX Discussion";
/// Room lifetime in hours
pub const ROOM_EXPIRES_IN: u32 = 1;
pub const ROOM_OWNER_NAME: &str = "Alexis";
pub const PARTICIPANT_NAME: &str = "Adam";

pub const DEFAULT_SIMPLE_PUSH_URL: &str = "https://call.stage.mozaws.net/";

/// Participant bound and action thresholds for one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioParams {
    pub max_joiners: u32,
    pub refresh_percent: u32,
    pub leave_percent: u32,
    pub delete_percent: u32,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            max_joiners: MAX_JOINERS,
            refresh_percent: REFRESH_PERCENT,
            leave_percent: LEAVE_PERCENT,
            delete_percent: DELETE_PERCENT,
        }
    }
}

impl ScenarioParams {
    /// Same percentage for refresh, leave and delete
    pub fn with_thresholds(mut self, percent: u32) -> Self {
        self.refresh_percent = percent;
        self.leave_percent = percent;
        self.delete_percent = percent;
        self
    }
}
