use thiserror::Error;

use crate::model::{Allocation, Project};

/// Why a command was refused. A refused command leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("allocation {0} already selected this turn")]
    AllocationAlreadySelected(Allocation),
    #[error("allocation {0} is unavailable this turn")]
    AllocationDisabled(Allocation),
    #[error("project {0} has not been unlocked")]
    ProjectLocked(Project),
    #[error("cannot afford {what}")]
    Unaffordable { what: String },
    #[error("choice index {index} out of range ({available} choices)")]
    ChoiceOutOfRange { index: usize, available: usize },
    #[error("no event is waiting for a choice")]
    NoPendingChoice,
    #[error("no allocation selected this turn")]
    NoAllocation,
    #[error("the current event still needs a choice")]
    EventUnresolved,
    #[error("the game is over")]
    GameOver,
    #[error("the game has not reached the endgame")]
    NotInEndgame,
    #[error("endgame phase {requested} requested out of order (next is {next})")]
    PhaseOutOfOrder { requested: u8, next: u8 },
}
