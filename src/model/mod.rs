#[macro_use]
mod macros;

pub mod allocation;
pub mod calendar;
pub mod company;
pub mod effect;
pub mod event;
pub mod outcome;
pub mod state;
pub mod status;
pub mod technology;

pub use allocation::{Allocation, Project, Sector};
pub use calendar::TurnDate;
pub use company::{COMPANIES, Company, Competitor, ai_system_name, company_by_name};
pub use effect::{ChoiceBenefit, ChoiceCondition, ChoiceCost, ChoicePenalty, ChoiceRisk, Unlock};
pub use event::{
    ActiveEvent, ChoiceAction, EventChoice, EventPayload, EventStage, EventTemplate, EventType,
    HandlerKind, LevelRange, StageData, StageRecord,
};
pub use outcome::{EndgameResult, ExpectedOutcome, GalaxyDistribution, GalaxyMultipliers, Winner};
pub use state::{
    CAPABILITY_FLOOR, EndgameCache, GameOverReason, GameState, Identity, TurnPhase,
};
pub use status::{StatusChange, StatusEffect, StatusEffectKind, StatusEffects};
pub use technology::{TechColumn, Technology, TechnologySet};
