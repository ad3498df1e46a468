mod context;
mod runner;
mod signal;
mod system;

pub mod choices;
pub mod competitors;
pub mod economy;
pub mod endgame;
pub mod events;
pub mod handlers;
pub mod helpers;
pub mod incidents;
pub mod resources;
pub mod selection;
pub mod setup;
pub mod stages;
pub mod turn;
pub mod variables;

pub use choices::{ChoiceResolution, choose_event_option};
pub use context::TurnContext;
pub use endgame::{endgame_result, enter_endgame, request_endgame_phase};
pub use resources::{
    AllocationOutcome, GainTable, SectorGain, adjusted_risk_percent, apply_allocation,
    available_allocations, labor_budget, market_share, sector_gains,
};
pub use runner::{default_systems, dispatch_systems};
pub use selection::{event_pool, select_next_event};
pub use setup::new_game_state;
pub use signal::{Signal, SignalKind};
pub use system::TurnSystem;
