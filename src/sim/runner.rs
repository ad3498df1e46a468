use rand::RngCore;

use super::competitors::CompetitorGrowthSystem;
use super::context::TurnContext;
use super::economy::{PassiveCapabilitySystem, PassiveIncomeSystem, TreatySystem};
use super::events::{EventEffectsSystem, EventSelectionSystem};
use super::signal::Signal;
use super::system::TurnSystem;
use super::turn::{
    CalendarSystem, EndConditionSystem, QueuedAllocationSystem, StatusCountdownSystem,
    SuperpersuasionSystem,
};
use crate::config::GameConfig;
use crate::content::EventCatalog;
use crate::model::GameState;

/// The standard turn advance, in execution order.
pub fn default_systems() -> Vec<Box<dyn TurnSystem>> {
    vec![
        Box::new(CompetitorGrowthSystem),
        Box::new(PassiveCapabilitySystem),
        Box::new(EventEffectsSystem),
        Box::new(PassiveIncomeSystem),
        Box::new(TreatySystem),
        Box::new(CalendarSystem),
        Box::new(EventSelectionSystem),
        Box::new(QueuedAllocationSystem),
        Box::new(StatusCountdownSystem),
        Box::new(EndConditionSystem),
        Box::new(SuperpersuasionSystem),
    ]
}

/// Run each system once, in registration order. Returns emitted signals.
///
/// Dispatch stops as soon as a system ends the game, so nothing after the
/// terminal check mutates a finished game.
pub fn dispatch_systems(
    state: &mut GameState,
    catalog: &EventCatalog,
    config: &GameConfig,
    systems: &mut [Box<dyn TurnSystem>],
    rng: &mut dyn RngCore,
) -> Vec<Signal> {
    let mut signals = Vec::new();
    for system in systems.iter_mut() {
        if state.is_game_over() {
            tracing::debug!(system = system.name(), "skipping system after game over");
            break;
        }
        let mut ctx = TurnContext {
            state,
            catalog,
            config,
            rng,
            signals: &mut signals,
        };
        system.run(&mut ctx);
    }
    signals
}
