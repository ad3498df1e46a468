//! Turn bookkeeping: calendar, allocation hand-off, status countdowns and
//! the terminal checks that close every advance.

use rand::RngCore;
use rand::seq::IndexedRandom;

use super::context::TurnContext;
use super::endgame::enter_endgame;
use super::resources::{adjusted_risk_percent, apply_allocation, unlocked_allocations};
use super::signal::SignalKind;
use super::system::TurnSystem;
use crate::config::GameConfig;
use crate::model::{Allocation, GameOverReason, GameState, StatusChange, TurnPhase};

pub struct CalendarSystem;

impl TurnSystem for CalendarSystem {
    fn name(&self) -> &str {
        "calendar"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        ctx.state.date = ctx.state.date.next();
        tracing::debug!(turn = ctx.state.date.turn(), date = %ctx.state.date, "new turn");
    }
}

/// Applies a selection that was queued but not yet applied, then clears the
/// selection for the new turn.
pub struct QueuedAllocationSystem;

impl TurnSystem for QueuedAllocationSystem {
    fn name(&self) -> &str {
        "queued_allocation"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        if let Some(allocation) = ctx.state.selected_allocation {
            if !ctx.state.allocation_applied {
                match apply_allocation(ctx.state, ctx.config, allocation) {
                    Ok(_) => ctx.emit(SignalKind::AllocationApplied { allocation }),
                    Err(err) => {
                        tracing::warn!(%allocation, error = %err, "queued allocation dropped");
                    }
                }
            }
        }
        ctx.state.selected_allocation = None;
        ctx.state.allocation_applied = false;
    }
}

pub struct StatusCountdownSystem;

impl TurnSystem for StatusCountdownSystem {
    fn name(&self) -> &str {
        "status_countdown"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        for change in ctx.state.status_effects.tick() {
            match change {
                StatusChange::Activated(kind) => tracing::debug!(%kind, "status effect activated"),
                StatusChange::Expired(kind) => tracing::debug!(%kind, "status effect expired"),
                StatusChange::Removed(kind) => tracing::debug!(%kind, "status effect removed"),
            }
        }
    }
}

/// Why the game should end now, if it should.
pub fn check_end_conditions(state: &GameState, config: &GameConfig) -> Option<GameOverReason> {
    if adjusted_risk_percent(state) >= config.terminal_risk {
        return Some(GameOverReason::TerminalRisk);
    }
    if state.capability >= config.asi_threshold || state.max_competitor_capability() >= config.asi_threshold {
        return Some(GameOverReason::Singularity);
    }
    None
}

/// Derive the turn phase from the state outside of an advance.
pub fn settle_phase(state: &mut GameState) {
    state.phase = if let Some(reason) = state.game_over_reason {
        TurnPhase::GameOver(reason)
    } else if state.current_event.as_ref().is_some_and(|e| e.needs_decision()) {
        TurnPhase::EventPending
    } else if state.allocation_applied {
        TurnPhase::AllocationApplied
    } else {
        TurnPhase::AwaitingAllocation
    };
}

pub struct EndConditionSystem;

impl TurnSystem for EndConditionSystem {
    fn name(&self) -> &str {
        "end_conditions"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        if let Some(reason) = check_end_conditions(ctx.state, ctx.config) {
            enter_endgame(ctx.state, ctx.config, reason);
            ctx.emit(SignalKind::GameOver { reason });
        }
    }
}

/// Past the capability and risk thresholds, a random non-capability
/// allocation is unavailable for the coming turn. Re-rolled every turn.
pub struct SuperpersuasionSystem;

impl TurnSystem for SuperpersuasionSystem {
    fn name(&self) -> &str {
        "superpersuasion"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        if let Some(allocation) = roll_superpersuasion(ctx.state, ctx.config, &mut *ctx.rng) {
            ctx.emit(SignalKind::AllocationDisabled { allocation });
        }
    }
}

/// Past the capability and risk thresholds, knock out one random
/// non-capability allocation for the coming turn. Below them the slot is
/// cleared. Returns the disabled allocation, if any.
pub fn roll_superpersuasion(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut dyn RngCore,
) -> Option<Allocation> {
    let eligible = state.capability >= config.superpersuasion_capability
        && adjusted_risk_percent(state) >= config.superpersuasion_risk;
    let candidates: Vec<Allocation> = if eligible {
        unlocked_allocations(state)
            .into_iter()
            .filter(|a| *a != Allocation::CAPABILITY)
            .collect()
    } else {
        Vec::new()
    };
    state.disabled_allocation = candidates.choose(rng).copied();
    if let Some(allocation) = state.disabled_allocation {
        tracing::debug!(%allocation, "superpersuasion disables allocation");
    }
    state.disabled_allocation
}
