//! Passive per-turn gains: infrastructure capability, product income and
//! treaty momentum.

use super::context::TurnContext;
use super::resources::complete_treaty_if_capped;
use super::system::TurnSystem;

/// Capability from accepted infrastructure events. Blocked by sanctions.
pub struct PassiveCapabilitySystem;

impl TurnSystem for PassiveCapabilitySystem {
    fn name(&self) -> &str {
        "passive_capability"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        let state = &mut *ctx.state;
        if state.capability_per_turn <= 0.0 {
            return;
        }
        if state.has_sanctions() {
            tracing::debug!(blocked = state.capability_per_turn, "sanctions block passive capability");
            return;
        }
        state.capability += state.capability_per_turn;
    }
}

/// Money from product breakthroughs.
pub struct PassiveIncomeSystem;

impl TurnSystem for PassiveIncomeSystem {
    fn name(&self) -> &str {
        "passive_income"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        let state = &mut *ctx.state;
        if state.income_bonus != 0.0 {
            state.money += state.income_bonus;
            state.clamp_money();
        }
    }
}

/// Treaty progress compounds until it reaches the cap.
pub struct TreatySystem;

impl TurnSystem for TreatySystem {
    fn name(&self) -> &str {
        "treaty"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        let cap = ctx.config.treaty_cap;
        let state = &mut *ctx.state;
        if state.treaty_progress > 0.0 && state.treaty_progress < cap {
            let grown = state.treaty_progress * (1.0 + ctx.config.treaty_compound_rate);
            state.treaty_progress = grown.min(cap);
        }
        complete_treaty_if_capped(state, ctx.config);
    }
}
