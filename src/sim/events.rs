use super::context::TurnContext;
use super::incidents::apply_event_effects;
use super::selection::select_next_event;
use super::signal::SignalKind;
use super::system::TurnSystem;

/// Deterministic effects of the event that just closed.
pub struct EventEffectsSystem;

impl TurnSystem for EventEffectsSystem {
    fn name(&self) -> &str {
        "event_effects"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        apply_event_effects(ctx.state);
    }
}

/// Replaces the previous event with the next one.
pub struct EventSelectionSystem;

impl TurnSystem for EventSelectionSystem {
    fn name(&self) -> &str {
        "event_selection"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        // Drop the old event first so its result text never leaks into the
        // new turn.
        ctx.state.current_event = None;
        let event = select_next_event(ctx.state, ctx.catalog, ctx.config, ctx.rng);
        let event_type = event.event_type.clone();
        ctx.state.current_event = Some(event);
        ctx.emit(SignalKind::EventPresented { event_type });
    }
}
