//! Resolving the player's choice on the current event.

use rand::RngCore;

use crate::config::GameConfig;
use crate::error::CommandError;
use crate::model::{
    ChoiceBenefit, ChoiceCost, ChoicePenalty, ChoiceRisk, EventChoice, GameOverReason, GameState,
    StatusEffectKind, Unlock,
};

use super::handlers::{HandlerCtx, HandlerOutcome, handler_for};
use super::helpers::random_unit;
use super::resources::complete_treaty_if_capped;
use super::stages::complete_event;
use super::variables::substitute;

/// What resolving a choice did beyond mutating state.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceResolution {
    pub sanctions_triggered: bool,
    /// Set when the choice ends the game immediately.
    pub endgame: Option<GameOverReason>,
    /// Whether the event is now resolved. False while a later stage waits.
    pub resolved: bool,
}

fn apply_cost(state: &mut GameState, cost: &ChoiceCost) {
    state.money -= cost.money;
    state.diplomacy_points -= cost.diplomacy;
    state.product_points -= cost.product;
}

pub fn apply_benefit(state: &mut GameState, config: &GameConfig, benefit: &ChoiceBenefit) {
    state.income_bonus += benefit.income_bonus;
    state.capability_per_turn += benefit.ai_level_per_turn;
    if let Some(m) = benefit.resource_multiplier {
        state.resource_multiplier = m;
    }
    if let Some(m) = benefit.diplomacy_multiplier {
        state.diplomacy_multiplier *= m;
    }
    if let Some(m) = benefit.product_multiplier {
        state.product_multiplier *= m;
    }
    if let Some(m) = benefit.interpretability_multiplier {
        state.interpretability_multiplier *= m;
    }
    state.money += benefit.money;
    state.diplomacy_points += benefit.diplomacy;
    state.product_points += benefit.product;
    state.safety_points += benefit.safety;

    if let Some(key) = &benefit.activate_technology {
        state.technologies.activate_key(key);
    }
    if let Some(key) = &benefit.activate_status {
        state.status_effects.activate_key(key);
    }
    if benefit.un_recognition {
        state.status_effects.activate(StatusEffectKind::UnRecognition);
    }
    for unlock in &benefit.unlock {
        match unlock {
            Unlock::Projects => state.projects_unlocked = true,
            Unlock::Alignment => state.alignment_unlocked = true,
            Unlock::Treaty => {
                state.treaty_unlocked = true;
                complete_treaty_if_capped(state, config);
            }
        }
    }
}

fn apply_penalty(state: &mut GameState, penalty: &ChoicePenalty) {
    state.raw_risk += penalty.raw_risk.max(0.0);
    if penalty.sanctions {
        state.status_effects.activate(StatusEffectKind::Sanctions);
    }
}

/// Roll probabilistic downsides. Returns whether sanctions were imposed.
fn roll_risk(state: &mut GameState, risk: &ChoiceRisk, rng: &mut dyn RngCore) -> bool {
    let Some(p) = risk.sanctions else {
        return false;
    };
    let triggered = random_unit(rng) < p;
    if triggered {
        state.status_effects.activate(StatusEffectKind::Sanctions);
        tracing::debug!(probability = p, "choice triggered sanctions");
    }
    triggered
}

/// Validate and resolve choice `index` on the current event.
///
/// Validation happens before any mutation, so a rejected choice leaves the
/// state untouched.
pub fn choose_event_option(
    state: &mut GameState,
    config: &GameConfig,
    rng: &mut dyn RngCore,
    index: usize,
) -> Result<ChoiceResolution, CommandError> {
    let event = state
        .current_event
        .as_ref()
        .filter(|e| e.needs_decision())
        .ok_or(CommandError::NoPendingChoice)?;
    let choice: EventChoice = event
        .choices
        .get(index)
        .cloned()
        .ok_or(CommandError::ChoiceOutOfRange {
            index,
            available: event.choices.len(),
        })?;
    if let Some(cost) = &choice.cost {
        if !state.can_afford(cost.money, cost.diplomacy, cost.product) {
            return Err(CommandError::Unaffordable {
                what: choice.text.clone(),
            });
        }
    }
    let event_type = event.event_type.clone();
    let handler = event.handler;
    let variables = event.variables.clone();

    *state
        .choices_taken
        .entry(event_type.clone())
        .or_default()
        .entry(choice.action.clone())
        .or_default() += 1;

    let mut sanctions_triggered = false;
    if choice.action.is_accepting() {
        state.mark_accepted(event_type.clone());
        if let Some(cost) = &choice.cost {
            apply_cost(state, cost);
        }
        if let Some(benefit) = &choice.benefit {
            apply_benefit(state, config, benefit);
        }
        if let Some(penalty) = &choice.penalty {
            apply_penalty(state, penalty);
        }
        if let Some(risk) = &choice.risk {
            sanctions_triggered = roll_risk(state, risk, rng);
        }
    }

    let outcome = match handler {
        Some(kind) => {
            let mut ctx = HandlerCtx { state: &mut *state, config, rng };
            handler_for(kind)(&mut ctx, &choice, sanctions_triggered)
        }
        None => HandlerOutcome::Resolve(None),
    };

    let mut resolution = ChoiceResolution {
        sanctions_triggered,
        endgame: None,
        resolved: true,
    };
    match outcome {
        HandlerOutcome::Resolve(text) => {
            let text = text
                .or_else(|| choice.result_text.clone())
                .map(|t| substitute(&t, &variables))
                .unwrap_or_default();
            complete_event(state, &event_type, text);
        }
        HandlerOutcome::Continue => resolution.resolved = false,
        HandlerOutcome::Endgame(reason, text) => {
            complete_event(state, &event_type, text);
            resolution.endgame = Some(reason);
        }
    }

    state.clamp_money();
    state.diplomacy_points = state.diplomacy_points.max(0.0);
    state.product_points = state.product_points.max(0.0);
    state.clamp_capabilities();
    state.sort_competitors();

    tracing::debug!(
        event_type = %event_type,
        action = %choice.action,
        resolved = resolution.resolved,
        "event choice applied"
    );
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::espionage_investigation_template;
    use crate::model::{ActiveEvent, ChoiceAction, EventStage, EventType, Technology};
    use crate::scenario::Scenario;
    use crate::sim::selection::instantiate;
    use crate::testutil::{FixedRng, builtin_catalog, seeded_rng};

    fn present(state: &mut GameState, ty: EventType) {
        let catalog = builtin_catalog();
        let template = catalog.template(&ty).cloned().unwrap();
        let event = instantiate(state, &template, &mut seeded_rng(1));
        state.current_event = Some(event);
    }

    fn index_of(state: &GameState, action: ChoiceAction) -> usize {
        state
            .current_event
            .as_ref()
            .unwrap()
            .choices
            .iter()
            .position(|c| c.action == action)
            .unwrap()
    }

    #[test]
    fn accept_applies_cost_and_benefit() {
        let mut state = Scenario::new().capability(20.0).money(20.0).diplomacy(5.0).build();
        present(&mut state, EventType::UnRecognition);
        let idx = index_of(&state, ChoiceAction::Accept);
        let res = choose_event_option(&mut state, &GameConfig::default(), &mut seeded_rng(1), idx).unwrap();
        assert!(res.resolved);
        assert_eq!(state.diplomacy_points, 0.0);
        assert_eq!(state.resource_multiplier, 1.5);
        assert!(state.has_status(StatusEffectKind::UnRecognition));
        assert!(state.events_accepted.contains(&EventType::UnRecognition));
        let event = state.current_event.as_ref().unwrap();
        assert!(event.result_text.as_ref().unwrap().contains("UN recognition"));
        assert!(!event.needs_decision());
    }

    #[test]
    fn decline_applies_nothing_but_is_counted() {
        let mut state = Scenario::new().capability(20.0).money(20.0).diplomacy(5.0).build();
        present(&mut state, EventType::UnRecognition);
        let before = state.clone();
        let idx = index_of(&state, ChoiceAction::Decline);
        choose_event_option(&mut state, &GameConfig::default(), &mut seeded_rng(1), idx).unwrap();
        assert_eq!(state.diplomacy_points, before.diplomacy_points);
        assert!(state.events_accepted.is_empty());
        assert_eq!(
            state.choices_taken[&EventType::UnRecognition][&ChoiceAction::Decline],
            1
        );
    }

    #[test]
    fn unaffordable_choice_rejected_without_change() {
        let mut state = Scenario::new().capability(20.0).money(20.0).diplomacy(1.0).build();
        present(&mut state, EventType::UnRecognition);
        let idx = index_of(&state, ChoiceAction::Accept);
        let err = choose_event_option(&mut state, &GameConfig::default(), &mut seeded_rng(1), idx).unwrap_err();
        assert!(matches!(err, CommandError::Unaffordable { .. }));
        assert!(state.choices_taken.is_empty());
        assert!(state.current_event.as_ref().unwrap().needs_decision());
    }

    #[test]
    fn out_of_range_rejected() {
        let mut state = Scenario::new().build();
        present(&mut state, EventType::ProductBreakthrough);
        let err = choose_event_option(&mut state, &GameConfig::default(), &mut seeded_rng(1), 9).unwrap_err();
        assert_eq!(err, CommandError::ChoiceOutOfRange { index: 9, available: 2 });
    }

    #[test]
    fn no_pending_choice_after_resolution() {
        let mut state = Scenario::new().build();
        present(&mut state, EventType::ProductBreakthrough);
        choose_event_option(&mut state, &GameConfig::default(), &mut seeded_rng(1), 1).unwrap();
        let err = choose_event_option(&mut state, &GameConfig::default(), &mut seeded_rng(1), 0).unwrap_err();
        assert_eq!(err, CommandError::NoPendingChoice);

        state.current_event = Some(ActiveEvent::new(EventType::QuietMonth, "Nothing happens."));
        let err = choose_event_option(&mut state, &GameConfig::default(), &mut seeded_rng(1), 0).unwrap_err();
        assert_eq!(err, CommandError::NoPendingChoice);
    }

    #[test]
    fn risk_roll_imposes_sanctions() {
        let mut state = Scenario::new().capability(20.0).money(20.0).build();
        present(&mut state, EventType::OverseasDatacenter);
        let idx = index_of(&state, ChoiceAction::AcceptSanctions);
        let res = choose_event_option(&mut state, &GameConfig::default(), &mut FixedRng::new(0.1), idx).unwrap();
        assert!(res.sanctions_triggered);
        assert!(state.has_sanctions());
        assert_eq!(state.capability_per_turn, 1.0);
        assert_eq!(state.datacenter_count, 1);
        assert_eq!(state.money, 15.0);
    }

    #[test]
    fn penalty_and_technology_benefit() {
        let mut state = Scenario::new().capability(120.0).money(20.0).raw_risk(10.0).build();
        present(&mut state, EventType::SuperpersuasionResearch);
        let idx = index_of(&state, ChoiceAction::Accept);
        choose_event_option(&mut state, &GameConfig::default(), &mut seeded_rng(1), idx).unwrap();
        assert_eq!(state.raw_risk, 25.0);
        assert!(state.technologies.is_active(Technology::Superpersuasion));
    }

    #[test]
    fn dsa_accept_requests_endgame() {
        let mut state = Scenario::new().capability(250.0).build();
        state.mark_accepted(EventType::MilitaryContract);
        present(&mut state, EventType::DecisiveStrategicAdvantage);
        let idx = index_of(&state, ChoiceAction::Accept);
        let res = choose_event_option(&mut state, &GameConfig::default(), &mut seeded_rng(1), idx).unwrap();
        assert_eq!(res.endgame, Some(GameOverReason::DsaSingularity));
    }

    #[test]
    fn unlock_benefit_sets_flag() {
        let mut state = Scenario::new().safety_points(100.0).money(50.0).build();
        present(&mut state, EventType::SafetyResearchLimitations);
        let idx = index_of(&state, ChoiceAction::Accept);
        choose_event_option(&mut state, &GameConfig::default(), &mut seeded_rng(1), idx).unwrap();
        assert!(state.projects_unlocked);
    }

    #[test]
    fn staged_event_closes_once_on_final_choice() {
        let mut state = Scenario::new().diplomacy(10.0).build();
        let config = GameConfig::default();
        let mut rng = FixedRng::new(0.9);
        let event = instantiate(&mut state, &espionage_investigation_template(), &mut rng);
        state.current_event = Some(event);

        let first = choose_event_option(&mut state, &config, &mut rng, 0).unwrap();
        assert!(!first.resolved);
        let staged = state.current_event.as_ref().unwrap();
        assert_eq!(staged.stage, Some(EventStage::Response));
        assert!(staged.result_text.is_none());

        let second = choose_event_option(&mut state, &config, &mut rng, 0).unwrap();
        assert!(second.resolved);
        assert!(!state.stages.contains_key(&EventType::EspionageInvestigation));
        let text = state.current_event.as_ref().and_then(|e| e.result_text.clone()).unwrap();
        assert!(text.contains("cooperation"), "{text}");
        assert!(!state.current_event.as_ref().unwrap().needs_decision());
    }
}
