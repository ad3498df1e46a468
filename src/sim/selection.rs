//! Choosing the next event.
//!
//! Priority order: forced sanctions, then the severe and regular incident
//! draws, then a weighted draw from the eligible template pool.

use rand::RngCore;
use rand::seq::IndexedRandom;

use crate::config::GameConfig;
use crate::content::EventCatalog;
use crate::model::{
    ActiveEvent, ChoiceAction, ChoiceCondition, ChoiceCost, EventChoice, EventTemplate, EventType,
    GameState, StatusEffectKind,
};

use super::helpers::random_unit;
use super::incidents::{safety_incident, severe_incident};
use super::resources::adjusted_risk_percent;
use super::variables::{build_variables, substitute};

/// Money and diplomacy needed to lift sanctions at this capability.
pub fn sanctions_removal_cost(capability: f64) -> ChoiceCost {
    ChoiceCost {
        money: (capability * 0.2).round().max(3.0),
        diplomacy: (capability * 0.15).round().max(3.0),
        product: 0.0,
    }
}

/// `(severe, regular)` incident probabilities for this turn.
pub fn incident_probabilities(state: &GameState) -> (f64, f64) {
    let risk = adjusted_risk_percent(state) / 100.0;
    let severe = risk.powi(3) * state.capability / 1000.0;
    let regular = risk.powi(2);
    (severe, regular)
}

pub fn condition_holds(state: &GameState, condition: &ChoiceCondition) -> bool {
    match condition {
        ChoiceCondition::CooIsMinister => state.coo_is_minister,
        ChoiceCondition::HasUnRecognition => state.has_status(StatusEffectKind::UnRecognition),
        ChoiceCondition::HasSanctions => state.has_sanctions(),
        ChoiceCondition::ProjectsUnlocked => state.projects_unlocked,
        ChoiceCondition::AlignmentUnlocked => state.alignment_unlocked,
        ChoiceCondition::TreatyUnlocked => state.treaty_unlocked,
        ChoiceCondition::HasDatacenter => state.datacenter_count > 0,
        ChoiceCondition::IsVpSafetyAlignment => state.is_vp_safety_alignment,
        ChoiceCondition::HasIntelligenceAgreement => state.has_intelligence_agreement,
        ChoiceCondition::Custom(key) => {
            tracing::warn!("unknown choice condition {key:?}, hiding choice");
            false
        }
    }
}

/// Whether the state can pay for a choice. Choices without a cost are free.
pub fn choice_affordable(state: &GameState, choice: &EventChoice) -> bool {
    choice
        .cost
        .as_ref()
        .is_none_or(|c| state.can_afford(c.money, c.diplomacy, c.product))
}

/// Type-specific gates on top of the generic template filters.
fn passes_type_gate(state: &GameState, config: &GameConfig, event_type: &EventType) -> bool {
    match event_type {
        EventType::SafetyResearchLimitations => {
            state.safety_points >= config.research_limitations_safety_gate
        }
        EventType::AlignmentBreakthrough => {
            state.safety_points >= config.alignment_breakthrough_safety_gate
        }
        EventType::CompetitorAcquisition => {
            state.max_competitor_capability() >= state.capability * config.acquisition_ratio
        }
        EventType::FallingBehind => {
            state.capability < state.max_competitor_capability() && !state.has_ever_fallen_behind
        }
        _ => true,
    }
}

pub fn is_eligible(state: &GameState, config: &GameConfig, template: &EventTemplate) -> bool {
    if !template
        .requires
        .iter()
        .all(|r| state.events_accepted.contains(r))
    {
        return false;
    }
    if !passes_type_gate(state, config, &template.event_type) {
        return false;
    }
    if template.one_time_accept && state.events_accepted.contains(&template.event_type) {
        return false;
    }
    if let Some(max) = template.max_times {
        if state.appearance_count(&template.event_type) >= max {
            return false;
        }
    }
    template
        .ai_level_range
        .is_none_or(|range| range.contains(state.capability))
}

/// Every template currently eligible, default catalog first, then anything
/// injected during play.
pub fn event_pool<'a>(
    state: &'a GameState,
    catalog: &'a EventCatalog,
    config: &GameConfig,
) -> Vec<&'a EventTemplate> {
    catalog
        .default_event_templates
        .iter()
        .chain(state.injected_templates.iter())
        .filter(|t| is_eligible(state, config, t))
        .collect()
}

/// Weighted draw. Falls back to the last entry if rounding leaves the
/// cursor positive.
pub fn weighted_pick(weights: &[f64], rng: &mut dyn RngCore) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().sum();
    let mut cursor = random_unit(rng) * total;
    for (i, w) in weights.iter().enumerate() {
        cursor -= w;
        if cursor <= 0.0 {
            return Some(i);
        }
    }
    Some(weights.len() - 1)
}

/// Turn a template into a presented event: pick a text, compute variables
/// once, substitute, filter choices by condition, annotate affordability.
pub fn instantiate(state: &mut GameState, template: &EventTemplate, rng: &mut dyn RngCore) -> ActiveEvent {
    let raw_text = template.text_versions.choose(rng).cloned().unwrap_or_default();
    let (variables, payload) = build_variables(state, &template.event_type, rng);

    let choices = template
        .choices
        .iter()
        .filter(|c| c.condition.as_ref().is_none_or(|cond| condition_holds(state, cond)))
        .map(|c| {
            let mut choice = c.clone();
            choice.text = substitute(&choice.text, &variables);
            choice.affordable = choice_affordable(state, &choice);
            choice
        })
        .collect();

    let mut event = ActiveEvent::new(template.event_type.clone(), substitute(&raw_text, &variables));
    event.choices = choices;
    event.handler = template.custom_handler;
    event.template = Some(template.clone());
    event.variables = variables;
    event.payload = payload;
    event
}

fn sanctions_event(state: &mut GameState, catalog: &EventCatalog, rng: &mut dyn RngCore) -> ActiveEvent {
    let cost = sanctions_removal_cost(state.capability);
    let mut event = instantiate(state, &catalog.sanctions_event, rng);
    for choice in &mut event.choices {
        if choice.action == ChoiceAction::Accept {
            choice.text = format!(
                "Remove sanctions (-${}B, -{} Diplomacy)",
                cost.money, cost.diplomacy
            );
            choice.cost = Some(cost.clone());
            choice.affordable = state.can_afford(cost.money, cost.diplomacy, 0.0);
        }
    }
    event
}

/// Bookkeeping every generated event receives, whatever path produced it.
pub fn record_event(state: &mut GameState, event_type: &EventType) {
    *state.events_seen.entry(event_type.clone()).or_default() += 1;
    *state.event_appearance_counts.entry(event_type.clone()).or_default() += 1;
    if *event_type == EventType::FallingBehind {
        state.has_ever_fallen_behind = true;
    }
}

/// Pick, instantiate and record the next event.
pub fn select_next_event(
    state: &mut GameState,
    catalog: &EventCatalog,
    config: &GameConfig,
    rng: &mut dyn RngCore,
) -> ActiveEvent {
    let event = if state.has_sanctions() {
        sanctions_event(state, catalog, rng)
    } else {
        let (severe_p, regular_p) = incident_probabilities(state);
        let severe_roll = random_unit(rng);
        let regular_roll = random_unit(rng);
        if severe_roll < severe_p {
            severe_incident(state, catalog, config, rng)
        } else if regular_roll < regular_p {
            safety_incident(state, catalog, config, rng)
        } else {
            pool_event(state, catalog, config, rng)
        }
    };
    record_event(state, &event.event_type);
    tracing::debug!(event_type = %event.event_type, choices = event.choices.len(), "selected event");
    event
}

fn pool_event(
    state: &mut GameState,
    catalog: &EventCatalog,
    config: &GameConfig,
    rng: &mut dyn RngCore,
) -> ActiveEvent {
    let pool = event_pool(state, catalog, config);
    let weights: Vec<f64> = pool.iter().map(|t| t.weight()).collect();
    let chosen = weighted_pick(&weights, rng).map(|i| pool[i].clone());
    match chosen {
        Some(template) => instantiate(state, &template, rng),
        None => {
            tracing::warn!("event pool empty, presenting a quiet month");
            ActiveEvent::new(EventType::QuietMonth, "Nothing significant happens this month.")
        }
    }
}
