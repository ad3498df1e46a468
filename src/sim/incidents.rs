//! Safety incidents, warning shots and the AI escape.

use rand::RngCore;
use rand::seq::IndexedRandom;

use crate::config::GameConfig;
use crate::content::{EventCatalog, ai_escape_template};
use crate::model::{
    ActiveEvent, EventPayload, EventType, GameState, StatusEffect, StatusEffectKind, Technology,
};

use super::selection::instantiate;

fn pick_text<'a>(texts: &'a [String], rng: &mut dyn RngCore) -> Option<&'a str> {
    texts.choose(rng).map(String::as_str)
}

/// Fine for the `n`th incident: `floor(n^exponent)` billion.
pub fn incident_fine(n: u32, config: &GameConfig) -> f64 {
    f64::from(n).powf(config.incident_fine_exponent).floor()
}

/// A regular safety incident. The fine is charged at turn end.
pub fn safety_incident(
    state: &mut GameState,
    catalog: &EventCatalog,
    config: &GameConfig,
    rng: &mut dyn RngCore,
) -> ActiveEvent {
    state.safety_incident_count += 1;
    let fine = incident_fine(state.safety_incident_count, config);
    let flavor = pick_text(&catalog.safety_incident_texts, rng).unwrap_or("A safety incident occurs.");
    let company = &state.identity.company_name;
    let text = format!(
        "{} The incident draws regulatory scrutiny and {company} is fined ${fine}B. \
         Your legal team recommends increased safety measures.",
        flavor.replace("$companyName", company)
    );
    tracing::debug!(count = state.safety_incident_count, fine, "safety incident");
    ActiveEvent::new(EventType::SafetyIncident, text).with_payload(EventPayload::SafetyIncident { fine })
}

/// A severe incident: a warning shot the first time, an AI escape after.
pub fn severe_incident(
    state: &mut GameState,
    catalog: &EventCatalog,
    config: &GameConfig,
    rng: &mut dyn RngCore,
) -> ActiveEvent {
    state.severe_incident_count += 1;
    if state.severe_incident_count == 1 {
        warning_shot(state, catalog, config, rng)
    } else {
        ai_escape(state, config, rng)
    }
}

fn warning_shot(
    state: &mut GameState,
    catalog: &EventCatalog,
    config: &GameConfig,
    rng: &mut dyn RngCore,
) -> ActiveEvent {
    state.safety_incident_count += 1;
    let fine = incident_fine(state.safety_incident_count, config);
    let apply_sanctions = !state.technologies.is_active(Technology::Superpersuasion);
    let texts = if catalog.severe_incident_texts.is_empty() {
        &catalog.safety_incident_texts
    } else {
        &catalog.severe_incident_texts
    };
    let flavor = pick_text(texts, rng).unwrap_or("A severe safety incident occurs.");
    let company = &state.identity.company_name;
    let sanctions_text = if apply_sanctions {
        " International authorities respond with comprehensive sanctions against your company."
    } else {
        " Your superpersuasion technology helps mitigate the diplomatic fallout, avoiding sanctions."
    };
    let text = format!(
        "{} This severe incident triggers an international crisis of confidence in AI safety. \
         {company} faces a massive ${fine}B fine and intense regulatory scrutiny.{sanctions_text} \
         Capability research and rival labs both pause while the world takes stock.",
        flavor.replace("$companyName", company)
    );
    tracing::info!(fine, apply_sanctions, "severe incident warning shot");
    ActiveEvent::new(EventType::SevereIncident, text)
        .with_payload(EventPayload::WarningShot { fine, apply_sanctions })
}

fn ai_escape(state: &mut GameState, config: &GameConfig, rng: &mut dyn RngCore) -> ActiveEvent {
    let mitigation_offered =
        state.technologies.is_active(Technology::Nukes) && !state.nuclear_mitigation_used;
    let mut template = ai_escape_template(config.nuclear_mitigation_cost);
    if !mitigation_offered {
        template.choices.retain(|c| c.cost.is_none());
    }
    tracing::info!(mitigation_offered, "AI escape event");
    let mut event = instantiate(state, &template, rng);
    event.payload = EventPayload::AiEscape { mitigation_offered };
    event
}

/// Deterministic turn-end effects of the resolved event: fines, sanctions
/// and the delayed "shaken" pause.
pub fn apply_event_effects(state: &mut GameState) {
    let Some(event) = state.current_event.as_ref() else {
        return;
    };
    match event.payload {
        EventPayload::SafetyIncident { fine } => {
            state.money -= fine;
            state.clamp_money();
        }
        EventPayload::WarningShot {
            fine,
            apply_sanctions,
        } => {
            state.money -= fine;
            state.clamp_money();
            if apply_sanctions {
                state.status_effects.activate(StatusEffectKind::Sanctions);
            }
            state
                .status_effects
                .insert(StatusEffectKind::Shaken, StatusEffect::delayed(1, 2));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChoiceAction;
    use crate::scenario::Scenario;
    use crate::testutil::seeded_rng;

    #[test]
    fn fines_escalate() {
        let config = GameConfig::default();
        assert_eq!(incident_fine(1, &config), 1.0);
        assert_eq!(incident_fine(2, &config), 2.0);
        assert_eq!(incident_fine(4, &config), 8.0);
        assert_eq!(incident_fine(5, &config), 11.0);
    }

    #[test]
    fn safety_incident_counts_and_fines() {
        let mut state = Scenario::new().money(10.0).build();
        let catalog = EventCatalog::fallback();
        let mut rng = seeded_rng(1);
        let event = safety_incident(&mut state, &catalog, &GameConfig::default(), &mut rng);
        assert_eq!(state.safety_incident_count, 1);
        assert_eq!(event.payload, EventPayload::SafetyIncident { fine: 1.0 });
        assert!(event.choices.is_empty());
        assert!(event.text.contains("fined $1B"));

        state.current_event = Some(event);
        apply_event_effects(&mut state);
        assert_eq!(state.money, 9.0);
    }

    #[test]
    fn fine_never_drives_money_negative() {
        let mut state = Scenario::new().money(0.5).build();
        state.current_event = Some(
            ActiveEvent::new(EventType::SafetyIncident, "x")
                .with_payload(EventPayload::SafetyIncident { fine: 8.0 }),
        );
        apply_event_effects(&mut state);
        assert_eq!(state.money, 0.0);
    }

    #[test]
    fn first_severe_incident_is_warning_shot() {
        let mut state = Scenario::new().build();
        let catalog = EventCatalog::fallback();
        let mut rng = seeded_rng(2);
        let event = severe_incident(&mut state, &catalog, &GameConfig::default(), &mut rng);
        assert_eq!(event.event_type, EventType::SevereIncident);
        assert!(matches!(
            event.payload,
            EventPayload::WarningShot { apply_sanctions: true, .. }
        ));

        state.current_event = Some(event);
        apply_event_effects(&mut state);
        assert!(state.has_sanctions());
        let shaken = state.status_effects.get(StatusEffectKind::Shaken).unwrap();
        assert!(!shaken.active);
    }

    #[test]
    fn superpersuasion_avoids_warning_shot_sanctions() {
        let mut state = Scenario::new().technology(Technology::Superpersuasion).build();
        let mut rng = seeded_rng(2);
        let event = severe_incident(&mut state, &EventCatalog::fallback(), &GameConfig::default(), &mut rng);
        assert!(matches!(
            event.payload,
            EventPayload::WarningShot { apply_sanctions: false, .. }
        ));
    }

    #[test]
    fn second_severe_incident_is_escape_without_mitigation() {
        let mut state = Scenario::new().with(|s| s.severe_incident_count = 1).build();
        let mut rng = seeded_rng(4);
        let event = severe_incident(&mut state, &EventCatalog::fallback(), &GameConfig::default(), &mut rng);
        assert_eq!(event.event_type, EventType::AiEscape);
        assert_eq!(event.choices.len(), 1);
        assert_eq!(event.choices[0].action, ChoiceAction::from("await-fate"));
    }

    #[test]
    fn nukes_offer_one_mitigation() {
        let mut state = Scenario::new()
            .technology(Technology::Nukes)
            .with(|s| s.severe_incident_count = 1)
            .build();
        let mut rng = seeded_rng(4);
        let event = severe_incident(&mut state, &EventCatalog::fallback(), &GameConfig::default(), &mut rng);
        assert_eq!(event.choices.len(), 2);
        assert_eq!(event.payload, EventPayload::AiEscape { mitigation_offered: true });

        state.nuclear_mitigation_used = true;
        let again = severe_incident(&mut state, &EventCatalog::fallback(), &GameConfig::default(), &mut rng);
        assert_eq!(again.choices.len(), 1);
    }
}
