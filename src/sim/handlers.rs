//! Custom resolution logic for events that need more than generic effects.
//!
//! Each [`HandlerKind`] maps to one function through [`handler_for`]; the
//! mapping is checked by the compiler rather than looked up by name.

use rand::RngCore;
use rand::seq::IndexedRandom;

use crate::config::GameConfig;
use crate::content::investigation_response_choices;
use crate::model::{
    ChoiceAction, Company, Competitor, EventChoice, EventPayload, EventStage, EventType,
    GameOverReason, GameState, HandlerKind, StageData, StatusEffect, StatusEffectKind, Technology,
    COMPANIES, ai_system_name, company_by_name,
};

use super::helpers::{random_between, random_unit, round_to};
use super::resources::market_share;
use super::stages::{begin_stage, init_stage, result_text, stage_record, stage_text};

/// Everything a handler may touch.
pub struct HandlerCtx<'a> {
    pub state: &'a mut GameState,
    pub config: &'a GameConfig,
    pub rng: &'a mut dyn RngCore,
}

/// What a handler decided.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// Resolve the event. `None` uses the choice's own result text.
    Resolve(Option<String>),
    /// Another stage was presented; the event stays open.
    Continue,
    /// Jump straight to the endgame.
    Endgame(GameOverReason, String),
}

pub type HandlerFn = fn(&mut HandlerCtx, &EventChoice, bool) -> HandlerOutcome;

pub fn handler_for(kind: HandlerKind) -> HandlerFn {
    match kind {
        HandlerKind::OverseasDatacenter => overseas_datacenter,
        HandlerKind::SecondDatacenter => second_datacenter,
        HandlerKind::NuclearWeapons => sanctions_gamble,
        HandlerKind::MissileDefense => sanctions_gamble,
        HandlerKind::CompetitorBreakthrough => competitor_breakthrough,
        HandlerKind::EspionageInvestigation => espionage_investigation,
        HandlerKind::CompetitorAcquisition => competitor_acquisition,
        HandlerKind::Sanctions => sanctions,
        HandlerKind::DecisiveStrategicAdvantage => decisive_strategic_advantage,
        HandlerKind::AiEscape => ai_escape,
        HandlerKind::SuperpersuasionResearch => superpersuasion_research,
    }
}

fn sanctions_outcome_text(state: &GameState, triggered: bool) -> String {
    let key = if triggered { "sanctions_triggered" } else { "sanctions_avoided" };
    result_text(state, key)
}

fn overseas_datacenter(ctx: &mut HandlerCtx, choice: &EventChoice, triggered: bool) -> HandlerOutcome {
    match choice.action {
        ChoiceAction::Accept => {
            ctx.state.datacenter_count += 1;
            HandlerOutcome::Resolve(None)
        }
        ChoiceAction::AcceptSanctions => {
            ctx.state.datacenter_count += 1;
            HandlerOutcome::Resolve(Some(sanctions_outcome_text(ctx.state, triggered)))
        }
        _ => HandlerOutcome::Resolve(None),
    }
}

fn second_datacenter(ctx: &mut HandlerCtx, choice: &EventChoice, _triggered: bool) -> HandlerOutcome {
    if choice.action != ChoiceAction::Accept {
        return HandlerOutcome::Resolve(None);
    }
    ctx.state.datacenter_count += 1;
    ctx.state.powerplant_count += 1;
    ctx.state.coo_is_minister = true;
    let has_text = ctx
        .state
        .current_event
        .as_ref()
        .is_some_and(|e| e.other_text("accepted").is_some());
    if has_text {
        HandlerOutcome::Resolve(Some(result_text(ctx.state, "accepted")))
    } else {
        HandlerOutcome::Resolve(None)
    }
}

/// Nuclear weapons and missile defense: the outcome text follows the
/// sanctions roll.
fn sanctions_gamble(ctx: &mut HandlerCtx, choice: &EventChoice, triggered: bool) -> HandlerOutcome {
    if choice.action == ChoiceAction::Accept {
        HandlerOutcome::Resolve(Some(sanctions_outcome_text(ctx.state, triggered)))
    } else {
        HandlerOutcome::Resolve(None)
    }
}

fn competitor_breakthrough(ctx: &mut HandlerCtx, choice: &EventChoice, _triggered: bool) -> HandlerOutcome {
    if choice.action != ChoiceAction::Accept {
        return HandlerOutcome::Resolve(Some(
            "You decide that corporate espionage is too risky and potentially illegal. Your team \
             focuses on independent research to catch up through legitimate means."
                .to_string(),
        ));
    }

    let state = &mut *ctx.state;
    let rival_name = match state.current_event.as_ref().map(|e| &e.payload) {
        Some(EventPayload::Breakthrough { competitor }) => competitor.clone(),
        _ => state
            .leading_competitor()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "the competitor".to_string()),
    };
    let company = state.identity.company_name.clone();
    let system_before = ai_system_name(&company, state.capability);

    let text = if random_unit(ctx.rng) < 0.25 {
        let rival_level = state
            .competitors
            .iter()
            .find(|c| c.name == rival_name)
            .map_or(state.capability, |c| c.capability);
        let full = rival_level > state.capability;
        let multiplier = if full {
            2.0
        } else {
            2f64.powf(rival_level / state.capability)
        };
        state.capability *= multiplier;
        let system_after = ai_system_name(&company, state.capability);
        let share = round_to(market_share(state) * 100.0, 1);
        let improvement = if full {
            format!(
                "The breakthrough is entirely novel! Your team rapidly implements their techniques, \
                 doubling your AI capabilities and upgrading to {system_after}"
            )
        } else {
            format!(
                "Your team discovers that {company} was already partially using similar techniques. \
                 The stolen insights provide a {}x improvement, upgrading to {system_after}",
                round_to(multiplier, 2)
            )
        };
        tracing::debug!(multiplier, "breakthrough scan succeeded");
        format!(
            "{system_before} successfully infiltrates {rival_name}'s communications and \
             reverse-engineers their breakthrough. {improvement}. Market share recovers to \
             {share}%. However, traces of your intrusion may have been left behind."
        )
    } else {
        format!(
            "{system_before} scans thousands of communications but finds that {rival_name} has \
             been extremely careful with their intellectual property. No significant insights are \
             gained, though traces of your intrusion may have been left behind."
        )
    };

    if random_unit(ctx.rng) < 0.25
        && !state
            .injected_templates
            .iter()
            .any(|t| t.event_type == EventType::EspionageInvestigation)
    {
        tracing::info!("espionage investigation added to the event pool");
        state
            .injected_templates
            .push(crate::content::espionage_investigation_template());
    }

    HandlerOutcome::Resolve(Some(text))
}

const HIGH_EVIDENCE: f64 = 70.0;
const MISDIRECT_SUCCESS: f64 = 0.4;

fn espionage_investigation(ctx: &mut HandlerCtx, choice: &EventChoice, _triggered: bool) -> HandlerOutcome {
    let event_type = EventType::EspionageInvestigation;
    let record = stage_record(ctx.state, &event_type);

    match record.current_stage {
        None | Some(EventStage::Discovery) => {
            let evidence_level = random_unit(ctx.rng) * 100.0;
            let data = StageData::Investigation {
                evidence_level,
                investigator_suspicion: 50.0,
            };
            init_stage(ctx.state, &event_type, EventStage::Discovery, data);
            let high = evidence_level > HIGH_EVIDENCE;
            let key = if high { "high_evidence_stage" } else { "low_evidence_stage" };
            let text = stage_text(ctx.state, key);
            begin_stage(
                ctx.state,
                &event_type,
                EventStage::Response,
                data,
                text,
                investigation_response_choices(high),
            );
            HandlerOutcome::Continue
        }
        Some(EventStage::Response) => {
            let state = &mut *ctx.state;
            let key = match choice.action.as_str() {
                "cooperate" => {
                    state.diplomacy_points -= 2.0;
                    "cooperate_result"
                }
                "obstruct" => {
                    state.status_effects.activate(StatusEffectKind::Sanctions);
                    state.diplomacy_points -= 5.0;
                    "obstruct_result"
                }
                "assist" => {
                    state.diplomacy_points += 1.0;
                    "assist_result"
                }
                "silent" => {
                    state.status_effects.activate(StatusEffectKind::Sanctions);
                    "silent_result"
                }
                "trade" => {
                    state.status_effects.activate(StatusEffectKind::Sanctions);
                    state.has_intelligence_agreement = true;
                    "trade_result"
                }
                "misdirect" => {
                    if random_unit(ctx.rng) < MISDIRECT_SUCCESS {
                        "misdirect_success"
                    } else {
                        state.status_effects.activate(StatusEffectKind::Sanctions);
                        state.diplomacy_points -= 8.0;
                        "misdirect_failure"
                    }
                }
                other => {
                    tracing::warn!(action = other, "unexpected investigation response");
                    "cooperate_result"
                }
            };
            state.diplomacy_points = state.diplomacy_points.max(0.0);
            HandlerOutcome::Resolve(Some(result_text(state, key)))
        }
    }
}

fn equity_mood(percent: f64) -> (&'static str, &'static str, &'static str) {
    if percent < 1.0 {
        (
            "very little",
            " fundamentally",
            "quite resentful about accepting such a low valuation",
        )
    } else if percent < 5.0 {
        ("little", "", "somewhat resentful about the valuation")
    } else {
        ("somewhat less", "", "reasonably satisfied with the valuation")
    }
}

fn competitor_acquisition(ctx: &mut HandlerCtx, choice: &EventChoice, _triggered: bool) -> HandlerOutcome {
    if choice.action != ChoiceAction::Accept {
        return HandlerOutcome::Resolve(None);
    }
    let state = &mut *ctx.state;
    let (rival_name, total_offered, received) = match state.current_event.as_ref().map(|e| &e.payload) {
        Some(EventPayload::Acquisition {
            competitor,
            total_equity_offered,
            player_equity_received,
        }) => (competitor.clone(), *total_equity_offered, *player_equity_received),
        _ => {
            tracing::warn!("acquisition accepted without an offer");
            return HandlerOutcome::Resolve(None);
        }
    };
    let Some(idx) = state.competitors.iter().position(|c| c.name == rival_name) else {
        tracing::warn!(competitor = %rival_name, "acquiring competitor no longer in the race");
        return HandlerOutcome::Resolve(None);
    };

    let starting = state
        .identity
        .starting_company
        .get_or_insert_with(|| state.identity.company_name.clone())
        .clone();
    let new_level = state.competitors[idx].capability;

    state.identity.company_name = rival_name.clone();
    if let Some(company) = company_by_name(&rival_name) {
        state.identity.long_name = company.long_name.to_string();
        state.identity.home_country = company.home_country.to_string();
        state.identity.country_name = company.country_name.to_string();
    }
    state.capability = new_level;
    state.is_vp_safety_alignment = true;
    let equity = if received > 0.0 { received } else { 0.01 };
    state.identity.equity = equity;

    let unused: Vec<&Company> = COMPANIES
        .iter()
        .filter(|c| c.name != state.identity.company_name && !state.competitors.iter().any(|r| r.name == c.name))
        .collect();
    let replacement_level = new_level * random_between(ctx.rng, 0.1, 0.4);
    match unused.choose(&mut *ctx.rng) {
        Some(pick) => state.competitors[idx] = Competitor::new(pick.name, replacement_level),
        None => state.competitors[idx].capability = replacement_level,
    }
    state.sort_competitors();

    let bonus = (new_level / 4.0).floor();
    state.money += (random_unit(ctx.rng) * bonus + bonus).floor();
    state.diplomacy_points += (random_unit(ctx.rng) * bonus + bonus / 2.0).floor();
    state.product_points += (random_unit(ctx.rng) * bonus + bonus / 2.0).floor();
    state.projects_unlocked = true;

    let player_percent = round_to(equity * 100.0, 1);
    let total_percent = round_to(total_offered * 100.0, 1);
    let (interest, shift, mood) = equity_mood(player_percent);
    tracing::info!(company = %rival_name, equity, "merger completed");
    HandlerOutcome::Resolve(Some(format!(
        "The merger is completed successfully. {rival_name} acquires {starting} for \
         {total_percent}% equity, giving you {player_percent}% equity as your share of the deal. \
         You assume the role of VP of Safety and Alignment. With access to {rival_name}'s advanced \
         AI capabilities and resources, you now focus on ensuring AI development benefits \
         humanity. Having {interest} financial interest in the ASI race, your priorities have\
         {shift} shifted toward what would be best for the world. You are {mood}, but the \
         acquisition was ultimately necessary given the competitive reality."
    )))
}

fn sanctions(ctx: &mut HandlerCtx, choice: &EventChoice, _triggered: bool) -> HandlerOutcome {
    if choice.action != ChoiceAction::Accept {
        return HandlerOutcome::Resolve(None);
    }
    ctx.state.status_effects.remove(StatusEffectKind::Sanctions);
    let text = match &choice.cost {
        Some(cost) => format!(
            "After paying ${}B and spending {} diplomacy, the sanctions are lifted.",
            cost.money, cost.diplomacy
        ),
        None => "The sanctions are lifted.".to_string(),
    };
    HandlerOutcome::Resolve(Some(text))
}

fn decisive_strategic_advantage(ctx: &mut HandlerCtx, choice: &EventChoice, _triggered: bool) -> HandlerOutcome {
    if choice.action != ChoiceAction::Accept {
        return HandlerOutcome::Resolve(None);
    }
    let system = ai_system_name(&ctx.state.identity.company_name, ctx.state.capability);
    HandlerOutcome::Endgame(
        GameOverReason::DsaSingularity,
        format!("{system} disables every rival AI program in a single coordinated strike."),
    )
}

fn ai_escape(ctx: &mut HandlerCtx, choice: &EventChoice, _triggered: bool) -> HandlerOutcome {
    match choice.action.as_str() {
        "nuclear-mitigation" => {
            let state = &mut *ctx.state;
            let cost = choice.cost.as_ref().map_or(0.0, |c| c.diplomacy);
            state.diplomacy_points = (state.diplomacy_points - cost).max(0.0);
            state.nuclear_mitigation_used = true;
            if random_unit(ctx.rng) < ctx.config.nuclear_mitigation_success {
                state.capability /= 2.0;
                state
                    .status_effects
                    .insert(StatusEffectKind::Disillusioned, StatusEffect::permanent());
                tracing::info!("nuclear mitigation succeeded");
                let text = result_text(state, "mitigation_success");
                HandlerOutcome::Resolve(Some(text))
            } else {
                HandlerOutcome::Endgame(
                    GameOverReason::FailedNuclearMitigation,
                    "The strikes miss copies hidden in hardened facilities. The escaped system retaliates."
                        .to_string(),
                )
            }
        }
        _ => HandlerOutcome::Endgame(
            GameOverReason::AiEscape,
            "You await fate as the escaped system spreads beyond reach.".to_string(),
        ),
    }
}

fn superpersuasion_research(ctx: &mut HandlerCtx, choice: &EventChoice, _triggered: bool) -> HandlerOutcome {
    if choice.action != ChoiceAction::Accept {
        return HandlerOutcome::Resolve(None);
    }
    ctx.state.technologies.activate(Technology::Superpersuasion);
    ctx.state.technologies.activate(Technology::NormalPersuasion);
    HandlerOutcome::Resolve(Some(result_text(ctx.state, "accepted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{espionage_investigation_template, EventCatalog};
    use crate::model::ActiveEvent;
    use crate::scenario::Scenario;
    use crate::sim::selection::instantiate;
    use crate::testutil::{FixedRng, builtin_catalog, seeded_rng};

    fn present(state: &mut GameState, catalog: &EventCatalog, ty: EventType, rng: &mut dyn RngCore) -> ActiveEvent {
        let template = catalog
            .template(&ty)
            .cloned()
            .unwrap_or_else(|| panic!("missing template {ty}"));
        let event = instantiate(state, &template, rng);
        state.current_event = Some(event.clone());
        event
    }

    fn run(state: &mut GameState, choice: &EventChoice, triggered: bool, rng: &mut dyn RngCore) -> HandlerOutcome {
        let config = GameConfig::default();
        let kind = state.current_event.as_ref().and_then(|e| e.handler).unwrap();
        let mut ctx = HandlerCtx {
            state,
            config: &config,
            rng,
        };
        handler_for(kind)(&mut ctx, choice, triggered)
    }

    #[test]
    fn every_handler_kind_is_mapped() {
        for kind in HandlerKind::ALL {
            let _ = handler_for(*kind);
        }
    }

    #[test]
    fn second_datacenter_makes_coo_minister() {
        let catalog = builtin_catalog();
        let mut state = Scenario::new().with(|s| s.datacenter_country = Some("Brazil".into())).build();
        let mut rng = seeded_rng(1);
        let event = present(&mut state, &catalog, EventType::SecondDatacenter, &mut rng);
        let accept = event.choices[0].clone();
        let outcome = run(&mut state, &accept, false, &mut rng);
        assert_eq!(state.datacenter_count, 1);
        assert_eq!(state.powerplant_count, 1);
        assert!(state.coo_is_minister);
        let HandlerOutcome::Resolve(Some(text)) = outcome else {
            panic!("expected resolution text");
        };
        assert!(text.contains("Brazil"));
    }

    #[test]
    fn overseas_sanctions_route_reports_roll() {
        let catalog = builtin_catalog();
        let mut state = Scenario::new().capability(20.0).build();
        let mut rng = seeded_rng(1);
        let event = present(&mut state, &catalog, EventType::OverseasDatacenter, &mut rng);
        let fast = event
            .choices
            .iter()
            .find(|c| c.action == ChoiceAction::AcceptSanctions)
            .unwrap()
            .clone();
        let outcome = run(&mut state, &fast, true, &mut rng);
        assert_eq!(state.datacenter_count, 1);
        let HandlerOutcome::Resolve(Some(text)) = outcome else {
            panic!("expected resolution text");
        };
        assert!(text.contains("Sanctions are imposed"));
    }

    #[test]
    fn breakthrough_scan_success_doubles_player_when_behind() {
        let catalog = builtin_catalog();
        let mut state = Scenario::new().capability(10.0).competitors([8.0, 6.0, 4.0]).build();
        // Draw 0.0 doubles the top rival to 16 and then succeeds both rolls.
        let mut rng = FixedRng::new(0.0);
        let event = present(&mut state, &catalog, EventType::CompetitorBreakthrough, &mut rng);
        let accept = event.choices[0].clone();
        run(&mut state, &accept, false, &mut rng);
        assert_eq!(state.capability, 20.0);
        assert_eq!(state.injected_templates.len(), 1);
        assert_eq!(
            state.injected_templates[0].event_type,
            EventType::EspionageInvestigation
        );
    }

    #[test]
    fn breakthrough_scan_failure_leaves_player() {
        let catalog = builtin_catalog();
        let mut state = Scenario::new().capability(10.0).build();
        let mut rng = FixedRng::new(0.9);
        let event = present(&mut state, &catalog, EventType::CompetitorBreakthrough, &mut rng);
        let accept = event.choices[0].clone();
        run(&mut state, &accept, false, &mut rng);
        assert_eq!(state.capability, 10.0);
        assert!(state.injected_templates.is_empty());
    }

    #[test]
    fn investigation_runs_two_stages() {
        let mut state = Scenario::new().diplomacy(10.0).build();
        let template = espionage_investigation_template();
        let mut rng = FixedRng::new(0.9);
        let event = instantiate(&mut state, &template, &mut rng);
        state.current_event = Some(event.clone());

        let first = run(&mut state, &event.choices[0], false, &mut rng);
        assert_eq!(first, HandlerOutcome::Continue);
        let staged = state.current_event.clone().unwrap();
        assert_eq!(staged.stage, Some(EventStage::Response));
        assert!(staged.template.is_some());
        let actions: Vec<&str> = staged.choices.iter().map(|c| c.action.as_str()).collect();
        assert_eq!(actions, ["cooperate", "obstruct", "trade"]);

        let trade = staged.choices[2].clone();
        let second = run(&mut state, &trade, false, &mut rng);
        assert!(matches!(second, HandlerOutcome::Resolve(Some(_))));
        assert!(state.has_sanctions());
        assert!(state.has_intelligence_agreement);
        // Closing the event is left to the caller.
        assert!(state.stages.contains_key(&EventType::EspionageInvestigation));
        assert!(state.current_event.as_ref().unwrap().result_text.is_none());
    }

    #[test]
    fn low_evidence_offers_softer_responses() {
        let mut state = Scenario::new().diplomacy(10.0).build();
        let template = espionage_investigation_template();
        let mut rng = FixedRng::new(0.2);
        let event = instantiate(&mut state, &template, &mut rng);
        state.current_event = Some(event.clone());
        run(&mut state, &event.choices[0], false, &mut rng);
        let staged = state.current_event.clone().unwrap();
        let misdirect = staged
            .choices
            .iter()
            .find(|c| c.action.as_str() == "misdirect")
            .unwrap()
            .clone();
        // 0.2 < 0.4: misdirection works.
        run(&mut state, &misdirect, false, &mut rng);
        assert!(!state.has_sanctions());
        assert_eq!(state.diplomacy_points, 10.0);
    }

    #[test]
    fn acquisition_swaps_company_and_replaces_rival() {
        let catalog = builtin_catalog();
        let mut state = Scenario::new()
            .company("Anthropic")
            .capability(10.0)
            .competitor_names(["OpenAI", "DeepMind", "xAI"], [40.0, 12.0, 8.0])
            .build();
        let mut rng = seeded_rng(7);
        let event = present(&mut state, &catalog, EventType::CompetitorAcquisition, &mut rng);
        let accept = event.choices[0].clone();
        run(&mut state, &accept, false, &mut rng);

        assert_eq!(state.identity.company_name, "OpenAI");
        assert_eq!(state.identity.starting_company.as_deref(), Some("Anthropic"));
        assert_eq!(state.capability, 40.0);
        assert!(state.is_vp_safety_alignment);
        assert!(state.projects_unlocked);
        assert!(state.identity.equity > 0.0 && state.identity.equity < 0.1);
        assert_eq!(state.competitors.len(), 3);
        assert!(state.competitors.iter().all(|c| c.name != "OpenAI"));
        let newcomer = state
            .competitors
            .iter()
            .find(|c| c.name != "DeepMind" && c.name != "xAI")
            .unwrap();
        assert!(newcomer.capability >= 4.0 && newcomer.capability <= 16.0);
        assert!(state.money >= 10.0 + 10.0);
    }

    #[test]
    fn sanctions_accept_lifts_status() {
        let mut state = Scenario::new().status(StatusEffectKind::Sanctions).build();
        state.current_event = Some({
            let mut e = ActiveEvent::new(EventType::Sanctions, "x");
            e.handler = Some(HandlerKind::Sanctions);
            e
        });
        let choice = EventChoice::new("Remove sanctions", ChoiceAction::Accept);
        run(&mut state, &choice, false, &mut seeded_rng(1));
        assert!(!state.has_sanctions());
    }

    #[test]
    fn escape_choices_reach_endgame() {
        let mut state = Scenario::new().build();
        state.current_event = Some({
            let mut e = ActiveEvent::new(EventType::AiEscape, "x");
            e.handler = Some(HandlerKind::AiEscape);
            e
        });
        let wait = EventChoice::new("Await fate", ChoiceAction::from("await-fate"));
        assert!(matches!(
            run(&mut state, &wait, false, &mut seeded_rng(1)),
            HandlerOutcome::Endgame(GameOverReason::AiEscape, _)
        ));

        let strike = EventChoice::new("Strike", ChoiceAction::from("nuclear-mitigation"));
        assert!(matches!(
            run(&mut state, &strike, false, &mut FixedRng::new(0.9)),
            HandlerOutcome::Endgame(GameOverReason::FailedNuclearMitigation, _)
        ));
    }

    #[test]
    fn successful_mitigation_halves_capability() {
        let mut state = Scenario::new().capability(400.0).diplomacy(30.0).build();
        let template = crate::content::ai_escape_template(20.0);
        let mut event = ActiveEvent::new(EventType::AiEscape, "x");
        event.handler = Some(HandlerKind::AiEscape);
        event.template = Some(template.clone());
        state.current_event = Some(event);
        let strike = template.choices[1].clone();
        let outcome = run(&mut state, &strike, false, &mut FixedRng::new(0.1));
        assert!(matches!(outcome, HandlerOutcome::Resolve(Some(_))));
        assert_eq!(state.capability, 200.0);
        assert_eq!(state.diplomacy_points, 10.0);
        assert!(state.nuclear_mitigation_used);
        assert!(state.has_status(StatusEffectKind::Disillusioned));
    }
}
