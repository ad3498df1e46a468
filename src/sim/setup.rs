//! Building a fresh game.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use crate::config::GameConfig;
use crate::model::{
    COMPANIES, Company, Competitor, EndgameCache, GameState, Identity, StatusEffects,
    TechnologySet, TurnDate, TurnPhase, company_by_name,
};

pub fn identity_for(company: &Company, equity: f64) -> Identity {
    Identity {
        company_name: company.name.to_string(),
        long_name: company.long_name.to_string(),
        home_country: company.home_country.to_string(),
        country_name: company.country_name.to_string(),
        starting_company: None,
        equity,
    }
}

/// Starting state for `company` racing `rivals`. Rival levels come from the
/// config in descending order, so the first rival leads.
pub fn initial_state(config: &GameConfig, company: &Company, rivals: [&Company; 3]) -> GameState {
    let mut levels = config.initial_competitors.clone();
    levels.sort_by(|a, b| b.total_cmp(a));
    let competitors = rivals
        .iter()
        .zip(levels)
        .map(|(c, level)| Competitor::new(c.name, level))
        .collect();

    let mut state = GameState {
        identity: identity_for(company, config.initial_equity),
        capability: config.initial_capability,
        competitors,
        raw_risk: config.initial_raw_risk,
        safety_points: 0.0,
        alignment_score: 0.0,
        interpretability_progress: 0.0,
        interpretability_labor_hours: 0.0,
        interpretability_multiplier: 1.0,
        treaty_progress: 0.0,
        money: config.initial_money,
        diplomacy_points: 0.0,
        product_points: 0.0,
        diplomacy_multiplier: 1.0,
        product_multiplier: 1.0,
        resource_multiplier: 1.0,
        income_bonus: 0.0,
        capability_per_turn: 0.0,
        datacenter_count: 0,
        powerplant_count: 0,
        datacenter_country: None,
        coo_is_minister: false,
        has_intelligence_agreement: false,
        is_vp_safety_alignment: false,
        technologies: TechnologySet::default(),
        status_effects: StatusEffects::default(),
        projects_unlocked: false,
        alignment_unlocked: false,
        treaty_unlocked: false,
        current_event: None,
        events_seen: BTreeMap::new(),
        events_accepted: BTreeSet::new(),
        event_appearance_counts: BTreeMap::new(),
        choices_taken: BTreeMap::new(),
        has_ever_fallen_behind: false,
        safety_incident_count: 0,
        severe_incident_count: 0,
        nuclear_mitigation_used: false,
        injected_templates: Vec::new(),
        stages: BTreeMap::new(),
        date: TurnDate::first(config.start_year),
        phase: TurnPhase::AwaitingAllocation,
        selected_allocation: None,
        allocation_applied: false,
        disabled_allocation: None,
        game_over_reason: None,
        endgame: EndgameCache::default(),
    };
    state.clamp_capabilities();
    state.sort_competitors();
    state
}

fn pick_company(config: &GameConfig, rng: &mut dyn RngCore) -> &'static Company {
    if let Some(name) = config.company.as_deref() {
        match company_by_name(name) {
            Some(company) => return company,
            None => tracing::warn!(company = name, "unknown company in config, picking at random"),
        }
    }
    COMPANIES.choose(rng).unwrap_or(&COMPANIES[0])
}

/// A new game with the configured (or a random) company and three distinct
/// random rivals.
pub fn new_game_state(config: &GameConfig, rng: &mut dyn RngCore) -> GameState {
    let company = pick_company(config, rng);
    let mut pool: Vec<&Company> = COMPANIES.iter().filter(|c| c.name != company.name).collect();
    let mut rivals = Vec::with_capacity(3);
    while rivals.len() < 3 && !pool.is_empty() {
        let idx = rng.random_range(0..pool.len());
        rivals.push(pool.swap_remove(idx));
    }
    // Six companies always leave five candidates.
    let rivals = [rivals[0], rivals[1], rivals[2]];
    let state = initial_state(config, company, rivals);
    tracing::info!(
        company = %state.identity.company_name,
        rivals = ?state.competitors.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "new game"
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::seeded_rng;

    #[test]
    fn starting_values_follow_config() {
        let config = GameConfig::default();
        let state = new_game_state(&config, &mut seeded_rng(7));
        assert_eq!(state.capability, 10.0);
        assert_eq!(state.raw_risk, 20.0);
        assert_eq!(state.money, 10.0);
        assert_eq!(state.identity.equity, 0.1);
        assert_eq!(state.date.turn(), 1);
        assert_eq!(state.date.year(), 2026);
        let levels: Vec<f64> = state.competitors.iter().map(|c| c.capability).collect();
        assert_eq!(levels, vec![8.0, 6.0, 4.0]);
    }

    #[test]
    fn rivals_are_distinct_and_exclude_player() {
        for seed in 0..30 {
            let state = new_game_state(&GameConfig::default(), &mut seeded_rng(seed));
            let mut names: Vec<&str> = state.competitors.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names.len(), 3);
            assert!(!names.contains(&state.identity.company_name.as_str()));
            names.sort();
            names.dedup();
            assert_eq!(names.len(), 3);
        }
    }

    #[test]
    fn configured_company_is_used() {
        let config = GameConfig {
            company: Some("DeepSeek".into()),
            ..GameConfig::default()
        };
        let state = new_game_state(&config, &mut seeded_rng(1));
        assert_eq!(state.identity.company_name, "DeepSeek");
        assert_eq!(state.identity.home_country, "CN");
    }

    #[test]
    fn unknown_company_falls_back_to_random() {
        let config = GameConfig {
            company: Some("Initech".into()),
            ..GameConfig::default()
        };
        let state = new_game_state(&config, &mut seeded_rng(1));
        assert!(company_by_name(&state.identity.company_name).is_some());
    }
}
