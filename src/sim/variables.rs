//! Per-instance `$variable` dictionaries and substitution.

use std::collections::BTreeMap;

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use crate::model::{EventPayload, EventType, GameState, ai_system_name};

use super::helpers::{random_between, round_to};
use super::resources::market_share;

/// Countries that court an overseas datacenter.
pub const DATACENTER_COUNTRIES: [&str; 3] = ["Brazil", "Indonesia", "Turkey"];

pub type Variables = BTreeMap<String, String>;

/// Format a capability level as "17x".
pub fn level_label(level: f64) -> String {
    format!("{}x", level.round())
}

/// Build the substitution dictionary for one event instance.
///
/// Some types mutate state here: the overseas datacenter fixes the host
/// country and a competitor breakthrough doubles a rival. Call once per
/// instance.
pub fn build_variables(
    state: &mut GameState,
    event_type: &EventType,
    rng: &mut dyn RngCore,
) -> (Variables, EventPayload) {
    let mut vars = Variables::new();
    let company = state.identity.company_name.clone();
    vars.insert("companyName".into(), company.clone());
    vars.insert("playerLevel".into(), level_label(state.capability));
    vars.insert("aiSystemName".into(), ai_system_name(&company, state.capability));
    let mut payload = EventPayload::None;

    match event_type {
        EventType::OverseasDatacenter => {
            let country = DATACENTER_COUNTRIES
                .choose(rng)
                .copied()
                .unwrap_or(DATACENTER_COUNTRIES[0])
                .to_string();
            state.datacenter_country = Some(country.clone());
            let chinese_text = if state.identity.home_country == "CN" {
                " This involves navigating US export controls on Chinese companies."
            } else {
                ""
            };
            vars.insert("country".into(), country.clone());
            vars.insert("chineseCompanyText".into(), chinese_text.into());
            payload = EventPayload::Datacenter { country };
        }
        EventType::SecondDatacenter | EventType::NuclearWeapons | EventType::MissileDefense => {
            if let Some(country) = &state.datacenter_country {
                vars.insert("country".into(), country.clone());
            }
        }
        EventType::CompetitorBreakthrough => {
            if !state.competitors.is_empty() {
                let share_before = market_share(state) * 100.0;
                let idx = rng.random_range(0..state.competitors.len());
                state.competitors[idx].capability *= 2.0;
                let rival = state.competitors[idx].clone();
                let share_after = market_share(state) * 100.0;
                state.sort_competitors();

                let surpassing = if rival.capability > state.capability {
                    format!(", surpassing {company}")
                } else {
                    String::new()
                };
                vars.insert("competitorName".into(), rival.name.clone());
                vars.insert("newCompetitorLevel".into(), level_label(rival.capability));
                vars.insert("surpassingText".into(), surpassing);
                vars.insert("marketShareBefore".into(), round_to(share_before, 1).to_string());
                vars.insert("marketShareAfter".into(), round_to(share_after, 1).to_string());
                payload = EventPayload::Breakthrough {
                    competitor: rival.name,
                };
            }
        }
        EventType::CompetitorAcquisition => {
            let threshold = state.capability * 2.0;
            if let Some(rival) = state
                .competitors
                .iter()
                .filter(|c| c.capability >= threshold)
                .max_by(|a, b| a.capability.total_cmp(&b.capability))
                .cloned()
            {
                let p2 = state.capability.powi(2);
                let fair_value = p2 / (p2 + rival.capability.powi(2));
                let offer = fair_value * random_between(rng, 0.3, 1.0);
                let received = offer * state.identity.equity;
                vars.insert("competitorName".into(), rival.name.clone());
                vars.insert("competitorLevel".into(), level_label(rival.capability));
                vars.insert("equityOffer".into(), format!("{}%", round_to(offer * 100.0, 1)));
                payload = EventPayload::Acquisition {
                    competitor: rival.name,
                    total_equity_offered: offer,
                    player_equity_received: received,
                };
            }
        }
        EventType::FallingBehind => {
            if let Some(leader) = state.leading_competitor() {
                vars.insert("competitorName".into(), leader.name.clone());
                vars.insert("competitorLevel".into(), level_label(leader.capability));
            }
        }
        _ => {}
    }

    (vars, payload)
}

/// Replace each `$name` token with its value in one left-to-right pass.
///
/// Substituted values are never rescanned. Unknown names and a `$` not
/// followed by a letter are left as written.
pub fn substitute(text: &str, vars: &Variables) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let name_len = after
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_alphanumeric() || c == '_') || (i == 0 && !c.is_ascii_alphabetic()))
            .map_or(after.len(), |(i, _)| i);
        let name = &after[..name_len];
        match vars.get(name) {
            Some(value) if !name.is_empty() => out.push_str(value),
            _ => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[name_len..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use crate::testutil::{FixedRng, seeded_rng};

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_known_tokens() {
        let v = vars(&[("companyName", "Anthropic"), ("playerLevel", "12x")]);
        assert_eq!(
            substitute("$companyName reaches $playerLevel.", &v),
            "Anthropic reaches 12x."
        );
    }

    #[test]
    fn adjacent_tokens_and_literal_dollars() {
        let v = vars(&[("a", "1"), ("b", "2")]);
        assert_eq!(substitute("$a$b costs $20B", &v), "12 costs $20B");
        assert_eq!(substitute("trailing $", &v), "trailing $");
    }

    #[test]
    fn unknown_tokens_left_alone() {
        let v = vars(&[("a", "1")]);
        assert_eq!(substitute("$missing and $a", &v), "$missing and 1");
    }

    #[test]
    fn values_not_rescanned() {
        let v = vars(&[("a", "$b"), ("b", "oops")]);
        let once = substitute("$a", &v);
        assert_eq!(once, "$b");
    }

    #[test]
    fn breakthrough_doubles_one_competitor_once() {
        let mut state = Scenario::new().capability(10.0).competitors([8.0, 6.0, 4.0]).build();
        let total_before: f64 = state.competitors.iter().map(|c| c.capability).sum();
        let mut rng = FixedRng::new(0.0);
        let (v, payload) = build_variables(&mut state, &EventType::CompetitorBreakthrough, &mut rng);
        let total_after: f64 = state.competitors.iter().map(|c| c.capability).sum();
        assert_eq!(total_after, total_before + 8.0);
        assert_eq!(state.competitors[0].capability, 16.0);
        assert_eq!(v["newCompetitorLevel"], "16x");
        assert!(v["surpassingText"].starts_with(", surpassing"));
        assert!(matches!(payload, EventPayload::Breakthrough { .. }));
    }

    #[test]
    fn acquisition_offer_within_fair_value() {
        let mut state = Scenario::new().capability(10.0).competitors([30.0, 12.0, 8.0]).build();
        let mut rng = seeded_rng(3);
        let (v, payload) = build_variables(&mut state, &EventType::CompetitorAcquisition, &mut rng);
        let EventPayload::Acquisition {
            total_equity_offered,
            player_equity_received,
            ..
        } = payload
        else {
            panic!("expected acquisition payload");
        };
        let fair = 100.0 / (100.0 + 900.0);
        assert!(total_equity_offered >= fair * 0.3 && total_equity_offered <= fair);
        assert!((player_equity_received - total_equity_offered * 0.1).abs() < 1e-12);
        assert_eq!(v["competitorLevel"], "30x");
    }

    #[test]
    fn datacenter_country_is_remembered() {
        let mut state = Scenario::new().build();
        let mut rng = seeded_rng(9);
        let (v, _) = build_variables(&mut state, &EventType::OverseasDatacenter, &mut rng);
        let country = state.datacenter_country.clone().unwrap();
        assert!(DATACENTER_COUNTRIES.contains(&country.as_str()));
        let (later, _) = build_variables(&mut state, &EventType::SecondDatacenter, &mut rng);
        assert_eq!(later["country"], v["country"]);
    }
}
