use super::context::TurnContext;
use super::helpers::exponential;
use super::system::TurnSystem;
use crate::model::StatusEffectKind;

/// Rival labs grow by an exponential draw whose mean tracks the leader.
pub struct CompetitorGrowthSystem;

impl TurnSystem for CompetitorGrowthSystem {
    fn name(&self) -> &str {
        "competitor_growth"
    }

    fn run(&mut self, ctx: &mut TurnContext) {
        let state = &mut *ctx.state;
        if state.has_status(StatusEffectKind::Shaken) {
            tracing::debug!("competitor growth paused while shaken");
            return;
        }

        let mut mean = state.max_competitor_capability() / ctx.config.competitor_growth_divisor;
        if state.has_status(StatusEffectKind::Treaty) {
            mean /= 2.0;
        }
        for competitor in &mut state.competitors {
            competitor.capability += exponential(ctx.rng, mean);
        }
        state.clamp_capabilities();
        state.sort_competitors();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusEffect;
    use crate::scenario::Scenario;
    use crate::testutil::{FixedRng, run_system};

    #[test]
    fn growth_mean_tracks_leader() {
        // ln(1 / (1 - 0.5)) = ln 2, so each rival gains (25 / 25) * ln 2.
        let mut state = Scenario::new().competitors([25.0, 10.0, 5.0]).build();
        run_system(&mut state, &mut CompetitorGrowthSystem, &mut FixedRng::new(0.5));
        let gain = std::f64::consts::LN_2;
        let levels: Vec<f64> = state.competitors.iter().map(|c| c.capability).collect();
        assert!((levels[0] - (25.0 + gain)).abs() < 1e-9);
        assert!((levels[1] - (10.0 + gain)).abs() < 1e-9);
        assert!((levels[2] - (5.0 + gain)).abs() < 1e-9);
    }

    #[test]
    fn treaty_halves_growth() {
        let mut state = Scenario::new()
            .competitors([25.0, 10.0, 5.0])
            .status(StatusEffectKind::Treaty)
            .build();
        run_system(&mut state, &mut CompetitorGrowthSystem, &mut FixedRng::new(0.5));
        let gain = std::f64::consts::LN_2 / 2.0;
        assert!((state.competitors[0].capability - (25.0 + gain)).abs() < 1e-9);
    }

    #[test]
    fn shaken_freezes_rivals() {
        let mut state = Scenario::new()
            .competitors([25.0, 10.0, 5.0])
            .with(|s| s.status_effects.insert(StatusEffectKind::Shaken, StatusEffect::timed(2)))
            .build();
        run_system(&mut state, &mut CompetitorGrowthSystem, &mut FixedRng::new(0.5));
        assert_eq!(state.competitors[0].capability, 25.0);
    }

    #[test]
    fn stays_sorted_descending() {
        let mut state = Scenario::new().competitors([30.0, 29.0, 28.0]).build();
        for seed in 0..20 {
            run_system(&mut state, &mut CompetitorGrowthSystem, &mut crate::testutil::seeded_rng(seed));
            let levels: Vec<f64> = state.competitors.iter().map(|c| c.capability).collect();
            assert!(levels.windows(2).all(|w| w[0] >= w[1]));
        }
    }
}
