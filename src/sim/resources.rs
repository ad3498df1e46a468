//! Labor budget, sector gains and the risk model.
//!
//! Everything here except [`apply_allocation`] is a pure function of a state
//! snapshot.

use crate::config::GameConfig;
use crate::error::CommandError;
use crate::model::{Allocation, GameState, Project, Sector, StatusEffectKind};

/// Optional replacements for the three damping inputs, used for previews.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskOverrides {
    pub safety_points: Option<f64>,
    pub alignment_score: Option<f64>,
    pub interpretability_progress: Option<f64>,
}

/// Divisors applied to raw risk. Each is at least 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskFactors {
    pub safety: f64,
    pub alignment: f64,
    pub interpretability: f64,
}

impl RiskFactors {
    pub fn product(&self) -> f64 {
        self.safety * self.alignment * self.interpretability
    }
}

pub fn risk_factors(state: &GameState, overrides: RiskOverrides) -> RiskFactors {
    let safety = overrides.safety_points.unwrap_or(state.safety_points).max(0.0);
    let alignment = overrides.alignment_score.unwrap_or(state.alignment_score).max(0.0);
    let interp = overrides
        .interpretability_progress
        .unwrap_or(state.interpretability_progress)
        .max(0.0);
    RiskFactors {
        safety: 1.0 + safety.powf(0.6) / 5.0,
        alignment: 1.0 + alignment / 100.0,
        interpretability: 1.0 + interp / 100.0,
    }
}

/// Raw risk damped by safety, alignment and interpretability, in `[0, 100]`.
pub fn adjusted_risk_percent(state: &GameState) -> f64 {
    adjusted_risk_with(state, RiskOverrides::default())
}

pub fn adjusted_risk_with(state: &GameState, overrides: RiskOverrides) -> f64 {
    let factors = risk_factors(state, overrides);
    (state.raw_risk.max(0.0) / factors.product()).clamp(0.0, 100.0)
}

/// The frozen endgame value once the game is over, the live value before.
pub fn effective_risk_percent(state: &GameState) -> f64 {
    state
        .endgame
        .adjusted_risk
        .unwrap_or_else(|| adjusted_risk_percent(state))
}

/// Labor hours available this turn.
pub fn labor_budget(state: &GameState, config: &GameConfig) -> u64 {
    let mut budget = state.capability;
    if state.has_sanctions() {
        budget /= 2.0;
    }
    budget *= 1.0 + config.datacenter_boost * f64::from(state.datacenter_count);
    budget *= state.resource_multiplier;
    budget.max(0.0).floor() as u64
}

/// Σ over competitors of `(competitor / player)²`, each term optionally capped at 1.
fn competitive_penalty(state: &GameState, cap_terms: bool) -> f64 {
    state
        .competitors
        .iter()
        .map(|c| {
            let term = (c.capability / state.capability).powi(2);
            if cap_terms { term.min(1.0) } else { term }
        })
        .sum()
}

/// Player's market share as a fraction.
pub fn market_share(state: &GameState) -> f64 {
    1.0 / (1.0 + competitive_penalty(state, false))
}

/// Each actor's x²-proportional share of the total, as fractions. The player
/// comes first.
pub fn territory_shares(player: f64, competitors: &[f64]) -> Vec<f64> {
    let squares: Vec<f64> = std::iter::once(player)
        .chain(competitors.iter().copied())
        .map(|x| x * x)
        .collect();
    let total: f64 = squares.iter().sum();
    if total <= 0.0 {
        return vec![0.0; squares.len()];
    }
    squares.into_iter().map(|sq| sq / total).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SectorGain {
    pub gain: f64,
    pub money_cost: f64,
}

/// Preview of what every allocation target would yield this turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainTable {
    pub budget: u64,
    pub capability: SectorGain,
    pub safety: SectorGain,
    /// Percentage points of adjusted risk the safety sector would remove.
    pub safety_risk_reduction: f64,
    pub diplomacy: SectorGain,
    pub product: SectorGain,
    pub revenue: SectorGain,
    pub alignment: SectorGain,
    pub interpretability: SectorGain,
    pub treaty: SectorGain,
}

impl GainTable {
    pub fn get(&self, allocation: Allocation) -> SectorGain {
        match allocation {
            Allocation::Sector(Sector::Capability) => self.capability,
            Allocation::Sector(Sector::Safety) => self.safety,
            Allocation::Sector(Sector::Diplomacy) => self.diplomacy,
            Allocation::Sector(Sector::Product) => self.product,
            Allocation::Sector(Sector::Revenue) => self.revenue,
            Allocation::Project(Project::Alignment) => self.alignment,
            Allocation::Project(Project::Interpretability) => self.interpretability,
            Allocation::Project(Project::InternationalTreaty) => self.treaty,
        }
    }
}

pub fn sector_gains(state: &GameState, config: &GameConfig, budget: u64) -> GainTable {
    let b = budget as f64;
    let sqrt_cap = state.capability.max(0.0).sqrt();

    let safety_gain = b / config.safety_divisor;
    let current_risk = adjusted_risk_percent(state);
    let projected_risk = adjusted_risk_with(
        state,
        RiskOverrides {
            safety_points: Some(state.safety_points + safety_gain),
            ..Default::default()
        },
    );

    let interp_gain = (b / config.interpretability_divisor * state.interpretability_multiplier)
        .min((100.0 - state.interpretability_progress).max(0.0));
    let alignment_gain = (b / config.alignment_divisor).min((100.0 - state.alignment_score).max(0.0));
    let treaty_gain = b.min((config.treaty_cap - state.treaty_progress).max(0.0));

    GainTable {
        budget,
        capability: SectorGain {
            gain: b / config.capability_divisor,
            money_cost: sqrt_cap,
        },
        safety: SectorGain {
            gain: safety_gain,
            money_cost: sqrt_cap / 2.0,
        },
        safety_risk_reduction: current_risk - projected_risk,
        diplomacy: SectorGain {
            gain: b / config.diplomacy_divisor * state.diplomacy_multiplier,
            money_cost: 0.0,
        },
        product: SectorGain {
            gain: b / config.product_divisor * state.product_multiplier,
            money_cost: 0.0,
        },
        revenue: SectorGain {
            gain: b / (1.0 + competitive_penalty(state, true)),
            money_cost: 0.0,
        },
        alignment: SectorGain {
            gain: alignment_gain,
            money_cost: 0.0,
        },
        interpretability: SectorGain {
            gain: interp_gain,
            money_cost: 0.0,
        },
        treaty: SectorGain {
            gain: treaty_gain,
            money_cost: 0.0,
        },
    }
}

/// Allocation targets currently on offer, ignoring per-turn restrictions.
pub fn unlocked_allocations(state: &GameState) -> Vec<Allocation> {
    let mut out: Vec<Allocation> = Sector::ALL.iter().copied().map(Allocation::Sector).collect();
    if state.projects_unlocked {
        out.push(Allocation::Project(Project::Interpretability));
    }
    if state.alignment_unlocked {
        out.push(Allocation::Project(Project::Alignment));
    }
    if state.treaty_unlocked {
        out.push(Allocation::Project(Project::InternationalTreaty));
    }
    out
}

/// Allocation targets selectable this turn.
pub fn available_allocations(state: &GameState) -> Vec<Allocation> {
    unlocked_allocations(state)
        .into_iter()
        .filter(|a| check_allocation_allowed(state, *a).is_ok())
        .collect()
}

fn is_unlocked(state: &GameState, project: Project) -> bool {
    match project {
        Project::Interpretability => state.projects_unlocked,
        Project::Alignment => state.alignment_unlocked,
        Project::InternationalTreaty => state.treaty_unlocked,
    }
}

/// Lock, restriction and superpersuasion checks; affordability is separate.
pub fn check_allocation_allowed(state: &GameState, allocation: Allocation) -> Result<(), CommandError> {
    if let Allocation::Project(project) = allocation {
        if !is_unlocked(state, project) {
            return Err(CommandError::ProjectLocked(project));
        }
    }
    if allocation == Allocation::CAPABILITY && state.has_status(StatusEffectKind::Shaken) {
        return Err(CommandError::AllocationDisabled(allocation));
    }
    if state.disabled_allocation == Some(allocation) {
        return Err(CommandError::AllocationDisabled(allocation));
    }
    Ok(())
}

/// What an applied allocation changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationOutcome {
    pub allocation: Allocation,
    pub budget: u64,
    pub gain: f64,
    pub money_spent: f64,
    pub raw_risk_added: f64,
}

/// Validate then apply one allocation. On error nothing is changed.
pub fn apply_allocation(
    state: &mut GameState,
    config: &GameConfig,
    allocation: Allocation,
) -> Result<AllocationOutcome, CommandError> {
    check_allocation_allowed(state, allocation)?;
    let budget = labor_budget(state, config);
    let gains = sector_gains(state, config, budget);
    let entry = gains.get(allocation);
    if entry.money_cost > state.money {
        return Err(CommandError::Unaffordable {
            what: format!("{allocation} (${:.1}B)", entry.money_cost),
        });
    }

    let mut raw_risk_added = 0.0;
    match allocation {
        Allocation::Sector(Sector::Capability) => {
            let old = state.capability;
            let new = old + entry.gain;
            raw_risk_added = config.capability_risk_coefficient * (new / old).ln();
            state.capability = new;
            state.raw_risk += raw_risk_added;
        }
        Allocation::Sector(Sector::Safety) => state.safety_points += entry.gain,
        Allocation::Sector(Sector::Diplomacy) => state.diplomacy_points += entry.gain,
        Allocation::Sector(Sector::Product) => state.product_points += entry.gain,
        Allocation::Sector(Sector::Revenue) => state.money += entry.gain,
        Allocation::Project(Project::Alignment) => {
            state.alignment_score = (state.alignment_score + entry.gain).min(100.0);
        }
        Allocation::Project(Project::Interpretability) => {
            state.interpretability_progress = (state.interpretability_progress + entry.gain).min(100.0);
            state.interpretability_labor_hours += budget as f64;
        }
        Allocation::Project(Project::InternationalTreaty) => {
            state.treaty_progress = (state.treaty_progress + entry.gain).min(config.treaty_cap);
            complete_treaty_if_capped(state, config);
        }
    }

    state.money -= entry.money_cost;
    state.clamp_money();
    state.clamp_capabilities();

    tracing::debug!(
        allocation = %allocation,
        budget,
        gain = entry.gain,
        cost = entry.money_cost,
        "applied allocation"
    );

    Ok(AllocationOutcome {
        allocation,
        budget,
        gain: entry.gain,
        money_spent: entry.money_cost,
        raw_risk_added,
    })
}

/// Once treaty progress hits the cap the treaty takes permanent effect.
pub fn complete_treaty_if_capped(state: &mut GameState, config: &GameConfig) {
    if state.treaty_progress >= config.treaty_cap && !state.has_status(StatusEffectKind::Treaty) {
        state.status_effects.activate(StatusEffectKind::Treaty);
        tracing::info!("international treaty ratified");
    }
}
