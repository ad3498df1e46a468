use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::allocation::Allocation;
use super::calendar::TurnDate;
use super::company::Competitor;
use super::event::{ActiveEvent, ChoiceAction, EventTemplate, EventType, StageRecord};
use super::outcome::EndgameResult;
use super::status::{StatusEffectKind, StatusEffects};
use super::technology::TechnologySet;

/// Lowest capability any actor may hold; keeps ratio formulas finite.
pub const CAPABILITY_FLOOR: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum GameOverReason {
    /// Adjusted risk reached the terminal threshold.
    TerminalRisk,
    /// Someone crossed the superintelligence threshold.
    Singularity,
    /// Accepted the decisive strategic advantage.
    DsaSingularity,
    /// Chose to await fate after the AI escape.
    AiEscape,
    FailedNuclearMitigation,
}

string_enum!(GameOverReason {
    TerminalRisk => "doom-100",
    Singularity => "ai-singularity",
    DsaSingularity => "dsa-singularity",
    AiEscape => "ai-escape",
    FailedNuclearMitigation => "failed-nuclear-mitigation",
});

/// Where the turn loop currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// The event is resolved and no allocation has been chosen.
    AwaitingAllocation,
    /// This turn's allocation has been applied.
    AllocationApplied,
    /// Inside `advance_turn`.
    TurnAdvancing,
    /// The current event still needs a choice.
    EventPending,
    GameOver(GameOverReason),
}

/// Player company identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub company_name: String,
    pub long_name: String,
    pub home_country: String,
    pub country_name: String,
    /// Company the game started with, set on the first merger.
    pub starting_company: Option<String>,
    pub equity: f64,
}

/// Memoized end-of-game values.
#[derive(Debug, Clone, Default)]
pub struct EndgameCache {
    /// Adjusted risk frozen at endgame entry.
    pub adjusted_risk: Option<f64>,
    /// Highest phase requested so far (0 = none).
    pub phase: u8,
    pub result: OnceCell<EndgameResult>,
}

/// The single mutable aggregate every command reads and writes.
#[derive(Debug, Clone)]
pub struct GameState {
    pub identity: Identity,

    pub capability: f64,
    /// Always three, sorted by capability descending.
    pub competitors: Vec<Competitor>,

    pub raw_risk: f64,
    pub safety_points: f64,
    pub alignment_score: f64,
    pub interpretability_progress: f64,
    pub interpretability_labor_hours: f64,
    pub interpretability_multiplier: f64,
    pub treaty_progress: f64,

    pub money: f64,
    pub diplomacy_points: f64,
    pub product_points: f64,
    pub diplomacy_multiplier: f64,
    pub product_multiplier: f64,
    pub resource_multiplier: f64,
    pub income_bonus: f64,
    pub capability_per_turn: f64,

    pub datacenter_count: u32,
    pub powerplant_count: u32,
    pub datacenter_country: Option<String>,
    pub coo_is_minister: bool,
    pub has_intelligence_agreement: bool,
    pub is_vp_safety_alignment: bool,

    pub technologies: TechnologySet,
    pub status_effects: StatusEffects,

    pub projects_unlocked: bool,
    pub alignment_unlocked: bool,
    pub treaty_unlocked: bool,

    pub current_event: Option<ActiveEvent>,
    pub events_seen: BTreeMap<EventType, u32>,
    pub events_accepted: BTreeSet<EventType>,
    pub event_appearance_counts: BTreeMap<EventType, u32>,
    pub choices_taken: BTreeMap<EventType, BTreeMap<ChoiceAction, u32>>,
    pub has_ever_fallen_behind: bool,
    pub safety_incident_count: u32,
    pub severe_incident_count: u32,
    pub nuclear_mitigation_used: bool,
    /// Templates added to the pool during play.
    pub injected_templates: Vec<EventTemplate>,
    pub stages: BTreeMap<EventType, StageRecord>,

    pub date: TurnDate,
    pub phase: TurnPhase,
    pub selected_allocation: Option<Allocation>,
    pub allocation_applied: bool,
    pub disabled_allocation: Option<Allocation>,

    pub game_over_reason: Option<GameOverReason>,
    pub endgame: EndgameCache,
}

impl GameState {
    pub fn has_status(&self, kind: StatusEffectKind) -> bool {
        self.status_effects.is_active(kind)
    }

    pub fn has_sanctions(&self) -> bool {
        self.has_status(StatusEffectKind::Sanctions)
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over_reason.is_some()
    }

    pub fn leading_competitor(&self) -> Option<&Competitor> {
        self.competitors
            .iter()
            .max_by(|a, b| a.capability.total_cmp(&b.capability))
    }

    pub fn max_competitor_capability(&self) -> f64 {
        self.leading_competitor().map_or(0.0, |c| c.capability)
    }

    /// Restore descending capability order.
    pub fn sort_competitors(&mut self) {
        self.competitors
            .sort_by(|a, b| b.capability.total_cmp(&a.capability));
    }

    /// Pull every capability up to the positive floor.
    pub fn clamp_capabilities(&mut self) {
        self.capability = self.capability.max(CAPABILITY_FLOOR);
        for c in &mut self.competitors {
            c.capability = c.capability.max(CAPABILITY_FLOOR);
        }
    }

    pub fn clamp_money(&mut self) {
        self.money = self.money.max(0.0);
    }

    pub fn can_afford(&self, money: f64, diplomacy: f64, product: f64) -> bool {
        self.money >= money && self.diplomacy_points >= diplomacy && self.product_points >= product
    }

    pub fn mark_accepted(&mut self, event_type: EventType) {
        self.events_accepted.insert(event_type);
    }

    pub fn appearance_count(&self, event_type: &EventType) -> u32 {
        self.event_appearance_counts.get(event_type).copied().unwrap_or(0)
    }
}
