use serde::{Deserialize, Serialize};

/// Who crossed the superintelligence line first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Winner {
    Player,
    Competitor(String),
}

/// Percent of the reachable universe claimed by each party. Sums to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GalaxyDistribution {
    pub player: f64,
    pub humanity: f64,
    pub rogue: f64,
}

/// Score weights for each party.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GalaxyMultipliers {
    pub player: f64,
    pub humanity: f64,
    pub rogue: f64,
}

/// Pre-roll expectations shown before alignment is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedOutcome {
    pub survival_chance: f64,
    pub distribution: GalaxyDistribution,
    pub score: f64,
}

/// Everything the four epilogue phases show. Computed once per game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndgameResult {
    pub winner: Winner,
    pub narrow_race: bool,
    pub adjusted_risk: f64,
    pub player_aligned: bool,
    pub competitors_aligned: bool,
    /// Raw x²-proportional shares before alignment is applied.
    pub player_raw_share: f64,
    pub competitor_raw_share: f64,
    pub expected: ExpectedOutcome,
    pub distribution: GalaxyDistribution,
    pub multipliers: GalaxyMultipliers,
    pub score: f64,
    pub conclusion: String,
    /// Narrative for phases 1 to 4.
    pub phases: [String; 4],
}

impl EndgameResult {
    /// Text for a 1-based phase number.
    pub fn phase_text(&self, phase: u8) -> Option<&str> {
        let idx = usize::from(phase).checked_sub(1)?;
        self.phases.get(idx).map(String::as_str)
    }
}
