//! Builder for hand-made game states.
//!
//! Starts from the default config's opening position (OpenAI racing
//! Anthropic, DeepMind and DeepSeek) and lets tests override only what they
//! care about.

use crate::config::GameConfig;
use crate::model::{
    COMPANIES, Competitor, GameState, StatusEffectKind, Technology, TurnDate, company_by_name,
};
use crate::sim::setup::{identity_for, initial_state};

pub struct Scenario {
    state: GameState,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    pub fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    /// Opening position for `config`, with a fixed line-up of companies.
    pub fn with_config(config: &GameConfig) -> Self {
        let [player, a, b, c, ..] = &COMPANIES;
        Self {
            state: initial_state(config, player, [a, b, c]),
        }
    }

    pub fn capability(mut self, v: f64) -> Self { self.state.capability = v; self }
    pub fn raw_risk(mut self, v: f64) -> Self { self.state.raw_risk = v; self }
    pub fn safety_points(mut self, v: f64) -> Self { self.state.safety_points = v; self }
    pub fn alignment(mut self, v: f64) -> Self { self.state.alignment_score = v; self }
    pub fn interpretability(mut self, v: f64) -> Self { self.state.interpretability_progress = v; self }
    pub fn money(mut self, v: f64) -> Self { self.state.money = v; self }
    pub fn diplomacy(mut self, v: f64) -> Self { self.state.diplomacy_points = v; self }
    pub fn date(mut self, turn: u32, start_year: u32) -> Self { self.state.date = TurnDate::new(turn, start_year); self }

    /// Rival capability levels, kept in descending order.
    pub fn competitors(mut self, levels: [f64; 3]) -> Self {
        for (competitor, level) in self.state.competitors.iter_mut().zip(levels) {
            competitor.capability = level;
        }
        self.state.sort_competitors();
        self
    }

    /// Replace the rivals outright.
    pub fn competitor_names(mut self, names: [&str; 3], levels: [f64; 3]) -> Self {
        self.state.competitors = names
            .iter()
            .zip(levels)
            .map(|(name, level)| Competitor::new(*name, level))
            .collect();
        self.state.sort_competitors();
        self
    }

    /// Play as `name`. A rival already using that name takes the old
    /// player's name instead. Unknown names keep the current home country.
    pub fn company(mut self, name: &str) -> Self {
        let previous = self.state.identity.company_name.clone();
        if let Some(rival) = self.state.competitors.iter_mut().find(|c| c.name == name) {
            rival.name = previous;
        }
        match company_by_name(name) {
            Some(company) => {
                self.state.identity = identity_for(company, self.state.identity.equity);
            }
            None => self.state.identity.company_name = name.to_string(),
        }
        self
    }

    /// Switch on a permanent status effect.
    pub fn status(mut self, kind: StatusEffectKind) -> Self {
        self.state.status_effects.activate(kind);
        self
    }

    pub fn technology(mut self, tech: Technology) -> Self {
        self.state.technologies.activate(tech);
        self
    }

    /// Escape hatch for anything without a dedicated setter.
    pub fn with(mut self, f: impl FnOnce(&mut GameState)) -> Self {
        f(&mut self.state);
        self
    }

    pub fn build(self) -> GameState {
        self.state
    }
}
