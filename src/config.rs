use serde::Deserialize;
use thiserror::Error;

/// Tunable constants for one game.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// RNG seed used by [`crate::Game::with_seed`] callers that want one.
    pub seed: u64,
    /// Fixed player company; random when `None`.
    pub company: Option<String>,

    pub initial_capability: f64,
    pub initial_raw_risk: f64,
    pub initial_competitors: Vec<f64>,
    pub initial_money: f64,
    pub initial_equity: f64,
    pub start_year: u32,

    /// Adjusted risk at which the game is instantly lost.
    pub terminal_risk: f64,
    /// Capability that counts as superintelligence.
    pub asi_threshold: f64,
    /// Both leaders at or above this make a narrow race.
    pub narrow_race_threshold: f64,

    pub capability_divisor: f64,
    pub safety_divisor: f64,
    pub diplomacy_divisor: f64,
    pub product_divisor: f64,
    pub alignment_divisor: f64,
    pub interpretability_divisor: f64,
    /// Raw risk added per unit of ln(new/old) capability growth.
    pub capability_risk_coefficient: f64,

    pub datacenter_boost: f64,
    pub competitor_growth_divisor: f64,

    pub research_limitations_safety_gate: f64,
    pub alignment_breakthrough_safety_gate: f64,
    pub acquisition_ratio: f64,

    pub superpersuasion_capability: f64,
    pub superpersuasion_risk: f64,

    pub treaty_cap: f64,
    pub treaty_compound_rate: f64,

    pub humanity_multiplier: f64,
    pub player_multiplier_base: f64,
    pub player_multiplier_per_equity: f64,

    pub incident_fine_exponent: f64,
    pub nuclear_mitigation_success: f64,
    pub nuclear_mitigation_cost: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            company: None,
            initial_capability: 10.0,
            initial_raw_risk: 20.0,
            initial_competitors: vec![8.0, 6.0, 4.0],
            initial_money: 10.0,
            initial_equity: 0.1,
            start_year: 2026,
            terminal_risk: 100.0,
            asi_threshold: 1000.0,
            narrow_race_threshold: 900.0,
            capability_divisor: 10.0,
            safety_divisor: 10.0,
            diplomacy_divisor: 10.0,
            product_divisor: 10.0,
            alignment_divisor: 10.0,
            interpretability_divisor: 20.0,
            capability_risk_coefficient: 50.0,
            datacenter_boost: 0.20,
            competitor_growth_divisor: 25.0,
            research_limitations_safety_gate: 80.0,
            alignment_breakthrough_safety_gate: 320.0,
            acquisition_ratio: 2.0,
            superpersuasion_capability: 256.0,
            superpersuasion_risk: 50.0,
            treaty_cap: 2000.0,
            treaty_compound_rate: 0.05,
            humanity_multiplier: 10.0,
            player_multiplier_base: 10.0,
            player_multiplier_per_equity: 100.0,
            incident_fine_exponent: 1.5,
            nuclear_mitigation_success: 0.5,
            nuclear_mitigation_cost: 20.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid game config: {0}")]
    Invalid(String),
}

impl GameConfig {
    /// Parse a JSON override; missing fields keep their defaults.
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_competitors.len() != 3 {
            return Err(ConfigError::Invalid(format!(
                "expected exactly 3 competitors, got {}",
                self.initial_competitors.len()
            )));
        }
        let capabilities = std::iter::once(self.initial_capability).chain(self.initial_competitors.iter().copied());
        for cap in capabilities {
            if !(cap.is_finite() && cap > 0.0) {
                return Err(ConfigError::Invalid(format!("capability must be positive, got {cap}")));
            }
        }
        if !(0.0..=1.0).contains(&self.initial_equity) {
            return Err(ConfigError::Invalid(format!(
                "equity must be within 0..=1, got {}",
                self.initial_equity
            )));
        }
        if self.narrow_race_threshold > self.asi_threshold {
            return Err(ConfigError::Invalid(
                "narrow race threshold exceeds superintelligence threshold".to_string(),
            ));
        }
        if self.terminal_risk <= 0.0 || self.terminal_risk > 100.0 {
            return Err(ConfigError::Invalid(format!(
                "terminal risk must be within (0, 100], got {}",
                self.terminal_risk
            )));
        }
        let divisors = [
            self.capability_divisor,
            self.safety_divisor,
            self.diplomacy_divisor,
            self.product_divisor,
            self.alignment_divisor,
            self.interpretability_divisor,
            self.competitor_growth_divisor,
        ];
        if divisors.iter().any(|d| *d <= 0.0) {
            return Err(ConfigError::Invalid("divisors must be positive".to_string()));
        }
        if let Some(company) = &self.company {
            if crate::model::company_by_name(company).is_none() {
                return Err(ConfigError::Invalid(format!("unknown company {company:?}")));
            }
        }
        Ok(())
    }

    /// This config if it validates, otherwise the defaults under the same
    /// seed.
    pub fn validated_or_default(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(err) => {
                tracing::warn!(error = %err, "invalid game config, using defaults");
                GameConfig {
                    seed: self.seed,
                    ..GameConfig::default()
                }
            }
        }
    }
}
