use serde::{Deserialize, Serialize};

/// Resources deducted when a choice is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChoiceCost {
    pub money: f64,
    #[serde(alias = "diplomacyPoints")]
    pub diplomacy: f64,
    #[serde(alias = "productPoints")]
    pub product: f64,
}

impl ChoiceCost {
    pub fn is_zero(&self) -> bool {
        self.money == 0.0 && self.diplomacy == 0.0 && self.product == 0.0
    }
}

/// Which project panel an accepted choice unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Unlock {
    Projects,
    Alignment,
    Treaty,
}

string_enum!(Unlock {
    Projects => "projects",
    Alignment => "alignment",
    Treaty => "treaty",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChoiceBenefit {
    /// Money added every turn from now on.
    pub income_bonus: f64,
    /// Capability added every turn from now on.
    pub ai_level_per_turn: f64,
    /// Replaces the labor budget multiplier.
    pub resource_multiplier: Option<f64>,
    /// Compounds onto the diplomacy multiplier.
    pub diplomacy_multiplier: Option<f64>,
    pub product_multiplier: Option<f64>,
    pub interpretability_multiplier: Option<f64>,
    pub money: f64,
    pub diplomacy: f64,
    pub product: f64,
    pub safety: f64,
    /// Technology key, resolved at apply time.
    pub activate_technology: Option<String>,
    /// Status effect key, resolved at apply time.
    pub activate_status: Option<String>,
    pub un_recognition: bool,
    pub unlock: Vec<Unlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChoicePenalty {
    #[serde(alias = "doomLevel")]
    pub raw_risk: f64,
    pub sanctions: bool,
}

/// Probability-based downsides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChoiceRisk {
    pub sanctions: Option<f64>,
}

/// Typed predicate deciding whether a choice is offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ChoiceCondition {
    CooIsMinister,
    HasUnRecognition,
    HasSanctions,
    ProjectsUnlocked,
    AlignmentUnlocked,
    TreatyUnlocked,
    HasDatacenter,
    IsVpSafetyAlignment,
    HasIntelligenceAgreement,
    Custom(String),
}

string_enum_open!(ChoiceCondition, "choice condition", {
    CooIsMinister => "cooIsMinister",
    HasUnRecognition => "hasUNRecognition",
    HasSanctions => "hasSanctions",
    ProjectsUnlocked => "projectsUnlocked",
    AlignmentUnlocked => "alignmentUnlocked",
    TreatyUnlocked => "internationalTreatyUnlocked",
    HasDatacenter => "hasDatacenter",
    IsVpSafetyAlignment => "isVPSafetyAlignment",
    HasIntelligenceAgreement => "hasIntelligenceAgreement",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_accepts_legacy_field_names() {
        let cost: ChoiceCost =
            serde_json::from_str(r#"{"money": 5, "diplomacyPoints": 3, "productPoints": 2}"#).unwrap();
        assert_eq!(cost.money, 5.0);
        assert_eq!(cost.diplomacy, 3.0);
        assert_eq!(cost.product, 2.0);
    }

    #[test]
    fn benefit_defaults_are_inert() {
        let benefit: ChoiceBenefit = serde_json::from_str("{}").unwrap();
        assert_eq!(benefit, ChoiceBenefit::default());
        assert!(benefit.resource_multiplier.is_none());
    }

    #[test]
    fn unknown_condition_becomes_custom() {
        let cond: ChoiceCondition = serde_json::from_str("\"isWizard\"").unwrap();
        assert_eq!(cond, ChoiceCondition::Custom("isWizard".to_string()));
        let known: ChoiceCondition = serde_json::from_str("\"cooIsMinister\"").unwrap();
        assert_eq!(known, ChoiceCondition::CooIsMinister);
    }

    #[test]
    fn penalty_reads_doom_level_alias() {
        let penalty: ChoicePenalty =
            serde_json::from_str(r#"{"doomLevel": 15, "sanctions": true}"#).unwrap();
        assert_eq!(penalty.raw_risk, 15.0);
        assert!(penalty.sanctions);
    }
}
