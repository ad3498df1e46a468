use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::effect::{ChoiceBenefit, ChoiceCondition, ChoiceCost, ChoicePenalty, ChoiceRisk};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EventType {
    SafetyIncident,
    SevereIncident,
    AiEscape,
    Sanctions,
    QuietMonth,
    ProductBreakthrough,
    OverseasDatacenter,
    SecondDatacenter,
    NuclearWeapons,
    MissileDefense,
    CompetitorBreakthrough,
    EspionageInvestigation,
    CompetitorAcquisition,
    FallingBehind,
    SafetyResearchLimitations,
    AlignmentBreakthrough,
    UnRecognition,
    TreatyProposal,
    MilitaryContract,
    DecisiveStrategicAdvantage,
    SuperpersuasionResearch,
    InterpretabilityTools,
    Custom(String),
}

string_enum_open!(EventType, "event type", {
    SafetyIncident => "safety-incident",
    SevereIncident => "severe-safety-incident",
    AiEscape => "ai-escape",
    Sanctions => "sanctions",
    QuietMonth => "quiet-month",
    ProductBreakthrough => "product-breakthrough",
    OverseasDatacenter => "overseas-datacenter",
    SecondDatacenter => "second-datacenter",
    NuclearWeapons => "nuclear-weapons",
    MissileDefense => "missile-defense",
    CompetitorBreakthrough => "competitor-breakthrough",
    EspionageInvestigation => "corporate-espionage-investigation",
    CompetitorAcquisition => "competitor-acquisition",
    FallingBehind => "falling-behind",
    SafetyResearchLimitations => "safety-research-limitations",
    AlignmentBreakthrough => "alignment-breakthrough",
    UnRecognition => "un-recognition",
    TreatyProposal => "treaty-proposal",
    MilitaryContract => "military-contract",
    DecisiveStrategicAdvantage => "decisive-strategic-advantage",
    SuperpersuasionResearch => "superpersuasion-research",
    InterpretabilityTools => "interpretability-tools",
});

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ChoiceAction {
    Accept,
    AcceptSanctions,
    Decline,
    Custom(String),
}

string_enum_open!(ChoiceAction, "choice action", {
    Accept => "accept",
    AcceptSanctions => "accept-sanctions",
    Decline => "decline",
});

impl ChoiceAction {
    /// Accepting actions pay costs, collect benefits and mark the event
    /// type as accepted.
    pub fn is_accepting(&self) -> bool {
        matches!(self, ChoiceAction::Accept | ChoiceAction::AcceptSanctions)
    }
}

/// Custom resolution logic attached to a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum HandlerKind {
    OverseasDatacenter,
    SecondDatacenter,
    NuclearWeapons,
    MissileDefense,
    CompetitorBreakthrough,
    EspionageInvestigation,
    CompetitorAcquisition,
    Sanctions,
    DecisiveStrategicAdvantage,
    AiEscape,
    SuperpersuasionResearch,
}

string_enum!(HandlerKind {
    OverseasDatacenter => "overseas-datacenter",
    SecondDatacenter => "second-datacenter",
    NuclearWeapons => "nuclear-weapons",
    MissileDefense => "missile-defense",
    CompetitorBreakthrough => "competitor-breakthrough",
    EspionageInvestigation => "espionage-investigation",
    CompetitorAcquisition => "competitor-acquisition",
    Sanctions => "sanctions",
    DecisiveStrategicAdvantage => "decisive-strategic-advantage",
    AiEscape => "ai-escape",
    SuperpersuasionResearch => "superpersuasion-research",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EventStage {
    Discovery,
    Response,
}

string_enum!(EventStage {
    Discovery => "discovery",
    Response => "response",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventChoice {
    pub text: String,
    pub action: ChoiceAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<ChoiceCost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit: Option<ChoiceBenefit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<ChoicePenalty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<ChoiceRisk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ChoiceCondition>,
    #[serde(default, rename = "result_text", skip_serializing_if = "Option::is_none")]
    pub result_text: Option<String>,
    /// Filled in when the choice is presented; catalog entries leave it unset.
    #[serde(default = "default_affordable")]
    pub affordable: bool,
}

fn default_affordable() -> bool {
    true
}

impl EventChoice {
    pub fn new(text: impl Into<String>, action: ChoiceAction) -> Self {
        Self {
            text: text.into(),
            action,
            cost: None,
            benefit: None,
            penalty: None,
            risk: None,
            condition: None,
            result_text: None,
            affordable: true,
        }
    }

    pub fn with_cost(mut self, cost: ChoiceCost) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_condition(mut self, condition: ChoiceCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_result(mut self, text: impl Into<String>) -> Self {
        self.result_text = Some(text.into());
        self
    }
}

/// Inclusive capability window; either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl LevelRange {
    pub fn contains(&self, level: f64) -> bool {
        self.min.is_none_or(|min| level >= min) && self.max.is_none_or(|max| level <= max)
    }
}

/// A catalog entry the selection engine can draw from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTemplate {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_level_range: Option<LevelRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_times: Option<u32>,
    #[serde(default)]
    pub one_time_accept: bool,
    #[serde(rename = "text_versions")]
    pub text_versions: Vec<String>,
    #[serde(default)]
    pub choices: Vec<EventChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_handler: Option<HandlerKind>,
    #[serde(default, rename = "other_texts", skip_serializing_if = "BTreeMap::is_empty")]
    pub other_texts: BTreeMap<String, String>,
}

impl EventTemplate {
    pub fn new(event_type: EventType, text: impl Into<String>) -> Self {
        Self {
            event_type,
            weight: None,
            requires: Vec::new(),
            ai_level_range: None,
            max_times: None,
            one_time_accept: false,
            text_versions: vec![text.into()],
            choices: Vec::new(),
            custom_handler: None,
            other_texts: BTreeMap::new(),
        }
    }

    /// Selection weight, defaulting to 1.
    pub fn weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

/// Typed per-instance working data, fixed when the event is generated.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventPayload {
    #[default]
    None,
    SafetyIncident {
        fine: f64,
    },
    WarningShot {
        fine: f64,
        apply_sanctions: bool,
    },
    AiEscape {
        mitigation_offered: bool,
    },
    Datacenter {
        country: String,
    },
    Breakthrough {
        competitor: String,
    },
    Acquisition {
        competitor: String,
        total_equity_offered: f64,
        player_equity_received: f64,
    },
}

/// Per-type multi-stage record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageRecord {
    pub current_stage: Option<EventStage>,
    pub data: StageData,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StageData {
    #[default]
    Empty,
    Investigation {
        evidence_level: f64,
        investigator_suspicion: f64,
    },
}

/// The event currently in front of the player.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEvent {
    pub event_type: EventType,
    pub text: String,
    pub choices: Vec<EventChoice>,
    pub handler: Option<HandlerKind>,
    /// Catalog entry this instance came from, kept for every stage.
    pub template: Option<EventTemplate>,
    /// Substitution dictionary, computed once per instance.
    pub variables: BTreeMap<String, String>,
    pub payload: EventPayload,
    pub is_multi_stage: bool,
    pub stage: Option<EventStage>,
    pub result_text: Option<String>,
}

impl ActiveEvent {
    pub fn new(event_type: EventType, text: impl Into<String>) -> Self {
        Self {
            event_type,
            text: text.into(),
            choices: Vec::new(),
            handler: None,
            template: None,
            variables: BTreeMap::new(),
            payload: EventPayload::None,
            is_multi_stage: false,
            stage: None,
            result_text: None,
        }
    }

    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Events without choices need no decision.
    pub fn needs_decision(&self) -> bool {
        !self.choices.is_empty() && self.result_text.is_none()
    }

    pub fn is_resolved(&self) -> bool {
        self.result_text.is_some()
    }

    /// Look up a keyed text on the originating template.
    pub fn other_text(&self, key: &str) -> Option<&str> {
        self.template
            .as_ref()
            .and_then(|t| t.other_texts.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_catalog_shape() {
        let json = r#"{
            "type": "overseas-datacenter",
            "weight": 2,
            "requires": ["product-breakthrough"],
            "aiLevelRange": {"min": 20},
            "maxTimes": 3,
            "oneTimeAccept": true,
            "text_versions": ["Build in $country?"],
            "choices": [
                {"text": "Build", "action": "accept", "cost": {"money": 5},
                 "condition": "hasUNRecognition", "result_text": "Built."},
                {"text": "Skip", "action": "decline"}
            ],
            "customHandler": "overseas-datacenter",
            "other_texts": {"sanctions_triggered": "Sanctioned."}
        }"#;
        let t: EventTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(t.event_type, EventType::OverseasDatacenter);
        assert_eq!(t.weight(), 2.0);
        assert_eq!(t.requires, vec![EventType::ProductBreakthrough]);
        assert!(t.ai_level_range.unwrap().contains(25.0));
        assert!(!t.ai_level_range.unwrap().contains(5.0));
        assert_eq!(t.choices.len(), 2);
        assert_eq!(t.choices[0].condition, Some(ChoiceCondition::HasUnRecognition));
        assert!(t.choices[0].affordable);
        assert_eq!(t.custom_handler, Some(HandlerKind::OverseasDatacenter));
        assert_eq!(t.other_texts["sanctions_triggered"], "Sanctioned.");
    }

    #[test]
    fn weight_defaults_to_one() {
        let t = EventTemplate::new(EventType::QuietMonth, "Nothing happens.");
        assert_eq!(t.weight(), 1.0);
    }

    #[test]
    fn unknown_handler_is_a_parse_error() {
        let json = r#"{"type": "x", "text_versions": ["a"], "customHandler": "teleport"}"#;
        assert!(serde_json::from_str::<EventTemplate>(json).is_err());
    }

    #[test]
    fn accepting_actions() {
        assert!(ChoiceAction::Accept.is_accepting());
        assert!(ChoiceAction::AcceptSanctions.is_accepting());
        assert!(!ChoiceAction::Decline.is_accepting());
        assert!(!ChoiceAction::from("cooperate").is_accepting());
    }

    #[test]
    fn level_range_bounds_inclusive() {
        let range = LevelRange { min: Some(10.0), max: Some(20.0) };
        assert!(range.contains(10.0));
        assert!(range.contains(20.0));
        assert!(!range.contains(20.5));
        assert!(LevelRange::default().contains(1e9));
    }
}
