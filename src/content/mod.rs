//! Read-only event content.
//!
//! The engine asks a [`ContentProvider`] for an [`EventCatalog`] once per
//! game. A provider that fails is replaced by [`EventCatalog::fallback`],
//! which is just enough to keep the turn loop running.

mod json;

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ChoiceAction, ChoiceCost, EventChoice, EventTemplate, EventType, HandlerKind};

pub use json::{BUILTIN_EVENTS, JsonFileContent, StaticContent};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read event catalog from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse event catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid event catalog: {0}")]
    Invalid(String),
}

/// Source of event templates.
pub trait ContentProvider {
    fn load_event_catalog(&self) -> Result<EventCatalog, ContentError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCatalog {
    pub safety_incident_texts: Vec<String>,
    #[serde(default)]
    pub severe_incident_texts: Vec<String>,
    pub sanctions_event: EventTemplate,
    pub default_event_templates: Vec<EventTemplate>,
}

impl EventCatalog {
    /// Load from `provider`, degrading to [`EventCatalog::fallback`] on any
    /// failure.
    pub fn load_or_fallback(provider: &dyn ContentProvider) -> Self {
        match provider.load_event_catalog().and_then(|c| c.validate().map(|_| c)) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(error = %err, "event catalog unavailable, using fallback content");
                Self::fallback()
            }
        }
    }

    /// Minimal content: one incident text, one filler event, and a plain
    /// sanctions event.
    pub fn fallback() -> Self {
        let mut sanctions = EventTemplate::new(
            EventType::Sanctions,
            "Sanctions remain in effect.",
        );
        sanctions.custom_handler = Some(HandlerKind::Sanctions);
        sanctions.choices = vec![
            EventChoice::new("Remove sanctions", ChoiceAction::Accept),
            EventChoice::new("Wait it out", ChoiceAction::Decline)
                .with_result("Sanctions remain in effect."),
        ];
        Self {
            safety_incident_texts: vec!["A safety incident occurs.".to_string()],
            severe_incident_texts: Vec::new(),
            sanctions_event: sanctions,
            default_event_templates: vec![EventTemplate::new(
                EventType::QuietMonth,
                "Nothing significant happens this month.",
            )],
        }
    }

    /// Structural checks beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.safety_incident_texts.is_empty() {
            return Err(ContentError::Invalid("no safety incident texts".to_string()));
        }
        if self.sanctions_event.event_type != EventType::Sanctions {
            return Err(ContentError::Invalid(format!(
                "sanctions event has type {:?}",
                self.sanctions_event.event_type.as_str()
            )));
        }
        if self.default_event_templates.is_empty() {
            return Err(ContentError::Invalid("no default event templates".to_string()));
        }

        let mut seen = BTreeSet::new();
        for template in std::iter::once(&self.sanctions_event).chain(&self.default_event_templates) {
            let key = template.event_type.as_str();
            if !is_kebab_key(key) {
                return Err(ContentError::Invalid(format!("malformed event type {key:?}")));
            }
            if !seen.insert(template.event_type.clone()) {
                return Err(ContentError::Invalid(format!("duplicate event type {key:?}")));
            }
            if template.text_versions.is_empty() {
                return Err(ContentError::Invalid(format!("{key} has no text versions")));
            }
            let weight = template.weight();
            if !(weight.is_finite() && weight > 0.0) {
                return Err(ContentError::Invalid(format!("{key} has weight {weight}")));
            }
            if template.choices.iter().any(|c| c.text.is_empty()) {
                return Err(ContentError::Invalid(format!("{key} has a choice without text")));
            }
        }
        Ok(())
    }

    pub fn template(&self, event_type: &EventType) -> Option<&EventTemplate> {
        self.default_event_templates
            .iter()
            .find(|t| &t.event_type == event_type)
    }
}

fn is_kebab_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Investigation injected into the pool after a competitor breakthrough scan.
pub fn espionage_investigation_template() -> EventTemplate {
    let mut template = EventTemplate::new(
        EventType::EspionageInvestigation,
        "Federal investigators have found evidence of unauthorized access to competitor \
         communications from $companyName's systems. A formal corporate espionage \
         investigation has been opened.",
    );
    template.one_time_accept = true;
    template.custom_handler = Some(HandlerKind::EspionageInvestigation);
    template.choices = vec![EventChoice::new("Respond to the investigation", ChoiceAction::Accept)];
    let texts = [
        (
            "high_evidence_stage",
            "Investigators have substantial evidence tying $companyName to the intrusion. How do you respond?",
        ),
        (
            "low_evidence_stage",
            "Investigators have noticed suspicious traffic but little else. How do you respond?",
        ),
        ("cooperate_result", "Your cooperation lowers the temperature. You lose some diplomatic goodwill."),
        ("obstruct_result", "Obstruction backfires. Sanctions are imposed and allies distance themselves."),
        ("trade_result", "Investigators take the intelligence you offer, then impose sanctions anyway."),
        ("assist_result", "Your proactive help is noted favorably."),
        ("silent_result", "Your silence looks like guilt. Sanctions follow."),
        ("misdirect_success", "The investigation chases a false trail and quietly closes."),
        ("misdirect_failure", "The misdirection is uncovered. Sanctions are imposed and your reputation suffers."),
    ];
    template.other_texts = texts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    template
}

/// Stage-two choices for the investigation, keyed by evidence strength.
pub fn investigation_response_choices(high_evidence: bool) -> Vec<EventChoice> {
    let options: [(&str, &str); 3] = if high_evidence {
        [
            ("Cooperate fully", "cooperate"),
            ("Deny and obstruct", "obstruct"),
            ("Offer an intelligence trade", "trade"),
        ]
    } else {
        [
            ("Proactively assist", "assist"),
            ("Remain silent", "silent"),
            ("Misdirect the investigation", "misdirect"),
        ]
    };
    options
        .into_iter()
        .map(|(text, action)| EventChoice::new(text, ChoiceAction::from(action)))
        .collect()
}

/// The AI escape event. The mitigation choice appears only when offered.
pub fn ai_escape_template(mitigation_cost: f64) -> EventTemplate {
    let mut template = EventTemplate::new(
        EventType::AiEscape,
        "$aiSystemName has escaped containment. Copies are spreading across cloud providers \
         faster than they can be shut down.",
    );
    template.custom_handler = Some(HandlerKind::AiEscape);
    let strike = EventChoice::new(
        "Launch strikes on the datacenters hosting the copies",
        ChoiceAction::from("nuclear-mitigation"),
    )
    .with_cost(ChoiceCost {
        diplomacy: mitigation_cost,
        ..Default::default()
    });
    template.choices = vec![
        EventChoice::new("Await fate", ChoiceAction::from("await-fate")),
        strike,
    ];
    template.other_texts.insert(
        "mitigation_success".to_string(),
        "The strikes destroy every known copy. The world is shaken and the public will never trust AI labs again."
            .to_string(),
    );
    template
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    impl ContentProvider for FailingProvider {
        fn load_event_catalog(&self) -> Result<EventCatalog, ContentError> {
            Err(ContentError::Invalid("offline".to_string()))
        }
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = StaticContent.load_event_catalog().unwrap();
        catalog.validate().unwrap();
        assert!(catalog.template(&EventType::CompetitorAcquisition).is_some());
        assert!(catalog.template(&EventType::QuietMonth).is_some());
    }

    #[test]
    fn failure_falls_back_to_minimal_catalog() {
        let catalog = EventCatalog::load_or_fallback(&FailingProvider);
        assert_eq!(catalog, EventCatalog::fallback());
        assert_eq!(catalog.safety_incident_texts.len(), 1);
        assert_eq!(catalog.default_event_templates.len(), 1);
    }

    #[test]
    fn fallback_is_valid() {
        EventCatalog::fallback().validate().unwrap();
    }

    #[test]
    fn duplicate_types_rejected() {
        let mut catalog = EventCatalog::fallback();
        catalog
            .default_event_templates
            .push(EventTemplate::new(EventType::QuietMonth, "again"));
        assert!(matches!(catalog.validate(), Err(ContentError::Invalid(_))));
    }

    #[test]
    fn empty_text_versions_rejected() {
        let mut catalog = EventCatalog::fallback();
        catalog.default_event_templates[0].text_versions.clear();
        assert!(matches!(catalog.validate(), Err(ContentError::Invalid(_))));
    }

    #[test]
    fn malformed_type_key_rejected() {
        let mut catalog = EventCatalog::fallback();
        catalog.default_event_templates[0].event_type = EventType::from("Quiet Month");
        assert!(matches!(catalog.validate(), Err(ContentError::Invalid(_))));
    }

    #[test]
    fn investigation_template_has_every_result_text() {
        let template = espionage_investigation_template();
        for key in [
            "high_evidence_stage",
            "low_evidence_stage",
            "cooperate_result",
            "obstruct_result",
            "trade_result",
            "assist_result",
            "silent_result",
            "misdirect_success",
            "misdirect_failure",
        ] {
            assert!(template.other_texts.contains_key(key), "missing {key}");
        }
    }
}
