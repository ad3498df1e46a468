use serde::{Deserialize, Serialize};

/// Static metadata for one of the frontier labs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Company {
    pub name: &'static str,
    pub long_name: &'static str,
    pub home_country: &'static str,
    pub country_name: &'static str,
}

pub const COMPANIES: [Company; 6] = [
    Company {
        name: "OpenAI",
        long_name: "OpenAI",
        home_country: "US",
        country_name: "the United States",
    },
    Company {
        name: "Anthropic",
        long_name: "Anthropic",
        home_country: "US",
        country_name: "the United States",
    },
    Company {
        name: "DeepMind",
        long_name: "Google DeepMind",
        home_country: "UK",
        country_name: "the United Kingdom",
    },
    Company {
        name: "DeepSeek",
        long_name: "DeepSeek",
        home_country: "CN",
        country_name: "China",
    },
    Company {
        name: "Tencent",
        long_name: "Tencent",
        home_country: "CN",
        country_name: "China",
    },
    Company {
        name: "xAI",
        long_name: "xAI",
        home_country: "US",
        country_name: "the United States",
    },
];

/// Capability levels at which AI system names advance a generation.
pub const SYSTEM_NAME_BANDS: [f64; 6] = [16.0, 32.0, 64.0, 128.0, 256.0, 512.0];

/// Look up a company by short name.
pub fn company_by_name(name: &str) -> Option<&'static Company> {
    COMPANIES.iter().find(|c| c.name == name)
}

/// A rival lab: name plus capability level.
///
/// Names and levels travel together so re-sorting by capability never
/// detaches a name from its level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub capability: f64,
}

impl Competitor {
    pub fn new(name: impl Into<String>, capability: f64) -> Self {
        Self {
            name: name.into(),
            capability,
        }
    }
}

/// Capability band (0–6) used to pick a system generation name.
pub fn capability_band(capability: f64) -> usize {
    SYSTEM_NAME_BANDS
        .iter()
        .take_while(|&&threshold| capability >= threshold)
        .count()
}

/// Name of a company's flagship AI system at the given capability level.
pub fn ai_system_name(company: &str, capability: f64) -> String {
    let band = capability_band(capability);
    match company {
        "Anthropic" => format!("Claude {} Opus", 5 + band * 2),
        "DeepMind" => {
            if band == 6 {
                "OmegaReason".to_string()
            } else {
                format!("Gemini {:.1} Pro", 3.0 + band as f64 * 1.5)
            }
        }
        "OpenAI" => match band {
            0 => "OpenAI o5".to_string(),
            1 => "OpenAI o7".to_string(),
            _ => format!("AGT-{}", 9 + (band - 2) * 2),
        },
        "DeepSeek" => format!("Deepseek R{}", 3 + band * 2),
        "xAI" => format!("Grok {}", 5 + band * 2),
        "Tencent" => match band {
            0 => "Hunyuan 3.0".to_string(),
            6 => "HunyuanDivine 9.0".to_string(),
            _ => format!("HunyuanAgent {}.0", 3 + band),
        },
        _ => "AI System".to_string(),
    }
}
