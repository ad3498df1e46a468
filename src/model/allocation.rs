use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Always-available allocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Sector {
    Capability,
    Safety,
    Diplomacy,
    Product,
    Revenue,
}

string_enum!(Sector {
    Capability => "capability",
    Safety => "safety",
    Diplomacy => "diplomacy",
    Product => "product",
    Revenue => "revenue",
});

/// Allocation targets unlocked by events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Project {
    Alignment,
    Interpretability,
    InternationalTreaty,
}

string_enum!(Project {
    Alignment => "alignment",
    Interpretability => "interpretability",
    InternationalTreaty => "international-treaty",
});

/// One turn's labor allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Allocation {
    Sector(Sector),
    Project(Project),
}

impl Allocation {
    pub const CAPABILITY: Allocation = Allocation::Sector(Sector::Capability);

    pub fn as_str(&self) -> &'static str {
        match self {
            Allocation::Sector(s) => s.as_str(),
            Allocation::Project(p) => p.as_str(),
        }
    }
}

impl From<Sector> for Allocation {
    fn from(s: Sector) -> Self {
        Allocation::Sector(s)
    }
}

impl From<Project> for Allocation {
    fn from(p: Project) -> Self {
        Allocation::Project(p)
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Allocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Sector>()
            .map(Allocation::Sector)
            .or_else(|_| s.parse::<Project>().map(Allocation::Project))
            .map_err(|_| format!("unknown allocation: {s}"))
    }
}

impl From<Allocation> for String {
    fn from(a: Allocation) -> Self {
        a.as_str().to_string()
    }
}

impl TryFrom<String> for Allocation {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
