use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Technology {
    Robotaxi,
    NormalPersuasion,
    AiResearchLead,
    Superpersuasion,
    Medicine,
    SyntheticBiology,
    CancerCure,
    BrainUploading,
    Robotics,
    HumanoidRobots,
    RoboticSupplyChains,
    Nanotech,
    AiMonitoring,
    AiControl,
    AiAlignment,
    AiInterpretability,
    CyberWarfare,
    Bioweapons,
    KillerDrones,
    Nukes,
}

string_enum!(Technology {
    Robotaxi => "robotaxi",
    NormalPersuasion => "normalPersuasion",
    AiResearchLead => "aiResearchLead",
    Superpersuasion => "superpersuasion",
    Medicine => "medicine",
    SyntheticBiology => "syntheticBiology",
    CancerCure => "cancerCure",
    BrainUploading => "brainUploading",
    Robotics => "robotics",
    HumanoidRobots => "humanoidRobots",
    RoboticSupplyChains => "roboticSupplyChains",
    Nanotech => "nanotech",
    AiMonitoring => "aiMonitoring",
    AiControl => "aiControl",
    AiAlignment => "aiAlignment",
    AiInterpretability => "aiInterpretability",
    CyberWarfare => "cyberWarfare",
    Bioweapons => "bioweapons",
    KillerDrones => "killerDrones",
    Nukes => "nukes",
});

/// Technology tree column.
///
/// General and alignment columns are fully visible from the start. The
/// other columns reveal one technology at a time: the head is always shown
/// and each later entry appears once its predecessor is developed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechColumn {
    General,
    Medicine,
    Robotics,
    Alignment,
    Military,
}

impl TechColumn {
    pub fn members(self) -> &'static [Technology] {
        use Technology::*;
        match self {
            TechColumn::General => &[Robotaxi, NormalPersuasion, AiResearchLead, Superpersuasion],
            TechColumn::Medicine => &[Medicine, SyntheticBiology, CancerCure, BrainUploading],
            TechColumn::Robotics => &[Robotics, HumanoidRobots, RoboticSupplyChains, Nanotech],
            TechColumn::Alignment => &[AiMonitoring, AiControl, AiAlignment, AiInterpretability],
            TechColumn::Military => &[CyberWarfare, Bioweapons, KillerDrones, Nukes],
        }
    }

    fn fully_visible(self) -> bool {
        matches!(self, TechColumn::General | TechColumn::Alignment)
    }
}

impl Technology {
    pub fn column(self) -> TechColumn {
        [
            TechColumn::General,
            TechColumn::Medicine,
            TechColumn::Robotics,
            TechColumn::Alignment,
            TechColumn::Military,
        ]
        .into_iter()
        .find(|col| col.members().contains(&self))
        .unwrap_or(TechColumn::General)
    }
}

/// Developed technologies, keyed by technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologySet {
    developed: BTreeMap<Technology, bool>,
}

impl Default for TechnologySet {
    fn default() -> Self {
        let mut developed: BTreeMap<Technology, bool> =
            Technology::ALL.iter().map(|&t| (t, false)).collect();
        developed.insert(Technology::Robotaxi, true);
        Self { developed }
    }
}

impl TechnologySet {
    pub fn is_active(&self, tech: Technology) -> bool {
        self.developed.get(&tech).copied().unwrap_or(false)
    }

    pub fn set(&mut self, tech: Technology, active: bool) {
        self.developed.insert(tech, active);
    }

    pub fn activate(&mut self, tech: Technology) {
        self.set(tech, true);
    }

    /// Activate a technology by its content key. Unknown keys are logged and
    /// ignored; returns whether anything changed.
    pub fn activate_key(&mut self, key: &str) -> bool {
        match key.parse::<Technology>() {
            Ok(tech) => {
                let was = self.is_active(tech);
                self.activate(tech);
                !was
            }
            Err(_) => {
                tracing::warn!("ignoring unknown technology key {key:?}");
                false
            }
        }
    }

    /// Whether the player can see this technology in the tree.
    pub fn is_visible(&self, tech: Technology) -> bool {
        let column = tech.column();
        if column.fully_visible() || self.is_active(tech) {
            return true;
        }
        let members = column.members();
        match members.iter().position(|&t| t == tech) {
            Some(0) | None => true,
            Some(i) => self.is_active(members[i - 1]),
        }
    }

    pub fn active(&self) -> impl Iterator<Item = Technology> + '_ {
        self.developed
            .iter()
            .filter(|(_, on)| **on)
            .map(|(t, _)| *t)
    }

    pub fn visible(&self) -> impl Iterator<Item = Technology> + '_ {
        Technology::ALL.iter().copied().filter(|&t| self.is_visible(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robotaxi_starts_developed() {
        let techs = TechnologySet::default();
        assert!(techs.is_active(Technology::Robotaxi));
        assert_eq!(techs.active().count(), 1);
    }

    #[test]
    fn keys_round_trip_through_serde() {
        let json = serde_json::to_string(&Technology::KillerDrones).unwrap();
        assert_eq!(json, "\"killerDrones\"");
        let back: Technology = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Technology::KillerDrones);
    }

    #[test]
    fn unknown_key_is_ignored() {
        let mut techs = TechnologySet::default();
        let before = techs.clone();
        assert!(!techs.activate_key("warpDrive"));
        assert_eq!(techs, before);
    }

    #[test]
    fn column_heads_visible_and_tails_hidden() {
        let techs = TechnologySet::default();
        assert!(techs.is_visible(Technology::Medicine));
        assert!(!techs.is_visible(Technology::SyntheticBiology));
        assert!(techs.is_visible(Technology::CyberWarfare));
        assert!(!techs.is_visible(Technology::Nukes));
        assert!(techs.is_visible(Technology::Superpersuasion));
        assert!(techs.is_visible(Technology::AiInterpretability));
    }

    #[test]
    fn developing_predecessor_reveals_next() {
        let mut techs = TechnologySet::default();
        techs.activate(Technology::Robotics);
        assert!(techs.is_visible(Technology::HumanoidRobots));
        assert!(!techs.is_visible(Technology::RoboticSupplyChains));
    }

    #[test]
    fn developed_technology_is_always_visible() {
        let mut techs = TechnologySet::default();
        assert!(techs.activate_key("nukes"));
        assert!(techs.is_visible(Technology::Nukes));
    }
}
