use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum StatusEffectKind {
    /// Halves the labor budget, blocks passive capability gain, forces the
    /// sanctions event every turn.
    Sanctions,
    /// Freezes capability investment and competitor growth.
    Shaken,
    /// Halves the humanity galaxy multiplier.
    Disillusioned,
    /// Halves competitor growth once the international treaty completes.
    Treaty,
    UnRecognition,
}

string_enum!(StatusEffectKind {
    Sanctions => "sanctions",
    Shaken => "shaken",
    Disillusioned => "disillusioned",
    Treaty => "treaty",
    UnRecognition => "unRecognition",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub active: bool,
    /// `None` means permanent.
    pub turns_remaining: Option<u32>,
    /// Countdown until a delayed effect switches on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activates_in: Option<u32>,
}

impl StatusEffect {
    pub fn permanent() -> Self {
        Self {
            active: true,
            turns_remaining: None,
            activates_in: None,
        }
    }

    pub fn timed(turns: u32) -> Self {
        Self {
            active: true,
            turns_remaining: Some(turns),
            activates_in: None,
        }
    }

    /// Inactive now, switches on after `delay` countdowns and then lasts
    /// `turns` more.
    pub fn delayed(delay: u32, turns: u32) -> Self {
        Self {
            active: false,
            turns_remaining: Some(turns),
            activates_in: Some(delay),
        }
    }
}

/// What happened to an effect during a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Activated(StatusEffectKind),
    Expired(StatusEffectKind),
    Removed(StatusEffectKind),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    effects: BTreeMap<StatusEffectKind, StatusEffect>,
}

impl StatusEffects {
    pub fn is_active(&self, kind: StatusEffectKind) -> bool {
        self.effects.get(&kind).is_some_and(|e| e.active)
    }

    pub fn get(&self, kind: StatusEffectKind) -> Option<&StatusEffect> {
        self.effects.get(&kind)
    }

    pub fn insert(&mut self, kind: StatusEffectKind, effect: StatusEffect) {
        self.effects.insert(kind, effect);
    }

    pub fn activate(&mut self, kind: StatusEffectKind) {
        self.insert(kind, StatusEffect::permanent());
    }

    pub fn deactivate(&mut self, kind: StatusEffectKind) {
        if let Some(effect) = self.effects.get_mut(&kind) {
            effect.active = false;
        }
    }

    pub fn remove(&mut self, kind: StatusEffectKind) -> Option<StatusEffect> {
        self.effects.remove(&kind)
    }

    /// Activate an effect by content key. Unknown keys are logged and ignored.
    pub fn activate_key(&mut self, key: &str) -> bool {
        match key.parse::<StatusEffectKind>() {
            Ok(kind) => {
                self.activate(kind);
                true
            }
            Err(_) => {
                tracing::warn!("ignoring unknown status effect key {key:?}");
                false
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatusEffectKind, &StatusEffect)> {
        self.effects.iter()
    }

    /// Advance every timed effect by one turn.
    ///
    /// Delayed effects switch on when their countdown reaches one. Active
    /// timed effects lose a turn; on reaching zero `Shaken` is removed and
    /// anything else is merely deactivated. Permanent effects are untouched.
    pub fn tick(&mut self) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        let mut removed = Vec::new();

        for (&kind, effect) in self.effects.iter_mut() {
            if !effect.active {
                if let Some(delay) = effect.activates_in {
                    if delay <= 1 {
                        effect.active = true;
                        effect.activates_in = None;
                        changes.push(StatusChange::Activated(kind));
                    } else {
                        effect.activates_in = Some(delay - 1);
                    }
                }
                continue;
            }

            let Some(turns) = effect.turns_remaining else {
                continue;
            };
            let left = turns.saturating_sub(1);
            effect.turns_remaining = Some(left);
            if left == 0 {
                if kind == StatusEffectKind::Shaken {
                    removed.push(kind);
                    changes.push(StatusChange::Removed(kind));
                } else {
                    effect.active = false;
                    changes.push(StatusChange::Expired(kind));
                }
            }
        }

        for kind in removed {
            self.effects.remove(&kind);
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_effect_never_expires() {
        let mut effects = StatusEffects::default();
        effects.activate(StatusEffectKind::Sanctions);
        for _ in 0..50 {
            assert!(effects.tick().is_empty());
        }
        assert!(effects.is_active(StatusEffectKind::Sanctions));
    }

    #[test]
    fn delayed_shaken_activates_then_is_deleted() {
        let mut effects = StatusEffects::default();
        effects.insert(StatusEffectKind::Shaken, StatusEffect::delayed(1, 2));
        assert!(!effects.is_active(StatusEffectKind::Shaken));

        assert_eq!(effects.tick(), vec![StatusChange::Activated(StatusEffectKind::Shaken)]);
        assert!(effects.is_active(StatusEffectKind::Shaken));

        assert!(effects.tick().is_empty());
        assert!(effects.is_active(StatusEffectKind::Shaken));

        assert_eq!(effects.tick(), vec![StatusChange::Removed(StatusEffectKind::Shaken)]);
        assert!(effects.get(StatusEffectKind::Shaken).is_none());
    }

    #[test]
    fn other_timed_effects_only_deactivate() {
        let mut effects = StatusEffects::default();
        effects.insert(StatusEffectKind::Disillusioned, StatusEffect::timed(1));
        assert_eq!(
            effects.tick(),
            vec![StatusChange::Expired(StatusEffectKind::Disillusioned)]
        );
        let record = effects.get(StatusEffectKind::Disillusioned).unwrap();
        assert!(!record.active);
        assert_eq!(record.turns_remaining, Some(0));
    }

    #[test]
    fn longer_delay_counts_down() {
        let mut effects = StatusEffects::default();
        effects.insert(StatusEffectKind::Shaken, StatusEffect::delayed(3, 1));
        effects.tick();
        assert_eq!(effects.get(StatusEffectKind::Shaken).unwrap().activates_in, Some(2));
        effects.tick();
        effects.tick();
        assert!(effects.is_active(StatusEffectKind::Shaken));
    }

    #[test]
    fn unknown_key_is_ignored() {
        let mut effects = StatusEffects::default();
        assert!(!effects.activate_key("cursed"));
        assert_eq!(effects.iter().count(), 0);
        assert!(effects.activate_key("disillusioned"));
        assert!(effects.is_active(StatusEffectKind::Disillusioned));
    }
}
