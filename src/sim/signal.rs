use serde::{Deserialize, Serialize};

use crate::model::{Allocation, EventType, GameOverReason};

/// A notification for whoever drives the game, e.g. a UI deciding when to
/// redraw. Stamped with the turn it was raised on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub turn: u32,
    pub kind: SignalKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalKind {
    /// Any mutating command completed.
    StateChanged,

    /// A new event is waiting to be shown.
    EventPresented { event_type: EventType },

    /// An allocation took effect.
    AllocationApplied { allocation: Allocation },

    /// The superpersuasion effect knocked out an allocation for this turn.
    AllocationDisabled { allocation: Allocation },

    /// The game reached a terminal condition.
    GameOver { reason: GameOverReason },

    /// An endgame narrative phase was revealed.
    EndgamePhase { phase: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let signal = Signal {
            turn: 3,
            kind: SignalKind::GameOver {
                reason: GameOverReason::TerminalRisk,
            },
        };
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["turn"], 3);
        assert_eq!(json["kind"]["type"], "game_over");
        assert_eq!(json["kind"]["reason"], "doom-100");

        let back: Signal = serde_json::from_value(json).unwrap();
        assert_eq!(back, signal);
    }
}
