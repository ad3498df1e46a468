use rand::RngCore;

use super::signal::Signal;
use crate::config::GameConfig;
use crate::content::EventCatalog;
use crate::model::GameState;

/// Context passed to each system during a turn advance.
///
/// Bundled so new inputs can be added without changing the `TurnSystem`
/// trait signature.
pub struct TurnContext<'a> {
    pub state: &'a mut GameState,
    pub catalog: &'a EventCatalog,
    pub config: &'a GameConfig,
    pub rng: &'a mut dyn RngCore,
    /// Systems push notifications here.
    pub signals: &'a mut Vec<Signal>,
}

impl TurnContext<'_> {
    pub fn emit(&mut self, kind: super::signal::SignalKind) {
        let turn = self.state.date.turn();
        self.signals.push(Signal { turn, kind });
    }
}
