//! The command surface a front end drives.
//!
//! A [`Game`] owns the config, the loaded catalog, the single [`GameState`]
//! and the random source. Every command validates before it mutates, so a
//! rejected command leaves the state exactly as it was. Content is loaded
//! once at construction, which means no command can observe a half-loaded
//! catalog.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::config::GameConfig;
use crate::content::{ContentProvider, EventCatalog};
use crate::error::CommandError;
use crate::model::{
    ActiveEvent, Allocation, EndgameResult, EventTemplate, GameState, TurnPhase,
};
use crate::sim::resources::effective_risk_percent;
use crate::sim::turn::{roll_superpersuasion, settle_phase};
use crate::sim::{
    AllocationOutcome, ChoiceResolution, GainTable, Signal, SignalKind, TurnSystem,
    apply_allocation, available_allocations, choose_event_option, default_systems,
    dispatch_systems, endgame_result, enter_endgame, event_pool, labor_budget, market_share,
    new_game_state, request_endgame_phase, sector_gains, select_next_event,
};

pub struct Game {
    config: GameConfig,
    catalog: EventCatalog,
    state: GameState,
    rng: Box<dyn RngCore>,
    systems: Vec<Box<dyn TurnSystem>>,
    signals: Vec<Signal>,
}

impl Game {
    /// Start a new game. A failing provider is replaced by the fallback
    /// catalog and an invalid config by the defaults.
    pub fn new(config: GameConfig, content: &dyn ContentProvider, mut rng: Box<dyn RngCore>) -> Self {
        let config = config.validated_or_default();
        let catalog = EventCatalog::load_or_fallback(content);
        let state = new_game_state(&config, rng.as_mut());
        let mut game = Self {
            config,
            catalog,
            state,
            rng,
            systems: default_systems(),
            signals: Vec::new(),
        };
        game.present_first_event();
        game
    }

    /// Start a new game driven by a `SmallRng` seeded from `config.seed`.
    pub fn with_seed(config: GameConfig, content: &dyn ContentProvider) -> Self {
        let rng = Box::new(SmallRng::seed_from_u64(config.seed));
        Self::new(config, content, rng)
    }

    /// Resume from an existing state. If no event is showing, one is drawn.
    pub fn from_state(
        config: GameConfig,
        catalog: EventCatalog,
        state: GameState,
        rng: Box<dyn RngCore>,
    ) -> Self {
        let mut game = Self {
            config: config.validated_or_default(),
            catalog,
            state,
            rng,
            systems: default_systems(),
            signals: Vec::new(),
        };
        if game.state.current_event.is_none() && !game.state.is_game_over() {
            game.present_first_event();
        } else {
            settle_phase(&mut game.state);
        }
        game
    }

    fn emit(&mut self, kind: SignalKind) {
        self.signals.push(Signal {
            turn: self.state.date.turn(),
            kind,
        });
    }

    fn present_first_event(&mut self) {
        let event = select_next_event(&mut self.state, &self.catalog, &self.config, self.rng.as_mut());
        let event_type = event.event_type.clone();
        self.state.current_event = Some(event);
        let disabled = roll_superpersuasion(&mut self.state, &self.config, self.rng.as_mut());
        settle_phase(&mut self.state);
        self.emit(SignalKind::EventPresented { event_type });
        if let Some(allocation) = disabled {
            self.emit(SignalKind::AllocationDisabled { allocation });
        }
        self.emit(SignalKind::StateChanged);
    }

    fn ensure_running(&self) -> Result<(), CommandError> {
        if self.state.is_game_over() {
            return Err(CommandError::GameOver);
        }
        Ok(())
    }

    fn rejected<T>(err: CommandError) -> Result<T, CommandError> {
        tracing::debug!(error = %err, "command rejected");
        Err(err)
    }

    // -- Commands --

    /// Spend this turn's labor on `allocation`. Effects apply immediately;
    /// only one allocation per turn.
    pub fn select_allocation(&mut self, allocation: Allocation) -> Result<AllocationOutcome, CommandError> {
        if let Err(err) = self.ensure_running() {
            return Self::rejected(err);
        }
        if let Some(existing) = self.state.selected_allocation {
            return Self::rejected(CommandError::AllocationAlreadySelected(existing));
        }
        let outcome = match apply_allocation(&mut self.state, &self.config, allocation) {
            Ok(outcome) => outcome,
            Err(err) => return Self::rejected(err),
        };
        self.state.selected_allocation = Some(allocation);
        self.state.allocation_applied = true;
        settle_phase(&mut self.state);
        self.emit(SignalKind::AllocationApplied { allocation });
        self.emit(SignalKind::StateChanged);
        Ok(outcome)
    }

    /// Resolve choice `index` on the current event. A choice that ends the
    /// game moves straight into the endgame.
    pub fn choose_event_option(&mut self, index: usize) -> Result<ChoiceResolution, CommandError> {
        if let Err(err) = self.ensure_running() {
            return Self::rejected(err);
        }
        let resolution = match choose_event_option(&mut self.state, &self.config, self.rng.as_mut(), index) {
            Ok(resolution) => resolution,
            Err(err) => return Self::rejected(err),
        };
        if let Some(reason) = resolution.endgame {
            enter_endgame(&mut self.state, &self.config, reason);
            self.emit(SignalKind::GameOver { reason });
        }
        settle_phase(&mut self.state);
        self.emit(SignalKind::StateChanged);
        Ok(resolution)
    }

    /// Close the turn: needs this turn's allocation and a resolved event.
    pub fn advance_turn(&mut self) -> Result<(), CommandError> {
        if let Err(err) = self.ensure_running() {
            return Self::rejected(err);
        }
        if self.state.selected_allocation.is_none() {
            return Self::rejected(CommandError::NoAllocation);
        }
        if self.state.current_event.as_ref().is_some_and(|e| e.needs_decision()) {
            return Self::rejected(CommandError::EventUnresolved);
        }

        self.state.phase = TurnPhase::TurnAdvancing;
        let signals = dispatch_systems(
            &mut self.state,
            &self.catalog,
            &self.config,
            &mut self.systems,
            self.rng.as_mut(),
        );
        self.signals.extend(signals);
        settle_phase(&mut self.state);
        self.emit(SignalKind::StateChanged);
        tracing::debug!(turn = self.state.date.turn(), phase = ?self.state.phase, "turn advanced");
        Ok(())
    }

    /// Reveal epilogue phase `phase` (1 to 4) and return its text.
    pub fn request_endgame_phase(&mut self, phase: u8) -> Result<String, CommandError> {
        match request_endgame_phase(&mut self.state, &self.config, self.rng.as_mut(), phase) {
            Ok(text) => {
                self.emit(SignalKind::EndgamePhase { phase });
                Ok(text)
            }
            Err(err) => Self::rejected(err),
        }
    }

    /// Throw the current game away and start over with the same config and
    /// catalog.
    pub fn reset_game(&mut self) {
        self.state = new_game_state(&self.config, self.rng.as_mut());
        self.present_first_event();
    }

    // -- Queries --

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    pub fn current_event(&self) -> Option<&ActiveEvent> {
        self.state.current_event.as_ref()
    }

    pub fn labor_budget(&self) -> u64 {
        labor_budget(&self.state, &self.config)
    }

    pub fn sector_gains(&self) -> GainTable {
        sector_gains(&self.state, &self.config, self.labor_budget())
    }

    pub fn available_allocations(&self) -> Vec<Allocation> {
        available_allocations(&self.state)
    }

    /// Templates that could be drawn right now.
    pub fn event_pool(&self) -> Vec<&EventTemplate> {
        event_pool(&self.state, &self.catalog, &self.config)
    }

    /// Adjusted risk, frozen once the game is over.
    pub fn adjusted_risk(&self) -> f64 {
        effective_risk_percent(&self.state)
    }

    pub fn market_share(&self) -> f64 {
        market_share(&self.state)
    }

    /// The scored epilogue. Computed on first call, identical afterwards.
    pub fn endgame_result(&mut self) -> Result<&EndgameResult, CommandError> {
        if !self.state.is_game_over() {
            return Err(CommandError::NotInEndgame);
        }
        Ok(endgame_result(&self.state, &self.config, self.rng.as_mut()))
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Take every notification raised since the last drain.
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }
}
