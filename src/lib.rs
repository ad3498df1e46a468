pub mod config;
pub mod content;
pub mod error;
pub mod game;
pub mod model;
pub mod scenario;
pub mod sim;
pub mod testutil;

pub use config::{ConfigError, GameConfig};
pub use content::{ContentError, ContentProvider, EventCatalog, JsonFileContent, StaticContent};
pub use error::CommandError;
pub use game::Game;
pub use model::{
    ActiveEvent, Allocation, EndgameResult, EventTemplate, EventType, GameOverReason, GameState,
    Project, Sector, StatusEffectKind, Technology, TurnPhase,
};
pub use sim::{Signal, SignalKind};
