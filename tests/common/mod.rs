#![allow(dead_code)]

use critical_path::content::EventCatalog;
use critical_path::model::{Allocation, EventTemplate, EventType, Sector};
use critical_path::{CommandError, Game};

/// Catalog holding only `templates`, with the fallback's incident texts and
/// sanctions event.
pub fn catalog_with(templates: Vec<EventTemplate>) -> EventCatalog {
    EventCatalog {
        default_event_templates: templates,
        ..EventCatalog::fallback()
    }
}

pub fn weighted(name: &str, weight: f64) -> EventTemplate {
    let mut template = EventTemplate::new(EventType::Custom(name.to_string()), format!("{name} happens."));
    template.weight = Some(weight);
    template
}

/// Pick the first choice the game accepts, through every stage.
pub fn resolve_event(game: &mut Game) {
    for _ in 0..4 {
        let Some(event) = game.current_event() else { return };
        if !event.needs_decision() {
            return;
        }
        let count = event.choices.len();
        let chosen = (0..count).any(|i| game.choose_event_option(i).is_ok());
        assert!(chosen, "no acceptable choice on {}", event_label(game));
        if game.state().is_game_over() {
            return;
        }
    }
    panic!("event still pending after four stages");
}

fn event_label(game: &Game) -> String {
    game.current_event()
        .map(|e| e.event_type.to_string())
        .unwrap_or_default()
}

/// Spend the turn on the first allocation in `preferred` the game accepts,
/// falling back to any available one.
pub fn allocate(game: &mut Game, preferred: &[Allocation]) -> Allocation {
    let mut candidates: Vec<Allocation> = preferred.to_vec();
    candidates.extend(game.available_allocations());
    for allocation in candidates {
        match game.select_allocation(allocation) {
            Ok(_) => return allocation,
            Err(CommandError::AllocationAlreadySelected(existing)) => return existing,
            Err(_) => continue,
        }
    }
    panic!("no allocation accepted");
}

/// Resolve the event, allocate, and advance. Returns false once the game is over.
pub fn play_turn(game: &mut Game, preferred: &[Allocation]) -> bool {
    resolve_event(game);
    if game.state().is_game_over() {
        return false;
    }
    allocate(game, preferred);
    game.advance_turn().expect("advance after allocation and resolution");
    !game.state().is_game_over()
}

pub const RUSH: [Allocation; 2] = [Allocation::Sector(Sector::Capability), Allocation::Sector(Sector::Revenue)];
pub const CAREFUL: [Allocation; 2] = [Allocation::Sector(Sector::Safety), Allocation::Sector(Sector::Revenue)];
