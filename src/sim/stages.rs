//! Events that take more than one decision to resolve.
//!
//! Each multi-stage event type owns a [`StageRecord`] in
//! `GameState::stages` for as long as it is in progress. Every stage keeps
//! the originating template, so later stages can still read its keyed texts.

use crate::model::{EventChoice, EventStage, EventType, GameState, StageData, StageRecord};

use super::variables::substitute;

/// Current record for `event_type`, or an empty one when nothing is staged.
pub fn stage_record(state: &GameState, event_type: &EventType) -> StageRecord {
    state.stages.get(event_type).cloned().unwrap_or_default()
}

/// Start (or restart) a stage and present it as the current event.
///
/// The current event's handler, template and variables carry over.
pub fn begin_stage(
    state: &mut GameState,
    event_type: &EventType,
    stage: EventStage,
    data: StageData,
    text: String,
    choices: Vec<EventChoice>,
) {
    state.stages.insert(
        event_type.clone(),
        StageRecord {
            current_stage: Some(stage),
            data,
        },
    );
    if let Some(event) = state.current_event.as_mut() {
        event.event_type = event_type.clone();
        event.text = text;
        event.choices = choices;
        event.is_multi_stage = true;
        event.stage = Some(stage);
        event.result_text = None;
    } else {
        tracing::warn!(event_type = %event_type, "stage started without a current event");
    }
}

/// Update only the record, leaving the presented event as it is.
pub fn init_stage(state: &mut GameState, event_type: &EventType, stage: EventStage, data: StageData) {
    state.stages.insert(
        event_type.clone(),
        StageRecord {
            current_stage: Some(stage),
            data,
        },
    );
}

/// Drop the record and mark the current event resolved.
pub fn complete_event(state: &mut GameState, event_type: &EventType, result_text: String) {
    state.stages.remove(event_type);
    if let Some(event) = state.current_event.as_mut() {
        event.result_text = Some(result_text);
    }
}

/// Keyed text from the current event's template, substituted with the
/// instance's variables. Missing keys fall back to `fallback`.
pub fn keyed_text(state: &GameState, key: &str, fallback: &str) -> String {
    let Some(event) = state.current_event.as_ref() else {
        return fallback.to_string();
    };
    match event.other_text(key) {
        Some(text) => substitute(text, &event.variables),
        None => {
            tracing::warn!(event_type = %event.event_type, key, "keyed event text not found");
            fallback.to_string()
        }
    }
}

/// Stage prompt text.
pub fn stage_text(state: &GameState, key: &str) -> String {
    keyed_text(state, key, "Stage text not found")
}

/// Completion text.
pub fn result_text(state: &GameState, key: &str) -> String {
    keyed_text(state, key, "Event completion text not found")
}
