//! Blocklist filtering and note annotation.

use crate::config::note_key;
use crate::model::EventRecord;
use std::collections::BTreeMap;

pub const NOTES_MARKER: &str = "--- Notes ---";

#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Retained events, in input order.
    pub events: Vec<EventRecord>,
    pub dropped: usize,
    pub annotated: usize,
}

/// Drops every event whose title exactly equals a blocklist entry and attaches
/// the matching note (looked up by lower-cased title) to the rest.
pub fn filter(
    events: Vec<EventRecord>,
    blocklist: &[String],
    notes: &BTreeMap<String, String>,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for mut event in events {
        if is_blocklisted(&event.title, blocklist) {
            outcome.dropped += 1;
            continue;
        }
        if !event.title.is_empty()
            && let Some(note) = notes.get(&note_key(&event.title))
            && !note.is_empty()
        {
            let text = annotate(&event.description, note);
            event.set_description(text);
            outcome.annotated += 1;
        }
        outcome.events.push(event);
    }

    outcome
}

fn is_blocklisted(title: &str, blocklist: &[String]) -> bool {
    blocklist.iter().any(|b| b == title)
}

/// Returns `description` with `note` as its notes section. An existing
/// section is replaced, so annotating twice yields the same text.
pub fn annotate(description: &str, note: &str) -> String {
    let base = strip_notes(description);
    if base.is_empty() {
        format!("{}\n{}", NOTES_MARKER, note)
    } else {
        format!("{}\n\n{}\n{}", base, NOTES_MARKER, note)
    }
}

/// The part of `description` before its notes section.
fn strip_notes(description: &str) -> &str {
    if description.starts_with(NOTES_MARKER) {
        return "";
    }
    let sep = format!("\n\n{}", NOTES_MARKER);
    match description.find(&sep) {
        Some(idx) => &description[..idx],
        None => description,
    }
}
