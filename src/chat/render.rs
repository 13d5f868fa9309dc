//! Turns a transcript into display lines. Nothing here mutates state so
//! the same transcript always renders the same way.
use std::fmt;

use serde::Serialize;

use super::models::{Speaker, Transcript};

pub const USER_LABEL: &str = "Vous: ";
pub const ASSISTANT_LABEL: &str = "UltraIA: ";
pub const TYPING_INDICATOR: &str = "UltraIA est en train de taper...";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedTurn {
    pub index: usize,
    pub speaker: Speaker,
    pub label: &'static str,
    pub text: String,
}

impl fmt::Display for RenderedTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.label, self.text)
    }
}

fn label_for(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => USER_LABEL,
        // Errors show up where the assistant's reply would have been
        Speaker::Assistant | Speaker::Error => ASSISTANT_LABEL,
    }
}

pub fn render_transcript(transcript: &Transcript) -> Vec<RenderedTurn> {
    transcript
        .iter()
        .enumerate()
        .map(|(index, turn)| RenderedTurn {
            index,
            speaker: turn.speaker(),
            label: label_for(turn.speaker()),
            text: turn.text().to_string(),
        })
        .collect()
}

pub fn typing_indicator(pending: bool) -> Option<&'static str> {
    pending.then_some(TYPING_INDICATOR)
}
