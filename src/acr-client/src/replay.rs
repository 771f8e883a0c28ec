//! Replaying a history entry into the form it came from.

use crate::history::HistoryEntry;
use crate::views::View;

/// Instruction to switch to a view and populate its inputs.
///
/// Empty fields leave the target form's current value untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayCommand {
    LoadReview {
        code: String,
        language: String,
    },
    LoadGenerate {
        description: String,
        language: String,
        code: String,
    },
}

impl ReplayCommand {
    /// View that must become active before the inputs are applied.
    pub fn target(&self) -> View {
        match self {
            Self::LoadReview { .. } => View::Review,
            Self::LoadGenerate { .. } => View::Generate,
        }
    }
}

/// Build the replay command for a chosen entry. Issues no request.
pub fn select(entry: &HistoryEntry) -> ReplayCommand {
    match entry {
        HistoryEntry::Review { code, language, .. } => ReplayCommand::LoadReview {
            code: code.clone(),
            language: language.clone(),
        },
        HistoryEntry::Generate {
            description,
            code,
            language,
            ..
        } => ReplayCommand::LoadGenerate {
            description: description.clone(),
            language: language.clone(),
            code: code.clone(),
        },
    }
}
