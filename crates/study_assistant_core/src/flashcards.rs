//! crates/study_assistant_core/src/flashcards.rs
//!
//! Best-effort parser for the `Question - Answer` flashcard line format.

use tracing::debug;

use crate::domain::{Flashcard, FlashcardParse};

/// Separates the question from the answer. Only the first occurrence counts.
pub const DELIMITER: char = '-';

/// Parses one card per line, splitting on the first [`DELIMITER`].
///
/// Lines without a delimiter are skipped and counted in `dropped_lines`;
/// blank lines are ignored without being counted.
pub fn parse_flashcards(raw: &str) -> FlashcardParse {
    let mut parse = FlashcardParse::default();

    for (index, line) in raw.lines().enumerate() {
        match line.split_once(DELIMITER) {
            Some((question, answer)) => {
                parse.cards.push(Flashcard::new(question.trim(), answer.trim()));
            }
            None if line.trim().is_empty() => {}
            None => {
                parse.dropped_lines += 1;
                debug!("Dropping flashcard line {} with no delimiter: {:?}", index + 1, line);
            }
        }
    }

    if parse.dropped_lines > 0 {
        debug!(
            "Parsed {} flashcard(s), dropped {} line(s)",
            parse.cards.len(),
            parse.dropped_lines
        );
    }
    parse
}

/// Renders cards back into the line format.
pub fn format_flashcards(cards: &[Flashcard]) -> String {
    cards
        .iter()
        .map(|card| format!("{} {} {}", card.question, DELIMITER, card.answer))
        .collect::<Vec<_>>()
        .join("\n")
}
