//! Prompt assembly under a character budget.

use crate::history::Turn;

/// Fixed allowance for the `User:` / `Assistant:` labels and newlines
/// wrapped around the live prompt.
const LABEL_OVERHEAD: usize = 20;

/// Assembles a full prompt from an instruction, prior turns, and the
/// live user prompt, without exceeding a fixed character budget.
///
/// The instruction and the live prompt are always included whole; only
/// history is trimmed. Turns are admitted newest-first as whole units,
/// then rendered oldest-first, so the prompt always carries a contiguous
/// suffix of the conversation.
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    budget: usize,
}

impl ContextBuilder {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// Build the full prompt string.
    pub fn build(&self, instruction: &str, turns: &[Turn], prompt: &str) -> String {
        let mut full = format!("{instruction}\n\n");
        let base = full.len() + prompt.len() + LABEL_OVERHEAD;
        let available = self.budget.saturating_sub(base);

        let mut history = String::new();
        for turn in turns.iter().rev() {
            let rendered = format!("User: {}\nAssistant: {}\n\n", turn.question, turn.answer);
            if history.len() + rendered.len() > available {
                break;
            }
            history.insert_str(0, &rendered);
        }

        full.push_str(&history);
        full.push_str("User: ");
        full.push_str(prompt);
        full.push_str("\nAssistant:");
        full
    }
}
