//! Throughput annotation for completed answers.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Matches a previously appended stats block anywhere in the text.
static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\n---\n \[[^\]]*\] \d+\.\d+ tokens/sec").expect("annotation pattern compiles")
});

/// Remove every stats block from `text`.
///
/// Stored answers may already carry a block from an earlier run, so
/// annotation always strips before appending.
pub fn strip(text: &str) -> String {
    ANNOTATION.replace_all(text, "").into_owned()
}

/// Fragments per second, or `0.0` when no time has elapsed.
pub fn throughput(fragments: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { fragments as f64 / secs } else { 0.0 }
}

/// Append a stats footer to `text`, replacing any existing one.
pub fn annotate(text: &str, model: &str, tokens_per_sec: f64) -> String {
    format!(
        "{}\n\n---\n [{model}] {tokens_per_sec:.1} tokens/sec",
        strip(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotate_appends_footer() {
        let out = annotate("The answer is 4.", "llama3", 12.34);
        assert_eq!(out, "The answer is 4.\n\n---\n [llama3] 12.3 tokens/sec");
    }

    #[test]
    fn annotate_is_idempotent() {
        let once = annotate("hello", "m1", 5.0);
        let twice = annotate(&once, "m1", 5.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn reannotation_replaces_stale_footer() {
        let old = annotate("hello", "m1", 5.0);
        let new = annotate(&old, "m2", 9.9);
        assert_eq!(new, "hello\n\n---\n [m2] 9.9 tokens/sec");
    }

    #[test]
    fn strip_removes_every_block() {
        let text = "a\n\n---\n [m] 1.0 tokens/sec\n\n---\n [n] 2.5 tokens/sec";
        assert_eq!(strip(text), "a");
    }

    #[test]
    fn strip_leaves_unannotated_text_alone() {
        assert_eq!(strip("plain answer"), "plain answer");
        assert_eq!(strip("--- not a footer ---"), "--- not a footer ---");
    }

    #[test]
    fn zero_elapsed_reports_zero() {
        assert_eq!(throughput(40, Duration::ZERO), 0.0);
    }

    #[test]
    fn throughput_is_fragments_per_second() {
        let tps = throughput(30, Duration::from_secs(2));
        assert!((tps - 15.0).abs() < f64::EPSILON);
    }
}
