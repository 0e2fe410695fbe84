//! Human-readable collision reports

use crate::collision::Collisions;

/// Summarize collisions; with `details`, list every conflicting pair
pub fn format_collision_report(collisions: &Collisions, details: bool) -> String {
    let mut output = String::new();

    output.push_str("=== Signature Collision Report ===\n\n");
    if collisions.is_empty() {
        output.push_str("No collisions: every reading maps to a single failure set\n");
        return output;
    }

    output.push_str(&format!(
        "{} reading(s) produced by more than one failure set\n",
        collisions.len()
    ));
    if !details {
        return output;
    }

    output.push('\n');
    output.push_str(&format!(
        "{:>12}  {:>12}  {:<30}  {:<30}\n",
        "Reading", "First Seen", "Original Failures", "Conflicting Failures"
    ));
    output.push_str(&format!("{}\n", "-".repeat(92)));
    for collision in collisions.values() {
        output.push_str(&format!(
            "{:>12}  {:>12}  {:<30}  {:<30}\n",
            collision.reading,
            collision.original_reading,
            describe(&collision.original),
            describe(&collision.conflicting)
        ));
    }

    output
}

fn describe(failed: &[String]) -> String {
    if failed.is_empty() {
        "(none)".to_string()
    } else {
        failed.join(",")
    }
}
