//! Label-to-control association.
//!
//! Only explicit `<label for="x">` associations are honoured: the label's `for`
//! value must equal the `id` of an element in the same index.

use super::index::{Candidate, ElementIndex, Label};
use webship_common::protocol::ElementHandle;

/// Label text as compared against descriptors: trimmed, with one trailing colon removed.
///
/// `"  Username: "` → `"Username"`
pub fn normalize_label_text(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed.strip_suffix(':').unwrap_or(trimmed).trim_end()
}

/// Fill `label_text` of every candidate a label points at. The first label wins.
pub fn associate_labels(candidates: &mut [Candidate], labels: &[Label]) {
    for label in labels {
        let Some(for_id) = label.for_id.as_deref() else {
            continue;
        };
        if let Some(candidate) = candidates
            .iter_mut()
            .find(|c| c.id.as_deref() == Some(for_id) && c.label_text.is_none())
        {
            candidate.label_text = Some(label.text.clone());
        }
    }
}

/// Elements bound to labels whose normalized text equals `text`.
///
/// Labels without `for`, or whose `for` names no element, contribute nothing.
/// Two labels bound to the same element count once.
pub fn find_by_label_text<'a>(text: &str, index: &'a ElementIndex) -> Vec<&'a Candidate> {
    let mut seen: Vec<ElementHandle> = Vec::new();
    let mut found = Vec::new();

    for label in index.labels().filter(|l| normalize_label_text(&l.text) == text) {
        let Some(for_id) = label.for_id.as_deref() else {
            continue;
        };
        let Some(control) = index.by_id(for_id) else {
            continue;
        };
        if !seen.contains(&control.handle) {
            seen.push(control.handle);
            found.push(control);
        }
    }

    found
}
