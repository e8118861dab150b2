use crate::*;

mod options;

pub(crate) fn doc(body: &str) -> Document {
    Document::parse_html(&format!("<!DOCTYPE html><html><head></head><body>{body}</body></html>"))
}

pub(crate) fn one(doc: &Document, selector: &str) -> NodeId {
    let found = doc.select(selector).unwrap();
    assert_eq!(found.len(), 1, "expected exactly one match for {selector}");
    found[0]
}

pub(crate) fn applied(outcome: &Outcome) -> (NodeId, &[NodeId], usize) {
    match outcome {
        Outcome::Applied {
            container,
            overlays,
            skipped_areas,
        } => (*container, overlays.as_slice(), *skipped_areas),
        Outcome::Skipped { reason } => panic!("expected overlays, got skip: {reason}"),
    }
}

pub(crate) fn skipped(outcome: &Outcome) -> &SkipReason {
    match outcome {
        Outcome::Skipped { reason } => reason,
        Outcome::Applied { .. } => panic!("expected a skip, got {outcome:?}"),
    }
}
