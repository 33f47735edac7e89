use crate::structures::{BuildDescription, StepRecord};
use crate::tag::extract_tag;

/// Pipeline scaffolding steps that never appear in a report.
pub const BOOKKEEPING_STEPS: [&str; 2] = ["prolog", "pull-builder-image"];

pub fn is_bookkeeping(step_id: &str) -> bool {
    BOOKKEEPING_STEPS.contains(&step_id)
}

/// Maps every non-bookkeeping step of `build` to a `StepRecord`, keeping
/// step order. Status values pass through unvalidated.
pub fn normalize(build: &BuildDescription, tag_key: &str) -> Vec<StepRecord> {
    build
        .steps
        .iter()
        .filter(|s| !is_bookkeeping(&s.id))
        .map(|s| StepRecord {
            name: s.id.clone(),
            tag: extract_tag(&s.env, tag_key),
            build_id: build.id.clone(),
            status: s.status.clone(),
        })
        .collect()
}
