//! Pure markdown transformation engine.
//!
//! # Responsibility
//! - Locate headings and their sections by line-oriented matching.
//! - Merge content below headings, extract and prune checklist tasks.
//! - Expand embeddable tokens and daily-note template placeholders.
//!
//! # Invariants
//! - Every function here is synchronous, side-effect free and owns no state.
//! - Not-found conditions are returned as `Option`/outcome values, never errors.
//! - No document model is built; each operation re-scans the text it gets.

pub mod embed;
pub mod fuzzy;
pub mod heading;
pub mod merge;
pub mod moment;
pub mod tasks;
pub mod template;
pub mod title;

pub use embed::{
    expand, expand_date, expand_date_for, expand_dotw, expand_dotw_for, expand_for, expand_previous,
    expand_previous_for, ReferenceDate,
};
pub use heading::{depth_of, extract_section, list_headings, trim_blank_lines};
pub use merge::{merge_at_heading, MergeOutcome};
pub use moment::{format_moment, parse_moment};
pub use tasks::{extract_incomplete_tasks, prune_empty_task_lines};
pub use title::{apply_day_title, day_title, day_title_for};
