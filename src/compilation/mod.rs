//! Local stream compilation files
//!
//! Two layouts are kept: an object keyed `"<kind>_<id>"` and a list of
//! bundles tagged with their `id`. Both skip activities already stored, so
//! re-running with the same IDs adds nothing.

mod collection;
mod ids;
mod keyed;
mod recent;

pub use collection::{collect_streams, CollectSummary, StreamCollection};
pub use ids::{
    activity_ids, dedup_ids, hr_activity_ids, parse_id_list, read_id_input, HrActivityIds,
};
pub use keyed::{activity_kind, compile_streams, CompileSummary, StreamCompilation};
pub use recent::{export_api_streams, export_local_streams, most_recent_activity};
