//! Graph analysis: entry-point selection and reachability

pub mod entry_points;
pub mod reachability;

pub use entry_points::{find_entry_points, heuristic_entry_points};
pub use reachability::{
    DoubleReference, Reachability, analyze, find_double_references, find_orphans,
};
