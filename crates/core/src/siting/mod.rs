//! Site selection: clustering, rectangle search, ranking and turbine layout

pub mod cluster;
pub mod placement;
pub mod rectangle;
pub mod selector;

pub use cluster::{find_clusters, threshold_mask, Cell};
pub use placement::{place, spiral_offsets};
pub use rectangle::{column_runs, find_rectangles, CandidateRectangle};
pub use selector::{
    find_candidate_areas, rank_candidate_areas, required_cells, score_rectangle, CandidateArea,
    SiteSelection, SiteSelector,
};
