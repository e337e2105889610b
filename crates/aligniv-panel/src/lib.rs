//! User-month panel construction: topical alignment, the joined analysis
//! panel, and the synthetic influencer treatment with its instrument.

pub mod assemble;
pub mod export;
pub mod influence;
pub mod topical;

pub use assemble::{assemble_panel, pivot_event_counts, EventCounts};
pub use export::{panel_header, write_panel, write_panel_csv, PANEL_FILE};
pub use influence::{
    assign_influencers, augment_panel, influencer_count, InfluencerAssignment, InstrumentSeries,
};
pub use topical::{
    alignment_score, community_profiles, compute_topical_alignment, user_topic_profiles,
};
