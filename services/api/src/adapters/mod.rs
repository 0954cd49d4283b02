pub mod json_stats;
pub mod pdf;
pub mod text_extractor;

pub use json_stats::JsonStatsStore;
pub use text_extractor::DocumentExtractor;
