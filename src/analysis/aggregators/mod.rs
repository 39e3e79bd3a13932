//! 顺序聚合器
//!
//! 对有序 Draw Call 序列做单次前向遍历的纯函数。

pub mod model_stats;
pub mod switches;

pub use model_stats::{
    extract_model_stats, extract_model_stats_in_passes, infer_model_name, ModelStats, ModelStatsTable,
};
pub use switches::{tally_switches, SwitchTally};
