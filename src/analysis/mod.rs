//! 分析引擎
//!
//! 检测器框架、顺序聚合器、具体检测器、编排器与结果记录。

pub mod aggregators;
pub mod detector;
pub mod detectors;
pub mod issue;
pub mod orchestrator;
pub mod result;

pub use aggregators::{ModelStats, ModelStatsTable, SwitchTally};
pub use detector::{BoundDetector, Detector, DetectorError, DetectorResult, FrameCheck};
pub use issue::{Impact, Issue, IssueKind, Severity};
pub use orchestrator::{Analyzer, AnalyzerBuilder};
pub use result::{AnalysisResult, IssueBuckets};
