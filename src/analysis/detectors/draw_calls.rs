//! Draw Call 数量检测

use crate::analysis::{Detector, DetectorResult, Issue, IssueKind};
use crate::config::GeometryThresholds;
use crate::frame::FrameSummary;

/// 整帧 Draw Call 数量检测（必需检测器）
#[derive(Debug, Clone)]
pub struct DrawCallCountDetector {
    thresholds: GeometryThresholds,
}

impl DrawCallCountDetector {
    pub const NAME: &'static str = "draw_call_count";

    pub fn new(thresholds: GeometryThresholds) -> Self {
        Self { thresholds }
    }
}

impl Detector for DrawCallCountDetector {
    type Input = FrameSummary;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, summary: &FrameSummary) -> DetectorResult<Vec<Issue>> {
        let count = summary.total_draw_calls;
        let max = self.thresholds.max_draw_calls;
        if count <= max {
            return Ok(Vec::new());
        }

        Ok(vec![Issue::critical(
            IssueKind::ExcessiveDrawCalls,
            format!(
                "Draw call count {} exceeds threshold {}; merge batches or use instancing",
                count, max
            ),
            "Frame",
        )])
    }
}
