//! 几何检测：整帧三角形数与单模型三角形数

use crate::analysis::aggregators::extract_model_stats;
use crate::analysis::{Detector, DetectorResult, Issue, IssueKind};
use crate::config::GeometryThresholds;
use crate::frame::DrawCall;

/// 整帧三角形数（`vertex_count / 3` 逐个饱和相加）
pub fn total_triangles(draws: &[DrawCall]) -> u64 {
    draws
        .iter()
        .fold(0u64, |acc, draw| acc.saturating_add(draw.triangle_count()))
}

/// 整帧三角形数检测
#[derive(Debug, Clone)]
pub struct TriangleCountDetector {
    thresholds: GeometryThresholds,
}

impl TriangleCountDetector {
    pub const NAME: &'static str = "triangle_count";

    pub fn new(thresholds: GeometryThresholds) -> Self {
        Self { thresholds }
    }
}

impl Detector for TriangleCountDetector {
    type Input = [DrawCall];

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, draws: &[DrawCall]) -> DetectorResult<Vec<Issue>> {
        let total = total_triangles(draws);
        let max = self.thresholds.max_triangles;
        if total <= max {
            return Ok(Vec::new());
        }

        Ok(vec![Issue::critical(
            IssueKind::ExcessiveTriangles,
            format!(
                "Triangle count {} exceeds threshold {}; add LODs or cull hidden geometry",
                total, max
            ),
            "Frame",
        )])
    }
}

/// 单模型三角形数检测
#[derive(Debug, Clone)]
pub struct ModelStatsDetector {
    thresholds: GeometryThresholds,
}

impl ModelStatsDetector {
    pub const NAME: &'static str = "model_stats";

    pub fn new(thresholds: GeometryThresholds) -> Self {
        Self { thresholds }
    }
}

impl Detector for ModelStatsDetector {
    type Input = [DrawCall];

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, draws: &[DrawCall]) -> DetectorResult<Vec<Issue>> {
        let max = self.thresholds.max_triangles_per_model;
        let table = extract_model_stats(draws);

        Ok(table
            .iter()
            .filter(|model| model.triangle_count > max)
            .map(|model| {
                Issue::warning(
                    IssueKind::HeavyModel,
                    format!(
                        "Model '{}' has {} triangles, exceeding threshold {} ({} draw calls)",
                        model.name, model.triangle_count, max, model.draw_calls
                    ),
                    format!("Model: {}", model.name),
                )
            })
            .collect())
    }
}
