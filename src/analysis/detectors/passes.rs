//! Pass 检测：耗时与状态切换

use crate::analysis::aggregators::tally_switches;
use crate::analysis::{Detector, DetectorError, DetectorResult, Issue, IssueKind};
use crate::config::PassThresholds;
use crate::frame::{DrawCall, RenderPass};

/// Pass 耗时检测（必需检测器）
#[derive(Debug, Clone)]
pub struct PassDurationDetector {
    thresholds: PassThresholds,
}

impl PassDurationDetector {
    pub const NAME: &'static str = "pass_duration";

    pub fn new(thresholds: PassThresholds) -> Self {
        Self { thresholds }
    }
}

impl Detector for PassDurationDetector {
    type Input = [RenderPass];

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, passes: &[RenderPass]) -> DetectorResult<Vec<Issue>> {
        let max = self.thresholds.max_duration_ms;
        let mut issues = Vec::new();

        for pass in passes {
            if !pass.duration_ms.is_finite() || pass.duration_ms < 0.0 {
                return Err(DetectorError::InvalidInput(format!(
                    "pass '{}' has invalid duration {}",
                    pass.name, pass.duration_ms
                )));
            }
            if pass.duration_ms > max {
                issues.push(Issue::critical(
                    IssueKind::SlowPass,
                    format!(
                        "Pass '{}' took {}ms, exceeding threshold {}ms",
                        pass.name, pass.duration_ms, max
                    ),
                    format!("Pass: {}", pass.name),
                ));
            }
        }

        Ok(issues)
    }
}

/// 状态切换总数检测
#[derive(Debug, Clone)]
pub struct PassSwitchDetector {
    thresholds: PassThresholds,
}

impl PassSwitchDetector {
    pub const NAME: &'static str = "pass_switches";

    pub fn new(thresholds: PassThresholds) -> Self {
        Self { thresholds }
    }
}

impl Detector for PassSwitchDetector {
    type Input = [DrawCall];

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, draws: &[DrawCall]) -> DetectorResult<Vec<Issue>> {
        let tally = tally_switches(draws);
        let max = self.thresholds.max_switches_per_frame;
        if tally.total <= max {
            return Ok(Vec::new());
        }

        Ok(vec![Issue::warning(
            IssueKind::PassSwitches,
            format!(
                "State switches {} exceed threshold {} (markers {}, framebuffers {}, textures {}, shaders {})",
                tally.total,
                max,
                tally.marker_switches,
                tally.framebuffer_switches,
                tally.texture_binding_changes,
                tally.shader_switches
            ),
            "Frame",
        )])
    }
}
