//! 着色器指令数检测

use crate::analysis::{Detector, DetectorResult, Issue, IssueKind};
use crate::config::ShaderThresholds;
use crate::frame::ShaderRecord;
use std::collections::BTreeMap;

/// 按阶段上限检查每个着色器的指令数
#[derive(Debug, Clone)]
pub struct ShaderInstructionDetector {
    thresholds: ShaderThresholds,
}

impl ShaderInstructionDetector {
    pub const NAME: &'static str = "shader_instructions";

    pub fn new(thresholds: ShaderThresholds) -> Self {
        Self { thresholds }
    }
}

impl Detector for ShaderInstructionDetector {
    type Input = BTreeMap<String, ShaderRecord>;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, shaders: &BTreeMap<String, ShaderRecord>) -> DetectorResult<Vec<Issue>> {
        Ok(shaders
            .iter()
            .filter_map(|(name, shader)| {
                let limit = self.thresholds.limit_for(shader.stage);
                (shader.instruction_count > limit).then(|| {
                    Issue::warning(
                        IssueKind::ExpensiveShader,
                        format!(
                            "Shader '{}' ({}) has {} instructions, exceeding threshold {}",
                            name, shader.stage, shader.instruction_count, limit
                        ),
                        format!("Shader: {}", name),
                    )
                })
            })
            .collect())
    }
}
