//! 纹理检测：尺寸与压缩格式

use crate::analysis::{Detector, DetectorResult, Issue, IssueKind};
use crate::config::MemoryThresholds;
use crate::frame::TextureRecord;

/// 纹理尺寸检测
#[derive(Debug, Clone)]
pub struct TextureSizeDetector {
    thresholds: MemoryThresholds,
}

impl TextureSizeDetector {
    pub const NAME: &'static str = "texture_size";

    pub fn new(thresholds: MemoryThresholds) -> Self {
        Self { thresholds }
    }
}

impl Detector for TextureSizeDetector {
    type Input = [TextureRecord];

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, textures: &[TextureRecord]) -> DetectorResult<Vec<Issue>> {
        let max = self.thresholds.max_texture_size;

        Ok(textures
            .iter()
            .filter(|texture| texture.width > max || texture.height > max)
            .map(|texture| {
                Issue::warning(
                    IssueKind::LargeTexture,
                    format!(
                        "Texture '{}' is {}x{}, exceeding threshold {} (~{:.1} MB)",
                        texture.name,
                        texture.width,
                        texture.height,
                        max,
                        texture.estimated_mb()
                    ),
                    format!("Texture: {}", texture.name),
                )
            })
            .collect())
    }
}

/// 未压缩纹理检测
///
/// 只在 `require_compressed_textures` 打开时生效，深度/模板格式不参与检查。
#[derive(Debug, Clone)]
pub struct TextureCompressionDetector {
    thresholds: MemoryThresholds,
}

impl TextureCompressionDetector {
    pub const NAME: &'static str = "texture_compression";

    pub fn new(thresholds: MemoryThresholds) -> Self {
        Self { thresholds }
    }
}

impl Detector for TextureCompressionDetector {
    type Input = [TextureRecord];

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, textures: &[TextureRecord]) -> DetectorResult<Vec<Issue>> {
        if !self.thresholds.require_compressed_textures {
            return Ok(Vec::new());
        }

        Ok(textures
            .iter()
            .filter(|texture| !texture.is_compressed() && !texture.is_depth_stencil())
            .map(|texture| {
                Issue::suggestion(
                    IssueKind::UncompressedTexture,
                    format!(
                        "Texture '{}' uses uncompressed format {} (~{:.1} MB); use ASTC or ETC2",
                        texture.name,
                        texture.format,
                        texture.estimated_mb()
                    ),
                    format!("Texture: {}", texture.name),
                )
            })
            .collect())
    }
}
