//! 阈值配置模型
//!
//! 四组阈值（几何 / 着色器 / Pass / 内存）以及对应的部分覆盖结构。
//! 覆盖结构的每个字段都是 `Option`，合并时逐字段覆盖，未知字段在反序列化时直接报错。

use super::{ConfigError, ConfigResult};
use crate::frame::ShaderStage;
use crate::{impl_default, overlay_fields};
use serde::{Deserialize, Serialize};

/// 几何阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryThresholds {
    /// 每帧最大 Draw Call 数
    pub max_draw_calls: u64,

    /// 每帧最大三角形数
    pub max_triangles: u64,

    /// 单个模型最大三角形数
    pub max_triangles_per_model: u64,
}

impl_default!(GeometryThresholds {
    max_draw_calls: 1000,
    max_triangles: 100_000,
    max_triangles_per_model: 50_000,
});

/// 着色器阈值（按阶段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShaderThresholds {
    /// 顶点着色器最大指令数
    pub max_vs_instructions: u32,

    /// 片元着色器最大指令数
    pub max_fs_instructions: u32,

    /// 计算着色器最大指令数
    pub max_cs_instructions: u32,
}

impl_default!(ShaderThresholds {
    max_vs_instructions: 500,
    max_fs_instructions: 500,
    max_cs_instructions: 500,
});

impl ShaderThresholds {
    /// 获取指定阶段的指令上限
    pub fn limit_for(&self, stage: ShaderStage) -> u32 {
        match stage {
            ShaderStage::Vertex => self.max_vs_instructions,
            ShaderStage::Fragment => self.max_fs_instructions,
            ShaderStage::Compute => self.max_cs_instructions,
        }
    }
}

/// Pass 阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PassThresholds {
    /// 单个 Pass 最大耗时（毫秒）
    pub max_duration_ms: f64,

    /// 最大 Overdraw 比例
    pub max_overdraw_ratio: f64,

    /// 每帧最大状态切换次数
    pub max_switches_per_frame: u64,
}

impl_default!(PassThresholds {
    max_duration_ms: 1.0,
    max_overdraw_ratio: 2.5,
    max_switches_per_frame: 20,
});

/// 内存阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryThresholds {
    /// 纹理最大边长（像素）
    pub max_texture_size: u32,

    /// 是否要求使用压缩纹理
    pub require_compressed_textures: bool,
}

impl_default!(MemoryThresholds {
    max_texture_size: 4096,
    require_compressed_textures: false,
});

/// 完整阈值集
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdSet {
    pub geometry: GeometryThresholds,
    pub shader: ShaderThresholds,
    pub pass: PassThresholds,
    pub memory: MemoryThresholds,
}

impl ThresholdSet {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        let pass = &self.pass;
        if !pass.max_duration_ms.is_finite() || pass.max_duration_ms < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "pass.max_duration_ms must be a non-negative number, got {}",
                pass.max_duration_ms
            )));
        }
        if !pass.max_overdraw_ratio.is_finite() || pass.max_overdraw_ratio < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "pass.max_overdraw_ratio must be a non-negative number, got {}",
                pass.max_overdraw_ratio
            )));
        }
        if self.memory.max_texture_size == 0 {
            return Err(ConfigError::ValidationError(
                "memory.max_texture_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// 几何阈值覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeometryOverrides {
    pub max_draw_calls: Option<u64>,
    pub max_triangles: Option<u64>,
    pub max_triangles_per_model: Option<u64>,
}

/// 着色器阈值覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShaderOverrides {
    pub max_vs_instructions: Option<u32>,
    pub max_fs_instructions: Option<u32>,
    pub max_cs_instructions: Option<u32>,
}

/// Pass 阈值覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassOverrides {
    pub max_duration_ms: Option<f64>,
    pub max_overdraw_ratio: Option<f64>,
    pub max_switches_per_frame: Option<u64>,
}

/// 内存阈值覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryOverrides {
    pub max_texture_size: Option<u32>,
    pub require_compressed_textures: Option<bool>,
}

/// 调用方提供的部分阈值覆盖
///
/// 结构与 [`ThresholdSet`] 一一对应；未出现的组保持不变，
/// 出现的组按字段合并。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdOverrides {
    pub geometry: Option<GeometryOverrides>,
    pub shader: Option<ShaderOverrides>,
    pub pass: Option<PassOverrides>,
    pub memory: Option<MemoryOverrides>,
}

impl ThresholdOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML字符串解析覆盖项
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON字符串解析覆盖项
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn with_geometry(mut self, geometry: GeometryOverrides) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_shader(mut self, shader: ShaderOverrides) -> Self {
        self.shader = Some(shader);
        self
    }

    pub fn with_pass(mut self, pass: PassOverrides) -> Self {
        self.pass = Some(pass);
        self
    }

    pub fn with_memory(mut self, memory: MemoryOverrides) -> Self {
        self.memory = Some(memory);
        self
    }

    /// 是否没有任何覆盖组
    pub fn is_empty(&self) -> bool {
        self.geometry.is_none()
            && self.shader.is_none()
            && self.pass.is_none()
            && self.memory.is_none()
    }

    /// 逐字段合并到阈值集
    pub fn apply_to(&self, set: &mut ThresholdSet) {
        if let Some(geometry) = &self.geometry {
            overlay_fields!(
                set.geometry,
                geometry,
                [max_draw_calls, max_triangles, max_triangles_per_model]
            );
        }
        if let Some(shader) = &self.shader {
            overlay_fields!(
                set.shader,
                shader,
                [max_vs_instructions, max_fs_instructions, max_cs_instructions]
            );
        }
        if let Some(pass) = &self.pass {
            overlay_fields!(
                set.pass,
                pass,
                [max_duration_ms, max_overdraw_ratio, max_switches_per_frame]
            );
        }
        if let Some(memory) = &self.memory {
            overlay_fields!(
                set.memory,
                memory,
                [max_texture_size, require_compressed_textures]
            );
        }
    }
}
