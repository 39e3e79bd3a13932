/// 阈值配置系统
///
/// 提供阈值模型、内置预设、部分覆盖合并，以及分析器的运行设置（TOML/JSON）
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod presets;
pub mod thresholds;

pub use presets::{PresetDefinition, PresetResolver};
pub use thresholds::{
    GeometryOverrides, GeometryThresholds, MemoryOverrides, MemoryThresholds, PassOverrides,
    PassThresholds, ShaderOverrides, ShaderThresholds, ThresholdOverrides, ThresholdSet,
};

use crate::impl_default;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 未知预设
    #[error("Unknown preset '{name}' (available: {available})")]
    PresetNotFound { name: String, available: String },
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误（包括未知组名或字段名）
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 着色器周期分析（外部离线编译器）设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShaderCycleSettings {
    /// 是否启用（默认关闭）
    pub enabled: bool,

    /// 显式指定的编译器路径
    pub tool_path: Option<PathBuf>,

    /// 目标 GPU
    pub target_gpu: String,

    /// 单次调用超时（毫秒）
    pub timeout_ms: u64,

    /// 最大周期数
    pub max_cycles: f64,

    /// 最大工作寄存器数
    pub max_registers: u32,

    /// 最大纹理采样数
    pub max_texture_samples: u32,

    /// 最大分支指令数
    pub max_branches: u32,
}

impl_default!(ShaderCycleSettings {
    enabled: false,
    tool_path: None,
    target_gpu: "Mali-G78".to_string(),
    timeout_ms: 30_000,
    max_cycles: 50.0,
    max_registers: 32,
    max_texture_samples: 8,
    max_branches: 10,
});

impl ShaderCycleSettings {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "shader_cycles.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if !self.max_cycles.is_finite() || self.max_cycles < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "shader_cycles.max_cycles must be a non-negative number, got {}",
                self.max_cycles
            )));
        }
        Ok(())
    }
}

/// 分析器运行设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerSettings {
    /// 预设名称
    pub preset: Option<String>,

    /// 阈值覆盖
    pub overrides: ThresholdOverrides,

    /// 着色器周期分析
    pub shader_cycles: ShaderCycleSettings,
}

impl AnalyzerSettings {
    /// 创建默认设置
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn with_overrides(mut self, overrides: ThresholdOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_shader_cycles(mut self, shader_cycles: ShaderCycleSettings) -> Self {
        self.shader_cycles = shader_cycles;
        self
    }

    /// 从TOML文件加载设置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析设置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON字符串解析设置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 解析最终阈值集
    pub fn resolve_thresholds(&self) -> ConfigResult<ThresholdSet> {
        let overrides = (!self.overrides.is_empty()).then_some(&self.overrides);
        PresetResolver::resolve(self.preset.as_deref(), overrides)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.shader_cycles.validate()?;
        self.resolve_thresholds().map(|_| ())
    }
}
