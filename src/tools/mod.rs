//! 外部工具边界
//!
//! 目前只有离线着色器周期分析器。检测器通过 [`ShaderCycleTool`] 调用它，
//! 测试中可以注入替身实现。

pub mod malioc;

pub use malioc::{parse_report, MaliocRunner};

use crate::frame::ShaderStage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 外部工具错误
#[derive(Error, Debug)]
pub enum ToolError {
    /// 工具不存在或无法启动（降级能力，而非分析失败）
    #[error("Tool unavailable: {0}")]
    Unavailable(String),

    #[error("Tool timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("Tool exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Tool produced unrecognized output: {0}")]
    InvalidOutput(String),

    #[error("Tool I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ToolError::Unavailable(_))
    }
}

/// 单个着色器的周期分析报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShaderCycleReport {
    pub work_registers: u32,
    pub uniform_registers: u32,
    pub stack_spilling: bool,

    pub arithmetic_cycles: f64,
    pub load_store_cycles: f64,
    pub varying_cycles: f64,
    pub texture_cycles: f64,
    /// 未直接给出时取各单元周期的最大值
    pub total_cycles: f64,
    pub shortest_path_cycles: Option<f64>,
    pub longest_path_cycles: Option<f64>,

    pub total_instructions: u32,
    pub arithmetic_instructions: u32,
    pub load_store_instructions: u32,
    pub texture_instructions: u32,
    pub branch_instructions: u32,
}

impl ShaderCycleReport {
    /// 是否为"复杂"着色器
    pub fn is_complex(&self, max_cycles: f64, max_registers: u32) -> bool {
        self.total_cycles > max_cycles || self.work_registers > max_registers
    }

    /// 瓶颈单元
    pub fn bound_unit(&self) -> &'static str {
        let units = [
            ("arithmetic", self.arithmetic_cycles),
            ("load/store", self.load_store_cycles),
            ("varying", self.varying_cycles),
            ("texture", self.texture_cycles),
        ];
        units
            .iter()
            .fold(("arithmetic", f64::MIN), |best, &(unit, cycles)| {
                if cycles > best.1 {
                    (unit, cycles)
                } else {
                    best
                }
            })
            .0
    }
}

/// 离线着色器周期分析工具
///
/// 实现必须有界返回：超时以 [`ToolError::Timeout`] 报告，而不是无限等待。
pub trait ShaderCycleTool: Send + Sync {
    fn name(&self) -> &str;

    fn analyze(&self, source: &str, stage: ShaderStage) -> Result<ShaderCycleReport, ToolError>;
}
