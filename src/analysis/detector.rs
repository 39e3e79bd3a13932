//! 检测器框架
//!
//! [`Detector`] 是单条规则的能力契约：只拿到自己需要的阈值组和数据切片，
//! 纯函数式地返回问题列表。编排器通过 [`FrameCheck`] 以类型擦除的方式持有检测器，
//! 每个检测器都绑定一个从 [`FrameCapture`] 中选取数据切片的选择器。

use super::Issue;
use crate::frame::FrameCapture;
use crate::tools::ToolError;
use thiserror::Error;

/// 检测器错误
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Invalid detector input: {0}")]
    InvalidInput(String),

    #[error("External tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Internal detector error: {0}")]
    Internal(String),
}

pub type DetectorResult<T> = Result<T, DetectorError>;

/// 规则检测器
pub trait Detector {
    /// 检测器读取的数据切片类型
    type Input: ?Sized;

    /// 检测器名称
    fn name(&self) -> &'static str;

    /// 执行检测
    ///
    /// 不得修改输入；相同的输入与阈值总是得到相同的输出。
    fn detect(&self, input: &Self::Input) -> DetectorResult<Vec<Issue>>;

    /// 绑定数据选择器，得到可由编排器调度的检测项
    fn bind(
        self,
        select: for<'a> fn(&'a FrameCapture) -> Option<&'a Self::Input>,
    ) -> BoundDetector<Self>
    where
        Self: Sized,
    {
        BoundDetector {
            detector: self,
            select,
        }
    }
}

/// 类型擦除后的检测项
pub trait FrameCheck {
    fn name(&self) -> &str;

    /// 执行检测；所需数据缺失时返回 `None`（静默跳过）
    fn check(&self, frame: &FrameCapture) -> Option<DetectorResult<Vec<Issue>>>;
}

/// 绑定了数据选择器的检测器
pub struct BoundDetector<D: Detector> {
    detector: D,
    select: for<'a> fn(&'a FrameCapture) -> Option<&'a D::Input>,
}

impl<D: Detector> BoundDetector<D> {
    pub fn detector(&self) -> &D {
        &self.detector
    }
}

impl<D: Detector> FrameCheck for BoundDetector<D> {
    fn name(&self) -> &str {
        self.detector.name()
    }

    fn check(&self, frame: &FrameCapture) -> Option<DetectorResult<Vec<Issue>>> {
        let input = (self.select)(frame)?;
        Some(self.detector.detect(input))
    }
}
