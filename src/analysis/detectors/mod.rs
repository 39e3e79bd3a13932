//! 具体规则检测器
//!
//! 每个检测器只持有自己需要的阈值组，输入为帧数据中的一个切片。

pub mod draw_calls;
pub mod geometry;
pub mod passes;
pub mod shader;
pub mod shader_cycles;
pub mod texture;

pub use draw_calls::DrawCallCountDetector;
pub use geometry::{ModelStatsDetector, TriangleCountDetector};
pub use passes::{PassDurationDetector, PassSwitchDetector};
pub use shader::ShaderInstructionDetector;
pub use shader_cycles::ShaderCycleDetector;
pub use texture::{TextureCompressionDetector, TextureSizeDetector};
