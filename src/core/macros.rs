//! 核心宏定义
//!
//! 提供统一的宏来减少代码重复

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use gpu_frame_analyzer::impl_default;
///
/// struct Limits {
///     max_items: u32,
///     label: String,
/// }
///
/// impl_default!(Limits {
///     max_items: 16,
///     label: String::from("frame"),
/// });
///
/// assert_eq!(Limits::default().max_items, 16);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

/// 将一组可选覆盖字段合并到目标结构体上
///
/// 仅覆盖 `Some` 字段，`None` 字段保留原值。
#[macro_export]
macro_rules! overlay_fields {
    ($target:expr, $overrides:expr, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(value) = $overrides.$field {
                $target.$field = value;
            }
        )*
    };
}
