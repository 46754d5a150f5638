//! 核心宏定义

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use particle_morph::impl_default;
///
/// struct Timing {
///     duration: f32,
///     label: String,
/// }
///
/// impl_default!(Timing {
///     duration: 1.2,
///     label: String::new(),
/// });
///
/// assert_eq!(Timing::default().duration, 1.2);
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
