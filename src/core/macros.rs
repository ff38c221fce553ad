//! 核心宏定义
//!
//! 提供统一的宏来减少代码重复

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use rgss_engine::impl_default;
///
/// struct MyStruct {
///     field1: u32,
///     field2: String,
/// }
///
/// impl_default!(MyStruct {
///     field1: 0,
///     field2: String::new(),
/// });
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

/// 声明绑定类型描述符并为原生类型实现 `BoundData`
///
/// 描述符是进程级的 `static`，包装/解包时按地址比较。
///
/// 使用示例:
/// ```rust
/// use rgss_engine::impl_bound_data;
///
/// pub struct Gauge {
///     pub value: i32,
/// }
///
/// impl_bound_data!(Gauge, GAUGE_TYPE, "Gauge");
/// ```
#[macro_export]
macro_rules! impl_bound_data {
    ($ty:ty, $descriptor:ident, $name:literal) => {
        pub static $descriptor: $crate::scripting::BoundType =
            $crate::scripting::BoundType::new::<$ty>($name);

        impl $crate::scripting::BoundData for $ty {
            fn bound_type() -> &'static $crate::scripting::BoundType {
                &$descriptor
            }
        }
    };
}
