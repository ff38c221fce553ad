//! 领域层模块
//! 由脚本对象持有的原生数据类型

pub mod color;
pub mod font;
pub mod scene;
pub mod table;

// 重新导出主要类型
pub use color::Color;
pub use font::{Font, FontDefaults};
pub use scene::{Bitmap, Plane, Sprite, Tilemap, Viewport, Window};
pub use table::Table;
