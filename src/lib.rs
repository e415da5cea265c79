//! # bmp_hide 库
//!
//! 本库包含 BMP LSB 文件隐写工具的核心逻辑。

// 声明库包含的所有模块。

pub mod capacity;
pub mod cli;
pub mod codec;
pub mod constants;
pub mod error;
pub mod frame;
pub mod handler;
pub mod pipeline;
