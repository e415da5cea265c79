//! # 核心错误类型模块
//!
//! 定义隐写核心在编码/解码过程中可能返回的所有错误。
//! 所有错误对当前操作都是终止性的：不重试、不部分恢复。

use std::io;
use std::path::PathBuf;

/// 隐写核心的错误类型。
///
/// CLI 层负责把这些错误翻译成退出码和用户提示；核心本身只返回类型化结果。
#[derive(Debug, thiserror::Error)]
pub enum StegoError {
    /// 无法打开输入或输出文件。
    #[error("unable to open file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 载体在一帧写完/读完之前就耗尽了。
    #[error("carrier ran out of bytes while reading a {needed}-byte window")]
    ShortRead { needed: usize },

    /// 输出端拒绝了写入 (磁盘满、权限不足)。
    #[error("short write to output while emitting a {expected}-byte window")]
    ShortWrite { expected: usize },

    /// 魔术标记不匹配：该图像不是本工具生成的，或提供了错误的文件。
    #[error("magic marker mismatch: this image does not carry hidden data")]
    MarkerMismatch,

    /// 载体图像太小，装不下完整的隐写帧。
    #[error("insufficient capacity: need more than {required} carrier bytes, image holds {available}")]
    InsufficientCapacity { required: u64, available: u64 },

    /// 操作完成后的字节数校验失败。
    #[error("size verification failed: expected {expected} bytes, found {actual}")]
    SizeIntegrity { expected: u64, actual: u64 },

    /// 读写过程中发生的其他 I/O 错误。
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, StegoError>;
