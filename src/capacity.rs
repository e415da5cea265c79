//! # 容量规划模块
//!
//! 在任何破坏性写入开始之前，判断载体图像是否装得下完整的隐写帧。

use crate::constants::{
    BMP_HEADER_SIZE, BYTE_WINDOW, BYTES_PER_PIXEL, CAPACITY_SLACK, HEIGHT_OFFSET, MAGIC_MARKER,
    SIZE_WINDOW, WIDTH_OFFSET,
};
use crate::error::{Result, StegoError};

/// 完整隐写帧所需的载体字节数：
/// 魔术标记 + 扩展名长度字段 + 扩展名 + 数据长度字段 + 数据，
/// 再加上 54 字节头部与 1 字节余量 (两者都是兼容性要求的固定常量)。
pub fn required_carrier_bytes(extension_len: usize, payload_len: usize) -> u64 {
    (MAGIC_MARKER.len() * BYTE_WINDOW) as u64
        + SIZE_WINDOW as u64
        + (extension_len * BYTE_WINDOW) as u64
        + SIZE_WINDOW as u64
        + (payload_len as u64) * (BYTE_WINDOW as u64)
        + BMP_HEADER_SIZE as u64
        + CAPACITY_SLACK
}

/// 编码前的容量检查。
///
/// `pixel_bytes` 必须严格大于所需字节数，否则返回
/// [`StegoError::InsufficientCapacity`]。零长度的数据或扩展名是合法的
/// 退化情况，不会被单独拒绝。
pub fn plan_encode(pixel_bytes: u64, extension_len: usize, payload_len: usize) -> Result<()> {
    let required = required_carrier_bytes(extension_len, payload_len);

    if pixel_bytes > required {
        Ok(())
    } else {
        Err(StegoError::InsufficientCapacity {
            required,
            available: pixel_bytes,
        })
    }
}

/// 从 BMP 头部解析像素区容量：宽 × 高 × 3。
/// 宽度和高度是小端序 32 位无符号整数，分别位于偏移 18 和 22。
pub fn bmp_pixel_capacity(header: &[u8; BMP_HEADER_SIZE]) -> u64 {
    let width = u32::from_le_bytes([
        header[WIDTH_OFFSET],
        header[WIDTH_OFFSET + 1],
        header[WIDTH_OFFSET + 2],
        header[WIDTH_OFFSET + 3],
    ]);
    let height = u32::from_le_bytes([
        header[HEIGHT_OFFSET],
        header[HEIGHT_OFFSET + 1],
        header[HEIGHT_OFFSET + 2],
        header[HEIGHT_OFFSET + 3],
    ]);

    u64::from(width) * u64::from(height) * BYTES_PER_PIXEL
}
