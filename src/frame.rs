//! # 帧读写模块
//!
//! 以字段为单位在载体字节流上编码/解码隐写帧。
//! 每个数据字节占用 8 个载体字节，每个 32 位长度字段占用 32 个载体字节，
//! 读写游标只会单向前进，绝不回退。

use std::io::{self, Read, Write};

use crate::codec;
use crate::constants::{BYTE_WINDOW, SIZE_WINDOW};
use crate::error::{Result, StegoError};

/// 编码侧：从载体源逐窗口读取，打包后写入输出端。
pub struct FrameWriter<R, W> {
    src: R,
    dst: W,
}

impl<R: Read, W: Write> FrameWriter<R, W> {
    pub fn new(src: R, dst: W) -> Self {
        Self { src, dst }
    }

    /// 把 `data` 的每个字节隐写进 8 个载体字节，返回消耗的载体字节数。
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<usize> {
        let mut window = [0u8; BYTE_WINDOW];

        for &byte in data {
            fill_window(&mut self.src, &mut window)?;
            codec::pack_byte(byte, &mut window);
            drain_window(&mut self.dst, &window)?;
        }

        Ok(data.len() * BYTE_WINDOW)
    }

    /// 把一个 32 位长度字段隐写进 32 个载体字节。
    pub fn write_size(&mut self, value: u32) -> Result<()> {
        let mut window = [0u8; SIZE_WINDOW];

        fill_window(&mut self.src, &mut window)?;
        codec::pack_size(value, &mut window);
        drain_window(&mut self.dst, &window)?;

        Ok(())
    }

    /// 归还底层读写端，供编码管线复制剩余的载体字节。
    pub fn into_parts(self) -> (R, W) {
        (self.src, self.dst)
    }
}

/// 解码侧：从载体源逐窗口读取并解包。
pub struct FrameReader<R> {
    src: R,
}

impl<R: Read> FrameReader<R> {
    pub fn new(src: R) -> Self {
        Self { src }
    }

    /// 从 `count * 8` 个载体字节中解出 `count` 个数据字节。
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut window = [0u8; BYTE_WINDOW];
        let mut data = Vec::with_capacity(count);

        for _ in 0..count {
            fill_window(&mut self.src, &mut window)?;
            data.push(codec::unpack_byte(&window));
        }

        Ok(data)
    }

    /// 从 32 个载体字节中解出一个 32 位长度字段。
    pub fn read_size(&mut self) -> Result<u32> {
        let mut window = [0u8; SIZE_WINDOW];

        fill_window(&mut self.src, &mut window)?;

        Ok(codec::unpack_size(&window))
    }

    /// 解出魔术标记并与期望值比较。
    ///
    /// 不匹配返回 [`StegoError::MarkerMismatch`]，表示该图像不是本工具
    /// 生成的载体，或用户提供了错误的文件。
    pub fn read_marker(&mut self, expected: &[u8]) -> Result<()> {
        let marker = self.read_bytes(expected.len())?;

        if marker == expected {
            Ok(())
        } else {
            Err(StegoError::MarkerMismatch)
        }
    }
}

// 把 read_exact / write_all 的哨兵错误映射为帧层的 ShortRead / ShortWrite，
// 其余 I/O 错误原样上抛。管线层复制头部/写出数据时也复用这两个助手。
pub(crate) fn fill_window<R: Read>(src: &mut R, window: &mut [u8]) -> Result<()> {
    src.read_exact(window).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => StegoError::ShortRead {
            needed: window.len(),
        },
        _ => StegoError::Io(err),
    })
}

pub(crate) fn drain_window<W: Write>(dst: &mut W, window: &[u8]) -> Result<()> {
    dst.write_all(window).map_err(|err| match err.kind() {
        io::ErrorKind::WriteZero => StegoError::ShortWrite {
            expected: window.len(),
        },
        _ => StegoError::Io(err),
    })
}
