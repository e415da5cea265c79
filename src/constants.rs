/// BMP 文件的标准头部大小 (字节)。
/// 头部在编码时被原样复制、在解码时被跳过，任何比特都不会被修改。
pub const BMP_HEADER_SIZE: usize = 54;

/// 魔术标记：证明载体图像是由本工具生成的 2 字节 ASCII 标签。
/// 解码时首先校验它，校验失败则说明图像中没有隐藏数据。
pub const MAGIC_MARKER: [u8; 2] = *b"#*";

/// 隐写 1 个数据字节所需的载体字节数。
/// 每个载体字节只使用最低有效位 (LSB)，因此 8 bits 需要 8 个载体字节。
pub const BYTE_WINDOW: usize = 8;

/// 隐写 1 个 32 位长度字段所需的载体字节数。
/// 与数据字节相同，每个载体字节存储 1 bit，32 bits 需要 32 个载体字节。
pub const SIZE_WINDOW: usize = 32;

/// BMP 头部中宽度字段的字节偏移 (小端序 32 位无符号整数)。
pub const WIDTH_OFFSET: usize = 18;

/// BMP 头部中高度字段的字节偏移 (小端序 32 位无符号整数)。
pub const HEIGHT_OFFSET: usize = 22;

/// 24 位未压缩 BMP 的每像素字节数。
pub const BYTES_PER_PIXEL: u64 = 3;

/// 容量公式末尾的 1 字节保守余量。
/// 线格式兼容性的一部分，属于固定常量，不要重新推导。
pub const CAPACITY_SLACK: u64 = 1;
