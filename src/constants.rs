/// BMP 文件头 (BITMAPFILEHEADER) 的大小 (字节)。
pub const FILE_HEADER_SIZE: usize = 14;

/// 支持的唯一 DIB 头 (BITMAPINFOHEADER) 大小 (字节)。
pub const DIB_HEADER_SIZE: usize = 40;

/// 8 位图像调色板的大小：256 个 BGR0 条目，每个 4 字节。
pub const PALETTE_SIZE: usize = 256 * 4;

/// 文件头与 DIB 头合计大小，即 24 位图像的标准像素数据偏移。
pub const HEADERS_SIZE: usize = FILE_HEADER_SIZE + DIB_HEADER_SIZE;

/// 负载结束标记。提取时遇到该字节即停止。
pub const SENTINEL: u8 = 0xFF;

/// 隐藏一个负载字节所需的数据单元数 (每个单元 1 bit)。
pub const UNITS_PER_BYTE: usize = 8;

/// 长度前缀协议中长度字段的字节数 (`u32`, 小端)。
/// 以 32 个数据单元写入。
pub const LENGTH_PREFIX_BYTES: usize = 4;
