//! # 错误类型模块
//!
//! 编解码与隐写操作的类型化错误。命令行层使用 `anyhow` 包装这些错误。

use std::fmt;
use thiserror::Error;

/// 本库操作的结果类型别名。
pub type Result<T> = std::result::Result<T, Error>;

/// BMP 编解码或 LSB 隐写过程中可能出现的错误。
#[derive(Error)]
pub enum Error {
    /// 文件开头不是 "BM" 签名。
    #[error("invalid signature: not a BMP file")]
    InvalidSignature,

    /// 位深、压缩方式或头部变体不受支持。
    #[error("unsupported BMP format: {0}")]
    UnsupportedFormat(Unsupported),

    /// 头部声明的大小超过了实际可用的字节数。
    #[error("truncated data: need {needed} bytes but only {available} available")]
    TruncatedData { needed: usize, available: usize },

    /// 负载长度超过图像容量。
    #[error("capacity exceeded: message requires {required} bytes but only {available} available")]
    CapacityExceeded { required: usize, available: usize },

    /// 长度前缀声明的负载长度无法容纳在像素缓冲区中 (通常是密钥错误或图像中没有消息)。
    #[error("declared payload length {declared} exceeds the {available} bytes the image can hold")]
    LengthOutOfRange { declared: usize, available: usize },

    /// 来自持久化层的 I/O 错误。
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// `UnsupportedFormat` 的具体原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    /// 位深既不是 8 也不是 24。
    BitDepth(u16),
    /// 压缩字段不是 0 (BI_RGB)。
    Compression(u32),
    /// DIB 头不是 40 字节的 BITMAPINFOHEADER。
    HeaderSize(u32),
    /// 平面数不为 1。
    Planes(u16),
    /// 8 位图像的像素数据偏移容不下完整的 256 项调色板。
    ShortPalette { data_offset: u32 },
    /// 像素数据偏移落在头部之内。
    DataOffset(u32),
    /// 宽度或高度无效。
    Dimensions { width: i32, height: i32 },
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BitDepth(bpp) => write!(f, "{bpp} bits per pixel (only 8 and 24 are supported)"),
            Self::Compression(c) => write!(f, "compression method {c} (only uncompressed is supported)"),
            Self::HeaderSize(size) => write!(f, "DIB header of {size} bytes (only 40 is supported)"),
            Self::Planes(planes) => write!(f, "{planes} color planes"),
            Self::ShortPalette { data_offset } => write!(
                f,
                "palette shorter than 256 entries (pixel data starts at byte {data_offset})"
            ),
            Self::DataOffset(offset) => write!(f, "pixel data offset {offset} overlaps the headers"),
            Self::Dimensions { width, height } => write!(f, "dimensions {width}x{height}"),
        }
    }
}
