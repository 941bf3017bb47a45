//! # BMP 编解码模块
//!
//! 解析并重建未压缩的 24 位 RGB 与 8 位调色板 BMP 文件。
//!
//! 内存中的像素缓冲区约定：
//! * 行顺序始终为自上而下 (磁盘上 `height > 0` 时为自下而上，解码时翻转，编码时还原)。
//! * 24 位像素按 R,G,B 顺序存放 (磁盘上为 B,G,R)。
//! * 行尾的 4 字节对齐填充不出现在缓冲区中，因此
//!   `pixels.len() == width * |height| * (bits_per_pixel / 8)`。
//!
//! 编解码器不解释的头部字段、行尾填充字节、调色板与像素数据之间的间隙字节以及像素数据之后的
//! 尾随字节都会原样保留，使 `encode(decode(b)) == b` 对任何受支持的文件成立。

use crate::constants::{DIB_HEADER_SIZE, HEADERS_SIZE, PALETTE_SIZE};
use crate::error::{Error, Result, Unsupported};
use log::debug;
use std::fs;
use std::path::Path;

/// 支持的两种位深。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// 8 位调色板图像，每个像素一个字节。
    Indexed8,
    /// 24 位真彩色图像，每个像素三个字节。
    Rgb24,
}

impl BitDepth {
    /// 从头部的 bits-per-pixel 字段构造。
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(Self::Indexed8),
            24 => Some(Self::Rgb24),
            _ => None,
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            Self::Indexed8 => 8,
            Self::Rgb24 => 24,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        self.bits() as usize / 8
    }
}

/// 编解码器不使用但需要原样写回的头部字段。
#[derive(Debug, Clone, PartialEq, Eq)]
struct Passthrough {
    file_size: u32,
    reserved: [u8; 4],
    image_size: u32,
    x_pixels_per_meter: i32,
    y_pixels_per_meter: i32,
    colors_used: u32,
    colors_important: u32,
}

/// 一幅解码后的 BMP 图像。
///
/// 由 [`decode`] 或 [`BitmapImage::new`] 创建，被隐写引擎原地修改，
/// 最后交给 [`encode`] 写回字节。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapImage {
    width: i32,
    height: i32,
    depth: BitDepth,
    data_offset: u32,
    palette: Vec<u8>,
    pixels: Vec<u8>,
    /// 每行的对齐填充，按磁盘行顺序拼接。
    padding: Vec<u8>,
    passthrough: Passthrough,
    gap: Vec<u8>,
    trailer: Vec<u8>,
}

impl BitmapImage {
    /// 创建一幅全零像素的空白图像。
    ///
    /// `height` 为正表示磁盘上自下而上存储 (BMP 默认)，为负表示自上而下。
    /// 8 位图像使用灰度调色板。
    ///
    /// # Errors
    ///
    /// 宽度不为正、高度为零或尺寸溢出时返回 `UnsupportedFormat`。
    pub fn new(width: i32, height: i32, depth: BitDepth) -> Result<Self> {
        let (row_len, stride, rows) = layout(width, height, depth)?;
        let palette = match depth {
            BitDepth::Indexed8 => (0..=255u8).flat_map(|i| [i, i, i, 0]).collect(),
            BitDepth::Rgb24 => Vec::new(),
        };
        let data_offset = HEADERS_SIZE + palette.len();
        let image_size = stride * rows;

        Ok(Self {
            width,
            height,
            depth,
            data_offset: data_offset as u32,
            palette,
            pixels: vec![0; row_len * rows],
            padding: vec![0; (stride - row_len) * rows],
            passthrough: Passthrough {
                file_size: (data_offset + image_size) as u32,
                reserved: [0; 4],
                image_size: image_size as u32,
                x_pixels_per_meter: 0,
                y_pixels_per_meter: 0,
                colors_used: 0,
                colors_important: 0,
            },
            gap: Vec::new(),
            trailer: Vec::new(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    /// 头部中的原始高度，正值表示磁盘上自下而上。
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    pub fn bits_per_pixel(&self) -> u16 {
        self.depth.bits()
    }

    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// 磁盘上的行是否自下而上存储。
    pub fn is_bottom_up(&self) -> bool {
        self.height > 0
    }

    /// 行数 (高度的绝对值)。
    pub fn rows(&self) -> usize {
        self.height.unsigned_abs() as usize
    }

    /// 内存中一行像素的字节数 (不含填充)。
    pub fn row_len(&self) -> usize {
        self.width as usize * self.depth.bytes_per_pixel()
    }

    /// 8 位图像的 1024 字节 BGR0 调色板；24 位图像返回 `None`。
    pub fn palette(&self) -> Option<&[u8]> {
        match self.depth {
            BitDepth::Indexed8 => Some(&self.palette),
            BitDepth::Rgb24 => None,
        }
    }

    /// 自上而下、RGB 顺序的像素缓冲区。
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// 可原地修改的像素缓冲区。长度固定，不能增删。
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

/// 将 BMP 文件字节解码为 [`BitmapImage`]。
///
/// 像素数组长度由宽度、高度、位深与 4 字节行对齐计算得出；
/// 头部的 image-size 字段不参与计算，仅原样保留。
///
/// # Errors
///
/// * `InvalidSignature` - 前两个字节不是 "BM"。
/// * `UnsupportedFormat` - 位深不是 8/24、已压缩、DIB 头不是 40 字节或尺寸无效。
/// * `TruncatedData` - 头部、调色板或像素数组超出了实际字节数。
pub fn decode(bytes: &[u8]) -> Result<BitmapImage> {
    if bytes.get(..2) != Some(b"BM".as_slice()) {
        return Err(Error::InvalidSignature);
    }
    ensure_available(bytes, HEADERS_SIZE)?;

    let file_size = read_u32(bytes, 2);
    let reserved = [bytes[6], bytes[7], bytes[8], bytes[9]];
    let data_offset = read_u32(bytes, 10);
    let header_size = read_u32(bytes, 14);
    let width = read_i32(bytes, 18);
    let height = read_i32(bytes, 22);
    let planes = read_u16(bytes, 26);
    let bits = read_u16(bytes, 28);
    let compression = read_u32(bytes, 30);

    debug!(
        "BMP header: {width}x{height}, {bits} bpp, compression {compression}, data offset {data_offset}"
    );

    if header_size as usize != DIB_HEADER_SIZE {
        return Err(Error::UnsupportedFormat(Unsupported::HeaderSize(header_size)));
    }
    if planes != 1 {
        return Err(Error::UnsupportedFormat(Unsupported::Planes(planes)));
    }
    let depth = BitDepth::from_bits(bits)
        .ok_or(Error::UnsupportedFormat(Unsupported::BitDepth(bits)))?;
    if compression != 0 {
        return Err(Error::UnsupportedFormat(Unsupported::Compression(compression)));
    }
    let (row_len, stride, rows) = layout(width, height, depth)?;

    let pixel_start = data_offset as usize;
    let palette_end = match depth {
        BitDepth::Indexed8 => HEADERS_SIZE + PALETTE_SIZE,
        BitDepth::Rgb24 => HEADERS_SIZE,
    };
    // 像素数据不能与头部或调色板重叠；8 位图像因此必须带完整的 256 项调色板。
    if pixel_start < palette_end {
        return Err(Error::UnsupportedFormat(match depth {
            BitDepth::Indexed8 => Unsupported::ShortPalette { data_offset },
            BitDepth::Rgb24 => Unsupported::DataOffset(data_offset),
        }));
    }
    ensure_available(bytes, palette_end)?;
    let palette = bytes[HEADERS_SIZE..palette_end].to_vec();

    let pixel_end = stride
        .checked_mul(rows)
        .and_then(|size| size.checked_add(pixel_start))
        .ok_or(Error::UnsupportedFormat(Unsupported::Dimensions { width, height }))?;
    ensure_available(bytes, pixel_end)?;

    let disk = &bytes[pixel_start..pixel_end];
    let mut pixels = Vec::with_capacity(row_len * rows);
    for y in 0..rows {
        let disk_row = if height > 0 { rows - 1 - y } else { y };
        let start = disk_row * stride;
        pixels.extend_from_slice(&disk[start..start + row_len]);
    }
    let padding: Vec<u8> = disk
        .chunks_exact(stride)
        .flat_map(|row| &row[row_len..])
        .copied()
        .collect();
    if depth == BitDepth::Rgb24 {
        swap_red_blue(&mut pixels);
    }

    debug!(
        "Decoded {} pixel bytes ({} rows, stride {stride})",
        pixels.len(),
        rows
    );

    Ok(BitmapImage {
        width,
        height,
        depth,
        data_offset,
        palette,
        pixels,
        padding,
        passthrough: Passthrough {
            file_size,
            reserved,
            image_size: read_u32(bytes, 34),
            x_pixels_per_meter: read_i32(bytes, 38),
            y_pixels_per_meter: read_i32(bytes, 42),
            colors_used: read_u32(bytes, 46),
            colors_important: read_u32(bytes, 50),
        },
        gap: bytes[palette_end..pixel_start].to_vec(),
        trailer: bytes[pixel_end..].to_vec(),
    })
}

/// 将 [`BitmapImage`] 编码回 BMP 文件字节。
///
/// 逆转解码时的通道交换与行翻转，并写回解码时保留的行尾填充。
pub fn encode(image: &BitmapImage) -> Vec<u8> {
    let row_len = image.row_len();
    let stride = row_stride(row_len);
    let rows = image.rows();
    let header = &image.passthrough;

    let mut out = Vec::with_capacity(
        HEADERS_SIZE + image.palette.len() + image.gap.len() + stride * rows + image.trailer.len(),
    );

    // BITMAPFILEHEADER
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&header.file_size.to_le_bytes());
    out.extend_from_slice(&header.reserved);
    out.extend_from_slice(&image.data_offset.to_le_bytes());

    // BITMAPINFOHEADER
    out.extend_from_slice(&(DIB_HEADER_SIZE as u32).to_le_bytes());
    out.extend_from_slice(&image.width.to_le_bytes());
    out.extend_from_slice(&image.height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&image.depth.bits().to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&header.image_size.to_le_bytes());
    out.extend_from_slice(&header.x_pixels_per_meter.to_le_bytes());
    out.extend_from_slice(&header.y_pixels_per_meter.to_le_bytes());
    out.extend_from_slice(&header.colors_used.to_le_bytes());
    out.extend_from_slice(&header.colors_important.to_le_bytes());

    out.extend_from_slice(&image.palette);
    out.extend_from_slice(&image.gap);

    let pad_len = stride - row_len;
    for disk_row in 0..rows {
        let y = if image.is_bottom_up() { rows - 1 - disk_row } else { disk_row };
        let row = &image.pixels[y * row_len..(y + 1) * row_len];
        match image.depth {
            BitDepth::Rgb24 => row
                .chunks_exact(3)
                .for_each(|rgb| out.extend_from_slice(&[rgb[2], rgb[1], rgb[0]])),
            BitDepth::Indexed8 => out.extend_from_slice(row),
        }
        out.extend_from_slice(&image.padding[disk_row * pad_len..(disk_row + 1) * pad_len]);
    }

    out.extend_from_slice(&image.trailer);
    out
}

/// 读取并解码磁盘上的 BMP 文件。
///
/// # Errors
///
/// 读取失败时返回 `Io`，其余同 [`decode`]。
pub fn load(path: &Path) -> Result<BitmapImage> {
    decode(&fs::read(path)?)
}

/// 编码并写入 BMP 文件。
///
/// # Errors
///
/// 写入失败时返回 `Io`。
pub fn save(image: &BitmapImage, path: &Path) -> Result<()> {
    fs::write(path, encode(image))?;
    Ok(())
}

/// 磁盘上一行的字节数：按 4 字节对齐。
fn row_stride(row_len: usize) -> usize {
    row_len.div_ceil(4) * 4
}

/// 返回 (行长度, 行跨度, 行数)。
fn layout(width: i32, height: i32, depth: BitDepth) -> Result<(usize, usize, usize)> {
    let invalid = Error::UnsupportedFormat(Unsupported::Dimensions { width, height });
    if width <= 0 || height == 0 || height == i32::MIN {
        return Err(invalid);
    }
    let row_len = (width as usize)
        .checked_mul(depth.bytes_per_pixel())
        .ok_or(invalid)?;
    Ok((row_len, row_stride(row_len), height.unsigned_abs() as usize))
}

/// 交换每个三字节像素的第 0 与第 2 个字节 (BGR <-> RGB)。
fn swap_red_blue(pixels: &mut [u8]) {
    pixels.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));
}

fn ensure_available(bytes: &[u8], needed: usize) -> Result<()> {
    if bytes.len() < needed {
        return Err(Error::TruncatedData {
            needed,
            available: bytes.len(),
        });
    }
    Ok(())
}

// 调用方已通过 `ensure_available` 保证偏移有效。
fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    read_u32(bytes, offset) as i32
}
