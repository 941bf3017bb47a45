//! # 容量模型
//!
//! 估算一幅图像在每个数据单元 1 bit 的方案下最多能嵌入多少字节。
//! 该值只是建议性的：引擎在写入时会按实际数据单元数再次检查边界。

use crate::bmp::BitmapImage;
use crate::constants::UNITS_PER_BYTE;

/// 给定像素数据长度与位深，返回最大负载字节数。
///
/// * 24 位：按像素数计，`(pixel_len / 3) / 8`。
/// * 8 位：每个像素字节一个单元，`pixel_len / 8`。
/// * 其它位深：0。
pub fn capacity(pixel_len: usize, bits_per_pixel: u16) -> usize {
    match bits_per_pixel {
        24 => (pixel_len / 3) / UNITS_PER_BYTE,
        8 => pixel_len / UNITS_PER_BYTE,
        _ => 0,
    }
}

/// 解码后图像的容量。
pub fn of_image(image: &BitmapImage) -> usize {
    capacity(image.pixels().len(), image.bits_per_pixel())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp::BitDepth;

    #[test]
    fn test_capacity_24_bit() {
        assert_eq!(capacity(300, 24), 12);
        assert_eq!(capacity(48, 24), 2);
        assert_eq!(capacity(23, 24), 0);
    }

    #[test]
    fn test_capacity_8_bit() {
        assert_eq!(capacity(300, 8), 37);
        assert_eq!(capacity(7, 8), 0);
    }

    #[test]
    fn test_unsupported_depths_have_no_capacity() {
        for bits in [0, 1, 4, 16, 32] {
            assert_eq!(capacity(10_000, bits), 0);
        }
    }

    #[test]
    fn test_capacity_is_monotonic() {
        for bits in [8, 24] {
            let values: Vec<usize> = (0..500).map(|len| capacity(len, bits)).collect();
            assert!(values.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_image_capacity() {
        let rgb = BitmapImage::new(10, 10, BitDepth::Rgb24).unwrap();
        assert_eq!(of_image(&rgb), 12);

        let gray = BitmapImage::new(10, 10, BitDepth::Indexed8).unwrap();
        assert_eq!(of_image(&gray), 12);
    }
}
