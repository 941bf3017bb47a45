//! # 预览模块
//!
//! 把 [`BitmapImage`] 转换为可直接显示的自上而下 RGB8 缓冲区。

use crate::bmp::{BitDepth, BitmapImage};
use image::{Rgb, RgbImage};

/// 生成预览图像。24 位像素直接使用，8 位像素经调色板 (BGR0) 映射为 RGB。
pub fn to_rgb_image(bitmap: &BitmapImage) -> RgbImage {
    let width = bitmap.width() as u32;
    let row_len = bitmap.row_len();
    let pixels = bitmap.pixels();

    RgbImage::from_fn(width, bitmap.rows() as u32, |x, y| {
        let offset = y as usize * row_len;
        match (bitmap.depth(), bitmap.palette()) {
            (BitDepth::Indexed8, Some(palette)) => {
                let entry = pixels[offset + x as usize] as usize * 4;
                Rgb([palette[entry + 2], palette[entry + 1], palette[entry]])
            }
            _ => {
                let i = offset + x as usize * 3;
                Rgb([pixels[i], pixels[i + 1], pixels[i + 2]])
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_preview_keeps_channel_order() {
        let mut bitmap = BitmapImage::new(2, 1, BitDepth::Rgb24).unwrap();
        bitmap.pixels_mut().copy_from_slice(&[10, 20, 30, 40, 50, 60]);

        let preview = to_rgb_image(&bitmap);
        assert_eq!(preview.dimensions(), (2, 1));
        assert_eq!(preview.get_pixel(0, 0), &Rgb([10, 20, 30]));
        assert_eq!(preview.get_pixel(1, 0), &Rgb([40, 50, 60]));
    }

    #[test]
    fn test_indexed_preview_uses_palette() {
        let mut bitmap = BitmapImage::new(2, 2, BitDepth::Indexed8).unwrap();
        bitmap.pixels_mut().copy_from_slice(&[0, 255, 128, 7]);

        let preview = to_rgb_image(&bitmap);
        assert_eq!(preview.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(preview.get_pixel(1, 0), &Rgb([255, 255, 255]));
        assert_eq!(preview.get_pixel(0, 1), &Rgb([128, 128, 128]));
        assert_eq!(preview.get_pixel(1, 1), &Rgb([7, 7, 7]));
    }
}
