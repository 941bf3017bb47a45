//! # 隐写入口模块
//!
//! 面向调用方的嵌入与提取操作：在 [`BitmapImage`] 上选择顺序引擎或密钥置换引擎，
//! 并在嵌入前按容量模型检查负载长度。

use crate::bmp::BitmapImage;
use crate::capacity;
use crate::error::{Error, Result};
use crate::protocol::Protocol;
use crate::{keyed, sequential};
use log::info;

/// 在给定协议下，图像最多能携带的负载字节数。
pub fn max_payload(image: &BitmapImage, protocol: Protocol) -> usize {
    capacity::of_image(image).saturating_sub(protocol.overhead())
}

/// 把 `payload` 嵌入 `image` 的像素。提供 `key` 时使用密钥置换顺序。
///
/// # Errors
///
/// 负载超过 [`max_payload`] 时返回 `CapacityExceeded`，图像保持不变。
pub fn embed(
    image: &mut BitmapImage,
    payload: &[u8],
    key: Option<&[u8]>,
    protocol: Protocol,
) -> Result<()> {
    let available = max_payload(image, protocol);
    if payload.len() > available {
        return Err(Error::CapacityExceeded {
            required: payload.len(),
            available,
        });
    }

    info!(
        "Embedding {} bytes ({:?}, {})",
        payload.len(),
        protocol,
        if key.is_some() { "keyed" } else { "sequential" }
    );

    match key {
        Some(key) => keyed::embed(image.pixels_mut(), payload, key, protocol),
        None => sequential::embed(image.pixels_mut(), payload, protocol),
    }
}

/// 从 `image` 中提取负载。`key` 与 `protocol` 必须与嵌入时一致。
///
/// # Errors
///
/// 仅长度前缀协议可能失败，见 [`Protocol::read`]。
pub fn extract(image: &BitmapImage, key: Option<&[u8]>, protocol: Protocol) -> Result<Vec<u8>> {
    let payload = match key {
        Some(key) => keyed::extract(image.pixels(), key, protocol)?,
        None => sequential::extract(image.pixels(), protocol)?,
    };
    info!("Extracted {} bytes ({:?})", payload.len(), protocol);
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp::{self, BitDepth};

    #[test]
    fn test_hi_in_4x4_image() {
        let mut image = BitmapImage::new(4, 4, BitDepth::Rgb24).unwrap();
        embed(&mut image, b"Hi", None, Protocol::Sentinel).unwrap();

        let changed: Vec<usize> = image
            .pixels()
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p != 0)
            .map(|(i, _)| i)
            .collect();
        // 'H' 置位单元 3, 6；'i' 置位单元 8, 11, 13, 14；结束标记占 16..24。
        assert_eq!(changed, [3, 6, 8, 11, 13, 14, 16, 17, 18, 19, 20, 21, 22, 23]);

        let reloaded = bmp::decode(&bmp::encode(&image)).unwrap();
        assert_eq!(extract(&reloaded, None, Protocol::Sentinel).unwrap(), b"Hi");
    }

    #[test]
    fn test_capacity_checked_before_embedding() {
        let mut image = BitmapImage::new(4, 4, BitDepth::Rgb24).unwrap();
        let result = embed(&mut image, b"abc", None, Protocol::Sentinel);
        assert!(matches!(
            result,
            Err(Error::CapacityExceeded { required: 3, available: 2 })
        ));
        assert!(image.pixels().iter().all(|&p| p == 0));

        assert_eq!(max_payload(&image, Protocol::LengthPrefixed), 0);
    }

    #[test]
    fn test_full_8_bit_image_omits_sentinel() {
        let mut image = BitmapImage::new(8, 2, BitDepth::Indexed8).unwrap();
        assert_eq!(max_payload(&image, Protocol::Sentinel), 2);

        embed(&mut image, b"ok", None, Protocol::Sentinel).unwrap();
        assert_eq!(extract(&image, None, Protocol::Sentinel).unwrap(), b"ok");
    }

    #[test]
    fn test_keyed_round_trip_through_file_bytes() {
        let mut image = BitmapImage::new(32, 16, BitDepth::Rgb24).unwrap();
        let key = Some(b"passphrase".as_slice());
        embed(&mut image, b"hidden", key, Protocol::LengthPrefixed).unwrap();

        let reloaded = bmp::decode(&bmp::encode(&image)).unwrap();
        assert_eq!(
            extract(&reloaded, key, Protocol::LengthPrefixed).unwrap(),
            b"hidden"
        );
    }
}
