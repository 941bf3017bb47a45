//! # 密钥置换 LSB 引擎
//!
//! 由调用方提供的密钥确定性地生成数据单元下标的伪随机置换，
//! 然后按置换后的顺序嵌入或提取，比特位因此散布在整幅图像中。
//!
//! 置换只起混淆作用，不提供保密性：生成器是 ChaCha20，但种子只是密钥的 64 位
//! FNV-1a 摘要，任何知道算法的人都可以穷举或直接读取最低位。
//!
//! 置换从不持久化。提取时必须使用与嵌入时完全相同的密钥和像素缓冲区长度，
//! 否则得到的是无意义的输出，而不会报错。

use crate::bits::UnitOrder;
use crate::error::Result;
use crate::protocol::Protocol;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// 由密钥派生的数据单元访问顺序。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    indices: Vec<usize>,
}

impl Permutation {
    /// 对 `0..length` 做 Fisher-Yates 洗牌，生成器种子只取决于 `key` 的字节内容。
    pub fn derive(key: &[u8], length: usize) -> Self {
        let seed = hash_key(key);
        let mut rng = ChaCha20Rng::seed_from_u64(seed);

        let mut indices: Vec<usize> = (0..length).collect();
        // 以 u64 取随机范围，保证 32 位与 64 位平台上的洗牌结果一致。
        for i in (1..length).rev() {
            let j = rng.random_range(0..=i as u64) as usize;
            indices.swap(i, j);
        }

        debug!("Derived permutation of {length} units from key seed {seed:#018x}");
        Permutation { indices }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }
}

impl UnitOrder for Permutation {
    fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    fn unit(&self, index: usize) -> usize {
        self.indices[index]
    }
}

/// 返回 `0..length` 的一个由 `key` 决定的排列。
///
/// 相同的 `key` 与 `length` 在任何进程、任何平台上都得到相同的结果。
pub fn derive_permutation(key: &[u8], length: usize) -> Vec<usize> {
    Permutation::derive(key, length).into_indices()
}

/// 按 `key` 派生的顺序把 `payload` 嵌入 `pixels`。
///
/// # Errors
///
/// 负载超出缓冲区所能容纳的字节数时返回 `CapacityExceeded`，缓冲区保持不变。
pub fn embed(pixels: &mut [u8], payload: &[u8], key: &[u8], protocol: Protocol) -> Result<()> {
    let order = Permutation::derive(key, pixels.len());
    protocol.write(pixels, &order, payload)
}

/// 按 `key` 派生的顺序从 `pixels` 中提取负载。
///
/// # Errors
///
/// 仅长度前缀协议可能失败，见 [`Protocol::read`]。
pub fn extract(pixels: &[u8], key: &[u8], protocol: Protocol) -> Result<Vec<u8>> {
    let order = Permutation::derive(key, pixels.len());
    protocol.read(pixels, &order)
}

/// FNV-1a 64 位摘要，把任意长度的密钥折叠成生成器种子。
fn hash_key(key: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    key.iter().fold(FNV_OFFSET, |hash, &byte| {
        (hash ^ (byte as u64)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_deterministic() {
        assert_eq!(
            derive_permutation(b"secret", 500),
            derive_permutation(b"secret", 500)
        );
    }

    #[test]
    fn test_permutation_is_bijection() {
        let permutation = Permutation::derive(b"secret", 300);
        assert_eq!(permutation.as_slice(), derive_permutation(b"secret", 300));
        let mut seen = vec![false; 300];
        for &index in permutation.as_slice() {
            assert!(!seen[index], "duplicate index {index}");
            seen[index] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_different_keys_differ() {
        let a = derive_permutation(b"key-a", 200);
        let b = derive_permutation(b"key-b", 200);
        let differences = a.iter().zip(&b).filter(|(x, y)| x != y).count();
        assert!(differences > 100, "only {differences} positions differ");
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(derive_permutation(b"k", 0).is_empty());
        assert_eq!(derive_permutation(b"k", 1), vec![0]);
    }

    #[test]
    fn test_hash_key() {
        assert_eq!(hash_key(b""), 0xcbf29ce484222325);
        // FNV-1a("a") 的公开参考值。
        assert_eq!(hash_key(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_keyed_round_trip() {
        let mut pixels: Vec<u8> = (0..1200).map(|i| (i * 7 % 256) as u8).collect();
        let original = pixels.clone();
        embed(&mut pixels, b"scattered", b"k3y", Protocol::Sentinel).unwrap();

        assert_eq!(
            extract(&pixels, b"k3y", Protocol::Sentinel).unwrap(),
            b"scattered"
        );
        // 只有最低位可能改变。
        assert!(pixels.iter().zip(&original).all(|(a, b)| a >> 1 == b >> 1));
    }

    #[test]
    fn test_wrong_key_yields_garbage_with_sentinel() {
        let mut pixels = vec![0u8; 4096];
        let payload = b"the quick brown fox";
        embed(&mut pixels, payload, b"right", Protocol::Sentinel).unwrap();

        assert_eq!(
            extract(&pixels, b"right", Protocol::Sentinel).unwrap(),
            payload
        );
        assert_ne!(
            extract(&pixels, b"wrong", Protocol::Sentinel).unwrap(),
            payload
        );
        // 不带密钥的顺序读取同样得不到原文。
        assert_ne!(
            crate::sequential::extract(&pixels, Protocol::Sentinel).unwrap(),
            payload
        );
    }

    #[test]
    fn test_wrong_key_with_length_prefix_is_rejected_or_garbage() {
        let mut pixels = vec![0u8; 4096];
        let payload = b"the quick brown fox";
        embed(&mut pixels, payload, b"right", Protocol::LengthPrefixed).unwrap();

        assert_eq!(
            extract(&pixels, b"right", Protocol::LengthPrefixed).unwrap(),
            payload
        );
        match extract(&pixels, b"wrong", Protocol::LengthPrefixed) {
            Err(err) => assert!(matches!(err, crate::error::Error::LengthOutOfRange { .. })),
            Ok(wrong) => assert_ne!(wrong, payload),
        }
    }

    #[test]
    fn test_scatters_beyond_leading_units() {
        let mut pixels = vec![0u8; 800];
        embed(&mut pixels, &[0xFF; 4], b"spread", Protocol::Sentinel).unwrap();
        // 40 个被置 1 的单元不会全部落在前 40 个位置上。
        let touched = pixels.iter().filter(|&&p| p == 1).count();
        assert_eq!(touched, 40);
        assert!(pixels[40..].iter().any(|&p| p == 1));
    }
}
