//! # bmp_lsb 库
//!
//! 未压缩 BMP 图像 (24 位 RGB 与 8 位调色板) 的 LSB 隐写编解码器。
//!
//! 数据流：[`bmp::decode`] 得到 [`bmp::BitmapImage`]，[`steganography::embed`] 原地修改其像素，
//! [`bmp::encode`] 重建文件字节；或由 [`steganography::extract`] 读回负载。
//!
//! 密钥置换只打乱比特位的位置，不提供任何保密性。

// 声明库包含的所有模块。

pub mod bits;
pub mod bmp;
pub mod capacity;
pub mod cli;
pub mod constants;
pub mod display;
pub mod error;
pub mod handler;
pub mod keyed;
pub mod protocol;
pub mod sequential;
pub mod steganography;

pub use bmp::{BitDepth, BitmapImage, decode, encode};
pub use error::{Error, Result};
pub use protocol::Protocol;
