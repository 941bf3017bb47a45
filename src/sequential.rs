//! # 顺序 LSB 引擎
//!
//! 按下标自然顺序 `0..N` 把负载逐位写入数据单元的最低位。

use crate::bits::Natural;
use crate::error::Result;
use crate::protocol::Protocol;

/// 把 `payload` 按自然顺序嵌入 `pixels`。
///
/// # Errors
///
/// 负载超出缓冲区所能容纳的字节数时返回 `CapacityExceeded`，缓冲区保持不变。
pub fn embed(pixels: &mut [u8], payload: &[u8], protocol: Protocol) -> Result<()> {
    let order = Natural(pixels.len());
    protocol.write(pixels, &order, payload)
}

/// 从 `pixels` 中按自然顺序提取负载。不修改缓冲区，重复调用结果相同。
///
/// # Errors
///
/// 仅长度前缀协议可能失败，见 [`Protocol::read`]。
pub fn extract(pixels: &[u8], protocol: Protocol) -> Result<Vec<u8>> {
    protocol.read(pixels, &Natural(pixels.len()))
}
