//! # 嵌入协议模块
//!
//! 决定负载在数据单元流中如何定界。嵌入与提取必须使用同一种协议。
//!
//! * [`Protocol::Sentinel`] - 负载之后写入一个 `0xFF` 结束标记 (空间不足时省略)。
//!   提取遇到 `0xFF` 即停止，因此负载本身含有 `0xFF` 时会被截断。
//! * [`Protocol::LengthPrefixed`] - 负载之前写入 `u32` 小端长度，没有结束标记，
//!   可以携带任意字节。

use crate::bits::{UnitOrder, UnitReader, UnitWriter};
use crate::constants::{LENGTH_PREFIX_BYTES, SENTINEL};
use crate::error::{Error, Result};
use clap::ValueEnum;
use log::{debug, trace, warn};

/// 负载定界方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Protocol {
    /// 以 0xFF 结束标记定界 (v1)。
    #[default]
    Sentinel,
    /// 以 32 位长度前缀定界 (v2)。
    LengthPrefixed,
}

impl Protocol {
    /// 协议在负载之外必须占用的字节数。
    ///
    /// 结束标记是可选的，不计入。
    pub fn overhead(self) -> usize {
        match self {
            Self::Sentinel => 0,
            Self::LengthPrefixed => LENGTH_PREFIX_BYTES,
        }
    }

    /// 按本协议把 `payload` 写入 `pixels` 中由 `order` 指定的数据单元。
    ///
    /// # Errors
    ///
    /// 负载 (加上协议开销) 超过数据单元所能容纳的字节数时返回 `CapacityExceeded`，
    /// 此时缓冲区不会被修改。
    pub fn write<O: UnitOrder + ?Sized>(
        self,
        pixels: &mut [u8],
        order: &O,
        payload: &[u8],
    ) -> Result<()> {
        let mut writer = UnitWriter::new(pixels, order);
        let required = payload.len() + self.overhead();
        let available = writer.remaining_bytes();
        if required > available {
            return Err(Error::CapacityExceeded {
                required,
                available,
            });
        }

        match self {
            Self::Sentinel => {
                writer.write_all(payload);
                if writer.remaining_bytes() > 0 {
                    writer.write_byte(SENTINEL);
                    debug!("Sentinel written after {} payload bytes", payload.len());
                } else {
                    warn!("No space left for the sentinel; extraction will run to the end of the buffer");
                }
            }
            Self::LengthPrefixed => {
                let length = u32::try_from(payload.len()).map_err(|_| Error::CapacityExceeded {
                    required,
                    available: u32::MAX as usize,
                })?;
                writer.write_all(&length.to_le_bytes());
                writer.write_all(payload);
            }
        }

        trace!("Embedded bytes: {payload:02x?}");
        debug!("Wrote {} data units", writer.units_written());
        Ok(())
    }

    /// 按本协议从 `pixels` 中由 `order` 指定的数据单元读回负载。
    ///
    /// 结束标记协议永远成功：密钥错误时得到的是无意义的字节。
    ///
    /// # Errors
    ///
    /// 长度前缀协议下，缓冲区放不下长度字段时返回 `TruncatedData`，
    /// 声明的长度超出剩余空间时返回 `LengthOutOfRange`。
    pub fn read<O: UnitOrder + ?Sized>(self, pixels: &[u8], order: &O) -> Result<Vec<u8>> {
        let mut reader = UnitReader::new(pixels, order);

        let payload = match self {
            Self::Sentinel => {
                let mut payload = Vec::new();
                while let Some(byte) = reader.read_byte() {
                    if byte == SENTINEL {
                        debug!("Sentinel found after {} bytes", payload.len());
                        break;
                    }
                    payload.push(byte);
                }
                payload
            }
            Self::LengthPrefixed => {
                let available = reader.remaining_bytes();
                let mut prefix = [0u8; LENGTH_PREFIX_BYTES];
                for slot in prefix.iter_mut() {
                    *slot = reader.read_byte().ok_or(Error::TruncatedData {
                        needed: LENGTH_PREFIX_BYTES,
                        available,
                    })?;
                }
                let declared = u32::from_le_bytes(prefix) as usize;
                let available = reader.remaining_bytes();
                if declared > available {
                    return Err(Error::LengthOutOfRange {
                        declared,
                        available,
                    });
                }
                (0..declared).filter_map(|_| reader.read_byte()).collect()
            }
        };

        trace!("Extracted bytes: {payload:02x?}");
        Ok(payload)
    }
}
