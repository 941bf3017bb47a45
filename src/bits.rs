//! # 位打包辅助模块
//!
//! 以 LSB 优先的顺序把一个字节写入 8 个数据单元的最低位，或从中读回。
//! 数据单元的访问顺序由 [`UnitOrder`] 决定，顺序引擎与密钥置换引擎共用这里的读写游标。

use crate::constants::UNITS_PER_BYTE;

/// 数据单元的遍历顺序：第 `index` 个逻辑单元对应像素缓冲区中的哪个下标。
pub trait UnitOrder {
    /// 可用的数据单元总数。
    fn len(&self) -> usize;

    /// 第 `index` 个逻辑单元在像素缓冲区中的下标。
    fn unit(&self, index: usize) -> usize;
}

/// 自然顺序：逻辑单元 `i` 就是缓冲区下标 `i`。
#[derive(Debug, Clone, Copy)]
pub struct Natural(pub usize);

impl UnitOrder for Natural {
    fn len(&self) -> usize {
        self.0
    }

    #[inline]
    fn unit(&self, index: usize) -> usize {
        index
    }
}

/// 按给定顺序向像素缓冲区写入字节的游标。
pub struct UnitWriter<'a, O: UnitOrder + ?Sized> {
    pixels: &'a mut [u8],
    order: &'a O,
    position: usize,
}

impl<'a, O: UnitOrder + ?Sized> UnitWriter<'a, O> {
    pub fn new(pixels: &'a mut [u8], order: &'a O) -> Self {
        debug_assert_eq!(pixels.len(), order.len());
        Self {
            pixels,
            order,
            position: 0,
        }
    }

    /// 还能写入的完整字节数。
    pub fn remaining_bytes(&self) -> usize {
        (self.order.len() - self.position) / UNITS_PER_BYTE
    }

    /// 已写入的数据单元数。
    pub fn units_written(&self) -> usize {
        self.position
    }

    /// 写入一个字节：第 `bit` 位进入第 `bit` 个单元的 bit0。
    ///
    /// 调用方需先通过 [`remaining_bytes`](Self::remaining_bytes) 确认空间。
    pub fn write_byte(&mut self, byte: u8) {
        for bit in 0..UNITS_PER_BYTE {
            let unit = self.order.unit(self.position);
            self.pixels[unit] = (self.pixels[unit] & 0xFE) | ((byte >> bit) & 1);
            self.position += 1;
        }
    }

    pub fn write_all(&mut self, bytes: &[u8]) {
        bytes.iter().for_each(|&byte| self.write_byte(byte));
    }
}

/// 按给定顺序从像素缓冲区读取字节的游标。
pub struct UnitReader<'a, O: UnitOrder + ?Sized> {
    pixels: &'a [u8],
    order: &'a O,
    position: usize,
}

impl<'a, O: UnitOrder + ?Sized> UnitReader<'a, O> {
    pub fn new(pixels: &'a [u8], order: &'a O) -> Self {
        debug_assert_eq!(pixels.len(), order.len());
        Self {
            pixels,
            order,
            position: 0,
        }
    }

    pub fn remaining_bytes(&self) -> usize {
        (self.order.len() - self.position) / UNITS_PER_BYTE
    }

    /// 读取下一个字节；剩余单元不足 8 个时返回 `None`。
    pub fn read_byte(&mut self) -> Option<u8> {
        if self.remaining_bytes() == 0 {
            return None;
        }
        let mut byte = 0u8;
        for bit in 0..UNITS_PER_BYTE {
            let unit = self.order.unit(self.position);
            byte |= (self.pixels[unit] & 1) << bit;
            self.position += 1;
        }
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 倒序遍历，用来检验游标确实经过 `UnitOrder` 取下标。
    struct Reversed(usize);

    impl UnitOrder for Reversed {
        fn len(&self) -> usize {
            self.0
        }

        fn unit(&self, index: usize) -> usize {
            self.0 - 1 - index
        }
    }

    #[test]
    fn test_write_byte_is_lsb_first() {
        let mut pixels = [0xFFu8; 8];
        let order = Natural(pixels.len());
        let mut writer = UnitWriter::new(&mut pixels, &order);
        writer.write_byte(0b0000_0110);
        assert_eq!(writer.units_written(), 8);
        assert_eq!(writer.remaining_bytes(), 0);

        assert_eq!(pixels, [0xFE, 0xFF, 0xFF, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE]);
    }

    #[test]
    fn test_only_bit_zero_changes() {
        let mut pixels = [0b1010_1010u8; 16];
        let order = Natural(pixels.len());
        UnitWriter::new(&mut pixels, &order).write_all(&[0xFF, 0x00]);

        assert!(pixels[..8].iter().all(|&p| p == 0b1010_1011));
        assert!(pixels[8..].iter().all(|&p| p == 0b1010_1010));
    }

    #[test]
    fn test_reader_mirrors_writer_through_custom_order() {
        let mut pixels = [7u8; 20];
        let order = Reversed(pixels.len());
        UnitWriter::new(&mut pixels, &order).write_all(b"ok");

        // 写入从缓冲区末尾开始，前 4 个单元保持不变。
        assert_eq!(&pixels[..4], &[7, 7, 7, 7]);

        let mut reader = UnitReader::new(&pixels, &order);
        assert_eq!(reader.read_byte(), Some(b'o'));
        assert_eq!(reader.read_byte(), Some(b'k'));
        assert_eq!(reader.read_byte(), None);
    }
}
