//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover`、`capacity` 和 `preview` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用 BMP 编解码与隐写核心函数以及向用户报告结果。

use crate::bmp::{self, BitDepth, BitmapImage};
use crate::cli::{CapacityArgs, HideArgs, PreviewArgs, RecoverArgs};
use crate::{capacity, display, steganography};
use anyhow::{Context, Result};
use colored::Colorize;
use image::ImageFormat;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和内容文件、检查隐写空间是否足够、调用隐写核心函数嵌入负载，
/// 最后将结果编码写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、密钥与协议的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像或内容文件，或图像不是受支持的 BMP。
/// * 图像没有足够的空间来隐藏内容。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| sibling_path(&args.image, |_, name| format!("doctored_{name}")));
    ensure_writable(&dest, args.force)?;

    let mut picture = load_bitmap(&args.image)?;

    let text = fs::read(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    let available = steganography::max_payload(&picture, args.protocol);
    anyhow::ensure!(
        available >= text.len(),
        "Not enough space in the image to hide the text. \nRequired: {}, Available: {}",
        text.len().to_string().red().bold(),
        available.to_string().green().bold()
    );

    let key = args.key.as_deref().map(str::as_bytes);
    steganography::embed(&mut picture, &text, key, args.protocol)
        .context("Failed to hide the text in the image.")?;

    bmp::save(&picture, &dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用提取函数恢复负载，
/// 最后将恢复的内容写入目标文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取或解码输入的图像文件。
/// * 长度前缀协议下读到的长度无效 (密钥或协议不匹配)。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let dest = args.text.unwrap_or_else(|| {
        sibling_path(&args.image, |stem, _| format!("recovered_{stem}.txt"))
    });
    ensure_writable(&dest, args.force)?;

    let picture = load_bitmap(&args.image)?;

    let key = args.key.as_deref().map(str::as_bytes);
    let text = steganography::extract(&picture, key, args.protocol).with_context(|| {
        format!(
            "Failed to recover the hidden text from '{}'. \nThe image may not contain a hidden message, or the key or protocol does not match.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    fs::write(&dest, &text).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Capacity' 命令：打印图像信息与最大可嵌入字节数。
///
/// # Errors
///
/// 无法读取或解码输入的图像文件时返回错误。
pub fn handle_capacity(args: CapacityArgs) -> Result<()> {
    let picture = load_bitmap(&args.image)?;

    let kind = match picture.depth() {
        BitDepth::Rgb24 => "24-bit true color",
        BitDepth::Indexed8 => "8-bit indexed",
    };
    println!(
        "Image: {} x {}, {}",
        picture.width().to_string().green().bold(),
        picture.rows().to_string().green().bold(),
        kind
    );
    println!(
        "Pixel data: {} bytes, raw capacity: {} bytes",
        picture.pixels().len(),
        capacity::of_image(&picture)
    );
    println!(
        "Maximum payload ({:?}): {} bytes",
        args.protocol,
        steganography::max_payload(&picture, args.protocol)
            .to_string()
            .green()
            .bold()
    );
    Ok(())
}

/// 处理 'Preview' 命令：把 BMP 图像导出为 PNG。
///
/// # Errors
///
/// 目标文件已存在且未指定 `--force`、无法解码输入或无法写入 PNG 时返回错误。
pub fn handle_preview(args: PreviewArgs) -> Result<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| sibling_path(&args.image, |stem, _| format!("{stem}_preview.png")));
    ensure_writable(&dest, args.force)?;

    let picture = load_bitmap(&args.image)?;
    display::to_rgb_image(&picture)
        .save_with_format(&dest, ImageFormat::Png)
        .with_context(|| {
            format!(
                "Unable to write preview image: {}",
                dest.to_string_lossy().red().bold()
            )
        })?;

    println!(
        "The preview has been saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 读取并解码 BMP 文件。
fn load_bitmap(path: &Path) -> Result<BitmapImage> {
    let picture = bmp::load(path).with_context(|| {
        format!(
            "Unable to load image file: {}. \nOnly uncompressed 24-bit and 8-bit BMP images are supported.",
            path.to_string_lossy().red().bold()
        )
    })?;
    debug!(
        "Loaded {}: {}x{}, {} bpp",
        path.display(),
        picture.width(),
        picture.height(),
        picture.bits_per_pixel()
    );
    Ok(picture)
}

/// 在 `path` 所在目录下生成一个新文件名。`name` 接收 (文件名主干, 完整文件名)。
fn sibling_path(path: &Path, name: impl FnOnce(&str, &str) -> String) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    path.with_file_name(name(&stem, &file_name))
}

/// 目标文件已存在且未指定 `--force` 时拒绝覆盖。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}
