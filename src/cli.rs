//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::protocol::Protocol;
use clap::Parser;
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在未压缩的 24 位或 8 位 BMP 图像中隐藏或恢复数据。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在未压缩的 24 位或 8 位 BMP 图像中隐藏或恢复数据。\n\
                  提供 --key 时，比特位按由密钥派生的伪随机顺序散布。这只是混淆，不是加密。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在 BMP 图像中隐藏文件内容。
    Hide(HideArgs),

    /// 从经过隐写的 BMP 图像中恢复隐藏的内容。
    Recover(RecoverArgs),

    /// 显示图像信息与可嵌入的最大字节数。
    Capacity(CapacityArgs),

    /// 将 BMP 图像导出为 PNG 预览。
    Preview(PreviewArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的输入 BMP 图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的内容的文件路径。
    #[arg(short, long)]
    pub text: PathBuf,

    /// 结果图像的输出路径。默认为输入文件旁的 `doctored_<文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 用于打乱嵌入顺序的密钥。恢复时必须提供相同的密钥。
    #[arg(short, long)]
    pub key: Option<String>,

    /// 负载定界协议。恢复时必须使用相同的协议。
    #[arg(short, long, value_enum, default_value_t = Protocol::Sentinel)]
    pub protocol: Protocol,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的 BMP 图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复内容的输出路径。默认为输入文件旁的 `recovered_<文件名主干>.txt`。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 隐藏时使用的密钥。
    #[arg(short, long)]
    pub key: Option<String>,

    /// 隐藏时使用的协议。
    #[arg(short, long, value_enum, default_value_t = Protocol::Sentinel)]
    pub protocol: Protocol,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要查询的 BMP 图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 按此协议计算可用字节数。
    #[arg(short, long, value_enum, default_value_t = Protocol::Sentinel)]
    pub protocol: Protocol,
}

/// 'preview' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// 要预览的 BMP 图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// PNG 输出路径。默认为输入文件旁的 `<文件名主干>_preview.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}
