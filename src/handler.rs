//! # 命令处理逻辑模块
//!
//! 包含处理 `encode` 和 `decode` 子命令的高级业务逻辑。
//! 本模块负责校验文件后缀、生成默认输出名、防止意外覆盖，
//! 并把核心管线的逐步进度以彩色文本呈现给用户。

use crate::cli::{DecodeArgs, EncodeArgs};
use crate::pipeline::{self, Step, StepReporter};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// 控制台进度上报器：把核心管线的每个步骤结果打印成 INFO/ERROR 行。
/// 核心只提供步骤标识和成败布尔值，展示格式完全在这里决定。
pub struct ConsoleReporter;

impl StepReporter for ConsoleReporter {
    fn on_step(&mut self, step: Step, ok: bool) {
        if ok {
            println!(
                "{} Done: {}.",
                "INFO:".green().bold(),
                step.describe()
            );
        } else {
            eprintln!(
                "{} Could not {}!",
                "ERROR:".red().bold(),
                step.describe()
            );
        }
    }
}

/// 处理 'Encode' 命令的执行逻辑。
///
/// 负责校验输入文件后缀、确定输出路径、做覆盖保护，
/// 然后调用核心编码管线并向用户报告结果。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 载体图像不是 `.bmp` 文件，或秘密文件不是 `.txt` 文件。
/// * 输出文件已存在且未指定 `--force`。
/// * 核心编码管线的任何一步失败 (文件无法打开、容量不足、I/O 错误等)。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    ensure_suffix(&args.image, ".bmp")?;
    ensure_suffix(&args.secret, ".txt")?;

    let dest = match args.dest {
        Some(dest) => {
            ensure_suffix(&dest, ".bmp")?;
            dest
        }
        None => {
            let dest = default_encode_dest(&args.image);
            println!(
                "{} '{}' has been taken as the default name for the output file.",
                "INFO:".green().bold(),
                dest.to_string_lossy().green()
            );
            dest
        }
    };
    ensure_writable(&dest, args.force)?;

    pipeline::run_encode(&args.image, &args.secret, &dest, &mut ConsoleReporter).with_context(
        || {
            format!(
                "Failed to hide {} inside {}.",
                args.secret.to_string_lossy().red().bold(),
                args.image.to_string_lossy().red().bold()
            )
        },
    )?;

    println!(
        "The secret file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 负责校验载体图像后缀、确定输出基础名，然后调用核心解码管线。
/// 解出的扩展名会在基础名尚未以它结尾时被自动追加；
/// 返回值是最终的输出文件路径。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 载体图像不是 `.bmp` 文件。
/// * 最终输出文件已存在且未指定 `--force`。
/// * 核心解码管线的任何一步失败 (魔术标记不匹配、数据被截断等)。
pub fn handle_decode(args: DecodeArgs) -> Result<PathBuf> {
    ensure_suffix(&args.image, ".bmp")?;

    let base = match args.output {
        Some(output) => output,
        None => {
            let base = default_decode_base(&args.image);
            println!(
                "{} '{}' has been taken as the default base name for the output file.",
                "INFO:".green().bold(),
                base.to_string_lossy().green()
            );
            base
        }
    };

    // 最终文件名要等扩展名解出来才知道，覆盖保护由核心管线在
    // 打开输出文件时执行。
    let final_path = pipeline::run_decode(&args.image, &base, args.force, &mut ConsoleReporter)
        .with_context(|| {
            format!(
                "Failed to recover hidden data from {}. \nThe image may not contain a hidden file or is corrupted.",
                args.image.to_string_lossy().red().bold()
            )
        })?;

    println!(
        "The secret file has been successfully recovered and saved: {}",
        final_path.to_string_lossy().green().bold()
    );

    Ok(final_path)
}

// 后缀校验沿用最宽松的字符串判断：只要求路径以给定后缀结尾。
fn ensure_suffix(path: &Path, suffix: &str) -> Result<()> {
    anyhow::ensure!(
        path.to_string_lossy().ends_with(suffix),
        "Invalid file name {}: expected a '{}' file.",
        path.to_string_lossy().red().bold(),
        suffix.green().bold()
    );
    Ok(())
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {} \nPass --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn default_encode_dest(image: &Path) -> PathBuf {
    let name = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.bmp".to_owned());
    image.with_file_name(format!("encoded_{name}"))
}

fn default_decode_base(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned());
    image.with_file_name(format!("decoded_{stem}"))
}
