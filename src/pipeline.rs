//! # 管线编排模块
//!
//! 把编解码器、帧读写器和容量规划串成完整的编码/解码流程。
//! 每个步骤只尝试一次，任何一步失败都会立即终止整个操作，
//! 并通过 [`StepReporter`] 上报是哪个步骤失败；展示方式完全由调用方决定。

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::capacity;
use crate::constants::{BMP_HEADER_SIZE, BYTE_WINDOW, MAGIC_MARKER, SIZE_WINDOW};
use crate::error::{Result, StegoError};
use crate::frame::{self, FrameReader, FrameWriter};

/// 管线步骤标识。编码与解码各自按固定顺序经过其中的一部分。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    OpenFiles,
    CheckCapacity,
    CopyHeader,
    WriteMarker,
    WriteExtnSize,
    WriteExtn,
    WritePayloadSize,
    WritePayload,
    CopyRemainder,
    OpenSource,
    SkipHeader,
    CheckMarker,
    ReadExtnSize,
    ReadExtn,
    OpenOutput,
    ReadPayloadSize,
    ReadPayload,
    Verify,
}

impl Step {
    /// 步骤的英文描述，供上报层拼接用户可见的进度信息。
    pub fn describe(self) -> &'static str {
        match self {
            Step::OpenFiles => "open the input and output files",
            Step::CheckCapacity => "check the carrier capacity",
            Step::CopyHeader => "copy the bitmap header",
            Step::WriteMarker => "encode the magic marker",
            Step::WriteExtnSize => "encode the extension size",
            Step::WriteExtn => "encode the secret file extension",
            Step::WritePayloadSize => "encode the secret file size",
            Step::WritePayload => "encode the secret file data",
            Step::CopyRemainder => "copy the remaining carrier bytes",
            Step::OpenSource => "open the source image",
            Step::SkipHeader => "skip the bitmap header",
            Step::CheckMarker => "check the magic marker",
            Step::ReadExtnSize => "decode the extension size",
            Step::ReadExtn => "decode the secret file extension",
            Step::OpenOutput => "open the output file",
            Step::ReadPayloadSize => "decode the secret file size",
            Step::ReadPayload => "decode the secret file data",
            Step::Verify => "verify the output size",
        }
    }
}

/// 每完成一个步骤 (无论成败) 核心都会回调一次。
pub trait StepReporter {
    fn on_step(&mut self, step: Step, ok: bool);
}

// 上报步骤结果后原样传递 Result，失败时由 `?` 终止整条管线。
fn stage<T, P: StepReporter>(reporter: &mut P, step: Step, result: Result<T>) -> Result<T> {
    reporter.on_step(step, result.is_ok());
    result
}

/// 执行完整的编码管线：把 `secret_path` 的内容隐写进 `carrier_path`，
/// 结果写入 `dest_path`。
///
/// # Errors
///
/// 任何一步失败都会返回对应的 [`StegoError`]；容量检查失败发生在
/// 向输出写入任何经过变换的字节之前。
pub fn run_encode<P: StepReporter>(
    carrier_path: &Path,
    secret_path: &Path,
    dest_path: &Path,
    reporter: &mut P,
) -> Result<()> {
    let (mut src, secret, mut dst) = stage(
        reporter,
        Step::OpenFiles,
        open_encode_files(carrier_path, secret_path, dest_path),
    )?;

    let extension = secret_extension(secret_path);
    let header = stage(
        reporter,
        Step::CheckCapacity,
        check_capacity(&mut src, &extension, &secret),
    )?;

    stage(
        reporter,
        Step::CopyHeader,
        frame::drain_window(&mut dst, &header),
    )?;

    let mut writer = FrameWriter::new(src, dst);
    stage(
        reporter,
        Step::WriteMarker,
        writer.write_bytes(&MAGIC_MARKER).map(|_| ()),
    )?;
    stage(
        reporter,
        Step::WriteExtnSize,
        writer.write_size(extension.len() as u32),
    )?;
    stage(
        reporter,
        Step::WriteExtn,
        writer.write_bytes(extension.as_bytes()).map(|_| ()),
    )?;
    stage(
        reporter,
        Step::WritePayloadSize,
        writer.write_size(secret.len() as u32),
    )?;
    stage(
        reporter,
        Step::WritePayload,
        writer.write_bytes(&secret).map(|_| ()),
    )?;

    let (mut src, mut dst) = writer.into_parts();
    stage(
        reporter,
        Step::CopyRemainder,
        io::copy(&mut src, &mut dst).map(|_| ()).map_err(StegoError::Io),
    )?;

    stage(
        reporter,
        Step::Verify,
        verify_encode(carrier_path, dest_path, dst),
    )
}

/// 执行完整的解码管线，返回最终的输出文件路径。
///
/// 恢复出的扩展名只在 `output_base` 尚未以它结尾时才会被追加，
/// 避免出现 `.txt.txt` 这类重复后缀。覆盖保护必须在这里做：
/// 最终文件名要等扩展名解出来之后才能确定，调用方没有机会提前检查。
///
/// # Errors
///
/// 魔术标记不匹配返回 [`StegoError::MarkerMismatch`]；解出的长度字段
/// 超出载体剩余容量时返回 [`StegoError::SizeIntegrity`]，绝不会按
/// 垃圾长度去分配或读取；`force` 为假且最终输出文件已存在时返回
/// [`StegoError::FileOpen`]，已有文件原样保留。
pub fn run_decode<P: StepReporter>(
    carrier_path: &Path,
    output_base: &Path,
    force: bool,
    reporter: &mut P,
) -> Result<PathBuf> {
    let (mut src, total_len) = stage(reporter, Step::OpenSource, open_source(carrier_path))?;
    let mut remaining = total_len.saturating_sub(BMP_HEADER_SIZE as u64);

    stage(reporter, Step::SkipHeader, skip_header(&mut src))?;

    let mut reader = FrameReader::new(src);
    stage(reporter, Step::CheckMarker, reader.read_marker(&MAGIC_MARKER))?;
    remaining = remaining.saturating_sub((MAGIC_MARKER.len() * BYTE_WINDOW) as u64);

    let extn_len = stage(
        reporter,
        Step::ReadExtnSize,
        read_checked_size(&mut reader, &mut remaining),
    )?;
    let extension_bytes = stage(
        reporter,
        Step::ReadExtn,
        reader.read_bytes(extn_len as usize),
    )?;
    remaining = remaining.saturating_sub(u64::from(extn_len) * BYTE_WINDOW as u64);
    let extension = String::from_utf8_lossy(&extension_bytes).into_owned();

    let (final_path, mut out) = stage(
        reporter,
        Step::OpenOutput,
        open_output(output_base, &extension, force),
    )?;

    let payload_len = stage(
        reporter,
        Step::ReadPayloadSize,
        read_checked_size(&mut reader, &mut remaining),
    )?;
    stage(
        reporter,
        Step::ReadPayload,
        read_payload(&mut reader, payload_len, &mut out),
    )?;

    stage(
        reporter,
        Step::Verify,
        verify_decode(&final_path, payload_len, out),
    )?;

    Ok(final_path)
}

/// 从秘密文件的文件名推导扩展名：从第一个 `.` 开始的后缀 (含点)。
/// 文件名里没有 `.` 时返回空串，按零长度扩展名编码。
pub fn secret_extension(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.find('.').map(|dot| name[dot..].to_owned()))
        .unwrap_or_default()
}

fn open_err(path: &Path, source: io::Error) -> StegoError {
    StegoError::FileOpen {
        path: path.to_path_buf(),
        source,
    }
}

type CarrierSource = BufReader<File>;
type CarrierSink = BufWriter<File>;

fn open_encode_files(
    carrier: &Path,
    secret: &Path,
    dest: &Path,
) -> Result<(CarrierSource, Vec<u8>, CarrierSink)> {
    let src = File::open(carrier).map_err(|err| open_err(carrier, err))?;
    let secret_data = fs::read(secret).map_err(|err| open_err(secret, err))?;
    let dst = File::create(dest).map_err(|err| open_err(dest, err))?;

    Ok((BufReader::new(src), secret_data, BufWriter::new(dst)))
}

// 读出 54 字节头部并做容量检查；头部字节留给 COPY_HEADER 原样写出。
fn check_capacity(
    src: &mut CarrierSource,
    extension: &str,
    secret: &[u8],
) -> Result<[u8; BMP_HEADER_SIZE]> {
    let mut header = [0u8; BMP_HEADER_SIZE];
    frame::fill_window(src, &mut header)?;

    // 长度字段只有 32 位，超出的数据不可能被正确编码。
    if u32::try_from(secret.len()).is_err() {
        return Err(StegoError::SizeIntegrity {
            expected: u64::from(u32::MAX),
            actual: secret.len() as u64,
        });
    }

    let pixel_bytes = capacity::bmp_pixel_capacity(&header);
    capacity::plan_encode(pixel_bytes, extension.len(), secret.len())?;

    Ok(header)
}

fn verify_encode(carrier: &Path, dest: &Path, mut dst: CarrierSink) -> Result<()> {
    dst.flush()?;
    drop(dst);

    let expected = fs::metadata(carrier)?.len();
    let actual = fs::metadata(dest)?.len();

    if expected == actual {
        Ok(())
    } else {
        Err(StegoError::SizeIntegrity { expected, actual })
    }
}

fn open_source(carrier: &Path) -> Result<(CarrierSource, u64)> {
    let file = File::open(carrier).map_err(|err| open_err(carrier, err))?;
    let total_len = file.metadata()?.len();

    Ok((BufReader::new(file), total_len))
}

fn skip_header<R: Read>(src: &mut R) -> Result<()> {
    let mut header = [0u8; BMP_HEADER_SIZE];
    frame::fill_window(src, &mut header)
}

// 解出一个长度字段，并立即用载体的剩余字节数做合法性约束：
// 声称的长度装不进剩下的载体时按完整性错误拒绝，而不是带着垃圾长度继续。
fn read_checked_size<R: Read>(reader: &mut FrameReader<R>, remaining: &mut u64) -> Result<u32> {
    let value = reader.read_size()?;
    *remaining = remaining.saturating_sub(SIZE_WINDOW as u64);

    let needed = u64::from(value) * BYTE_WINDOW as u64;
    if needed > *remaining {
        return Err(StegoError::SizeIntegrity {
            expected: needed,
            actual: *remaining,
        });
    }

    Ok(value)
}

// 追加扩展名得到最终路径后才打开输出文件；`force` 为假时用
// create_new 原子地拒绝已存在的文件，不会先截断再报错。
fn open_output(base: &Path, extension: &str, force: bool) -> Result<(PathBuf, CarrierSink)> {
    let mut name = base.as_os_str().to_string_lossy().into_owned();
    if !extension.is_empty() && !name.ends_with(extension) {
        name.push_str(extension);
    }

    let path = PathBuf::from(name);
    let file = if force {
        File::create(&path)
    } else {
        File::create_new(&path)
    }
    .map_err(|err| open_err(&path, err))?;

    Ok((path, BufWriter::new(file)))
}

fn read_payload<R: Read>(
    reader: &mut FrameReader<R>,
    count: u32,
    out: &mut CarrierSink,
) -> Result<()> {
    let payload = reader.read_bytes(count as usize)?;
    frame::drain_window(out, &payload)
}

fn verify_decode(path: &Path, payload_len: u32, mut out: CarrierSink) -> Result<()> {
    out.flush()?;
    drop(out);

    let expected = u64::from(payload_len);
    let actual = fs::metadata(path)?.len();

    if expected == actual {
        Ok(())
    } else {
        Err(StegoError::SizeIntegrity { expected, actual })
    }
}
