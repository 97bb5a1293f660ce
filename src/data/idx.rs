//! IDX 归档解码（gzip 压缩）
//!
//! 图像归档头部：
//! - [0-3] magic number (0x00000803 = 2051)
//! - [4-7] number of images
//! - [8-11] number of rows (28)
//! - [12-15] number of columns (28)
//! - [16+] 每张图像 784 字节
//!
//! 标签归档头部：
//! - [0-3] magic number (0x00000801 = 2049)
//! - [4-7] number of labels
//! - [8+] 每个标签 1 字节 (0-9)
//!
//! 头部在读取任何样本数据前完成校验。

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::GzDecoder;

use super::error::DataError;
use super::set::{IMAGE_HEIGHT, IMAGE_LEN, IMAGE_WIDTH, Image, Label};

/// 图像归档的 magic number
pub const IMAGE_MAGIC: u32 = 0x0000_0803;
/// 标签归档的 magic number
pub const LABEL_MAGIC: u32 = 0x0000_0801;

/// 预分配上限，避免损坏的 count 触发巨量分配
const MAX_PREALLOC: usize = 1 << 16;

/// 归档种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Images,
    Labels,
}

impl ArchiveKind {
    pub fn magic(self) -> u32 {
        match self {
            ArchiveKind::Images => IMAGE_MAGIC,
            ArchiveKind::Labels => LABEL_MAGIC,
        }
    }
}

/// 已校验的归档头部
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveHeader {
    Images {
        count: usize,
        rows: usize,
        cols: usize,
    },
    Labels {
        count: usize,
    },
}

impl ArchiveHeader {
    /// 读取并校验 `kind` 类型的头部
    pub fn read<R: Read>(kind: ArchiveKind, reader: &mut R) -> Result<Self, DataError> {
        let magic = read_u32(reader, "magic number")?;
        if magic != kind.magic() {
            return Err(DataError::FormatError(format!(
                "无效的 magic number: {magic:#010x} (期望 {:#010x})",
                kind.magic()
            )));
        }
        let count = read_u32(reader, "样本数")? as usize;

        match kind {
            ArchiveKind::Labels => Ok(ArchiveHeader::Labels { count }),
            ArchiveKind::Images => {
                let rows = read_u32(reader, "行数")? as usize;
                let cols = read_u32(reader, "列数")? as usize;
                if rows != IMAGE_HEIGHT || cols != IMAGE_WIDTH {
                    return Err(DataError::FormatError(format!(
                        "无效的图像尺寸: {rows}x{cols} (期望 {IMAGE_HEIGHT}x{IMAGE_WIDTH})"
                    )));
                }
                Ok(ArchiveHeader::Images { count, rows, cols })
            }
        }
    }

    pub fn kind(&self) -> ArchiveKind {
        match self {
            ArchiveHeader::Images { .. } => ArchiveKind::Images,
            ArchiveHeader::Labels { .. } => ArchiveKind::Labels,
        }
    }

    /// 声明的样本数
    pub fn count(&self) -> usize {
        match *self {
            ArchiveHeader::Images { count, .. } | ArchiveHeader::Labels { count } => count,
        }
    }

    /// 单条记录的字节数
    pub fn record_len(&self) -> usize {
        match *self {
            ArchiveHeader::Images { rows, cols, .. } => rows * cols,
            ArchiveHeader::Labels { .. } => 1,
        }
    }
}

/// 解码 gzip 压缩的图像归档
pub fn read_images(path: &Path) -> Result<Vec<Image>, DataError> {
    let images = decode_images(open_gz(path)?)?;
    log::info!("解码 {path:?}: {} 张图像", images.len());
    Ok(images)
}

/// 解码 gzip 压缩的标签归档
pub fn read_labels(path: &Path) -> Result<Vec<Label>, DataError> {
    let labels = decode_labels(open_gz(path)?)?;
    log::info!("解码 {path:?}: {} 个标签", labels.len());
    Ok(labels)
}

/// 从已解压的字节流解码图像归档
pub fn decode_images<R: Read>(mut reader: R) -> Result<Vec<Image>, DataError> {
    let header = ArchiveHeader::read(ArchiveKind::Images, &mut reader)?;
    debug_assert_eq!(header.record_len(), IMAGE_LEN);
    decode_records(&mut reader, &header, Image::from_slice)
}

/// 从已解压的字节流解码标签归档
pub fn decode_labels<R: Read>(mut reader: R) -> Result<Vec<Label>, DataError> {
    let header = ArchiveHeader::read(ArchiveKind::Labels, &mut reader)?;
    decode_records(&mut reader, &header, |record| Label::new(record[0]))
}

fn open_gz(path: &Path) -> Result<BufReader<GzDecoder<File>>, DataError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataError::FileNotFound(path.to_path_buf()),
        _ => DataError::IoError(e),
    })?;
    Ok(BufReader::new(GzDecoder::new(file)))
}

/// 依次读取 `header.count()` 条定长记录
fn decode_records<R, T, F>(
    reader: &mut R,
    header: &ArchiveHeader,
    decode: F,
) -> Result<Vec<T>, DataError>
where
    R: Read,
    F: Fn(&[u8]) -> Result<T, DataError>,
{
    let count = header.count();
    let mut record = vec![0u8; header.record_len()];
    let mut out = Vec::with_capacity(count.min(MAX_PREALLOC));
    for i in 0..count {
        reader.read_exact(&mut record).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => DataError::FormatError(format!(
                "归档被截断: 声明 {count} 条记录，仅读到 {i} 条"
            )),
            _ => DataError::IoError(e),
        })?;
        out.push(decode(&record)?);
    }
    Ok(out)
}

fn read_u32<R: Read>(reader: &mut R, field: &str) -> Result<u32, DataError> {
    reader.read_u32::<BigEndian>().map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => {
            DataError::FormatError(format!("读取头部失败: {field} 不完整"))
        }
        _ => DataError::IoError(e),
    })
}
