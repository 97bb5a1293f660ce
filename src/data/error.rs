//! 数据获取与解码错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 数据获取、解码相关错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 请求无法构造、发送，或超时
    #[error("传输错误 ({url}): {message}")]
    Transport { url: String, message: String },

    /// 同批次中其他下载失败，本次下载被取消（属于传输错误）
    #[error("下载已取消: {url}")]
    Cancelled { url: String },

    /// HTTP 状态码非 200
    #[error("HTTP 状态码错误 ({url}): {status}")]
    BadStatus { url: String, status: u16 },

    /// 文件未找到
    #[error("文件未找到: {0}")]
    FileNotFound(PathBuf),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 格式错误（如 magic number 不匹配）
    #[error("格式错误: {0}")]
    FormatError(String),

    /// 同一划分内图像数与标签数不一致
    #[error("图像与标签数量不一致: 图像 {images}, 标签 {labels}")]
    CountMismatch { images: usize, labels: usize },

    /// 校验和不匹配
    #[error("校验和不匹配: 期望 {expected}, 实际 {got}")]
    ChecksumMismatch { expected: String, got: String },

    /// 索引越界
    #[error("索引越界: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 切片范围无效
    #[error("切片范围无效: [{start}, {end}) 超出 0..{len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// 形状不匹配
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// 未指定下载目录
    #[error("未指定下载目录")]
    DirectoryNotSpecified,

    /// 配置解析失败
    #[error("配置错误: {0}")]
    Config(#[from] serde_json::Error),
}
