//! 数据获取与解码模块
//!
//! 负责 MNIST 归档的本地缓存、并发下载与 IDX 格式解码。
//!
//! # 主要组件
//!
//! - [`load_data`]: 一步得到 (train, test) 两个 [`Set`]
//! - [`MnistConfig`]: 数据目录、下载地址、超时等配置
//! - [`acquire`]: 并发下载，任一失败即取消其余下载
//! - [`idx`]: gzip 压缩的 IDX 图像/标签归档解码
//! - [`transforms`]: 转换为 ndarray（归一化、one-hot 等）
//! - [`DataError`]: 错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use only_mnist::data::load_data;
//!
//! let (train, test) = load_data(None)?;
//! assert_eq!(train.count(), 60000);
//!
//! let (image, label) = train.get(0)?;
//! let batch = train.slice(0, 32)?;
//! ```

pub mod acquire;
pub mod cancel;
pub mod datasets;
pub mod download;
pub mod error;
pub mod idx;
mod set;
pub mod transforms;

#[cfg(test)]
mod tests;

// Re-exports
pub use acquire::{RemoteFile, download_files, download_files_async, download_files_with_cancel};
pub use tokio_util::sync::CancellationToken;
pub use datasets::{MnistConfig, Split, load_data, load_set};
pub use error::DataError;
pub use set::{IMAGE_HEIGHT, IMAGE_LEN, IMAGE_WIDTH, Image, Label, NUM_CLASSES, Set};
