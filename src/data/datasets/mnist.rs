//! MNIST 手写数字数据集
//!
//! 支持：
//! - 检查本地缓存，缺失文件并发下载（任一失败即全部取消）
//! - IDX 二进制格式解析（.gz 压缩）
//! - 训练集/测试集的图像数与标签数交叉校验
//!
//! 注意：“检查文件是否存在 → 下载”不是原子操作。多个进程同时对同一目录加载时，
//! 可能重复下载同一文件（后写入者覆盖，内容完整），此处不做串行化。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::acquire::{RemoteFile, download_files};
use crate::data::error::DataError;
use crate::data::idx::{read_images, read_labels};
use crate::data::set::Set;

/// MNIST 下载地址（使用 AWS S3 镜像，原官网 yann.lecun.com 不稳定）
pub const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

pub const TRAIN_IMAGES_FILE: &str = "train-images-idx3-ubyte.gz";
pub const TRAIN_LABELS_FILE: &str = "train-labels-idx1-ubyte.gz";
pub const TEST_IMAGES_FILE: &str = "t10k-images-idx3-ubyte.gz";
pub const TEST_LABELS_FILE: &str = "t10k-labels-idx1-ubyte.gz";

/// MNIST 文件信息（文件名, MD5）
pub const MNIST_FILES: [(&str, &str); 4] = [
    (TRAIN_IMAGES_FILE, "f68b3c2dcbeaaa9fbdd348bbdeb94873"),
    (TRAIN_LABELS_FILE, "d53e105ee54ea40749a09fcbcd1e9432"),
    (TEST_IMAGES_FILE, "9fb629c4189551a2d022fa330f9573f3"),
    (TEST_LABELS_FILE, "ec29112dd5afa0611ce80d1b7f02629c"),
];

/// 数据集划分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// 训练集（60000）
    Train,
    /// 测试集（10000）
    Test,
}

impl Split {
    /// (图像文件名, 标签文件名)
    pub fn file_names(self) -> (&'static str, &'static str) {
        match self {
            Split::Train => (TRAIN_IMAGES_FILE, TRAIN_LABELS_FILE),
            Split::Test => (TEST_IMAGES_FILE, TEST_LABELS_FILE),
        }
    }
}

/// 加载配置
///
/// # 示例
/// ```ignore
/// let config = MnistConfig::default()
///     .root("./data/mnist")
///     .timeout_secs(30);
/// let (train, test) = config.load()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MnistConfig {
    /// 数据目录，None 则使用系统临时目录
    pub root: Option<PathBuf>,
    /// 远程地址前缀，与文件名拼接得到下载地址
    pub base_url: String,
    /// 单个请求的整体超时（秒）
    pub timeout_secs: u64,
    /// 是否对新下载的文件做 MD5 校验（已缓存文件只检查存在性）
    pub verify_checksums: bool,
}

impl Default for MnistConfig {
    fn default() -> Self {
        Self {
            root: None,
            base_url: MNIST_BASE_URL.to_string(),
            timeout_secs: 60,
            verify_checksums: true,
        }
    }
}

impl MnistConfig {
    /// 从 JSON 字符串读取配置，缺省字段取默认值
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从 JSON 文件读取配置
    pub fn from_json_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// 实际使用的数据目录
    pub fn data_dir(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// 文件名对应的下载地址
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file_name)
    }

    /// 本地缺失的文件（文件名 → 远程信息）
    pub fn missing_files(&self) -> BTreeMap<String, RemoteFile> {
        let data_dir = self.data_dir();
        let mut missing = BTreeMap::new();
        for (name, md5) in MNIST_FILES {
            if data_dir.join(name).exists() {
                log::debug!("使用缓存: {:?}", data_dir.join(name));
                continue;
            }
            let mut remote = RemoteFile::new(self.url_for(name));
            if self.verify_checksums {
                remote = remote.with_md5(md5);
            }
            missing.insert(name.to_string(), remote);
        }
        missing
    }

    /// 下载缺失文件（如有）
    pub fn ensure_files(&self) -> Result<(), DataError> {
        let missing = self.missing_files();
        if missing.is_empty() {
            return Ok(());
        }
        let data_dir = self.data_dir();
        std::fs::create_dir_all(&data_dir)?;
        log::info!("需要下载 {} 个文件到 {data_dir:?}", missing.len());
        download_files(
            &data_dir,
            &missing,
            Duration::from_secs(self.timeout_secs),
        )
    }

    /// 加载训练集与测试集
    pub fn load(&self) -> Result<(Set, Set), DataError> {
        self.ensure_files()?;
        let train = self.read_split(Split::Train)?;
        let test = self.read_split(Split::Test)?;
        Ok((train, test))
    }

    /// 只加载一个划分（缺失文件同样会被下载）
    pub fn load_split(&self, split: Split) -> Result<Set, DataError> {
        self.ensure_files()?;
        self.read_split(split)
    }

    fn read_split(&self, split: Split) -> Result<Set, DataError> {
        let (images_file, labels_file) = split.file_names();
        let data_dir = self.data_dir();
        load_set(&data_dir.join(images_file), &data_dir.join(labels_file))
    }
}

/// 加载 MNIST 训练集与测试集
///
/// # 参数
/// - `directory`: 数据目录，None 则使用系统临时目录
///
/// # 返回
/// (train, test)；任何一步失败都不返回数据
pub fn load_data(directory: Option<&Path>) -> Result<(Set, Set), DataError> {
    let mut config = MnistConfig::default();
    config.root = directory.map(Path::to_path_buf);
    config.load()
}

/// 解码一对图像/标签归档并组装为 Set
pub fn load_set(images_path: &Path, labels_path: &Path) -> Result<Set, DataError> {
    let images = read_images(images_path)?;
    let labels = read_labels(labels_path)?;
    Set::new(images, labels)
}
