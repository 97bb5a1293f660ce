/*
 * @Description  : MNIST 样本的数据模型：Image、Label 与 Set
 *
 * Set 内部以 Arc 共享底层存储，slice 只产生新的只读视图，不复制样本。
 */

use std::ops::{Index, Range};
use std::sync::Arc;

use super::error::DataError;

/// 图像宽度（列数）
pub const IMAGE_WIDTH: usize = 28;
/// 图像高度（行数）
pub const IMAGE_HEIGHT: usize = 28;
/// 单张图像的像素数
pub const IMAGE_LEN: usize = IMAGE_WIDTH * IMAGE_HEIGHT;
/// 类别数（数字 0-9）
pub const NUM_CLASSES: usize = 10;

/// 28x28 灰度图像，按行优先存储
#[derive(Clone, PartialEq, Eq)]
pub struct Image([u8; IMAGE_LEN]);

impl Image {
    pub fn new(pixels: [u8; IMAGE_LEN]) -> Self {
        Self(pixels)
    }

    /// 从恰好 784 字节的切片构造
    pub fn from_slice(pixels: &[u8]) -> Result<Self, DataError> {
        let pixels: [u8; IMAGE_LEN] = pixels.try_into().map_err(|_| DataError::ShapeMismatch {
            expected: vec![IMAGE_LEN],
            got: vec![pixels.len()],
        })?;
        Ok(Self(pixels))
    }

    pub fn pixels(&self) -> &[u8; IMAGE_LEN] {
        &self.0
    }

    /// 第 `row` 行、第 `col` 列的像素
    ///
    /// # Panics
    /// 行或列超出 28
    pub fn pixel(&self, row: usize, col: usize) -> u8 {
        assert!(
            row < IMAGE_HEIGHT && col < IMAGE_WIDTH,
            "像素坐标 ({row}, {col}) 超出 {IMAGE_HEIGHT}x{IMAGE_WIDTH}"
        );
        self.0[row * IMAGE_WIDTH + col]
    }
}

impl Index<usize> for Image {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.0[index]
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.0.iter().filter(|&&p| p > 0).count();
        write!(f, "Image({IMAGE_HEIGHT}x{IMAGE_WIDTH}, 非零像素 {lit})")
    }
}

/// 数字类别，取值 [0, 9]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(u8);

impl Label {
    pub fn new(value: u8) -> Result<Self, DataError> {
        if (value as usize) < NUM_CLASSES {
            Ok(Self(value))
        } else {
            Err(DataError::FormatError(format!(
                "标签 {value} 超出范围 [0, {}]",
                NUM_CLASSES - 1
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> u8 {
        label.0
    }
}

/// 一个划分（训练集或测试集）的全部样本
///
/// 不变式：图像数恒等于标签数。
#[derive(Debug, Clone)]
pub struct Set {
    images: Arc<[Image]>,
    labels: Arc<[Label]>,
    range: Range<usize>,
}

impl Set {
    /// 创建新的 Set
    ///
    /// # 返回
    /// 图像数与标签数不一致时返回 `DataError::CountMismatch`
    pub fn new(images: Vec<Image>, labels: Vec<Label>) -> Result<Self, DataError> {
        if images.len() != labels.len() {
            return Err(DataError::CountMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }
        let len = labels.len();
        Ok(Self {
            images: images.into(),
            labels: labels.into(),
            range: 0..len,
        })
    }

    /// 样本数量
    pub fn count(&self) -> usize {
        self.range.len()
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// 获取第 index 个样本
    pub fn get(&self, index: usize) -> Result<(&Image, Label), DataError> {
        if index >= self.count() {
            return Err(DataError::IndexOutOfBounds {
                index,
                len: self.count(),
            });
        }
        let i = self.range.start + index;
        Ok((&self.images[i], self.labels[i]))
    }

    /// 取 [start, end) 的样本，返回共享存储的新 Set
    pub fn slice(&self, start: usize, end: usize) -> Result<Set, DataError> {
        if start > end || end > self.count() {
            return Err(DataError::InvalidRange {
                start,
                end,
                len: self.count(),
            });
        }
        Ok(Set {
            images: Arc::clone(&self.images),
            labels: Arc::clone(&self.labels),
            range: self.range.start + start..self.range.start + end,
        })
    }

    pub fn images(&self) -> &[Image] {
        &self.images[self.range.clone()]
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels[self.range.clone()]
    }

    /// 按顺序遍历 (image, label)
    pub fn iter(&self) -> impl Iterator<Item = (&Image, Label)> + '_ {
        self.images().iter().zip(self.labels().iter().copied())
    }
}
