//! 数据变换函数
//!
//! 将解码后的样本转换为 ndarray 矩阵/向量，如像素归一化、标签 one-hot 编码等。

use ndarray::{Array1, Array2};

use super::error::DataError;
use super::set::{IMAGE_LEN, Image, Label};

/// 将单张图像转换为 `rows x cols` 矩阵
///
/// # 参数
/// - `rows`, `cols`: 矩阵形状，乘积必须为 784（如 28x28 或 1x784）
pub fn image_to_array(image: &Image, rows: usize, cols: usize) -> Result<Array2<f32>, DataError> {
    image_to_array_scaled(image, rows, cols, 1.0)
}

/// 将图像逐张转换为 `rows x cols` 矩阵，像素保持 0-255
pub fn images_to_arrays(
    images: &[Image],
    rows: usize,
    cols: usize,
) -> Result<Vec<Array2<f32>>, DataError> {
    normalized_images_to_arrays(images, rows, cols, 1.0)
}

/// 将图像逐张转换为 `rows x cols` 矩阵，每个像素除以 `divisor`
///
/// # 示例
/// ```ignore
/// // 像素归一化到 [0, 1]
/// let arrays = normalized_images_to_arrays(train.images(), 28, 28, 255.0)?;
/// ```
pub fn normalized_images_to_arrays(
    images: &[Image],
    rows: usize,
    cols: usize,
    divisor: f32,
) -> Result<Vec<Array2<f32>>, DataError> {
    images
        .iter()
        .map(|image| image_to_array_scaled(image, rows, cols, divisor))
        .collect()
}

/// 将 0-255 像素值归一化到 0-1
pub fn normalize_pixels(
    images: &[Image],
    rows: usize,
    cols: usize,
) -> Result<Vec<Array2<f32>>, DataError> {
    normalized_images_to_arrays(images, rows, cols, 255.0)
}

/// 标签转为向量
pub fn labels_to_array(labels: &[Label]) -> Array1<f32> {
    labels.iter().map(|label| label.value() as f32).collect()
}

/// 将标签转换为 one-hot 编码
///
/// # 返回
/// one-hot 编码矩阵，形状 [N, num_classes]；超出 num_classes 的标签整行为 0
///
/// # 示例
/// ```ignore
/// let encoded = one_hot(&[label_0, label_2, label_1], 3);
/// // 结果: [[1,0,0], [0,0,1], [0,1,0]]
/// ```
pub fn one_hot(labels: &[Label], num_classes: usize) -> Array2<f32> {
    let mut encoded = Array2::zeros((labels.len(), num_classes));
    for (i, label) in labels.iter().enumerate() {
        let class_idx = label.value() as usize;
        if class_idx < num_classes {
            encoded[[i, class_idx]] = 1.0;
        }
    }
    encoded
}

fn image_to_array_scaled(
    image: &Image,
    rows: usize,
    cols: usize,
    divisor: f32,
) -> Result<Array2<f32>, DataError> {
    if rows * cols != IMAGE_LEN {
        return Err(DataError::ShapeMismatch {
            expected: vec![IMAGE_LEN],
            got: vec![rows, cols],
        });
    }
    let data: Vec<f32> = image.pixels().iter().map(|&p| p as f32 / divisor).collect();
    Array2::from_shape_vec((rows, cols), data).map_err(|_| DataError::ShapeMismatch {
        expected: vec![IMAGE_LEN],
        got: vec![rows, cols],
    })
}
