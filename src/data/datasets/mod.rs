//! 内置数据集
//!
//! - MNIST：手写数字分类

mod mnist;

pub use mnist::{
    MNIST_BASE_URL, MNIST_FILES, MnistConfig, Split, TEST_IMAGES_FILE, TEST_LABELS_FILE,
    TRAIN_IMAGES_FILE, TRAIN_LABELS_FILE, load_data, load_set,
};
