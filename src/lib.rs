//! # Only MNIST
//!
//! `only_mnist`负责获取并解码[MNIST](http://yann.lecun.com/exdb/mnist/)手写数字数据集：
//! 缺失的归档文件并发下载并缓存在本地目录，随后解码为强类型的 [`data::Set`]，
//! 供后续数值计算使用。
//!

pub mod data;

pub use data::{DataError, Image, Label, MnistConfig, Set, load_data};
