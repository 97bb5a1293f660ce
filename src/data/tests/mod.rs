//! data 模块单元测试及测试工具
//!
//! - [`TestDir`]: 临时目录，离开作用域时删除
//! - 归档构造函数：按 IDX 格式生成（可选 gzip）字节
//! - [`TestServer`]: 进程内 HTTP 服务，统计请求次数，可返回错误状态、缓慢输出或不响应


use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use flate2::Compression;
use flate2::write::GzEncoder;
use md5::{Digest, Md5};

use crate::data::datasets::{TEST_IMAGES_FILE, TEST_LABELS_FILE, TRAIN_IMAGES_FILE, TRAIN_LABELS_FILE};
use crate::data::idx::{IMAGE_MAGIC, LABEL_MAGIC};
use crate::data::set::IMAGE_LEN;

/// 临时目录
pub(super) struct TestDir(PathBuf);

impl TestDir {
    pub fn new(tag: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "only_mnist_{tag}_{}_{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// 第 i 张图像第 j 个像素的取值
pub(super) fn pixel_value(i: usize, j: usize) -> u8 {
    ((i * 7 + j) % 256) as u8
}

/// 未压缩的图像归档：指定头部字段 + `count` 张图像数据
pub(super) fn image_archive(magic: u32, count: u32, rows: u32, cols: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    for field in [magic, count, rows, cols] {
        bytes.extend_from_slice(&field.to_be_bytes());
    }
    for i in 0..count as usize {
        bytes.extend((0..IMAGE_LEN).map(|j| pixel_value(i, j)));
    }
    bytes
}

/// 未压缩的标签归档：第 i 个标签为 i % 10
pub(super) fn label_archive(magic: u32, count: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    for field in [magic, count] {
        bytes.extend_from_slice(&field.to_be_bytes());
    }
    bytes.extend((0..count as usize).map(|i| (i % 10) as u8));
    bytes
}

pub(super) fn valid_images(count: u32) -> Vec<u8> {
    image_archive(IMAGE_MAGIC, count, 28, 28)
}

pub(super) fn valid_labels(count: u32) -> Vec<u8> {
    label_archive(LABEL_MAGIC, count)
}

pub(super) fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

pub(super) fn write_gz(path: &Path, bytes: &[u8]) {
    fs::write(path, gzip(bytes)).unwrap();
}

/// 四个归档文件名 → gzip 内容
pub(super) fn mnist_archives(train: u32, test: u32) -> Vec<(&'static str, Vec<u8>)> {
    vec![
        (TRAIN_IMAGES_FILE, gzip(&valid_images(train))),
        (TRAIN_LABELS_FILE, gzip(&valid_labels(train))),
        (TEST_IMAGES_FILE, gzip(&valid_images(test))),
        (TEST_LABELS_FILE, gzip(&valid_labels(test))),
    ]
}

/// 在目录中写入完整的四个归档
pub(super) fn write_mnist_dir(dir: &Path, train: u32, test: u32) {
    for (name, bytes) in mnist_archives(train, test) {
        fs::write(dir.join(name), bytes).unwrap();
    }
}

/// 数据的 MD5 十六进制串
pub(super) fn compute_md5(data: &[u8]) -> String {
    format!("{:x}", Md5::digest(data))
}

/// 测试服务的路由行为
#[derive(Clone)]
pub(super) enum Route {
    /// 200 + 固定内容
    Body(Vec<u8>),
    /// 指定状态码，无内容
    Status(u16),
    /// 200，声明很大的长度，每 10ms 输出 1KB
    Slow,
    /// 读完请求后保持连接，不发送任何响应
    Stall,
}

/// 进程内 HTTP 服务
pub(super) struct TestServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn start(routes: HashMap<String, Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let routes = Arc::new(routes);

        let server_hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let routes = Arc::clone(&routes);
                let hits = Arc::clone(&server_hits);
                thread::spawn(move || {
                    let _ = handle_connection(stream, &routes, &hits);
                });
            }
        });

        Self { addr, hits }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{path}", self.addr)
    }

    /// 已收到的请求数
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn handle_connection(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    hits: &AtomicUsize,
) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" {
            break;
        }
    }
    hits.fetch_add(1, Ordering::SeqCst);

    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .trim_start_matches('/');

    match routes.get(path).cloned().unwrap_or(Route::Status(404)) {
        Route::Body(body) => {
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )?;
            stream.write_all(&body)?;
        }
        Route::Status(status) => {
            write!(
                stream,
                "HTTP/1.1 {status} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            )?;
        }
        Route::Slow => {
            let chunk = [0u8; 1024];
            let chunks = 100_000;
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                chunk.len() * chunks
            )?;
            for _ in 0..chunks {
                stream.write_all(&chunk)?;
                stream.flush()?;
                thread::sleep(Duration::from_millis(10));
            }
        }
        Route::Stall => {
            thread::sleep(Duration::from_secs(120));
            return Ok(());
        }
    }
    stream.flush()
}
