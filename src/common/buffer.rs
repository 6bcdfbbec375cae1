use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, Stream, StreamExt};

/// 流式内容：按到达顺序产出的字节块序列
pub type ContentStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

const FILE_URI_PREFIX: &str = "file://";

/// Represents the content carried by a file record.
#[derive(Default)]
pub enum FileContents {
    /// No content: a placeholder or a directory marker.
    #[default]
    Null,
    /// An in-memory byte buffer.
    Buffer(Bytes),
    /// A live stream of byte chunks, consumed in arrival order.
    Stream(ContentStream),
    /// Content left in backing storage and not loaded.
    /// Only copy-style stages know how to handle it.
    Object { uri: String },
}

impl FileContents {
    /// 构造一个由给定字节块组成的流式内容
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        FileContents::Stream(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FileContents::Null => "null",
            FileContents::Buffer(_) => "buffer",
            FileContents::Stream(_) => "stream",
            FileContents::Object { .. } => "object",
        }
    }

    /// 将内容完整读入内存
    ///
    /// Null 与 Object 返回 `None`；流式内容会被排空，遇到第一个错误即返回。
    pub async fn into_bytes(self) -> std::io::Result<Option<Bytes>> {
        match self {
            FileContents::Buffer(bytes) => Ok(Some(bytes)),
            FileContents::Stream(stream) => drain(stream).await.map(Some),
            FileContents::Null | FileContents::Object { .. } => Ok(None),
        }
    }
}

impl From<Bytes> for FileContents {
    fn from(bytes: Bytes) -> Self {
        FileContents::Buffer(bytes)
    }
}

impl From<Vec<u8>> for FileContents {
    fn from(bytes: Vec<u8>) -> Self {
        FileContents::Buffer(Bytes::from(bytes))
    }
}

impl From<String> for FileContents {
    fn from(text: String) -> Self {
        FileContents::Buffer(Bytes::from(text))
    }
}

impl fmt::Debug for FileContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContents::Null => f.write_str("Null"),
            FileContents::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            FileContents::Stream(_) => f.write_str("Stream(..)"),
            FileContents::Object { uri } => f.debug_struct("Object").field("uri", uri).finish(),
        }
    }
}

/// 按顺序排空字节流
pub async fn drain(mut stream: ContentStream) -> std::io::Result<Bytes> {
    let mut collected = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        collected.extend_from_slice(&chunk?);
    }
    Ok(collected.freeze())
}

pub fn file_uri(path: &Path) -> String {
    format!("{}{}", FILE_URI_PREFIX, path.display())
}

pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    uri.strip_prefix(FILE_URI_PREFIX).map(PathBuf::from)
}
