pub mod command;
pub mod decoder;
pub mod outliner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::common::buffer::{ContentStream, FileContents};
use crate::common::errors::StageError;
use crate::pipeline::{SourceFile, Stage};

pub use command::CommandOutliner;
pub use decoder::Utf8ChunkDecoder;
pub use outliner::{outline_fn, FnOutliner, OutlineOptions, Outliner};

/// 流式内容的变换粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    /// 每个到达的字节块单独变换并立即转发
    #[default]
    Chunk,
    /// 累积整条流后只变换一次，输出单个字节块
    Document,
}

/// SVG 描边阶段：把文件内容交给外部 [`Outliner`]，并以原有形式写回
///
/// - Null / 目录：原样通过，不调用外部变换
/// - Buffer：解码为文本，等待变换完成后写回 Buffer
/// - Stream：挂上新的内容流后立即返回；变换在下游读取流时逐块进行，
///   失败以流中的 `Err` 项呈现
/// - Object：无法变换，返回 [`StageError::UnsupportedContents`]
#[derive(Clone)]
pub struct OutlineStage {
    outliner: Arc<dyn Outliner>,
    options: OutlineOptions,
    stream_mode: StreamMode,
}

impl OutlineStage {
    pub fn new(outliner: Arc<dyn Outliner>) -> Self {
        Self {
            outliner,
            options: OutlineOptions::default(),
            stream_mode: StreamMode::default(),
        }
    }

    pub fn with_options(mut self, options: OutlineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_stream_mode(mut self, stream_mode: StreamMode) -> Self {
        self.stream_mode = stream_mode;
        self
    }

    pub async fn transform(&self, mut file: SourceFile) -> Result<SourceFile, StageError> {
        if file.is_directory() {
            debug!("[Outline] Passing through directory {}", file.path.display());
            return Ok(file);
        }

        match file.take_contents() {
            FileContents::Null => {
                debug!("[Outline] Passing through empty file {}", file.path.display());
                Ok(file)
            }
            FileContents::Buffer(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                let output = self
                    .outliner
                    .outline(text, &self.options)
                    .await
                    .map_err(|err| {
                        warn!("[Outline] Transform failed for {}: {}", file.path.display(), err);
                        StageError::Transform(err)
                    })?;
                debug!(
                    "[Outline] {}: {} -> {} bytes",
                    file.path.display(),
                    bytes.len(),
                    output.len()
                );
                file.contents = FileContents::Buffer(Bytes::from(output));
                Ok(file)
            }
            FileContents::Stream(input) => {
                let outliner = self.outliner.clone();
                let options = self.options.clone();
                let path = file.path.clone();
                file.contents = FileContents::Stream(match self.stream_mode {
                    StreamMode::Chunk => outline_chunks(input, outliner, options, path),
                    StreamMode::Document => outline_document(input, outliner, options, path),
                });
                Ok(file)
            }
            other => Err(StageError::UnsupportedContents {
                path: file.path,
                kind: other.kind(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl Stage for OutlineStage {
    fn name(&self) -> &str {
        "outline"
    }

    async fn process(&self, file: SourceFile) -> Result<Option<SourceFile>, StageError> {
        self.transform(file).await.map(Some)
    }
}

fn transform_error(path: &Path, err: anyhow::Error) -> std::io::Error {
    warn!("[Outline] Stream transform failed for {}: {}", path.display(), err);
    std::io::Error::other(err)
}

fn outline_chunks(
    mut input: ContentStream,
    outliner: Arc<dyn Outliner>,
    options: OutlineOptions,
    path: PathBuf,
) -> ContentStream {
    let stream = async_stream::stream! {
        let mut decoder = Utf8ChunkDecoder::new();
        let mut index = 0usize;
        while let Some(chunk) = input.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };
            let text = decoder.decode(&chunk);
            if text.is_empty() {
                continue;
            }
            match outliner.outline(text, &options).await {
                Ok(output) => {
                    trace!("[Outline] {} chunk #{}: {} bytes", path.display(), index, output.len());
                    index += 1;
                    yield Ok(Bytes::from(output));
                }
                Err(err) => {
                    yield Err(transform_error(&path, err));
                    return;
                }
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            match outliner.outline(tail, &options).await {
                Ok(output) => yield Ok(Bytes::from(output)),
                Err(err) => yield Err(transform_error(&path, err)),
            }
        }
    };
    Box::pin(stream)
}

fn outline_document(
    mut input: ContentStream,
    outliner: Arc<dyn Outliner>,
    options: OutlineOptions,
    path: PathBuf,
) -> ContentStream {
    let stream = async_stream::stream! {
        let mut decoder = Utf8ChunkDecoder::new();
        let mut text = String::new();
        while let Some(chunk) = input.next().await {
            match chunk {
                Ok(chunk) => text.push_str(&decoder.decode(&chunk)),
                Err(err) => {
                    yield Err(err);
                    return;
                }
            }
        }
        text.push_str(&decoder.finish());

        match outliner.outline(text, &options).await {
            Ok(output) => yield Ok(Bytes::from(output)),
            Err(err) => yield Err(transform_error(&path, err)),
        }
    };
    Box::pin(stream)
}
