use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::stream::BoxStream;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use super::file::{FileStat, SourceFile};
use super::mime::is_svg;
use super::FileResult;
use crate::common::buffer::{file_uri, FileContents};
use crate::common::errors::StageError;
use crate::config::PipelineSettings;

/// 读取文件内容的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// 整个文件读入内存
    #[default]
    Buffer,
    /// 以字节块流的形式按需读取
    Stream,
    /// 不读取内容，仅记录位置
    Defer,
}

#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub cwd: PathBuf,
    pub read_mode: ReadMode,
    /// 仅产出 MIME 类型为 image/svg+xml 的文件
    pub svg_only: bool,
    /// 流模式下单个字节块的容量
    pub chunk_size: usize,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            read_mode: ReadMode::Buffer,
            svg_only: true,
            chunk_size: 64 * 1024,
        }
    }
}

impl SourceOptions {
    /// 未配置 `pipeline.cwd` 时沿用进程当前目录
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        let defaults = Self::default();
        Self {
            cwd: settings.cwd.clone().unwrap_or(defaults.cwd),
            read_mode: settings.read_mode,
            svg_only: settings.svg_only,
            chunk_size: std::cmp::max(1, settings.chunk_size),
        }
    }
}

/// 读取单个路径为文件记录；目录产出 Null 内容
pub async fn read_path(
    path: &Path,
    base: &Path,
    options: &SourceOptions,
) -> Result<SourceFile, StageError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| StageError::io(path, e))?;
    let stat = FileStat::from_metadata(&meta);

    let contents = if meta.is_dir() {
        FileContents::Null
    } else {
        match options.read_mode {
            ReadMode::Buffer => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| StageError::io(path, e))?;
                FileContents::Buffer(Bytes::from(bytes))
            }
            ReadMode::Stream => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| StageError::io(path, e))?;
                FileContents::Stream(Box::pin(ReaderStream::with_capacity(
                    file,
                    options.chunk_size,
                )))
            }
            ReadMode::Defer => FileContents::Object {
                uri: file_uri(path),
            },
        }
    };

    debug!("[Source] Read {} as {}", path.display(), contents.kind());
    Ok(SourceFile::new(options.cwd.clone(), base, path, contents).with_stat(stat))
}

/// 递归列出 root 下的全部文件，按路径排序
///
/// root 本身是文件时只返回它自己（同样受 svg_only 过滤）。
pub async fn list_files(root: &Path, svg_only: bool) -> Result<Vec<PathBuf>, StageError> {
    let meta = tokio::fs::metadata(root)
        .await
        .map_err(|e| StageError::io(root, e))?;
    if !meta.is_dir() {
        if svg_only && !is_svg(root) {
            debug!("[Source] Skipping non-SVG root {}", root.display());
            return Ok(Vec::new());
        }
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| StageError::io(&dir, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StageError::io(&dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StageError::io(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if !svg_only || is_svg(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// 从 root 读取文件记录流，base 为 root（root 为文件时取其父目录）
pub fn src(root: PathBuf, options: SourceOptions) -> BoxStream<'static, FileResult> {
    let stream = async_stream::stream! {
        let paths = match list_files(&root, options.svg_only).await {
            Ok(paths) => paths,
            Err(err) => {
                yield Err(err);
                return;
            }
        };
        info!("[Source] {} file(s) found under {}", paths.len(), root.display());

        let base = if paths.len() == 1 && paths[0] == root {
            root.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            root.clone()
        };
        for path in paths {
            let result = read_path(&path, &base, &options).await;
            let failed = result.is_err();
            yield result;
            if failed {
                return;
            }
        }
    };
    Box::pin(stream)
}
