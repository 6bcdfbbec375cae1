use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::common::buffer::FileContents;

/// 文件元数据快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub is_dir: bool,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileStat {
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        Self {
            is_dir: meta.is_dir(),
            len: meta.len(),
            modified: meta.modified().ok(),
        }
    }

    pub fn directory() -> Self {
        Self {
            is_dir: true,
            len: 0,
            modified: None,
        }
    }
}

/// 流水线中流转的文件记录
///
/// 阶段之间只修改 `contents`，路径信息（cwd / base / path）与 stat 保持不变，
/// 除非阶段显式地调用 [`SourceFile::rebase`]（例如写出阶段）。
#[derive(Debug)]
pub struct SourceFile {
    pub cwd: PathBuf,
    pub base: PathBuf,
    pub path: PathBuf,
    pub stat: Option<FileStat>,
    pub contents: FileContents,
}

impl SourceFile {
    pub fn new(
        cwd: impl Into<PathBuf>,
        base: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
        contents: FileContents,
    ) -> Self {
        Self {
            cwd: cwd.into(),
            base: base.into(),
            path: path.into(),
            stat: None,
            contents,
        }
    }

    pub fn with_stat(mut self, stat: FileStat) -> Self {
        self.stat = Some(stat);
        self
    }

    /// 相对于 base 的路径；不在 base 之下时退化为文件名
    pub fn relative(&self) -> &Path {
        match self.path.strip_prefix(&self.base) {
            Ok(relative) => relative,
            Err(_) => self
                .path
                .file_name()
                .map(Path::new)
                .unwrap_or(self.path.as_path()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, FileContents::Null)
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self.contents, FileContents::Buffer(_))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.contents, FileContents::Stream(_))
    }

    pub fn is_directory(&self) -> bool {
        self.is_null() && self.stat.as_ref().is_some_and(|stat| stat.is_dir)
    }

    /// 取出内容，原位置留下 `FileContents::Null`
    pub fn take_contents(&mut self) -> FileContents {
        std::mem::take(&mut self.contents)
    }

    /// 将记录迁移到新的 base 之下，相对路径保持不变
    pub fn rebase(&mut self, base: &Path) {
        let path = base.join(self.relative());
        self.base = base.to_path_buf();
        self.path = path;
    }
}
