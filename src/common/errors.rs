use std::path::PathBuf;

/// 流水线阶段的失败信号
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// 外部描边变换返回的错误，原样转发
    #[error(transparent)]
    Transform(anyhow::Error),

    #[error("Unsupported contents '{kind}' for {}", path.display())]
    UnsupportedContents { path: PathBuf, kind: &'static str },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StageError::Io {
            path: path.into(),
            source,
        }
    }
}
