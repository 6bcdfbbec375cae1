use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::file::SourceFile;
use super::Stage;
use crate::common::buffer::{file_uri, uri_to_path, ContentStream, FileContents};
use crate::common::errors::StageError;

/// 写出阶段：将记录写入 `out_root/<relative>`
///
/// - Buffer：写入字节，记录保留原内容
/// - Stream：先排空到同目录下的临时文件，完整写完后再改名为目标文件，
///   记录内容改为指向输出文件的 Object；流出错时不留下残缺文件
/// - Object：从源位置复制
/// - 目录：创建目录；其他 Null 记录不写入，原样传递
pub struct DestStage {
    out_root: PathBuf,
}

impl DestStage {
    pub fn new(out_root: impl Into<PathBuf>) -> Self {
        Self {
            out_root: out_root.into(),
        }
    }

    /// 返回是否实际写出了内容
    async fn write(&self, file: &mut SourceFile, target: &Path) -> Result<bool, StageError> {
        match file.take_contents() {
            FileContents::Null => {
                debug!("[Dest] Skipping empty record {}", file.path.display());
                return Ok(false);
            }
            FileContents::Buffer(bytes) => {
                ensure_parent(target).await?;
                tokio::fs::write(target, &bytes)
                    .await
                    .map_err(|e| StageError::io(target, e))?;
                file.contents = FileContents::Buffer(bytes);
            }
            FileContents::Stream(stream) => {
                ensure_parent(target).await?;
                let partial = partial_path(target);
                if let Err(err) = drain_to(stream, &partial, &file.path).await {
                    if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                        debug!("[Dest] Could not remove {}: {}", partial.display(), cleanup);
                    }
                    warn!("[Dest] Discarded partial output for {}", target.display());
                    return Err(err);
                }
                tokio::fs::rename(&partial, target)
                    .await
                    .map_err(|e| StageError::io(target, e))?;
                file.contents = FileContents::Object {
                    uri: file_uri(target),
                };
            }
            FileContents::Object { uri } => {
                let source = uri_to_path(&uri).ok_or_else(|| StageError::UnsupportedContents {
                    path: file.path.clone(),
                    kind: "object",
                })?;
                ensure_parent(target).await?;
                tokio::fs::copy(&source, target)
                    .await
                    .map_err(|e| StageError::io(&source, e))?;
                file.contents = FileContents::Object {
                    uri: file_uri(target),
                };
            }
        }
        Ok(true)
    }
}

#[async_trait::async_trait]
impl Stage for DestStage {
    fn name(&self) -> &str {
        "dest"
    }

    async fn process(&self, mut file: SourceFile) -> Result<Option<SourceFile>, StageError> {
        let target = self.out_root.join(file.relative());

        let written = if file.is_directory() {
            tokio::fs::create_dir_all(&target)
                .await
                .map_err(|e| StageError::io(&target, e))?;
            true
        } else {
            self.write(&mut file, &target).await?
        };

        if written {
            info!("[Dest] Wrote {}", target.display());
        }
        file.rebase(&self.out_root);
        Ok(Some(file))
    }
}

async fn ensure_parent(target: &Path) -> Result<(), StageError> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StageError::io(parent, e))?;
    }
    Ok(())
}

/// 流写出过程中使用的临时文件：`<dir>/.<name>.partial`
fn partial_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.partial", name))
}

async fn drain_to(mut stream: ContentStream, out_path: &Path, source: &Path) -> Result<(), StageError> {
    let mut out = tokio::fs::File::create(out_path)
        .await
        .map_err(|e| StageError::io(out_path, e))?;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| StageError::io(source, e))?;
        out.write_all(&chunk)
            .await
            .map_err(|e| StageError::io(out_path, e))?;
    }
    out.flush().await.map_err(|e| StageError::io(out_path, e))
}
