pub mod dest;
pub mod file;
pub mod mime;
pub mod source;

use std::sync::Arc;

use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use tracing::{debug, error};

use crate::common::errors::StageError;

pub use dest::DestStage;
pub use file::{FileStat, SourceFile};
pub use source::{ReadMode, SourceOptions};

pub type FileResult = Result<SourceFile, StageError>;

/// 流水线阶段：接收一个文件记录，异步产出零个或一个记录
#[async_trait::async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    async fn process(&self, file: SourceFile) -> Result<Option<SourceFile>, StageError>;
}

/// 按顺序串联多个阶段的文件流水线
///
/// 同时处理的记录数由 `concurrency` 限制，输出顺序始终与输入顺序一致。
/// 出现第一个错误后输出流产出该错误并结束。
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
    concurrency: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            concurrency: 1,
        }
    }

    pub fn stage<S: Stage + 'static>(self, stage: S) -> Self {
        self.shared_stage(Arc::new(stage))
    }

    pub fn shared_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = std::cmp::max(1, concurrency);
        self
    }

    pub fn run<S>(&self, files: S) -> BoxStream<'static, FileResult>
    where
        S: Stream<Item = FileResult> + Send + 'static,
    {
        let stages = Arc::new(self.stages.clone());
        let results = files
            .map(move |item| {
                let stages = stages.clone();
                async move {
                    match item {
                        Ok(file) => run_stages(&stages, file).await,
                        Err(err) => Err(err),
                    }
                }
            })
            .buffered(self.concurrency);

        let output = async_stream::stream! {
            let mut results = Box::pin(results);
            while let Some(result) = results.next().await {
                match result {
                    Ok(Some(file)) => yield Ok(file),
                    Ok(None) => {}
                    Err(err) => {
                        error!("[Pipeline] Halting on error: {}", err);
                        yield Err(err);
                        break;
                    }
                }
            }
        };
        Box::pin(output)
    }

    /// 处理一组记录并收集全部输出
    pub async fn collect(&self, files: Vec<SourceFile>) -> Result<Vec<SourceFile>, StageError> {
        let mut results = self.run(stream::iter(files.into_iter().map(Ok)));
        let mut collected = Vec::new();
        while let Some(result) = results.next().await {
            collected.push(result?);
        }
        Ok(collected)
    }
}

async fn run_stages(
    stages: &[Arc<dyn Stage>],
    file: SourceFile,
) -> Result<Option<SourceFile>, StageError> {
    let mut current = file;
    for stage in stages {
        match stage.process(current).await? {
            Some(next) => current = next,
            None => {
                debug!("[Pipeline] Record dropped by stage '{}'", stage.name());
                return Ok(None);
            }
        }
    }
    Ok(Some(current))
}
