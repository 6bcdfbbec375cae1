use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::outliner::{OutlineOptions, Outliner};
use crate::config::OutlinerSettings;

/// 传递变换配置（JSON 字符串）的环境变量名
pub const OPTIONS_ENV: &str = "OUTLINE_OPTIONS";

/// 通过外部程序执行描边变换
///
/// 每次调用启动一个子进程：SVG 文本写入 stdin，结果从 stdout 读取，
/// 配置以 JSON 形式放在 `OUTLINE_OPTIONS` 环境变量中。
/// 子进程句柄设置了 kill_on_drop，超时或调用方放弃等待时进程会被回收。
#[derive(Debug, Clone)]
pub struct CommandOutliner {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandOutliner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn from_settings(settings: &OutlinerSettings) -> Self {
        Self::new(settings.program.clone())
            .args(settings.args.iter().cloned())
            .timeout_secs(settings.timeout_secs)
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// 子进程执行超时，0 表示不限制
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// 运行 `<program> <args..> --version` 获取构建标识
    pub async fn probe(&self) -> anyhow::Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.program.display()))?;

        if !output.status.success() {
            return Err(anyhow::anyhow!("Non-zero exit code: {}", output.status));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let identity = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("unknown-build")
            .to_string();
        Ok(identity)
    }

    async fn run(&self, content: String, options: &OutlineOptions) -> anyhow::Result<String> {
        let options_json = serde_json::to_string(options.as_value())?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.env(OPTIONS_ENV, options_json);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.program.display()))?;
        let mut stdin = child
            .stdin
            .take()
            .context("Failed to capture outliner stdin")?;

        // stdin 与 stdout 并行，避免子进程输出写满管道后互相等待
        let writer = tokio::spawn(async move {
            stdin.write_all(content.as_bytes()).await?;
            stdin.shutdown().await
        });

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for outliner")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::anyhow!(
                "Outliner exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        match writer.await.context("Outliner stdin writer join error")? {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("[Outliner] {} closed stdin early", self.program.display());
            }
            Err(err) => return Err(err).context("Failed to write outliner stdin"),
        }

        String::from_utf8(output.stdout).context("Outliner produced non UTF-8 output")
    }
}

#[async_trait::async_trait]
impl Outliner for CommandOutliner {
    async fn outline(&self, content: String, options: &OutlineOptions) -> anyhow::Result<String> {
        debug!(
            "[Outliner] Request: Program='{}', Input={} bytes, Timeout={:?}",
            self.program.display(),
            content.len(),
            self.timeout
        );

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(content, options))
                .await
                .map_err(|_| anyhow::anyhow!("Outliner timed out after {}s", limit.as_secs()))?,
            None => self.run(content, options).await,
        }
    }
}
