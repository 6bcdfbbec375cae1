use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::outline::StreamMode;
use crate::pipeline::ReadMode;

/// 应用配置总结构
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub outliner: OutlinerSettings,
    pub pipeline: PipelineSettings,
}

/// 外部描边程序配置
#[derive(Debug, Deserialize, Clone)]
pub struct OutlinerSettings {
    /// 外部程序路径或 PATH 中的命令名
    pub program: PathBuf,
    pub args: Vec<String>,
    /// 子进程执行超时时间（单位：秒），0 表示不限制
    pub timeout_secs: u64,
    /// 透传给外部程序的变换配置，不做解释
    #[serde(default = "default_options")]
    pub options: serde_json::Value,
    pub stream_mode: StreamMode,
}

/// 文件流水线配置（输入输出目录、读取方式、并发）
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineSettings {
    /// 文件记录携带的工作目录，缺省为进程当前目录
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub read_mode: ReadMode,
    /// 流模式下单个字节块的大小（单位：字节）
    pub chunk_size: usize,
    /// 同时处理的文件数，输出顺序不受影响
    pub concurrency: usize,
    pub svg_only: bool,
}

fn default_options() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Settings {
    /// 加载配置：默认值、可选的 `outline` 配置文件、环境变量覆盖
    pub fn new() -> anyhow::Result<Self> {
        Self::build(File::with_name("outline").required(false))
    }

    /// 从指定配置文件加载（文件必须存在），环境变量仍可覆盖
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> anyhow::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = Config::builder()
            .set_default("outliner.program", "svg-outline-stroke")?
            .set_default("outliner.args", Vec::<String>::new())?
            .set_default("outliner.timeout_secs", 0)?
            .set_default("outliner.stream_mode", "chunk")?
            .set_default("pipeline.input_root", "./svg")?
            .set_default("pipeline.output_root", "./dist")?
            .set_default("pipeline.read_mode", "buffer")?
            // 默认 64KB 一块
            .set_default("pipeline.chunk_size", 64 * 1024)?
            .set_default("pipeline.concurrency", 1)?
            .set_default("pipeline.svg_only", true)?
            .add_source(file)
            .add_source(Environment::with_prefix("OUTLINE").separator("__"));

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
