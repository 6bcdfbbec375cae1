use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 描边变换的配置，原样透传给外部变换，本 crate 不解释其字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutlineOptions(Value);

impl OutlineOptions {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }
}

impl From<Value> for OutlineOptions {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// 外部描边变换：SVG 文本进，处理后的 SVG 文本出
#[async_trait::async_trait]
pub trait Outliner: Send + Sync {
    async fn outline(&self, content: String, options: &OutlineOptions) -> anyhow::Result<String>;
}

/// 以异步函数值充当 [`Outliner`]
pub struct FnOutliner<F> {
    func: F,
}

pub fn outline_fn<F, Fut>(func: F) -> FnOutliner<F>
where
    F: Fn(String, OutlineOptions) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
{
    FnOutliner { func }
}

#[async_trait::async_trait]
impl<F, Fut> Outliner for FnOutliner<F>
where
    F: Fn(String, OutlineOptions) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
{
    async fn outline(&self, content: String, options: &OutlineOptions) -> anyhow::Result<String> {
        (self.func)(content, options.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fn_outliner_receives_content_and_options() {
        let outliner = outline_fn(|content: String, options: OutlineOptions| async move {
            anyhow::Ok(format!("{}|{}", content, options.as_value()))
        });
        let options = OutlineOptions::new(serde_json::json!({ "optCurve": true }));
        let output = outliner.outline("<svg/>".into(), &options).await.unwrap();
        assert_eq!(output, r#"<svg/>|{"optCurve":true}"#);
    }

    #[test]
    fn default_options_are_an_empty_object() {
        assert_eq!(OutlineOptions::default().into_value(), serde_json::json!({}));
    }
}
