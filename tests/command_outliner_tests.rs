#![cfg(unix)]

use std::sync::Arc;

use svg_outline_stroke::outline::{CommandOutliner, OutlineOptions, OutlineStage, Outliner};
use svg_outline_stroke::pipeline::SourceFile;
use svg_outline_stroke::FileContents;

fn shell(script: &str) -> CommandOutliner {
    CommandOutliner::new("sh").args(["-c", script])
}

#[tokio::test]
async fn pipes_content_through_program() {
    let outliner = CommandOutliner::new("cat");
    let output = outliner
        .outline("<svg><path/></svg>".into(), &OutlineOptions::default())
        .await
        .expect("outline");
    assert_eq!(output, "<svg><path/></svg>");
}

#[tokio::test]
async fn forwards_options_as_json_env() {
    let outliner = shell(r#"cat > /dev/null; printf '%s' "$OUTLINE_OPTIONS""#);
    let options = OutlineOptions::new(serde_json::json!({ "optCurve": true }));
    let output = outliner
        .outline("<svg/>".into(), &options)
        .await
        .expect("outline");
    assert_eq!(output, r#"{"optCurve":true}"#);
}

#[tokio::test]
async fn non_zero_exit_is_an_error() {
    let outliner = shell("cat > /dev/null; echo 'bad path data' >&2; exit 3");
    let err = outliner
        .outline("<svg/>".into(), &OutlineOptions::default())
        .await
        .expect_err("should fail");
    let message = err.to_string();
    assert!(message.contains("bad path data"), "{message}");
}

#[tokio::test]
async fn missing_program_is_an_error() {
    let outliner = CommandOutliner::new("/nonexistent/svg-outline-stroke");
    let err = outliner
        .outline("<svg/>".into(), &OutlineOptions::default())
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("Failed to spawn"));
}

#[tokio::test]
async fn timeout_stops_a_hung_program() {
    let outliner = shell("sleep 5").timeout_secs(1);
    let err = outliner
        .outline("<svg/>".into(), &OutlineOptions::default())
        .await
        .expect_err("should time out");
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn probe_reports_first_version_line() {
    let outliner = shell("echo; echo 'outline-cli 1.2.0'; echo extra");
    let identity = outliner.probe().await.expect("probe");
    assert_eq!(identity, "outline-cli 1.2.0");
}

#[tokio::test]
async fn version_check_passes_configured_args_first() {
    // sh -c 'script' --version：--version 成为 $0
    let outliner = shell(r#"echo "wrapper $0""#);
    let identity = outliner.probe().await.expect("probe");
    assert_eq!(identity, "wrapper --version");
}

#[tokio::test]
async fn stage_uses_command_outliner_for_buffers() {
    let stage = OutlineStage::new(Arc::new(CommandOutliner::new("tr").args(["a-z", "A-Z"])));
    let file = SourceFile::new(
        "/work",
        "/work",
        "/work/plus.svg",
        FileContents::from("<svg></svg>".to_string()),
    );

    let output = stage.transform(file).await.expect("transform");
    let bytes = output.contents.into_bytes().await.expect("bytes").expect("buffer");
    assert_eq!(&bytes[..], b"<SVG></SVG>");
}
