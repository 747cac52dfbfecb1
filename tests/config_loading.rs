//! 配置文件加载与进程级初始化测试.

use std::fs;

use tempfile::TempDir;
use venc::codec::{BackendSet, CodecIdentity, CodecRegistry, CodecType};
use venc::config::VencConfig;

fn write_config(dir: &TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("venc.json");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_从文件加载配置() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "logging": { "level": "debug", "retention_days": 7 },
            "encoders": ["sw_mjpeg", "hw_h264"]
        }"#,
    );

    let config = VencConfig::from_file(&path).unwrap();
    assert_eq!(config.encoders, BackendSet::SW_MJPEG | BackendSet::HW_H264);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.retention_days, 7);
    assert_eq!(config.logging.file_prefix, "venc");
}

#[test]
fn test_配置文件错误() {
    let dir = TempDir::new().unwrap();
    assert!(VencConfig::from_file(dir.path().join("missing.json")).is_err());

    let path = write_config(&dir, "{ not json");
    let err = VencConfig::from_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("venc.json"));
}

// 进程级注册表在本测试二进制中只由这一个用例使用
#[test]
fn test_按配置初始化与关闭() {
    let config = VencConfig::from_json(r#"{"encoders": ["hw_mjpeg", "sw_h264"]}"#).unwrap();

    let report = venc::init(&config);
    assert!(report.is_ok());
    let registry = CodecRegistry::global();
    assert_eq!(
        registry.list(),
        vec![
            CodecIdentity::hardware(CodecType::Mjpeg),
            CodecIdentity::software(CodecType::H264),
        ]
    );

    venc::shutdown(&config);
    assert!(registry.is_empty());
}
