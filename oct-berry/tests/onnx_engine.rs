#![cfg(feature = "onnx")]

use std::fs;

use oct_berry::prelude::*;

#[test]
fn test_missing_model_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("nope.onnx");
    assert!(matches!(
        OnnxEngine::load(&missing),
        Err(BerryError::ModelLoad { path, .. }) if path == missing
    ));
}

#[test]
fn test_corrupt_model_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let corrupt = tmp.path().join("corrupt.onnx");
    fs::write(&corrupt, b"definitely not a protobuf").unwrap();
    assert!(matches!(
        OnnxEngine::load(&corrupt),
        Err(BerryError::ModelLoad { .. })
    ));
}
