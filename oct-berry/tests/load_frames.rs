mod common;

use std::fs;

use image::{Rgb, RgbImage};
use oct_berry::dataset::{load_frames, LoadOutcome};
use oct_berry::prelude::*;

use common::{init_tracing, write_bmp};

const RAW: Resolution = Resolution::new(8, 6);

#[test]
fn test_numeric_order_and_thumbnail_filter() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    write_bmp(&dir.join("scan10.bmp"), (8, 6), 100);
    write_bmp(&dir.join("scan2.bmp"), (8, 6), 20);
    write_bmp(&dir.join("scan1.bmp"), (8, 6), 10);
    write_bmp(&dir.join("thumb3.bmp"), (4, 3), 30);
    write_bmp(&dir.join("rotated4.bmp"), (6, 8), 40);
    fs::write(dir.join("notes.txt"), b"not an image").unwrap();

    let outcome = load_frames(dir, RAW).unwrap();
    let LoadOutcome::Loaded { stack, path } = outcome else {
        panic!("directory should be loaded");
    };
    assert_eq!(path, dir);
    assert_eq!(stack.shape(), (8, 6, 3));

    let firsts: Vec<u8> = stack.frames().map(|f| f[(0, 0)]).collect();
    assert_eq!(firsts, vec![10, 20, 100]);
}

#[test]
fn test_colour_frames_are_ignored() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    write_bmp(&dir.join("scan1.bmp"), (8, 6), 10);
    RgbImage::from_fn(6, 8, |x, _| Rgb([x as u8 * 40, 0, 200]))
        .save(dir.join("scan2.bmp"))
        .unwrap();
    // 三通道相等的图片仍是灰度图.
    RgbImage::from_pixel(6, 8, Rgb([30, 30, 30]))
        .save(dir.join("scan3.bmp"))
        .unwrap();

    let outcome = load_frames(dir, RAW).unwrap();
    let stack = outcome.stack().unwrap();
    assert_eq!(stack.shape(), (8, 6, 2));
    let firsts: Vec<u8> = stack.frames().map(|f| f[(0, 0)]).collect();
    assert_eq!(firsts, vec![10, 30]);
}

#[test]
fn test_only_colour_frames() {
    let tmp = tempfile::tempdir().unwrap();
    RgbImage::from_pixel(6, 8, Rgb([255, 0, 0]))
        .save(tmp.path().join("scan1.bmp"))
        .unwrap();
    assert!(matches!(
        load_frames(tmp.path(), RAW),
        Err(BerryError::NoMatchingFrames { .. })
    ));
}

#[test]
fn test_empty_directory() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("readme.md"), b"").unwrap();
    assert!(matches!(
        load_frames(tmp.path(), RAW),
        Err(BerryError::NoImagesFound(_))
    ));
}

#[test]
fn test_only_thumbnails() {
    let tmp = tempfile::tempdir().unwrap();
    write_bmp(&tmp.path().join("thumb1.bmp"), (4, 3), 1);
    assert!(matches!(
        load_frames(tmp.path(), RAW),
        Err(BerryError::NoMatchingFrames {
            height: 8,
            width: 6,
            ..
        })
    ));
}

#[test]
fn test_segmented_directory_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("eye_segmented");
    fs::create_dir(&dir).unwrap();
    write_bmp(&dir.join("scan1.bmp"), (8, 6), 1);

    let outcome = load_frames(&dir, RAW).unwrap();
    assert!(matches!(outcome, LoadOutcome::Skipped(_)));
    assert!(outcome.stack().is_none());
    assert_eq!(outcome.path(), dir);
}
