#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;

use image::{GrayImage, Luma};
use ndarray::{Array4, ArrayView2, ArrayView4};
use oct_berry::config::PipelineConfig;
use oct_berry::prelude::*;

/// 测试用的小尺寸配置: 原始 8x6, 网络 4x3, 输出 8x6.
pub fn small_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.resolution = Resolutions {
        raw: Resolution::new(8, 6),
        net: Resolution::new(4, 3),
        output: Resolution::new(8, 6),
    };
    config.review.display = Resolution::new(12, 6);
    config
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

/// 写一张单色灰度 bmp.
pub fn write_bmp(path: &Path, (h, w): (u32, u32), value: u8) {
    GrayImage::from_pixel(w, h, Luma([value])).save(path).unwrap();
}

/// 类别 0 恒为 1.0, 类别 1 恒为 0.0.
pub struct ConstEngine;

impl InferenceEngine for ConstEngine {
    fn predict(&self, input: ArrayView4<f32>) -> BerryResult<Array4<f32>> {
        let (_, h, w, _) = input.dim();
        Ok(Array4::from_shape_fn((1, h, w, 2), |(_, _, _, c)| {
            if c == 0 {
                1.0
            } else {
                0.0
            }
        }))
    }
}

/// 按预设顺序返回键码的复核窗口.
#[derive(Default)]
pub struct ScriptedSurface {
    keys: VecDeque<i32>,
    pub titles: Vec<String>,
    pub shown: usize,
    pub closed: usize,
}

impl ScriptedSurface {
    pub fn new(keys: &[u8]) -> Self {
        Self {
            keys: keys.iter().map(|&k| k as i32).collect(),
            ..Default::default()
        }
    }
}

impl ReviewSurface for ScriptedSurface {
    fn show_and_wait(&mut self, title: &str, image: ArrayView2<u8>) -> BerryResult<i32> {
        assert_eq!(image.dim(), (12, 6), "display size");
        self.titles.push(title.to_owned());
        self.shown += 1;
        Ok(self.keys.pop_front().expect("surface ran out of scripted keys"))
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

/// 目录下的文件名, 已排序.
pub fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}
