//! 基于 OpenCV highgui 的复核窗口.
//!
//! # 注意
//!
//! 需要 `plot` feature.

use ndarray::ArrayView2;
use opencv::highgui::{destroy_all_windows, imshow, wait_key};
use opencv::prelude::Mat;
use tracing::warn;

use super::ReviewSurface;
use crate::error::{BerryError, BerryResult};

#[inline]
fn surface_err(e: opencv::Error) -> BerryError {
    BerryError::Surface(e.to_string())
}

/// OpenCV 窗口. 同一时刻最多只有一个窗口打开.
#[derive(Debug, Default)]
pub struct OpenCvSurface {
    open: bool,
}

impl OpenCvSurface {
    /// 创建. 此时不会打开任何窗口.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReviewSurface for OpenCvSurface {
    fn show_and_wait(&mut self, title: &str, image: ArrayView2<u8>) -> BerryResult<i32> {
        let image = image.as_standard_layout();
        let (h, w) = image.dim();
        let data = image
            .as_slice()
            .ok_or_else(|| BerryError::Surface("image is not contiguous".to_owned()))?;
        let mat = Mat::from_slice_rows_cols(data, h, w).map_err(surface_err)?;

        self.open = true;
        imshow(title, &mat).map_err(surface_err)?;
        wait_key(0).map_err(surface_err)
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        if let Err(e) = destroy_all_windows() {
            warn!("Failed to close review window: {e}");
        }
        self.open = false;
    }
}

impl Drop for OpenCvSurface {
    fn drop(&mut self) {
        self.close();
    }
}
