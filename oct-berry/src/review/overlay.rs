//! 叠加图合成.

use image::{GrayImage, Luma};
use ndarray::{Array2, ArrayView2, Zip};

use crate::consts::gray::{BLACK, SECONDARY, STRUCTURE};

/// 将两个二值掩码合成为单通道叠加图: 主要结构为全亮度, 次要结构为部分亮度,
/// 两者重叠处饱和为白色.
///
/// 两个掩码形状不同时程序 panic.
pub fn compose_overlay(structure: ArrayView2<u8>, secondary: ArrayView2<u8>) -> Array2<u8> {
    Zip::from(&structure)
        .and(&secondary)
        .map_collect(|&s, &o| {
            let s = if s > 0 { STRUCTURE } else { BLACK };
            let o = if o > 0 { SECONDARY } else { BLACK };
            s.saturating_add(o)
        })
}

/// 以 `alpha * scan + (1 - alpha) * overlay` 混合原图与叠加图, 四舍五入并饱和到 `u8`.
///
/// 两图形状不同时程序 panic.
pub fn blend(scan: ArrayView2<u8>, overlay: ArrayView2<u8>, alpha: f32) -> Array2<u8> {
    let beta = 1.0 - alpha;
    Zip::from(&scan).and(&overlay).map_collect(|&s, &o| {
        (alpha * s as f32 + beta * o as f32)
            .round()
            .clamp(0.0, 255.0) as u8
    })
}

/// 转换为 `image` crate 的灰度图, 以便持久化.
pub fn to_gray_image(data: ArrayView2<u8>) -> GrayImage {
    let (height, width) = data.dim();
    let mut buf = GrayImage::new(width as u32, height as u32);
    for ((h, w), &pix) in data.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, Luma([pix]));
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_compose_overlay() {
        let s = array![[0u8, 1], [0, 1]];
        let o = array![[0u8, 0], [1, 1]];
        assert_eq!(
            compose_overlay(s.view(), o.view()),
            array![[0u8, 255], [127, 255]]
        );
    }

    #[test]
    fn test_blend_default_alpha() {
        let scan = array![[100u8, 0], [255, 50]];
        let over = array![[0u8, 255], [255, 127]];
        let out = blend(scan.view(), over.view(), 0.6);
        // 60, 102, 255, 30 + 50.8 = 80.8
        assert_eq!(out, array![[60u8, 102], [255, 81]]);
    }

    #[test]
    fn test_to_gray_image_orientation() {
        let data = array![[1u8, 2, 3], [4, 5, 6]];
        let img = to_gray_image(data.view());
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [6]);
        assert_eq!(img.get_pixel(0, 1).0, [4]);
    }
}
