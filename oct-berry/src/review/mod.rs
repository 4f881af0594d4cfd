//! 人工复核.
//!
//! 操作者逐帧查看 "原图 + 分割边界" 的叠加图, 按 `y`/`Y` 确认, 按 `n`/`N` 拒绝,
//! 按其他任意键中止本次运行. 确认的帧以叠加掩码的形式写入确认目录,
//! 拒绝的帧以原始灰度图的形式写入拒绝目录.
//!
//! 进度不单独保存: 每次启动时都从两个目录的内容重新推算 (见 [`progress`]).

use ndarray::ArrayView2;

use crate::error::BerryResult;

pub mod overlay;
pub mod progress;
mod session;

pub use session::{ReviewOutcome, ReviewSession, ReviewSummary};

cfg_if::cfg_if! {
    if #[cfg(feature = "plot")] {
        mod display;

        pub use display::OpenCvSurface;
    }
}

/// 复核窗口. 唯一的能力是 "展示图像, 阻塞直到按键, 返回键码".
///
/// 窗口是全局共享资源. 每帧结束时都必须关闭, 见 [`SurfaceGuard`].
pub trait ReviewSurface {
    /// 在标题为 `title` 的窗口中展示灰度图 `image`, 阻塞直到按键, 返回键码.
    fn show_and_wait(&mut self, title: &str, image: ArrayView2<u8>) -> BerryResult<i32>;

    /// 关闭所有窗口. 重复调用无副作用.
    fn close(&mut self);
}

impl<S: ReviewSurface + ?Sized> ReviewSurface for &mut S {
    #[inline]
    fn show_and_wait(&mut self, title: &str, image: ArrayView2<u8>) -> BerryResult<i32> {
        (**self).show_and_wait(title, image)
    }

    #[inline]
    fn close(&mut self) {
        (**self).close()
    }
}

/// 单帧内对复核窗口的独占借用. 离开作用域时 (包括错误返回与中止) 总会关闭窗口.
pub struct SurfaceGuard<'a, S: ReviewSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: ReviewSurface + ?Sized> SurfaceGuard<'a, S> {
    /// 获取窗口.
    #[inline]
    pub fn acquire(surface: &'a mut S) -> Self {
        Self { surface }
    }

    /// 展示图像并等待按键.
    #[inline]
    pub fn show_and_wait(&mut self, title: &str, image: ArrayView2<u8>) -> BerryResult<i32> {
        self.surface.show_and_wait(title, image)
    }
}

impl<S: ReviewSurface + ?Sized> Drop for SurfaceGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.close();
    }
}

/// 操作者对单帧的裁定.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// 分割正确 (`y`/`Y`).
    Accept,

    /// 分割错误 (`n`/`N`).
    Reject,

    /// 其他任意键, 中止本次运行.
    Abort,
}

impl Verdict {
    /// 解释键码. 只看低 8 位, 以兼容带修饰位的键码.
    pub fn from_key(key: i32) -> Self {
        if key < 0 {
            return Self::Abort;
        }
        match (key & 0xff) as u8 {
            b'y' | b'Y' => Self::Accept,
            b'n' | b'N' => Self::Reject,
            _ => Self::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSurface {
        shown: usize,
        closed: usize,
    }

    impl ReviewSurface for CountingSurface {
        fn show_and_wait(&mut self, _title: &str, _image: ArrayView2<u8>) -> BerryResult<i32> {
            self.shown += 1;
            Ok(b'q' as i32)
        }

        fn close(&mut self) {
            self.closed += 1;
        }
    }

    #[test]
    fn test_verdict_from_key() {
        assert_eq!(Verdict::from_key(b'y' as i32), Verdict::Accept);
        assert_eq!(Verdict::from_key(b'Y' as i32), Verdict::Accept);
        assert_eq!(Verdict::from_key(b'n' as i32), Verdict::Reject);
        assert_eq!(Verdict::from_key(b'N' as i32), Verdict::Reject);
        assert_eq!(Verdict::from_key(b'q' as i32), Verdict::Abort);
        assert_eq!(Verdict::from_key(27), Verdict::Abort);
        assert_eq!(Verdict::from_key(-1), Verdict::Abort);
        assert_eq!(Verdict::from_key(0x10_0000 | b'y' as i32), Verdict::Accept);
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let mut surface = CountingSurface::default();
        {
            let mut guard = SurfaceGuard::acquire(&mut surface);
            let img = ndarray::Array2::<u8>::zeros((2, 2));
            guard.show_and_wait("t", img.view()).unwrap();
        }
        assert_eq!(surface.shown, 1);
        assert_eq!(surface.closed, 1);
    }
}
