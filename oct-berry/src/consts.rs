//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 次要结构 (OVD) 边界在叠加图上的灰度. 对应 "部分亮度".
    pub const SECONDARY: u8 = 0b_0111_1111;

    /// 主要结构 (角膜) 边界在叠加图上的灰度. 对应 "全亮度".
    pub const STRUCTURE: u8 = 0b_1111_1111;
}

/// 掩码通道索引.
pub mod channel {
    /// 主要结构 (角膜) 边界通道.
    pub const STRUCTURE: usize = 0;

    /// 次要结构 (OVD) 边界通道.
    pub const SECONDARY: usize = 1;

    /// 复核至少需要的掩码通道数.
    pub const REQUIRED: usize = 2;
}

/// 原始 B-scan 文件扩展名 (大小写不敏感).
pub const BITMAP_EXT: &str = "bmp";

/// 默认的 "确认" 目录名.
pub const ACCEPT_DIR: &str = "CorrectScans";

/// 默认的 "拒绝" 目录名.
pub const REJECT_DIR: &str = "IncorrectScans";

/// 目录名中包含该标记 (大小写不敏感) 时, 视为已分割过的目录.
pub const SEGMENTED_MARKER: &str = "segmented";

/// 输出文件名中帧索引的最小宽度.
pub const INDEX_WIDTH: usize = 3;

/// 原图在叠加展示中的默认权重. 叠加图的权重为 `1 - DEFAULT_ALPHA`.
pub const DEFAULT_ALPHA: f32 = 0.6;

/// 默认二值化阈值.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// 按帧索引生成输出文件名, 如 `7` -> `007.bmp`.
#[inline]
pub fn frame_file_name(index: usize) -> String {
    format!("{index:0width$}.{BITMAP_EXT}", width = INDEX_WIDTH)
}
