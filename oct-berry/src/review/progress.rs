//! 复核进度.
//!
//! 进度就是两个输出目录中已存在的不同帧索引的个数. 该值每次都从磁盘重新推算, 从不缓存,
//! 因此重复运行或中途中止都不会丢失进度.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::consts::BITMAP_EXT;
use crate::error::BerryResult;

/// 同一帧索引在输出目录中的状态.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Conflict {
    /// 两个目录中都没有, 可以写入.
    Free,

    /// 已在其中一个目录中复核过. 产物只创建一次, 不再覆写.
    Reviewed,

    /// 同时存在于两个目录中 (重复冲突).
    Duplicate,
}

/// 从形如 `{index}.bmp` 的文件名解析帧索引. 其余文件返回 `None`.
pub fn parse_index(name: &str) -> Option<usize> {
    let (stem, ext) = name.rsplit_once('.')?;
    if !ext.eq_ignore_ascii_case(BITMAP_EXT) || stem.is_empty() {
        return None;
    }
    if !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// 目录中已存在的所有帧索引. 目录不存在时视为空.
pub fn reviewed_indices<P: AsRef<Path>>(dir: P) -> BerryResult<BTreeSet<usize>> {
    let entries = match fs::read_dir(dir.as_ref()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(e) => return Err(e.into()),
    };

    let mut ans = BTreeSet::new();
    for entry in entries {
        let name = entry?.file_name();
        match name.to_str().and_then(parse_index) {
            Some(idx) => {
                ans.insert(idx);
            }
            None => debug!("Ignoring {name:?} in {}", dir.as_ref().display()),
        }
    }
    Ok(ans)
}

/// 两个目录中已存在的帧索引的并集.
pub fn reviewed_union<P: AsRef<Path>, Q: AsRef<Path>>(
    accept_dir: P,
    reject_dir: Q,
) -> BerryResult<BTreeSet<usize>> {
    let mut done = reviewed_indices(accept_dir)?;
    done.extend(reviewed_indices(reject_dir)?);
    Ok(done)
}

/// 计算下一个待复核的帧索引, 即两个目录中已存在的不同帧索引的个数.
///
/// 同时出现在两个目录中的索引只计一次.
pub fn next_index<P: AsRef<Path>, Q: AsRef<Path>>(
    accept_dir: P,
    reject_dir: Q,
) -> BerryResult<usize> {
    Ok(reviewed_union(accept_dir, reject_dir)?.len())
}

/// `[0, start)` 中不在 `done` 里的帧索引.
///
/// 磁盘上的索引不连续时, 这些帧位于起始索引之前, 本次运行不会展示也不会写入.
pub fn gaps_before(done: &BTreeSet<usize>, start: usize) -> Vec<usize> {
    (0..start).filter(|i| !done.contains(i)).collect()
}

/// 检查某帧的两个候选输出文件.
pub fn check_conflict<P: AsRef<Path>, Q: AsRef<Path>>(accept_file: P, reject_file: Q) -> Conflict {
    match (accept_file.as_ref().exists(), reject_file.as_ref().exists()) {
        (true, true) => Conflict::Duplicate,
        (false, false) => Conflict::Free,
        _ => Conflict::Reviewed,
    }
}
