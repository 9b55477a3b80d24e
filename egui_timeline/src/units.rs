//! 坐标转换模块
//!
//! 毫秒与像素之间的双向转换。像素 = 秒 × 每秒像素数 × 缩放。

use crate::error::TimelineError;

/// 像素换算出的时间不超过这个范围（约 35 000 年），保证后续的整数加法不会溢出
pub const MAX_TIME_MS: i64 = 1 << 50;

/// 时间与像素的映射，由缩放和基础比例（缩放为 1 时每秒的像素数）决定
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    zoom: f64,
    pixels_per_second: f64,
}

impl TimeScale {
    /// 创建映射。缩放或基础比例不是正的有限值时返回错误，而不是产生无穷大坐标。
    pub fn new(zoom: f64, pixels_per_second: f64) -> Result<Self, TimelineError> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(TimelineError::InvalidZoom(zoom));
        }
        if !pixels_per_second.is_finite() || pixels_per_second <= 0.0 {
            return Err(TimelineError::InvalidScale(pixels_per_second));
        }
        Ok(Self {
            zoom,
            pixels_per_second,
        })
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    /// 将时间（毫秒）转换为像素
    pub fn time_to_pixels(&self, ms: i64) -> f64 {
        (ms as f64 / 1000.0) * self.pixels_per_second * self.zoom
    }

    /// 将像素转换为时间（毫秒），四舍五入到最近的毫秒
    ///
    /// 非有限的输入会被拒绝并记录日志，结果为 0。结果限制在 `±MAX_TIME_MS` 内。
    pub fn pixels_to_time(&self, px: f64) -> i64 {
        match self.try_pixels_to_time(px) {
            Some(ms) => ms,
            None => {
                log::warn!("ignoring non-finite pixel offset {px}");
                0
            }
        }
    }

    pub fn try_pixels_to_time(&self, px: f64) -> Option<i64> {
        if !px.is_finite() {
            return None;
        }
        let seconds = px / (self.pixels_per_second * self.zoom);
        let limit = MAX_TIME_MS as f64;
        Some((seconds * 1000.0).round().clamp(-limit, limit) as i64)
    }
}
