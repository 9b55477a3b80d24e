//! 标尺拖动（scrub）模块
//!
//! 在标尺上按下后，直到抬起为止，指针的每次移动都换算成一个播放时间。
//! 指针离开标尺区域后仍然继续跟踪。不做吸附。

use crate::units::TimeScale;

#[derive(Clone, Copy, Debug, Default)]
pub struct ScrubController {
    /// 按下时标尺左边缘的位置；`None` 表示没有在拖动
    ruler_left: Option<f64>,
}

impl ScrubController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.ruler_left.is_some()
    }

    /// 在标尺上按下：开始跟踪并返回对应的时间
    pub fn press(&mut self, pointer_x: f64, ruler_left: f64, scale: &TimeScale, total_duration: i64) -> Option<i64> {
        let time = time_at(pointer_x, ruler_left, scale, total_duration)?;
        log::debug!("scrub started at {}ms", time);
        self.ruler_left = Some(ruler_left);
        Some(time)
    }

    /// 按住时移动：未在跟踪时返回 `None`。位置相对于按下时记录的标尺左边缘
    pub fn drag(&self, pointer_x: f64, scale: &TimeScale, total_duration: i64) -> Option<i64> {
        let ruler_left = self.ruler_left?;
        time_at(pointer_x, ruler_left, scale, total_duration)
    }

    pub fn release(&mut self) {
        if self.ruler_left.take().is_some() {
            log::debug!("scrub ended");
        }
    }
}

/// 指针位置对应的时间，限制在 `[0, total_duration]` 内
pub fn time_at(pointer_x: f64, ruler_left: f64, scale: &TimeScale, total_duration: i64) -> Option<i64> {
    let Some(time) = scale.try_pixels_to_time(pointer_x - ruler_left) else {
        log::warn!("ignoring scrub at non-finite position {pointer_x}");
        return None;
    };
    Some(time.clamp(0, total_duration.max(0)))
}
