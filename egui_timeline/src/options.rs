//! 配置模块
//!
//! 时间轴的可调参数：比例、最小时长、吸附、布局尺寸和刻度密度。可以从 JSON 加载，缺省字段使用默认值。

use crate::error::TimelineError;
use crate::structure::ElementKind;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    /// 缩放为 1 时每秒的像素数
    pub pixels_per_second_at_zoom1: f64,
    /// 场景的最小时长（毫秒）
    pub scene_min_duration: i64,
    /// 图层的最小时长（毫秒）
    pub layer_min_duration: i64,
    pub snap_enabled: bool,
    pub snap_threshold_px: f64,
    /// 调整大小手柄的宽度，一半在元素内一半在元素外
    pub handle_width: f32,
    pub ruler_height: f32,
    pub scene_row_height: f32,
    pub layer_track_spacing: f32,
    pub layer_height: f32,
    pub min_major_tick_spacing: f64,
    pub min_minor_tick_spacing: f64,
    /// 没有场景时时间轴的总时长（毫秒）
    pub empty_timeline_duration: i64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_wheel_sensitivity: f64,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            pixels_per_second_at_zoom1: 100.0,
            scene_min_duration: 100,
            layer_min_duration: 50,
            snap_enabled: true,
            snap_threshold_px: 8.0,
            handle_width: 8.0,
            ruler_height: 30.0,
            scene_row_height: 60.0,
            layer_track_spacing: 25.0,
            layer_height: 20.0,
            min_major_tick_spacing: 80.0,
            min_minor_tick_spacing: 8.0,
            empty_timeline_duration: 10_000,
            min_zoom: 0.05,
            max_zoom: 20.0,
            zoom_wheel_sensitivity: 0.001,
        }
    }
}

impl TimelineOptions {
    /// 从 JSON 字符串加载并校验配置
    pub fn from_json_str(json: &str) -> Result<Self, TimelineError> {
        let options: TimelineOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        if !self.pixels_per_second_at_zoom1.is_finite() || self.pixels_per_second_at_zoom1 <= 0.0 {
            return Err(TimelineError::InvalidScale(self.pixels_per_second_at_zoom1));
        }
        if self.scene_min_duration <= 0 || self.layer_min_duration <= 0 {
            return Err(TimelineError::InvalidOptions(format!(
                "minimum durations must be positive (scene {}, layer {})",
                self.scene_min_duration, self.layer_min_duration
            )));
        }
        if !self.snap_threshold_px.is_finite() || self.snap_threshold_px < 0.0 {
            return Err(TimelineError::InvalidOptions(format!(
                "snap threshold must be a non-negative pixel distance, got {}",
                self.snap_threshold_px
            )));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom && self.max_zoom.is_finite()) {
            return Err(TimelineError::InvalidOptions(format!(
                "zoom range {}..={} is not a positive, ordered range",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.empty_timeline_duration < 0 {
            return Err(TimelineError::InvalidOptions(format!(
                "empty timeline duration must not be negative, got {}",
                self.empty_timeline_duration
            )));
        }
        Ok(())
    }

    pub fn min_duration(&self, kind: ElementKind) -> i64 {
        match kind {
            ElementKind::Scene => self.scene_min_duration,
            ElementKind::Layer => self.layer_min_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = TimelineOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.min_duration(ElementKind::Scene), 100);
        assert_eq!(options.min_duration(ElementKind::Layer), 50);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let options = TimelineOptions::from_json_str(
            r#"{ "scene_min_duration": 250, "snap_threshold_px": 12.5 }"#,
        )
        .unwrap();
        assert_eq!(options.scene_min_duration, 250);
        assert_eq!(options.snap_threshold_px, 12.5);
        assert_eq!(options.layer_min_duration, 50);
        assert_eq!(options.pixels_per_second_at_zoom1, 100.0);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            TimelineOptions::from_json_str(r#"{ "layer_min_duration": 0 }"#),
            Err(TimelineError::InvalidOptions(_))
        ));
        assert!(matches!(
            TimelineOptions::from_json_str(r#"{ "pixels_per_second_at_zoom1": -1.0 }"#),
            Err(TimelineError::InvalidScale(_))
        ));
        assert!(matches!(
            TimelineOptions::from_json_str(r#"{ "min_zoom": 4.0, "max_zoom": 2.0 }"#),
            Err(TimelineError::InvalidOptions(_))
        ));
        assert!(matches!(
            TimelineOptions::from_json_str("{ not json"),
            Err(TimelineError::Config(_))
        ));
    }
}
