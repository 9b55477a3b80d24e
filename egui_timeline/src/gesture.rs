//! 拖拽/调整大小状态机
//!
//! 每次按下到抬起是一个手势。手势开始时对目标做快照，之后的每一帧都从快照和
//! 「相对起点的总位移」重新计算结果，最终值也一样，避免逐帧累加带来的舍入漂移。
//! 状态机从不修改宿主数据，只返回通知。

use crate::editor::{ChangeKind, LayerChange, SceneChange, TimelineEvent};
use crate::options::TimelineOptions;
use crate::snap::{resolve_snap, PixelSpan};
use crate::structure::{ElementKind, Scene, TimelineData};
use crate::units::TimeScale;

/// 手势作用于元素的哪个部位
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    Body,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    SceneMove,
    SceneResizeLeft,
    SceneResizeRight,
    LayerMove,
    LayerResizeLeft,
    LayerResizeRight,
}

impl GestureKind {
    pub fn new(element: ElementKind, handle: Handle) -> Self {
        match (element, handle) {
            (ElementKind::Scene, Handle::Body) => GestureKind::SceneMove,
            (ElementKind::Scene, Handle::Left) => GestureKind::SceneResizeLeft,
            (ElementKind::Scene, Handle::Right) => GestureKind::SceneResizeRight,
            (ElementKind::Layer, Handle::Body) => GestureKind::LayerMove,
            (ElementKind::Layer, Handle::Left) => GestureKind::LayerResizeLeft,
            (ElementKind::Layer, Handle::Right) => GestureKind::LayerResizeRight,
        }
    }

    pub fn element(self) -> ElementKind {
        match self {
            GestureKind::SceneMove | GestureKind::SceneResizeLeft | GestureKind::SceneResizeRight => {
                ElementKind::Scene
            }
            GestureKind::LayerMove | GestureKind::LayerResizeLeft | GestureKind::LayerResizeRight => {
                ElementKind::Layer
            }
        }
    }

    pub fn handle(self) -> Handle {
        match self {
            GestureKind::SceneMove | GestureKind::LayerMove => Handle::Body,
            GestureKind::SceneResizeLeft | GestureKind::LayerResizeLeft => Handle::Left,
            GestureKind::SceneResizeRight | GestureKind::LayerResizeRight => Handle::Right,
        }
    }

    pub fn is_resize(self) -> bool {
        self.handle() != Handle::Body
    }
}

/// 手势开始时的快照。手势期间不会从宿主数据重新读取
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GestureState {
    pub kind: GestureKind,
    pub target_id: String,
    pub origin_start_time: i64,
    pub origin_duration: i64,
    moved: bool,
}

impl GestureState {
    /// 手势期间是否出现过非零位移
    pub fn has_moved(&self) -> bool {
        self.moved
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationLimits {
    pub scene_min: i64,
    pub layer_min: i64,
}

impl DurationLimits {
    pub fn min_for(&self, element: ElementKind) -> i64 {
        match element {
            ElementKind::Scene => self.scene_min,
            ElementKind::Layer => self.layer_min,
        }
    }

    fn at_least_one_ms(self) -> Self {
        if self.scene_min < 1 || self.layer_min < 1 {
            log::warn!(
                "minimum durations must be positive (scene {}, layer {}), raising to 1ms",
                self.scene_min,
                self.layer_min
            );
        }
        Self {
            scene_min: self.scene_min.max(1),
            layer_min: self.layer_min.max(1),
        }
    }
}

impl Default for DurationLimits {
    fn default() -> Self {
        Self {
            scene_min: 100,
            layer_min: 50,
        }
    }
}

/// 从左手柄调整大小：右边缘保持不动，时长不低于 `min_duration`
pub fn resize_from_left(origin_start: i64, origin_duration: i64, delta_ms: i64, min_duration: i64) -> (i64, i64) {
    let duration = origin_duration.saturating_sub(delta_ms);
    if duration < min_duration {
        let right = origin_start.saturating_add(origin_duration);
        (right.saturating_sub(min_duration), min_duration)
    } else {
        (origin_start.saturating_add(delta_ms), duration)
    }
}

/// 从右手柄调整大小：开始时间不变，时长不低于 `min_duration`
pub fn resize_from_right(origin_start: i64, origin_duration: i64, delta_ms: i64, min_duration: i64) -> (i64, i64) {
    (origin_start, origin_duration.saturating_add(delta_ms).max(min_duration))
}

/// 单槽手势状态机：`Idle`（槽为空）→ `Active`（槽内有快照）→ `Idle`
#[derive(Debug)]
pub struct GestureMachine {
    slot: Option<GestureState>,
    limits: DurationLimits,
    /// `None` 表示关闭吸附
    snap_threshold_px: Option<f64>,
}

impl GestureMachine {
    /// 小于 1 毫秒的最小时长会被提高到 1 毫秒，保证提交的时长总是正数
    pub fn new(limits: DurationLimits, snap_threshold_px: Option<f64>) -> Self {
        Self {
            slot: None,
            limits: limits.at_least_one_ms(),
            snap_threshold_px,
        }
    }

    pub fn from_options(options: &TimelineOptions) -> Self {
        let limits = DurationLimits {
            scene_min: options.min_duration(ElementKind::Scene),
            layer_min: options.min_duration(ElementKind::Layer),
        };
        let threshold = options.snap_enabled.then_some(options.snap_threshold_px);
        Self::new(limits, threshold)
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_some()
    }

    pub fn active(&self) -> Option<&GestureState> {
        self.slot.as_ref()
    }

    /// 开始手势并对目标做快照。调整大小会立即返回 `resize-start`，移动没有开始通知。
    pub fn begin(&mut self, kind: GestureKind, target_id: &str, data: &TimelineData) -> Option<TimelineEvent> {
        if let Some(active) = &self.slot {
            log::warn!(
                "ignoring {:?} on '{}' while {:?} on '{}' is still active",
                kind,
                target_id,
                active.kind,
                active.target_id
            );
            return None;
        }

        let Some(target) = data.element(kind.element(), target_id) else {
            log::warn!("cannot start {:?}: '{}' is not in the timeline data", kind, target_id);
            return None;
        };
        let (origin_start_time, origin_duration) = (target.start_time(), target.duration());

        let state = GestureState {
            kind,
            target_id: target_id.to_owned(),
            origin_start_time,
            origin_duration,
            moved: false,
        };
        log::debug!(
            "gesture {:?} started on '{}' at {}ms (+{}ms)",
            kind,
            target_id,
            origin_start_time,
            origin_duration
        );

        let event = if kind.is_resize() {
            self.notify(&state, ChangeKind::ResizeStart, origin_start_time, origin_duration, data)
        } else {
            None
        };
        self.slot = Some(state);
        event
    }

    /// 处理一帧指针移动。`delta_px` 是相对按下位置的总位移
    pub fn drag(&mut self, delta_px: f64, data: &TimelineData, scale: &TimeScale) -> Option<TimelineEvent> {
        if !delta_px.is_finite() {
            log::warn!("ignoring non-finite drag delta {delta_px}");
            return None;
        }
        let state = self.slot.as_mut()?;
        if delta_px != 0.0 {
            state.moved = true;
        } else if !state.moved {
            // 还没有任何位移，不需要预览
            return None;
        }

        let state = self.slot.as_ref()?;
        let (start, duration) = self.project(state, delta_px, data, scale)?;
        log::trace!("{:?} '{}' -> {}ms (+{}ms)", state.kind, state.target_id, start, duration);
        let change = if state.kind.is_resize() {
            ChangeKind::Resize
        } else {
            ChangeKind::Move
        };
        self.notify(state, change, start, duration, data)
    }

    /// 结束手势。无论能否生成通知，快照都会被丢弃
    pub fn release(&mut self, delta_px: f64, data: &TimelineData, scale: &TimeScale) -> Option<TimelineEvent> {
        let state = self.slot.take()?;

        if !delta_px.is_finite() {
            log::warn!("non-finite release delta for '{}', reverting", state.target_id);
            return self.revert(&state, data);
        }
        if !state.moved && delta_px == 0.0 {
            log::debug!("gesture {:?} on '{}' ended without movement", state.kind, state.target_id);
            return self.revert(&state, data);
        }

        let (start, duration) = self.project(&state, delta_px, data, scale)?;
        let (start, duration) = self.settle(&state, start, duration);
        log::debug!(
            "gesture {:?} on '{}' finished at {}ms (+{}ms)",
            state.kind,
            state.target_id,
            start,
            duration
        );
        let change = if state.kind.is_resize() {
            ChangeKind::ResizeEnd
        } else {
            ChangeKind::Move
        };
        self.notify(&state, change, start, duration, data)
    }

    /// 中止当前手势，把目标恢复到快照
    pub fn cancel(&mut self, data: &TimelineData) -> Option<TimelineEvent> {
        let state = self.slot.take()?;
        log::debug!("gesture {:?} on '{}' cancelled", state.kind, state.target_id);
        self.revert(&state, data)
    }

    // 调整大小总是以 resize-end 回到快照；移动只有发出过预览时才需要恢复
    fn revert(&self, state: &GestureState, data: &TimelineData) -> Option<TimelineEvent> {
        if state.kind.is_resize() {
            self.notify(
                state,
                ChangeKind::ResizeEnd,
                state.origin_start_time,
                state.origin_duration,
                data,
            )
        } else if state.moved {
            self.notify(
                state,
                ChangeKind::Move,
                state.origin_start_time,
                state.origin_duration,
                data,
            )
        } else {
            None
        }
    }

    fn project(
        &self,
        state: &GestureState,
        delta_px: f64,
        data: &TimelineData,
        scale: &TimeScale,
    ) -> Option<(i64, i64)> {
        let min_duration = self.limits.min_for(state.kind.element());
        match state.kind.handle() {
            Handle::Body => {
                let adjusted = self.snapped_delta(state, delta_px, data, scale)?;
                let delta_ms = scale.pixels_to_time(adjusted);
                Some((state.origin_start_time.saturating_add(delta_ms), state.origin_duration))
            }
            Handle::Left => Some(resize_from_left(
                state.origin_start_time,
                state.origin_duration,
                scale.pixels_to_time(delta_px),
                min_duration,
            )),
            Handle::Right => Some(resize_from_right(
                state.origin_start_time,
                state.origin_duration,
                scale.pixels_to_time(delta_px),
                min_duration,
            )),
        }
    }

    // 兄弟元素每帧都从当前数据读取；被拖动元素的位置只来自快照
    fn snapped_delta(
        &self,
        state: &GestureState,
        delta_px: f64,
        data: &TimelineData,
        scale: &TimeScale,
    ) -> Option<f64> {
        let Some(threshold) = self.snap_threshold_px else {
            return Some(delta_px);
        };

        let outcome = match state.kind.element() {
            ElementKind::Scene => {
                let moving = PixelSpan::new(
                    scale.time_to_pixels(state.origin_start_time),
                    scale.time_to_pixels(state.origin_duration),
                );
                let siblings = data
                    .scenes
                    .iter()
                    .filter(|s| s.id != state.target_id)
                    .map(|s| PixelSpan::new(scale.time_to_pixels(s.start_time), scale.time_to_pixels(s.duration)));
                resolve_snap(moving, delta_px, threshold, siblings)
            }
            ElementKind::Layer => {
                let scene = parent_scene(&state.target_id, data)?;
                let moving = PixelSpan::new(
                    scale.time_to_pixels(scene.start_time.saturating_add(state.origin_start_time)),
                    scale.time_to_pixels(state.origin_duration),
                );
                let siblings = data
                    .layers_in_scene(&scene.id)
                    .filter(|l| l.id != state.target_id)
                    .map(|l| {
                        PixelSpan::new(
                            scale.time_to_pixels(l.absolute_start(scene)),
                            scale.time_to_pixels(l.duration),
                        )
                    });
                resolve_snap(moving, delta_px, threshold, siblings)
            }
        };

        if let Some(matched) = outcome.snapped {
            log::trace!(
                "'{}' snapped via {:?} to sibling #{} ({:+.1}px)",
                state.target_id,
                matched.pairing,
                matched.sibling_index,
                matched.correction
            );
        }
        Some(outcome.delta)
    }

    // 预览可以为负，提交的开始时间不能为负
    fn settle(&self, state: &GestureState, start: i64, duration: i64) -> (i64, i64) {
        if start >= 0 {
            return (start, duration);
        }
        match state.kind.handle() {
            Handle::Left => {
                let min_duration = self.limits.min_for(state.kind.element());
                (0, start.saturating_add(duration).max(min_duration))
            }
            Handle::Body | Handle::Right => (0, duration),
        }
    }

    fn notify(
        &self,
        state: &GestureState,
        kind: ChangeKind,
        start_time: i64,
        duration: i64,
        data: &TimelineData,
    ) -> Option<TimelineEvent> {
        match state.kind.element() {
            ElementKind::Scene => {
                let Some(scene) = data.scene(&state.target_id) else {
                    log::warn!(
                        "scene '{}' is no longer in the timeline data, dropping {} notification",
                        state.target_id,
                        kind.as_str()
                    );
                    return None;
                };
                let mut scene = scene.clone();
                scene.start_time = start_time;
                scene.duration = duration;
                Some(TimelineEvent::SceneChanged(SceneChange { kind, scene }))
            }
            ElementKind::Layer => {
                let Some(layer) = data.layer(&state.target_id) else {
                    log::warn!(
                        "layer '{}' is no longer in the timeline data, dropping {} notification",
                        state.target_id,
                        kind.as_str()
                    );
                    return None;
                };
                let mut layer = layer.clone();
                layer.start_time = start_time;
                layer.duration = duration;
                Some(TimelineEvent::LayerChanged(LayerChange { kind, layer }))
            }
        }
    }
}

fn parent_scene<'a>(layer_id: &str, data: &TimelineData<'a>) -> Option<&'a Scene> {
    let Some(layer) = data.layer(layer_id) else {
        log::warn!("layer '{}' is no longer in the timeline data", layer_id);
        return None;
    };
    let scene = data.scene(&layer.scene_id);
    if scene.is_none() {
        log::warn!("layer '{}' references missing scene '{}'", layer_id, layer.scene_id);
    }
    scene
}
