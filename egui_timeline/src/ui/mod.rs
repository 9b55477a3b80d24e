//! UI 模块
//!
//! 时间轴编辑器的交互入口。把指针输入（或 egui 的指针状态）路由到手势状态机、
//! 标尺拖动和缩放，并把结果作为事件发给宿主。绘制由宿主负责。

mod layout;

pub use layout::{ElementRect, Hit, TimelineLayout};

use crate::editor::TimelineEvent;
use crate::error::TimelineError;
use crate::gesture::{GestureKind, GestureMachine, GestureState, Handle};
use crate::options::TimelineOptions;
use crate::scrub::ScrubController;
use crate::structure::{Selection, TimelineData};
use crate::ticks::{plan_ticks_between, TickPlan, TickSpacing};
use crate::units::TimeScale;
use egui::*;

pub struct TimelineEditor {
    options: TimelineOptions,

    // Interaction state
    gestures: GestureMachine,
    scrub: ScrubController,
    drag_start_pos: Option<Pos2>,
    last_pointer_pos: Option<Pos2>,

    // Events
    pending_events: Vec<TimelineEvent>,
    event_listener: Option<Box<dyn FnMut(&TimelineEvent)>>,
}

impl TimelineEditor {
    pub fn new(options: TimelineOptions) -> Self {
        Self {
            gestures: GestureMachine::from_options(&options),
            options,
            scrub: ScrubController::new(),
            drag_start_pos: None,
            last_pointer_pos: None,
            pending_events: Vec::new(),
            event_listener: None,
        }
    }

    /// 校验配置后再创建编辑器
    pub fn try_new(options: TimelineOptions) -> Result<Self, TimelineError> {
        options.validate()?;
        Ok(Self::new(options))
    }

    pub fn set_event_listener(&mut self, listener: Box<dyn FnMut(&TimelineEvent)>) {
        self.event_listener = Some(listener);
    }

    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn options(&self) -> &TimelineOptions {
        &self.options
    }

    pub fn active_gesture(&self) -> Option<&GestureState> {
        self.gestures.active()
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_active()
    }

    /// 是否有未结束的指针交互（手势或标尺拖动）
    pub fn is_interacting(&self) -> bool {
        self.gestures.is_active() || self.scrub.is_active()
    }

    /// 当前数据对应的坐标映射。缩放非法时记录日志并返回 `None`
    pub fn scale(&self, data: &TimelineData) -> Option<TimeScale> {
        match TimeScale::new(data.zoom, self.options.pixels_per_second_at_zoom1) {
            Ok(scale) => Some(scale),
            Err(err) => {
                log::warn!("ignoring timeline input: {err}");
                None
            }
        }
    }

    pub fn layout(&self, data: &TimelineData) -> Option<TimelineLayout> {
        let scale = self.scale(data)?;
        Some(TimelineLayout::new(data, &scale, &self.options))
    }

    /// 标尺刻度，供宿主绘制。`visible` 是可见的横向范围（控件局部像素）
    pub fn tick_plan(&self, data: &TimelineData, visible: Rangef) -> Option<TickPlan> {
        let scale = self.scale(data)?;
        let spacing = TickSpacing {
            min_major_px: self.options.min_major_tick_spacing,
            min_minor_px: self.options.min_minor_tick_spacing,
        };
        Some(plan_ticks_between(
            |t| scale.time_to_pixels(t),
            self.total_duration(data),
            scale.pixels_to_time(visible.min as f64),
            scale.pixels_to_time(visible.max as f64),
            spacing,
        ))
    }

    pub fn total_duration(&self, data: &TimelineData) -> i64 {
        data.total_duration(self.options.empty_timeline_duration)
    }

    /// 指针按下（控件局部坐标）
    pub fn pointer_pressed(&mut self, data: &TimelineData, pos: Pos2) {
        if self.is_interacting() {
            log::warn!("pointer pressed at {pos:?} while an interaction is active, ignoring");
            return;
        }
        if !pos.x.is_finite() || !pos.y.is_finite() {
            log::warn!("ignoring pointer press at non-finite position {pos:?}");
            return;
        }
        let Some(scale) = self.scale(data) else {
            return;
        };
        let layout = TimelineLayout::new(data, &scale, &self.options);
        self.last_pointer_pos = Some(pos);

        match layout.hit_test(pos) {
            Hit::Ruler => {
                let total = self.total_duration(data);
                if let Some(new_time) = self.scrub.press(pos.x as f64, layout.ruler.min.x as f64, &scale, total) {
                    self.emit_event(TimelineEvent::TimeChanged { new_time });
                }
            }
            Hit::Element { kind, id, handle } => {
                self.emit_event(TimelineEvent::SelectionChanged(Some(Selection {
                    kind,
                    id: id.clone(),
                })));
                if let Some(event) = self.gestures.begin(GestureKind::new(kind, handle), &id, data) {
                    self.emit_event(event);
                }
                if self.gestures.is_active() {
                    self.drag_start_pos = Some(pos);
                }
            }
            Hit::Background => {
                self.emit_event(TimelineEvent::SelectionChanged(None));
            }
        }
    }

    /// 指针移动。按下后即使离开控件也应继续调用；位置与上次相同时不做任何事
    pub fn pointer_moved(&mut self, data: &TimelineData, pos: Pos2) {
        if !self.is_interacting() || self.last_pointer_pos == Some(pos) {
            return;
        }
        self.last_pointer_pos = Some(pos);

        if self.scrub.is_active() {
            let Some(scale) = self.scale(data) else {
                return;
            };
            let total = self.total_duration(data);
            if let Some(new_time) = self.scrub.drag(pos.x as f64, &scale, total) {
                self.emit_event(TimelineEvent::TimeChanged { new_time });
            }
            return;
        }

        let Some(start) = self.drag_start_pos else {
            return;
        };
        let Some(scale) = self.scale(data) else {
            return;
        };
        let delta = (pos.x - start.x) as f64;
        if let Some(event) = self.gestures.drag(delta, data, &scale) {
            self.emit_event(event);
        }
    }

    pub fn pointer_released(&mut self, data: &TimelineData, pos: Pos2) {
        self.last_pointer_pos = None;
        if self.scrub.is_active() {
            self.scrub.release();
            return;
        }

        let Some(start) = self.drag_start_pos.take() else {
            return;
        };
        let event = match self.scale(data) {
            Some(scale) => self.gestures.release((pos.x - start.x) as f64, data, &scale),
            // 无法计算最终位置时恢复到手势开始前
            None => self.gestures.cancel(data),
        };
        if let Some(event) = event {
            self.emit_event(event);
        }
    }

    /// 中止当前交互（例如宿主失去指针捕获）
    pub fn cancel(&mut self, data: &TimelineData) {
        self.scrub.release();
        self.drag_start_pos = None;
        self.last_pointer_pos = None;
        if let Some(event) = self.gestures.cancel(data) {
            self.emit_event(event);
        }
    }

    /// 请求新的缩放值，限制在配置的范围内。与当前值相同时不发事件
    pub fn set_zoom(&mut self, data: &TimelineData, zoom: f64) {
        if !zoom.is_finite() || zoom <= 0.0 {
            log::warn!("ignoring zoom request {zoom}");
            return;
        }
        let new_zoom = zoom.clamp(self.options.min_zoom, self.options.max_zoom);
        if new_zoom != data.zoom {
            self.emit_event(TimelineEvent::ZoomChanged { new_zoom });
        }
    }

    pub fn zoom_by(&mut self, data: &TimelineData, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("ignoring zoom factor {factor}");
            return;
        }
        self.set_zoom(data, data.zoom * factor);
    }

    /// 在 `rect` 区域内读取 egui 的指针输入并驱动编辑器
    ///
    /// 只负责交互（包括光标形状和 Ctrl+滚轮缩放），不绘制任何内容。
    pub fn interact(&mut self, ui: &mut Ui, data: &TimelineData, rect: Rect) -> Response {
        let response = ui.allocate_rect(rect, Sense::click_and_drag());
        let (pressed, down, released, pointer_pos, scroll_delta, ctrl) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
                i.raw_scroll_delta.y,
                i.modifiers.ctrl,
            )
        });
        let to_local = |p: Pos2| (p - rect.min).to_pos2();

        let mut just_pressed = false;
        if pressed && !self.is_interacting() {
            if let Some(pos) = pointer_pos.filter(|p| rect.contains(*p)) {
                self.pointer_pressed(data, to_local(pos));
                just_pressed = true;
            }
        }

        // 按下后全局跟踪指针，离开控件区域也继续拖动
        if self.is_interacting() && !(just_pressed && !released) {
            match pointer_pos {
                Some(pos) if released => self.pointer_released(data, to_local(pos)),
                Some(pos) if down => self.pointer_moved(data, to_local(pos)),
                None if down => {}
                _ => self.cancel(data),
            }
        }

        if ctrl && scroll_delta != 0.0 && response.hovered() {
            let factor = 1.0 + scroll_delta as f64 * self.options.zoom_wheel_sensitivity;
            self.zoom_by(data, factor);
        }

        self.update_cursor(ui, data, &response, rect);
        response
    }

    fn update_cursor(&self, ui: &Ui, data: &TimelineData, response: &Response, rect: Rect) {
        if let Some(gesture) = self.gestures.active() {
            let icon = match gesture.kind.handle() {
                Handle::Body => CursorIcon::Grabbing,
                Handle::Left | Handle::Right => CursorIcon::ResizeHorizontal,
            };
            ui.ctx().set_cursor_icon(icon);
            return;
        }

        let Some(hover) = response.hover_pos() else {
            return;
        };
        // 悬停时不记录非法缩放的日志，交互时才报告
        let Ok(scale) = TimeScale::new(data.zoom, self.options.pixels_per_second_at_zoom1) else {
            return;
        };
        let layout = TimelineLayout::new(data, &scale, &self.options);
        if let Hit::Element { handle, .. } = layout.hit_test((hover - rect.min).to_pos2()) {
            let icon = match handle {
                Handle::Body => CursorIcon::Grab,
                Handle::Left | Handle::Right => CursorIcon::ResizeHorizontal,
            };
            ui.ctx().set_cursor_icon(icon);
        }
    }

    fn emit_event(&mut self, event: TimelineEvent) {
        if let Some(ref mut listener) = self.event_listener {
            listener(&event);
        }
        self.pending_events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::ChangeKind;
    use crate::structure::{ElementKind, Scene};

    // 100 px/s at zoom 1; scene row starts at y = 30
    const ROW_Y: f32 = 60.0;

    #[test]
    fn click_on_background_clears_selection() {
        let scenes = vec![Scene::new("a", 0, 1000)];
        let data = TimelineData::new(&scenes, &[], 0, 1.0);
        let mut editor = TimelineEditor::new(TimelineOptions::default());

        editor.pointer_pressed(&data, Pos2::new(500.0, ROW_Y));
        editor.pointer_released(&data, Pos2::new(500.0, ROW_Y));
        assert_eq!(editor.take_events(), vec![TimelineEvent::SelectionChanged(None)]);
        assert!(editor.take_events().is_empty());
    }

    #[test]
    fn resize_press_selects_then_reports_start() {
        let scenes = vec![Scene::new("a", 0, 1000)];
        let data = TimelineData::new(&scenes, &[], 0, 1.0);
        let mut editor = TimelineEditor::new(TimelineOptions::default());

        editor.pointer_pressed(&data, Pos2::new(100.0, ROW_Y));
        let events = editor.take_events();
        assert_eq!(
            events[0],
            TimelineEvent::SelectionChanged(Some(Selection {
                kind: ElementKind::Scene,
                id: "a".to_owned()
            }))
        );
        assert_eq!(events[1].change_kind(), Some(ChangeKind::ResizeStart));
        assert!(editor.is_interacting());
    }

    #[test]
    fn listener_sees_every_event() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut editor = TimelineEditor::new(TimelineOptions::default());
        editor.set_event_listener(Box::new(move |event| sink.borrow_mut().push(event.clone())));

        let data = TimelineData::new(&[], &[], 0, 1.0);
        editor.pointer_pressed(&data, Pos2::new(250.0, 5.0));
        editor.pointer_moved(&data, Pos2::new(300.0, 200.0));
        editor.pointer_released(&data, Pos2::new(300.0, 200.0));

        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(*seen.borrow(), editor.take_events());
    }

    #[test]
    fn invalid_zoom_is_ignored() {
        let scenes = vec![Scene::new("a", 0, 1000)];
        let data = TimelineData::new(&scenes, &[], 0, 0.0);
        let mut editor = TimelineEditor::new(TimelineOptions::default());

        editor.pointer_pressed(&data, Pos2::new(50.0, ROW_Y));
        assert!(editor.take_events().is_empty());
        assert!(!editor.is_interacting());
        assert!(editor.layout(&data).is_none());
    }

    #[test]
    fn zoom_requests_are_clamped() {
        let data = TimelineData::new(&[], &[], 0, 1.0);
        let mut editor = TimelineEditor::new(TimelineOptions::default());

        editor.zoom_by(&data, 1.25);
        editor.set_zoom(&data, 500.0);
        editor.set_zoom(&data, 0.001);
        editor.set_zoom(&data, 1.0);
        editor.zoom_by(&data, f64::NAN);
        editor.set_zoom(&data, -3.0);
        assert_eq!(
            editor.take_events(),
            vec![
                TimelineEvent::ZoomChanged { new_zoom: 1.25 },
                TimelineEvent::ZoomChanged { new_zoom: 20.0 },
                TimelineEvent::ZoomChanged { new_zoom: 0.05 },
            ]
        );
    }

    #[test]
    fn stationary_pointer_is_forwarded_once() {
        let scenes = vec![Scene::new("a", 0, 1000)];
        let data = TimelineData::new(&scenes, &[], 0, 1.0);
        let mut editor = TimelineEditor::new(TimelineOptions::default());

        editor.pointer_pressed(&data, Pos2::new(50.0, ROW_Y));
        editor.pointer_moved(&data, Pos2::new(50.0, ROW_Y));
        editor.pointer_moved(&data, Pos2::new(70.0, ROW_Y));
        editor.pointer_moved(&data, Pos2::new(70.0, ROW_Y));
        editor.pointer_moved(&data, Pos2::new(80.0, ROW_Y));

        let kinds: Vec<_> = editor.take_events().iter().map(TimelineEvent::change_kind).collect();
        assert_eq!(kinds, vec![None, Some(ChangeKind::Move), Some(ChangeKind::Move)]);
    }

    #[test]
    fn extreme_pointer_positions_do_not_overflow() {
        use crate::units::MAX_TIME_MS;

        let scenes = vec![Scene::new("a", 500, 1000)];
        let data = TimelineData::new(&scenes, &[], 0, 1.0);
        let mut editor = TimelineEditor::new(TimelineOptions::default());

        editor.pointer_pressed(&data, Pos2::new(100.0, ROW_Y));
        editor.pointer_moved(&data, Pos2::new(f32::MAX, ROW_Y));
        editor.pointer_released(&data, Pos2::new(f32::MAX, ROW_Y));

        let events = editor.take_events();
        assert_eq!(events.len(), 3);
        match events.last() {
            Some(TimelineEvent::SceneChanged(change)) => {
                assert_eq!(change.scene.start_time, 500 + MAX_TIME_MS);
                assert_eq!(change.scene.duration, 1000);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn unvalidated_zero_minimum_still_commits_positive_duration() {
        let options = TimelineOptions {
            scene_min_duration: 0,
            ..TimelineOptions::default()
        };
        let scenes = vec![Scene::new("a", 0, 1000)];
        let data = TimelineData::new(&scenes, &[], 0, 1.0);
        let mut editor = TimelineEditor::new(options);

        editor.pointer_pressed(&data, Pos2::new(100.0, ROW_Y));
        editor.pointer_released(&data, Pos2::new(-500.0, ROW_Y));

        match editor.take_events().last() {
            Some(TimelineEvent::SceneChanged(change)) => {
                assert_eq!(change.kind, ChangeKind::ResizeEnd);
                assert_eq!(change.scene.duration, 1);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn tick_plan_covers_only_the_visible_range() {
        let scenes = vec![Scene::new("a", 0, 60_000)];
        let data = TimelineData::new(&scenes, &[], 0, 1.0);
        let editor = TimelineEditor::new(TimelineOptions::default());

        // 100 px/s: 250..550 px is 2.5..5.5 s, 100 ms minor ticks
        let plan = editor.tick_plan(&data, Rangef::new(250.0, 550.0)).unwrap();
        assert_eq!(plan.ticks.first().map(|t| t.time), Some(2_500));
        assert_eq!(plan.ticks.last().map(|t| t.time), Some(5_500));
        assert_eq!(plan.ticks.len(), 31);
    }

    #[test]
    fn try_new_rejects_invalid_options() {
        let options = TimelineOptions {
            scene_min_duration: -1,
            ..TimelineOptions::default()
        };
        assert!(TimelineEditor::try_new(options).is_err());
        assert!(TimelineEditor::try_new(TimelineOptions::default()).is_ok());
    }
}
