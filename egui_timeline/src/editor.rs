//! 通知事件模块
//!
//! 定义了时间轴发给宿主应用的事件。宿主负责把变化合并回自己的数据（按 id 匹配）并重新渲染。

use crate::structure::{Layer, Scene, Selection};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Move,
    Resize,
    ResizeStart,
    ResizeEnd,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Move => "move",
            ChangeKind::Resize => "resize",
            ChangeKind::ResizeStart => "resize-start",
            ChangeKind::ResizeEnd => "resize-end",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneChange {
    pub kind: ChangeKind,
    pub scene: Scene,
}

impl SceneChange {
    /// 用变化后的场景替换宿主集合中 id 相同的元素，找不到时返回 false
    pub fn apply_to(&self, scenes: &mut [Scene]) -> bool {
        match scenes.iter_mut().find(|s| s.id == self.scene.id) {
            Some(scene) => {
                *scene = self.scene.clone();
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerChange {
    pub kind: ChangeKind,
    pub layer: Layer,
}

impl LayerChange {
    pub fn apply_to(&self, layers: &mut [Layer]) -> bool {
        match layers.iter_mut().find(|l| l.id == self.layer.id) {
            Some(layer) => {
                *layer = self.layer.clone();
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TimelineEvent {
    SceneChanged(SceneChange),
    LayerChanged(LayerChange),
    TimeChanged {
        new_time: i64,
    },
    /// `None` 表示清除选择
    SelectionChanged(Option<Selection>),
    ZoomChanged {
        new_zoom: f64,
    },
}

impl TimelineEvent {
    pub fn change_kind(&self) -> Option<ChangeKind> {
        match self {
            TimelineEvent::SceneChanged(change) => Some(change.kind),
            TimelineEvent::LayerChanged(change) => Some(change.kind),
            _ => None,
        }
    }
}
