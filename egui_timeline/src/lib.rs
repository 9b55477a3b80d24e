//! # egui_timeline
//!
//! 一个用于视频/演示编辑器的时间轴交互组件库。
//!
//! ## 功能特性
//!
//! - **时间与像素换算**：按缩放比例在毫秒和像素之间转换
//! - **拖动与调整大小**：场景和图层的移动、左右边缘调整，带最小时长限制
//! - **边缘吸附**：拖动时对齐到同级元素的边缘
//! - **标尺**：点击或拖动标尺设置播放时间，自动选择刻度间隔
//!
//! 时间轴不持有数据。宿主每帧传入场景和图层的快照，编辑器只发出事件，
//! 由宿主决定是否接受变化。
//!
//! ## 基本使用
//!
//! ```rust
//! use egui::Pos2;
//! use egui_timeline::{Scene, TimelineData, TimelineEditor, TimelineEvent, TimelineOptions};
//!
//! let mut scenes = vec![Scene::new("intro", 0, 2000)];
//! let mut editor = TimelineEditor::new(TimelineOptions::default());
//!
//! // 按住场景中部向右拖动 50 像素（缩放为 1 时是 500 毫秒）
//! let data = TimelineData::new(&scenes, &[], 0, 1.0);
//! editor.pointer_pressed(&data, Pos2::new(100.0, 60.0));
//! editor.pointer_moved(&data, Pos2::new(150.0, 60.0));
//! editor.pointer_released(&data, Pos2::new(150.0, 60.0));
//!
//! for event in editor.take_events() {
//!     if let TimelineEvent::SceneChanged(change) = event {
//!         change.apply_to(&mut scenes);
//!     }
//! }
//! assert_eq!(scenes[0].start_time, 500);
//! ```
//!
//! 在 egui 中使用时，宿主自己绘制元素，然后调用 `editor.interact(ui, &data, rect)`
//! 处理这一帧的指针输入。

pub mod editor;
pub mod error;
pub mod gesture;
pub mod options;
pub mod scrub;
pub mod snap;
pub mod structure;
pub mod ticks;
pub mod ui;
pub mod units;

pub use editor::{ChangeKind, LayerChange, SceneChange, TimelineEvent};
pub use error::TimelineError;
pub use gesture::{GestureKind, GestureMachine, GestureState, Handle};
pub use options::TimelineOptions;
pub use structure::{ElementKind, Layer, LayerKind, LayerMeta, Scene, SceneMeta, Selection, TimelineData, TimelineElement};
pub use ticks::{plan_ticks, plan_ticks_between, Tick, TickKind, TickPlan, TickSpacing};
pub use ui::{Hit, TimelineEditor, TimelineLayout};
pub use units::{TimeScale, MAX_TIME_MS};
