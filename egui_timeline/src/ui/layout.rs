use crate::gesture::Handle;
use crate::options::TimelineOptions;
use crate::structure::{ElementKind, TimelineData};
use crate::units::TimeScale;
use egui::*;

/// 元素在控件局部坐标中的矩形
#[derive(Clone, Debug, PartialEq)]
pub struct ElementRect {
    pub kind: ElementKind,
    pub id: String,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Hit {
    Ruler,
    Element {
        kind: ElementKind,
        id: String,
        handle: Handle,
    },
    Background,
}

/// 一帧的布局：标尺在最上方，场景占一行，图层按 track 叠放在所属场景内
#[derive(Clone, Debug)]
pub struct TimelineLayout {
    pub ruler: Rect,
    pub scenes: Vec<ElementRect>,
    pub layers: Vec<ElementRect>,
    scale: TimeScale,
    handle_width: f32,
}

impl TimelineLayout {
    pub fn new(data: &TimelineData, scale: &TimeScale, options: &TimelineOptions) -> Self {
        let total = data.total_duration(options.empty_timeline_duration);
        let ruler = Rect::from_min_size(
            Pos2::ZERO,
            Vec2::new(scale.time_to_pixels(total) as f32, options.ruler_height),
        );
        let scene_top = options.ruler_height;

        let scenes = data
            .scenes
            .iter()
            .map(|scene| ElementRect {
                kind: ElementKind::Scene,
                id: scene.id.clone(),
                rect: Rect::from_min_size(
                    Pos2::new(scale.time_to_pixels(scene.start_time) as f32, scene_top),
                    Vec2::new(scale.time_to_pixels(scene.duration) as f32, options.scene_row_height),
                ),
            })
            .collect();

        let mut layers = Vec::with_capacity(data.layers.len());
        for layer in data.layers {
            // 图层始终通过所属场景换算到绝对时间轴
            let Some(scene) = data.scene(&layer.scene_id) else {
                log::debug!("layer '{}' has no scene '{}', not laid out", layer.id, layer.scene_id);
                continue;
            };
            let x = scale.time_to_pixels(layer.absolute_start(scene)) as f32;
            let y = scene_top + layer.track as f32 * options.layer_track_spacing;
            layers.push(ElementRect {
                kind: ElementKind::Layer,
                id: layer.id.clone(),
                rect: Rect::from_min_size(
                    Pos2::new(x, y),
                    Vec2::new(scale.time_to_pixels(layer.duration) as f32, options.layer_height),
                ),
            });
        }

        Self {
            ruler,
            scenes,
            layers,
            scale: *scale,
            handle_width: options.handle_width,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.ruler.width()
    }

    pub fn playhead_x(&self, current_time: i64) -> f32 {
        self.scale.time_to_pixels(current_time) as f32
    }

    /// 命中测试。图层画在场景之上，所以先测图层；后加入的元素优先
    pub fn hit_test(&self, pos: Pos2) -> Hit {
        if pos.y >= self.ruler.min.y && pos.y < self.ruler.max.y {
            return Hit::Ruler;
        }

        for element in self.layers.iter().rev().chain(self.scenes.iter().rev()) {
            if let Some(handle) = hit_region(element.rect, pos, self.handle_width) {
                return Hit::Element {
                    kind: element.kind,
                    id: element.id.clone(),
                    handle,
                };
            }
        }

        Hit::Background
    }
}

// Handles straddle the edge: half inside the element, half outside
fn hit_region(rect: Rect, pos: Pos2, handle_width: f32) -> Option<Handle> {
    if pos.y < rect.min.y || pos.y > rect.max.y {
        return None;
    }

    let half = handle_width / 2.0;
    if (pos.x - rect.min.x).abs() <= half {
        Some(Handle::Left)
    } else if (pos.x - rect.max.x).abs() <= half {
        Some(Handle::Right)
    } else if pos.x > rect.min.x && pos.x < rect.max.x {
        Some(Handle::Body)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{Layer, Scene};

    fn layout(scenes: &[Scene], layers: &[Layer]) -> TimelineLayout {
        let data = TimelineData::new(scenes, layers, 0, 1.0);
        let scale = TimeScale::new(1.0, 100.0).unwrap();
        TimelineLayout::new(&data, &scale, &TimelineOptions::default())
    }

    #[test]
    fn layers_are_placed_on_the_absolute_axis() {
        let scenes = vec![Scene::new("s1", 2000, 5000)];
        let layers = vec![Layer::new("l1", "s1", 2, 1000, 500)];
        let layout = layout(&scenes, &layers);

        let rect = layout.layers[0].rect;
        assert_eq!(rect.min.x, 300.0);
        assert_eq!(rect.width(), 50.0);
        assert_eq!(rect.min.y, 30.0 + 2.0 * 25.0);
        assert_eq!(layout.content_width(), 700.0);
    }

    #[test]
    fn orphan_layers_are_skipped() {
        let layers = vec![Layer::new("l1", "missing", 0, 0, 500)];
        assert!(layout(&[], &layers).layers.is_empty());
    }

    #[test]
    fn hit_test_distinguishes_ruler_handles_and_body() {
        let scenes = vec![Scene::new("s1", 1000, 2000)];
        let layout = layout(&scenes, &[]);
        let row_y = 30.0 + 50.0;

        assert_eq!(layout.hit_test(Pos2::new(150.0, 10.0)), Hit::Ruler);
        let element = |handle| Hit::Element {
            kind: ElementKind::Scene,
            id: "s1".to_owned(),
            handle,
        };
        assert_eq!(layout.hit_test(Pos2::new(97.0, row_y)), element(Handle::Left));
        assert_eq!(layout.hit_test(Pos2::new(103.0, row_y)), element(Handle::Left));
        assert_eq!(layout.hit_test(Pos2::new(200.0, row_y)), element(Handle::Body));
        assert_eq!(layout.hit_test(Pos2::new(302.0, row_y)), element(Handle::Right));
        assert_eq!(layout.hit_test(Pos2::new(320.0, row_y)), Hit::Background);
        assert_eq!(layout.hit_test(Pos2::new(200.0, 120.0)), Hit::Background);
    }

    #[test]
    fn layers_win_over_their_scene() {
        let scenes = vec![Scene::new("s1", 0, 5000)];
        let layers = vec![Layer::new("l1", "s1", 0, 1000, 1000)];
        let layout = layout(&scenes, &layers);

        match layout.hit_test(Pos2::new(150.0, 40.0)) {
            Hit::Element { kind, id, handle } => {
                assert_eq!(kind, ElementKind::Layer);
                assert_eq!(id, "l1");
                assert_eq!(handle, Handle::Body);
            }
            other => panic!("unexpected hit {other:?}"),
        }
        // below the layer but inside the scene row
        match layout.hit_test(Pos2::new(150.0, 70.0)) {
            Hit::Element { kind, .. } => assert_eq!(kind, ElementKind::Scene),
            other => panic!("unexpected hit {other:?}"),
        }
    }

    #[test]
    fn playhead_follows_scale() {
        let layout = layout(&[], &[]);
        assert_eq!(layout.playhead_x(2500), 250.0);
        // empty timeline uses the fallback duration
        assert_eq!(layout.content_width(), 1000.0);
    }
}
