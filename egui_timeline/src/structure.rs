//! 数据结构模块
//!
//! 定义了时间轴使用的核心数据结构：场景（Scene）、图层（Layer）以及宿主每帧提供的数据快照。
//! 所有时间均为整数毫秒。

use egui::Color32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// Color32 序列化辅助类型
#[derive(Clone, Copy, Serialize, Deserialize)]
struct Color32Helper {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl From<Color32> for Color32Helper {
    fn from(color: Color32) -> Self {
        Self {
            r: color.r(),
            g: color.g(),
            b: color.b(),
            a: color.a(),
        }
    }
}

impl From<Color32Helper> for Color32 {
    fn from(helper: Color32Helper) -> Self {
        Color32::from_rgba_unmultiplied(helper.r, helper.g, helper.b, helper.a)
    }
}

fn serialize_color32<S>(color: &Option<Color32>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    color.map(Color32Helper::from).serialize(serializer)
}

fn deserialize_color32<'de, D>(deserializer: D) -> Result<Option<Color32>, D::Error>
where
    D: Deserializer<'de>,
{
    let helper = Option::<Color32Helper>::deserialize(deserializer)?;
    Ok(helper.map(Color32::from))
}

/// 时间轴元素的公共接口
pub trait TimelineElement {
    fn id(&self) -> &str;
    fn start_time(&self) -> i64;
    fn duration(&self) -> i64;

    fn end_time(&self) -> i64 {
        self.start_time().saturating_add(self.duration())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Scene,
    Layer,
}

/// 场景的显示信息，对引擎不透明
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_color32",
        deserialize_with = "deserialize_color32"
    )]
    pub color: Option<Color32>,
}

/// 顶层场景，位于绝对时间轴上
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub start_time: i64, // 绝对开始时间（毫秒）
    pub duration: i64,   // 持续时间（毫秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<SceneMeta>,
}

impl Scene {
    pub fn new(id: impl Into<String>, start_time: i64, duration: i64) -> Self {
        Self {
            id: id.into(),
            start_time,
            duration,
            meta: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.meta.get_or_insert_with(SceneMeta::default).name = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.meta.get_or_insert_with(SceneMeta::default).color = Some(color);
        self
    }

    pub fn end_time(&self) -> i64 {
        self.start_time.saturating_add(self.duration)
    }

    /// 显示名称，没有设置时回退到 id
    pub fn display_name(&self) -> &str {
        self.meta
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .unwrap_or(&self.id)
    }
}

impl TimelineElement for Scene {
    fn id(&self) -> &str {
        &self.id
    }

    fn start_time(&self) -> i64 {
        self.start_time
    }

    fn duration(&self) -> i64 {
        self.duration
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Text,
    Image,
    Shape,
}

/// 图层的附加信息。引擎不理解的字段原样保存在 `extra` 中
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerMeta {
    #[serde(rename = "type")]
    pub kind: LayerKind,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// 场景内的图层。`start_time` 相对于所属场景的开始时间
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    pub scene_id: String,
    pub track: u32,      // 场景内的垂直轨道，仅用于布局
    pub start_time: i64, // 相对场景开始的时间（毫秒）
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<LayerMeta>,
}

impl Layer {
    pub fn new(
        id: impl Into<String>,
        scene_id: impl Into<String>,
        track: u32,
        start_time: i64,
        duration: i64,
    ) -> Self {
        Self {
            id: id.into(),
            scene_id: scene_id.into(),
            track,
            start_time,
            duration,
            meta: None,
        }
    }

    pub fn end_time(&self) -> i64 {
        self.start_time.saturating_add(self.duration)
    }

    /// 图层在绝对时间轴上的开始位置
    ///
    /// 比较图层和场景的位置时必须经过这里，不能直接拿相对时间和绝对时间比较。
    pub fn absolute_start(&self, scene: &Scene) -> i64 {
        scene.start_time.saturating_add(self.start_time)
    }
}

impl TimelineElement for Layer {
    fn id(&self) -> &str {
        &self.id
    }

    fn start_time(&self) -> i64 {
        self.start_time
    }

    fn duration(&self) -> i64 {
        self.duration
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub id: String,
}

impl Selection {
    pub fn scene(id: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Scene,
            id: id.into(),
        }
    }

    pub fn layer(id: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Layer,
            id: id.into(),
        }
    }
}

/// 宿主每次渲染时提供的数据快照
///
/// 宿主是唯一的数据来源；编辑器不会跨帧保存这里的任何内容（进行中的手势快照除外）。
#[derive(Clone, Copy, Debug)]
pub struct TimelineData<'a> {
    pub scenes: &'a [Scene],
    pub layers: &'a [Layer],
    pub current_time: i64,
    pub zoom: f64,
}

impl<'a> TimelineData<'a> {
    pub fn new(scenes: &'a [Scene], layers: &'a [Layer], current_time: i64, zoom: f64) -> Self {
        Self {
            scenes,
            layers,
            current_time,
            zoom,
        }
    }

    pub fn scene(&self, id: &str) -> Option<&'a Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn layer(&self, id: &str) -> Option<&'a Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn element(&self, kind: ElementKind, id: &str) -> Option<&'a dyn TimelineElement> {
        match kind {
            ElementKind::Scene => self.scene(id).map(|s| s as &dyn TimelineElement),
            ElementKind::Layer => self.layer(id).map(|l| l as &dyn TimelineElement),
        }
    }

    pub fn layers_in_scene<'s>(&self, scene_id: &'s str) -> impl Iterator<Item = &'a Layer> + 's
    where
        'a: 's,
    {
        self.layers.iter().filter(move |l| l.scene_id == scene_id)
    }

    /// 时间轴总时长：最后一个场景的结束时间；没有场景时使用 `fallback`
    pub fn total_duration(&self, fallback: i64) -> i64 {
        self.scenes
            .iter()
            .map(Scene::end_time)
            .max()
            .map(|end| end.max(0))
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_absolute_start_adds_scene_offset() {
        let scene = Scene::new("s1", 28_000, 30_000);
        let layer = Layer::new("l1", "s1", 1, 2_000, 12_000);
        assert_eq!(layer.absolute_start(&scene), 30_000);
        assert_eq!(layer.end_time(), 14_000);
    }

    #[test]
    fn total_duration_uses_latest_scene_end() {
        let scenes = vec![Scene::new("a", 0, 25_000), Scene::new("b", 28_000, 30_000)];
        let data = TimelineData::new(&scenes, &[], 0, 1.0);
        assert_eq!(data.total_duration(10_000), 58_000);
    }

    #[test]
    fn element_lookup_by_kind() {
        let scenes = vec![Scene::new("x", 1_000, 2_000)];
        let layers = vec![Layer::new("x", "x", 0, 300, 400)];
        let data = TimelineData::new(&scenes, &layers, 0, 1.0);

        let scene = data.element(ElementKind::Scene, "x").unwrap();
        assert_eq!(TimelineElement::end_time(scene), 3_000);
        let layer = data.element(ElementKind::Layer, "x").unwrap();
        assert_eq!((layer.start_time(), layer.duration()), (300, 400));
        assert!(data.element(ElementKind::Layer, "y").is_none());
    }

    #[test]
    fn total_duration_falls_back_without_scenes() {
        let data = TimelineData::new(&[], &[], 0, 1.0);
        assert_eq!(data.total_duration(10_000), 10_000);
    }

    #[test]
    fn layers_in_scene_filters_by_parent() {
        let layers = vec![
            Layer::new("l1", "s1", 0, 0, 100),
            Layer::new("l2", "s2", 0, 0, 100),
            Layer::new("l3", "s1", 1, 0, 100),
        ];
        let data = TimelineData::new(&[], &layers, 0, 1.0);
        let ids: Vec<&str> = data.layers_in_scene("s1").map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "l3"]);
    }

    #[test]
    fn host_json_round_trips_through_serde() {
        let json = r#"{
            "id": "l1a",
            "sceneId": "s1",
            "track": 1,
            "startTime": 1000,
            "duration": 8000,
            "meta": { "type": "text", "text": "Initial Planning Meeting" }
        }"#;
        let layer: Layer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.scene_id, "s1");
        let meta = layer.meta.as_ref().unwrap();
        assert_eq!(meta.kind, LayerKind::Text);
        assert_eq!(meta.extra["text"], "Initial Planning Meeting");

        let back = serde_json::to_value(&layer).unwrap();
        assert_eq!(back["startTime"], 1000);
        assert_eq!(back["meta"]["text"], "Initial Planning Meeting");
    }

    #[test]
    fn scene_color_serializes_as_rgba_components() {
        let scene = Scene::new("s1", 0, 1000)
            .with_name("Kickoff")
            .with_color(Color32::from_rgb(100, 149, 237));
        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["meta"]["color"]["g"], 149);

        let parsed: Scene = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, scene);
        assert_eq!(parsed.display_name(), "Kickoff");
    }
}
