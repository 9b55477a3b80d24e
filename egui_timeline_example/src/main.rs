use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};
use egui_timeline::{
    ElementKind, Layer, LayerKind, LayerMeta, Scene, Selection, TickKind, TimelineData, TimelineEditor,
    TimelineEvent, TimelineOptions,
};

fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "egui_timeline Example",
        native_options,
        Box::new(|_cc| Ok(Box::new(TimelineApp::new()))),
    )
}

fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(r, g, b, (alpha * 255.0) as u8)
}

fn sample_scenes() -> Vec<Scene> {
    vec![
        Scene::new("s1", 0, 25_000)
            .with_name("Project Kickoff")
            .with_color(rgba(100, 149, 237, 0.6)),
        Scene::new("s2", 28_000, 30_000)
            .with_name("Development Phase 1")
            .with_color(rgba(255, 160, 122, 0.6)),
        Scene::new("s3", 32_000, 20_000)
            .with_name("Client Review Loop (Overlap with Dev1)")
            .with_color(rgba(218, 112, 214, 0.5)),
        Scene::new("s4", 60_000, 22_000)
            .with_name("Development Phase 2")
            .with_color(rgba(60, 179, 113, 0.6)),
        Scene::new("s5", 85_000, 15_000)
            .with_name("Pre-Launch Activities")
            .with_color(rgba(255, 215, 0, 0.6)),
        Scene::new("s6", 102_000, 10_000).with_name("Launch Event"),
    ]
}

fn layer(id: &str, scene_id: &str, track: u32, start: i64, duration: i64, kind: LayerKind, field: (&str, &str)) -> Layer {
    let mut extra = serde_json::Map::new();
    extra.insert(field.0.to_owned(), field.1.into());
    Layer {
        meta: Some(LayerMeta { kind, extra }),
        ..Layer::new(id, scene_id, track, start, duration)
    }
}

fn sample_layers() -> Vec<Layer> {
    use LayerKind::*;
    vec![
        layer("l1a", "s1", 1, 1_000, 8_000, Text, ("text", "Initial Planning Meeting")),
        layer("l1b", "s1", 2, 2_000, 10_000, Image, ("src", "kickoff_slide.jpg")),
        layer("l1c", "s1", 1, 10_000, 12_000, Shape, ("shape", "milestone_diamond")),
        layer("l2a", "s2", 1, 0, 15_000, Text, ("text", "Frontend Development Sprints")),
        layer("l2b", "s2", 2, 2_000, 12_000, Shape, ("shape", "progress_bar")),
        layer("l2c", "s2", 1, 16_000, 10_000, Image, ("src", "ui_mockups.png")),
        layer("l3a", "s3", 1, 1_000, 5_000, Text, ("text", "Feedback Session 1")),
        layer("l3b", "s3", 2, 6_000, 8_000, Image, ("src", "client_feedback.png")),
        layer("l4a", "s4", 1, 1_000, 20_000, Text, ("text", "Integration & Testing")),
        layer("l5a", "s5", 1, 0, 7_000, Text, ("text", "Marketing Campaign Prep")),
        layer("l6a", "s6", 1, 1_000, 8_000, Text, ("text", "Keynote Presentation")),
    ]
}

struct TimelineApp {
    editor: TimelineEditor,
    scenes: Vec<Scene>,
    layers: Vec<Layer>,
    current_time: i64,
    zoom: f64,
    selection: Option<Selection>,
    next_id: usize,
}

impl TimelineApp {
    fn new() -> Self {
        Self {
            editor: TimelineEditor::new(TimelineOptions::default()),
            scenes: sample_scenes(),
            layers: sample_layers(),
            current_time: 0,
            zoom: 1.0,
            selection: None,
            next_id: 1,
        }
    }

    fn add_scene(&mut self) {
        let start = self.scenes.last().map(|s| s.end_time() + 5_000).unwrap_or(0);
        let id = format!("new_scene_{}", self.next_id);
        self.next_id += 1;
        let name = format!("New Scene {}", self.scenes.len() + 1);
        self.scenes.push(Scene::new(id, start, 10_000).with_name(name));
    }

    fn add_layer_to_selected_scene(&mut self) {
        let Some(Selection { kind: ElementKind::Scene, id: scene_id }) = self.selection.clone() else {
            return;
        };
        let track = self
            .layers
            .iter()
            .filter(|l| l.scene_id == scene_id)
            .map(|l| l.track)
            .max()
            .unwrap_or(0)
            % 2
            + 1;
        let id = format!("new_layer_{}", self.next_id);
        self.next_id += 1;
        self.layers
            .push(layer(&id, &scene_id, track, 0, 5_000, LayerKind::Text, ("text", "New layer")));
    }

    fn reset(&mut self) {
        self.scenes = sample_scenes();
        self.layers = sample_layers();
        self.current_time = 0;
        self.zoom = 1.0;
        self.selection = None;
    }

    fn selected_details(&self) -> Option<String> {
        let selection = self.selection.as_ref()?;
        let json = match selection.kind {
            ElementKind::Scene => serde_json::to_string_pretty(self.scenes.iter().find(|s| s.id == selection.id)?),
            ElementKind::Layer => serde_json::to_string_pretty(self.layers.iter().find(|l| l.id == selection.id)?),
        };
        json.ok()
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let max_time = self
            .scenes
            .iter()
            .map(Scene::end_time)
            .max()
            .unwrap_or(0)
            .max(60_000);

        ui.horizontal(|ui| {
            ui.label(format!("Current Time: {:.2}s", self.current_time as f64 / 1000.0));
            ui.add(egui::Slider::new(&mut self.current_time, 0..=max_time).step_by(100.0).show_value(false));
            ui.separator();
            ui.label("Zoom");
            ui.add(egui::Slider::new(&mut self.zoom, 0.1..=5.0).step_by(0.1));
            ui.separator();
            if ui.button("Add Scene").clicked() {
                self.add_scene();
            }
            let scene_selected = matches!(&self.selection, Some(s) if s.kind == ElementKind::Scene);
            if ui.add_enabled(scene_selected, egui::Button::new("Add Layer")).clicked() {
                self.add_layer_to_selected_scene();
            }
            if ui.button("Reset Data").clicked() {
                self.reset();
            }
        });
    }

    fn timeline(&mut self, ui: &mut egui::Ui) {
        let data = TimelineData::new(&self.scenes, &self.layers, self.current_time, self.zoom);
        let Some(layout) = self.editor.layout(&data) else {
            return;
        };
        let options = self.editor.options();
        let height = layout
            .layers
            .iter()
            .map(|l| l.rect.max.y)
            .fold(options.ruler_height + options.scene_row_height, f32::max);
        let size = Vec2::new(layout.content_width().max(ui.available_width()), height);
        let rect = Rect::from_min_size(ui.cursor().min, size);

        let clip = ui.clip_rect();
        let visible = egui::Rangef::new(clip.min.x - rect.min.x, clip.max.x - rect.min.x);
        let Some(ticks) = self.editor.tick_plan(&data, visible) else {
            return;
        };

        let response = self.editor.interact(ui, &data, rect);
        let painter = ui.painter_at(response.rect);
        let visuals = ui.visuals();

        // Ruler
        painter.rect_filled(layout.ruler.translate(rect.min.to_vec2()), 0.0, visuals.faint_bg_color);
        for tick in &ticks.ticks {
            let x = rect.min.x + layout.playhead_x(tick.time);
            let (len, stroke) = match tick.kind {
                TickKind::Major => (12.0, Stroke::new(1.0, visuals.text_color())),
                TickKind::Minor => (5.0, Stroke::new(1.0, visuals.weak_text_color())),
            };
            let bottom = rect.min.y + layout.ruler.height();
            painter.line_segment([Pos2::new(x, bottom - len), Pos2::new(x, bottom)], stroke);
            if tick.kind == TickKind::Major {
                painter.text(
                    Pos2::new(x + 2.0, rect.min.y + 2.0),
                    Align2::LEFT_TOP,
                    format!("{:.1}s", tick.time as f64 / 1000.0),
                    FontId::monospace(10.0),
                    visuals.text_color(),
                );
            }
        }

        let selected = |kind: ElementKind, id: &str| matches!(&self.selection, Some(s) if s.kind == kind && s.id == id);

        for (element, scene) in layout.scenes.iter().zip(data.scenes) {
            let r = element.rect.translate(rect.min.to_vec2());
            let fill = scene
                .meta
                .as_ref()
                .and_then(|m| m.color)
                .unwrap_or(Color32::from_rgb(100, 100, 100));
            painter.rect_filled(r, 4.0, fill);
            if selected(ElementKind::Scene, &scene.id) {
                painter.rect_stroke(r, 4.0, Stroke::new(2.0, Color32::WHITE));
            }
            painter.text(
                r.left_bottom() + Vec2::new(4.0, -4.0),
                Align2::LEFT_BOTTOM,
                scene.display_name(),
                FontId::proportional(11.0),
                Color32::WHITE,
            );
        }

        for element in &layout.layers {
            let Some(layer) = data.layer(&element.id) else {
                continue;
            };
            let r = element.rect.translate(rect.min.to_vec2());
            let (fill, label) = match &layer.meta {
                Some(meta) => {
                    let fill = match meta.kind {
                        LayerKind::Text => Color32::from_rgb(70, 110, 180),
                        LayerKind::Image => Color32::from_rgb(80, 150, 90),
                        LayerKind::Shape => Color32::from_rgb(170, 110, 60),
                    };
                    let label = ["text", "src", "shape"]
                        .iter()
                        .find_map(|key| meta.extra.get(*key).and_then(|v| v.as_str()))
                        .unwrap_or(layer.id.as_str());
                    (fill, label)
                }
                None => (Color32::GRAY, layer.id.as_str()),
            };
            painter.rect_filled(r, 3.0, fill);
            if selected(ElementKind::Layer, &layer.id) {
                painter.rect_stroke(r, 3.0, Stroke::new(2.0, Color32::WHITE));
            }
            painter.text(
                r.left_center() + Vec2::new(4.0, 0.0),
                Align2::LEFT_CENTER,
                label,
                FontId::proportional(10.0),
                Color32::WHITE,
            );
        }

        // Playhead
        let x = rect.min.x + layout.playhead_x(self.current_time);
        painter.line_segment([Pos2::new(x, rect.min.y), Pos2::new(x, rect.max.y)], Stroke::new(2.0, Color32::RED));
    }

    fn apply_events(&mut self) {
        for event in self.editor.take_events() {
            log::info!("[TimelineEvent] {:?}", event);
            match event {
                TimelineEvent::SceneChanged(change) => {
                    change.apply_to(&mut self.scenes);
                }
                TimelineEvent::LayerChanged(change) => {
                    change.apply_to(&mut self.layers);
                }
                TimelineEvent::TimeChanged { new_time } => self.current_time = new_time,
                TimelineEvent::SelectionChanged(selection) => self.selection = selection,
                TimelineEvent::ZoomChanged { new_zoom } => self.zoom = new_zoom,
            }
        }
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.controls(ui);
        });

        egui::TopBottomPanel::bottom("details").show(ctx, |ui| {
            match self.selected_details() {
                Some(details) => {
                    ui.monospace(details);
                }
                None => {
                    ui.label("Nothing selected");
                }
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::horizontal().show(ui, |ui| {
                self.timeline(ui);
            });
        });

        // Handle events
        self.apply_events();
    }
}
