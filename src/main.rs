//! confetti-rs - interactive host for the confetti scatter
//!
//! Renders the scene into a tiny-skia pixmap and shows it as a texture.
//! Every layer and light parameter gets a slider in the side panel; dragging
//! a slider puts the scene into interactive mode so slow frames degrade to
//! flat fills until the drag ends.

use std::ops::RangeInclusive;

use eframe::egui;

use tiny_skia::Color;

use confetti::confetti::MAX_BORDER;
use confetti::{Bounds, Confetti, ConfettiConfig, PixmapCanvas, Scene};

/// Where "Save PNG" writes the current frame
const EXPORT_PATH: &str = "confetti.png";

fn main() -> eframe::Result<()> {
    env_logger::init();
    log::info!("Starting confetti-rs");

    let config = ConfettiConfig::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width as f32 + 280.0, config.height as f32 + 40.0])
            .with_title("confetti-rs"),
        ..Default::default()
    };

    eframe::run_native(
        "confetti-rs",
        options,
        Box::new(move |_cc| Ok(Box::new(ConfettiApp::new(&config)))),
    )
}

/// Slider drag edges seen during one frame
#[derive(Default)]
struct DragEvents {
    started: bool,
    stopped: bool,
}

impl DragEvents {
    fn track(&mut self, response: &egui::Response) {
        self.started |= response.drag_started();
        self.stopped |= response.drag_stopped();
    }
}

/// Show a slider for `value`, returning the new value if the user changed it
fn slider<N: egui::emath::Numeric>(
    ui: &mut egui::Ui,
    drag: &mut DragEvents,
    text: &str,
    value: N,
    range: RangeInclusive<N>,
) -> Option<N> {
    let mut edited = value;
    let response = ui.add(egui::Slider::new(&mut edited, range).text(text));
    drag.track(&response);
    response.changed().then_some(edited)
}

fn to_rgb(color: Color) -> [u8; 3] {
    let c = color.to_color_u8();
    [c.red(), c.green(), c.blue()]
}

fn from_rgb([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

/// Main application state
struct ConfettiApp {
    scene: Scene,
    canvas: Option<PixmapCanvas>,
    texture: Option<egui::TextureHandle>,
    show_settings: bool,
    status: String,
}

impl ConfettiApp {
    fn new(config: &ConfettiConfig) -> Self {
        let bounds = Bounds::new(config.width as f32, config.height as f32);
        let mut scene = Scene::new(bounds);
        scene.add_layer(Box::new(Confetti::new(config)));

        Self {
            scene,
            canvas: None,
            texture: None,
            show_settings: true,
            status: String::new(),
        }
    }

    /// Match the pixmap to the space available for it
    fn fit_canvas(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        let current = self.canvas.as_ref().map(|c| c.pixmap());
        if current.is_some_and(|p| p.width() == width && p.height() == height) {
            return;
        }

        match PixmapCanvas::new(width, height) {
            Ok(canvas) => {
                self.canvas = Some(canvas);
                self.scene
                    .set_bounds(Bounds::new(width as f32, height as f32));
                self.texture = None;
            }
            Err(e) => {
                log::warn!("Keeping previous canvas: {}", e);
                self.status = e.to_string();
            }
        }
    }

    /// Re-render into the pixmap and upload it if anything changed
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        if !self.scene.take_redraw_request() && self.texture.is_some() {
            return;
        }

        self.scene.render(canvas);
        let size = [canvas.pixmap().width() as usize, canvas.pixmap().height() as usize];
        let image = egui::ColorImage::from_rgba_premultiplied(size, canvas.data());

        match self.texture.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("confetti", image, egui::TextureOptions::LINEAR));
            }
        }

        if let Some(layer) = self.scene.find_layer_mut::<Confetti>() {
            self.status = format!(
                "{} shapes, {:?}, last full frame {:.1} ms",
                layer.quantity(),
                layer.render_mode(),
                layer.governor().last_full_render().as_secs_f64() * 1000.0
            );
        }
    }

    fn layer_controls(&mut self, ui: &mut egui::Ui, drag: &mut DragEvents) {
        let Some(layer) = self.scene.find_layer_mut::<Confetti>() else {
            return;
        };
        let p = layer.params().clone();
        let max = layer.max_quantity();

        ui.collapsing("Placement", |ui| {
            if let Some(v) = slider(ui, drag, "Quantity", p.quantity, 0..=max) {
                layer.set_quantity(v as i64);
            }
            if let Some(v) = slider(ui, drag, "Position randomness", p.pos_randomness, 0.0..=1000.0) {
                layer.set_pos_randomness(v);
            }
            if let Some(v) = slider(ui, drag, "Angle (°)", p.theta.to_degrees(), 0.0..=360.0) {
                layer.set_theta(v.to_radians());
            }
            if let Some(v) = slider(ui, drag, "Angle variation (°)", p.theta_variation.to_degrees(), 0.0..=360.0) {
                layer.set_theta_variation(v.to_radians());
            }
            if let Some(v) = slider(ui, drag, "Radius", p.radius, 1.0..=512.0) {
                layer.set_radius(v);
            }
            if let Some(v) = slider(ui, drag, "Radius variation", p.radius_variation, 0.0..=256.0) {
                layer.set_radius_variation(v);
            }
            if let Some(v) = slider(ui, drag, "Radius power", p.radius_power, 0.0..=100.0) {
                layer.set_radius_power(v);
            }
        });

        ui.collapsing("Shapes", |ui| {
            let weights: Vec<(&'static str, u32)> = layer
                .catalog()
                .iter()
                .map(|e| (e.name(), e.weight()))
                .collect();
            for (i, (name, weight)) in weights.into_iter().enumerate() {
                if let Some(v) = slider(ui, drag, name, weight, 0..=50) {
                    layer.set_shape_weight(i, v);
                }
            }
        });

        ui.collapsing("Color", |ui| {
            if let Some(v) = slider(ui, drag, "Hue", p.hue, 0.0..=360.0) {
                layer.set_hue(v);
            }
            if let Some(v) = slider(ui, drag, "Hue variation", p.hue_variation, 0.0..=360.0) {
                layer.set_hue_variation(v);
            }
            if let Some(v) = slider(ui, drag, "Min saturation", p.min_saturation, 0.0..=100.0) {
                layer.set_min_saturation(v);
            }
            if let Some(v) = slider(ui, drag, "Max saturation", p.max_saturation, 0.0..=100.0) {
                layer.set_max_saturation(v);
            }
            if let Some(v) = slider(ui, drag, "Min lightness", p.min_lightness, 0.0..=100.0) {
                layer.set_min_lightness(v);
            }
            if let Some(v) = slider(ui, drag, "Max lightness", p.max_lightness, 0.0..=100.0) {
                layer.set_max_lightness(v);
            }
            if let Some(v) = slider(ui, drag, "Min opacity", p.min_opacity, 0..=255) {
                layer.set_min_opacity(v);
            }
            if let Some(v) = slider(ui, drag, "Gradient opacity", p.gradient_opacity, 0..=255) {
                layer.set_gradient_opacity(v);
            }
        });

        ui.collapsing("Lighting", |ui| {
            if let Some(v) = slider(ui, drag, "Edge thickness", p.edge_thickness, 0.0..=MAX_BORDER) {
                layer.set_edge_thickness(v);
            }
            if let Some(v) = slider(ui, drag, "Shadow opacity", p.shadow_opacity, 0..=255) {
                layer.set_shadow_opacity(v);
            }
            if let Some(v) = slider(ui, drag, "Shadow closeness", p.shadow_divisor, 1.0..=1024.0) {
                layer.set_shadow_divisor(v);
            }
            if let Some(v) = slider(ui, drag, "Specular brightness", p.specular_brightness, 0..=255) {
                layer.set_specular_brightness(v);
            }
            if let Some(v) = slider(ui, drag, "Specular depth", p.specular_depth, 1.0..=100.0) {
                layer.set_specular_depth(v);
            }
            if let Some(v) = slider(ui, drag, "Specular sharpness", p.specular_sharpness, 1.0..=100.0) {
                layer.set_specular_sharpness(v);
            }
            if let Some(v) = slider(ui, drag, "Bevel thickness", p.bevel_thickness, 0.0..=MAX_BORDER) {
                layer.set_bevel_thickness(v);
            }
        });

        ui.separator();
        if ui.button("🎲 Reshuffle").clicked() {
            layer.reshuffle();
        }
    }

    fn light_controls(&mut self, ui: &mut egui::Ui, drag: &mut DragEvents) {
        let light = self.scene.light_controller().clone();

        ui.collapsing("Light source", |ui| {
            if let Some(v) = slider(ui, drag, "X (%)", light.x() * 100.0, -100.0..=200.0) {
                self.scene.edit_light(|l| l.set_x(v / 100.0));
            }
            if let Some(v) = slider(ui, drag, "Y (%)", light.y() * 100.0, -100.0..=200.0) {
                self.scene.edit_light(|l| l.set_y(v / 100.0));
            }
            if let Some(v) = slider(ui, drag, "Inner radius (%)", light.inner() * 100.0, 10.0..=400.0) {
                self.scene.edit_light(|l| l.set_inner(v / 100.0));
            }
            if let Some(v) = slider(ui, drag, "Outer radius (%)", light.outer() * 100.0, 10.0..=400.0) {
                self.scene.edit_light(|l| l.set_outer(v / 100.0));
            }

            let mut rgb = to_rgb(light.color());
            ui.horizontal(|ui| {
                ui.label("Color");
                if ui.color_edit_button_srgb(&mut rgb).changed() {
                    self.scene.edit_light(|l| l.set_color(from_rgb(rgb)));
                }
            });
        });

        ui.collapsing("Background", |ui| {
            let background = self.scene.background().clone();
            let mut visible = background.visible;
            if ui.checkbox(&mut visible, "Show background").changed() {
                self.scene.set_background_visible(visible);
            }

            let mut lit = to_rgb(background.lit);
            let mut unlit = to_rgb(background.unlit);
            ui.horizontal(|ui| {
                ui.label("Lit");
                let lit_changed = ui.color_edit_button_srgb(&mut lit).changed();
                ui.label("Unlit");
                let unlit_changed = ui.color_edit_button_srgb(&mut unlit).changed();
                if lit_changed || unlit_changed {
                    self.scene
                        .set_background_colors(from_rgb(lit), from_rgb(unlit));
                }
            });
        });
    }
}

impl eframe::App for ConfettiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Top panel
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("confetti-rs");
                ui.separator();
                ui.toggle_value(&mut self.show_settings, "⚙ Settings");
                if ui.button("💾 Save PNG").clicked() {
                    self.status = match self.scene.export_png(EXPORT_PATH) {
                        Ok(()) => format!("Saved {}", EXPORT_PATH),
                        Err(e) => {
                            log::error!("Export failed: {}", e);
                            e.to_string()
                        }
                    };
                }
                ui.separator();
                ui.label(&self.status);
            });
        });

        // Settings panel
        if self.show_settings {
            let mut drag = DragEvents::default();
            egui::SidePanel::left("settings_panel")
                .min_width(260.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.heading("Confetti");
                        ui.separator();
                        self.layer_controls(ui, &mut drag);
                        ui.separator();
                        self.light_controls(ui, &mut drag);
                    });
                });

            if drag.started {
                self.scene.begin_interaction();
            }
            if drag.stopped {
                self.scene.end_interaction();
            }
        }

        // Scene display
        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            self.fit_canvas(available.x as u32, available.y as u32);
            self.refresh_texture(ctx);

            if let Some(texture) = &self.texture {
                ui.add(egui::Image::new(egui::load::SizedTexture::from_handle(texture)));
            }
        });
    }
}
