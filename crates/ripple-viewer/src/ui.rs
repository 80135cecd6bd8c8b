use ripple::{Activity, FieldEncoding, GridConfig, Preset, RippleConfig};

/// Snapshot shown in the stats overlay.
#[derive(Debug, Clone, Copy)]
pub struct HudStats {
    pub fps: f32,
    pub grid: GridConfig,
    pub encoding: FieldEncoding,
    pub activity: Activity,
    pub visibility: f32,
    pub reveal_radius: f32,
    pub steps: u64,
}

pub fn hud_lines(stats: &HudStats) -> Vec<String> {
    let g = &stats.grid;
    vec![
        format!("{:.0} fps", stats.fps),
        format!(
            "points {}x{} = {}",
            g.display_cols, g.display_rows, g.point_count
        ),
        format!("field {}x{} ({:?})", g.sim_width, g.sim_height, stats.encoding),
        format!(
            "{:?}  vis {:.2}  reveal {:.3}",
            stats.activity, stats.visibility, stats.reveal_radius
        ),
        format!("steps {}", stats.steps),
    ]
}

pub fn draw_hud(ctx: &egui::Context, stats: &HudStats) {
    egui::Area::new(egui::Id::new("ripple_hud"))
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .interactable(false)
        .show(ctx, |ui| {
            for line in hud_lines(stats) {
                ui.label(
                    egui::RichText::new(line)
                        .monospace()
                        .color(egui::Color32::from_rgb(0x9a, 0xf0, 0xff)),
                );
            }
        });
}

/// Live editor for the engine's configuration. Edits `config` in place and
/// returns true if anything changed this frame.
pub fn draw_tuning_panel(ctx: &egui::Context, config: &mut RippleConfig) -> bool {
    let mut changed = false;

    egui::Window::new("Ripple tuning")
        .default_open(false)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .show(ctx, |ui| {
            let mut preset = config.preset;
            egui::ComboBox::from_label("preset")
                .selected_text(format!("{:?}", preset))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut preset, Preset::Reveal, "Reveal");
                    ui.selectable_value(&mut preset, Preset::Classic, "Classic");
                });
            if preset != config.preset {
                *config = RippleConfig::preset(preset).with_reduced_motion(config.reduced_motion);
                changed = true;
            }

            changed |= ui.checkbox(&mut config.reduced_motion, "reduced motion").changed();

            ui.separator();
            ui.label("wave");
            changed |= ui
                .add(egui::Slider::new(&mut config.wave.damping, 0.95..=0.999).text("damping"))
                .changed();

            ui.separator();
            ui.label("splat");
            let s = &mut config.splat;
            changed |= ui
                .add(egui::Slider::new(&mut s.base_strength, 0.0..=0.05).text("base strength"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut s.speed_strength, 0.0..=0.3).text("speed strength"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut s.base_radius, 0.005..=0.2).text("base radius"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut s.drag, 0.0..=0.3).text("drag"))
                .changed();

            ui.separator();
            ui.label("idle / reveal");
            changed |= ui.checkbox(&mut config.idle.enabled, "idle wander").changed();
            changed |= ui.checkbox(&mut config.reveal.enabled, "reveal mask").changed();
            changed |= ui
                .add(egui::Slider::new(&mut config.reveal.softness, 0.05..=6.0).text("softness"))
                .changed();

            ui.separator();
            ui.label("points");
            let r = &mut config.render;
            changed |= ui
                .add(egui::Slider::new(&mut r.point_size, 0.5..=12.0).text("point size"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut r.height_amplitude, 0.0..=0.6).text("height amplitude"))
                .changed();
        });

    changed
}
