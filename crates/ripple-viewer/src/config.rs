use clap::{Parser, ValueEnum};
use ripple::{Preset, RippleConfig};

/// `ripple-viewer` - an interactive point-cloud ripple field.
///
/// A damped wave simulation follows the pointer; when nothing is moving, a
/// slow idle wander keeps the field faintly alive.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Named parameter set.
    #[arg(long, env = "RIPPLE_PRESET", value_enum, default_value_t = PresetArg::Reveal)]
    pub preset: PresetArg,

    /// Calmer motion: slower decay, smaller splats and displacement.
    #[arg(long, env = "RIPPLE_REDUCED_MOTION")]
    pub reduced_motion: bool,

    /// Use the 8-bit field texture even when float textures are available.
    #[arg(long, env = "RIPPLE_FORCE_UNORM")]
    pub force_unorm: bool,

    /// Initial window width in logical pixels.
    #[arg(long, env = "RIPPLE_WIDTH", default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, env = "RIPPLE_HEIGHT", default_value_t = 720)]
    pub height: u32,

    /// Show the stats overlay and tuning panel at startup (toggle with H).
    #[arg(long, env = "RIPPLE_HUD")]
    pub hud: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetArg {
    Reveal,
    Classic,
}

impl From<PresetArg> for Preset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Reveal => Preset::Reveal,
            PresetArg::Classic => Preset::Classic,
        }
    }
}

impl Config {
    /// The tuning surface the engine runs with.
    pub fn ripple_config(&self) -> RippleConfig {
        RippleConfig::preset(self.preset.into()).with_reduced_motion(self.reduced_motion)
    }
}
