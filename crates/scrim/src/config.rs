// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;

use rune_cfg::RuneConfig;

use scrim_core::colour::{DEFAULT_DARK_COLOUR, parse_hex_colour};
use scrim_core::config::{POPUP_BLUR_RADIUS, POPUP_DOWN_SCALE};
use scrim_core::{BlurConfig, PixelFormat};
use scrim_overlay::OverlayOptions;

use crate::cli::LookArgs;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrimConfig {
    pub blur_radius: i64,
    pub down_scale: f32,
    pub hardware_kernel: bool,
    pub dark_colour: u32, // ARGB
    pub dark_over_blur: bool,
    pub top_inset: i32,
    pub debug: bool,
    pub format: PixelFormat,
    pub blur: bool,
}

impl Default for ScrimConfig {
    fn default() -> Self {
        Self {
            blur_radius: POPUP_BLUR_RADIUS as i64,
            down_scale: POPUP_DOWN_SCALE,
            hardware_kernel: false,
            dark_colour: DEFAULT_DARK_COLOUR,
            dark_over_blur: true,
            top_inset: 0,
            debug: false,
            format: PixelFormat::Rgba8,
            blur: true,
        }
    }
}

impl ScrimConfig {
    /// Flags win over the file.
    pub fn apply(&mut self, look: &LookArgs) -> Result<(), String> {
        if let Some(r) = look.radius {
            self.blur_radius = r as i64;
        }
        if let Some(f) = look.down_scale {
            self.down_scale = f;
        }
        if let Some(c) = &look.dark_colour {
            self.dark_colour =
                parse_hex_colour(c).map_err(|e| format!("--dark-colour: {e}"))?;
        }
        if let Some(t) = look.top_inset {
            self.top_inset = t;
        }
        if let Some(f) = look.format {
            self.format = f;
        }
        self.hardware_kernel |= look.hardware;
        self.debug |= look.debug;
        self.blur &= !look.no_blur;
        Ok(())
    }

    pub fn overlay_options(&self) -> OverlayOptions {
        let mut blur_config = BlurConfig {
            use_hardware_kernel: self.hardware_kernel,
            debug: self.debug,
            ..BlurConfig::popup()
        };
        blur_config.set_radius(self.blur_radius);
        blur_config.set_down_scale(self.down_scale);

        OverlayOptions {
            blur: self.blur,
            dark_over_blur: self.dark_over_blur,
            dark_colour: self.dark_colour,
            top_inset: self.top_inset.max(0),
            blur_config,
        }
    }
}

/// A missing file is not an error; a malformed one is.
pub fn load(path: &Path) -> Result<ScrimConfig, String> {
    if !path.exists() {
        return Ok(ScrimConfig::default());
    }

    let rc = RuneConfig::from_file(path).map_err(|e| format!("failed to read config: {e}"))?;

    parse_config(&rc)
}

fn parse_config(rc: &RuneConfig) -> Result<ScrimConfig, String> {
    let mut cfg = ScrimConfig::default();

    if !rc.has("scrim") {
        return Ok(cfg);
    }

    if let Some(r) = rc
        .get_optional::<i64>("scrim.blur_radius")
        .map_err(|e| format!("config error at scrim.blur_radius: {e}"))?
    {
        cfg.blur_radius = r;
    }

    if let Some(f) = rc
        .get_optional::<f64>("scrim.down_scale")
        .map_err(|e| format!("config error at scrim.down_scale: {e}"))?
    {
        cfg.down_scale = f as f32;
    }

    if let Some(b) = rc
        .get_optional::<bool>("scrim.hardware_kernel")
        .map_err(|e| format!("config error at scrim.hardware_kernel: {e}"))?
    {
        cfg.hardware_kernel = b;
    }

    if let Some(colour_str) = rc
        .get_optional::<String>("scrim.dark_colour")
        .map_err(|e| format!("config error at scrim.dark_colour: {e}"))?
    {
        cfg.dark_colour = parse_hex_colour(&colour_str)
            .map_err(|e| format!("config error at scrim.dark_colour: {e}"))?;
    }

    if let Some(b) = rc
        .get_optional::<bool>("scrim.dark_over_blur")
        .map_err(|e| format!("config error at scrim.dark_over_blur: {e}"))?
    {
        cfg.dark_over_blur = b;
    }

    if let Some(t) = rc
        .get_optional::<i64>("scrim.top_inset")
        .map_err(|e| format!("config error at scrim.top_inset: {e}"))?
    {
        cfg.top_inset = t.clamp(0, i32::MAX as i64) as i32;
    }

    if let Some(b) = rc
        .get_optional::<bool>("scrim.debug")
        .map_err(|e| format!("config error at scrim.debug: {e}"))?
    {
        cfg.debug = b;
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(&dir.path().join("nope.rune")).unwrap();
        assert_eq!(cfg, ScrimConfig::default());
    }

    #[test]
    fn flags_override_and_clamp() {
        let mut cfg = ScrimConfig::default();
        let look = LookArgs {
            radius: Some(-4),
            down_scale: Some(0.25),
            no_blur: true,
            dark_colour: Some("#80102030".into()),
            top_inset: Some(-10),
            ..LookArgs::default()
        };
        cfg.apply(&look).unwrap();

        let opts = cfg.overlay_options();
        assert!(!opts.blur);
        assert_eq!(opts.dark_colour, 0x8010_2030);
        assert_eq!(opts.top_inset, 0);
        assert_eq!(opts.blur_config.radius, 0);
        assert_eq!(opts.blur_config.down_scale, 1.0);
    }

    #[test]
    fn bad_flag_colour_is_reported() {
        let mut cfg = ScrimConfig::default();
        let look = LookArgs {
            dark_colour: Some("black".into()),
            ..LookArgs::default()
        };
        assert!(cfg.apply(&look).unwrap_err().contains("--dark-colour"));
    }
}
