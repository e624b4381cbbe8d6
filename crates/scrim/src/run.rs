// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use eventline::{debug, info, warn};

use scrim_core::{AnchorHandle, Rect, ScreenExtent, SurfaceToken};
use scrim_overlay::{
    HostEnvironment, OverlayController, PlacementSpec, PopupPlacement, PumpStatus, Role,
};

use crate::cli::AnchorArgs;
use crate::config::ScrimConfig;
use crate::host::{self, ImageHost};
use crate::paths;

const POPUP_SURFACE: SurfaceToken = SurfaceToken(1);
const BLUR_DEADLINE: Duration = Duration::from_secs(30);

/// Anchor boxes in the order placement applies them.
fn anchor_roles(anchors: &AnchorArgs) -> Vec<(Role, Rect)> {
    [
        (Role::RightOf, anchors.right_of),
        (Role::LeftOf, anchors.left_of),
        (Role::Below, anchors.below),
        (Role::Above, anchors.above),
        (Role::Fill, anchors.fill),
    ]
    .into_iter()
    .filter_map(|(role, rect)| rect.map(|r| (role, r)))
    .collect()
}

fn place<H: HostEnvironment>(ctl: &mut OverlayController<H>, role: Role, anchor: AnchorHandle) {
    match role {
        Role::RightOf => ctl.dark_right_of(anchor),
        Role::LeftOf => ctl.dark_left_of(anchor),
        Role::Above => ctl.dark_above(anchor),
        Role::Below => ctl.dark_below(anchor),
        Role::Fill => ctl.dark_fill_view(anchor),
    }
}

/// Show the overlay over `screen`, wait for the blur, write what the screen
/// would look like to `out`.
pub fn render(screen: &Path, out: &Path, anchors: &AnchorArgs, cfg: &ScrimConfig) -> Result<(), String> {
    let mut host = ImageHost::open(screen, cfg.format, cfg.top_inset)
        .map_err(|e| format!("open {}: {e}", screen.display()))?;

    let roles: Vec<(Role, AnchorHandle)> = anchor_roles(anchors)
        .into_iter()
        .map(|(role, rect)| (role, host.add_anchor(rect)))
        .collect();

    let mut ctl = OverlayController::new(host, Some(POPUP_SURFACE), cfg.overlay_options());
    for (role, anchor) in roles {
        place(&mut ctl, role, anchor);
    }

    if !ctl.show(PopupPlacement::At { x: 0, y: 0 }) {
        return Err("overlay refused to show".into());
    }
    if let Some(region) = ctl.resolved_region() {
        info!("darken rect {:?}", region.darken_rect());
    }

    let started = Instant::now();
    loop {
        match ctl.pump() {
            PumpStatus::Pending => {
                if started.elapsed() > BLUR_DEADLINE {
                    warn!("blur still running after {:?}; writing darken only", BLUR_DEADLINE);
                    break;
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            PumpStatus::Published => {
                debug!("blur published after {} ms", started.elapsed().as_millis());
                break;
            }
            PumpStatus::Idle => break,
            other => {
                warn!("no blurred background ({other:?})");
                break;
            }
        }
    }

    let host = ctl.host().ok_or_else(|| "host went away".to_string())?;
    if cfg.blur && !host.has_blur() {
        info!("writing darken only, no blurred background was published");
    }
    let frame = host.compose();

    paths::ensure_parent_dir(out).map_err(|e| format!("create output dir: {e}"))?;
    host::save(&frame, out).map_err(|e| format!("save {}: {e}", out.display()))?;
    info!("wrote {}", out.display());

    ctl.dismiss();
    ctl.on_destroy();
    Ok(())
}

/// Resolve placement against a bare screen size and describe the result.
pub fn region(size: (i32, i32), top_inset: i32, anchors: &AnchorArgs) -> String {
    let mut spec = PlacementSpec::new();
    let mut boxes: HashMap<AnchorHandle, Rect> = HashMap::new();

    for (i, (role, rect)) in anchor_roles(anchors).into_iter().enumerate() {
        let handle = AnchorHandle(i as u64 + 1);
        boxes.insert(handle, rect);
        spec.set(role, handle);
    }

    let screen = ScreenExtent::new(size.0, size.1);
    let resolved = spec.resolve(screen, |a| boxes.get(&a).copied());
    let viewport = resolved.blur_viewport(top_inset.max(0));

    format!(
        "right_of={} left_of={} below={} above={}\ndarken={:?}\nviewport={:?} top_padding={}",
        resolved.right_of,
        resolved.left_of,
        resolved.below,
        resolved.above,
        resolved.darken_rect(),
        viewport.rect,
        viewport.top_padding,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use scrim_core::{PixelBuffer, PixelFormat};

    #[test]
    fn region_below_a_toolbar() {
        let anchors = AnchorArgs {
            below: Some(Rect::from_xywh(0, 0, 1080, 150)),
            ..AnchorArgs::default()
        };
        let text = region((1080, 1920), 0, &anchors);
        assert!(text.contains("right_of=0 left_of=1080 below=150 above=1920"));
        assert!(text.contains("top_padding=0"));
    }

    #[test]
    fn region_with_no_anchors_is_the_screen() {
        let text = region((640, 480), 24, &AnchorArgs::default());
        assert!(text.contains("right_of=0 left_of=640 below=0 above=480"));
        assert!(text.contains("top_padding=24"));
    }

    #[test]
    fn renders_darkened_lower_half() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("screen.png");
        let output = dir.path().join("nested").join("out.png");

        let mut white = PixelBuffer::new(8, 8, PixelFormat::Rgba8);
        white.as_bytes_mut().fill(255);
        host::save(&white, &input).unwrap();

        let anchors = AnchorArgs {
            below: Some(Rect::from_xywh(0, 0, 8, 4)),
            ..AnchorArgs::default()
        };
        let cfg = ScrimConfig {
            blur: false,
            dark_colour: 0xFF00_0000,
            ..ScrimConfig::default()
        };
        render(&input, &output, &anchors, &cfg).unwrap();

        let out = ImageHost::open(&output, PixelFormat::Rgba8, 0).unwrap().compose();
        assert_eq!(out.pixel(3, 3), Some(&[255, 255, 255, 255][..]));
        assert_eq!(out.pixel(3, 4), Some(&[0, 0, 0, 255][..]));
    }

    #[test]
    fn renders_blurred_backdrop() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("screen.png");
        let output = dir.path().join("out.png");

        // Left half black, right half white.
        let mut split = PixelBuffer::new(16, 16, PixelFormat::Rgb8);
        for (i, px) in split.as_bytes_mut().chunks_exact_mut(3).enumerate() {
            let v = if i % 16 < 8 { 0 } else { 255 };
            px.copy_from_slice(&[v, v, v]);
        }
        host::save(&split, &input).unwrap();

        let cfg = ScrimConfig {
            format: PixelFormat::Rgb8,
            dark_over_blur: false,
            blur_radius: 3,
            ..ScrimConfig::default()
        };
        render(&input, &output, &AnchorArgs::default(), &cfg).unwrap();

        let out = ImageHost::open(&output, PixelFormat::Rgb8, 0).unwrap().compose();
        let edge = out.pixel(7, 8).unwrap()[0];
        assert!(edge > 0 && edge < 255, "edge pixel {edge} was not blurred");
    }
}
