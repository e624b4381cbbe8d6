// Author: Dustin Pilgrim
// License: MIT

use eventline::{debug, info, warn};

use scrim_blur::{BufferLedger, CapturePipeline, CaptureTask, Polled, TaskOutcome};
use scrim_core::colour::{DEFAULT_DARK_COLOUR, TRANSPARENT};
use scrim_core::{AnchorHandle, BlurConfig, SurfaceToken};

use crate::host::{HostEnvironment, PopupPlacement};
use crate::placement::{PlacementSpec, ResolvedRegion, Role};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    /// Capture and blur what is under the darken surface.
    pub blur: bool,
    /// With blur on, also lay the dark tint over the blurred image.
    pub dark_over_blur: bool,
    /// ARGB tint of the darken layer.
    pub dark_colour: u32,
    /// Height of the strip at the top of the screen that isn't part of the
    /// captured surface (status bar). 0 when full-screen or translucent.
    pub top_inset: i32,
    pub blur_config: BlurConfig,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            blur: true,
            dark_over_blur: true,
            dark_colour: DEFAULT_DARK_COLOUR,
            top_inset: 0,
            blur_config: BlurConfig::popup(),
        }
    }
}

impl OverlayOptions {
    /// Plain dimming, no capture at all.
    pub fn dark_only() -> Self {
        Self {
            blur: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Hidden,
    Showing,
}

/// What one [`OverlayController::pump`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// No capture in flight.
    Idle,
    Pending,
    /// Blurred background handed to the host.
    Published,
    Cancelled,
    /// Blur failed; the darken surface stays up without it.
    Failed,
}

/// Shows a darken (and optionally blurred) surface behind a popup.
///
/// Drive it from the interactive thread: `show`, then `pump` from the event
/// loop until the blur lands, then `dismiss`.
pub struct OverlayController<H: HostEnvironment> {
    host: Option<H>,
    content: Option<SurfaceToken>,
    options: OverlayOptions,
    placement: PlacementSpec,
    pipeline: Option<CapturePipeline>,
    task: Option<CaptureTask>,
    state: OverlayState,
    top_padding: i32,
    resolved: Option<ResolvedRegion>,
}

impl<H: HostEnvironment> OverlayController<H> {
    /// `content` is the popup's own surface; without it `show` does nothing.
    pub fn new(host: H, content: Option<SurfaceToken>, options: OverlayOptions) -> Self {
        let options = OverlayOptions {
            blur_config: options.blur_config.clamped(),
            ..options
        };
        let pipeline = options.blur.then(|| CapturePipeline::new(options.blur_config));

        Self {
            host: Some(host),
            content,
            options,
            placement: PlacementSpec::new(),
            pipeline,
            task: None,
            state: OverlayState::Hidden,
            top_padding: 0,
            resolved: None,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_dark_showing(&self) -> bool {
        self.state == OverlayState::Showing
    }

    pub fn is_destroyed(&self) -> bool {
        self.host.is_none()
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    /// Ledger of the blur pipeline's buffers, when blur is on.
    pub fn buffer_ledger(&self) -> Option<&BufferLedger> {
        self.pipeline.as_ref().map(|p| p.ledger())
    }

    pub fn has_pending_blur(&self) -> bool {
        self.task.is_some()
    }

    /// Region computed by the last `show`.
    pub fn resolved_region(&self) -> Option<ResolvedRegion> {
        self.resolved
    }

    /// Resolve the current placement against current geometry without
    /// showing anything.
    pub fn resolve_now(&self) -> Option<ResolvedRegion> {
        let host = self.host.as_ref()?;
        Some(self.placement.resolve(host.screen_extent(), |a| host.on_screen_box(a)))
    }

    // -------------------- blur settings --------------------

    pub fn set_blur_radius(&mut self, radius: i32) {
        self.options.blur_config.set_radius(radius as i64);
        self.sync_blur_config();
    }

    pub fn set_down_scale_factor(&mut self, factor: f32) {
        self.options.blur_config.set_down_scale(factor);
        self.sync_blur_config();
    }

    pub fn set_use_hardware_kernel(&mut self, enabled: bool) {
        self.options.blur_config.use_hardware_kernel = enabled;
        self.sync_blur_config();
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.options.blur_config.debug = enabled;
        self.sync_blur_config();
    }

    /// Tint for the next `show`.
    pub fn set_dark_color(&mut self, argb: u32) {
        self.options.dark_colour = argb;
    }

    fn sync_blur_config(&mut self) {
        if let Some(pipeline) = self.pipeline.as_mut() {
            *pipeline.config_mut() = self.options.blur_config;
        }
    }

    // -------------------- placement --------------------

    pub fn dark_right_of(&mut self, anchor: AnchorHandle) {
        self.placement.set(Role::RightOf, anchor);
    }

    pub fn dark_left_of(&mut self, anchor: AnchorHandle) {
        self.placement.set(Role::LeftOf, anchor);
    }

    pub fn dark_above(&mut self, anchor: AnchorHandle) {
        self.placement.set(Role::Above, anchor);
    }

    pub fn dark_below(&mut self, anchor: AnchorHandle) {
        self.placement.set(Role::Below, anchor);
    }

    pub fn dark_fill_view(&mut self, anchor: AnchorHandle) {
        self.placement.set(Role::Fill, anchor);
    }

    pub fn dark_fill_screen(&mut self) {
        self.placement.fill_screen();
    }

    pub fn reset_dark_position(&mut self) {
        self.placement.fill_screen();
    }

    // -------------------- lifecycle --------------------

    /// Put the darken surface up and start the blur, then show the popup.
    ///
    /// Returns `false` (and does nothing) when already showing, when there is
    /// no content surface, or after `on_destroy`.
    pub fn show(&mut self, at: PopupPlacement) -> bool {
        if self.state == OverlayState::Showing {
            return false;
        }
        let Some(content) = self.content else {
            return false;
        };
        let Some(host) = self.host.as_mut() else {
            return false;
        };

        let screen = host.screen_extent();
        let region = self.placement.resolve(screen, |a| host.on_screen_box(a));
        let darken = region.darken_rect();
        debug!("resolved {:?} -> darken {:?}", region, darken);

        let tint = if self.pipeline.is_some() && !self.options.dark_over_blur {
            TRANSPARENT
        } else {
            self.options.dark_colour
        };
        host.create_overlay_surface(darken, content, tint);

        if let Some(task) = self.task.take() {
            // Left over from a show that was never dismissed through us.
            task.cancel();
        }

        if let Some(pipeline) = self.pipeline.as_ref() {
            let viewport = region.blur_viewport(self.options.top_inset);
            self.top_padding = viewport.top_padding;
            self.task = pipeline.start(host, viewport.rect);
            if self.task.is_none() {
                info!("no blurred background this time; showing darken only");
            }
        }

        host.show_popup(at);

        self.resolved = Some(region);
        self.state = OverlayState::Showing;
        true
    }

    /// Publish a finished blur, if any. Never blocks.
    pub fn pump(&mut self) -> PumpStatus {
        let Some(task) = self.task.take() else {
            return PumpStatus::Idle;
        };

        match task.poll() {
            Polled::Pending(task) => {
                self.task = Some(task);
                PumpStatus::Pending
            }
            Polled::Done(TaskOutcome::Blurred(bg)) => {
                let Some(host) = self.host.as_mut() else {
                    return PumpStatus::Cancelled;
                };
                if self.state != OverlayState::Showing {
                    return PumpStatus::Cancelled;
                }
                debug!(
                    "publishing {}x{} blur ({}, {} ms)",
                    bg.buffer.width(),
                    bg.buffer.height(),
                    bg.stats.kernel,
                    bg.stats.elapsed.as_millis()
                );
                host.present_blurred(bg.buffer, self.top_padding);
                PumpStatus::Published
            }
            Polled::Done(TaskOutcome::Cancelled) => PumpStatus::Cancelled,
            Polled::Done(TaskOutcome::Failed(msg)) => {
                warn!("blur failed: {msg}");
                PumpStatus::Failed
            }
        }
    }

    /// Take the darken surface down and cancel any blur in flight, then
    /// dismiss the popup. Safe to call any number of times.
    pub fn dismiss(&mut self) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        if self.state == OverlayState::Showing {
            host.remove_overlay_surface();
            if let Some(task) = self.task.take() {
                task.cancel();
            }
            self.state = OverlayState::Hidden;
        }

        host.dismiss_popup();
    }

    /// Cancel everything and let go of the host. The controller is inert
    /// afterwards.
    pub fn on_destroy(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        self.host = None;
        self.state = OverlayState::Hidden;
    }
}
