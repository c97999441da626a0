use anyhow::{bail, Result};

use tessera_engine::coords::{BorderWidths, ColorRgba, Rect};
use tessera_engine::core::{App, FrameInfo, LaunchInfo};
use tessera_engine::device::{GpuInit, PresentPolicy};
use tessera_engine::logging::{init_logging, LoggingConfig};
use tessera_engine::render::{RectUniforms, RendererConfig};
use tessera_engine::window::{Runtime, RuntimeConfig};

/// Draws the reference card: a light-gray 200x100 panel with a 1px dark
/// border and 8px corners, on a white background.
struct CardApp {
    rect: RectUniforms,
}

impl CardApp {
    fn new() -> Self {
        let rect = RectUniforms::new(Rect::new(20.0, 20.0, 200.0, 100.0))
            .with_background(ColorRgba::gray(0.8))
            .with_border(BorderWidths::all(1.0), ColorRgba::gray(0.1))
            .with_corner_radius(8.0);
        Self { rect }
    }
}

impl App for CardApp {
    fn on_launch(&mut self, info: &LaunchInfo) {
        log::info!(
            "drawing {:?} into {:?}",
            self.rect.rect(),
            info.globals.viewport()
        );
    }

    fn on_frame(&mut self, _frame: &FrameInfo) -> RectUniforms {
        self.rect
    }
}

fn present_policy_from_env() -> Result<PresentPolicy> {
    let Ok(raw) = std::env::var("TESSERA_PRESENT_POLICY") else {
        return Ok(PresentPolicy::default());
    };
    match PresentPolicy::parse(&raw) {
        Some(policy) => Ok(policy),
        None => bail!("TESSERA_PRESENT_POLICY must be `immediate` or `wait`, got `{raw}`"),
    }
}

fn capture_from_env() -> bool {
    std::env::var("TESSERA_CAPTURE").is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes"))
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let gpu_init = GpuInit {
        present_policy: present_policy_from_env()?,
        ..Default::default()
    };
    let renderer_config = RendererConfig {
        capture_first_frame: capture_from_env(),
        ..Default::default()
    };

    log::info!("present policy: {:?}", gpu_init.present_policy);

    Runtime::run(
        RuntimeConfig {
            title: "tessera viewer".to_string(),
            ..Default::default()
        },
        gpu_init,
        renderer_config,
        CardApp::new(),
    )
}
