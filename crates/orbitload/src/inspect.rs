use anyhow::{Context, Result};
use serde::Serialize;
use sketch::spinner::{orbit_radius, FRAME_RATE};
use sketch::{DisplayList, FrameInfo, LoadingSpinner, Placement, Sketch, Viewport};

use crate::cli::InspectArgs;

/// One headless frame of the loading animation.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub frame: u64,
    pub viewport: Viewport,
    pub frame_rate: f32,
    pub orbit_radius: f32,
    /// Draw calls recorded by the sketch for this frame.
    pub draw_calls: usize,
    pub ellipses: Vec<Placement>,
}

pub fn build_report(frame: u64, viewport: Viewport) -> InspectReport {
    let mut spinner = LoadingSpinner::new();
    let request = spinner.setup(viewport);

    let info = FrameInfo::new(frame, viewport);
    let mut list = DisplayList::new();
    list.begin_frame();
    spinner.draw(&mut list, &info);

    InspectReport {
        frame,
        viewport,
        frame_rate: request.frame_rate,
        orbit_radius: orbit_radius(viewport.width_f32()),
        draw_calls: list.commands().len(),
        ellipses: spinner.placements(&info),
    }
}

pub fn inspect(args: InspectArgs) -> Result<()> {
    let report = build_report(args.frame, Viewport::new(args.width, args.height));
    tracing::debug!(frame = report.frame, ellipses = report.ellipses.len(), "inspected frame");

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialise inspect report")?;
    println!("{json}");
    Ok(())
}
