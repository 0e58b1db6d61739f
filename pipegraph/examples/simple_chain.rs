// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Fixed filter chain: test pattern -> video effect -> converter -> sink.
//!
//! Everything about this topology is known at build time, so the whole
//! graph is linked statically before the aggregate starts playing.

use clap::Parser;
use pipegraph::{PipelineController, Stage, StageKind, StaticTopology, StopReason};
use tracing::info;

mod common;

#[derive(Parser)]
#[command(about = "Play a test pattern through a video effect")]
struct Args {
    /// Video effect to apply (one of the effectv element names).
    #[arg(long, default_value = "warptv")]
    effect: String,
}

fn main() -> Result<(), pipegraph::Error> {
    let args = Args::parse();
    common::init()?;

    let mut topology = StaticTopology::new("simple-chain");
    let source = topology.add_stage(Stage::new(StageKind::Source, "videotestsrc", "source")?)?;
    let filter = topology.add_stage(Stage::effect(&args.effect, "filter")?)?;
    // The effect expects raw video in a format of its choosing; the
    // converter in front of the sink makes the chain work on any platform.
    let convert = topology.add_stage(Stage::new(StageKind::Converter, "videoconvert", "convert")?)?;
    let sink = topology.add_stage(Stage::new(StageKind::Sink, "autovideosink", "sink")?)?;
    topology.link_chain(&[source, filter, convert, sink])?;

    let mut controller = PipelineController::new(topology);
    controller.start()?;
    match controller.run()? {
        StopReason::EndOfStream => info!("finished: end of stream"),
        StopReason::Cancelled => info!("finished: stop requested"),
    }
    Ok(())
}
