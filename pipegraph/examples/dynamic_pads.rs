// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Demuxed playback with runtime linking.
//!
//! The URI decoder exposes no output ports until it has inspected the
//! container, so the audio and video chains are built and linked among
//! themselves up front, while the links out of the decoder are completed by
//! the [`DynamicLinker`] once the sub-streams are announced.

use clap::Parser;
use pipegraph::{
    config, DynamicLinker, PipelineController, Stage, StageKind, StaticTopology, StopReason,
};
use tracing::info;

mod common;

#[derive(Parser)]
#[command(about = "Play a media URI, linking audio and video at discovery time")]
struct Args {
    /// Media URI to play (defaults to the PIPEGRAPH_URI environment
    /// variable, then to a public test clip).
    #[arg(long, default_value_t = config::media_uri())]
    uri: String,

    /// Video effect applied to the video chain.
    #[arg(long, default_value = "agingtv")]
    effect: String,
}

fn main() -> Result<(), pipegraph::Error> {
    let args = Args::parse();
    common::init()?;

    let mut topology = StaticTopology::new("dynamic-pads");
    let source = topology.add_stage(Stage::new(StageKind::Source, "uridecodebin", "source")?)?;

    let audio_convert =
        topology.add_stage(Stage::new(StageKind::Converter, "audioconvert", "audio_convert")?)?;
    let audio_resample =
        topology.add_stage(Stage::new(StageKind::Converter, "audioresample", "audio_resample")?)?;
    let audio_sink =
        topology.add_stage(Stage::new(StageKind::Sink, "autoaudiosink", "audio_sink")?)?;

    // Effects only accept raw video in their own favourite format, hence
    // the converter on both sides.
    let video_convert1 =
        topology.add_stage(Stage::new(StageKind::Converter, "videoconvert", "video_convert1")?)?;
    let video_filter = topology.add_stage(Stage::effect(&args.effect, "video_filter")?)?;
    let video_convert2 =
        topology.add_stage(Stage::new(StageKind::Converter, "videoconvert", "video_convert2")?)?;
    let video_sink =
        topology.add_stage(Stage::new(StageKind::Sink, "autovideosink", "video_sink")?)?;

    // Note that the source is NOT linked here; its ports do not exist yet.
    topology.link_chain(&[audio_convert, audio_resample, audio_sink])?;
    topology.link_chain(&[video_convert1, video_filter, video_convert2, video_sink])?;

    topology.stage(source).set_property("uri", args.uri.as_str())?;

    let linker = DynamicLinker::new();
    linker.add_route(&topology, "audio/x-raw", audio_convert)?;
    linker.add_route(&topology, "video/x-raw", video_convert1)?;
    linker.attach(&topology, source);

    let mut controller = PipelineController::new(topology);
    controller.start()?;
    match controller.run()? {
        StopReason::EndOfStream => info!("finished: end of stream"),
        StopReason::Cancelled => info!("finished: stop requested"),
    }
    info!(completed = ?linker.completed(), "dynamic links completed");
    Ok(())
}
