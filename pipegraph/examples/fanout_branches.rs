// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Fan-out: one audio test stream replicated across three branches.
//!
//! The junction exposes no output ports of its own; every branch is
//! acquired on demand and linked before the aggregate starts playing. Each
//! branch begins with a queue so the branches get their own streaming
//! threads. The controller revokes the branches during teardown.
//!
//! Branches: direct audio playback, a waveform visualiser rendered to a
//! video sink, and a wav capture written to disk.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use pipegraph::{
    config, FanoutJunction, PipelineController, Stage, StageKind, StaticTopology, StopReason,
};
use tracing::info;

mod common;

#[derive(Parser)]
#[command(about = "Replicate one audio stream to speakers, a visualiser and a wav file")]
struct Args {
    /// Frequency of the test tone in hertz.
    #[arg(long, default_value_t = 215.0)]
    freq: f64,

    /// Path of the wav capture.
    #[arg(long, default_value_os_t = config::capture_path())]
    capture: PathBuf,

    /// Stop after this many seconds instead of running until interrupted.
    #[arg(long)]
    seconds: Option<u64>,
}

fn main() -> Result<(), pipegraph::Error> {
    let args = Args::parse();
    common::init()?;

    let mut topology = StaticTopology::new("fanout-branches");
    let source = topology.add_stage(Stage::new(StageKind::Source, "audiotestsrc", "source")?)?;
    let tee = topology.add_stage(Stage::new(StageKind::Junction, "tee", "tee")?)?;

    let audio_queue = topology.add_stage(Stage::new(StageKind::Filter, "queue", "audio_queue")?)?;
    let audio_convert =
        topology.add_stage(Stage::new(StageKind::Converter, "audioconvert", "audio_convert")?)?;
    let audio_resample =
        topology.add_stage(Stage::new(StageKind::Converter, "audioresample", "audio_resample")?)?;
    let audio_sink =
        topology.add_stage(Stage::new(StageKind::Sink, "autoaudiosink", "audio_sink")?)?;

    let visual_queue =
        topology.add_stage(Stage::new(StageKind::Filter, "queue", "visual_queue")?)?;
    let visual = topology.add_stage(Stage::new(StageKind::Filter, "wavescope", "visual")?)?;
    let visual_convert =
        topology.add_stage(Stage::new(StageKind::Converter, "videoconvert", "visual_convert")?)?;
    let visual_sink =
        topology.add_stage(Stage::new(StageKind::Sink, "autovideosink", "visual_sink")?)?;

    let file_queue = topology.add_stage(Stage::new(StageKind::Filter, "queue", "file_queue")?)?;
    let file_encode = topology.add_stage(Stage::new(StageKind::Filter, "wavenc", "file_encode")?)?;
    let file_sink = topology.add_stage(Stage::new(StageKind::Sink, "filesink", "file_sink")?)?;

    topology.stage(source).set_property("freq", args.freq)?;
    topology.stage(visual).set_property_from_str("shader", "none")?;
    topology.stage(visual).set_property_from_str("style", "lines")?;
    let capture = args.capture.to_string_lossy().to_string();
    topology.stage(file_sink).set_property("location", capture)?;

    topology.link(source, tee)?;
    topology.link_chain(&[audio_queue, audio_convert, audio_resample, audio_sink])?;
    topology.link_chain(&[visual_queue, visual, visual_convert, visual_sink])?;
    topology.link_chain(&[file_queue, file_encode, file_sink])?;

    // Acquire one branch per consumer chain and link them while the
    // aggregate is still in the null state.
    let junction = FanoutJunction::from_stage(&topology, tee)?;
    for queue in [audio_queue, visual_queue, file_queue] {
        let branch = junction.acquire_branch()?;
        info!(branch = %branch.name(), "acquired fan-out branch");
        junction.link_branch(&topology, &branch, queue)?;
    }

    let mut controller = PipelineController::new(topology);
    controller.add_junction(junction);
    controller.start()?;

    if let Some(seconds) = args.seconds {
        let handle = controller.stop_handle()?;
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(seconds));
            handle.request_stop();
        });
    }

    match controller.run()? {
        StopReason::EndOfStream => info!("finished: end of stream"),
        StopReason::Cancelled => info!("finished: stop requested"),
    }
    info!(capture = %args.capture.display(), "wav capture written");
    Ok(())
}
