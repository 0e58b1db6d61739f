// SPDX-FileCopyrightText: 2026 Contributors to the Pipegraph project.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the pipeline graph manager.
//!
//! These tests exercise the core graph operations against real framework
//! elements, restricted to the ones shipped with the framework core
//! (`fakesrc`, `fakesink`, `identity`, `tee`, `queue`, `filesink`) so the
//! suite runs headless on any installation.
//!
//! # Test Coverage
//!
//! - Stage construction failure and registry bookkeeping
//! - Static linking, exactly-one sink enforcement, chain linking
//! - Dynamic dispatch: classification, idempotence, ignored shapes
//! - Fan-out branch lifecycle, double-release detection
//! - Controller runs: end-of-stream, refused startup, cancellation,
//!   teardown ordering

use std::sync::Once;
use std::time::Duration;

use gstreamer as gst;
use pipegraph::{
    DynamicLinkOutcome, DynamicLinker, Error, FanoutJunction, Phase, PipelineController, Stage,
    StageKind, StaticTopology, StopReason,
};

/// Ensures logging and the framework are initialized only once across tests.
static INIT_ONCE: Once = Once::new();

/// Initializes tracing (respecting `RUST_LOG`) and the framework.
fn setup() {
    INIT_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .init();
        gst::init().expect("framework initialisation failed");
    });
}

/// Returns a name unique across concurrently running tests.
fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

fn stage(kind: StageKind, factory: &str, name: &str) -> Stage {
    Stage::new(kind, factory, name).expect("stage construction failed")
}

#[test]
fn construction_failure_is_fatal_before_linking() {
    setup();

    match Stage::new(StageKind::Source, "definitely-not-an-element", "source") {
        Err(Error::StageConstruction { factory, name }) => {
            assert_eq!(factory, "definitely-not-an-element");
            assert_eq!(name, "source");
        }
        other => panic!("expected StageConstruction, got {other:?}"),
    }
}

#[test]
fn duplicate_stage_names_are_rejected() {
    setup();

    let mut topology = StaticTopology::new(&unique("dup"));
    topology
        .add_stage(stage(StageKind::Filter, "identity", "same"))
        .unwrap();
    match topology.add_stage(stage(StageKind::Filter, "identity", "same")) {
        Err(Error::DuplicateStage(name)) => assert_eq!(name, "same"),
        other => panic!("expected DuplicateStage, got {other:?}"),
    }
}

#[test]
fn unknown_property_is_rejected() {
    setup();

    let src = stage(StageKind::Source, "fakesrc", "source");
    match src.set_property("no-such-property", 42i32) {
        Err(Error::UnknownProperty { stage, property }) => {
            assert_eq!(stage, "source");
            assert_eq!(property, "no-such-property");
        }
        other => panic!("expected UnknownProperty, got {other:?}"),
    }
}

#[test]
fn exactly_one_sink_refuses_a_second_link() {
    setup();

    let mut topology = StaticTopology::new(&unique("second_link"));
    let src = topology
        .add_stage(stage(StageKind::Source, "fakesrc", "source"))
        .unwrap();
    let a = topology
        .add_stage(stage(StageKind::Filter, "identity", "a"))
        .unwrap();
    let b = topology
        .add_stage(stage(StageKind::Filter, "identity", "b"))
        .unwrap();

    topology.link(src, a).unwrap();
    match topology.link(b, a) {
        Err(Error::AlreadyLinked(_)) => {}
        other => panic!("expected AlreadyLinked, got {other:?}"),
    }
}

#[test]
fn link_chain_links_every_consecutive_pair() {
    setup();

    let mut topology = StaticTopology::new(&unique("chain"));
    let src = topology
        .add_stage(stage(StageKind::Source, "fakesrc", "source"))
        .unwrap();
    let a = topology
        .add_stage(stage(StageKind::Filter, "identity", "a"))
        .unwrap();
    let b = topology
        .add_stage(stage(StageKind::Filter, "identity", "b"))
        .unwrap();
    let sink = topology
        .add_stage(stage(StageKind::Sink, "fakesink", "sink"))
        .unwrap();

    topology.link_chain(&[src, a, b, sink]).unwrap();

    for id in [a, b, sink] {
        assert!(topology.stage(id).default_input().unwrap().is_linked());
    }
    assert!(topology.stage(src).default_output().unwrap().is_linked());
}

#[test]
fn dynamic_dispatch_classifies_links_and_ignores() {
    setup();

    // Two stand-ins for a demuxer's discovered output ports plus the two
    // pre-registered consumer chains waiting for them.
    let mut topology = StaticTopology::new(&unique("dispatch"));
    let audio_out = topology
        .add_stage(stage(StageKind::Source, "identity", "audio_out"))
        .unwrap();
    let video_out = topology
        .add_stage(stage(StageKind::Source, "identity", "video_out"))
        .unwrap();
    let subs_out = topology
        .add_stage(stage(StageKind::Source, "identity", "subs_out"))
        .unwrap();
    let audio_convert = topology
        .add_stage(stage(StageKind::Converter, "identity", "audio_convert"))
        .unwrap();
    let video_queue = topology
        .add_stage(stage(StageKind::Filter, "queue", "video_queue"))
        .unwrap();

    let linker = DynamicLinker::new();
    linker
        .add_route(&topology, "audio/x-raw", audio_convert)
        .unwrap();
    linker
        .add_route(&topology, "video/x-raw", video_queue)
        .unwrap();

    let audio_pad = topology.stage(audio_out).default_output().unwrap();
    let video_pad = topology.stage(video_out).default_output().unwrap();
    let subs_pad = topology.stage(subs_out).default_output().unwrap();

    // An audio-shaped port links to the audio chain.
    assert_eq!(
        linker.dispatch(audio_pad.pad(), "audio/x-raw"),
        DynamicLinkOutcome::Linked
    );
    assert!(topology.stage(audio_convert).default_input().unwrap().is_linked());

    // A duplicate notification is a harmless no-op.
    assert_eq!(
        linker.dispatch(audio_pad.pad(), "audio/x-raw"),
        DynamicLinkOutcome::AlreadyLinked
    );

    // A video-shaped port links to the video chain.
    assert_eq!(
        linker.dispatch(video_pad.pad(), "video/x-raw"),
        DynamicLinkOutcome::Linked
    );

    // An unclassified shape creates no link and raises no error.
    assert_eq!(
        linker.dispatch(subs_pad.pad(), "text/x-subtitle"),
        DynamicLinkOutcome::Unmatched
    );
    assert!(!subs_pad.is_linked());

    assert_eq!(linker.completed().len(), 2);
    assert_eq!(linker.pending(), 0);
}

#[test]
fn fanout_branches_are_distinct_and_released_exactly_once() {
    setup();

    let mut topology = StaticTopology::new(&unique("fanout"));
    let tee = topology
        .add_stage(stage(StageKind::Junction, "tee", "tee"))
        .unwrap();
    let queue_a = topology
        .add_stage(stage(StageKind::Filter, "queue", "queue_a"))
        .unwrap();
    let queue_b = topology
        .add_stage(stage(StageKind::Filter, "queue", "queue_b"))
        .unwrap();

    let junction = FanoutJunction::from_stage(&topology, tee).unwrap();
    let first = junction.acquire_branch().unwrap();
    let second = junction.acquire_branch().unwrap();
    assert_ne!(first.name(), second.name());
    assert_eq!(junction.live_branches(), 2);

    junction.link_branch(&topology, &first, queue_a).unwrap();
    junction.link_branch(&topology, &second, queue_b).unwrap();

    junction.release_branch(&first).unwrap();
    junction.release_branch(&second).unwrap();
    assert_eq!(junction.live_branches(), 0);

    match junction.release_branch(&first) {
        Err(Error::DoubleRelease { .. }) => {}
        other => panic!("expected DoubleRelease, got {other:?}"),
    }
}

#[test]
fn junction_kind_is_enforced() {
    setup();

    let mut topology = StaticTopology::new(&unique("kind"));
    let not_a_tee = topology
        .add_stage(stage(StageKind::Filter, "identity", "not_a_tee"))
        .unwrap();
    assert!(FanoutJunction::from_stage(&topology, not_a_tee).is_err());
}

#[test]
fn controller_runs_to_end_of_stream() {
    setup();

    let mut topology = StaticTopology::new(&unique("eos"));
    let src = topology
        .add_stage(stage(StageKind::Source, "fakesrc", "source"))
        .unwrap();
    let sink = topology
        .add_stage(stage(StageKind::Sink, "fakesink", "sink"))
        .unwrap();
    topology.stage(src).set_property("num-buffers", 4i32).unwrap();
    topology.link(src, sink).unwrap();

    let mut controller = PipelineController::new(topology);
    controller.start().unwrap();
    assert_eq!(controller.phase(), Phase::Playing);

    let reason = controller.run().unwrap();
    assert_eq!(reason, StopReason::EndOfStream);
    assert_eq!(controller.phase(), Phase::Stopped);
}

#[test]
fn refused_transition_aborts_startup() {
    setup();

    // A file sink without a location refuses to leave the null state.
    let mut topology = StaticTopology::new(&unique("refused"));
    let src = topology
        .add_stage(stage(StageKind::Source, "fakesrc", "source"))
        .unwrap();
    let sink = topology
        .add_stage(stage(StageKind::Sink, "filesink", "sink"))
        .unwrap();
    topology.link(src, sink).unwrap();

    let mut controller = PipelineController::new(topology);
    match controller.start() {
        Err(Error::StateTransition { .. }) => {}
        other => panic!("expected StateTransition, got {other:?}"),
    }
    // Resources were released through the normal teardown path and the
    // event loop is not reachable.
    assert_eq!(controller.phase(), Phase::Stopped);
    assert!(controller.run().is_err());
}

#[test]
fn teardown_revokes_branches_before_the_aggregate() {
    setup();

    let mut topology = StaticTopology::new(&unique("teardown"));
    let src = topology
        .add_stage(stage(StageKind::Source, "fakesrc", "source"))
        .unwrap();
    let tee = topology
        .add_stage(stage(StageKind::Junction, "tee", "tee"))
        .unwrap();
    let queue_a = topology
        .add_stage(stage(StageKind::Filter, "queue", "queue_a"))
        .unwrap();
    let sink_a = topology
        .add_stage(stage(StageKind::Sink, "fakesink", "sink_a"))
        .unwrap();
    let queue_b = topology
        .add_stage(stage(StageKind::Filter, "queue", "queue_b"))
        .unwrap();
    let sink_b = topology
        .add_stage(stage(StageKind::Sink, "fakesink", "sink_b"))
        .unwrap();

    topology.stage(src).set_property("num-buffers", 8i32).unwrap();
    topology.link(src, tee).unwrap();
    topology.link(queue_a, sink_a).unwrap();
    topology.link(queue_b, sink_b).unwrap();

    let junction = FanoutJunction::from_stage(&topology, tee).unwrap();
    for queue in [queue_a, queue_b] {
        let branch = junction.acquire_branch().unwrap();
        junction.link_branch(&topology, &branch, queue).unwrap();
    }

    let mut controller = PipelineController::new(topology);
    controller.add_junction(junction);
    controller.start().unwrap();
    controller.run().unwrap();

    // No branch port survives past the aggregate's release.
    assert_eq!(controller.phase(), Phase::Stopped);
    assert_eq!(controller.junctions()[0].live_branches(), 0);
}

#[test]
fn stop_handle_cancels_a_running_loop() {
    setup();

    // An unbounded source: only the stop request can end this run.
    let mut topology = StaticTopology::new(&unique("cancel"));
    let src = topology
        .add_stage(stage(StageKind::Source, "fakesrc", "source"))
        .unwrap();
    let sink = topology
        .add_stage(stage(StageKind::Sink, "fakesink", "sink"))
        .unwrap();
    topology.link(src, sink).unwrap();

    let mut controller = PipelineController::new(topology);
    controller.start().unwrap();

    let handle = controller.stop_handle().unwrap();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        handle.request_stop();
    });

    let reason = controller.run().unwrap();
    assert_eq!(reason, StopReason::Cancelled);
    assert_eq!(controller.phase(), Phase::Stopped);
    stopper.join().unwrap();
}
