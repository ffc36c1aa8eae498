//! Emulation producer tests

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::handoff::{Consume, ConsumedFrame};
use crate::modes::ModeCatalog;
use crate::surface::{VB_HEIGHT, VB_WIDTH};
use crate::test_utils::{ReceivedDirectives, ScriptedCore, frame_color};

fn pipeline() -> Arc<Pipeline> {
    let pipeline = Arc::new(Pipeline::initialize().unwrap());
    pipeline.clear_all().unwrap();
    pipeline
}

fn producer(
    core: ScriptedCore,
    mode: &str,
    pipeline: &Arc<Pipeline>,
) -> EmulationProducer<ScriptedCore> {
    EmulationProducer::new(
        core,
        Arc::clone(pipeline),
        ModeCatalog::resolve(mode),
        PacerConfig::unpaced(),
        None,
    )
}

// ============================================================================
// Directives
// ============================================================================

#[test]
fn test_directives_from_passthrough_mode() {
    let core = ScriptedCore::new();
    let received = Arc::clone(&core.directives);
    let _producer = producer(core, "white_black", &pipeline());
    assert_eq!(
        *received.lock().unwrap(),
        ReceivedDirectives {
            parallax_disabled: Some(true),
            anaglyph: Some((Rgb::WHITE, Rgb::BLACK)),
            layout: Some(StereoLayout::Mono),
        }
    );
}

#[test]
fn test_directives_from_anaglyph_mode() {
    let core = ScriptedCore::new();
    let received = Arc::clone(&core.directives);
    let _producer = producer(core, "red_blue", &pipeline());
    let received = received.lock().unwrap();
    assert_eq!(received.parallax_disabled, Some(false));
    assert_eq!(received.anaglyph, Some((Rgb(0xFF0000), Rgb(0x0000FF))));
    assert_eq!(received.layout, Some(StereoLayout::Anaglyph));
}

#[test]
fn test_display_rects_by_layout() {
    let full = DisplayRect::full_frame();
    assert_eq!(display_rects(StereoLayout::Mono, full), DisplayRects::mono(full));
    assert_eq!(display_rects(StereoLayout::Anaglyph, full), DisplayRects::mono(full));

    let sbs = display_rects(StereoLayout::SideBySide, full);
    assert_eq!(sbs.left, DisplayRect::new(0, 0, VB_WIDTH / 2, VB_HEIGHT));
    assert_eq!(
        sbs.right,
        Some(DisplayRect::new((VB_WIDTH / 2) as i32, 0, VB_WIDTH / 2, VB_HEIGHT))
    );
}

// ============================================================================
// Stepping
// ============================================================================

#[test]
fn test_publishes_alternate_buffers() {
    let pipeline = pipeline();
    let mut producer = producer(ScriptedCore::new(), "white_black", &pipeline);
    let mut indices = Vec::new();
    for expected_seq in 1..=8 {
        indices.push(pipeline.frames.inactive_index());
        assert_eq!(producer.step(), Ok(expected_seq));
    }
    assert_eq!(indices, vec![0, 1, 0, 1, 0, 1, 0, 1]);
    assert_eq!(producer.frames(), 8);
    assert_eq!(pipeline.rates.counts().emulated, 8);
}

#[test]
fn test_published_frame_matches_core_output() {
    let pipeline = pipeline();
    let mut producer = producer(ScriptedCore::new(), "side_by_side", &pipeline);
    producer.step().unwrap();
    let frame = match pipeline.channel.try_consume(&pipeline.frames) {
        Consume::Ready(frame) => frame,
        Consume::NothingNew => panic!("expected a frame"),
    };
    assert_eq!(frame.surface.get(0, 0), frame_color(1));
    assert!(frame.rects.is_dual());
    assert!(frame.widths.as_slice().iter().all(|r| r.w == VB_WIDTH));
}

#[test]
fn test_halt_ends_loop() {
    let pipeline = pipeline();
    let mut producer = producer(ScriptedCore::new().halting_at(4), "white_black", &pipeline);
    let exit = producer.run(&StopToken::new());
    assert_eq!(exit, ProducerExit::Halted);
    assert!(exit.is_clean());
    assert_eq!(producer.frames(), 3);
}

#[test]
fn test_failure_keeps_last_published_frame() {
    let pipeline = pipeline();
    let mut producer = producer(ScriptedCore::new().failing_at(3), "white_black", &pipeline);
    let exit = producer.run(&StopToken::new());
    assert!(matches!(exit, ProducerExit::Failed(CoreError::Fault(_))));
    assert!(!exit.is_clean());

    // Frame 2 is the last valid one and is still the pending announcement
    let mut frame = ConsumedFrame::empty();
    assert!(pipeline.channel.try_consume_into(&pipeline.frames, &mut frame));
    assert_eq!(frame.sequence, 2);
    assert_eq!(frame.surface.get(10, 10), frame_color(2));
}

#[test]
fn test_frame_limit() {
    let pipeline = pipeline();
    let mut producer = EmulationProducer::new(
        ScriptedCore::new(),
        Arc::clone(&pipeline),
        ModeCatalog::default_mode(),
        PacerConfig::unpaced(),
        Some(5),
    );
    assert_eq!(producer.run(&StopToken::new()), ProducerExit::FrameLimit);
    assert_eq!(producer.frames(), 5);
    assert_eq!(pipeline.channel.stats().published, 5);
}

#[test]
fn test_stop_before_start() {
    let pipeline = pipeline();
    let mut producer = producer(ScriptedCore::new(), "white_black", &pipeline);
    let stop = StopToken::new();
    stop.stop();
    assert_eq!(producer.run(&stop), ProducerExit::Stopped);
    assert_eq!(producer.frames(), 0);
}

#[test]
fn test_torn_down_buffer_ends_loop() {
    let pipeline = pipeline();
    let mut producer = producer(ScriptedCore::new(), "white_black", &pipeline);
    pipeline.teardown();
    assert_eq!(producer.run(&StopToken::new()), ProducerExit::TornDown);
}

// ============================================================================
// Thread handle
// ============================================================================

#[test]
fn test_handle_stop_and_join() {
    let pipeline = pipeline();
    let producer = EmulationProducer::new(
        ScriptedCore::new(),
        Arc::clone(&pipeline),
        ModeCatalog::default_mode(),
        PacerConfig {
            tick_rate: 200,
            ..PacerConfig::default()
        },
        None,
    );
    let handle = ProducerHandle::spawn(producer, StopToken::new()).unwrap();
    std::thread::sleep(Duration::from_millis(30));
    assert!(handle.is_alive());

    let report = handle.stop();
    assert_eq!(report.exit, ProducerExit::Stopped);
    assert!(report.frames > 0);
    assert_eq!(report.core.map(|c| c.frames_run), Some(report.frames));
}

#[test]
fn test_handle_join_after_halt() {
    let pipeline = pipeline();
    let producer = producer(ScriptedCore::new().halting_at(11), "white_black", &pipeline);
    let handle = ProducerHandle::spawn(producer, StopToken::new()).unwrap();
    let report = handle.join();
    assert_eq!(report.exit, ProducerExit::Halted);
    assert_eq!(report.frames, 10);
}

#[test]
fn test_handle_drop_stops_thread() {
    let pipeline = pipeline();
    let producer = producer(ScriptedCore::new(), "white_black", &pipeline);
    let stop = StopToken::new();
    let handle = ProducerHandle::spawn(producer, stop.clone()).unwrap();
    drop(handle);
    assert!(stop.is_stopped());
    // The thread has exited, so the buffers are free again
    assert!(pipeline.frames.begin_frame().is_ok());
}
