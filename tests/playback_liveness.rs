//! Playback timelines never fire triggers from a stale snapshot

use gridstudio::config::StudioConfig;
use gridstudio::files::ExportTarget;
use gridstudio::messaging::sink::CollectingSink;
use gridstudio::sequencer::schedule::ManualScheduler;
use gridstudio::sequencer::transport::TransportListener;
use gridstudio::studio::grid_panel::{GridPanel, StepTrigger};
use gridstudio::studio::synth_panel::{SequenceEvent, SynthPanel};
use gridstudio::Tempo;
use gridstudio::GridLayout;
use std::sync::Arc;

fn drum_panel() -> (GridPanel, ManualScheduler<StepTrigger>, CollectingSink) {
    let clock = ManualScheduler::new();
    let sink = CollectingSink::new();
    let panel = GridPanel::with_scheduler(
        GridLayout::drum_grid(),
        ExportTarget::DrumGrid,
        Arc::new(sink.clone()),
        Box::new(clock.clone()),
        &StudioConfig::default(),
    );
    (panel, clock, sink)
}

#[test]
fn removing_a_note_mid_playback_cancels_it() {
    let (mut panel, clock, sink) = drum_panel();
    panel.toggle(1, 8).unwrap();
    panel.transport_changed(true);

    clock.advance(1.0);
    panel.toggle(1, 8).unwrap();
    assert_eq!(clock.cancel_count(), 1);
    assert_eq!(clock.schedule_count(), 2);

    // Several bars: the removed snare never sounds
    clock.advance(16.0);
    assert!(sink.triggers().is_empty());
}

#[test]
fn adding_a_note_mid_playback_takes_effect() {
    let (mut panel, clock, sink) = drum_panel();
    panel.transport_changed(true);
    clock.advance(0.5);

    panel.toggle(0, 4).unwrap();
    clock.advance(4.0);
    assert_eq!(sink.triggers().len(), 1);
}

#[test]
fn stopping_clears_indicator_and_silences() {
    let (mut panel, clock, sink) = drum_panel();
    panel.toggle(3, 0).unwrap();
    panel.transport_changed(true);
    clock.advance(0.0);
    assert_eq!(panel.current_step(), Some(0));

    panel.transport_changed(false);
    assert_eq!(panel.current_step(), None);
    let before = sink.triggers().len();
    clock.advance(8.0);
    assert_eq!(sink.triggers().len(), before);
}

#[test]
fn dropping_the_panel_cancels_its_schedule() {
    let (mut panel, clock, _) = drum_panel();
    panel.transport_changed(true);
    assert!(clock.is_scheduled());
    drop(panel);
    assert!(!clock.is_scheduled());
}

#[test]
fn recording_during_playback_rebuilds_the_sequence() {
    let clock = ManualScheduler::<SequenceEvent>::new();
    let sink = CollectingSink::new();
    let mut panel = SynthPanel::with_scheduler(
        Arc::new(sink.clone()),
        Box::new(clock.clone()),
        Tempo::default(),
    );

    panel.start_recording();
    panel.press_key_at(60, 0.0);
    panel.transport_changed(true);
    assert_eq!(clock.schedule_count(), 1);

    panel.press_key_at(64, 0.5);
    assert_eq!(clock.cancel_count(), 1);
    assert_eq!(clock.schedule_count(), 2);
    sink.clear();

    // The rebuilt sequence holds both notes, 1 beat apart at 120 BPM
    clock.advance(1.0);
    let played: Vec<u8> = sink.triggers().iter().map(|t| t.note).collect();
    assert_eq!(played, vec![60, 64]);
}

#[test]
fn recording_while_stopped_schedules_nothing() {
    let clock = ManualScheduler::<SequenceEvent>::new();
    let mut panel = SynthPanel::with_scheduler(
        Arc::new(CollectingSink::new()),
        Box::new(clock.clone()),
        Tempo::default(),
    );

    panel.start_recording();
    panel.press_key_at(60, 0.0);
    panel.press_key_at(64, 0.5);
    assert_eq!(clock.schedule_count(), 0);
}
