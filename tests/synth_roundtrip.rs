//! Keyboard synth note lists through the MIDI file codec

use gridstudio::messaging::sink::CollectingSink;
use gridstudio::midi::file::write_smf;
use gridstudio::sequencer::note::NoteEvent;
use gridstudio::sequencer::note::parse_note_name;
use gridstudio::sequencer::schedule::ManualScheduler;
use gridstudio::studio::synth_panel::SynthPanel;
use gridstudio::Tempo;
use std::sync::Arc;

fn synth(tempo: Tempo) -> SynthPanel {
    SynthPanel::with_scheduler(
        Arc::new(CollectingSink::new()),
        Box::new(ManualScheduler::new()),
        tempo,
    )
}

fn record(panel: &mut SynthPanel, notes: &[(&str, f64)]) {
    panel.start_recording();
    for (name, time) in notes {
        panel.press_key_at(parse_note_name(name).unwrap(), *time);
    }
    panel.stop_recording();
}

#[test]
fn c4_e4_survive_export_import() {
    let mut panel = synth(Tempo::default());
    record(&mut panel, &[("C4", 0.0), ("E4", 0.5)]);

    let mut fresh = synth(Tempo::default());
    fresh.import_midi(&panel.export_midi().unwrap()).unwrap();

    let notes = fresh.notes();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].name(), "C4");
    assert_eq!(notes[1].name(), "E4");
    assert!(notes[0].time.abs() < 1e-6);
    assert!((notes[1].time - 0.5).abs() < 1e-6);
}

#[test]
fn base_time_is_normalised() {
    let mut panel = synth(Tempo::default());
    record(&mut panel, &[("G4", 1234.25), ("A4", 1235.0), ("B4", 1236.5)]);

    let mut fresh = synth(Tempo::default());
    fresh.import_midi(&panel.export_midi().unwrap()).unwrap();

    let times: Vec<f64> = fresh.notes().iter().map(|n| n.time).collect();
    for (got, want) in times.iter().zip([0.0, 0.75, 2.25]) {
        assert!((got - want).abs() < 1e-3, "{} != {}", got, want);
    }
}

#[test]
fn roundtrip_holds_at_other_tempos() {
    let tempo = Tempo::new(90.0);
    let mut panel = synth(tempo);
    record(&mut panel, &[("C4", 0.0), ("E4", 0.5)]);

    let mut fresh = synth(tempo);
    fresh.import_midi(&panel.export_midi().unwrap()).unwrap();
    assert!((fresh.notes()[1].time - 0.5).abs() < 1e-3);
}

#[test]
fn new_recording_clears_previous_notes() {
    let mut panel = synth(Tempo::default());
    record(&mut panel, &[("C4", 0.0)]);
    record(&mut panel, &[("D4", 3.0), ("E4", 3.5)]);
    assert_eq!(panel.notes().len(), 2);
    assert_eq!(panel.notes()[0].name(), "D4");
}

#[test]
fn import_uses_the_file_tempo() {
    // One beat apart at 60 BPM is one second, whatever the panel tempo
    let notes = [NoteEvent::new(60, 0.0, 0.5), NoteEvent::new(64, 1.0, 0.5)];
    let bytes = write_smf(&notes, &Tempo::new(60.0)).unwrap();

    let mut fresh = synth(Tempo::new(120.0));
    assert_eq!(fresh.import_midi(&bytes).unwrap(), 2);
    assert!((fresh.notes()[1].time - 1.0).abs() < 1e-6);
}

#[test]
fn tempo_change_between_export_and_import() {
    let mut panel = synth(Tempo::new(90.0));
    record(&mut panel, &[("C4", 0.0), ("E4", 0.5)]);
    let bytes = panel.export_midi().unwrap();

    panel.set_tempo(Tempo::new(120.0));
    panel.import_midi(&bytes).unwrap();
    assert!((panel.notes()[1].time - 0.5).abs() < 1e-3);
}
