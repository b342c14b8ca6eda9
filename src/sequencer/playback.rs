// Playback timeline - Idle/Scheduled state machine around a scheduler
//
// Every change of the play flag or of the source data goes through `sync`,
// which cancels the running schedule before building a new one from the
// current snapshot. A stale schedule never fires after `sync` or `stop`.

use crate::sequencer::schedule::{Schedule, Scheduler, TriggerCallback};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Step currently sounding, shared between the scheduler thread and the UI
#[derive(Debug, Clone)]
pub struct StepIndicator {
    inner: Arc<AtomicUsize>,
}

impl StepIndicator {
    const NONE: usize = usize::MAX;

    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicUsize::new(Self::NONE)),
        }
    }

    pub fn get(&self) -> Option<usize> {
        match self.inner.load(Ordering::Acquire) {
            Self::NONE => None,
            step => Some(step),
        }
    }

    pub fn set(&self, step: usize) {
        self.inner.store(step, Ordering::Release);
    }

    pub fn clear(&self) {
        self.inner.store(Self::NONE, Ordering::Release);
    }
}

impl Default for StepIndicator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineState {
    Idle,
    Scheduled,
}

pub struct PlaybackTimeline<P: Send + 'static> {
    scheduler: Box<dyn Scheduler<P>>,
    state: TimelineState,
    indicator: StepIndicator,
    /// Number of schedules built so far
    generation: u64,
}

impl<P: Send + 'static> PlaybackTimeline<P> {
    pub fn new(scheduler: Box<dyn Scheduler<P>>) -> Self {
        Self {
            scheduler,
            state: TimelineState::Idle,
            indicator: StepIndicator::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    pub fn is_scheduled(&self) -> bool {
        self.state == TimelineState::Scheduled
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Handle for callbacks that move the "current step" marker
    pub fn indicator(&self) -> StepIndicator {
        self.indicator.clone()
    }

    pub fn current_step(&self) -> Option<usize> {
        self.indicator.get()
    }

    /// Idle -> Scheduled. A running schedule is cancelled first.
    pub fn start(&mut self, schedule: Schedule<P>, callback: TriggerCallback<P>) {
        self.stop();
        self.generation += 1;
        debug!(
            "Timeline generation {} scheduled ({} events)",
            self.generation,
            schedule.events.len()
        );
        self.scheduler.schedule(schedule, callback);
        self.state = TimelineState::Scheduled;
    }

    /// Scheduled -> Idle. Cancels every pending trigger and clears the step marker.
    pub fn stop(&mut self) {
        if self.state == TimelineState::Scheduled {
            self.scheduler.cancel_all();
            debug!("Timeline generation {} cancelled", self.generation);
        }
        // Cleared after cancellation so a late trigger cannot set it again
        self.indicator.clear();
        self.state = TimelineState::Idle;
    }

    /// Tear down and, when playing, rebuild from a fresh snapshot
    pub fn sync<F>(&mut self, playing: bool, build: F)
    where
        F: FnOnce() -> (Schedule<P>, TriggerCallback<P>),
    {
        self.stop();
        if playing {
            let (schedule, callback) = build();
            self.start(schedule, callback);
        }
    }
}

impl<P: Send + 'static> Drop for PlaybackTimeline<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::schedule::{ManualScheduler, ScheduledEvent};
    use crate::sequencer::timeline::Tempo;

    fn step_schedule(steps: usize) -> Schedule<usize> {
        let events = (0..steps)
            .map(|s| ScheduledEvent::new(s as f64 * 0.25, s))
            .collect();
        Schedule::once(events, Tempo::default())
    }

    fn marker(timeline: &PlaybackTimeline<usize>) -> TriggerCallback<usize> {
        let indicator = timeline.indicator();
        Box::new(move |step| indicator.set(*step))
    }

    #[test]
    fn test_indicator() {
        let indicator = StepIndicator::new();
        assert_eq!(indicator.get(), None);
        indicator.set(3);
        assert_eq!(indicator.get(), Some(3));
        indicator.clear();
        assert_eq!(indicator.get(), None);
    }

    #[test]
    fn test_start_and_stop() {
        let clock = ManualScheduler::new();
        let mut timeline = PlaybackTimeline::new(Box::new(clock.clone()));
        assert_eq!(timeline.state(), TimelineState::Idle);

        let callback = marker(&timeline);
        timeline.start(step_schedule(16), callback);
        assert!(timeline.is_scheduled());

        clock.advance(0.5);
        assert_eq!(timeline.current_step(), Some(2));

        timeline.stop();
        assert_eq!(timeline.state(), TimelineState::Idle);
        assert_eq!(timeline.current_step(), None);
        assert_eq!(clock.advance(4.0), 0);
    }

    #[test]
    fn test_sync_rebuilds_only_when_playing() {
        let clock = ManualScheduler::new();
        let mut timeline = PlaybackTimeline::new(Box::new(clock.clone()));

        let callback = marker(&timeline);
        timeline.sync(false, || (step_schedule(4), callback));
        assert_eq!(timeline.state(), TimelineState::Idle);
        assert_eq!(clock.schedule_count(), 0);

        let callback = marker(&timeline);
        timeline.sync(true, || (step_schedule(4), callback));
        assert_eq!(clock.schedule_count(), 1);
        assert_eq!(timeline.generation(), 1);

        let callback = marker(&timeline);
        timeline.sync(true, || (step_schedule(4), callback));
        assert_eq!(clock.schedule_count(), 2);
        assert_eq!(clock.cancel_count(), 1);
        assert_eq!(timeline.generation(), 2);
    }

    #[test]
    fn test_drop_cancels() {
        let clock = ManualScheduler::new();
        {
            let mut timeline = PlaybackTimeline::new(Box::new(clock.clone()));
            let callback = marker(&timeline);
            timeline.start(step_schedule(4), callback);
            assert!(clock.is_scheduled());
        }
        assert!(!clock.is_scheduled());
    }
}
