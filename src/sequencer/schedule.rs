// Scheduler - fires trigger callbacks at musical-time offsets
//
// Two implementations share the `Scheduler` trait:
// - `ThreadScheduler` runs each schedule on its own thread against the wall clock
// - `ManualScheduler` fires events when its clock is advanced explicitly
//
// In both, `cancel_all` is total: once it returns, no callback of a cancelled
// schedule runs again.

use crate::sequencer::timeline::Tempo;
use log::{debug, error, warn};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// An event at a position in quarter notes from the start of the schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent<P> {
    pub beat: f64,
    pub payload: P,
}

impl<P> ScheduledEvent<P> {
    pub fn new(beat: f64, payload: P) -> Self {
        Self { beat, payload }
    }
}

/// Everything a scheduler needs to run one pass (or loop) of events
#[derive(Debug, Clone)]
pub struct Schedule<P> {
    pub events: Vec<ScheduledEvent<P>>,
    pub tempo: Tempo,
    /// Loop length in quarter notes; `None` plays once
    pub loop_beats: Option<f64>,
}

impl<P> Schedule<P> {
    pub fn once(events: Vec<ScheduledEvent<P>>, tempo: Tempo) -> Self {
        Self {
            events,
            tempo,
            loop_beats: None,
        }
    }

    pub fn looping(events: Vec<ScheduledEvent<P>>, tempo: Tempo, loop_beats: f64) -> Self {
        Self {
            events,
            tempo,
            loop_beats: Some(loop_beats),
        }
    }

    fn sort(&mut self) {
        self.events.sort_by(|a, b| a.beat.total_cmp(&b.beat));
    }

    fn loop_length(&self) -> Option<f64> {
        self.loop_beats
            .filter(|len| *len > 0.0 && !self.events.is_empty())
    }
}

/// Callback invoked once per fired event
pub type TriggerCallback<P> = Box<dyn FnMut(&P) + Send>;

pub trait Scheduler<P>: Send {
    /// Start running a schedule. Other schedules keep running.
    fn schedule(&mut self, schedule: Schedule<P>, callback: TriggerCallback<P>);

    /// Cancel every pending event of every schedule
    fn cancel_all(&mut self);
}

type CancelFlag = Arc<(Mutex<bool>, Condvar)>;

struct Run {
    cancel: CancelFlag,
    handle: Option<JoinHandle<()>>,
}

/// Wall-clock scheduler, one thread per running schedule
#[derive(Default)]
pub struct ThreadScheduler {
    runs: Vec<Run>,
}

impl ThreadScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of schedules started and not yet cancelled
    pub fn active_runs(&self) -> usize {
        self.runs.len()
    }

    fn cancel_runs(&mut self) {
        for mut run in self.runs.drain(..) {
            {
                let (lock, cvar) = &*run.cancel;
                let mut cancelled = lock.lock().unwrap_or_else(PoisonError::into_inner);
                *cancelled = true;
                cvar.notify_all();
            }
            if let Some(handle) = run.handle.take()
                && handle.join().is_err()
            {
                warn!("Scheduler thread panicked before cancellation");
            }
        }
    }
}

impl<P: Send + 'static> Scheduler<P> for ThreadScheduler {
    fn schedule(&mut self, mut schedule: Schedule<P>, callback: TriggerCallback<P>) {
        schedule.sort();

        let cancel: CancelFlag = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_cancel = Arc::clone(&cancel);

        let spawned = thread::Builder::new()
            .name("gridstudio-scheduler".to_string())
            .spawn(move || run_schedule(schedule, callback, &thread_cancel));

        match spawned {
            Ok(handle) => self.runs.push(Run {
                cancel,
                handle: Some(handle),
            }),
            Err(e) => error!("Failed to spawn scheduler thread: {}", e),
        }
    }

    fn cancel_all(&mut self) {
        self.cancel_runs();
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        self.cancel_runs();
    }
}

fn run_schedule<P>(schedule: Schedule<P>, mut callback: TriggerCallback<P>, cancel: &CancelFlag) {
    let origin = Instant::now();
    let mut cycle_start = 0.0;

    debug!(
        "Schedule started: {} events at {}",
        schedule.events.len(),
        schedule.tempo
    );

    loop {
        for event in &schedule.events {
            let offset = schedule.tempo.beats_to_seconds(cycle_start + event.beat);
            let deadline = origin + Duration::from_secs_f64(offset.max(0.0));
            if !wait_until(cancel, deadline) {
                return;
            }
            callback(&event.payload);
        }

        match schedule.loop_length() {
            Some(len) => cycle_start += len,
            None => return,
        }
    }
}

/// Sleep until `deadline`. Returns false if cancelled first.
fn wait_until(cancel: &CancelFlag, deadline: Instant) -> bool {
    let (lock, cvar) = &**cancel;
    let mut cancelled = lock.lock().unwrap_or_else(PoisonError::into_inner);
    loop {
        if *cancelled {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        let (guard, _) = cvar
            .wait_timeout(cancelled, deadline - now)
            .unwrap_or_else(PoisonError::into_inner);
        cancelled = guard;
    }
}

struct ManualRun<P> {
    schedule: Schedule<P>,
    callback: TriggerCallback<P>,
    next: usize,
    cycle_start: f64,
    started_at: f64,
}

struct ManualState<P> {
    clock: f64,
    runs: Vec<ManualRun<P>>,
    scheduled: usize,
    cancelled: usize,
}

/// Scheduler driven by an explicit clock in quarter notes
///
/// Clones share the same state, so a test can keep a handle while a panel
/// owns the scheduler.
pub struct ManualScheduler<P> {
    state: Arc<Mutex<ManualState<P>>>,
}

impl<P> Clone for ManualScheduler<P> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<P> Default for ManualScheduler<P> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                clock: 0.0,
                runs: Vec::new(),
                scheduled: 0,
                cancelled: 0,
            })),
        }
    }
}

impl<P> ManualScheduler<P> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move the clock forward and fire every event that became due, in order.
    /// Returns the number of callbacks run.
    pub fn advance(&self, beats: f64) -> usize {
        let mut state = self.lock();
        let target = state.clock + beats.max(0.0);
        let mut fired = 0;

        for run in state.runs.iter_mut() {
            loop {
                if run.next >= run.schedule.events.len() {
                    match run.schedule.loop_length() {
                        Some(len) => {
                            run.cycle_start += len;
                            run.next = 0;
                        }
                        None => break,
                    }
                }

                let event = &run.schedule.events[run.next];
                let due = run.started_at + run.cycle_start + event.beat;
                if due > target {
                    break;
                }
                (run.callback)(&event.payload);
                run.next += 1;
                fired += 1;
            }
        }

        state.clock = target;
        fired
    }

    pub fn clock(&self) -> f64 {
        self.lock().clock
    }

    pub fn is_scheduled(&self) -> bool {
        !self.lock().runs.is_empty()
    }

    /// Total number of `schedule` calls
    pub fn schedule_count(&self) -> usize {
        self.lock().scheduled
    }

    /// Total number of `cancel_all` calls that cancelled at least one run
    pub fn cancel_count(&self) -> usize {
        self.lock().cancelled
    }
}

impl<P: Send + 'static> Scheduler<P> for ManualScheduler<P> {
    fn schedule(&mut self, mut schedule: Schedule<P>, callback: TriggerCallback<P>) {
        schedule.sort();
        let mut state = self.lock();
        let started_at = state.clock;
        state.runs.push(ManualRun {
            schedule,
            callback,
            next: 0,
            cycle_start: 0.0,
            started_at,
        });
        state.scheduled += 1;
    }

    fn cancel_all(&mut self) {
        let mut state = self.lock();
        if !state.runs.is_empty() {
            state.runs.clear();
            state.cancelled += 1;
        }
    }
}
