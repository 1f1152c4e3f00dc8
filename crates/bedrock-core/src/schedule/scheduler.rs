// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::MediatorSettings;
use crate::error::ScheduleError;
use crate::event::{Broadcast, Relay};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Timing information passed to the per-frame channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// The time covered by the current tick.
    pub delta: Duration,
    /// The total scheduler time, including the current tick.
    pub elapsed: Duration,
    /// The number of the current tick, starting at 1.
    pub frame: u64,
}

/// Identifies a timer registered with a [`FrameScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Timer {
    id: TimerId,
    deadline: Duration,
    interval: Option<Duration>,
    callback: Box<dyn FnMut()>,
}

/// A tick-driven source of per-frame events and timers.
///
/// Every method takes `&self`, so listeners and timer callbacks may schedule
/// or cancel timers and register listeners while a tick is running.
///
/// # Example
///
/// ```rust
/// use bedrock_core::FrameScheduler;
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// let scheduler = FrameScheduler::new();
/// let fired = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&fired);
/// scheduler.after(Duration::from_millis(30), move || sink.set(sink.get() + 1));
///
/// scheduler.tick(Duration::from_millis(16));
/// assert_eq!(fired.get(), 0);
/// scheduler.tick(Duration::from_millis(16));
/// assert_eq!(fired.get(), 1);
/// ```
pub struct FrameScheduler {
    update: Broadcast<FrameTime>,
    late_update: Broadcast<FrameTime>,
    timers: RefCell<Vec<Timer>>,
    next_id: Cell<u64>,
    elapsed: Cell<Duration>,
    frame: Cell<u64>,
    /// Timers taken out for the current tick that can still be cancelled.
    in_flight: RefCell<HashSet<TimerId>>,
    /// In-flight timers cancelled before they were done.
    cancelled: RefCell<HashSet<TimerId>>,
}

impl FrameScheduler {
    /// Creates a scheduler at frame zero.
    pub fn new() -> Self {
        Self::from_channels(Broadcast::new(), Broadcast::new())
    }

    /// Creates a scheduler whose channels are configured by `settings`.
    pub fn with_settings(settings: &MediatorSettings) -> Self {
        Self::from_channels(
            Broadcast::with_settings(settings),
            Broadcast::with_settings(settings),
        )
    }

    fn from_channels(update: Broadcast<FrameTime>, late_update: Broadcast<FrameTime>) -> Self {
        Self {
            update,
            late_update,
            timers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            elapsed: Cell::new(Duration::ZERO),
            frame: Cell::new(0),
            in_flight: RefCell::new(HashSet::new()),
            cancelled: RefCell::new(HashSet::new()),
        }
    }

    /// Advances the scheduler by `delta`.
    ///
    /// Raises `update`, then fires every timer whose deadline has been reached
    /// in deadline order, then raises `late_update`. Timers scheduled by a
    /// timer callback are first considered on the next tick.
    pub fn tick(&self, delta: Duration) {
        let elapsed = self.elapsed.get() + delta;
        let frame = self.frame.get() + 1;
        self.elapsed.set(elapsed);
        self.frame.set(frame);
        let time = FrameTime {
            delta,
            elapsed,
            frame,
        };
        log::trace!("Tick {frame} ({delta:?}).");

        self.update.raise(&time);
        self.fire_due_timers(elapsed);
        self.late_update.raise(&time);
    }

    fn fire_due_timers(&self, now: Duration) {
        let mut due: Vec<Timer> = {
            let mut timers = self.timers.borrow_mut();
            let (due, pending): (Vec<Timer>, Vec<Timer>) = std::mem::take(&mut *timers)
                .into_iter()
                .partition(|timer| timer.deadline <= now);
            *timers = pending;
            due
        };
        due.sort_by_key(|timer| (timer.deadline, timer.id));
        self.in_flight
            .borrow_mut()
            .extend(due.iter().map(|timer| timer.id));

        for mut timer in due {
            if self.cancelled.borrow_mut().remove(&timer.id) {
                self.in_flight.borrow_mut().remove(&timer.id);
                continue;
            }
            // A one-shot is spent as soon as it starts running.
            if timer.interval.is_none() {
                self.in_flight.borrow_mut().remove(&timer.id);
            }

            (timer.callback)();

            self.in_flight.borrow_mut().remove(&timer.id);
            let cancelled = self.cancelled.borrow_mut().remove(&timer.id);
            if let (Some(interval), false) = (timer.interval, cancelled) {
                // Skip the periods that fell entirely inside this tick.
                let behind = (now - timer.deadline).as_nanos() / interval.as_nanos();
                let periods = u32::try_from(behind + 1).unwrap_or(u32::MAX);
                timer.deadline = timer.deadline.saturating_add(interval.saturating_mul(periods));
                self.timers.borrow_mut().push(timer);
            }
        }
    }

    /// Runs `callback` once, on the first tick at which `delay` has passed.
    /// ## Arguments
    /// * `delay` - Scheduler time to wait, measured from the current `elapsed()`.
    /// * `callback` - Called once. It may schedule or cancel other timers.
    /// ## Returns
    /// * The id to pass to [`cancel`](Self::cancel).
    pub fn after<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        let mut callback = Some(callback);
        self.schedule(delay, None, move || {
            if let Some(callback) = callback.take() {
                callback();
            }
        })
    }

    /// Runs `callback` every `interval`.
    ///
    /// The timer fires at most once per tick. When a tick spans several
    /// intervals, the missed ones are skipped and the timer keeps its phase.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::ZeroInterval`] if `interval` is zero.
    pub fn every<F>(&self, interval: Duration, callback: F) -> Result<TimerId, ScheduleError>
    where
        F: FnMut() + 'static,
    {
        if interval.is_zero() {
            log::warn!("Rejected a repeating timer with a zero interval.");
            return Err(ScheduleError::ZeroInterval);
        }
        Ok(self.schedule(interval, Some(interval), callback))
    }

    fn schedule(
        &self,
        delay: Duration,
        interval: Option<Duration>,
        callback: impl FnMut() + 'static,
    ) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.timers.borrow_mut().push(Timer {
            id,
            deadline: self.elapsed.get() + delay,
            interval,
            callback: Box::new(callback),
        });
        log::debug!("Scheduled timer {id:?} in {delay:?}.");
        id
    }

    /// Cancels a timer that has not fired yet.
    /// ## Arguments
    /// * `id` - The id returned by [`after`](Self::after) or [`every`](Self::every).
    /// ## Returns
    /// `true` if the timer was pending, including a timer that is due in the
    /// tick currently running but has not run yet. `false` if it already fired
    /// or was cancelled.
    ///
    /// A repeating timer may cancel itself from its own callback.
    pub fn cancel(&self, id: TimerId) -> bool {
        {
            let mut timers = self.timers.borrow_mut();
            if let Some(index) = timers.iter().position(|timer| timer.id == id) {
                timers.remove(index);
                return true;
            }
        }
        self.in_flight.borrow().contains(&id) && self.cancelled.borrow_mut().insert(id)
    }

    /// Cancels every timer that has not fired yet and returns how many there
    /// were.
    pub fn cancel_all(&self) -> usize {
        let pending = self.timers.borrow_mut().drain(..).count();
        let in_flight = self.in_flight.borrow();
        let mut cancelled = self.cancelled.borrow_mut();
        let newly_cancelled = in_flight
            .iter()
            .filter(|id| cancelled.insert(**id))
            .count();
        pending + newly_cancelled
    }

    /// Returns the channel raised at the start of every tick.
    pub fn update(&self) -> Relay<FrameTime> {
        self.update.relay()
    }

    /// Returns the channel raised at the end of every tick.
    pub fn late_update(&self) -> Relay<FrameTime> {
        self.late_update.relay()
    }

    /// Returns the number of the last tick, or zero before the first one.
    pub fn frame(&self) -> u64 {
        self.frame.get()
    }

    /// Returns the total time the scheduler has been advanced by.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    /// Returns the number of timers waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Removes every per-frame listener and every pending timer.
    pub fn clear(&self) {
        self.update.clear();
        self.late_update.clear();
        self.cancel_all();
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("frame", &self.frame.get())
            .field("elapsed", &self.elapsed.get())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(10);

    fn log() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_tick_order() {
        let scheduler = FrameScheduler::new();
        let calls = log();

        let sink = Rc::clone(&calls);
        scheduler
            .late_update()
            .listen(move |t: &FrameTime| sink.borrow_mut().push(format!("late {}", t.frame)));
        let sink = Rc::clone(&calls);
        scheduler
            .update()
            .listen(move |t: &FrameTime| sink.borrow_mut().push(format!("update {}", t.frame)));
        let sink = Rc::clone(&calls);
        scheduler.after(Duration::ZERO, move || sink.borrow_mut().push("timer".into()));

        scheduler.tick(FRAME);
        assert_eq!(*calls.borrow(), vec!["update 1", "timer", "late 1"]);
    }

    #[test]
    fn test_frame_time_accumulates() {
        let scheduler = FrameScheduler::new();
        let last = Rc::new(Cell::new(FrameTime::default()));
        let sink = Rc::clone(&last);
        scheduler.update().listen(move |t: &FrameTime| sink.set(*t));

        scheduler.tick(FRAME);
        scheduler.tick(FRAME * 2);
        assert_eq!(
            last.get(),
            FrameTime {
                delta: FRAME * 2,
                elapsed: FRAME * 3,
                frame: 2
            }
        );
        assert_eq!(scheduler.frame(), 2);
        assert_eq!(scheduler.elapsed(), FRAME * 3);
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let scheduler = FrameScheduler::new();
        let calls = log();
        for (name, ms) in [("c", 30u64), ("a", 10), ("b", 20)] {
            let sink = Rc::clone(&calls);
            scheduler.after(Duration::from_millis(ms), move || {
                sink.borrow_mut().push(name.to_string())
            });
        }

        scheduler.tick(Duration::from_millis(50));
        assert_eq!(*calls.borrow(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_repeating_timer_keeps_phase() {
        let scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        scheduler
            .every(Duration::from_millis(25), move || sink.set(sink.get() + 1))
            .unwrap();

        // 10, 20: nothing. 30: fires (due at 25). 40: nothing. 50: fires.
        for _ in 0..5 {
            scheduler.tick(FRAME);
        }
        assert_eq!(count.get(), 2);

        // A long frame only fires once.
        scheduler.tick(Duration::from_millis(100));
        assert_eq!(count.get(), 3);
        assert_eq!(scheduler.pending_timers(), 1);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let scheduler = FrameScheduler::new();
        assert_eq!(
            scheduler.every(Duration::ZERO, || {}),
            Err(ScheduleError::ZeroInterval)
        );
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_cancel() {
        let scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        let id = scheduler.after(FRAME, move || sink.set(sink.get() + 1));

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        scheduler.tick(FRAME);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_repeating_timer_cancels_itself() {
        let scheduler = Rc::new(FrameScheduler::new());
        let count = Rc::new(Cell::new(0));
        let own_id = Rc::new(Cell::new(None));

        let weak = Rc::downgrade(&scheduler);
        let (sink, id_slot) = (Rc::clone(&count), Rc::clone(&own_id));
        let id = scheduler
            .every(FRAME, move || {
                sink.set(sink.get() + 1);
                if sink.get() == 2 {
                    if let (Some(scheduler), Some(id)) = (weak.upgrade(), id_slot.get()) {
                        assert!(scheduler.cancel(id));
                    }
                }
            })
            .unwrap();
        own_id.set(Some(id));

        for _ in 0..4 {
            scheduler.tick(FRAME);
        }
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_cancel_timer_due_later_in_same_tick() {
        let scheduler = Rc::new(FrameScheduler::new());
        let later_runs = Rc::new(Cell::new(0));
        let cancel_result = Rc::new(Cell::new(None));

        let sink = Rc::clone(&later_runs);
        let later = scheduler
            .every(Duration::from_millis(20), move || sink.set(sink.get() + 1))
            .unwrap();

        let (weak, result) = (Rc::downgrade(&scheduler), Rc::clone(&cancel_result));
        scheduler.after(Duration::from_millis(10), move || {
            if let Some(scheduler) = weak.upgrade() {
                result.set(Some(scheduler.cancel(later)));
            }
        });

        scheduler.tick(Duration::from_millis(50));
        assert_eq!(cancel_result.get(), Some(true));
        assert_eq!(later_runs.get(), 0);
        assert_eq!(scheduler.pending_timers(), 0, "a cancelled repeat is not requeued");
        assert!(!scheduler.cancel(later));
    }

    #[test]
    fn test_cancel_all_from_callback() {
        let scheduler = Rc::new(FrameScheduler::new());
        let runs = Rc::new(Cell::new(0));
        let cancelled = Rc::new(Cell::new(0));

        let (weak, count) = (Rc::downgrade(&scheduler), Rc::clone(&cancelled));
        scheduler.after(FRAME, move || {
            if let Some(scheduler) = weak.upgrade() {
                count.set(scheduler.cancel_all());
            }
        });
        for delay in [FRAME, FRAME * 5] {
            let sink = Rc::clone(&runs);
            scheduler.after(delay, move || sink.set(sink.get() + 1));
        }

        scheduler.tick(FRAME);
        assert_eq!(cancelled.get(), 2);
        assert_eq!(runs.get(), 0);
        scheduler.tick(FRAME * 10);
        assert_eq!(runs.get(), 0);
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_one_shot_cannot_cancel_itself_after_starting() {
        let scheduler = Rc::new(FrameScheduler::new());
        let result = Rc::new(Cell::new(None));
        let own_id = Rc::new(Cell::new(None));

        let (weak, sink, id_slot) = (
            Rc::downgrade(&scheduler),
            Rc::clone(&result),
            Rc::clone(&own_id),
        );
        let id = scheduler.after(FRAME, move || {
            if let (Some(scheduler), Some(id)) = (weak.upgrade(), id_slot.get()) {
                sink.set(Some(scheduler.cancel(id)));
            }
        });
        own_id.set(Some(id));

        scheduler.tick(FRAME);
        assert_eq!(result.get(), Some(false));
    }

    #[test]
    fn test_timer_scheduled_from_timer_waits_a_tick() {
        let scheduler = Rc::new(FrameScheduler::new());
        let calls = log();

        let weak = Rc::downgrade(&scheduler);
        let sink = Rc::clone(&calls);
        scheduler.after(Duration::ZERO, move || {
            sink.borrow_mut().push("outer".into());
            let inner = Rc::clone(&sink);
            if let Some(scheduler) = weak.upgrade() {
                scheduler.after(Duration::ZERO, move || inner.borrow_mut().push("inner".into()));
            }
        });

        scheduler.tick(FRAME);
        assert_eq!(*calls.borrow(), vec!["outer"]);
        scheduler.tick(FRAME);
        assert_eq!(*calls.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_clear_removes_everything() {
        let scheduler = FrameScheduler::new();
        scheduler.update().listen(|_| {});
        scheduler.after(FRAME, || {});
        scheduler.clear();
        assert!(scheduler.update().is_empty());
        assert_eq!(scheduler.pending_timers(), 0);
    }
}
