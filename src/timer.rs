use crate::schedule::Schedule;
use chrono::{DateTime, TimeZone, Utc};
use std::{
    sync::{
        mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError},
        Arc, Mutex, MutexGuard, PoisonError, TryLockError,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::{debug, trace};

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Blocking timer which delivers occurrences of a [`Schedule`] exactly at their time.
///
/// Delivery is a rendezvous: the timer waits until a consumer takes the current occurrence
/// before it computes the next one, so nothing piles up while nobody listens.
/// If the consumer is late, occurrences which are already in the past are skipped.
///
/// The timer stops once every [`Events`] handle has been dropped
/// or the schedule has no more occurrences.
///
/// # Examples
/// ```rust,no_run
/// use cron_forecast::{CronExpression, Result, Schedule};
///
/// fn main() -> Result<()> {
///     let schedule = Schedule::utc(CronExpression::new("*/5 * * * * ping")?);
///     let timer = schedule.timer();
///     let events = timer.events();
///     timer.spawn();
///
///     for fired in events.take(3) {
///         println!("{}: {}", fired, schedule.expression().command());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ScheduleTimer<Tz: TimeZone> {
    schedule: Schedule<Tz>,
    tx: SyncSender<DateTime<Tz>>,
    rx: Arc<Mutex<Receiver<DateTime<Tz>>>>,
}

impl<Tz: TimeZone> ScheduleTimer<Tz> {
    /// Constructs a timer bound to `schedule`, it doesn't run until [`start()`](ScheduleTimer::start)
    /// or [`spawn()`](ScheduleTimer::spawn) is called.
    pub fn new(schedule: Schedule<Tz>) -> Self {
        let (tx, rx) = mpsc::sync_channel(0);
        Self {
            schedule,
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Schedule of the timer.
    #[inline]
    pub fn schedule(&self) -> &Schedule<Tz> {
        &self.schedule
    }

    /// Returns a new handle to receive occurrences.
    ///
    /// All handles share the same channel, so each occurrence is delivered to a single one of them.
    /// Handles have to be taken before the timer is started.
    pub fn events(&self) -> Events<Tz> {
        Events {
            rx: Arc::clone(&self.rx),
        }
    }

    /// Runs the timer loop in the current thread, it returns when the timer stops.
    pub fn start(self) {
        let Self { schedule, tx, rx } = self;
        // only external handles keep the channel open
        drop(rx);

        let mut last: Option<DateTime<Tz>> = None;
        loop {
            let now = Utc::now();
            let Some(next) = schedule.next_firing(&now, last.as_ref()) else {
                debug!(expression = %schedule.expression(), "schedule has no more occurrences, timer stopped");
                return;
            };

            if let Ok(delay) = (next.naive_utc() - now.naive_utc()).to_std() {
                thread::sleep(delay);
            }

            trace!(expression = %schedule.expression(), fired = %next.naive_utc(), "timer fired");
            if tx.send(next.clone()).is_err() {
                debug!(expression = %schedule.expression(), "all event receivers are gone, timer stopped");
                return;
            }

            last = Some(next);
        }
    }
}

impl<Tz> ScheduleTimer<Tz>
where
    Tz: TimeZone + Send + 'static,
    Tz::Offset: Send,
{
    /// Runs the timer loop in a dedicated thread.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.start())
    }
}

/// Receiving side of a [`ScheduleTimer`].
///
/// It's an `Iterator` which blocks until the next occurrence and ends when the timer stops.
#[derive(Debug, Clone)]
pub struct Events<Tz: TimeZone> {
    rx: Arc<Mutex<Receiver<DateTime<Tz>>>>,
}

impl<Tz: TimeZone> Events<Tz> {
    /// Blocks until the next occurrence is fired, returns `None` if the timer has stopped.
    pub fn recv(&self) -> Option<DateTime<Tz>> {
        self.receiver().recv().ok()
    }

    /// The same as [`Events::recv()`] but waits no longer than `timeout`,
    /// including the time spent while another handle is receiving.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DateTime<Tz>> {
        let deadline = Instant::now() + timeout;
        let receiver = loop {
            if let Some(receiver) = self.try_receiver() {
                break receiver;
            }

            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return None;
            }
            thread::sleep(left.min(LOCK_POLL_INTERVAL));
        };

        let left = deadline.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(left) {
            Ok(fired) => Some(fired),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Takes an occurrence only if the timer is firing right now
    /// and no other handle is receiving at the moment.
    pub fn try_recv(&self) -> Option<DateTime<Tz>> {
        match self.try_receiver()?.try_recv() {
            Ok(fired) => Some(fired),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    fn receiver(&self) -> MutexGuard<'_, Receiver<DateTime<Tz>>> {
        self.rx.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // `None` if another handle holds the receiver
    fn try_receiver(&self) -> Option<MutexGuard<'_, Receiver<DateTime<Tz>>>> {
        match self.rx.try_lock() {
            Ok(receiver) => Some(receiver),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

impl<Tz: TimeZone> Iterator for Events<Tz> {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}
