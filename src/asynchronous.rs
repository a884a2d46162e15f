use crate::schedule::Schedule;
use chrono::{DateTime, TimeZone, Utc};
use futures::{future::FusedFuture, stream::FusedStream, Stream};
use pin_project::{pin_project, pinned_drop};
use std::{
    collections::BTreeMap,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU16, Ordering},
        mpsc::{self, RecvTimeoutError, Sender},
        OnceLock,
    },
    task::{Context, Poll, Waker},
    thread,
    time::Instant,
};
use tracing::{debug, trace};

type Serial = u16;
type ControlChannel = Sender<ControlCmd>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum FutureState {
    Idle,
    Waiting(SleepQueueKey),
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
struct SleepQueueKey {
    until: Instant,
    serial: Serial,
}

impl SleepQueueKey {
    #[inline]
    fn new(until: Instant) -> Self {
        static KEY_SERIAL: AtomicU16 = AtomicU16::new(0);

        Self {
            until,
            serial: KEY_SERIAL.fetch_add(1, Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
enum ControlCmd {
    Insert { key: SleepQueueKey, waker: Waker },
    Remove { key: SleepQueueKey },
}

/// Implements [`Future`](https://doc.rust-lang.org/core/future/trait.Future.html)
/// which sleeps until the upcoming occurrence of the schedule and resolves to that occurrence.
///
/// If it's awaited too late, it resolves immediately to the same (missed) occurrence.
///
/// May panic if the background thread (which controls all sleep and stream events) fails.
///
/// Be aware that the precision of the wake-up time is not perfect
/// due to the nature of the asynchronous Rust implementation and
/// possible aspects of the specific async runtime.
/// So it may wake up a few milliseconds later than expected.
///
/// # Examples:
/// ```rust,no_run
/// use cron_forecast::{CronExpression, Result, Schedule};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let schedule = Schedule::utc(CronExpression::new("*/5 * * * *")?);
///
///     // Wakes up at the next 5-minutes instant.
///     if let Some(sleep) = schedule.sleep() {
///         let fired = sleep.await;
///         println!("woke up at {fired}");
///     }
///
///     Ok(())
/// }
/// ```
#[pin_project(PinnedDrop)]
#[derive(Debug)]
pub struct ScheduleSleep<Tz: TimeZone> {
    occurrence: DateTime<Tz>,
    until: Instant,
    tx: ControlChannel,
    state: FutureState,
}

impl<Tz: TimeZone> ScheduleSleep<Tz> {
    fn new(now: &DateTime<Utc>, occurrence: DateTime<Tz>) -> Self {
        Self {
            until: instant_of(now, &occurrence),
            occurrence,
            tx: sleep_thread_tx().clone(),
            state: FutureState::Idle,
        }
    }

    /// Occurrence this sleep resolves to.
    #[inline]
    pub fn occurrence(&self) -> &DateTime<Tz> {
        &self.occurrence
    }
}

impl<Tz: TimeZone> Future for ScheduleSleep<Tz> {
    type Output = DateTime<Tz>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let now_inst = Instant::now();

        match *this.state {
            FutureState::Idle | FutureState::Waiting(_) if now_inst >= *this.until => {
                if let FutureState::Waiting(key) = *this.state {
                    send_cmd(this.tx, ControlCmd::Remove { key });
                }
                *this.state = FutureState::Completed;
                Poll::Ready(this.occurrence.clone())
            }
            FutureState::Idle => {
                let key = SleepQueueKey::new(*this.until);
                send_cmd(
                    this.tx,
                    ControlCmd::Insert {
                        key,
                        waker: cx.waker().clone(),
                    },
                );
                *this.state = FutureState::Waiting(key);
                Poll::Pending
            }
            FutureState::Waiting(key) => {
                // refresh the waker, the task may have been moved to another executor
                send_cmd(
                    this.tx,
                    ControlCmd::Insert {
                        key,
                        waker: cx.waker().clone(),
                    },
                );
                Poll::Pending
            }
            // Invalid runtimes may poll a completed future, it gets the same occurrence again.
            FutureState::Completed => Poll::Ready(this.occurrence.clone()),
        }
    }
}

impl<Tz: TimeZone> FusedFuture for ScheduleSleep<Tz> {
    #[inline]
    fn is_terminated(&self) -> bool {
        self.state == FutureState::Completed
    }
}

#[pinned_drop]
impl<Tz: TimeZone> PinnedDrop for ScheduleSleep<Tz> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        if let FutureState::Waiting(key) = *this.state {
            send_cmd(this.tx, ControlCmd::Remove { key });
        }
        *this.state = FutureState::Completed;
    }
}

/// Implements [`Stream`](https://docs.rs/futures/latest/futures/stream/index.html)
/// of the consecutive occurrences of the schedule.
///
/// It sleeps until the upcoming occurrence and yields it just in time.
/// Each next occurrence is computed from the wall-clock time when the previous one is consumed,
/// so occurrences which passed while nobody polled the stream are skipped, and
/// the same occurrence is never yielded twice.
///
/// The stream ends only if the schedule has no more occurrences.
///
/// May panic if the background thread (which controls all sleep and stream events) fails.
///
/// # Examples:
/// ```rust,no_run
/// use cron_forecast::{CronExpression, Result, Schedule};
/// use futures::stream::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let schedule = Schedule::utc(CronExpression::new("* * * * * echo")?);
///     let mut stream = schedule.stream().take(3);
///
///     while let Some(fired) = stream.next().await {
///         println!("{fired}: {}", schedule.expression().command());
///     }
///
///     Ok(())
/// }
/// ```
#[pin_project(PinnedDrop)]
#[derive(Debug)]
pub struct ScheduleStream<Tz: TimeZone> {
    schedule: Schedule<Tz>,
    state: FutureState,
    pending: Option<DateTime<Tz>>,
    last: Option<DateTime<Tz>>,
    tx: ControlChannel,
}

impl<Tz: TimeZone> ScheduleStream<Tz> {
    #[inline]
    fn new(schedule: Schedule<Tz>) -> Self {
        Self {
            schedule,
            state: FutureState::Idle,
            pending: None,
            last: None,
            tx: sleep_thread_tx().clone(),
        }
    }
}

impl<Tz: TimeZone> Stream for ScheduleStream<Tz> {
    type Item = DateTime<Tz>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match *this.state {
            FutureState::Idle => {
                let now = Utc::now();
                let Some(next) = this.schedule.next_firing(&now, this.last.as_ref()) else {
                    *this.state = FutureState::Completed;
                    return Poll::Ready(None);
                };

                let until = instant_of(&now, &next);
                if until <= Instant::now() {
                    *this.last = Some(next.clone());
                    return Poll::Ready(Some(next));
                }

                let key = SleepQueueKey::new(until);
                send_cmd(
                    this.tx,
                    ControlCmd::Insert {
                        key,
                        waker: cx.waker().clone(),
                    },
                );
                *this.state = FutureState::Waiting(key);
                *this.pending = Some(next);
                Poll::Pending
            }
            FutureState::Waiting(key) => {
                if key.until > Instant::now() {
                    send_cmd(
                        this.tx,
                        ControlCmd::Insert {
                            key,
                            waker: cx.waker().clone(),
                        },
                    );
                    Poll::Pending
                } else {
                    send_cmd(this.tx, ControlCmd::Remove { key });
                    *this.state = FutureState::Idle;
                    let next = this.pending.take();
                    *this.last = next.clone();
                    Poll::Ready(next)
                }
            }
            FutureState::Completed => Poll::Ready(None),
        }
    }
}

impl<Tz: TimeZone> FusedStream for ScheduleStream<Tz> {
    #[inline]
    fn is_terminated(&self) -> bool {
        self.state == FutureState::Completed
    }
}

#[pinned_drop]
impl<Tz: TimeZone> PinnedDrop for ScheduleStream<Tz> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        if let FutureState::Waiting(key) = *this.state {
            send_cmd(this.tx, ControlCmd::Remove { key });
        }
        *this.state = FutureState::Completed;
    }
}

#[inline]
fn send_cmd(tx: &ControlChannel, cmd: ControlCmd) {
    tx.send(cmd).expect("sleep control channel is closed");
}

// A single thread watches all ScheduleSleep and ScheduleStream events.
//
// BTreeMap keeps upcoming wake-up instants in order, so the thread sleeps until the first one
// or until a control command arrives, whichever is earlier.
fn sleep_thread_tx() -> &'static ControlChannel {
    static SLEEP_THREAD: OnceLock<Sender<ControlCmd>> = OnceLock::new();

    SLEEP_THREAD.get_or_init(|| {
        let (tx, control_rx) = mpsc::channel::<ControlCmd>();
        thread::spawn(move || {
            let mut sleep_map: BTreeMap<SleepQueueKey, Waker> = BTreeMap::new();
            debug!("sleeper thread started");

            loop {
                let first_wake_up = sleep_map.first_key_value().map(|(key, _)| key.until);
                let received = match first_wake_up {
                    None => control_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                    Some(until) => control_rx.recv_timeout(until.saturating_duration_since(Instant::now())),
                };

                match received {
                    Ok(ControlCmd::Insert { key, waker }) => {
                        sleep_map.insert(key, waker);
                    }
                    Ok(ControlCmd::Remove { key }) => {
                        sleep_map.remove(&key);
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if let Some((key, waker)) = sleep_map.pop_first() {
                            trace!(serial = key.serial, "waking up sleeper");
                            waker.wake();
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        debug!("sleeper control channel is closed, thread stopped");
                        return;
                    }
                }
            }
        });

        tx
    })
}

// Converts the occurrence into the monotonic clock relative to `now`,
// past occurrences are mapped to the current instant.
fn instant_of<Tz: TimeZone>(now: &DateTime<Utc>, occurrence: &DateTime<Tz>) -> Instant {
    let delay = (occurrence.naive_utc() - now.naive_utc()).to_std().unwrap_or_default();
    Instant::now() + delay
}

impl<Tz: TimeZone> Schedule<Tz> {
    /// Returns [`ScheduleSleep`] instance (wrapped into the `Option`) which implements
    /// [`Future`](https://doc.rust-lang.org/core/future/trait.Future.html).
    /// This `Future` falls asleep until the next occurrence (starting from now) and resolves to it.
    ///
    /// In case when the schedule has no upcoming occurrences, it returns `None` immediately.
    ///
    /// See [`ScheduleSleep`] for complete documentation with examples.
    pub fn sleep(&self) -> Option<ScheduleSleep<Tz>> {
        let now = Utc::now();
        let next = self.next_from(&now)?;
        Some(ScheduleSleep::new(&now, next))
    }

    /// Returns [`ScheduleStream`] instance which implements
    /// [`Stream`](https://docs.rs/futures/latest/futures/stream/index.html)
    /// as an asynchronous generator of the consecutive occurrences.
    ///
    /// See [`ScheduleStream`] for complete documentation with examples.
    pub fn stream(&self) -> ScheduleStream<Tz> {
        ScheduleStream::new(self.clone())
    }

    /// The same as [`Schedule::stream()`] but consumes its `Schedule`.
    pub fn into_stream(self) -> ScheduleStream<Tz> {
        ScheduleStream::new(self)
    }
}
