//! Recurring-task reset engine.
//!
//! Each tick reads the clock, stamps the store's last-check time and unchecks
//! completed tasks whose schedule names the current `HH:MM` and weekday on the
//! reference clock. Matching is exact to the minute, so the tick period must
//! not exceed one minute.

use crate::error::AppError;
use crate::model::Weekday;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use std::future::Future;
use std::time::Duration;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tokio::time::MissedTickBehavior;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(60);

pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub at: OffsetDateTime,
    pub time: String,
    pub day: Weekday,
    /// Positions of the tasks that were unchecked by this tick.
    pub reset: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetScheduler {
    offset: UtcOffset,
    interval: Duration,
}

impl Default for ResetScheduler {
    fn default() -> Self {
        Self {
            offset: UtcOffset::UTC,
            interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl ResetScheduler {
    pub fn new(offset: UtcOffset, interval: Duration) -> Result<Self, AppError> {
        if interval.is_zero() || interval > MAX_TICK_INTERVAL {
            return Err(AppError::invalid_input(format!(
                "tick interval must be between 1 and {} seconds",
                MAX_TICK_INTERVAL.as_secs()
            )));
        }
        Ok(Self { offset, interval })
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The `HH:MM` string and weekday of `now` on the reference clock.
    pub fn slot(&self, now: OffsetDateTime) -> Result<(String, Weekday), AppError> {
        let reference = now.to_offset(self.offset);
        let time = reference
            .format(format_description!("[hour]:[minute]"))
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        Ok((time, Weekday::from(reference.weekday())))
    }

    pub fn tick<S: KeyValueStore>(
        &self,
        store: &mut TaskStore<S>,
        now: OffsetDateTime,
    ) -> Result<TickReport, AppError> {
        let (time, day) = self.slot(now)?;
        store.record_check(now)?;
        let reset = store.reset_matching(&time, day)?;
        tracing::debug!(%time, %day, reset = reset.len(), "scheduler tick");

        Ok(TickReport {
            at: now,
            time,
            day,
            reset,
        })
    }

    /// Ticks immediately, then once per interval until `shutdown` resolves.
    ///
    /// A failed tick is logged and the loop keeps going. Returns the number of
    /// ticks that completed.
    pub async fn run<S, C, F, H>(
        &self,
        store: &mut TaskStore<S>,
        clock: &C,
        shutdown: F,
        mut on_tick: H,
    ) -> u64
    where
        S: KeyValueStore,
        C: Clock + ?Sized,
        F: Future<Output = ()>,
        H: FnMut(&TaskStore<S>, &TickReport),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut completed = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    match self.tick(store, clock.now()) {
                        Ok(report) => {
                            completed += 1;
                            on_tick(store, &report);
                        }
                        Err(err) => tracing::warn!(error = %err, "scheduler tick failed"),
                    }
                }
            }
        }

        tracing::debug!(ticks = completed, "scheduler stopped");
        completed
    }
}
