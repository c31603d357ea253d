//! Tick driver
//!
//! Detections reach the tracker from two triggers: a periodic timer and
//! manual refresh requests. The driver funnels both into one consumer loop
//! reading a command channel, so exactly one ingest is in flight at a time.
//!
//! Settings changes travel through the same channel. A threshold change only
//! affects events ingested after it is processed. Only [`Command::Quit`] ends
//! a timed session; a closed channel just means no more manual input.

use crate::config::{validate_refresh_interval, validate_threshold, TrackerConfig};
use crate::generator::DetectionSource;
use crate::shared::SharedTracker;
use crate::tracker::Snapshot;
use crate::types::{Event, Result, Timestamp};
use chrono::Local;
use serde::Serialize;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Requests accepted by [`Driver::run`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Manual refresh: ingest one detection now
    Refresh,
    /// Change the alert threshold for future ingests
    SetThreshold(f64),
    /// Turn periodic ticks on or off
    SetAutoRefresh(bool),
    /// Change the delay between periodic ticks (seconds)
    SetInterval(f64),
    /// Stop the run loop
    Quit,
}

/// What caused a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trigger {
    Timer,
    Manual,
}

/// One completed tick, as handed to the `run` callback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub trigger: Trigger,
    pub event: Event,
    /// Threshold in force when the event was ingested
    pub threshold: f64,
    /// Tracker state right after the ingest (`entries[0]` is `event`)
    pub snapshot: Snapshot,
}

/// Counters kept by the driver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriverStats {
    pub timer_ticks: u64,
    pub manual_ticks: u64,
    pub rejected_commands: u64,
}

impl DriverStats {
    pub fn total_ticks(&self) -> u64 {
        self.timer_ticks + self.manual_ticks
    }
}

/// Single consumer that pulls detections from a source into a tracker
pub struct Driver<S> {
    tracker: SharedTracker,
    source: S,
    threshold: f64,
    auto_refresh: bool,
    refresh_interval: Duration,
    stats: DriverStats,
}

impl<S: DetectionSource> Driver<S> {
    /// Create a driver using the threshold and interval from `config`
    ///
    /// Automatic refresh starts enabled.
    pub fn new(tracker: SharedTracker, source: S, config: &TrackerConfig) -> Result<Self> {
        config.validate()?;
        let refresh_interval = validate_refresh_interval(config.refresh_interval_secs)?;

        Ok(Self {
            tracker,
            source,
            threshold: config.confidence_threshold,
            auto_refresh: true,
            refresh_interval,
            stats: DriverStats::default(),
        })
    }

    /// Builder method: enable or disable periodic ticks
    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn stats(&self) -> &DriverStats {
        &self.stats
    }

    pub fn tracker(&self) -> &SharedTracker {
        &self.tracker
    }

    /// Produce and ingest exactly one detection
    pub fn tick(&mut self, trigger: Trigger, now: Timestamp) -> Event {
        let detection = self.source.next_detection();
        let event = self.tracker.ingest(detection.category, detection.confidence, self.threshold, now);
        self.count_tick(trigger);
        event
    }

    /// Like [`tick`](Self::tick), with the snapshot taken under the same lock
    fn record(&mut self, trigger: Trigger, now: Timestamp) -> Tick {
        let detection = self.source.next_detection();
        let (event, snapshot) = self.tracker.ingest_and_snapshot(
            detection.category,
            detection.confidence,
            self.threshold,
            now,
        );
        self.count_tick(trigger);

        Tick {
            trigger,
            event,
            threshold: self.threshold,
            snapshot,
        }
    }

    fn count_tick(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::Timer => self.stats.timer_ticks += 1,
            Trigger::Manual => self.stats.manual_ticks += 1,
        }
    }

    /// Change the threshold used for future ingests
    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        validate_threshold(threshold)?;
        log::info!("Confidence threshold changed: {:.2} -> {:.2}", self.threshold, threshold);
        self.threshold = threshold;
        Ok(())
    }

    /// Change the delay between periodic ticks
    pub fn set_interval(&mut self, secs: f64) -> Result<()> {
        let interval = validate_refresh_interval(secs)?;
        log::info!("Refresh interval changed: {:?} -> {:?}", self.refresh_interval, interval);
        self.refresh_interval = interval;
        Ok(())
    }

    /// Apply one command, returning the event if it caused a tick
    ///
    /// `Quit` only means something to [`run`](Self::run) and is a no-op here.
    pub fn apply(&mut self, command: Command, now: Timestamp) -> Option<Event> {
        match command {
            Command::Refresh => Some(self.tick(Trigger::Manual, now)),
            Command::SetThreshold(threshold) => {
                if let Err(e) = self.set_threshold(threshold) {
                    log::warn!("Ignoring threshold change: {}", e);
                    self.stats.rejected_commands += 1;
                }
                None
            }
            Command::SetInterval(secs) => {
                if let Err(e) = self.set_interval(secs) {
                    log::warn!("Ignoring interval change: {}", e);
                    self.stats.rejected_commands += 1;
                }
                None
            }
            Command::SetAutoRefresh(enabled) => {
                log::info!("Auto refresh {}", if enabled { "enabled" } else { "disabled" });
                self.auto_refresh = enabled;
                None
            }
            Command::Quit => None,
        }
    }

    /// Consume commands and timer ticks until `Quit` or `max_ticks`
    ///
    /// While auto refresh is on, a timer tick fires immediately and then every
    /// refresh interval; commands arriving in between do not reset the timer,
    /// except `SetInterval`, which restarts it. Once every sender is dropped
    /// the timer keeps running; with auto refresh off nothing can tick any
    /// more, so the loop ends.
    pub fn run<F>(&mut self, commands: Receiver<Command>, max_ticks: Option<u64>, mut on_tick: F)
    where
        F: FnMut(&Tick),
    {
        log::info!(
            "Driver started (threshold {:.2}, interval {:?}, auto refresh: {})",
            self.threshold,
            self.refresh_interval,
            self.auto_refresh
        );

        let mut commands = Some(commands);
        let mut next_timer_tick = Instant::now();
        let mut was_auto = self.auto_refresh;

        loop {
            if max_ticks.is_some_and(|max| self.stats.total_ticks() >= max) {
                log::debug!("Tick limit reached");
                break;
            }

            if self.auto_refresh && !was_auto {
                next_timer_tick = Instant::now();
            }
            was_auto = self.auto_refresh;

            let received = match (&commands, self.auto_refresh) {
                (Some(rx), true) => {
                    let wait = next_timer_tick.saturating_duration_since(Instant::now());
                    match rx.recv_timeout(wait) {
                        Ok(command) => Some(command),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => {
                            log::debug!("Command channel closed, continuing on timer");
                            commands = None;
                            continue;
                        }
                    }
                }
                (Some(rx), false) => match rx.recv() {
                    Ok(command) => Some(command),
                    Err(_) => {
                        log::debug!("Command channel closed with auto refresh off");
                        break;
                    }
                },
                (None, true) => {
                    thread::sleep(next_timer_tick.saturating_duration_since(Instant::now()));
                    None
                }
                (None, false) => break,
            };

            let tick = match received {
                Some(Command::Quit) => {
                    log::info!("Quit requested");
                    break;
                }
                Some(Command::Refresh) => Some(self.record(Trigger::Manual, Local::now())),
                Some(command) => {
                    self.apply(command, Local::now());
                    if matches!(command, Command::SetInterval(_)) {
                        next_timer_tick = Instant::now() + self.refresh_interval;
                    }
                    None
                }
                None => {
                    next_timer_tick = Instant::now() + self.refresh_interval;
                    Some(self.record(Trigger::Timer, Local::now()))
                }
            };

            if let Some(tick) = tick {
                on_tick(&tick);
            }
        }

        log::info!(
            "Driver stopped after {} ticks ({} timer, {} manual)",
            self.stats.total_ticks(),
            self.stats.timer_ticks,
            self.stats.manual_ticks
        );
    }
}
