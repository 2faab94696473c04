//! Wall-clock stopwatch with named laps.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Lap {
    pub name: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct StopWatch {
    start: Instant,
    lap_start: Instant,
    lap_name: String,
    laps: Vec<Lap>,
}

impl Default for StopWatch {
    fn default() -> Self {
        Self::new("start")
    }
}

impl StopWatch {
    pub fn new(first_lap: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            lap_start: now,
            lap_name: first_lap.into(),
            laps: Vec::new(),
        }
    }

    /// Time since the watch started.
    pub fn total(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time since the current lap started.
    pub fn current_lap(&self) -> Duration {
        self.lap_start.elapsed()
    }

    pub fn current_lap_name(&self) -> &str {
        &self.lap_name
    }

    /// Close the current lap and open `next`; returns the closed lap.
    pub fn start_new_lap(&mut self, next: impl Into<String>) -> &Lap {
        let now = Instant::now();
        let closed = Lap {
            name: std::mem::replace(&mut self.lap_name, next.into()),
            elapsed: now.duration_since(self.lap_start),
        };
        self.lap_start = now;
        self.laps.push(closed);
        &self.laps[self.laps.len() - 1]
    }

    /// Closed laps plus the one still running.
    pub fn laps(&self) -> Vec<Lap> {
        let mut all = self.laps.clone();
        all.push(Lap {
            name: self.lap_name.clone(),
            elapsed: self.current_lap(),
        });
        all
    }
}

/// `1h 2m 3.50s`, dropping leading zero units.
pub fn format_duration(d: Duration, decimals: usize) -> String {
    let secs = d.as_secs_f64();
    let hours = (secs / 3600.0).floor();
    let minutes = ((secs - hours * 3600.0) / 60.0).floor();
    let rest = secs - hours * 3600.0 - minutes * 60.0;
    if hours > 0.0 {
        format!("{hours}h {minutes}m {rest:.decimals$}s")
    } else if minutes > 0.0 {
        format!("{minutes}m {rest:.decimals$}s")
    } else {
        format!("{rest:.decimals$}s")
    }
}
