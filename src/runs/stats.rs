//! Uptime and response-time summary over a window of outcomes.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::probe::ProbeOutcome;

/// Days covered by the per-day uptime series.
pub const DAILY_UPTIME_DAYS: i64 = 30;
/// Response times older than this are left out of the average.
pub const RESPONSE_TIME_WINDOW_HOURS: i64 = 24;

const DEGRADED_BELOW: f64 = 99.0;
const DOWN_BELOW: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LastStatus {
    Operational,
    Down,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Up,
    Degraded,
    Down,
}

impl DayStatus {
    fn from_uptime(uptime_percent: f64) -> Self {
        if uptime_percent < DOWN_BELOW {
            DayStatus::Down
        } else if uptime_percent < DEGRADED_BELOW {
            DayStatus::Degraded
        } else {
            DayStatus::Up
        }
    }
}

/// One UTC calendar day of the uptime bar. Days without checks count as 100%.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyUptime {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub uptime_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub total_checks: usize,
    pub successful_checks: usize,
    /// 100.0 when there are no checks yet.
    pub uptime_percent: f64,
    /// Mean over the last 24h of outcomes that carry a positive response
    /// time; 0 if none.
    pub avg_response_time_ms: u64,
    pub last_check: Option<DateTime<Utc>>,
    pub last_status: LastStatus,
    pub last_status_code: Option<u16>,
    /// Oldest day first, ending with today.
    pub daily_uptime: Vec<DailyUptime>,
}

impl RunStats {
    /// Summarize outcomes given newest first.
    pub fn from_recent(runs: &[ProbeOutcome]) -> Self {
        Self::at(runs, Utc::now())
    }

    /// Summarize outcomes given newest first, as seen at `now`.
    pub fn at(runs: &[ProbeOutcome], now: DateTime<Utc>) -> Self {
        let total_checks = runs.len();
        let successful_checks = runs.iter().filter(|r| r.success).count();

        let cutoff = now - Duration::hours(RESPONSE_TIME_WINDOW_HOURS);
        let timings: Vec<u64> = runs
            .iter()
            .filter(|r| r.timestamp >= cutoff)
            .filter_map(|r| r.response_time_ms)
            .filter(|ms| *ms > 0)
            .collect();
        let avg_response_time_ms = if timings.is_empty() {
            0
        } else {
            (timings.iter().sum::<u64>() as f64 / timings.len() as f64).round() as u64
        };

        let last = runs.first();
        Self {
            total_checks,
            successful_checks,
            uptime_percent: uptime(successful_checks, total_checks),
            avg_response_time_ms,
            last_check: last.map(|r| r.timestamp),
            last_status: match last {
                Some(r) if r.success => LastStatus::Operational,
                Some(_) => LastStatus::Down,
                None => LastStatus::Unknown,
            },
            last_status_code: last.and_then(|r| r.status_code),
            daily_uptime: daily_uptime(runs, now),
        }
    }
}

fn daily_uptime(runs: &[ProbeOutcome], now: DateTime<Utc>) -> Vec<DailyUptime> {
    let today = now.date_naive();
    (0..DAILY_UPTIME_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let (total, ok) = runs
                .iter()
                .filter(|r| r.timestamp.date_naive() == date)
                .fold((0, 0), |(total, ok), r| (total + 1, ok + usize::from(r.success)));
            let uptime_percent = uptime(ok, total);
            DailyUptime {
                date,
                status: DayStatus::from_uptime(uptime_percent),
                uptime_percent,
            }
        })
        .collect()
}

fn uptime(successful: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        round2(successful as f64 / total as f64 * 100.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aged(mut outcome: ProbeOutcome, now: DateTime<Utc>, age: Duration) -> ProbeOutcome {
        outcome.timestamp = now - age;
        outcome
    }

    #[test]
    fn test_empty_window() {
        let stats = RunStats::from_recent(&[]);
        assert_eq!(stats.total_checks, 0);
        assert_eq!(stats.uptime_percent, 100.0);
        assert_eq!(stats.avg_response_time_ms, 0);
        assert_eq!(stats.last_status, LastStatus::Unknown);
        assert!(stats.last_check.is_none());
        assert_eq!(stats.daily_uptime.len(), 30);
        assert!(stats.daily_uptime.iter().all(|d| d.status == DayStatus::Up));
    }

    #[test]
    fn test_mixed_window() {
        // newest first
        let runs = vec![
            ProbeOutcome::from_status("m".into(), 200, 503, 30),
            ProbeOutcome::failure("m".into(), "timed out"),
            ProbeOutcome::from_status("m".into(), 200, 200, 10),
        ];
        let stats = RunStats::from_recent(&runs);
        assert_eq!(stats.total_checks, 3);
        assert_eq!(stats.successful_checks, 1);
        assert_eq!(stats.uptime_percent, 33.33);
        assert_eq!(stats.avg_response_time_ms, 20);
        assert_eq!(stats.last_status, LastStatus::Down);
        assert_eq!(stats.last_status_code, Some(503));
    }

    #[test]
    fn test_zero_timings_ignored() {
        let runs = vec![
            ProbeOutcome::from_status("m".into(), 200, 200, 0),
            ProbeOutcome::from_status("m".into(), 200, 200, 15),
        ];
        let stats = RunStats::from_recent(&runs);
        assert_eq!(stats.avg_response_time_ms, 15);
        assert_eq!(stats.last_status, LastStatus::Operational);
    }

    #[test]
    fn test_average_covers_last_day_only() {
        let now = Utc::now();
        let runs = vec![
            aged(ProbeOutcome::from_status("m".into(), 200, 200, 10), now, Duration::minutes(1)),
            aged(ProbeOutcome::from_status("m".into(), 200, 200, 1000), now, Duration::days(5)),
        ];

        let stats = RunStats::at(&runs, now);

        assert_eq!(stats.avg_response_time_ms, 10);
        assert_eq!(stats.total_checks, 2);
    }

    #[test]
    fn test_daily_uptime_thresholds() {
        let now = "2026-10-18T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut runs = Vec::new();
        // today: 100 checks, 2 failed -> 98% degraded
        for i in 0..100 {
            let outcome = if i < 2 {
                ProbeOutcome::failure("m".into(), "refused")
            } else {
                ProbeOutcome::from_status("m".into(), 200, 200, 20)
            };
            runs.push(aged(outcome, now, Duration::minutes(i)));
        }
        // two days ago: 1 of 3 failed -> 66.67% down
        for i in 0..3 {
            let outcome = if i == 0 {
                ProbeOutcome::failure("m".into(), "refused")
            } else {
                ProbeOutcome::from_status("m".into(), 200, 200, 20)
            };
            runs.push(aged(outcome, now, Duration::days(2) + Duration::minutes(i)));
        }

        let stats = RunStats::at(&runs, now);
        let days = &stats.daily_uptime;

        assert_eq!(days.len(), 30);
        assert_eq!(days[29].date, now.date_naive());
        assert_eq!(days[0].date, now.date_naive() - Duration::days(29));

        assert_eq!(days[29].uptime_percent, 98.0);
        assert_eq!(days[29].status, DayStatus::Degraded);
        assert_eq!(days[28].uptime_percent, 100.0);
        assert_eq!(days[28].status, DayStatus::Up);
        assert_eq!(days[27].uptime_percent, 66.67);
        assert_eq!(days[27].status, DayStatus::Down);
    }

    #[test]
    fn test_day_status_boundaries() {
        assert_eq!(DayStatus::from_uptime(99.0), DayStatus::Up);
        assert_eq!(DayStatus::from_uptime(98.99), DayStatus::Degraded);
        assert_eq!(DayStatus::from_uptime(90.0), DayStatus::Degraded);
        assert_eq!(DayStatus::from_uptime(89.99), DayStatus::Down);
    }
}
