//! Distinct upcoming events, one per title.
//!
//! Identity is the title alone: every instance of a recurring series shares
//! its title and collapses to the next occurrence. Two unrelated events that
//! happen to share a title are merged the same way; this is a known
//! limitation.

use crate::error::{Error, Result};
use crate::ics::start_of_day;
use crate::model::EventRecord;
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use std::collections::HashMap;

/// Where the index starts counting "upcoming".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffPolicy {
    /// Local midnight of the current day. Used by the event browser.
    StartOfToday,
    /// The exact current instant. Used by the report.
    Now,
}

impl CutoffPolicy {
    pub fn resolve(self, now: DateTime<Local>) -> DateTime<Utc> {
        let now_utc = now.with_timezone(&Utc);
        match self {
            CutoffPolicy::Now => now_utc,
            CutoffPolicy::StartOfToday => start_of_day(now.date_naive()).unwrap_or(now_utc),
        }
    }
}

/// Events starting at or after `cutoff` (and before `horizon`, if given),
/// deduplicated by title to the earliest qualifying instance and sorted by
/// start time.
pub fn upcoming(
    events: &[EventRecord],
    cutoff: DateTime<Utc>,
    horizon: Option<DateTime<Utc>>,
) -> Vec<EventRecord> {
    let mut kept: Vec<(usize, DateTime<Utc>, &EventRecord)> = Vec::new();
    let mut by_title: HashMap<&str, usize> = HashMap::new();

    for (pos, event) in events.iter().enumerate() {
        if event.title.is_empty() {
            continue;
        }
        let Some(start) = event.start else {
            continue;
        };
        if start < cutoff {
            continue;
        }
        if let Some(h) = horizon
            && start >= h
        {
            continue;
        }

        match by_title.get(event.title.as_str()) {
            Some(&slot) => {
                if start < kept[slot].1 {
                    kept[slot] = (pos, start, event);
                }
            }
            None => {
                by_title.insert(event.title.as_str(), kept.len());
                kept.push((pos, start, event));
            }
        }
    }

    kept.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    kept.into_iter().map(|(_, _, e)| e.clone()).collect()
}

/// The time window of the upcoming-events report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportWindow {
    /// From now until `days` later.
    NextDays(i64),
    /// Whole local days, both ends inclusive.
    Dates { from: NaiveDate, to: NaiveDate },
}

impl Default for ReportWindow {
    fn default() -> Self {
        ReportWindow::NextDays(7)
    }
}

impl ReportWindow {
    /// Parses a `YYYY-MM-DD YYYY-MM-DD` pair.
    pub fn from_dates(from: &str, to: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| Error::Config(format!("Invalid date {:?}: {}", s, e)))
        };
        let (from, to) = (parse(from)?, parse(to)?);
        if to < from {
            return Err(Error::Config(format!(
                "End date {} is before start date {}",
                to, from
            )));
        }
        Ok(ReportWindow::Dates { from, to })
    }

    /// `(cutoff, horizon)` for this window.
    pub fn bounds(&self, now: DateTime<Local>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            ReportWindow::NextDays(days) => {
                let cutoff = CutoffPolicy::Now.resolve(now);
                Ok((cutoff, cutoff + Duration::days(*days)))
            }
            ReportWindow::Dates { from, to } => {
                let bad = || Error::Config("Date window is not representable".to_string());
                let cutoff = start_of_day(*from).ok_or_else(bad)?;
                let horizon = to
                    .succ_opt()
                    .and_then(start_of_day)
                    .ok_or_else(bad)?;
                Ok((cutoff, horizon))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use icalendar::{Component, Event};

    fn at(title: &str, start: Option<DateTime<Utc>>) -> EventRecord {
        let mut e = Event::new();
        e.summary(title);
        EventRecord::new(e, start)
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_recurring_series_collapses_to_next_occurrence() {
        let now = day(10);
        let events = vec![
            at("Math 101", Some(day(11))),
            at("Math 101", Some(day(28))),
        ];
        let out = upcoming(&events, now, None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Math 101");
        assert_eq!(out[0].start, Some(day(11)));
    }

    #[test]
    fn test_past_instance_excluded_future_kept() {
        let events = vec![at("Lab", Some(day(5))), at("Lab", Some(day(15)))];
        let out = upcoming(&events, day(10), None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start, Some(day(15)));
    }

    #[test]
    fn test_earliest_wins_regardless_of_order() {
        let events = vec![
            at("Lab", Some(day(20))),
            at("Lab", Some(day(12))),
            at("Lab", Some(day(16))),
        ];
        let out = upcoming(&events, day(10), None);
        assert_eq!(out[0].start, Some(day(12)));
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let events = vec![at("Exact", Some(day(10)))];
        assert_eq!(upcoming(&events, day(10), None).len(), 1);
    }

    #[test]
    fn test_horizon_is_exclusive() {
        let events = vec![at("In", Some(day(11))), at("Edge", Some(day(17)))];
        let out = upcoming(&events, day(10), Some(day(17)));
        let titles: Vec<_> = out.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["In"]);
    }

    #[test]
    fn test_missing_start_and_empty_title_skipped() {
        let events = vec![
            at("NoStart", None),
            at("", Some(day(12))),
            at("Ok", Some(day(12))),
        ];
        let out = upcoming(&events, day(10), None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Ok");
    }

    #[test]
    fn test_sorted_by_start_ties_by_encounter() {
        let events = vec![
            at("C", Some(day(14))),
            at("B", Some(day(12))),
            at("A", Some(day(12))),
        ];
        let out = upcoming(&events, day(10), None);
        let titles: Vec<_> = out.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_start_of_today_precedes_now() {
        let now = Local.with_ymd_and_hms(2030, 3, 10, 15, 30, 0).unwrap();
        let today = CutoffPolicy::StartOfToday.resolve(now);
        assert!(today <= CutoffPolicy::Now.resolve(now));
        assert_eq!(
            today.with_timezone(&Local).date_naive(),
            now.date_naive()
        );
    }

    #[test]
    fn test_report_window_from_dates() {
        let w = ReportWindow::from_dates("2030-03-01", "2030-03-07").unwrap();
        let (cutoff, horizon) = w.bounds(Local::now()).unwrap();
        assert!(cutoff < horizon);
        assert_eq!(
            horizon.with_timezone(&Local).date_naive(),
            NaiveDate::from_ymd_opt(2030, 3, 8).unwrap()
        );
    }

    #[test]
    fn test_report_window_rejects_reversed_and_garbage() {
        assert!(ReportWindow::from_dates("2030-03-07", "2030-03-01").is_err());
        assert!(ReportWindow::from_dates("03/01/2030", "2030-03-07").is_err());
    }
}
