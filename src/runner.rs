//! Non-interactive modes: the filtering run and the upcoming-events report.

use crate::client::CalendarSource;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::filter;
use crate::ics;
use crate::model::EventRecord;
use crate::upcoming::{ReportWindow, upcoming};
use chrono::{DateTime, Local};
use log::info;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    pub retained: usize,
    pub dropped: usize,
    pub annotated: usize,
}

fn origin_url(config: &Config) -> Result<&str> {
    let url = config.origin_url.trim();
    if url.is_empty() {
        return Err(Error::Config(
            "origin_url is not set; run `unical configure` first".to_string(),
        ));
    }
    Ok(url)
}

/// Fetches the feed, filters and annotates it, and writes the result to
/// `output` (parent directories are created).
pub async fn run_filter<S: CalendarSource>(
    config: &Config,
    source: &S,
    output: &Path,
) -> Result<FilterReport> {
    let calendar = source.fetch(origin_url(config)?).await?;
    let events = ics::events(&calendar);
    let outcome = filter(events, &config.blocklist, &config.notes);

    if outcome.annotated > 0 {
        info!("Added notes to {} events", outcome.annotated);
    }

    let filtered = ics::rebuild(&calendar, &outcome.events);
    if let Some(dir) = output.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    fs::write(output, ics::serialize(&filtered)).map_err(|e| Error::io(output, e))?;

    info!(
        "Filtered iCal saved to {} ({} kept, {} dropped)",
        output.display(),
        outcome.events.len(),
        outcome.dropped
    );

    Ok(FilterReport {
        retained: outcome.events.len(),
        dropped: outcome.dropped,
        annotated: outcome.annotated,
    })
}

/// Distinct upcoming events in `window`, earliest first. Writes nothing.
pub async fn run_upcoming<S: CalendarSource>(
    config: &Config,
    source: &S,
    window: &ReportWindow,
    now: DateTime<Local>,
) -> Result<Vec<EventRecord>> {
    let (cutoff, horizon) = window.bounds(now)?;
    let calendar = source.fetch(origin_url(config)?).await?;
    let events = ics::events(&calendar);
    let found = upcoming(&events, cutoff, Some(horizon));
    info!("Collected {} upcoming events", found.len());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use icalendar::Calendar;
    use std::collections::BTreeMap;

    const FEED: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//Test//EN\r
BEGIN:VEVENT\r
UID:1\r
SUMMARY:Seminar\r
DESCRIPTION:Room 4\r
DTSTART:20300104T090000Z\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:2\r
SUMMARY:Sport\r
DTSTART:20300105T090000Z\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:3\r
SUMMARY:Seminar\r
DTSTART:20300111T090000Z\r
END:VEVENT\r
END:VCALENDAR\r
";

    struct StaticSource(&'static str);

    impl CalendarSource for StaticSource {
        async fn fetch(&self, _url: &str) -> Result<Calendar> {
            ics::parse(self.0)
        }
    }

    struct FailingSource;

    impl CalendarSource for FailingSource {
        async fn fetch(&self, url: &str) -> Result<Calendar> {
            Err(Error::Fetch(format!("{} unreachable", url)))
        }
    }

    fn config(blocklist: &[&str], notes: &[(&str, &str)]) -> Config {
        Config {
            origin_url: "https://example.com/feed.ics".to_string(),
            blocklist: blocklist.iter().map(|s| s.to_string()).collect(),
            notes: notes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn test_run_filter_writes_filtered_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("ical").join("filtered_calendar.ics");
        let cfg = config(&["Sport"], &[("seminar", "Bring laptop")]);

        let report = run_filter(&cfg, &StaticSource(FEED), &out).await.unwrap();
        assert_eq!(
            report,
            FilterReport {
                retained: 2,
                dropped: 1,
                annotated: 2
            }
        );

        let written = std::fs::read_to_string(&out).unwrap();
        let events = ics::events(&ics::parse(&written).unwrap());
        assert!(events.iter().all(|e| e.title == "Seminar"));
        assert!(events[0].description.contains("--- Notes ---"));
    }

    #[tokio::test]
    async fn test_run_filter_requires_url() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::default();
        let err = run_filter(&cfg, &StaticSource(FEED), &dir.path().join("x.ics"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_run_filter_fetch_error_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.ics");
        let err = run_filter(&config(&[], &[]), &FailingSource, &out)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_run_upcoming_dedups_in_window() {
        let now = Local.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let window = ReportWindow::from_dates("2030-01-01", "2030-01-31").unwrap();
        let found = run_upcoming(&config(&[], &[]), &StaticSource(FEED), &window, now)
            .await
            .unwrap();
        let titles: Vec<_> = found.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Seminar", "Sport"]);
    }
}
