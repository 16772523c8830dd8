//! Unit tests for evaluation cycles

use std::str::FromStr;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use cron::Schedule;
use signalwatch::models::Cycle;

#[test]
fn test_labels_round_trip() {
    for cycle in Cycle::ALL {
        assert_eq!(cycle.as_str().parse::<Cycle>().unwrap(), cycle);
        assert_eq!(cycle.to_string(), cycle.as_str());
    }
}

#[test]
fn test_month_and_minute_labels_are_case_sensitive() {
    assert_eq!("1M".parse::<Cycle>().unwrap(), Cycle::OneMonth);
    assert!("1m".parse::<Cycle>().is_err());
    assert!("2h".parse::<Cycle>().is_err());
}

#[test]
fn test_durations() {
    assert_eq!(Cycle::FiveMinutes.duration(), Duration::from_secs(300));
    assert_eq!(Cycle::OneHour.duration(), Duration::from_secs(3600));
    assert_eq!(Cycle::FourHours.duration(), Duration::from_secs(4 * 3600));
    assert_eq!(Cycle::OneWeek.duration(), Duration::from_secs(7 * 86_400));
    assert_eq!(Cycle::OneMonth.duration(), Duration::from_secs(30 * 86_400));
}

#[test]
fn test_cron_expressions_parse() {
    for cycle in Cycle::ALL {
        assert!(
            Schedule::from_str(cycle.cron_expression()).is_ok(),
            "cron for {} should parse",
            cycle
        );
    }
}

#[test]
fn test_cron_fires_on_cycle_boundaries() {
    let after = Utc.with_ymd_and_hms(2026, 10, 18, 13, 7, 30).unwrap();

    let next = |cycle: Cycle| {
        Schedule::from_str(cycle.cron_expression())
            .unwrap()
            .after(&after)
            .next()
            .unwrap()
    };

    assert_eq!(next(Cycle::FifteenMinutes), Utc.with_ymd_and_hms(2026, 10, 18, 13, 15, 0).unwrap());
    assert_eq!(next(Cycle::OneHour), Utc.with_ymd_and_hms(2026, 10, 18, 14, 0, 0).unwrap());
    assert_eq!(next(Cycle::FourHours), Utc.with_ymd_and_hms(2026, 10, 18, 16, 0, 0).unwrap());
    assert_eq!(next(Cycle::OneDay), Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
    assert_eq!(next(Cycle::OneMonth), Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap());
}

#[test]
fn test_serde_uses_labels() {
    assert_eq!(serde_json::to_string(&Cycle::FourHours).unwrap(), "\"4h\"");
    let cycle: Cycle = serde_json::from_str("\"15m\"").unwrap();
    assert_eq!(cycle, Cycle::FifteenMinutes);
    assert!(serde_json::from_str::<Cycle>("\"3h\"").is_err());
}

#[test]
fn test_next_open_follows_calendar_months() {
    let october = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
    assert_eq!(
        Cycle::OneMonth.next_open(october),
        Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap()
    );

    let february = Utc.with_ymd_and_hms(2027, 2, 1, 0, 0, 0).unwrap();
    assert_eq!(
        Cycle::OneMonth.next_open(february),
        Utc.with_ymd_and_hms(2027, 3, 1, 0, 0, 0).unwrap()
    );

    assert_eq!(
        Cycle::FourHours.next_open(october),
        Utc.with_ymd_and_hms(2026, 10, 1, 4, 0, 0).unwrap()
    );
}
