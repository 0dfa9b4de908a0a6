use chrono::{DateTime, Datelike, Utc, Weekday};
use timespec::{Result, Schedule};

#[test]
fn iterator() -> Result<()> {
    let schedule = Schedule::new("monthly on the 2nd friday at 6am")?;
    let now = Utc::now();

    // Get the next 10 timestamps starting from now
    let events = schedule.iter(&now).take(10).collect::<Vec<_>>();
    assert_eq!(events.len(), 10);

    for event in &events {
        assert_eq!(event.weekday(), Weekday::Fri);
        assert!((7..=13).contains(&event.day()), "event = {event}");
    }
    assert!(events.windows(2).all(|w| w[0] < w[1]));

    Ok(())
}

#[test]
fn weekly_iterator_moves_past_today() -> Result<()> {
    let schedule = Schedule::new("weekly on tuesday at 10am")?;
    let now = DateTime::parse_from_rfc3339("1991-08-06T11:15:42Z").unwrap();

    let events = schedule.into_iter(&now).take(2).map(|t| t.to_rfc3339()).collect::<Vec<_>>();
    assert_eq!(events, ["1991-08-13T10:00:00+00:00", "1991-08-20T10:00:00+00:00"]);

    Ok(())
}
