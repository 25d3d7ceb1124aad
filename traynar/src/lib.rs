pub mod catalog;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod flow;
pub mod forms;
pub mod outcome;
pub mod recording;
pub mod screen;
pub mod services;
pub mod theme;

pub use client::CredentialClient;
pub use config::Config;
pub use endpoint::Endpoint;
pub use flow::{Alerter, AuthFlow, LoadingIndicator, Submission};
pub use forms::{FieldErrors, LoginForm, SignupField, SignupForm};
pub use outcome::{Alert, Outcome};
pub use screen::{Navigator, Screen};

/// Helper to generate the current timestamp as right now, UTC, formatted as an RFC 3339 string.
///
/// Always exactly three fractional digits, which is what recording identifiers carry.
///
/// Returns something like "2022-11-22T09:21:15.640Z"
pub fn created_at_now() -> anyhow::Result<String> {
    format_created_at(time::OffsetDateTime::now_utc())
}

fn format_created_at(when: time::OffsetDateTime) -> anyhow::Result<String> {
    let format = time::format_description::parse(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z",
    )?;
    Ok(when.to_offset(time::UtcOffset::UTC).format(&format)?)
}

#[test]
fn test_created_at_now() {
    // eg: 2022-11-22T09:20:44.123Z
    let ts = created_at_now().unwrap();
    assert_eq!(ts.len(), 24);
    assert_eq!(&ts[4..5], "-");
    assert_eq!(&ts[10..11], "T");
    assert_eq!(&ts[23..24], "Z");
}

#[test]
fn test_format_created_at_keeps_trailing_zeros() {
    use time::{Date, Month, Time};
    let date = Date::from_calendar_date(2022, Month::November, 22).unwrap();
    let at = |time: Time| format_created_at(date.with_time(time).assume_utc()).unwrap();

    assert_eq!(
        at(Time::from_hms_micro(9, 21, 15, 640_123).unwrap()),
        "2022-11-22T09:21:15.640Z"
    );
    assert_eq!(
        at(Time::from_hms(9, 21, 15).unwrap()),
        "2022-11-22T09:21:15.000Z"
    );
    let offset = time::UtcOffset::from_hms(5, 30, 0).unwrap();
    let local = date
        .with_time(Time::from_hms_milli(14, 51, 15, 5).unwrap())
        .assume_offset(offset);
    assert_eq!(format_created_at(local).unwrap(), "2022-11-22T09:21:15.005Z");
}
