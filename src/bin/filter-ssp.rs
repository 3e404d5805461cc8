use std::error::Error;
use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use transit_map::ssp::{ScheduleStopPair, SspFilter};

/// Streams a transitland ScheduleStopPair ndjson extract from stdin and
/// echoes the lines whose service matches the configured clauses. Lines are
/// passed through byte-for-byte so no fields are lost to the record model.
///
/// Clauses come from the environment: FILTER_DAY (0 = Monday),
/// FILTER_START_HOUR, FILTER_END_HOUR, FILTER_SERVICE_DATE (YYYY-MM-DD).
/// The animation extract is built with FILTER_START_HOUR=16
/// FILTER_END_HOUR=20 and a recent weekday.
fn mainr() -> Result<(), Box<dyn Error>> {
    let filter = filter_from_env()?;
    if filter.is_unconstrained() {
        eprintln!("No FILTER_* variables set; passing every record through");
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut read = 0usize;
    let mut written = 0usize;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        read += 1;
        let ssp: ScheduleStopPair = serde_json::from_str(&line)?;
        if filter.matches(&ssp) {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
            written += 1;
        }
    }

    eprintln!("Kept {} of {} schedule stop pairs", written, read);
    Ok(())
}

fn filter_from_env() -> Result<SspFilter, Box<dyn Error>> {
    let mut filter = SspFilter::default();
    if let Ok(day) = std::env::var("FILTER_DAY") {
        filter.day_of_week = Some(day.parse()?);
    }
    if let Ok(hour) = std::env::var("FILTER_START_HOUR") {
        filter.start_hour = Some(hour.parse()?);
    }
    if let Ok(hour) = std::env::var("FILTER_END_HOUR") {
        filter.end_hour = Some(hour.parse()?);
    }
    if let Ok(date) = std::env::var("FILTER_SERVICE_DATE") {
        filter.service_date = Some(NaiveDate::parse_from_str(&date, "%Y-%m-%d")?);
    }
    Ok(filter)
}

fn main() {
    env_logger::init();
    mainr().unwrap()
}
