// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Calendar fields derived from a Unix timestamp.
//!
//! Dates use the proleptic Gregorian calendar and are computed by walking
//! whole years from 1970 and then the month table, rather than with a closed
//! form. Pre-1970 timestamps walk backwards and use Euclidean division, so
//! hours, minutes, and weekdays stay in range for negative input.

use core::fmt;

/// Seconds in one civil day (leap seconds are not modelled).
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Weekday of 1970-01-01 (a Thursday), counted from Sunday = 0.
const EPOCH_WEEKDAY: i64 = 4;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Day of the week, numbered from Sunday = 0.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Weekday {
    /// Day 0.
    Sunday = 0,
    /// Day 1.
    Monday = 1,
    /// Day 2.
    Tuesday = 2,
    /// Day 3.
    Wednesday = 3,
    /// Day 4.
    Thursday = 4,
    /// Day 5.
    Friday = 5,
    /// Day 6.
    Saturday = 6,
}

impl Weekday {
    /// Map `0..=6` (Sunday first) to a weekday. Values outside the range wrap.
    pub fn from_index(index: u8) -> Weekday {
        match index % 7 {
            0 => Weekday::Sunday,
            1 => Weekday::Monday,
            2 => Weekday::Tuesday,
            3 => Weekday::Wednesday,
            4 => Weekday::Thursday,
            5 => Weekday::Friday,
            _ => Weekday::Saturday,
        }
    }

    /// Numeric index, Sunday = 0.
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Hour, minute, and second within a day.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TimeOfDay {
    /// `0..=23`.
    pub hours: u8,
    /// `0..=59`.
    pub minutes: u8,
    /// `0..=59`.
    pub seconds: u8,
}

impl fmt::Display for TimeOfDay {
    /// Zero-padded `HH:MM:SS`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// A proleptic Gregorian calendar date.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CivilDate {
    /// Astronomical year (1 BC is year 0).
    pub year: i32,
    /// `1..=12`.
    pub month: u8,
    /// `1..=31`.
    pub day: u8,
}

impl fmt::Display for CivilDate {
    /// ISO 8601 `YYYY-MM-DD`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Gregorian leap rule: divisible by 4, and not by 100 unless also by 400.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` (1-based) of `year`. Returns 0 for a month
/// outside `1..=12`.
pub fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => DAYS_IN_MONTH[(month - 1) as usize],
        _ => 0,
    }
}

fn days_in_year(year: i32) -> i64 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Day of week for a Unix timestamp: `((epoch / 86400) + 4) mod 7`.
pub fn day_of_week(epoch: i64) -> Weekday {
    let days = epoch.div_euclid(SECONDS_PER_DAY);
    Weekday::from_index((days + EPOCH_WEEKDAY).rem_euclid(7) as u8)
}

/// Hours, minutes, and seconds of a Unix timestamp (UTC plus whatever
/// offset the caller already applied).
pub fn time_of_day(epoch: i64) -> TimeOfDay {
    let secs = epoch.rem_euclid(SECONDS_PER_DAY);
    TimeOfDay {
        hours: (secs / 3600) as u8,
        minutes: ((secs % 3600) / 60) as u8,
        seconds: (secs % 60) as u8,
    }
}

/// Year, month, and day of a Unix timestamp.
pub fn civil_date(epoch: i64) -> CivilDate {
    let mut days = epoch.div_euclid(SECONDS_PER_DAY);
    let mut year: i32 = 1970;

    if days >= 0 {
        loop {
            let len = days_in_year(year);
            if days < len {
                break;
            }
            days -= len;
            year += 1;
        }
    } else {
        while days < 0 {
            year -= 1;
            days += days_in_year(year);
        }
    }

    let mut month: u8 = 1;
    loop {
        let len = days_in_month(year, month) as i64;
        if days < len {
            break;
        }
        days -= len;
        month += 1;
    }

    CivilDate {
        year,
        month,
        day: days as u8 + 1,
    }
}
