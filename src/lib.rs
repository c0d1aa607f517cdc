// Copyright: Sarathi Roadways Platform Team
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_unit_value,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::deprecated_clippy_cfg_attr,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

pub mod availability;
pub mod booking;
pub mod cancellation;
pub mod codes;
pub mod errors;
pub mod fares;
pub mod models;
pub mod operators;
pub mod postgres_tools;
pub mod revenue;
pub mod route_model;
pub mod schedule_store;
pub mod schema;
pub mod seat_layout;
pub mod settings;
pub mod tracking;

pub use postgres_tools::SarathiConn;
pub use postgres_tools::SarathiPostgresPool;

pub const SECONDS_PER_DAY: i32 = 86_400;

/// Stop names are matched case insensitively with surrounding whitespace
/// ignored, both when resolving booking segments and when checking
/// district membership.
pub fn normalize_stop_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Parse a timetable time of day, `HH:MM` or `HH:MM:SS`, into seconds
/// since midnight. Returns `None` for anything outside a single day.
pub fn parse_time_of_day(raw: &str) -> Option<i32> {
    let mut parts = raw.trim().split(':');
    let hours: i32 = parts.next()?.parse().ok()?;
    let minutes: i32 = parts.next()?.parse().ok()?;
    let seconds: i32 = match parts.next() {
        Some(part) => part.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Render seconds since midnight as `HH:MM`, wrapping times that run
/// past midnight back into the clock.
pub fn format_time_of_day(seconds: i32) -> String {
    let wrapped = seconds.rem_euclid(SECONDS_PER_DAY);
    format!("{:02}:{:02}", wrapped / 3600, (wrapped % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_parsing() {
        assert_eq!(parse_time_of_day("06:30"), Some(23400));
        assert_eq!(parse_time_of_day("06:30:15"), Some(23415));
        assert_eq!(parse_time_of_day(" 23:59 "), Some(86340));
        assert_eq!(parse_time_of_day("00:00"), Some(0));
        assert_eq!(parse_time_of_day("24:00"), None);
        assert_eq!(parse_time_of_day("12:60"), None);
        assert_eq!(parse_time_of_day("12"), None);
        assert_eq!(parse_time_of_day("12:00:00:00"), None);
        assert_eq!(parse_time_of_day("noon"), None);
    }

    #[test]
    fn time_of_day_formatting() {
        assert_eq!(format_time_of_day(23400), "06:30");
        assert_eq!(format_time_of_day(0), "00:00");
        assert_eq!(format_time_of_day(86_400 + 600), "00:10");
    }

    #[test]
    fn stop_name_normalization() {
        assert_eq!(normalize_stop_name("  Rohtak "), "rohtak");
        assert_eq!(normalize_stop_name("GOHANA"), "gohana");
    }
}
