//! 时区与时间窗口计算
//!
//! 活动以「日期 + 本地开始/结束时间 + IANA 时区」的形式存储，
//! 所有状态判断都先换算成 UTC 时间点后再与当前时间比较。

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::warn;

use crate::error::{CoreError, Result};

/// 解析时区名称，空值或未知时区回退到 UTC
///
/// 用于读路径：历史数据中的脏时区不应导致查询失败
pub fn resolve_zone(name: Option<&str>) -> Tz {
    match name.map(str::trim).filter(|s| !s.is_empty()) {
        None => Tz::UTC,
        Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(time_zone = %name, "未知时区，按 UTC 处理");
            Tz::UTC
        }),
    }
}

/// 严格解析时区名称，用于写路径
pub fn parse_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CoreError::bad_request(format!("Invalid time zone: {}", name)))
}

/// 解析 "HH:mm" 或 "HH:mm:ss" 格式的时间
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// 将时区内的本地时间换算为 UTC 时间点
///
/// 夏令时回拨导致的重复时间取较早的一个；
/// 夏令时跳变导致的不存在时间向后顺延一小时。
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}

/// 指定时区的当前本地时间（用于展示）
pub fn local_now(tz: Tz, now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&tz).naive_local()
}

/// 活动的绝对时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EventWindow {
    /// 由活动日期与本地起止时间计算窗口
    ///
    /// 结束时间不晚于开始时间时视为跨夜活动，结束于次日
    pub fn resolve(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime, tz: Tz) -> Self {
        let start_local = date.and_time(start_time);
        let end_date = if end_time <= start_time {
            date.succ_opt().unwrap_or(date)
        } else {
            date
        };
        let end_local = end_date.and_time(end_time);

        Self {
            start: local_to_utc(tz, start_local),
            end: local_to_utc(tz, end_local),
        }
    }

    /// 活动已结束
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.end
    }

    /// 活动尚未开始
    pub fn not_started(&self, now: DateTime<Utc>) -> bool {
        now < self.start
    }

    /// 当前时间处于活动窗口内（含边界），即可签到区间
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_resolve_zone_fallbacks() {
        assert_eq!(resolve_zone(None), Tz::UTC);
        assert_eq!(resolve_zone(Some("  ")), Tz::UTC);
        assert_eq!(resolve_zone(Some("Mars/Olympus")), Tz::UTC);
        assert_eq!(resolve_zone(Some("Europe/Paris")), chrono_tz::Europe::Paris);
    }

    #[test]
    fn test_parse_zone_rejects_unknown() {
        assert!(parse_zone("Asia/Kolkata").is_ok());
        let err = parse_zone("Mars/Olympus").unwrap_err();
        assert!(matches!(err, CoreError::BadRequest(_)));
    }

    #[test]
    fn test_parse_clock_formats() {
        assert_eq!(parse_clock("09:30"), Some(clock(9, 30)));
        assert_eq!(parse_clock("09:30:00"), Some(clock(9, 30)));
        assert_eq!(parse_clock("9h30"), None);
        assert_eq!(parse_clock("25:00"), None);
    }

    #[test]
    fn test_window_in_event_zone() {
        // 巴黎冬令时 UTC+1
        let window = EventWindow::resolve(
            date(2025, 1, 15),
            clock(19, 0),
            clock(23, 0),
            chrono_tz::Europe::Paris,
        );
        assert_eq!(window.start, utc("2025-01-15T18:00:00Z"));
        assert_eq!(window.end, utc("2025-01-15T22:00:00Z"));
    }

    #[test]
    fn test_overnight_window_ends_next_day() {
        let window = EventWindow::resolve(
            date(2025, 1, 15),
            clock(22, 0),
            clock(2, 0),
            chrono_tz::Europe::Paris,
        );
        assert_eq!(window.start, utc("2025-01-15T21:00:00Z"));
        assert_eq!(window.end, utc("2025-01-16T01:00:00Z"));
    }

    #[test]
    fn test_dst_gap_shifts_forward() {
        // 2025-03-30 02:30 在巴黎不存在，顺延到 03:30 CEST (UTC+2)
        let instant = local_to_utc(
            chrono_tz::Europe::Paris,
            date(2025, 3, 30).and_time(clock(2, 30)),
        );
        assert_eq!(instant, utc("2025-03-30T01:30:00Z"));
    }

    #[test]
    fn test_dst_overlap_takes_earliest() {
        // 2025-10-26 02:30 在巴黎出现两次，取夏令时那一次 (UTC+2)
        let instant = local_to_utc(
            chrono_tz::Europe::Paris,
            date(2025, 10, 26).and_time(clock(2, 30)),
        );
        assert_eq!(instant, utc("2025-10-26T00:30:00Z"));
    }

    #[test]
    fn test_window_boundaries() {
        let window = EventWindow::resolve(date(2025, 6, 1), clock(10, 0), clock(12, 0), Tz::UTC);

        let before = utc("2025-06-01T09:59:59Z");
        let at_start = utc("2025-06-01T10:00:00Z");
        let at_end = utc("2025-06-01T12:00:00Z");
        let after = utc("2025-06-01T12:00:01Z");

        assert!(window.not_started(before));
        assert!(!window.contains(before));
        assert!(window.contains(at_start));
        // 结束时刻仍可签到，但已视为结束（不可再预订）
        assert!(window.contains(at_end));
        assert!(window.has_ended(at_end));
        assert!(!window.contains(after));
        assert!(window.has_ended(after));
    }

    #[test]
    fn test_local_now_uses_zone() {
        let now = utc("2025-01-15T12:00:00Z");
        let local = local_now(chrono_tz::Asia::Tokyo, now);
        assert_eq!(local.hour(), 21);
    }
}
