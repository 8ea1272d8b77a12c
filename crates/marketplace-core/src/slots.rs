//! 营业时段切分
//!
//! 将一段营业时间按固定小时数切分为连续的可预约时段

use chrono::{Duration, NaiveTime};
use serde::Serialize;

use crate::time::parse_clock;

/// 一个可预约时段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSlot {
    pub start_time: String,
    pub end_time: String,
}

/// 按 `hour_limit` 小时切分 [start, end)
///
/// 只输出完整的时段，剩余不足一个时段的尾巴被丢弃。
/// 输入非法、开始不早于结束或时段长度为 0 时返回空列表。
pub fn generate_slots(start: &str, end: &str, hour_limit: u32) -> Vec<GeneratedSlot> {
    let (Some(start), Some(end)) = (parse_clock(start), parse_clock(end)) else {
        return Vec::new();
    };
    if start >= end || hour_limit == 0 {
        return Vec::new();
    }

    let step = Duration::hours(i64::from(hour_limit));
    let mut slots = Vec::new();
    let mut cursor: NaiveTime = start;

    while end - cursor >= step {
        let next = cursor + step;
        slots.push(GeneratedSlot {
            start_time: cursor.format("%H:%M").to_string(),
            end_time: next.format("%H:%M").to_string(),
        });
        cursor = next;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(slots: &[GeneratedSlot]) -> Vec<(&str, &str)> {
        slots
            .iter()
            .map(|s| (s.start_time.as_str(), s.end_time.as_str()))
            .collect()
    }

    #[test]
    fn test_hourly_slots() {
        let slots = generate_slots("09:00", "12:00", 1);
        assert_eq!(
            pairs(&slots),
            vec![("09:00", "10:00"), ("10:00", "11:00"), ("11:00", "12:00")]
        );
    }

    #[test]
    fn test_partial_tail_is_dropped() {
        let slots = generate_slots("09:00", "14:30", 2);
        assert_eq!(pairs(&slots), vec![("09:00", "11:00"), ("11:00", "13:00")]);
    }

    #[test]
    fn test_seconds_suffix_is_accepted() {
        let slots = generate_slots("18:00:00", "20:00:00", 1);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start_time, "18:00");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(generate_slots("12:00", "12:00", 1).is_empty());
        assert!(generate_slots("14:00", "12:00", 1).is_empty());
        assert!(generate_slots("09:00", "12:00", 0).is_empty());
        assert!(generate_slots("nine", "12:00", 1).is_empty());
        assert!(generate_slots("09:00", "10:00", 2).is_empty());
    }

    #[test]
    fn test_late_evening_does_not_wrap() {
        // 23:00 之后不足一小时，不能绕回 00:00
        let slots = generate_slots("21:00", "23:30", 1);
        assert_eq!(pairs(&slots), vec![("21:00", "22:00"), ("22:00", "23:00")]);
    }
}
