//! 活动时区 SQL 片段

/// 活动时区表达式（需要别名 `e` 的 events 行）
///
/// 空值、空串或 Postgres 不认识的时区名一律按 UTC 处理，避免整条语句报错
const EVENT_ZONE_SQL: &str =
    "(CASE WHEN e.time_zone IN (SELECT name FROM pg_timezone_names) THEN e.time_zone ELSE 'UTC' END)";

/// 把活动本地时间表达式换算为 timestamptz
pub fn event_local_to_utc(local: &str) -> String {
    format!("(({local}) AT TIME ZONE {EVENT_ZONE_SQL})")
}
