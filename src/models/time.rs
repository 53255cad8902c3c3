use chrono::{DateTime, Utc};

pub fn now_millis() -> i64 {
  Utc::now().timestamp_millis()
}

/// "just now", "5 minutes ago", "yesterday" ... relative to `now_ms`.
/// Timestamps are Unix epoch milliseconds; anything in the future reads as
/// "just now".
pub fn format_human_readable_time(timestamp_ms: i64, now_ms: i64) -> String {
  let now = DateTime::<Utc>::from_timestamp_millis(now_ms).unwrap_or_else(Utc::now);
  let created_at = DateTime::<Utc>::from_timestamp_millis(timestamp_ms).unwrap_or(now);

  let duration = now.signed_duration_since(created_at);

  // Handle minutes (less than 1 hour)
  if duration.num_minutes() < 60 {
    return match duration.num_minutes() {
      m if m <= 0 => "just now".to_string(),
      1 => "one minute ago".to_string(),
      m => format!("{} minutes ago", m),
    };
  }

  // Handle hours (1-23 hours)
  if duration.num_hours() < 24 {
    return match duration.num_hours() {
      1 => "one hour ago".to_string(),
      h => format!("{} hours ago", h),
    };
  }

  // Handle days (1-6 days)
  if duration.num_days() < 7 {
    return match duration.num_days() {
      1 => "yesterday".to_string(),
      d => format!("{} days ago", d),
    };
  }

  // Handle weeks (1-4 weeks)
  if duration.num_weeks() < 5 {
    return match duration.num_weeks() {
      1 => "one week ago".to_string(),
      w => format!("{} weeks ago", w),
    };
  }

  let months = duration.num_days() / 30;
  if months == 1 { "one month ago".to_string() } else { format!("{} months ago", months) }
}
