pub mod logging;

use chrono::Utc;

/// Milliseconds since the Unix epoch, used to prefix storage keys
pub fn timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}
