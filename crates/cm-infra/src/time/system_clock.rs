use chrono::Utc;
use cm_core::ports::ClockPort;

/// Wall clock, milliseconds since the Unix epoch.
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
