use std::fmt;
use std::time::SystemTime;

use humantime::format_rfc3339_millis;

use crate::platform;

/// An [RFC3339] formatted timestamp.
///
/// [RFC3339]: https://www.ietf.org/rfc/rfc3339.txt
pub struct Rfc3339Timestamp {
    time: SystemTime,
}

impl Rfc3339Timestamp {
    pub fn now() -> Self {
        Rfc3339Timestamp {
            time: platform::current_system_time(),
        }
    }
}

impl fmt::Display for Rfc3339Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        format_rfc3339_millis(self.time).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn formats_with_millis() {
        let timestamp = Rfc3339Timestamp {
            time: SystemTime::UNIX_EPOCH + Duration::from_millis(1_500),
        };
        assert_eq!(timestamp.to_string(), "1970-01-01T00:00:01.500Z");
    }
}
