use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// RFC 1123 (IMF-fixdate) formatted date, always in GMT.
pub struct HttpDate(pub SystemTime);

impl HttpDate {
    pub fn now() -> Self {
        Self(SystemTime::now())
    }
}

impl std::fmt::Display for HttpDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let datetime = DateTime::<Utc>::from(self.0);
        write!(f, "{}", datetime.format("%a, %d %b %Y %H:%M:%S GMT"))
    }
}
