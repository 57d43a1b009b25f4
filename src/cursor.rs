use chrono::Utc;
use serde::{Deserialize, Deserializer};

/// Unix timestamp (seconds) marking the start of the next poll window
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct PollCursor {
    value: i64,
}

impl PollCursor {
    pub fn new(timestamp: i64) -> Self {
        Self { value: timestamp }
    }

    pub fn now() -> Self {
        Self::new(Utc::now().timestamp())
    }

    pub fn timestamp(&self) -> i64 {
        self.value
    }
}

impl From<i64> for PollCursor {
    fn from(timestamp: i64) -> Self {
        Self::new(timestamp)
    }
}

impl<'de> Deserialize<'de> for PollCursor {
    fn deserialize<D>(deserializer: D) -> Result<PollCursor, D::Error>
    where
        D: Deserializer<'de>,
    {
        let timestamp = i64::deserialize(deserializer)?;
        Ok(PollCursor::new(timestamp))
    }
}

impl std::fmt::Display for PollCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_integer() {
        let cursor: PollCursor = serde_json::from_str("1700000000").unwrap();
        assert_eq!(cursor, PollCursor::new(1_700_000_000));
        assert_eq!(cursor.to_string(), "1700000000");
    }

    #[test]
    fn rejects_non_integer() {
        assert!(serde_json::from_str::<PollCursor>("\"yesterday\"").is_err());
        assert!(serde_json::from_str::<PollCursor>("1.5").is_err());
    }

    #[test]
    fn now_is_recent() {
        let before = Utc::now().timestamp();
        let cursor = PollCursor::now();
        assert!(cursor.timestamp() >= before);
    }
}
