//! The anchor status record (§3 "Anchor status record"): anchor-id, status,
//! deadline, next-check-time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    InProcess,
    Completed,
}

impl Status {
    pub fn as_tag(self) -> &'static str {
        match self {
            Status::InProcess => "in-process",
            Status::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub anchor_id: String,
    pub status: Status,
    pub deadline: DateTime<Utc>,
    /// The next time the monitor should re-evaluate this record if it is
    /// still in-process (§4.7 "Monitor").
    pub status_check_time: DateTime<Utc>,
}
