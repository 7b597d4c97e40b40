use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::customer::parse_timestamp;
use crate::store::StaffRow;

/// A staff member on the floor roster.
///
/// `serving_customer` and `serving_since` are set and cleared together.
/// A staff member on lunch is never serving anyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub name: String,
    pub ready_since: DateTime<Utc>,
    pub serving_customer: Option<Uuid>,
    pub serving_since: Option<DateTime<Utc>>,
    pub on_lunch: bool,
    pub lunch_started: Option<DateTime<Utc>>,
}

impl Staff {
    /// Transforms a raw store row into the domain shape.
    pub fn from_row(row: &StaffRow) -> Self {
        Self {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            name: row.name.clone(),
            ready_since: parse_timestamp(&row.ready_timestamp),
            serving_customer: row
                .serving_customer
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            serving_since: row.serving_start_time.as_deref().map(parse_timestamp),
            on_lunch: row.on_lunch,
            lunch_started: row.lunch_start_time.as_deref().map(parse_timestamp),
        }
    }

    /// True when the staff member can take a new customer.
    pub fn is_available(&self) -> bool {
        !self.on_lunch && self.serving_customer.is_none()
    }
}
