use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::customer_type::CustomerType;
use crate::store::CustomerRow;

/// A single outfit entry in a customer's appearance descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    pub hex: String,
}

/// Appearance descriptor, stored as a JSON blob in the `appearance` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub outfits: Vec<Outfit>,
}

/// A customer on the waiting list.
///
/// `assigned_staff` and `served_since` are set and cleared together: a
/// customer is either waiting (both `None`) or being served (both `Some`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub contact: String,
    pub notes: String,
    pub customer_type: CustomerType,
    pub category: String,
    pub arrived_at: DateTime<Utc>,
    pub assigned_staff: Option<Uuid>,
    pub served_since: Option<DateTime<Utc>>,
    pub appearance: Option<Appearance>,
}

impl Customer {
    /// Transforms a raw store row into the domain shape.
    ///
    /// Null notes become the empty string; the appearance blob is decoded
    /// from JSON, with undecodable blobs treated as absent.
    pub fn from_row(row: &CustomerRow) -> Self {
        Self {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            name: row.name.clone(),
            contact: row.contact.clone(),
            notes: row.notes.clone().unwrap_or_default(),
            customer_type: row.customer_type.parse().unwrap_or(CustomerType::Consumer),
            category: row.category.clone(),
            arrived_at: parse_timestamp(&row.timestamp),
            assigned_staff: row
                .assigned_staff
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok()),
            served_since: row.served_timestamp.as_deref().map(parse_timestamp),
            appearance: row
                .appearance
                .as_deref()
                .and_then(|json| serde_json::from_str(json).ok()),
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_staff.is_some()
    }
}

/// Insert payload for a new customer. The store assigns the identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub contact: String,
    pub notes: String,
    pub customer_type: CustomerType,
    pub category: String,
    pub arrived_at: DateTime<Utc>,
    pub appearance: Option<Appearance>,
}

impl NewCustomer {
    pub fn new(
        name: impl Into<String>,
        contact: impl Into<String>,
        customer_type: CustomerType,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            notes: String::new(),
            customer_type,
            category: category.into(),
            arrived_at: Utc::now(),
            appearance: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_arrived_at(mut self, arrived_at: DateTime<Utc>) -> Self {
        self.arrived_at = arrived_at;
        self
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = Some(appearance);
        self
    }
}

pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> CustomerRow {
        CustomerRow {
            id: "7cbb9786-19ab-4a52-9e26-6cf0c7a2e980".to_string(),
            name: "Bo".to_string(),
            contact: "555".to_string(),
            notes: None,
            customer_type: "VIP".to_string(),
            category: "shoes".to_string(),
            timestamp: "2026-03-01T10:00:00+00:00".to_string(),
            assigned_staff: None,
            served_timestamp: None,
            appearance: None,
        }
    }

    #[test]
    fn test_from_row_defaults_null_notes_to_empty() {
        let customer = Customer::from_row(&sample_row());
        assert_eq!(customer.notes, "");
        assert_eq!(customer.name, "Bo");
        assert_eq!(customer.customer_type, CustomerType::Vip);
        assert!(customer.assigned_staff.is_none());
        assert!(customer.served_since.is_none());
    }

    #[test]
    fn test_from_row_parses_assignment_fields() {
        let staff_id = Uuid::new_v4();
        let mut row = sample_row();
        row.assigned_staff = Some(staff_id.to_string());
        row.served_timestamp = Some("2026-03-01T10:05:00+00:00".to_string());

        let customer = Customer::from_row(&row);
        assert_eq!(customer.assigned_staff, Some(staff_id));
        assert!(customer.served_since.is_some());
        assert!(customer.is_assigned());
    }

    #[test]
    fn test_from_row_decodes_appearance_json() {
        let mut row = sample_row();
        row.appearance = Some(
            r##"{"outfits":[{"type":"jacket","color":"red","hex":"#ff0000"}]}"##.to_string(),
        );

        let customer = Customer::from_row(&row);
        let appearance = customer.appearance.unwrap();
        assert_eq!(appearance.outfits.len(), 1);
        assert_eq!(appearance.outfits[0].kind, "jacket");
        assert_eq!(appearance.outfits[0].hex, "#ff0000");
    }

    #[test]
    fn test_from_row_ignores_corrupt_appearance() {
        let mut row = sample_row();
        row.appearance = Some("not json".to_string());

        let customer = Customer::from_row(&row);
        assert!(customer.appearance.is_none());
    }

    #[test]
    fn test_appearance_json_roundtrip_uses_type_key() {
        let appearance = Appearance {
            outfits: vec![Outfit {
                kind: "hat".to_string(),
                color: "blue".to_string(),
                hex: "#0000ff".to_string(),
            }],
        };
        let json = serde_json::to_string(&appearance).unwrap();
        assert!(json.contains("\"type\":\"hat\""));

        let parsed: Appearance = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, appearance);
    }

    #[test]
    fn test_new_customer_builder() {
        let new = NewCustomer::new("Ana", "555-1234", CustomerType::Business, "suits")
            .with_notes("prefers window seat");
        assert_eq!(new.name, "Ana");
        assert_eq!(new.notes, "prefers window seat");
        assert!(new.appearance.is_none());
    }
}
