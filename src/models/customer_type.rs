use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Customer category tag, stored as-is in the `customer_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerType {
    #[serde(rename = "VIP")]
    Vip,
    Consumer,
    Business,
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerType::Vip => write!(f, "VIP"),
            CustomerType::Consumer => write!(f, "Consumer"),
            CustomerType::Business => write!(f, "Business"),
        }
    }
}

impl FromStr for CustomerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vip" => Ok(CustomerType::Vip),
            "consumer" => Ok(CustomerType::Consumer),
            "business" => Ok(CustomerType::Business),
            _ => Err(format!(
                "Invalid customer type '{}'. Valid options: VIP, Consumer, Business",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_type_display() {
        assert_eq!(format!("{}", CustomerType::Vip), "VIP");
        assert_eq!(format!("{}", CustomerType::Consumer), "Consumer");
        assert_eq!(format!("{}", CustomerType::Business), "Business");
    }

    #[test]
    fn test_customer_type_from_str() {
        assert_eq!(CustomerType::from_str("VIP").unwrap(), CustomerType::Vip);
        assert_eq!(CustomerType::from_str("vip").unwrap(), CustomerType::Vip);
        assert_eq!(
            CustomerType::from_str("consumer").unwrap(),
            CustomerType::Consumer
        );
        assert_eq!(
            CustomerType::from_str("BUSINESS").unwrap(),
            CustomerType::Business
        );
    }

    #[test]
    fn test_customer_type_from_str_invalid() {
        assert!(CustomerType::from_str("wholesale").is_err());
        assert!(CustomerType::from_str("").is_err());
    }

    #[test]
    fn test_customer_type_json_roundtrip() {
        let ct = CustomerType::Vip;
        let json = serde_json::to_string(&ct).unwrap();
        assert_eq!(json, "\"VIP\"");

        let parsed: CustomerType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ct);
    }
}
