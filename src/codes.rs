//! Closed code sets shared between the database rows and the HTTP surface.
//! Unknown codes are rejected at the boundary rather than carried around
//! as raw strings.

use crate::errors::BookingError;
use serde::Deserialize;
use serde::Serialize;

/// Passenger fare category. `Normal` never receives a discount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassengerCategory {
    Normal,
    Child,
    Senior,
}

impl PassengerCategory {
    pub fn as_code(&self) -> &'static str {
        match self {
            PassengerCategory::Normal => "NORMAL",
            PassengerCategory::Child => "CHILD",
            PassengerCategory::Senior => "SENIOR",
        }
    }

    pub fn from_code(code: &str) -> Result<PassengerCategory, BookingError> {
        match code {
            "NORMAL" => Ok(PassengerCategory::Normal),
            "CHILD" => Ok(PassengerCategory::Child),
            "SENIOR" => Ok(PassengerCategory::Senior),
            other => Err(BookingError::MalformedRow(format!(
                "unknown passenger category {other}"
            ))),
        }
    }

    pub fn requires_document(&self) -> bool {
        matches!(self, PassengerCategory::Child | PassengerCategory::Senior)
    }
}

/// Booking level lifecycle state, derived from the per seat states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    PartiallyCancelled,
    Cancelled,
}

impl BookingStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::PartiallyCancelled => "PARTIALLY_CANCELLED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_code(code: &str) -> Result<BookingStatus, BookingError> {
        match code {
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "PARTIALLY_CANCELLED" => Ok(BookingStatus::PartiallyCancelled),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(BookingError::MalformedRow(format!(
                "unknown booking status {other}"
            ))),
        }
    }
}

/// Per seat lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassengerStatus {
    Booked,
    Cancelled,
}

impl PassengerStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            PassengerStatus::Booked => "BOOKED",
            PassengerStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_code(code: &str) -> Result<PassengerStatus, BookingError> {
        match code {
            "BOOKED" => Ok(PassengerStatus::Booked),
            "CANCELLED" => Ok(PassengerStatus::Cancelled),
            other => Err(BookingError::MalformedRow(format!(
                "unknown passenger status {other}"
            ))),
        }
    }
}

/// Which discount shape a booking carries, classified from the seat
/// categories at booking time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    None,
    Child,
    Senior,
    Mixed,
}

impl DiscountType {
    pub fn as_code(&self) -> &'static str {
        match self {
            DiscountType::None => "NONE",
            DiscountType::Child => "CHILD",
            DiscountType::Senior => "SENIOR",
            DiscountType::Mixed => "MIXED",
        }
    }

    pub fn from_code(code: &str) -> Result<DiscountType, BookingError> {
        match code {
            "NONE" => Ok(DiscountType::None),
            "CHILD" => Ok(DiscountType::Child),
            "SENIOR" => Ok(DiscountType::Senior),
            "MIXED" => Ok(DiscountType::Mixed),
            other => Err(BookingError::MalformedRow(format!(
                "unknown discount type {other}"
            ))),
        }
    }
}

/// Classify the discount type for a set of seat categories.
pub fn classify_discount(categories: &[PassengerCategory]) -> DiscountType {
    let any_child = categories.contains(&PassengerCategory::Child);
    let any_senior = categories.contains(&PassengerCategory::Senior);

    match (any_child, any_senior) {
        (false, false) => DiscountType::None,
        (true, false) => DiscountType::Child,
        (false, true) => DiscountType::Senior,
        (true, true) => DiscountType::Mixed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_codes_round_trip() {
        for category in [
            PassengerCategory::Normal,
            PassengerCategory::Child,
            PassengerCategory::Senior,
        ] {
            assert_eq!(
                PassengerCategory::from_code(category.as_code()).unwrap(),
                category
            );
        }
        assert!(PassengerCategory::from_code("STUDENT").is_err());
    }

    #[test]
    fn discount_classification() {
        use PassengerCategory::*;

        assert_eq!(classify_discount(&[Normal, Normal]), DiscountType::None);
        assert_eq!(classify_discount(&[Normal, Child]), DiscountType::Child);
        assert_eq!(classify_discount(&[Senior]), DiscountType::Senior);
        assert_eq!(
            classify_discount(&[Child, Normal, Senior]),
            DiscountType::Mixed
        );
        assert_eq!(classify_discount(&[]), DiscountType::None);
    }

    #[test]
    fn status_codes_are_strict() {
        assert_eq!(
            BookingStatus::from_code("PARTIALLY_CANCELLED").unwrap(),
            BookingStatus::PartiallyCancelled
        );
        assert!(BookingStatus::from_code("partially_cancelled").is_err());
        assert!(PassengerStatus::from_code("").is_err());
    }
}
