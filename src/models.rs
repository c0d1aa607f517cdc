// Copyright Sarathi Roadways Platform Team
// Attribution cannot be removed

use chrono::DateTime;
use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

#[derive(Queryable, Selectable, Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::roadways::schedules)]
pub struct ScheduleRow {
    pub schedule_id: String,
    pub bus_name: String,
    pub seat_layout: String,
    pub booking_enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::roadways::stops)]
pub struct StopRow {
    pub schedule_id: String,
    pub stop_order: i32,
    pub stop_name: String,
    pub arrival_seconds: Option<i32>,
    pub departure_seconds: i32,
    pub fare_from_origin: Decimal,
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::roadways::bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookingRow {
    pub booking_id: Uuid,
    pub user_id: String,
    pub schedule_id: String,
    pub origin: String,
    pub destination: String,
    pub fare: Decimal,
    pub original_fare: Decimal,
    pub status: String,
    pub is_free_ticket: bool,
    pub discount_type: String,
    pub booked_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::roadways::passenger_details)]
pub struct PassengerDetailRow {
    pub booking_id: Uuid,
    pub seat_id: String,
    pub passenger_name: String,
    pub category: String,
    pub document_number: Option<String>,
    pub fare: Decimal,
    pub status: String,
}

impl PassengerDetailRow {
    /// Identity documents never leave the service in full. Only the last
    /// four characters survive into any response payload.
    pub fn masked_document(&self) -> Option<String> {
        self.document_number.as_deref().map(mask_document)
    }
}

pub fn mask_document(document: &str) -> String {
    let chars: Vec<char> = document.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::roadways::seat_occupancy)]
pub struct SeatOccupancyRow {
    pub booking_id: Uuid,
    pub seat_id: String,
    pub schedule_id: String,
    pub origin: String,
    pub destination: String,
    pub booked_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::roadways::beneficiaries)]
pub struct BeneficiaryRow {
    pub registration_number: String,
    pub full_name: String,
    pub phone: String,
    pub ticket_claimed: bool,
    pub claimed_booking: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::roadways::system_settings)]
pub struct SystemSettingRow {
    pub setting_name: String,
    pub setting_value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Clone, Debug, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::roadways::operators)]
pub struct OperatorRow {
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
    pub assigned_districts: Vec<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_masking_keeps_last_four() {
        assert_eq!(mask_document("123456789012"), "********9012");
        assert_eq!(mask_document("98765"), "*8765");
    }

    #[test]
    fn short_documents_are_fully_masked() {
        assert_eq!(mask_document("1234"), "****");
        assert_eq!(mask_document("12"), "**");
        assert_eq!(mask_document(""), "");
    }
}
