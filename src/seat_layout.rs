//! Physical seat grids. A layout tag like `2x2` describes the seats per
//! row on each side of the aisle; every coach has ten rows. Seat ids are
//! column letter plus row number, `A1` through e.g. `D10`.

use crate::errors::BookingError;
use serde::Deserialize;
use serde::Serialize;

pub const SEAT_ROWS: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatLayout {
    #[serde(rename = "2x2")]
    TwoByTwo,
    #[serde(rename = "2x3")]
    TwoByThree,
    #[serde(rename = "2x1")]
    TwoByOne,
}

impl SeatLayout {
    pub fn tag(&self) -> &'static str {
        match self {
            SeatLayout::TwoByTwo => "2x2",
            SeatLayout::TwoByThree => "2x3",
            SeatLayout::TwoByOne => "2x1",
        }
    }

    pub fn from_tag(tag: &str) -> Result<SeatLayout, BookingError> {
        match tag {
            "2x2" => Ok(SeatLayout::TwoByTwo),
            "2x3" => Ok(SeatLayout::TwoByThree),
            "2x1" => Ok(SeatLayout::TwoByOne),
            other => Err(BookingError::MalformedRow(format!(
                "unknown seat layout {other}"
            ))),
        }
    }

    /// Seats per row, which is also how many column letters exist.
    pub fn columns(&self) -> u32 {
        match self {
            SeatLayout::TwoByTwo => 4,
            SeatLayout::TwoByThree => 5,
            SeatLayout::TwoByOne => 3,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.columns() * SEAT_ROWS
    }

    /// All seat ids in display order, row by row.
    pub fn seat_ids(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(self.capacity() as usize);
        for row in 1..=SEAT_ROWS {
            for column in 0..self.columns() {
                let letter = (b'A' + column as u8) as char;
                ids.push(format!("{letter}{row}"));
            }
        }
        ids
    }

    /// Normalise a requested seat id to its canonical form, or `None`
    /// if the seat does not exist in this layout.
    pub fn canonicalize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim().to_uppercase();
        let mut chars = trimmed.chars();
        let letter = chars.next()?;
        if !letter.is_ascii_uppercase() {
            return None;
        }
        let column = letter as u32 - 'A' as u32;
        if column >= self.columns() {
            return None;
        }
        let row: u32 = chars.as_str().parse().ok()?;
        if row == 0 || row > SEAT_ROWS {
            return None;
        }
        Some(format!("{letter}{row}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacities_match_layouts() {
        assert_eq!(SeatLayout::TwoByTwo.capacity(), 40);
        assert_eq!(SeatLayout::TwoByThree.capacity(), 50);
        assert_eq!(SeatLayout::TwoByOne.capacity(), 30);
    }

    #[test]
    fn seat_id_grid() {
        let ids = SeatLayout::TwoByTwo.seat_ids();
        assert_eq!(ids.len(), 40);
        assert_eq!(ids.first().unwrap(), "A1");
        assert_eq!(&ids[..4], ["A1", "B1", "C1", "D1"]);
        assert_eq!(ids.last().unwrap(), "D10");
        assert!(!ids.contains(&"E1".to_string()));

        let wide = SeatLayout::TwoByThree.seat_ids();
        assert!(wide.contains(&"E10".to_string()));
    }

    #[test]
    fn canonicalize_accepts_case_and_whitespace() {
        let layout = SeatLayout::TwoByTwo;
        assert_eq!(layout.canonicalize(" a1 ").as_deref(), Some("A1"));
        assert_eq!(layout.canonicalize("D10").as_deref(), Some("D10"));
        assert_eq!(layout.canonicalize("E1"), None);
        assert_eq!(layout.canonicalize("A0"), None);
        assert_eq!(layout.canonicalize("A11"), None);
        assert_eq!(layout.canonicalize("A"), None);
        assert_eq!(layout.canonicalize("10A"), None);
        assert_eq!(layout.canonicalize(""), None);
    }

    #[test]
    fn tag_round_trip() {
        for layout in [
            SeatLayout::TwoByTwo,
            SeatLayout::TwoByThree,
            SeatLayout::TwoByOne,
        ] {
            assert_eq!(SeatLayout::from_tag(layout.tag()).unwrap(), layout);
        }
        assert!(SeatLayout::from_tag("3x3").is_err());
    }
}
