//! Reservation card record model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of fields read from a reservation card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    /// Guest name (氏名).
    Name,
    /// Guest age (年齢).
    Age,
    /// Occupation (職業).
    Occupation,
    /// Postal address (住所).
    Address,
    /// Phone number (電話番号).
    Phone,
    /// Email address (メールアドレス).
    Email,
    /// Check-in date (チェックイン日).
    CheckinDate,
    /// Check-out date (チェックアウト日).
    CheckoutDate,
}

impl FieldKey {
    /// All keys in spreadsheet column order (A..H).
    pub const ALL: [FieldKey; 8] = [
        FieldKey::Name,
        FieldKey::Age,
        FieldKey::Occupation,
        FieldKey::Address,
        FieldKey::Phone,
        FieldKey::Email,
        FieldKey::CheckinDate,
        FieldKey::CheckoutDate,
    ];

    /// Order in which header patterns are tried against a line.
    ///
    /// The first key whose pattern matches becomes the anchor, so a line such
    /// as "Name / Occupation" anchors Name.
    pub const HEADER_PRIORITY: [FieldKey; 8] = [
        FieldKey::Name,
        FieldKey::Address,
        FieldKey::Phone,
        FieldKey::Email,
        FieldKey::Occupation,
        FieldKey::Age,
        FieldKey::CheckinDate,
        FieldKey::CheckoutDate,
    ];

    /// Japanese label used on the verification form and sheet header.
    pub fn label(self) -> &'static str {
        match self {
            FieldKey::Name => "氏名",
            FieldKey::Age => "年齢",
            FieldKey::Occupation => "職業",
            FieldKey::Address => "住所",
            FieldKey::Phone => "電話番号",
            FieldKey::Email => "メールアドレス",
            FieldKey::CheckinDate => "チェックイン日",
            FieldKey::CheckoutDate => "チェックアウト日",
        }
    }

    /// Spreadsheet column letter.
    pub fn column(self) -> char {
        match self {
            FieldKey::Name => 'A',
            FieldKey::Age => 'B',
            FieldKey::Occupation => 'C',
            FieldKey::Address => 'D',
            FieldKey::Phone => 'E',
            FieldKey::Email => 'F',
            FieldKey::CheckinDate => 'G',
            FieldKey::CheckoutDate => 'H',
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured data recovered from one card.
///
/// Every field is always present; an empty string means "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub name: String,
    pub age: String,
    pub occupation: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub checkin_date: String,
    pub checkout_date: String,
}

impl ExtractedRecord {
    /// Create a record with every field empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value.
    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::Name => &self.name,
            FieldKey::Age => &self.age,
            FieldKey::Occupation => &self.occupation,
            FieldKey::Address => &self.address,
            FieldKey::Phone => &self.phone,
            FieldKey::Email => &self.email,
            FieldKey::CheckinDate => &self.checkin_date,
            FieldKey::CheckoutDate => &self.checkout_date,
        }
    }

    fn slot_mut(&mut self, key: FieldKey) -> &mut String {
        match key {
            FieldKey::Name => &mut self.name,
            FieldKey::Age => &mut self.age,
            FieldKey::Occupation => &mut self.occupation,
            FieldKey::Address => &mut self.address,
            FieldKey::Phone => &mut self.phone,
            FieldKey::Email => &mut self.email,
            FieldKey::CheckinDate => &mut self.checkin_date,
            FieldKey::CheckoutDate => &mut self.checkout_date,
        }
    }

    /// Set a field value.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        *self.slot_mut(key) = value.into();
    }

    /// Apply `f` to every non-empty value in place.
    pub fn map_values(&mut self, mut f: impl FnMut(FieldKey, &str) -> String) {
        for key in FieldKey::ALL {
            let slot = self.slot_mut(key);
            if !slot.is_empty() {
                *slot = f(key, slot);
            }
        }
    }

    /// Whether the field has a value.
    pub fn is_set(&self, key: FieldKey) -> bool {
        !self.get(key).is_empty()
    }

    /// Keys that are still empty, in column order.
    pub fn missing_fields(&self) -> Vec<FieldKey> {
        FieldKey::ALL
            .into_iter()
            .filter(|k| !self.is_set(*k))
            .collect()
    }

    /// Iterate `(key, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        FieldKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_all_fields_empty() {
        let record = ExtractedRecord::new();
        assert_eq!(record.missing_fields().len(), 8);
        assert!(record.iter().all(|(_, v)| v.is_empty()));
    }

    #[test]
    fn test_set_and_get() {
        let mut record = ExtractedRecord::new();
        record.set(FieldKey::Phone, "090-1234-5678");

        assert_eq!(record.get(FieldKey::Phone), "090-1234-5678");
        assert!(record.is_set(FieldKey::Phone));
        assert!(!record.missing_fields().contains(&FieldKey::Phone));
    }

    #[test]
    fn test_json_has_all_keys() {
        let json = serde_json::to_value(ExtractedRecord::new()).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 8);
        assert!(obj.contains_key("checkin_date"));
        assert!(obj.contains_key("checkout_date"));
    }

    #[test]
    fn test_columns_follow_sheet_order() {
        let columns: String = FieldKey::ALL.iter().map(|k| k.column()).collect();
        assert_eq!(columns, "ABCDEFGH");
    }

    #[test]
    fn test_header_priority_covers_every_key() {
        let mut keys = FieldKey::HEADER_PRIORITY.to_vec();
        keys.sort();
        assert_eq!(keys, FieldKey::ALL.to_vec());
    }
}
