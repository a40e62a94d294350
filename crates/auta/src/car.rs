//! Car records and the raw form input they are built from.

use serde::{Deserialize, Serialize};

/// A stored car record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    /// Identifier assigned by the store; never changes.
    pub id: i64,
    /// Display name, 1–30 characters.
    pub name: String,
    /// Free-text description, 1–500 characters.
    pub description: String,
    /// Release date as entered by the user.
    pub release_date: String,
    /// Price in its accepted textual form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Color, always starting with `#` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// The mutable fields of a car after validation.
///
/// Produced by [`crate::validation::Validator`] and consumed by the store's
/// insert and update operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarDraft {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Release date.
    pub release_date: String,
    /// Price, absent when the field was left empty.
    pub price: Option<String>,
    /// Color, absent when the field was left empty.
    pub color: Option<String>,
}

impl CarDraft {
    /// Attach a store-assigned id.
    #[must_use]
    pub fn into_car(self, id: i64) -> Car {
        Car {
            id,
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            price: self.price,
            color: self.color,
        }
    }
}

/// Raw create/edit form submission.
///
/// Field names follow the HTML form. Missing fields deserialize as empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarForm {
    /// Name (`nazev`).
    pub nazev: String,
    /// Description (`popis`).
    pub popis: String,
    /// Release date (`datum`).
    pub datum: String,
    /// Price (`cena`).
    pub cena: String,
    /// Color (`barva`).
    pub barva: String,
}

impl CarForm {
    /// Copy of the form with surrounding whitespace removed from every field.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            nazev: self.nazev.trim().to_string(),
            popis: self.popis.trim().to_string(),
            datum: self.datum.trim().to_string(),
            cena: self.cena.trim().to_string(),
            barva: self.barva.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_strips_every_field() {
        let form = CarForm {
            nazev: "  Octavia ".to_string(),
            popis: "\tpopis\n".to_string(),
            datum: " 2024-01-01".to_string(),
            cena: "100 ".to_string(),
            barva: "\u{a0}#fff\u{a0}".to_string(),
        };

        let trimmed = form.trimmed();
        assert_eq!(trimmed.nazev, "Octavia");
        assert_eq!(trimmed.popis, "popis");
        assert_eq!(trimmed.datum, "2024-01-01");
        assert_eq!(trimmed.cena, "100");
        assert_eq!(trimmed.barva, "#fff");
    }

    #[test]
    fn test_form_missing_fields_default_to_empty() {
        let form: CarForm = serde_json::from_str(r#"{"nazev": "Fabia"}"#).unwrap();
        assert_eq!(form.nazev, "Fabia");
        assert!(form.popis.is_empty());
        assert!(form.cena.is_empty());
    }

    #[test]
    fn test_draft_into_car() {
        let draft = CarDraft {
            name: "Fabia".to_string(),
            description: "Malé auto".to_string(),
            release_date: "1999".to_string(),
            price: None,
            color: Some("#fff".to_string()),
        };

        let car = draft.into_car(7);
        assert_eq!(car.id, 7);
        assert_eq!(car.name, "Fabia");
        assert_eq!(car.color.as_deref(), Some("#fff"));
    }

    #[test]
    fn test_car_serialize_skips_absent_fields() {
        let car = Car {
            id: 1,
            name: "Fabia".to_string(),
            description: "x".to_string(),
            release_date: "1999".to_string(),
            price: None,
            color: None,
        };
        let json = serde_json::to_string(&car).unwrap();
        assert!(!json.contains("price"));
        assert!(!json.contains("color"));
    }
}
