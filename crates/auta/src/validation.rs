//! Form validation for car records.
//!
//! Every check runs on every submission so the user sees all problems at
//! once. Messages come out in a fixed order: name, description, release
//! date, price, color.
//!
//! The default [`Strictness::Lax`] mode is deliberately permissive: a price
//! is any run of digits with at most one `.` in it (so `"12."` and `".5"`
//! pass) and a color only has to start with `#`. [`Strictness::Strict`]
//! tightens those rules without changing the messages.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use crate::car::{CarDraft, CarForm};

/// Maximum name length in characters.
pub const NAME_MAX_CHARS: usize = 30;

/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Date format accepted in strict mode.
const STRICT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single violated rule.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty or longer than [`NAME_MAX_CHARS`].
    #[error("Název je povinný a max. 30 znaků.")]
    Name,
    /// Description is empty or longer than [`DESCRIPTION_MAX_CHARS`].
    #[error("Popis je povinný a max. 500 znaků.")]
    Description,
    /// Release date is missing (or, in strict mode, not a date).
    #[error("Datum je povinné.")]
    ReleaseDate,
    /// Price is not a number.
    #[error("Cena musí být číslo.")]
    Price,
    /// Color is not in hex notation.
    #[error("Barva musí být v hex formátu.")]
    Color,
}

/// Which form a submission came from.
///
/// The create form's color message carries an example value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    /// The "new car" form.
    Create,
    /// The "edit car" form.
    Edit,
}

impl ValidationError {
    /// User-facing message for this error on the given form.
    #[must_use]
    pub fn message(&self, form: FormKind) -> String {
        match (self, form) {
            (Self::Color, FormKind::Create) => {
                "Barva musí být v hex formátu (např. #ff0000).".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// How strictly price, color and date are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Accept anything the historical rules accepted.
    #[default]
    Lax,
    /// Require well-formed numbers, hex colors and `YYYY-MM-DD` dates.
    Strict,
}

/// Validates raw form input into a [`CarDraft`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    strictness: Strictness,
}

impl Validator {
    /// Create a validator with the given strictness.
    #[must_use]
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness }
    }

    /// The configured strictness.
    #[must_use]
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Validate an already trimmed form.
    ///
    /// # Errors
    ///
    /// Returns every violated rule, in check order, when at least one check
    /// fails.
    pub fn validate(&self, form: &CarForm) -> Result<CarDraft, Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !within_bounds(&form.nazev, NAME_MAX_CHARS) {
            errors.push(ValidationError::Name);
        }
        if !within_bounds(&form.popis, DESCRIPTION_MAX_CHARS) {
            errors.push(ValidationError::Description);
        }
        if !self.date_ok(&form.datum) {
            errors.push(ValidationError::ReleaseDate);
        }
        if !form.cena.is_empty() && !self.price_ok(&form.cena) {
            errors.push(ValidationError::Price);
        }
        if !form.barva.is_empty() && !self.color_ok(&form.barva) {
            errors.push(ValidationError::Color);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CarDraft {
            name: form.nazev.clone(),
            description: form.popis.clone(),
            release_date: form.datum.clone(),
            price: non_empty(&form.cena),
            color: non_empty(&form.barva),
        })
    }

    fn date_ok(&self, date: &str) -> bool {
        match self.strictness {
            Strictness::Lax => !date.is_empty(),
            Strictness::Strict => NaiveDate::parse_from_str(date, STRICT_DATE_FORMAT).is_ok(),
        }
    }

    fn price_ok(&self, price: &str) -> bool {
        match self.strictness {
            Strictness::Lax => is_lax_number(price),
            Strictness::Strict => is_strict_number(price),
        }
    }

    fn color_ok(&self, color: &str) -> bool {
        match self.strictness {
            Strictness::Lax => color.starts_with('#'),
            Strictness::Strict => hex_color_pattern().is_match(color),
        }
    }
}

fn within_bounds(value: &str, max_chars: usize) -> bool {
    !value.is_empty() && value.chars().count() <= max_chars
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Digits with at most one `.` anywhere, and at least one digit.
fn is_lax_number(value: &str) -> bool {
    let without_dot = value.replacen('.', "", 1);
    !without_dot.is_empty() && without_dot.chars().all(|c| c.is_ascii_digit())
}

/// Digits, optionally followed by `.` and more digits.
fn is_strict_number(value: &str) -> bool {
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (value, None),
    };
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    digits(whole) && fraction.map_or(true, digits)
}

fn hex_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern is valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> CarForm {
        CarForm {
            nazev: "Škoda Octavia".to_string(),
            popis: "Rodinné auto".to_string(),
            datum: "2024-01-01".to_string(),
            cena: "599000".to_string(),
            barva: "#003da5".to_string(),
        }
    }

    fn lax() -> Validator {
        Validator::new(Strictness::Lax)
    }

    fn strict() -> Validator {
        Validator::new(Strictness::Strict)
    }

    #[test]
    fn test_valid_form_produces_draft() {
        let draft = lax().validate(&valid_form()).unwrap();
        assert_eq!(draft.name, "Škoda Octavia");
        assert_eq!(draft.description, "Rodinné auto");
        assert_eq!(draft.release_date, "2024-01-01");
        assert_eq!(draft.price.as_deref(), Some("599000"));
        assert_eq!(draft.color.as_deref(), Some("#003da5"));
    }

    #[test]
    fn test_empty_optional_fields_become_absent() {
        let mut form = valid_form();
        form.cena = String::new();
        form.barva = String::new();

        let draft = lax().validate(&form).unwrap();
        assert_eq!(draft.price, None);
        assert_eq!(draft.color, None);
    }

    #[test]
    fn test_name_bounds_count_characters() {
        let mut form = valid_form();

        // 30 multi-byte characters are still within bounds
        form.nazev = "Š".repeat(30);
        assert!(lax().validate(&form).is_ok());

        form.nazev = "a".repeat(31);
        assert_eq!(lax().validate(&form), Err(vec![ValidationError::Name]));

        form.nazev = String::new();
        assert_eq!(lax().validate(&form), Err(vec![ValidationError::Name]));
    }

    #[test]
    fn test_description_bounds() {
        let mut form = valid_form();

        form.popis = "x".repeat(500);
        assert!(lax().validate(&form).is_ok());

        form.popis = "x".repeat(501);
        assert_eq!(lax().validate(&form), Err(vec![ValidationError::Description]));

        form.popis = String::new();
        assert_eq!(lax().validate(&form), Err(vec![ValidationError::Description]));
    }

    #[test]
    fn test_missing_release_date() {
        let mut form = valid_form();
        form.datum = String::new();
        assert_eq!(lax().validate(&form), Err(vec![ValidationError::ReleaseDate]));
    }

    #[test]
    fn test_lax_date_is_not_a_calendar_check() {
        let mut form = valid_form();
        form.datum = "někdy v létě".to_string();
        assert!(lax().validate(&form).is_ok());
    }

    #[test]
    fn test_lax_price_accepts_historical_forms() {
        let mut form = valid_form();
        for price in ["0", "599000", "12.5", "12.", ".5", "007"] {
            form.cena = price.to_string();
            assert!(lax().validate(&form).is_ok(), "rejected {price:?}");
        }
    }

    #[test]
    fn test_lax_price_rejects_non_numbers() {
        let mut form = valid_form();
        for price in ["12.34.56", ".", "abc", "-5", "1e5", "1,5", "12 000"] {
            form.cena = price.to_string();
            assert_eq!(
                lax().validate(&form),
                Err(vec![ValidationError::Price]),
                "accepted {price:?}"
            );
        }
    }

    #[test]
    fn test_lax_color_only_needs_hash_prefix() {
        let mut form = valid_form();
        form.barva = "#zzz".to_string();
        assert!(lax().validate(&form).is_ok());

        form.barva = "red".to_string();
        assert_eq!(lax().validate(&form), Err(vec![ValidationError::Color]));
    }

    #[test]
    fn test_all_rules_violated_reports_all_in_order() {
        let form = CarForm {
            nazev: String::new(),
            popis: String::new(),
            datum: String::new(),
            cena: "x".to_string(),
            barva: "ff0000".to_string(),
        };

        assert_eq!(
            lax().validate(&form),
            Err(vec![
                ValidationError::Name,
                ValidationError::Description,
                ValidationError::ReleaseDate,
                ValidationError::Price,
                ValidationError::Color,
            ])
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::Name.message(FormKind::Create),
            "Název je povinný a max. 30 znaků."
        );
        assert_eq!(
            ValidationError::Description.message(FormKind::Edit),
            "Popis je povinný a max. 500 znaků."
        );
        assert_eq!(
            ValidationError::ReleaseDate.message(FormKind::Create),
            "Datum je povinné."
        );
        assert_eq!(
            ValidationError::Price.message(FormKind::Edit),
            "Cena musí být číslo."
        );
        assert_eq!(
            ValidationError::Color.message(FormKind::Create),
            "Barva musí být v hex formátu (např. #ff0000)."
        );
        assert_eq!(
            ValidationError::Color.message(FormKind::Edit),
            "Barva musí být v hex formátu."
        );
    }

    #[test]
    fn test_strict_price() {
        let mut form = valid_form();
        for price in ["0", "12.5", "599000"] {
            form.cena = price.to_string();
            assert!(strict().validate(&form).is_ok(), "rejected {price:?}");
        }
        for price in ["12.", ".5", "12.34.56"] {
            form.cena = price.to_string();
            assert_eq!(strict().validate(&form), Err(vec![ValidationError::Price]));
        }
    }

    #[test]
    fn test_strict_color() {
        let mut form = valid_form();
        for color in ["#fff", "#FF0000", "#003da5"] {
            form.barva = color.to_string();
            assert!(strict().validate(&form).is_ok(), "rejected {color:?}");
        }
        for color in ["#zzz", "#ff00", "#ff00000", "#"] {
            form.barva = color.to_string();
            assert_eq!(strict().validate(&form), Err(vec![ValidationError::Color]));
        }
    }

    #[test]
    fn test_strict_date() {
        let mut form = valid_form();
        form.datum = "2024-02-30".to_string();
        assert_eq!(strict().validate(&form), Err(vec![ValidationError::ReleaseDate]));

        form.datum = "2024-02-29".to_string();
        assert!(strict().validate(&form).is_ok());
    }

    #[test]
    fn test_strict_keeps_optional_fields_optional() {
        let mut form = valid_form();
        form.cena = String::new();
        form.barva = String::new();
        assert!(strict().validate(&form).is_ok());
    }

    #[test]
    fn test_default_validator_is_lax() {
        assert_eq!(Validator::default().strictness(), Strictness::Lax);
    }
}
