use super::schema::{Accepted, FieldRule, FieldSpec, RawPayload, Schema};
use super::ValidationErrors;
use crate::domain::reviews::review::{MAX_RATING, MIN_RATING};

pub const LISTING_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec::text("listing[title]", "listing.title", 200),
        FieldSpec::text("listing[description]", "listing.description", 5000),
        FieldSpec::text("listing[location]", "listing.location", 200),
        FieldSpec::text("listing[country]", "listing.country", 100),
        FieldSpec::integer("listing[price]", "listing.price", 0, None),
    ],
};

pub const REVIEW_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec::integer("review[rating]", "review.rating", MIN_RATING, Some(MAX_RATING)),
        FieldSpec::text("review[comment]", "review.comment", 2000),
    ],
};

pub const SIGNUP_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "username",
            label: "username",
            required: true,
            rule: FieldRule::Text {
                min_len: 3,
                max_len: 32,
            },
        },
        FieldSpec::text("email", "email", 254),
        FieldSpec {
            name: "password",
            label: "password",
            required: true,
            rule: FieldRule::Secret {
                min_len: 8,
                max_len: 128,
            },
        },
    ],
};

/// Login takes credentials as typed; only presence is checked.
pub const LOGIN_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "username",
            label: "username",
            required: true,
            rule: FieldRule::Text {
                min_len: 1,
                max_len: 32,
            },
        },
        FieldSpec {
            name: "password",
            label: "password",
            required: true,
            rule: FieldRule::Secret {
                min_len: 1,
                max_len: 128,
            },
        },
    ],
};

#[derive(Debug, Clone, PartialEq)]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    pub location: String,
    pub country: String,
    pub price: i64,
}

impl ListingForm {
    pub fn from_payload(raw: &RawPayload) -> Result<Self, ValidationErrors> {
        let mut ok = LISTING_SCHEMA.validate(raw)?;
        Ok(Self {
            title: required_text(&mut ok, "listing[title]")?,
            description: required_text(&mut ok, "listing[description]")?,
            location: required_text(&mut ok, "listing[location]")?,
            country: required_text(&mut ok, "listing[country]")?,
            price: required_integer(&ok, "listing[price]")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewForm {
    pub rating: i16,
    pub comment: String,
}

impl ReviewForm {
    pub fn from_payload(raw: &RawPayload) -> Result<Self, ValidationErrors> {
        let mut ok = REVIEW_SCHEMA.validate(raw)?;
        let rating = required_integer(&ok, "review[rating]")?;
        Ok(Self {
            // bounded to 1..=5 by the schema
            rating: i16::try_from(rating)
                .map_err(|_| ValidationErrors::single("review[rating]", "\"review.rating\" is out of range"))?,
            comment: required_text(&mut ok, "review[comment]")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn from_payload(raw: &RawPayload) -> Result<Self, ValidationErrors> {
        let mut ok = SIGNUP_SCHEMA.validate(raw)?;
        let username = required_text(&mut ok, "username")?;
        let email = required_text(&mut ok, "email")?;
        let password = required_text(&mut ok, "password")?;

        let mut errors = ValidationErrors::default();
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            errors.push(
                "username",
                "\"username\" may only contain letters, digits, '_', '-' and '.'",
            );
        }
        if !looks_like_email(&email) {
            errors.push("email", "\"email\" must be a valid email");
        }
        errors.into_result(Self {
            username,
            email,
            password,
        })
    }
}

fn looks_like_email(s: &str) -> bool {
    let mut parts = s.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

fn required_text(ok: &mut Accepted, name: &str) -> Result<String, ValidationErrors> {
    ok.take_text(name)
        .ok_or_else(|| ValidationErrors::single(name, format!("\"{name}\" is required")))
}

fn required_integer(ok: &Accepted, name: &str) -> Result<i64, ValidationErrors> {
    ok.integer(name)
        .ok_or_else(|| ValidationErrors::single(name, format!("\"{name}\" is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, &str)]) -> RawPayload {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn listing_form_reads_bracketed_fields() {
        let form = ListingForm::from_payload(&payload(&[
            ("listing[title]", "Cozy Beachfront Cottage"),
            ("listing[description]", "Steps from the sea"),
            ("listing[location]", "Malibu"),
            ("listing[country]", "United States"),
            ("listing[price]", "1500"),
        ]))
        .unwrap();
        assert_eq!(form.title, "Cozy Beachfront Cottage");
        assert_eq!(form.price, 1500);
    }

    #[test]
    fn listing_form_reports_all_missing_fields_joined() {
        let err = ListingForm::from_payload(&payload(&[("listing[price]", "-5")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"listing.title\" is required, \"listing.description\" is required, \
             \"listing.location\" is required, \"listing.country\" is required, \
             \"listing.price\" must be greater than or equal to 0"
        );
    }

    #[test]
    fn review_rating_must_be_between_one_and_five() {
        let err = ReviewForm::from_payload(&payload(&[
            ("review[rating]", "6"),
            ("review[comment]", "great"),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "\"review.rating\" must be less than or equal to 5"
        );
        let ok = ReviewForm::from_payload(&payload(&[
            ("review[rating]", "4"),
            ("review[comment]", "great"),
        ]))
        .unwrap();
        assert_eq!(ok.rating, 4);
    }

    #[test]
    fn signup_checks_username_charset_and_email() {
        let err = SignupForm::from_payload(&payload(&[
            ("username", "bad name"),
            ("email", "nope"),
            ("password", "longenough"),
        ]))
        .unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert_eq!(err.errors()[0].field, "username");
        assert_eq!(err.errors()[1].field, "email");
    }

    #[test]
    fn signup_keeps_password_verbatim() {
        let form = SignupForm::from_payload(&payload(&[
            ("username", "wanderer"),
            ("email", "w@example.com"),
            ("password", " spaced pass "),
        ]))
        .unwrap();
        assert_eq!(form.password, " spaced pass ");
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("a@@b.co"));
        assert!(!looks_like_email("@b.co"));
    }
}
