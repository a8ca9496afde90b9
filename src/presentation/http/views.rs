use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::listings::get_listing::ListingDetails;
use crate::application::validation::{FieldRule, Schema};
use crate::domain::listings::listing::Listing;
use crate::domain::users::user::User;

use super::session::{Flashes, RequestContext};

#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    IndexPage = Page<IndexData>,
    ShowPage = Page<ShowData>,
    FormPage = Page<FormData>
)]
pub struct Page<T> {
    pub view: String,
    pub flash: Flashes,
    pub current_user: Option<UserView>,
    pub data: T,
}

impl<T> Page<T> {
    /// Builds a page for the current request, consuming pending flashes.
    pub fn render(rc: &RequestContext, view: &str, data: T) -> Self {
        Self {
            view: view.to_string(),
            flash: rc.session.take_flashes(),
            current_user: rc.user.as_ref().map(UserView::from),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeometryView {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[lng, lat]`
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageView {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListingView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub country: String,
    pub price: i64,
    pub geometry: GeometryView,
    pub image: ImageView,
    pub owner_id: Uuid,
    pub review_count: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Listing> for ListingView {
    fn from(l: &Listing) -> Self {
        Self {
            id: l.id,
            title: l.title.clone(),
            description: l.description.clone(),
            location: l.location.clone(),
            country: l.country.clone(),
            price: l.price,
            geometry: GeometryView {
                kind: "Point".into(),
                coordinates: l.geometry.coordinates().to_vec(),
            },
            image: ImageView {
                url: l.image.url.clone(),
                filename: l.image.key.clone(),
            },
            owner_id: l.owner_id,
            review_count: l.review_ids.len(),
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IndexData {
    pub listings: Vec<ListingView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewView {
    pub id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub author: Option<UserView>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Whether the current user may delete this review.
    pub can_delete: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShowData {
    pub listing: ListingView,
    pub owner: Option<UserView>,
    pub reviews: Vec<ReviewView>,
    /// Whether the current user may edit or delete the listing.
    pub can_edit: bool,
}

impl ShowData {
    pub fn new(details: &ListingDetails, viewer: Option<&User>) -> Self {
        let viewer_id = viewer.map(|u| u.id);
        Self {
            listing: ListingView::from(&details.listing),
            owner: details.owner.as_ref().map(UserView::from),
            reviews: details
                .reviews
                .iter()
                .map(|r| ReviewView {
                    id: r.review.id,
                    rating: r.review.rating,
                    comment: r.review.comment.clone(),
                    author: r.author.as_ref().map(UserView::from),
                    created_at: r.review.created_at,
                    can_delete: viewer_id.is_some_and(|id| r.review.is_written_by(id)),
                })
                .collect(),
            can_edit: viewer_id.is_some_and(|id| details.listing.is_owned_by(id)),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormField {
    pub name: String,
    pub label: String,
    /// `text`, `password`, `number` or `file`
    pub kind: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FormData {
    pub action: String,
    /// Method the form element uses; overrides travel in the action's query.
    pub method: String,
    pub enctype: String,
    pub fields: Vec<FormField>,
    pub values: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_image: Option<ImageView>,
}

pub const URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART: &str = "multipart/form-data";

impl FormData {
    pub fn from_schema(schema: &Schema, action: impl Into<String>, enctype: &str) -> Self {
        let fields = schema
            .fields
            .iter()
            .map(|spec| {
                let (kind, min, max) = match spec.rule {
                    FieldRule::Text { min_len, max_len } => {
                        ("text", Some(min_len as i64), Some(max_len as i64))
                    }
                    FieldRule::Secret { min_len, max_len } => {
                        ("password", Some(min_len as i64), Some(max_len as i64))
                    }
                    FieldRule::Integer { min, max } => ("number", Some(min), max),
                };
                FormField {
                    name: spec.name.to_string(),
                    label: spec.label.to_string(),
                    kind: kind.to_string(),
                    required: spec.required,
                    min,
                    max,
                    accept: None,
                }
            })
            .collect();
        Self {
            action: action.into(),
            method: "POST".into(),
            enctype: enctype.to_string(),
            fields,
            values: HashMap::new(),
            current_image: None,
        }
    }

    pub fn with_file(mut self, name: &str, label: &str, required: bool) -> Self {
        self.fields.push(FormField {
            name: name.to_string(),
            label: label.to_string(),
            kind: "file".into(),
            required,
            min: None,
            max: None,
            accept: Some("image/png,image/jpeg,image/svg+xml".into()),
        });
        self
    }

    pub fn with_values(mut self, values: impl IntoIterator<Item = (&'static str, String)>) -> Self {
        self.values
            .extend(values.into_iter().map(|(k, v)| (k.to_string(), v)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::validation::{LISTING_SCHEMA, SIGNUP_SCHEMA};

    #[test]
    fn form_fields_mirror_the_schema() {
        let form = FormData::from_schema(&LISTING_SCHEMA, "/listings", MULTIPART).with_file(
            "listing[image]",
            "listing.image",
            true,
        );
        let names: Vec<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "listing[title]",
                "listing[description]",
                "listing[location]",
                "listing[country]",
                "listing[price]",
                "listing[image]"
            ]
        );
        let price = &form.fields[4];
        assert_eq!((price.kind.as_str(), price.min, price.max), ("number", Some(0), None));

        let signup = FormData::from_schema(&SIGNUP_SCHEMA, "/signup", URLENCODED);
        assert_eq!(signup.fields[2].kind, "password");
    }
}
