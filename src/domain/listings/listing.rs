use uuid::Uuid;

/// A WGS84 point, stored and exchanged in GeoJSON order (`[lng, lat]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> anyhow::Result<Self> {
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            anyhow::bail!("longitude out of range: {lng}");
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            anyhow::bail!("latitude out of range: {lat}");
        }
        Ok(Self { lng, lat })
    }

    pub fn coordinates(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// Where a listing's image lives in the image store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub country: String,
    pub price: i64,
    pub geometry: GeoPoint,
    pub image: ImageRef,
    pub owner_id: Uuid,
    /// Review references in insertion order.
    pub review_ids: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Fields supplied when a listing is first persisted.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub location: String,
    pub country: String,
    pub price: i64,
    pub geometry: GeoPoint,
    pub image: ImageRef,
    pub owner_id: Uuid,
}

/// Replacement values for an update. `geometry` and `image` are only
/// rewritten when present.
#[derive(Debug, Clone)]
pub struct ListingChanges {
    pub title: String,
    pub description: String,
    pub location: String,
    pub country: String,
    pub price: i64,
    pub geometry: Option<GeoPoint>,
    pub image: Option<ImageRef>,
}

impl Listing {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn apply(&mut self, changes: ListingChanges) {
        self.title = changes.title;
        self.description = changes.description;
        self.location = changes.location;
        self.country = changes.country;
        self.price = changes.price;
        if let Some(point) = changes.geometry {
            self.geometry = point;
        }
        if let Some(image) = changes.image {
            self.image = image;
        }
        self.updated_at = chrono::Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(GeoPoint::new(181.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -90.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        let p = GeoPoint::new(77.2, 28.6).unwrap();
        assert_eq!(p.coordinates(), [77.2, 28.6]);
    }

    #[test]
    fn apply_keeps_geometry_and_image_when_absent() {
        let owner = Uuid::new_v4();
        let now = chrono::Utc::now();
        let mut listing = Listing {
            id: Uuid::new_v4(),
            title: "Old".into(),
            description: "d".into(),
            location: "Goa".into(),
            country: "India".into(),
            price: 100,
            geometry: GeoPoint::new(73.8, 15.5).unwrap(),
            image: ImageRef {
                url: "/uploads/a.png".into(),
                key: "a.png".into(),
            },
            owner_id: owner,
            review_ids: vec![],
            created_at: now,
            updated_at: now,
        };
        listing.apply(ListingChanges {
            title: "New".into(),
            description: "d2".into(),
            location: "Goa".into(),
            country: "India".into(),
            price: 250,
            geometry: None,
            image: None,
        });
        assert_eq!(listing.title, "New");
        assert_eq!(listing.price, 250);
        assert_eq!(listing.image.key, "a.png");
        assert_eq!(listing.geometry.coordinates(), [73.8, 15.5]);
        assert!(listing.is_owned_by(owner));
    }
}
