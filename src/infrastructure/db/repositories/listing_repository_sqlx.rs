use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::listing_repository::{DeletedListing, ListingRepository};
use crate::domain::listings::listing::{GeoPoint, ImageRef, Listing, ListingChanges, NewListing};
use crate::infrastructure::db::PgPool;

pub struct SqlxListingRepository {
    pub pool: PgPool,
}

impl SqlxListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LISTING_COLUMNS: &str = r#"l.id, l.title, l.description, l.location, l.country, l.price,
    l.lng, l.lat, l.image_url, l.image_key, l.owner_id, l.created_at, l.updated_at,
    COALESCE(ARRAY(SELECT lr.review_id FROM listing_reviews lr
                   WHERE lr.listing_id = l.id ORDER BY lr.position), '{}') AS review_ids"#;

fn map_listing(r: PgRow) -> anyhow::Result<Listing> {
    Ok(Listing {
        id: r.get("id"),
        title: r.get("title"),
        description: r.get("description"),
        location: r.get("location"),
        country: r.get("country"),
        price: r.get("price"),
        geometry: GeoPoint::new(r.get("lng"), r.get("lat"))?,
        image: ImageRef {
            url: r.get("image_url"),
            key: r.get("image_key"),
        },
        owner_id: r.get("owner_id"),
        review_ids: r.get("review_ids"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl ListingRepository for SqlxListingRepository {
    async fn list_all(&self) -> anyhow::Result<Vec<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings l ORDER BY l.created_at, l.id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(map_listing).collect()
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings l WHERE l.id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(map_listing).transpose()
    }

    async fn owner_of(&self, id: Uuid) -> anyhow::Result<Option<Uuid>> {
        let owner = sqlx::query_scalar::<_, Uuid>("SELECT owner_id FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }

    async fn insert(&self, listing: &NewListing) -> anyhow::Result<Listing> {
        let [lng, lat] = listing.geometry.coordinates();
        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO listings
                 (title, description, location, country, price, lng, lat, image_url, image_key, owner_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING id"#,
        )
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.location)
        .bind(&listing.country)
        .bind(listing.price)
        .bind(lng)
        .bind(lat)
        .bind(&listing.image.url)
        .bind(&listing.image.key)
        .bind(listing.owner_id)
        .fetch_one(&self.pool)
        .await?;
        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("listing {id} vanished after insert"))
    }

    async fn update(&self, id: Uuid, changes: &ListingChanges) -> anyhow::Result<Option<Listing>> {
        let (lng, lat) = match changes.geometry {
            Some(point) => {
                let [lng, lat] = point.coordinates();
                (Some(lng), Some(lat))
            }
            None => (None, None),
        };
        let res = sqlx::query(
            r#"UPDATE listings SET
                 title = $2,
                 description = $3,
                 location = $4,
                 country = $5,
                 price = $6,
                 lng = COALESCE($7, lng),
                 lat = COALESCE($8, lat),
                 image_url = COALESCE($9, image_url),
                 image_key = COALESCE($10, image_key),
                 updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.location)
        .bind(&changes.country)
        .bind(changes.price)
        .bind(lng)
        .bind(lat)
        .bind(changes.image.as_ref().map(|i| i.url.as_str()))
        .bind(changes.image.as_ref().map(|i| i.key.as_str()))
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete_cascade(&self, id: Uuid) -> anyhow::Result<Option<DeletedListing>> {
        let mut tx = self.pool.begin().await?;
        let review_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT review_id FROM listing_reviews WHERE listing_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        let row = sqlx::query("DELETE FROM listings WHERE id = $1 RETURNING image_url, image_key")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        if !review_ids.is_empty() {
            sqlx::query("DELETE FROM reviews WHERE id = ANY($1)")
                .bind(&review_ids)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(Some(DeletedListing {
            image: ImageRef {
                url: row.get("image_url"),
                key: row.get("image_key"),
            },
            review_count: review_ids.len(),
        }))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
