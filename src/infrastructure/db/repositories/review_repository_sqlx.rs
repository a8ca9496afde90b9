use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::review_repository::ReviewRepository;
use crate::domain::reviews::review::Review;
use crate::infrastructure::db::PgPool;

pub struct SqlxReviewRepository {
    pub pool: PgPool,
}

impl SqlxReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_review(r: PgRow) -> Review {
    Review {
        id: r.get("id"),
        listing_id: r.get("listing_id"),
        rating: r.get("rating"),
        comment: r.get("comment"),
        author_id: r.get("author_id"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl ReviewRepository for SqlxReviewRepository {
    async fn create_for_listing(
        &self,
        listing_id: Uuid,
        author_id: Uuid,
        rating: i16,
        comment: &str,
    ) -> anyhow::Result<Option<Review>> {
        let mut tx = self.pool.begin().await?;
        // lock the listing row so a concurrent delete cannot orphan the review
        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM listings WHERE id = $1 FOR UPDATE")
            .bind(listing_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }
        let row = sqlx::query(
            r#"INSERT INTO reviews (rating, comment, author_id) VALUES ($1, $2, $3)
               RETURNING id, rating, comment, author_id, created_at"#,
        )
        .bind(rating)
        .bind(comment)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await?;
        let review_id: Uuid = row.get("id");
        sqlx::query("INSERT INTO listing_reviews (listing_id, review_id) VALUES ($1, $2)")
            .bind(listing_id)
            .bind(review_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(Review {
            id: review_id,
            listing_id,
            rating: row.get("rating"),
            comment: row.get("comment"),
            author_id: row.get("author_id"),
            created_at: row.get("created_at"),
        }))
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Review>> {
        let row = sqlx::query(
            r#"SELECT r.id, lr.listing_id, r.rating, r.comment, r.author_id, r.created_at
               FROM reviews r JOIN listing_reviews lr ON lr.review_id = r.id
               WHERE r.id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(map_review))
    }

    async fn list_for_listing(&self, listing_id: Uuid) -> anyhow::Result<Vec<Review>> {
        let rows = sqlx::query(
            r#"SELECT r.id, lr.listing_id, r.rating, r.comment, r.author_id, r.created_at
               FROM listing_reviews lr JOIN reviews r ON r.id = lr.review_id
               WHERE lr.listing_id = $1
               ORDER BY lr.position"#,
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(map_review).collect())
    }

    async fn detach_and_delete(&self, listing_id: Uuid, review_id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let detached = sqlx::query(
            "DELETE FROM listing_reviews WHERE listing_id = $1 AND review_id = $2",
        )
        .bind(listing_id)
        .bind(review_id)
        .execute(&mut *tx)
        .await?;
        if detached.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}
