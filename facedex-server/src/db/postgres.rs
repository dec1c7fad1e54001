//! PostgreSQL implementation of the face store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use facedex_core::{BoundingBox, FacedexError, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{ClaimedFace, FaceRecord, FaceStore, NewFace};

/// PostgreSQL-backed face store.
#[derive(Clone)]
pub struct PostgresFaceStore {
    pool: PgPool,
}

/// Row type for face queries.
#[derive(FromRow)]
struct FaceRow {
    face_id: String,
    image_id: String,
    bbox_x1: Option<i64>,
    bbox_y1: Option<i64>,
    bbox_x2: Option<i64>,
    bbox_y2: Option<i64>,
    face_name: Option<String>,
    claimed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl FaceRow {
    fn into_record(self) -> Result<FaceRecord> {
        let bounding_box = match (self.bbox_x1, self.bbox_y1, self.bbox_x2, self.bbox_y2) {
            (Some(x1), Some(y1), Some(x2), Some(y2)) => Some(BoundingBox::new(x1, y1, x2, y2)),
            _ => None,
        };
        Ok(FaceRecord {
            face_id: parse_face_id(&self.face_id)?,
            photo_id: self.image_id,
            bounding_box,
            name: self.face_name,
            claimed_at: self.claimed_at,
            created_at: self.created_at,
        })
    }
}

fn parse_face_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| FacedexError::Malformed(format!("stored face_id {raw:?} is not a UUID: {e}")))
}

/// Map a sqlx error onto the pipeline taxonomy. Everything that is not a
/// recognized constraint violation is an infrastructure failure and thus
/// retryable `Unavailable`.
fn map_sqlx(context: &str, e: sqlx::Error) -> FacedexError {
    match e {
        sqlx::Error::RowNotFound => FacedexError::NotFound(context.to_string()),
        other => FacedexError::Unavailable(format!("{context}: {other}")),
    }
}

impl PostgresFaceStore {
    /// Connect with a fail-fast acquire timeout and run migrations.
    pub async fn new(database_url: &str, connect_timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await
            .map_err(|e| FacedexError::Unavailable(format!("database connect: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| FacedexError::Unavailable(format!("database migration: {e}")))?;

        tracing::info!("Face store connected and migrations applied");

        Ok(Self { pool })
    }

    /// Create a face store from an existing pool (for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FaceStore for PostgresFaceStore {
    async fn insert_face(&self, face: &NewFace) -> Result<()> {
        let (x1, y1, x2, y2) = match face.bounding_box {
            Some(b) => (Some(b.x1), Some(b.y1), Some(b.x2), Some(b.y2)),
            None => (None, None, None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO image_faces (face_id, image_id, bbox_x1, bbox_y1, bbox_x2, bbox_y2)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(face.face_id.to_string())
        .bind(&face.photo_id)
        .bind(x1)
        .bind(y1)
        .bind(x2)
        .bind(y2)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx("insert face", e))?;

        tracing::debug!(face_id = %face.face_id, photo_id = %face.photo_id, "Face row inserted");
        Ok(())
    }

    async fn claim_unnamed(&self, lease_ttl: Duration) -> Result<Option<ClaimedFace>> {
        // Single atomic statement: selection and lease stamp happen
        // together, so two concurrent sessions can never be offered the
        // same face while its lease holds. Expired leases are reclaimable.
        let row: Option<(String, String)> = sqlx::query_as(
            r#"
            UPDATE image_faces SET claimed_at = now()
            WHERE face_id = (
                SELECT f.face_id
                FROM image_faces f
                LEFT JOIN face_names n ON n.face_id = f.face_id
                WHERE n.face_id IS NULL
                  AND (f.claimed_at IS NULL
                       OR f.claimed_at < now() - ($1 * interval '1 second'))
                ORDER BY f.created_at
                LIMIT 1
                FOR UPDATE OF f SKIP LOCKED
            )
            RETURNING face_id, image_id
            "#,
        )
        .bind(lease_ttl.as_secs() as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx("claim unnamed face", e))?;

        match row {
            Some((face_id, image_id)) => Ok(Some(ClaimedFace {
                face_id: parse_face_id(&face_id)?,
                photo_id: image_id,
            })),
            None => Ok(None),
        }
    }

    async fn assign_name(&self, face_id: Uuid, name: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO face_names (face_id, face_name)
            VALUES ($1, $2)
            ON CONFLICT (face_id) DO NOTHING
            "#,
        )
        .bind(face_id.to_string())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db)
                if db.kind() == sqlx::error::ErrorKind::ForeignKeyViolation =>
            {
                FacedexError::NotFound(format!("face {face_id}"))
            }
            _ => map_sqlx("assign name", e),
        })?;

        if result.rows_affected() == 0 {
            return Err(FacedexError::Conflict(format!(
                "face {face_id} already has a name"
            )));
        }

        tracing::debug!(face_id = %face_id, "Face named");
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT f.image_id
            FROM image_faces f
            JOIN face_names n ON n.face_id = f.face_id
            WHERE n.face_name = $1
            ORDER BY f.image_id
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("find by name", e))?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn get_face(&self, face_id: Uuid) -> Result<Option<FaceRecord>> {
        let row: Option<FaceRow> = sqlx::query_as(
            r#"
            SELECT f.face_id, f.image_id, f.bbox_x1, f.bbox_y1, f.bbox_x2, f.bbox_y2,
                   n.face_name, f.claimed_at, f.created_at
            FROM image_faces f
            LEFT JOIN face_names n ON n.face_id = f.face_id
            WHERE f.face_id = $1
            "#,
        )
        .bind(face_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx("get face", e))?;

        row.map(FaceRow::into_record).transpose()
    }

    async fn count_unnamed(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM image_faces f
            LEFT JOIN face_names n ON n.face_id = f.face_id
            WHERE n.face_id IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx("count unnamed", e))?;

        Ok(count)
    }

    async fn check_health(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx("health check", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facedex_core::BoundingBox;

    /// Connect to the database named by `DATABASE_URL`, or skip.
    ///
    /// The test tolerates pre-existing rows: it only asserts about the
    /// faces it inserts itself, identified by fresh UUIDs.
    async fn test_store() -> Option<PostgresFaceStore> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres face store test");
            return None;
        };
        Some(
            PostgresFaceStore::new(&url, Duration::from_secs(5))
                .await
                .unwrap(),
        )
    }

    /// Claim repeatedly until `target` comes back or the store runs dry.
    async fn claim_until(
        store: &PostgresFaceStore,
        ttl: Duration,
        target: Uuid,
    ) -> Option<ClaimedFace> {
        for _ in 0..500 {
            match store.claim_unnamed(ttl).await.unwrap() {
                Some(claimed) if claimed.face_id == target => return Some(claimed),
                Some(_) => continue,
                None => return None,
            }
        }
        None
    }

    #[tokio::test]
    async fn claim_assign_find_round_trip() {
        let Some(store) = test_store().await else {
            return;
        };
        let ttl = Duration::from_secs(3600);

        let face_id = Uuid::new_v4();
        let photo_id = format!("{}.jpg", Uuid::new_v4());
        let name = format!("person-{face_id}");

        store
            .insert_face(&NewFace {
                face_id,
                photo_id: photo_id.clone(),
                bounding_box: Some(BoundingBox::new(10, 10, 50, 50)),
            })
            .await
            .unwrap();

        // The claim statement selects and stamps the lease atomically.
        let claimed = claim_until(&store, ttl, face_id)
            .await
            .expect("inserted face must be claimable");
        assert_eq!(claimed.photo_id, photo_id);

        let record = store.get_face(face_id).await.unwrap().unwrap();
        assert!(record.claimed_at.is_some());
        assert_eq!(record.bounding_box, Some(BoundingBox::new(10, 10, 50, 50)));

        // The active lease keeps the face away from further claims.
        assert!(claim_until(&store, ttl, face_id).await.is_none());

        store.assign_name(face_id, &name).await.unwrap();
        let err = store.assign_name(face_id, "someone else").await.unwrap_err();
        assert!(matches!(err, FacedexError::Conflict(_)));

        assert_eq!(store.find_by_name(&name).await.unwrap(), vec![photo_id]);

        // Named faces are never claimable again, even past the lease.
        assert!(claim_until(&store, Duration::from_secs(0), face_id)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn naming_an_unknown_face_is_not_found() {
        let Some(store) = test_store().await else {
            return;
        };
        let err = store.assign_name(Uuid::new_v4(), "Nobody").await.unwrap_err();
        assert!(matches!(err, FacedexError::NotFound(_)));
    }
}
