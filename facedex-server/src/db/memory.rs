//! In-memory face store for development and tests.
//!
//! Mirrors the Postgres backend's semantics, including the claim lease,
//! so the claim protocol can be exercised without a database.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use facedex_core::{FacedexError, Result};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ClaimedFace, FaceRecord, FaceStore, NewFace};

struct MemFace {
    record: FaceRecord,
}

/// Face store holding rows in insertion order behind a mutex.
#[derive(Default)]
pub struct MemoryFaceStore {
    faces: Mutex<Vec<MemFace>>,
}

impl MemoryFaceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lease_active(claimed_at: Option<DateTime<Utc>>, ttl: Duration, now: DateTime<Utc>) -> bool {
    match claimed_at {
        Some(at) => {
            let age = now.signed_duration_since(at);
            age < chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX)
        }
        None => false,
    }
}

#[async_trait]
impl FaceStore for MemoryFaceStore {
    async fn insert_face(&self, face: &NewFace) -> Result<()> {
        let mut faces = self.faces.lock().await;
        if faces.iter().any(|f| f.record.face_id == face.face_id) {
            return Err(FacedexError::Conflict(format!(
                "face {} already exists",
                face.face_id
            )));
        }
        faces.push(MemFace {
            record: FaceRecord {
                face_id: face.face_id,
                photo_id: face.photo_id.clone(),
                bounding_box: face.bounding_box,
                name: None,
                claimed_at: None,
                created_at: Utc::now(),
            },
        });
        Ok(())
    }

    async fn claim_unnamed(&self, lease_ttl: Duration) -> Result<Option<ClaimedFace>> {
        let now = Utc::now();
        let mut faces = self.faces.lock().await;
        // Insertion order stands in for created_at ordering.
        for face in faces.iter_mut() {
            let r = &mut face.record;
            if r.name.is_none() && !lease_active(r.claimed_at, lease_ttl, now) {
                r.claimed_at = Some(now);
                return Ok(Some(ClaimedFace {
                    face_id: r.face_id,
                    photo_id: r.photo_id.clone(),
                }));
            }
        }
        Ok(None)
    }

    async fn assign_name(&self, face_id: Uuid, name: &str) -> Result<()> {
        let mut faces = self.faces.lock().await;
        let face = faces
            .iter_mut()
            .find(|f| f.record.face_id == face_id)
            .ok_or_else(|| FacedexError::NotFound(format!("face {face_id}")))?;

        if face.record.name.is_some() {
            return Err(FacedexError::Conflict(format!(
                "face {face_id} already has a name"
            )));
        }
        face.record.name = Some(name.to_string());
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<String>> {
        let faces = self.faces.lock().await;
        let mut photo_ids: Vec<String> = faces
            .iter()
            .filter(|f| f.record.name.as_deref() == Some(name))
            .map(|f| f.record.photo_id.clone())
            .collect();
        photo_ids.sort();
        photo_ids.dedup();
        Ok(photo_ids)
    }

    async fn get_face(&self, face_id: Uuid) -> Result<Option<FaceRecord>> {
        let faces = self.faces.lock().await;
        Ok(faces
            .iter()
            .find(|f| f.record.face_id == face_id)
            .map(|f| f.record.clone()))
    }

    async fn count_unnamed(&self) -> Result<i64> {
        let faces = self.faces.lock().await;
        Ok(faces.iter().filter(|f| f.record.name.is_none()).count() as i64)
    }

    async fn check_health(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_face(photo: &str) -> NewFace {
        NewFace {
            face_id: Uuid::new_v4(),
            photo_id: photo.to_string(),
            bounding_box: None,
        }
    }

    #[tokio::test]
    async fn claim_skips_named_faces() {
        let store = MemoryFaceStore::new();
        let named = new_face("a.jpg");
        let unnamed = new_face("b.jpg");
        store.insert_face(&named).await.unwrap();
        store.insert_face(&unnamed).await.unwrap();
        store.assign_name(named.face_id, "Alice").await.unwrap();

        let claimed = store
            .claim_unnamed(Duration::from_secs(300))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(claimed.face_id, unnamed.face_id);
    }

    #[tokio::test]
    async fn active_lease_blocks_second_claim() {
        let store = MemoryFaceStore::new();
        store.insert_face(&new_face("a.jpg")).await.unwrap();

        let ttl = Duration::from_secs(300);
        assert!(store.claim_unnamed(ttl).await.unwrap().is_some());
        // Same face must not be offered to a second session.
        assert!(store.claim_unnamed(ttl).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_lease_is_reclaimable() {
        let store = MemoryFaceStore::new();
        store.insert_face(&new_face("a.jpg")).await.unwrap();

        assert!(store
            .claim_unnamed(Duration::from_secs(0))
            .await
            .unwrap()
            .is_some());
        // TTL zero: the lease expires immediately.
        assert!(store
            .claim_unnamed(Duration::from_secs(0))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn second_naming_attempt_conflicts() {
        let store = MemoryFaceStore::new();
        let face = new_face("a.jpg");
        store.insert_face(&face).await.unwrap();

        store.assign_name(face.face_id, "Alice").await.unwrap();
        let err = store.assign_name(face.face_id, "Bob").await.unwrap_err();
        assert!(matches!(err, FacedexError::Conflict(_)));

        // The original name survives.
        let record = store.get_face(face.face_id).await.unwrap().unwrap();
        assert_eq!(record.name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn naming_missing_face_is_not_found() {
        let store = MemoryFaceStore::new();
        let err = store.assign_name(Uuid::new_v4(), "Alice").await.unwrap_err();
        assert!(matches!(err, FacedexError::NotFound(_)));
    }

    #[tokio::test]
    async fn find_by_name_dedupes_shared_photos() {
        let store = MemoryFaceStore::new();
        // Two faces in the same photo, both named Alice, plus one Bob.
        let f1 = new_face("group.jpg");
        let f2 = new_face("group.jpg");
        let f3 = new_face("solo.jpg");
        for f in [&f1, &f2, &f3] {
            store.insert_face(f).await.unwrap();
        }
        store.assign_name(f1.face_id, "Alice").await.unwrap();
        store.assign_name(f2.face_id, "Alice").await.unwrap();
        store.assign_name(f3.face_id, "Bob").await.unwrap();

        assert_eq!(store.find_by_name("Alice").await.unwrap(), vec!["group.jpg"]);
        assert_eq!(store.find_by_name("Bob").await.unwrap(), vec!["solo.jpg"]);
        // Exact match, case-sensitive, no normalization.
        assert!(store.find_by_name("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn count_unnamed_tracks_names() {
        let store = MemoryFaceStore::new();
        let f1 = new_face("a.jpg");
        let f2 = new_face("b.jpg");
        store.insert_face(&f1).await.unwrap();
        store.insert_face(&f2).await.unwrap();
        assert_eq!(store.count_unnamed().await.unwrap(), 2);

        store.assign_name(f1.face_id, "Alice").await.unwrap();
        assert_eq!(store.count_unnamed().await.unwrap(), 1);
    }
}
