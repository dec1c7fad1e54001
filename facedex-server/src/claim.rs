//! Unnamed-face claim protocol.
//!
//! Drives the conversational labeling flow, independent of transport. A
//! `LabelSession` walks `AwaitingSelection → Offered → Named` (or
//! `Abandoned`), backed by the face store's atomic claim: selection and
//! lease stamp are one statement, so two sessions are never offered the
//! same face while a lease is active. Leases expire after a TTL so
//! abandoned offers become claimable again.
//!
//! Naming supports two behaviors, chosen by configuration:
//! - **re-select at label time** (default, the historical behavior): the
//!   reply names the current unnamed face. While the session's own offer
//!   is still unnamed that is the offered face itself; once it is gone or
//!   named by someone else, whichever unnamed face is claimable gets the
//!   name instead, the documented hazard of this mode.
//! - **bind by offer**: the reply names exactly the face the session was
//!   shown, and naming without an outstanding offer is an error.

use std::sync::Arc;
use std::time::Duration;

use facedex_core::{face_object_key, FacedexError, Result};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::FaceStore;

/// Labeling conversation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelState {
    /// No face offered yet.
    AwaitingSelection,
    /// A face was offered and awaits a name.
    Offered { face_id: Uuid },
    /// The offer was named.
    Named { face_id: Uuid },
    /// The offer was given up without a name; the lease TTL will free the
    /// face for another session.
    Abandoned,
}

/// A face offered for labeling, with the gateway key of its crop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferedFace {
    pub face_id: Uuid,
    pub photo_id: String,
    /// Object-store key of the crop, `faces/<face_id>.jpg`.
    pub image_key: String,
}

/// One labeling conversation.
pub struct LabelSession {
    faces: Arc<dyn FaceStore>,
    lease_ttl: Duration,
    bind_offer: bool,
    state: LabelState,
}

impl LabelSession {
    pub fn new(faces: Arc<dyn FaceStore>, lease_ttl: Duration, bind_offer: bool) -> Self {
        Self {
            faces,
            lease_ttl,
            bind_offer,
            state: LabelState::AwaitingSelection,
        }
    }

    /// Rebuild a session around an offer made earlier in the conversation,
    /// for transports that process each message in a fresh invocation.
    pub fn resume(
        faces: Arc<dyn FaceStore>,
        lease_ttl: Duration,
        bind_offer: bool,
        offered: Option<Uuid>,
    ) -> Self {
        let mut session = Self::new(faces, lease_ttl, bind_offer);
        if let Some(face_id) = offered {
            session.state = LabelState::Offered { face_id };
        }
        session
    }

    pub fn state(&self) -> LabelState {
        self.state
    }

    /// Claim one unnamed face and offer it. Returns `None` when every face
    /// is named or under an active lease.
    pub async fn select_unnamed(&mut self) -> Result<Option<OfferedFace>> {
        match self.faces.claim_unnamed(self.lease_ttl).await? {
            Some(claimed) => {
                self.state = LabelState::Offered {
                    face_id: claimed.face_id,
                };
                debug!(face_id = %claimed.face_id, "face offered for labeling");
                Ok(Some(OfferedFace {
                    image_key: face_object_key(claimed.face_id),
                    face_id: claimed.face_id,
                    photo_id: claimed.photo_id,
                }))
            }
            None => Ok(None),
        }
    }

    /// Name a face. Returns the face that was named, or `None` when there
    /// is nothing to name (re-select mode with no unnamed face left).
    pub async fn assign_name(&mut self, name: &str) -> Result<Option<Uuid>> {
        if name.trim().is_empty() {
            return Err(FacedexError::InvalidInput("empty name".into()));
        }

        let target = if self.bind_offer {
            match self.state {
                LabelState::Offered { face_id } => face_id,
                _ => {
                    return Err(FacedexError::InvalidInput(
                        "no face is currently offered to this session".into(),
                    ))
                }
            }
        } else {
            // Historical behavior: re-select the current unnamed face at
            // labeling time. The session's own offer is still the current
            // unnamed face while nobody has named it, and its own lease
            // would block a re-claim, so prefer it; only claim fresh when
            // the offer is gone or already named.
            match self.own_offer_if_unnamed().await? {
                Some(face_id) => face_id,
                None => match self.faces.claim_unnamed(self.lease_ttl).await? {
                    Some(claimed) => claimed.face_id,
                    None => return Ok(None),
                },
            }
        };

        self.faces.assign_name(target, name).await?;
        self.state = LabelState::Named { face_id: target };
        info!(face_id = %target, "face named");
        Ok(Some(target))
    }

    /// The session's own offered face, when it exists and is still
    /// unnamed.
    async fn own_offer_if_unnamed(&self) -> Result<Option<Uuid>> {
        let LabelState::Offered { face_id } = self.state else {
            return Ok(None);
        };
        match self.faces.get_face(face_id).await? {
            Some(record) if record.name.is_none() => Ok(Some(face_id)),
            _ => Ok(None),
        }
    }

    /// Drop the current offer without naming it. The face stays leased
    /// until the TTL passes, then becomes claimable again.
    pub fn abandon(&mut self) {
        if matches!(self.state, LabelState::Offered { .. }) {
            self.state = LabelState::Abandoned;
        }
    }

    /// Ordered distinct photo keys for faces named exactly `name`.
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<String>> {
        self.faces.find_by_name(name).await
    }
}
