//! # Claim Processor
//!
//! The one piece of this system with an actual correctness requirement.
//!
//! The prototype implementations ran a check-then-insert sequence with no
//! serialization: two concurrent claims could both observe `available` and
//! both get recorded. Here the duplicate and reference checks stay advisory,
//! and [`Store::claim_listing`] — an atomic conditional available→claimed
//! transition — is the single point that decides the race. Losing the
//! transition reports [`AppError::Conflict`], same as observing a claimed
//! listing up front.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    model::{Claim, ClaimStatus, ListingStatus},
    store::Store,
};

pub async fn attempt_claim(
    store: &dyn Store,
    listing_id: Uuid,
    recipient_id: Uuid,
    requested_quantity: Option<i32>,
    message: Option<String>,
) -> Result<Claim, AppError> {
    let listing = store
        .listing(listing_id)
        .await?
        .ok_or(AppError::NotFound("Donation"))?;

    if listing.status != ListingStatus::Available {
        return Err(AppError::Conflict("Donation no longer available"));
    }

    store
        .user(recipient_id)
        .await?
        .ok_or(AppError::InvalidReference("Claimer"))?;

    if store
        .claim_by_recipient(listing_id, recipient_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Already claimed this donation"));
    }

    // The serialization point: exactly one caller wins this transition.
    if !store.claim_listing(listing_id).await? {
        return Err(AppError::Conflict("Donation no longer available"));
    }

    let claim = Claim {
        id: Uuid::new_v4(),
        listing_id,
        recipient_id,
        // Non-positive requests count as unspecified and take the listing's
        // quantity; a zero-quantity claim is never recorded.
        requested_quantity: requested_quantity
            .filter(|q| *q >= 1)
            .unwrap_or(listing.quantity),
        message,
        status: ClaimStatus::Pending,
        created_at: Utc::now(),
    };

    // A datastore failure here strands the listing as claimed with no claim
    // record; it stays unclaimable until repaired out of band.
    store.insert_claim(claim).await
}
