//! # Storage Adapter
//!
//! The prototypes this service replaces kept their records in whatever was
//! at hand (a Mongo collection in one, Supabase tables in another). [`Store`]
//! is the seam that hides that difference: the claim processor and the query
//! surface talk to this trait only.
//!
//! The one mutating call a listing ever sees is [`Store::claim_listing`], a
//! conditional available→claimed transition. Every adapter must make that
//! transition atomic — it is the serialization point that keeps two
//! concurrent claims from both winning.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    model::{Claim, Listing, ListingStats, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_listing(&self, listing: Listing) -> Result<Listing, AppError>;

    async fn listing(&self, id: Uuid) -> Result<Option<Listing>, AppError>;

    /// Listings with status `available` and `expiry_time` after `now`,
    /// newest-first. Full scan; this system's scale does not warrant a cursor.
    async fn available_listings(&self, now: DateTime<Utc>) -> Result<Vec<Listing>, AppError>;

    /// Conditionally transition a listing available→claimed. Returns true if
    /// this call won the transition, false if the listing was already claimed.
    /// Must be atomic with respect to concurrent callers.
    async fn claim_listing(&self, id: Uuid) -> Result<bool, AppError>;

    async fn insert_claim(&self, claim: Claim) -> Result<Claim, AppError>;

    async fn claim_by_recipient(
        &self,
        listing_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Option<Claim>, AppError>;

    async fn user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn user_by_token(&self, token: &str) -> Result<Option<User>, AppError>;

    async fn stats(&self) -> Result<ListingStats, AppError>;
}
