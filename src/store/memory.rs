//! In-memory storage adapter.
//!
//! Backs the test suite and dev mode (no `DATABASE_URL`). The claim
//! transition runs inside a single write-lock critical section, so the
//! available→claimed compare-and-swap is atomic here the same way the
//! conditional UPDATE is on Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::{
    error::AppError,
    model::{Claim, Listing, ListingStats, ListingStatus, User},
};

#[derive(Default)]
struct MemoryState {
    listings: HashMap<Uuid, Listing>,
    claims: Vec<Claim>,
    users: HashMap<Uuid, User>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity records are owned by the auth collaborator, not this service;
    /// seeding is only exposed for tests. A dev-mode server starts with no
    /// users, so auth-required routes reject until one is seeded.
    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_listing(&self, listing: Listing) -> Result<Listing, AppError> {
        let mut state = self.state.write().await;
        state.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn listing(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        Ok(self.state.read().await.listings.get(&id).cloned())
    }

    async fn available_listings(&self, now: DateTime<Utc>) -> Result<Vec<Listing>, AppError> {
        let state = self.state.read().await;

        let mut listings: Vec<Listing> = state
            .listings
            .values()
            .filter(|l| l.status == ListingStatus::Available && l.expiry_time > now)
            .cloned()
            .collect();

        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(listings)
    }

    async fn claim_listing(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;

        match state.listings.get_mut(&id) {
            Some(listing) if listing.status == ListingStatus::Available => {
                listing.status = ListingStatus::Claimed;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_claim(&self, claim: Claim) -> Result<Claim, AppError> {
        self.state.write().await.claims.push(claim.clone());
        Ok(claim)
    }

    async fn claim_by_recipient(
        &self,
        listing_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Option<Claim>, AppError> {
        Ok(self
            .state
            .read()
            .await
            .claims
            .iter()
            .find(|c| c.listing_id == listing_id && c.recipient_id == recipient_id)
            .cloned())
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn user_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.token == token)
            .cloned())
    }

    async fn stats(&self) -> Result<ListingStats, AppError> {
        let state = self.state.read().await;

        let total = state.listings.len() as i64;
        let claimed = state
            .listings
            .values()
            .filter(|l| l.status == ListingStatus::Claimed)
            .count() as i64;

        Ok(ListingStats {
            total,
            claimed,
            available: total - claimed,
        })
    }
}
