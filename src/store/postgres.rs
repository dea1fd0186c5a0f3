//! Postgres storage adapter.
//!
//! Pooled connections; every query is a plain runtime-bound statement, no
//! prepared-statement macros, so the crate builds without a live database.
//! The available→claimed transition is a conditional UPDATE and the reported
//! row count decides the claim race.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    FromRow,
    postgres::{PgPool, PgPoolOptions},
};
use uuid::Uuid;

use super::Store;
use crate::{
    error::AppError,
    model::{Claim, ClaimStatus, Listing, ListingStats, ListingStatus, User},
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    token TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS listings (
    id UUID PRIMARY KEY,
    donor_id UUID NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    category TEXT,
    quantity INT NOT NULL CHECK (quantity >= 1),
    unit TEXT,
    pickup_location TEXT,
    expiry_time TIMESTAMPTZ NOT NULL,
    status TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS claims (
    id UUID PRIMARY KEY,
    listing_id UUID NOT NULL REFERENCES listings(id),
    recipient_id UUID NOT NULL,
    requested_quantity INT NOT NULL,
    message TEXT,
    status TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
";

const LISTING_COLUMNS: &str = "id, donor_id, title, description, category, quantity, unit, \
     pickup_location, expiry_time, status, created_at";

#[derive(FromRow)]
struct ListingRow {
    id: Uuid,
    donor_id: Uuid,
    title: String,
    description: Option<String>,
    category: Option<String>,
    quantity: i32,
    unit: Option<String>,
    pickup_location: Option<String>,
    expiry_time: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = sqlx::Error;

    fn try_from(row: ListingRow) -> Result<Self, sqlx::Error> {
        let status = ListingStatus::parse(&row.status)
            .ok_or_else(|| sqlx::Error::Decode("unknown listing status".into()))?;

        Ok(Listing {
            id: row.id,
            donor_id: row.donor_id,
            title: row.title,
            description: row.description,
            category: row.category,
            quantity: row.quantity,
            unit: row.unit,
            pickup_location: row.pickup_location,
            expiry_time: row.expiry_time,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ClaimRow {
    id: Uuid,
    listing_id: Uuid,
    recipient_id: Uuid,
    requested_quantity: i32,
    message: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ClaimRow> for Claim {
    fn from(row: ClaimRow) -> Self {
        Claim {
            id: row.id,
            listing_id: row.listing_id,
            recipient_id: row.recipient_id,
            requested_quantity: row.requested_quantity,
            message: row.message,
            status: ClaimStatus::Pending,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    token: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            token: row.token,
        }
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_listing(&self, listing: Listing) -> Result<Listing, AppError> {
        sqlx::query(
            "INSERT INTO listings (id, donor_id, title, description, category, quantity, unit, \
             pickup_location, expiry_time, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(listing.id)
        .bind(listing.donor_id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(&listing.category)
        .bind(listing.quantity)
        .bind(&listing.unit)
        .bind(&listing.pickup_location)
        .bind(listing.expiry_time)
        .bind(listing.status.as_str())
        .bind(listing.created_at)
        .execute(&self.pool)
        .await?;

        Ok(listing)
    }

    async fn listing(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        let row: Option<ListingRow> =
            sqlx::query_as(&format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Listing::try_from).transpose().map_err(Into::into)
    }

    async fn available_listings(&self, now: DateTime<Utc>) -> Result<Vec<Listing>, AppError> {
        let rows: Vec<ListingRow> = sqlx::query_as(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE status = 'available' AND expiry_time > $1 \
             ORDER BY created_at DESC"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Listing::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn claim_listing(&self, id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE listings SET status = 'claimed' WHERE id = $1 AND status = 'available'")
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_claim(&self, claim: Claim) -> Result<Claim, AppError> {
        sqlx::query(
            "INSERT INTO claims (id, listing_id, recipient_id, requested_quantity, message, \
             status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(claim.id)
        .bind(claim.listing_id)
        .bind(claim.recipient_id)
        .bind(claim.requested_quantity)
        .bind(&claim.message)
        .bind(claim.status.as_str())
        .bind(claim.created_at)
        .execute(&self.pool)
        .await?;

        Ok(claim)
    }

    async fn claim_by_recipient(
        &self,
        listing_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Option<Claim>, AppError> {
        let row: Option<ClaimRow> = sqlx::query_as(
            "SELECT id, listing_id, recipient_id, requested_quantity, message, created_at \
             FROM claims WHERE listing_id = $1 AND recipient_id = $2",
        )
        .bind(listing_id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Claim::from))
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT id, name, token FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn user_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, token FROM users WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(User::from))
    }

    async fn stats(&self) -> Result<ListingStats, AppError> {
        let (total, claimed): (i64, i64) = sqlx::query_as(
            "SELECT count(*), count(*) FILTER (WHERE status = 'claimed') FROM listings",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ListingStats {
            total,
            claimed,
            available: total - claimed,
        })
    }
}
