//! # Data Model
//!
//! Core records for the donation marketplace.
//!
//! A [`Listing`] is a donor's offer of surplus food. Its `status` is a
//! two-state lifecycle: `available` until somebody wins the claim race,
//! `claimed` forever after. The transition happens at most once and never
//! reverts.
//!
//! A [`Claim`] is a recipient's request to take (part of) a listing. At most
//! one claim ever succeeds per listing; the storage adapter's conditional
//! status update is the gate that enforces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    Claimed,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::Claimed => "claimed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(ListingStatus::Available),
            "claimed" => Some(ListingStatus::Claimed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: i32,
    pub unit: Option<String>,
    pub pickup_location: Option<String>,
    pub expiry_time: DateTime<Utc>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub recipient_id: Uuid,
    pub requested_quantity: i32,
    pub message: Option<String>,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
}

/// Identity record as seen through the opaque identity collaborator. Only
/// ever read; issuing tokens is somebody else's problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub token: String,
}

/// Dashboard counts over all listings.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ListingStats {
    pub total: i64,
    pub claimed: i64,
    pub available: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateListing {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub pickup_location: Option<String>,
    pub expiry_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClaim {
    pub claimer_id: Option<Uuid>,
    pub requested_quantity: Option<i32>,
    pub message: Option<String>,
}
