use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

// --- Identity & Session Schemas ---

/// AuthUser
///
/// The resolved identity of an authenticated principal, mirroring the minimal
/// data carried by the external auth provider's `auth.users` record.
/// This is the value the Content Submission Gate stamps into new records.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AuthUser {
    /// Primary key, shared with the provider's `auth.users.id` and `public.profiles.id`.
    pub id: Uuid,
    /// The user's primary identifier, stamped into content as `author_email`.
    pub email: String,
}

/// Session
///
/// An authenticated-principal handle issued by the external provider.
/// Created by sign-in/sign-up, destroyed by sign-out; expiry is carried inside
/// the access token itself (JWT `exp` claim) and checked on every lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token used for all subsequent provider calls.
    pub access_token: String,
    /// Optional refresh token. Unused by this crate (refresh flows are the
    /// provider's concern) but preserved for callers that persist sessions.
    pub refresh_token: Option<String>,
    /// The principal the session belongs to.
    pub user: AuthUser,
}

/// Profile
///
/// Read-only mirror of a row in the provider's `public.profiles` table,
/// created externally on signup. Only the `role` attribute participates in
/// authorization decisions; everything else is informational.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// The RBAC field. `Some("admin")` grants the admin role; any other
    /// present value is an ordinary authenticated user; a missing value
    /// degrades to guest (fail-closed).
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Role
///
/// Derived authorization level, recomputed per request from Session + Profile.
/// Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Authenticated,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Guest => write!(f, "guest"),
            Role::Authenticated => write!(f, "authenticated"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

// --- Content Schemas ---

/// ContentKind
///
/// The two independent content collections. `Post` submissions are open to any
/// authenticated user; `Blog` submissions are restricted to admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Post,
    Blog,
}

impl ContentKind {
    /// The provider-side collection (table) name this kind maps to.
    pub fn collection(&self) -> &'static str {
        match self {
            ContentKind::Post => "posts",
            ContentKind::Blog => "blogs",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Post => write!(f, "post"),
            ContentKind::Blog => write!(f, "blog"),
        }
    }
}

/// ContentItem
///
/// A persisted record from either collection. `id` and `created_at` are
/// assigned by the Content Store; `user_id` and `author_email` are stamped by
/// the Content Submission Gate and are never trusted from caller input.
/// The payload columns vary per collection, so they ride in the flattened map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    /// Owner, stamped from the creating session.
    pub user_id: Uuid,
    /// Owner's email, stamped from the creating session.
    pub author_email: String,
    /// Store-assigned insertion timestamp; listing order is derived from it.
    pub created_at: DateTime<Utc>,
    /// Collection-specific payload columns (title, body, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

// --- Request Payloads (Input Schemas) ---

/// PostDraft
///
/// Typed input payload for submitting an interview post. Ownership metadata is
/// deliberately absent: it is stamped by the gate, not supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// BlogDraft
///
/// Typed input payload for submitting a blog entry (admin-only path).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlogDraft {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
