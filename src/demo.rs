//! Demo models
//!
//! A small farm marketplace schema used by the `ormeta` binary and the
//! integration tests. Every model flattens `BaseModel` for its key and
//! timestamps.

use crate::{EngineError, EngineResult, Model, ModelDescriptor, ModelRef, Registry};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Key and timestamps shared by every demo model
#[derive(Debug, Clone, Model)]
pub struct BaseModel {
    #[sql("primary_key")]
    pub id: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Model)]
pub struct AuthToken {
    #[model(flatten)]
    pub base: BaseModel,
    #[sql("index")]
    pub user_id: i32,
    #[sql("not null")]
    pub token: String,
    pub expiry: DateTime<Utc>,
}

#[derive(Debug, Clone, Model)]
pub struct User {
    #[model(flatten)]
    pub base: BaseModel,
    #[sql("not null")]
    pub first_name: String,
    #[sql("not null")]
    pub last_name: String,
    #[sql("not null")]
    pub user_name: String,
    #[sql("not null;unique")]
    pub primary_email: String,
    #[sql("not null;unique")]
    pub password: String,
    pub r#type: String,
    pub farm_id: u32,
    pub address: Address,
    pub category: String,
    pub auth_token: AuthToken,
}

#[derive(Debug, Clone, Model)]
pub struct Address {
    #[model(flatten)]
    pub base: BaseModel,
    pub farm_id: u32,
    pub user_id: u32,
    pub latitude: i32,
    pub longitude: i32,
    pub city: String,
    pub postal_or_zip_code: String,
    pub province_or_state: String,
}

#[derive(Debug, Clone, Model)]
pub struct Review {
    #[model(flatten)]
    pub base: BaseModel,
    pub stars: i32,
    pub comment: String,
}

#[derive(Debug, Clone, Model)]
pub struct Crop {
    #[model(flatten)]
    pub base: BaseModel,
    pub farm_id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Model)]
pub struct Farm {
    #[model(flatten)]
    pub base: BaseModel,
    pub owner: User,
    pub name: String,
    pub description: String,
    pub crops: Vec<Crop>,
    pub address: Address,
}

/// Handles on every persisted demo model, in declaration order
pub fn models() -> Vec<ModelRef> {
    vec![
        ModelRef::of::<AuthToken>(),
        ModelRef::of::<User>(),
        ModelRef::of::<Address>(),
        ModelRef::of::<Review>(),
        ModelRef::of::<Crop>(),
        ModelRef::of::<Farm>(),
    ]
}

/// Find a demo model by type name, ignoring case
pub fn find_model(name: &str) -> Option<ModelRef> {
    models()
        .into_iter()
        .find(|model| model.short_name().eq_ignore_ascii_case(name))
}

/// Descriptor of the demo model called `name`
///
/// Names are matched against type names and, once built, table names.
pub fn descriptor(registry: &Registry, name: &str) -> EngineResult<Arc<ModelDescriptor>> {
    if let Some(model) = find_model(name) {
        return registry.descriptor_of(model);
    }

    for model in models() {
        let descriptor = registry.descriptor_of(model)?;
        if descriptor.table_name().eq_ignore_ascii_case(name) {
            return Ok(descriptor);
        }
    }

    Err(EngineError::invalid_config(format!(
        "unknown model '{}', expected one of: {}",
        name,
        models()
            .iter()
            .map(|m| m.short_name())
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

/// Descriptors of every demo model
pub fn descriptors(registry: &Registry) -> EngineResult<Vec<Arc<ModelDescriptor>>> {
    models()
        .into_iter()
        .map(|model| registry.descriptor_of(model))
        .collect()
}
