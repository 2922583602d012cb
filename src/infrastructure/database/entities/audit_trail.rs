//! Audit trail entity - one row per administrative action, never updated

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_trails")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub actor_id: String,
    /// Account the action touched, when known
    pub subject_id: Option<i32>,
    pub action: String,
    pub description: String,
    /// SUCCESS or FAILED
    pub outcome: String,
    pub remark: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
