//! CPO account entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account status as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AccountStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
}

impl Default for AccountStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// CPO account model - one merchant operating charging points
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cpo_accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// 3-character company code
    #[sea_orm(unique)]
    pub party_id: String,

    /// Company name
    pub cpo_owner_name: String,
    pub contact_name: String,

    #[sea_orm(unique)]
    pub contact_number: String,

    #[sea_orm(unique)]
    pub contact_email: String,

    #[sea_orm(unique)]
    pub username: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Prepaid balance in minor units
    pub balance: i64,

    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rfid_card::Entity")]
    RfidCards,
    #[sea_orm(has_many = "super::topup_log::Entity")]
    TopupLogs,
}

impl Related<super::rfid_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RfidCards.def()
    }
}

impl Related<super::topup_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TopupLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
