//! Top-up log entity - the append-only balance ledger

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger row kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum EntryKind {
    #[sea_orm(string_value = "TOPUP")]
    Topup,
    #[sea_orm(string_value = "VOID")]
    Void,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "topup_logs")]
pub struct Model {
    /// Reference id used to void a top-up
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cpo_account_id: i32,
    pub kind: EntryKind,
    /// Always positive, in minor units
    pub amount: i64,
    #[sea_orm(unique)]
    pub reference_number: String,
    /// Set on a top-up once a VOID row reverses it
    pub void_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cpo_account::Entity",
        from = "Column::CpoAccountId",
        to = "super::cpo_account::Column::Id",
        on_delete = "Cascade"
    )]
    CpoAccount,
}

impl Related<super::cpo_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CpoAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
