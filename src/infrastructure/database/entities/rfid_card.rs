//! RFID card entity - cards issued to a CPO account

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rfid_cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cpo_account_id: i32,
    #[sea_orm(unique)]
    pub rfid_card_tag: String,
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
