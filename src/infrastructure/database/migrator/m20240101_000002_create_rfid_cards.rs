//! Create rfid_cards table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_cpo_accounts::CpoAccounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RfidCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RfidCards::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RfidCards::CpoAccountId).integer().not_null())
                    .col(
                        ColumnDef::new(RfidCards::RfidCardTag)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(RfidCards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rfid_cards_cpo_account")
                            .from(RfidCards::Table, RfidCards::CpoAccountId)
                            .to(CpoAccounts::Table, CpoAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rfid_cards_cpo_account_id")
                    .table(RfidCards::Table)
                    .col(RfidCards::CpoAccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RfidCards::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RfidCards {
    Table,
    Id,
    CpoAccountId,
    RfidCardTag,
    CreatedAt,
}
