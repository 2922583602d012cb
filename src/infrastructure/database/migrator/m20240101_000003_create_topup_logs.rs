//! Create topup_logs table

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
                    .table(TopupLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TopupLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TopupLogs::CpoAccountId).integer().not_null())
                    .col(ColumnDef::new(TopupLogs::Kind).string_len(8).not_null())
                    .col(ColumnDef::new(TopupLogs::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(TopupLogs::ReferenceNumber)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TopupLogs::VoidId).integer().null())
                    .col(
                        ColumnDef::new(TopupLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_topup_logs_cpo_account")
                            .from(TopupLogs::Table, TopupLogs::CpoAccountId)
                            .to(CpoAccounts::Table, CpoAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_topup_logs_account_created")
                    .table(TopupLogs::Table)
                    .col(TopupLogs::CpoAccountId)
                    .col(TopupLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TopupLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TopupLogs {
    Table,
    Id,
    CpoAccountId,
    Kind,
    Amount,
    ReferenceNumber,
    VoidId,
    CreatedAt,
}
