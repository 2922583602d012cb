//! Create cpo_accounts table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CpoAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CpoAccounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CpoAccounts::PartyId).string_len(3).not_null())
                    .col(ColumnDef::new(CpoAccounts::CpoOwnerName).string().not_null())
                    .col(ColumnDef::new(CpoAccounts::ContactName).string().not_null())
                    .col(ColumnDef::new(CpoAccounts::ContactNumber).string_len(16).not_null())
                    .col(ColumnDef::new(CpoAccounts::ContactEmail).string().not_null())
                    .col(ColumnDef::new(CpoAccounts::Username).string_len(64).not_null())
                    .col(ColumnDef::new(CpoAccounts::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(CpoAccounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CpoAccounts::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(CpoAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CpoAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Party id uniqueness is the final arbiter for concurrent registrations
        for (name, column) in [
            ("idx_cpo_accounts_party_id", CpoAccounts::PartyId),
            ("idx_cpo_accounts_username", CpoAccounts::Username),
            ("idx_cpo_accounts_contact_email", CpoAccounts::ContactEmail),
            ("idx_cpo_accounts_contact_number", CpoAccounts::ContactNumber),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(CpoAccounts::Table)
                        .col(column)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_cpo_accounts_owner_name")
                    .table(CpoAccounts::Table)
                    .col(CpoAccounts::CpoOwnerName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CpoAccounts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum CpoAccounts {
    Table,
    Id,
    PartyId,
    CpoOwnerName,
    ContactName,
    ContactNumber,
    ContactEmail,
    Username,
    PasswordHash,
    Balance,
    Status,
    CreatedAt,
    UpdatedAt,
}
