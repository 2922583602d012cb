//! Create audit_trails table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditTrails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditTrails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditTrails::ActorId).string().not_null())
                    .col(ColumnDef::new(AuditTrails::SubjectId).integer().null())
                    .col(ColumnDef::new(AuditTrails::Action).string_len(32).not_null())
                    .col(ColumnDef::new(AuditTrails::Description).string().not_null())
                    .col(ColumnDef::new(AuditTrails::Outcome).string_len(16).not_null())
                    .col(ColumnDef::new(AuditTrails::Remark).string().not_null())
                    .col(
                        ColumnDef::new(AuditTrails::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_trails_subject_id")
                    .table(AuditTrails::Table)
                    .col(AuditTrails::SubjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditTrails::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuditTrails {
    Table,
    Id,
    ActorId,
    SubjectId,
    Action,
    Description,
    Outcome,
    Remark,
    CreatedAt,
}
