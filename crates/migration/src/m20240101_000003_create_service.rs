//! Create `service` table with FK to `shop`.
//!
//! RESTRICT on delete: a shop with services cannot be removed until its
//! services are gone (no cascading, no orphans).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(string_len(Service::Name, 128).not_null())
                    .col(string_len(Service::Area, 16).not_null())
                    .col(integer(Service::Duration).not_null())
                    .col(string_len(Service::Oil, 16).not_null())
                    .col(integer(Service::Price).not_null())
                    .col(integer(Service::Sessions).not_null())
                    .col(ColumnDef::new(Service::Description).text().null())
                    .col(uuid(Service::ShopId).not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_shop")
                            .from(Service::Table, Service::ShopId)
                            .to(Shop::Table, Shop::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    Name,
    Area,
    Duration,
    Oil,
    Price,
    Sessions,
    Description,
    ShopId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Shop { Table, Id }
