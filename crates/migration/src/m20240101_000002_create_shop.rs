//! Create `shop` table. Name uniqueness is enforced by the index migration.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shop::Table)
                    .if_not_exists()
                    .col(uuid(Shop::Id).primary_key())
                    .col(string_len(Shop::Name, 100).not_null())
                    .col(string(Shop::Address).not_null())
                    .col(string(Shop::Location).not_null())
                    .col(string_len(Shop::Tel, 32).not_null())
                    .col(string(Shop::Map).not_null())
                    .col(string_len(Shop::OpenTime, 8).not_null())
                    .col(string_len(Shop::CloseTime, 8).not_null())
                    .col(integer(Shop::PriceRangeMin).not_null())
                    .col(integer(Shop::PriceRangeMax).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Shop::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Shop {
    Table,
    Id,
    Name,
    Address,
    Location,
    Tel,
    Map,
    OpenTime,
    CloseTime,
    PriceRangeMin,
    PriceRangeMax,
}
