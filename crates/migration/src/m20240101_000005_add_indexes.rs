use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Shop: unique name
        manager
            .create_index(
                Index::create()
                    .name("uniq_shop_name")
                    .table(Shop::Table)
                    .col(Shop::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Service: index on shop_id for nested listing
        manager
            .create_index(
                Index::create()
                    .name("idx_service_shop")
                    .table(Service::Table)
                    .col(Service::ShopId)
                    .to_owned(),
            )
            .await?;

        // Reservation: composite index backing the active-count query
        manager
            .create_index(
                Index::create()
                    .name("idx_reservation_user_status_date")
                    .table(Reservation::Table)
                    .col(Reservation::UserId)
                    .col(Reservation::Status)
                    .col(Reservation::ResvDate)
                    .to_owned(),
            )
            .await?;

        // Reservation: index on resv_date for default sort and date-range filters
        manager
            .create_index(
                Index::create()
                    .name("idx_reservation_date")
                    .table(Reservation::Table)
                    .col(Reservation::ResvDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_shop_name").table(Shop::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_shop").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_reservation_user_status_date")
                    .table(Reservation::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop().name("idx_reservation_date").table(Reservation::Table).to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Shop { Table, Name }

#[derive(DeriveIden)]
enum Service { Table, ShopId }

#[derive(DeriveIden)]
enum Reservation { Table, UserId, Status, ResvDate }
