use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use models::reservation::{self, ReservationStatus};
use models::{service, shop};

use crate::errors::ServiceError;
use crate::policy::Scope;
use crate::query::{build_condition, ListParams};

use super::domain::NewReservation;

/// Persistence abstraction the reservation rules run against.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Count reservations that block a new booking: pending/confirmed with a
    /// date not in the past.
    async fn count_active(&self, user_id: Uuid, now: DateTime<Utc>)
        -> Result<u64, ServiceError>;
    async fn find(&self, id: Uuid) -> Result<Option<reservation::Model>, ServiceError>;
    async fn insert(&self, data: NewReservation)
        -> Result<reservation::Model, ServiceError>;
    /// Persist a fully merged document produced by the update rules.
    async fn apply_update(
        &self,
        merged: reservation::Model,
    ) -> Result<reservation::Model, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn list(
        &self,
        scope: Scope,
        params: &ListParams,
    ) -> Result<Vec<reservation::Model>, ServiceError>;
    async fn count_scoped(&self, scope: Scope) -> Result<u64, ServiceError>;
    async fn shop_exists(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn find_service(&self, id: Uuid) -> Result<Option<service::Model>, ServiceError>;
}

fn column_for(field: &str) -> Option<reservation::Column> {
    match field {
        "id" => Some(reservation::Column::Id),
        "resvDate" => Some(reservation::Column::ResvDate),
        "status" => Some(reservation::Column::Status),
        "user" => Some(reservation::Column::UserId),
        "shop" => Some(reservation::Column::ShopId),
        "service" => Some(reservation::Column::ServiceId),
        "createdAt" => Some(reservation::Column::CreatedAt),
        _ => None,
    }
}

fn scope_condition(scope: Scope) -> Condition {
    match scope {
        Scope::All => Condition::all(),
        Scope::Owner(user_id) => {
            Condition::all().add(reservation::Column::UserId.eq(user_id))
        }
    }
}

/// SeaORM-backed store implementation.
pub struct SeaOrmReservationStore {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ReservationStore for SeaOrmReservationStore {
    async fn count_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, ServiceError> {
        reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .filter(reservation::Column::Status.is_in([
                ReservationStatus::Pending,
                ReservationStatus::Confirmed,
            ]))
            .filter(reservation::Column::ResvDate.gte(now))
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn find(&self, id: Uuid) -> Result<Option<reservation::Model>, ServiceError> {
        reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn insert(
        &self,
        data: NewReservation,
    ) -> Result<reservation::Model, ServiceError> {
        let am = reservation::ActiveModel {
            id: Set(Uuid::new_v4()),
            resv_date: Set(data.resv_date),
            status: Set(data.status),
            user_id: Set(data.user_id),
            shop_id: Set(data.shop_id),
            service_id: Set(data.service_id),
            created_at: Set(Utc::now().into()),
        };
        am.insert(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn apply_update(
        &self,
        merged: reservation::Model,
    ) -> Result<reservation::Model, ServiceError> {
        let am = reservation::ActiveModel {
            id: Set(merged.id),
            resv_date: Set(merged.resv_date),
            status: Set(merged.status),
            user_id: Set(merged.user_id),
            shop_id: Set(merged.shop_id),
            service_id: Set(merged.service_id),
            created_at: Set(merged.created_at),
        };
        am.update(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = reservation::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(res.rows_affected > 0)
    }

    async fn list(
        &self,
        scope: Scope,
        params: &ListParams,
    ) -> Result<Vec<reservation::Model>, ServiceError> {
        let cond =
            scope_condition(scope).add(build_condition(&params.filters, column_for));
        let mut query = reservation::Entity::find().filter(cond);
        for (field, order) in &params.sort {
            if let Some(col) = column_for(field) {
                query = query.order_by(col, order.clone());
            }
        }
        if params.sort.is_empty() {
            query = query.order_by_desc(reservation::Column::ResvDate);
        }
        query
            .offset(params.offset())
            .limit(params.limit)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn count_scoped(&self, scope: Scope) -> Result<u64, ServiceError> {
        reservation::Entity::find()
            .filter(scope_condition(scope))
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn shop_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let found = shop::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(found.is_some())
    }

    async fn find_service(&self, id: Uuid) -> Result<Option<service::Model>, ServiceError> {
        service::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }
}

/// Simple in-memory store for tests and doc examples. Generic filters are
/// not implemented here; scoping, sorting by date and pagination are.
pub mod mock {
    use super::*;
    use models::service::{OilType, ServiceArea};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockReservationStore {
        reservations: Mutex<HashMap<Uuid, reservation::Model>>,
        shops: Mutex<Vec<Uuid>>,
        services: Mutex<HashMap<Uuid, Uuid>>, // service id -> owning shop
    }

    impl MockReservationStore {
        pub fn seed_shop(&self) -> Uuid {
            let id = Uuid::new_v4();
            self.shops.lock().unwrap().push(id);
            id
        }

        pub fn seed_service(&self, shop_id: Uuid) -> Uuid {
            let id = Uuid::new_v4();
            self.services.lock().unwrap().insert(id, shop_id);
            id
        }

        pub fn stored(&self) -> usize {
            self.reservations.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ReservationStore for MockReservationStore {
        async fn count_active(
            &self,
            user_id: Uuid,
            now: DateTime<Utc>,
        ) -> Result<u64, ServiceError> {
            let rows = self.reservations.lock().unwrap();
            Ok(rows
                .values()
                .filter(|r| r.user_id == user_id && r.is_active(now))
                .count() as u64)
        }

        async fn find(&self, id: Uuid) -> Result<Option<reservation::Model>, ServiceError> {
            Ok(self.reservations.lock().unwrap().get(&id).cloned())
        }

        async fn insert(
            &self,
            data: NewReservation,
        ) -> Result<reservation::Model, ServiceError> {
            let row = reservation::Model {
                id: Uuid::new_v4(),
                resv_date: data.resv_date,
                status: data.status,
                user_id: data.user_id,
                shop_id: data.shop_id,
                service_id: data.service_id,
                created_at: Utc::now().into(),
            };
            self.reservations.lock().unwrap().insert(row.id, row.clone());
            Ok(row)
        }

        async fn apply_update(
            &self,
            merged: reservation::Model,
        ) -> Result<reservation::Model, ServiceError> {
            self.reservations.lock().unwrap().insert(merged.id, merged.clone());
            Ok(merged)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.reservations.lock().unwrap().remove(&id).is_some())
        }

        async fn list(
            &self,
            scope: Scope,
            params: &ListParams,
        ) -> Result<Vec<reservation::Model>, ServiceError> {
            let rows = self.reservations.lock().unwrap();
            let mut out: Vec<_> = rows
                .values()
                .filter(|r| match scope {
                    Scope::All => true,
                    Scope::Owner(user_id) => r.user_id == user_id,
                })
                .cloned()
                .collect();
            out.sort_by(|a, b| b.resv_date.cmp(&a.resv_date));
            Ok(out
                .into_iter()
                .skip(params.offset() as usize)
                .take(params.limit as usize)
                .collect())
        }

        async fn count_scoped(&self, scope: Scope) -> Result<u64, ServiceError> {
            let rows = self.reservations.lock().unwrap();
            Ok(rows
                .values()
                .filter(|r| match scope {
                    Scope::All => true,
                    Scope::Owner(user_id) => r.user_id == user_id,
                })
                .count() as u64)
        }

        async fn shop_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.shops.lock().unwrap().contains(&id))
        }

        async fn find_service(
            &self,
            id: Uuid,
        ) -> Result<Option<service::Model>, ServiceError> {
            let services = self.services.lock().unwrap();
            Ok(services.get(&id).map(|shop_id| service::Model {
                id,
                name: "Swedish massage".into(),
                area: ServiceArea::Back,
                duration: 60,
                oil: OilType::None,
                price: 900,
                sessions: 1,
                description: None,
                shop_id: *shop_id,
                created_at: Utc::now().into(),
            }))
        }
    }
}
