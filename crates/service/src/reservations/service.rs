use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use models::reservation;

use crate::errors::ServiceError;
use crate::policy::{self, Caller, ResvAction};
use crate::query::ListParams;

use super::domain::{CreateReservationInput, NewReservation, ReservationPatch};
use super::repository::ReservationStore;

/// A user may hold at most this many active reservations at once.
pub const MAX_ACTIVE_RESERVATIONS: u64 = 3;

/// Reservation business rules over a [`ReservationStore`].
///
/// Every precondition runs before any write; the first failure
/// short-circuits and nothing is persisted.
pub struct ReservationService<S: ReservationStore> {
    store: Arc<S>,
}

impl<S: ReservationStore> ReservationService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a reservation for the caller.
    ///
    /// Checks, in order: active-reservation cap, shop existence, service
    /// existence, service/shop consistency. The owner is always the caller,
    /// whatever the payload says. Returns the created row and the new
    /// active count.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use chrono::{Duration, Utc};
    /// use models::user::Role;
    /// use service::policy::Caller;
    /// use service::reservations::domain::CreateReservationInput;
    /// use service::reservations::repository::mock::MockReservationStore;
    /// use service::reservations::service::ReservationService;
    ///
    /// let store = Arc::new(MockReservationStore::default());
    /// let shop = store.seed_shop();
    /// let massage = store.seed_service(shop);
    /// let svc = ReservationService::new(store);
    /// let caller = Caller { id: uuid::Uuid::new_v4(), role: Role::User };
    /// let now = Utc::now();
    /// let input = CreateReservationInput {
    ///     resv_date: (now + Duration::days(3)).into(),
    ///     status: None,
    ///     shop,
    ///     service: massage,
    ///     user: None,
    /// };
    /// let (created, active) = tokio_test::block_on(svc.create(&caller, input, now)).unwrap();
    /// assert_eq!(created.user_id, caller.id);
    /// assert_eq!(active, 1);
    /// ```
    #[instrument(skip(self, input), fields(user_id = %caller.id, shop_id = %input.shop))]
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateReservationInput,
        now: DateTime<Utc>,
    ) -> Result<(reservation::Model, u64), ServiceError> {
        let active = self.store.count_active(caller.id, now).await?;
        if active >= MAX_ACTIVE_RESERVATIONS {
            return Err(ServiceError::Validation(
                "You can only have up to 3 active reservations. \
                 Please cancel an existing reservation first."
                    .into(),
            ));
        }
        if !self.store.shop_exists(input.shop).await? {
            return Err(ServiceError::not_found_with_id("Shop", input.shop));
        }
        let service = self
            .store
            .find_service(input.service)
            .await?
            .ok_or_else(|| ServiceError::not_found_with_id("Service", input.service))?;
        if service.shop_id != input.shop {
            return Err(ServiceError::Validation(
                "Service does not belong to the selected shop".into(),
            ));
        }

        let created = self
            .store
            .insert(NewReservation {
                resv_date: input.resv_date,
                status: input.status.unwrap_or_default(),
                // owner comes from the token, never the payload
                user_id: caller.id,
                shop_id: input.shop,
                service_id: input.service,
            })
            .await?;
        info!(reservation_id = %created.id, active = active + 1, "created reservation");
        Ok((created, active + 1))
    }

    pub async fn get(
        &self,
        caller: &Caller,
        id: Uuid,
    ) -> Result<reservation::Model, ServiceError> {
        let found = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found_with_id("Reservation", id))?;
        if !policy::can_view_reservation(caller, found.user_id) {
            return Err(ServiceError::Forbidden(
                "Not authorized to access this reservation".into(),
            ));
        }
        Ok(found)
    }

    /// List reservations visible to the caller. Non-admin callers are
    /// hard-scoped to their own rows and lose the generic filter surface;
    /// sort and pagination still apply.
    pub async fn list(
        &self,
        caller: &Caller,
        mut params: ListParams,
    ) -> Result<(Vec<reservation::Model>, u64), ServiceError> {
        let scope = policy::reservation_scope(caller);
        if !caller.is_admin() {
            params.filters.clear();
            params.select = None;
        }
        let rows = self.store.list(scope, &params).await?;
        let total = self.store.count_scoped(scope).await?;
        Ok((rows, total))
    }

    /// Merge the patch into the stored row, re-validate the merged document
    /// (including shop/service consistency when either reference changes)
    /// and persist it.
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        patch: ReservationPatch,
        now: DateTime<Utc>,
    ) -> Result<reservation::Model, ServiceError> {
        let existing = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found_with_id("Reservation", id))?;
        policy::authorize_reservation_change(
            caller,
            existing.user_id,
            existing.resv_date.with_timezone(&Utc),
            now,
            ResvAction::Edit,
        )?;

        let mut merged = existing.clone();
        if let Some(date) = patch.resv_date {
            merged.resv_date = date;
        }
        if let Some(status) = patch.status {
            merged.status = status;
        }
        if let Some(shop_id) = patch.shop {
            merged.shop_id = shop_id;
        }
        if let Some(service_id) = patch.service {
            merged.service_id = service_id;
        }

        if merged.shop_id != existing.shop_id || merged.service_id != existing.service_id {
            if !self.store.shop_exists(merged.shop_id).await? {
                return Err(ServiceError::not_found_with_id("Shop", merged.shop_id));
            }
            let service = self
                .store
                .find_service(merged.service_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::not_found_with_id("Service", merged.service_id)
                })?;
            if service.shop_id != merged.shop_id {
                return Err(ServiceError::Validation(
                    "Service does not belong to the selected shop".into(),
                ));
            }
        }

        let updated = self.store.apply_update(merged).await?;
        info!(reservation_id = %updated.id, "updated reservation");
        Ok(updated)
    }

    pub async fn delete(
        &self,
        caller: &Caller,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let existing = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found_with_id("Reservation", id))?;
        policy::authorize_reservation_change(
            caller,
            existing.user_id,
            existing.resv_date.with_timezone(&Utc),
            now,
            ResvAction::Cancel,
        )?;
        self.store.delete(id).await?;
        info!(reservation_id = %id, "cancelled reservation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use models::reservation::ReservationStatus;
    use models::user::Role;

    use crate::reservations::repository::mock::MockReservationStore;

    fn user() -> Caller {
        Caller { id: Uuid::new_v4(), role: Role::User }
    }

    fn admin() -> Caller {
        Caller { id: Uuid::new_v4(), role: Role::Admin }
    }

    fn input(
        shop: Uuid,
        service: Uuid,
        date: DateTime<Utc>,
    ) -> CreateReservationInput {
        CreateReservationInput {
            resv_date: date.into(),
            status: None,
            shop,
            service,
            user: None,
        }
    }

    struct Fixture {
        store: Arc<MockReservationStore>,
        svc: ReservationService<MockReservationStore>,
        shop: Uuid,
        service: Uuid,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MockReservationStore::default());
        let shop = store.seed_shop();
        let service = store.seed_service(shop);
        let svc = ReservationService::new(Arc::clone(&store));
        Fixture { store, svc, shop, service }
    }

    #[tokio::test]
    async fn fourth_active_reservation_is_rejected_with_cap_message() {
        let f = fixture();
        let caller = user();
        let now = Utc::now();
        for day in 1..=3 {
            let (_, active) = f
                .svc
                .create(&caller, input(f.shop, f.service, now + Duration::days(day)), now)
                .await
                .unwrap();
            assert_eq!(active, day as u64);
        }
        let err = f
            .svc
            .create(&caller, input(f.shop, f.service, now + Duration::days(9)), now)
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(msg) => {
                assert!(msg.contains("up to 3 active reservations"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(f.store.stored(), 3);
    }

    #[tokio::test]
    async fn cancelled_and_past_reservations_do_not_count_toward_cap() {
        let f = fixture();
        let caller = user();
        let now = Utc::now();
        // three bookings that are no longer active
        for _ in 0..2 {
            f.store
                .insert(NewReservation {
                    resv_date: (now + Duration::days(2)).into(),
                    status: ReservationStatus::Cancelled,
                    user_id: caller.id,
                    shop_id: f.shop,
                    service_id: f.service,
                })
                .await
                .unwrap();
        }
        f.store
            .insert(NewReservation {
                resv_date: (now - Duration::days(2)).into(),
                status: ReservationStatus::Confirmed,
                user_id: caller.id,
                shop_id: f.shop,
                service_id: f.service,
            })
            .await
            .unwrap();

        let (_, active) = f
            .svc
            .create(&caller, input(f.shop, f.service, now + Duration::days(3)), now)
            .await
            .unwrap();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn missing_shop_and_service_yield_id_bearing_not_found() {
        let f = fixture();
        let caller = user();
        let now = Utc::now();
        let ghost = Uuid::new_v4();

        let err = f
            .svc
            .create(&caller, input(ghost, f.service, now + Duration::days(1)), now)
            .await
            .unwrap_err();
        assert!(matches!(&err, ServiceError::NotFound(msg) if msg.contains(&ghost.to_string())));

        let err = f
            .svc
            .create(&caller, input(f.shop, ghost, now + Duration::days(1)), now)
            .await
            .unwrap_err();
        assert!(matches!(&err, ServiceError::NotFound(msg) if msg.starts_with("Service")));
        assert_eq!(f.store.stored(), 0);
    }

    #[tokio::test]
    async fn service_from_another_shop_is_rejected_and_nothing_persists() {
        let f = fixture();
        let other_shop = f.store.seed_shop();
        let other_service = f.store.seed_service(other_shop);
        let caller = user();
        let now = Utc::now();

        let err = f
            .svc
            .create(&caller, input(f.shop, other_service, now + Duration::days(1)), now)
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(msg) => {
                assert_eq!(msg, "Service does not belong to the selected shop")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(f.store.stored(), 0);
    }

    #[tokio::test]
    async fn owner_is_forced_from_the_caller() {
        let f = fixture();
        let caller = user();
        let now = Utc::now();
        let mut payload = input(f.shop, f.service, now + Duration::days(1));
        payload.user = Some(Uuid::new_v4());

        let (created, _) = f.svc.create(&caller, payload, now).await.unwrap();
        assert_eq!(created.user_id, caller.id);
    }

    #[tokio::test]
    async fn non_admin_listing_only_sees_own_rows() {
        let f = fixture();
        let alice = user();
        let bob = user();
        let now = Utc::now();
        for (who, day) in [(&alice, 1), (&bob, 2), (&alice, 3)] {
            f.svc
                .create(who, input(f.shop, f.service, now + Duration::days(day)), now)
                .await
                .unwrap();
        }

        let params = ListParams::from_query(&Default::default());
        let (rows, total) = f.svc.list(&alice, params.clone()).await.unwrap();
        assert_eq!(total, 2);
        assert!(rows.iter().all(|r| r.user_id == alice.id));

        let (rows, total) = f.svc.list(&admin(), params).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn get_denies_strangers_and_serves_owner_and_admin() {
        let f = fixture();
        let owner = user();
        let now = Utc::now();
        let (created, _) = f
            .svc
            .create(&owner, input(f.shop, f.service, now + Duration::days(1)), now)
            .await
            .unwrap();

        assert!(f.svc.get(&owner, created.id).await.is_ok());
        assert!(f.svc.get(&admin(), created.id).await.is_ok());
        let err = f.svc.get(&user(), created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn owner_cannot_update_inside_the_window_but_admin_can() {
        let f = fixture();
        let owner = user();
        let now = Utc::now();
        let (created, _) = f
            .svc
            .create(&owner, input(f.shop, f.service, now + Duration::hours(10)), now)
            .await
            .unwrap();

        let patch =
            ReservationPatch { status: Some(ReservationStatus::Confirmed), ..Default::default() };
        let err = f.svc.update(&owner, created.id, patch.clone(), now).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let updated = f.svc.update(&admin(), created.id, patch, now).await.unwrap();
        assert_eq!(updated.status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn update_revalidates_merged_references() {
        let f = fixture();
        let other_shop = f.store.seed_shop();
        let other_service = f.store.seed_service(other_shop);
        let owner = user();
        let now = Utc::now();
        let (created, _) = f
            .svc
            .create(&owner, input(f.shop, f.service, now + Duration::days(5)), now)
            .await
            .unwrap();

        // moving the service without moving the shop breaks consistency
        let patch =
            ReservationPatch { service: Some(other_service), ..Default::default() };
        let err = f.svc.update(&owner, created.id, patch, now).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // moving both together is fine
        let patch = ReservationPatch {
            shop: Some(other_shop),
            service: Some(other_service),
            ..Default::default()
        };
        let updated = f.svc.update(&owner, created.id, patch, now).await.unwrap();
        assert_eq!(updated.shop_id, other_shop);
    }

    #[tokio::test]
    async fn update_of_missing_reservation_is_not_found() {
        let f = fixture();
        let err = f
            .svc
            .update(&admin(), Uuid::new_v4(), ReservationPatch::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn owner_can_cancel_outside_window_and_row_disappears() {
        let f = fixture();
        let owner = user();
        let now = Utc::now();
        let (created, _) = f
            .svc
            .create(&owner, input(f.shop, f.service, now + Duration::days(2)), now)
            .await
            .unwrap();

        f.svc.delete(&owner, created.id, now).await.unwrap();
        let params = ListParams::from_query(&Default::default());
        let (rows, total) = f.svc.list(&owner, params).await.unwrap();
        assert_eq!(total, 0);
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn stranger_cannot_cancel() {
        let f = fixture();
        let owner = user();
        let now = Utc::now();
        let (created, _) = f
            .svc
            .create(&owner, input(f.shop, f.service, now + Duration::days(2)), now)
            .await
            .unwrap();

        let err = f.svc.delete(&user(), created.id, now).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert_eq!(f.store.stored(), 1);
    }
}
