use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(utoipa::ToSchema)]
pub struct ShopInputDoc {
    pub name: String,
    pub address: String,
    pub location: String,
    pub tel: String,
    pub map: String,
    pub open_time: String,
    pub close_time: String,
    pub price_range_min: i32,
    pub price_range_max: i32,
}

#[derive(utoipa::ToSchema)]
pub struct ServiceInputDoc {
    pub name: String,
    pub area: String,
    pub duration: i32,
    pub oil: Option<String>,
    pub price: i32,
    pub sessions: Option<i32>,
    pub description: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct CreateReservationInputDoc {
    pub resv_date: String,
    pub status: Option<String>,
    pub shop: Uuid,
    pub service: Uuid,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::shops::list,
        crate::routes::shops::get,
        crate::routes::shops::create,
        crate::routes::shops::update,
        crate::routes::shops::delete,
        crate::routes::services::list,
        crate::routes::services::list_by_shop,
        crate::routes::services::get,
        crate::routes::services::create,
        crate::routes::services::update,
        crate::routes::services::delete,
        crate::routes::reservations::list,
        crate::routes::reservations::get,
        crate::routes::reservations::create,
        crate::routes::reservations::update,
    ),
    components(
        schemas(
            HealthResponse,
            ShopInputDoc,
            ServiceInputDoc,
            CreateReservationInputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "shops"),
        (name = "services"),
        (name = "reservations")
    )
)]
pub struct ApiDoc;
