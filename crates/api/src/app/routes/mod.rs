use axum::{
    Router,
    routing::{get, put},
};

pub mod records;
pub mod system;

/// Per-collection CRUD: `/{collection}` and `/{collection}/{id}`.
pub fn router() -> Router {
    Router::new()
        .route("/:collection", get(records::list).post(records::create))
        .route("/:collection/:id", put(records::update).delete(records::remove))
}
