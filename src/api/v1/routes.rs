/*
 * Responsibility
 * - URL layout: /health, /animals...
 * - Bearer authentication is layered on in app.rs (middleware::auth::access)
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{
    animals::{
        create_animal, delete_animal, get_animal, list_animals, list_animals_by_stable,
        update_animal,
    },
    health::health,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/animals", get(list_animals).post(create_animal))
        .route("/animals/stable/{stable_id}", get(list_animals_by_stable))
        .route(
            "/animals/{animal_id}",
            get(get_animal).put(update_animal).delete(delete_animal),
        )
}
