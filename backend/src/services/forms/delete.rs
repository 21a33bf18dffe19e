use crate::services::blocking;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// `DELETE /api/forms/{submission_id}`. Deleting an unknown ID succeeds.
pub async fn process(state: web::Data<AppState>, submission_id: web::Path<String>) -> impl Responder {
    let store = state.forms.clone();
    let id = submission_id.into_inner();
    match blocking("Failed to delete form submission", move || store.delete(&id)).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Form submission deleted successfully" })),
        Err(e) => e.into_response(),
    }
}
