use axum::response::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Message {
    message: &'static str,
}

pub async fn home() -> Json<Message> {
    Json(Message {
        message: "Welcome to your Cat vs Dog Classifier API!",
    })
}

pub async fn predict_info() -> Json<Message> {
    Json(Message {
        message: "GET method on Predict is called.",
    })
}
