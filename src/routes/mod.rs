mod health;
mod home;
mod predict;

use crate::{model_service::ModelService, server::SharedState};
use axum::{routing::get, Router};

pub fn api_routes<M: ModelService>() -> Router<SharedState<M>> {
    Router::new()
        .route("/", get(home::home))
        .route(
            "/predict",
            get(home::predict_info).post(predict::predict::<M>),
        )
        .route("/health", get(health::healthcheck))
}

#[cfg(test)]
mod tests {
    use crate::{
        config::ServerConfig, inference_service::tests::MockModelService,
        preprocessing::tests::png_bytes, server::build_router,
    };
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-CAT-DOG-BOUNDARY";

    fn app(score: f32) -> Router {
        app_with_limit(score, 10 * 1024 * 1024)
    }

    fn app_with_limit(score: f32, body_limit_bytes: usize) -> Router {
        let server_config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            body_limit_bytes,
        };
        build_router(MockModelService::with_score(score), &server_config)
    }

    fn multipart_request(field: &str, filename: &str, data: &[u8]) -> Request<Body> {
        let disposition = format!("form-data; name=\"{field}\"; filename=\"{filename}\"");
        multipart_request_with_disposition(&disposition, data)
    }

    fn multipart_request_with_disposition(disposition: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_home_message() {
        let (status, body) = send(app(0.9), get("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"message": "Welcome to your Cat vs Dog Classifier API!"})
        );
    }

    #[tokio::test]
    async fn test_predict_get_message() {
        let (status, body) = send(app(0.9), get("/predict?ignored=1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "GET method on Predict is called."}));
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let (status, body) = send(app(0.9), get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "Available"}));
    }

    #[tokio::test]
    async fn test_predict_dog() {
        let request = multipart_request("file", "rex.png", &png_bytes(120, 90, [90, 60, 30]));

        let (status, body) = send(app(0.8), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"filename": "rex.png", "predicted_class": "Dog", "confidence": 0.8})
        );
    }

    #[tokio::test]
    async fn test_predict_cat() {
        let request = multipart_request("file", "tom.png", &png_bytes(30, 30, [1, 2, 3]));

        let (status, body) = send(app(0.1), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predicted_class"], "Cat");
        assert_eq!(body["confidence"], 0.9);
    }

    #[tokio::test]
    async fn test_predict_boundary_score_is_dog() {
        let request = multipart_request("file", "edge.png", &png_bytes(60, 60, [0, 0, 0]));

        let (status, body) = send(app(0.5), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["predicted_class"], "Dog");
        assert_eq!(body["confidence"], 0.5);
    }

    #[tokio::test]
    async fn test_non_image_upload_is_an_error_response() {
        let app = app(0.8);
        let request = multipart_request("file", "notes.txt", b"just some text");

        let (status, body) = send(app.clone(), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("could not decode image"));

        let (status, _) = send(app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let request = multipart_request("picture", "rex.png", &png_bytes(10, 10, [0, 0, 0]));

        let (status, body) = send(app(0.8), request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Missing `file` field in form data");
    }

    #[tokio::test]
    async fn test_file_field_without_filename_is_rejected() {
        let request = multipart_request_with_disposition(
            "form-data; name=\"file\"",
            &png_bytes(10, 10, [0, 0, 0]),
        );

        let (status, body) = send(app(0.8), request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "Upload in `file` field has no filename");
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_is_rejected() {
        let request = multipart_request("file", "big.png", &vec![0u8; 4096]);

        let response = app_with_limit(0.8, 1024).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let request = Request::builder()
            .uri("/")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();

        let response = app(0.8).oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        assert!(!response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_CREDENTIALS));
    }
}
