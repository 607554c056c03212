#[cfg(test)]
mod router_tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::api::app_state::AppState;
    use crate::api::{create_app, create_router};
    use crate::observability::ObservabilityState;
    use std::sync::Arc;
    use crate::config::config::AppConfig;
    use crate::security::auth::{BasicCredentials, MockCredentialVerifier};

    const BOUNDARY: &str = "tabquery-test-boundary";
    const INVENTORY_CSV: &str = "name,category,quantity,price,location\n\
        apple,fruit,50,1.25,Aisle 3\n\
        banana,fruit,lots,0.5,Aisle 4\n\
        milk,dairy,20,2.99,Fridge 1\n";

    fn test_state() -> AppState {
        AppState::development(&AppConfig::development()).unwrap()
    }

    fn auth_header() -> String {
        BasicCredentials::new("admin", "password").to_header_value()
    }

    fn multipart_body(filename: &str, content: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = content
        )
    }

    fn upload_request(filename: &str, content: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upload-csv")
            .header(header::AUTHORIZATION, auth_header())
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(filename, content)))
            .unwrap()
    }

    fn ask_request(question: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask-data-ai")
            .header(header::AUTHORIZATION, auth_header())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "question": question }).to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_root_returns_welcome() {
        let app = create_router(test_state());

        let (status, body) = send(&app, get_request("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("Welcome"));
    }

    #[tokio::test]
    async fn test_protected_routes_require_credentials() {
        let app = create_router(test_state());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/logs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let app = create_router(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/ask-data-ai")
            .header(
                header::AUTHORIZATION,
                BasicCredentials::new("admin", "nope").to_header_value(),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "question": "price of apple" }).to_string()))
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_upload_then_read_and_ask() {
        let app = create_router(test_state());

        let (status, body) = send(&app, upload_request("inventory.csv", INVENTORY_CSV)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["inserted_count"], 2);
        assert_eq!(body["inserted_ids"], json!([1, 2]));
        assert_eq!(body["rejected_count"], 1);
        assert_eq!(body["rejected"][0]["row_index"], 1);
        assert_eq!(body["rejected"][0]["kind"], "TYPE_MISMATCH");

        let (status, body) = send(&app, get_request("/data")).await;
        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(items[0]["original_filename"], "inventory.csv");
        assert_eq!(items[0]["row_data"]["name"], "apple");
        assert_eq!(items[1]["row_data"]["quantity"], 20);

        let (status, body) = send(&app, get_request("/data/2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["row_data"]["name"], "milk");

        let (status, body) = send(&app, ask_request("What is the price of apple?")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], true);
        assert_eq!(body["intent"], "PRICE");
        assert_eq!(body["answer"], "Apple's price is 1.25.");
    }

    #[tokio::test]
    async fn test_missing_record_returns_404() {
        let app = create_router(test_state());

        let (status, body) = send(&app, get_request("/data/42")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_csv() {
        let app = create_router(test_state());

        let (status, _) = send(&app, upload_request("inventory.txt", INVENTORY_CSV)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_rejects_header_only_file() {
        let app = create_router(test_state());

        let (status, _) = send(
            &app,
            upload_request("empty.csv", "name,category,quantity,price,location\n"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_question_is_bad_request() {
        let app = create_router(test_state());

        let (status, _) = send(&app, ask_request("   ")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ask_before_upload() {
        let app = create_router(test_state());

        let (status, body) = send(&app, ask_request("price of apple")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], false);
        assert_eq!(
            body["answer"],
            "No data has been uploaded yet. Please upload a CSV first."
        );
    }

    #[tokio::test]
    async fn test_logs_record_requests_newest_first() {
        let state = test_state();
        let app = create_router(state.clone());

        send(&app, get_request("/")).await;
        send(&app, get_request("/data/9")).await;

        let request = Request::builder()
            .method("GET")
            .uri("/logs")
            .header(header::AUTHORIZATION, auth_header())
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["path"], "/data/9");
        assert_eq!(entries[0]["status_code"], 404);
        assert_eq!(entries[1]["path"], "/");
        assert_eq!(state.audit_log.len(), 3);
    }

    #[tokio::test]
    async fn test_observability_routes_are_audited() {
        let state = test_state();
        let observability = Arc::new(ObservabilityState::new(
            "0.1.0".to_string(),
            state.metrics.clone(),
        ));
        let app = create_app(state.clone(), observability);

        let (status, _) = send(&app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let response = app.clone().oneshot(get_request("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let (status, _) = send(&app, get_request("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let paths: Vec<String> = state.audit_log.list().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["/nope", "/metrics", "/health"]);
        assert!(state.metrics.gather().contains("http_requests_total 3"));
    }

    #[tokio::test]
    async fn test_upload_reports_cells_past_header() {
        let app = create_router(test_state());
        let csv = "name,category,quantity,price,location\n\
            apple,fruit,50,1.25,Aisle 3,hidden\n\
            milk,dairy,20,2.99,Fridge 1\n";

        let (status, body) = send(&app, upload_request("inventory.csv", csv)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["inserted_ids"], json!([1]));
        assert_eq!(body["rejected"][0]["row_index"], 0);
        assert_eq!(body["rejected"][0]["kind"], "UNEXPECTED_FIELD");
        assert_eq!(body["failed_count"], 0);
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let app = create_router(test_state());

        let response = app.oneshot(get_request("/data")).await.unwrap();

        assert_eq!(
            response.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_injected_verifier_is_consulted() {
        let config = AppConfig::development();
        let mut verifier = MockCredentialVerifier::new();
        verifier
            .expect_verify()
            .times(1)
            .returning(|user, password| user == "admin" && password == "password");

        let base = AppState::development(&config).unwrap();
        let state = AppState::new(
            base.record_store.clone(),
            base.audit_log.clone(),
            &config.query,
            Box::new(verifier),
            config.server.max_request_size,
        )
        .unwrap();
        let app = create_router(state);

        let (status, body) = send(&app, ask_request("where is apple")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], false);
    }
}
