use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use delivery_dispatch::model::{Coordinate, RouteProfile, RouteQuery};
use delivery_dispatch::routing::{OpenRouteService, RouteError, RouteProvider};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// One directions request as the fake provider saw it.
#[derive(Debug, Clone)]
struct Received {
    profile: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Directions {
    status: StatusCode,
    body: String,
    received: Arc<Mutex<Vec<Received>>>,
}

async fn directions(
    State(state): State<Directions>,
    Path(profile): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state.received.lock().unwrap().push(Received {
        profile,
        authorization,
        body,
    });
    (state.status, [(header::CONTENT_TYPE, "application/json")], state.body)
}

/// Starts a fake directions API on a free local port.
async fn serve(status: StatusCode, body: String) -> (String, Arc<Mutex<Vec<Received>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v2/directions/{profile}/geojson", post(directions))
        .with_state(Directions {
            status,
            body,
            received: received.clone(),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (base_url, received)
}

fn service(base_url: impl Into<String>) -> OpenRouteService {
    OpenRouteService::new(base_url, "secret-key", Duration::from_secs(2)).unwrap()
}

fn query() -> RouteQuery {
    RouteQuery::new(Coordinate::new(-7.90, 31.70), Coordinate::new(-7.98, 31.63), RouteProfile::DrivingCar).unwrap()
}

#[tokio::test]
async fn test_directions_request_and_response() {
    let body = json!({
        "type": "FeatureCollection",
        "features": [{
            "geometry": { "type": "LineString", "coordinates": [[-7.90, 31.70, 450.0], [-7.94, 31.66], [-7.98, 31.63]] }
        }]
    })
    .to_string();
    let (base_url, received) = serve(StatusCode::OK, body).await;

    let path = service(format!("{base_url}/")).route(&query()).await.expect("route");
    assert_eq!(path.len(), 3);
    assert_eq!(path.points()[0], Coordinate::new(-7.90, 31.70));
    assert_eq!(path.points()[2], Coordinate::new(-7.98, 31.63));

    let received = received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].profile, "driving-car");
    assert_eq!(received[0].authorization.as_deref(), Some("secret-key"));
    assert_eq!(received[0].body, json!({ "coordinates": [[-7.90, 31.70], [-7.98, 31.63]] }));
}

#[tokio::test]
async fn test_non_success_status_is_a_failure() {
    let (base_url, received) = serve(StatusCode::FORBIDDEN, json!({ "error": "quota" }).to_string()).await;

    assert_eq!(service(base_url).route(&query()).await, Err(RouteError::Status(403)));
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_feature_collection_is_a_failure() {
    let (base_url, _) = serve(StatusCode::OK, json!({ "features": [] }).to_string()).await;

    assert_eq!(service(base_url).route(&query()).await, Err(RouteError::Empty));
}

#[tokio::test]
async fn test_undecodable_body_is_a_failure() {
    let (base_url, _) = serve(StatusCode::OK, "<html>maintenance</html>".to_string()).await;

    let result = service(base_url).route(&query()).await;
    assert!(matches!(result, Err(RouteError::Decode(_))), "{result:?}");
}
