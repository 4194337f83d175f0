//! End-to-end route tests against the in-memory backend.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

use fooddaily_api::http::{create_router, AppState};
use fooddaily_auth::TokenService;
use fooddaily_storage::{DocumentStore, MemoryDocumentStore, NewFoodItem};

const SECRET: &str = "integration-secret";

fn test_app() -> (Router, Arc<MemoryDocumentStore>, TokenService) {
    let store = MemoryDocumentStore::new_shared();
    let tokens = TokenService::new(SECRET);
    let app = create_router(AppState::new(Arc::clone(&store), tokens.clone()));
    (app, store, tokens)
}

/// Sends one request and returns (status, parsed JSON body).
/// An empty body parses as JSON null.
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn curry_body() -> Value {
    json!({
        "foodName": "Chicken Curry",
        "quantity": 50,
        "price": 12.5,
        "foodOrigin": "India",
        "foodImage": "https://img.example/curry.png",
        "foodCategory": "Curry",
        "description": "Slow-cooked chicken in a spiced tomato gravy",
        "userEmail": "a@x.com"
    })
}

fn seed_food(name: &str, owner: &str, purchase_count: i64) -> NewFoodItem {
    NewFoodItem {
        food_name: name.to_string(),
        quantity: 20,
        price: 5.0,
        food_origin: "Italy".to_string(),
        food_image: "https://img.example/item.png".to_string(),
        food_category: "Misc".to_string(),
        description: "seeded".to_string(),
        user_email: owner.to_string(),
        purchase_count,
    }
}

// ============================================================
// Registration
// ============================================================

#[tokio::test]
async fn duplicate_registration_reports_existence_without_insert() {
    let (app, store, _) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/user",
        None,
        Some(json!({"email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["insertedId"].as_str().is_some());

    let (status, body) = send(
        &app,
        Method::POST,
        "/user",
        None,
        Some(json!({"email": "a@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User already exists");
    assert_eq!(body["insertedId"], Value::Null);

    // The record count is unchanged by the duplicate attempt.
    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

// ============================================================
// Authorization gate
// ============================================================

async fn identity_scoped_uris(store: &MemoryDocumentStore) -> Vec<(Method, String)> {
    let food_id = store
        .insert_food(seed_food("Gated", "a@x.com", 0))
        .await
        .unwrap()
        .inserted_id;

    vec![
        (Method::GET, "/userRole/a@x.com".to_string()),
        (Method::GET, "/myList?email=a@x.com".to_string()),
        (Method::GET, "/myOrder?email=a@x.com".to_string()),
        (
            Method::DELETE,
            "/myOrder?id=some-id&email=a@x.com".to_string(),
        ),
        (Method::GET, format!("/purchase/{food_id}?email=a@x.com")),
    ]
}

#[tokio::test]
async fn identity_scoped_routes_reject_mismatched_identity() {
    let (app, store, tokens) = test_app();
    let other = tokens.issue("b@x.com").unwrap();

    for (method, uri) in identity_scoped_uris(&store).await {
        let (status, body) = send(&app, method.clone(), &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(body["code"], "forbidden", "{method} {uri}");
    }
}

#[tokio::test]
async fn identity_scoped_routes_reject_absent_or_invalid_tokens() {
    let (app, store, _) = test_app();

    for (method, uri) in identity_scoped_uris(&store).await {
        // Absent token.
        let (status, body) = send(&app, method.clone(), &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["code"], "unauthenticated", "{method} {uri}");

        // Garbage token: still 401 even though the requested email would
        // not match anything - the token check comes first.
        let (status, _) = send(&app, method.clone(), &uri, Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn update_food_requires_token() {
    let (app, store, tokens) = test_app();
    let food_id = store
        .insert_food(seed_food("Editable", "a@x.com", 0))
        .await
        .unwrap()
        .inserted_id;

    let uri = format!("/all-foods?id={food_id}");
    let patch = json!({"price": 7.25});

    let (status, _) = send(&app, Method::PATCH, &uri, None, Some(patch.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = tokens.issue("anyone@x.com").unwrap();
    let (status, body) = send(&app, Method::PATCH, &uri, Some(&token), Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchedCount"], 1);
    assert_eq!(body["modifiedCount"], 1);

    let food = store.get_food(&food_id).await.unwrap().unwrap();
    assert_eq!(food.price, 7.25);
    // Untouched fields survive a partial update.
    assert_eq!(food.food_name, "Editable");
}

// ============================================================
// Purchases
// ============================================================

#[tokio::test]
async fn sequential_purchases_are_monotonic() {
    let (app, _, _) = test_app();

    let (_, created) = send(&app, Method::POST, "/all-foods", None, Some(curry_body())).await;
    let food_id = created["insertedId"].as_str().unwrap().to_string();

    for quantity in [2, 3, 5] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/purchase",
            None,
            Some(json!({"foodId": food_id, "email": "a@x.com", "quantity": quantity})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["insertedId"].as_str().is_some());
    }

    let (_, food) = send(
        &app,
        Method::GET,
        &format!("/foodDetails/{food_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(food["purchaseCount"], 3);
    assert_eq!(food["quantity"], 50 - (2 + 3 + 5));
}

#[tokio::test]
async fn purchase_of_unknown_food_is_rejected_without_partial_state() {
    let (app, store, _) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/purchase",
        None,
        Some(json!({"foodId": "no-such-id", "email": "a@x.com", "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    // No purchase record was left behind.
    assert!(store.purchases_by_email("a@x.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn my_orders_lists_and_owner_checked_delete_removes() {
    let (app, _, tokens) = test_app();
    let token = tokens.issue("a@x.com").unwrap();

    let (_, created) = send(&app, Method::POST, "/all-foods", None, Some(curry_body())).await;
    let food_id = created["insertedId"].as_str().unwrap().to_string();

    let (_, purchase) = send(
        &app,
        Method::POST,
        "/purchase",
        None,
        Some(json!({"foodId": food_id, "email": "a@x.com", "quantity": 1})),
    )
    .await;
    let order_id = purchase["insertedId"].as_str().unwrap().to_string();

    let (status, orders) = send(
        &app,
        Method::GET,
        "/myOrder?email=a@x.com",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["foodId"], food_id.as_str());

    let (status, ack) = send(
        &app,
        Method::DELETE,
        &format!("/myOrder?id={order_id}&email=a@x.com"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["deletedCount"], 1);

    let (_, orders) = send(
        &app,
        Method::GET,
        "/myOrder?email=a@x.com",
        Some(&token),
        None,
    )
    .await;
    assert!(orders.as_array().unwrap().is_empty());
}

// ============================================================
// Catalog queries
// ============================================================

#[tokio::test]
async fn top_foods_returns_at_most_six_sorted_with_stable_ties() {
    let (app, store, _) = test_app();

    // Eight items; two pairs tie on purchase count.
    let counts = [5, 9, 5, 12, 0, 7, 9, 1];
    for (i, count) in counts.iter().enumerate() {
        store
            .insert_food(seed_food(&format!("Item {i}"), "a@x.com", *count))
            .await
            .unwrap();
    }

    let (status, body) = send(&app, Method::GET, "/top-foods", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let top = body.as_array().unwrap();
    assert_eq!(top.len(), 6);

    let names: Vec<&str> = top.iter().map(|f| f["foodName"].as_str().unwrap()).collect();
    // 12, then the 9-tie in insertion order, 7, then the 5-tie likewise.
    assert_eq!(
        names,
        ["Item 3", "Item 1", "Item 6", "Item 5", "Item 0", "Item 2"]
    );
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let (app, store, _) = test_app();

    store
        .insert_food(seed_food("Chicken Curry", "a@x.com", 0))
        .await
        .unwrap();
    store
        .insert_food(seed_food("Beef Stew", "a@x.com", 0))
        .await
        .unwrap();

    for query in ["chicken", "CHICKEN", "Chicken"] {
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/search-foods?search={query}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let found = body.as_array().unwrap();
        assert_eq!(found.len(), 1, "query {query:?}");
        assert_eq!(found[0]["foodName"], "Chicken Curry");
    }

    let (_, body) = send(&app, Method::GET, "/search-foods?search=sushi", None, None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn created_food_round_trips_through_details() {
    let (app, _, _) = test_app();

    let submitted = curry_body();
    let (status, created) = send(
        &app,
        Method::POST,
        "/all-foods",
        None,
        Some(submitted.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let food_id = created["insertedId"].as_str().unwrap().to_string();

    let (status, fetched) = send(
        &app,
        Method::GET,
        &format!("/foodDetails/{food_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for (key, value) in submitted.as_object().unwrap() {
        assert_eq!(&fetched[key], value, "field {key}");
    }
    assert_eq!(fetched["id"], food_id.as_str());
    assert_eq!(fetched["purchaseCount"], 0);
}

#[tokio::test]
async fn missing_food_details_is_null_success() {
    let (app, _, _) = test_app();

    let (status, body) = send(&app, Method::GET, "/foodDetails/no-such-id", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn my_list_returns_only_the_callers_items() {
    let (app, store, tokens) = test_app();

    store
        .insert_food(seed_food("Mine", "a@x.com", 0))
        .await
        .unwrap();
    store
        .insert_food(seed_food("Theirs", "b@x.com", 0))
        .await
        .unwrap();

    let token = tokens.issue("a@x.com").unwrap();
    let (status, body) = send(
        &app,
        Method::GET,
        "/myList?email=a@x.com",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mine = body.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["foodName"], "Mine");
}

// ============================================================
// Users and roles
// ============================================================

#[tokio::test]
async fn promote_then_role_lookup_reports_admin() {
    let (app, _, tokens) = test_app();

    let (_, created) = send(
        &app,
        Method::POST,
        "/user",
        None,
        Some(json!({"email": "a@x.com"})),
    )
    .await;
    let user_id = created["insertedId"].as_str().unwrap().to_string();

    let token = tokens.issue("a@x.com").unwrap();
    let (_, role) = send(&app, Method::GET, "/userRole/a@x.com", Some(&token), None).await;
    assert_eq!(role["userRole"], "default");

    let (status, ack) = send(
        &app,
        Method::PATCH,
        &format!("/user/{user_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["matchedCount"], 1);
    assert_eq!(ack["modifiedCount"], 1);

    let (_, role) = send(&app, Method::GET, "/userRole/a@x.com", Some(&token), None).await;
    assert_eq!(role["userRole"], "admin");
}

#[tokio::test]
async fn role_lookup_for_unknown_user_is_null() {
    let (app, _, tokens) = test_app();

    let token = tokens.issue("ghost@x.com").unwrap();
    let (status, role) = send(
        &app,
        Method::GET,
        "/userRole/ghost@x.com",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(role["userRole"], Value::Null);
}

#[tokio::test]
async fn delete_user_by_id() {
    let (app, store, _) = test_app();

    let (_, created) = send(
        &app,
        Method::POST,
        "/user",
        None,
        Some(json!({"email": "a@x.com"})),
    )
    .await;
    let user_id = created["insertedId"].as_str().unwrap().to_string();

    let (status, ack) = send(
        &app,
        Method::DELETE,
        &format!("/user/{user_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["deletedCount"], 1);
    assert!(store.list_users().await.unwrap().is_empty());

    // Deleting again removes nothing; a missing document is not an error.
    let (status, ack) = send(
        &app,
        Method::DELETE,
        &format!("/user/{user_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["deletedCount"], 0);
}

// ============================================================
// Feedback
// ============================================================

#[tokio::test]
async fn testimonials_returns_first_four_entries() {
    let (app, _, _) = test_app();

    for i in 0..6 {
        let (status, body) = send(
            &app,
            Method::POST,
            "/feedback",
            None,
            Some(json!({"message": format!("note {i}"), "rating": i})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["insertedId"].as_str().is_some());
    }

    let (status, all) = send(&app, Method::GET, "/feedback", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 6);

    let (status, first) = send(&app, Method::GET, "/testimonials", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let first = first.as_array().unwrap();
    assert_eq!(first.len(), 4);
    for (i, entry) in first.iter().enumerate() {
        assert_eq!(entry["message"], format!("note {i}"));
    }
}

#[tokio::test]
async fn feedback_rejects_non_object_body() {
    let (app, _, _) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/feedback",
        None,
        Some(json!(["not", "an", "object"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}
