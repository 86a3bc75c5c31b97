//! Integration tests for the Tasks domain against a real MongoDB
//!
//! Each test starts its own MongoDB container, so Docker must be available.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_tasks::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::assertions::{assert_none, assert_some};
use test_utils::{TestDataBuilder, TestMongo};
use tower::ServiceExt; // For oneshot()

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn service_for(
    mongo: &TestMongo,
    builder: &TestDataBuilder,
) -> TaskService<MongoTaskRepository> {
    let repo = MongoTaskRepository::new(mongo.database(&builder.database_name()));
    repo.init_indexes().await.unwrap();
    TaskService::new(repo)
}

fn new_task(user_id: &str, name: &str, finished: bool) -> CreateTask {
    CreateTask {
        user_id: user_id.to_string(),
        name: name.to_string(),
        finished,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_then_read_round_trips_extra_attributes() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("create_then_read");
    let service = service_for(&mongo, &builder).await;

    let input: CreateTask = serde_json::from_value(json!({
        "userId": builder.user_id(),
        "name": "Buy milk",
        "finished": false,
        "priority": 2,
        "tags": ["home", "errand"]
    }))
    .unwrap();

    let created = service.create(input).await.unwrap();
    let read = assert_some(service.get(&created.id).await.unwrap(), "created task");

    assert_eq!(read, created);
    assert_eq!(read.extra["priority"], json!(2));
    assert_eq!(read.extra["tags"], json!(["home", "errand"]));
}

#[tokio::test]
async fn test_search_scenario() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("search_scenario");
    let service = service_for(&mongo, &builder).await;

    let milk = service
        .create(new_task(&builder.user_id(), "Buy milk", false))
        .await
        .unwrap();

    let by_name = service
        .search(TaskSearch {
            name: Some("MILK".to_string()),
            finished: None,
        })
        .await
        .unwrap();
    assert_eq!(by_name, vec![milk]);

    let finished = service
        .search(TaskSearch {
            name: None,
            finished: Some("true".to_string()),
        })
        .await
        .unwrap();
    assert!(finished.is_empty());

    let everything = service.search(TaskSearch::default()).await.unwrap();
    assert_eq!(everything, service.list_all().await.unwrap());
}

#[tokio::test]
async fn test_search_name_is_literal() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("search_literal");
    let service = service_for(&mongo, &builder).await;

    service
        .create(new_task(&builder.user_id(), "a.b", false))
        .await
        .unwrap();
    service
        .create(new_task(&builder.user_id(), "axb", false))
        .await
        .unwrap();

    let found = service
        .search(TaskSearch {
            name: Some(".".to_string()),
            finished: None,
        })
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "a.b");
}

#[tokio::test]
async fn test_update_changes_only_given_fields() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("partial_update");
    let service = service_for(&mongo, &builder).await;

    let created = service
        .create(new_task(&builder.user_id(), "Buy milk", false))
        .await
        .unwrap();

    let update: UpdateTask = serde_json::from_value(json!({
        "finished": true,
        "userId": builder.other_user_id()
    }))
    .unwrap();
    let updated = assert_some(
        service.update(&created.id, update).await.unwrap(),
        "updated task",
    );

    assert!(updated.finished);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.user_id, created.user_id, "owner must not change");

    let read = assert_some(service.get(&created.id).await.unwrap(), "re-read");
    assert_eq!(read, updated);
}

#[tokio::test]
async fn test_update_missing_task_returns_none() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("update_missing");
    let service = service_for(&mongo, &builder).await;

    let update = UpdateTask {
        finished: Some(true),
        ..Default::default()
    };
    let result = service
        .update("65f0c0ffee0000000000abcd", update)
        .await
        .unwrap();

    assert_none(result, "update of unknown id");
    assert!(service.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_then_read_is_absent() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("delete_then_read");
    let service = service_for(&mongo, &builder).await;

    let created = service
        .create(new_task(&builder.user_id(), "Buy milk", false))
        .await
        .unwrap();

    service.delete(&created.id).await.unwrap();
    assert_none(service.get(&created.id).await.unwrap(), "deleted task");

    // Deleting again is still a success
    service.delete(&created.id).await.unwrap();
}

#[tokio::test]
async fn test_delete_by_user_leaves_other_users() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("delete_by_user");
    let service = service_for(&mongo, &builder).await;
    let owner = builder.user_id();
    let other = builder.other_user_id();

    for name in ["one", "two", "three"] {
        service.create(new_task(&owner, name, false)).await.unwrap();
    }
    let kept = service.create(new_task(&other, "keep", false)).await.unwrap();

    assert_eq!(service.list_by_user(owner.clone()).await.unwrap().len(), 3);

    let deleted = service.delete_by_user(owner.clone()).await.unwrap();
    assert_eq!(deleted, 3);
    assert!(service.list_by_user(owner.clone()).await.unwrap().is_empty());
    assert_eq!(service.list_by_user(other).await.unwrap(), vec![kept]);

    // Nothing left to delete is not an error
    assert_eq!(service.delete_by_user(owner).await.unwrap(), 0);
}

#[tokio::test]
async fn test_http_create_read_delete() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("http_crud");
    let app = handlers::router(service_for(&mongo, &builder).await);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "userId": builder.user_id(), "name": "Buy milk", "finished": false })
                .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created: Task = json_body(response.into_body()).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let confirmation: String = json_body(response.into_body()).await;
    assert_eq!(confirmation, TASK_DELETED);

    let request = Request::builder()
        .uri(format!("/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, Value::Null);
}
