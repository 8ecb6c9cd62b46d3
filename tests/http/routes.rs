use serde_json::{json, Value};

use crate::support::{start_server, TOKEN};

#[tokio::test]
async fn health_check() {
    let server = start_server().await;
    let resp = reqwest::get(format!("{}/health", server.base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn create_list_update_delete_product() {
    let server = start_server().await;
    let base = &server.base;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/products"))
        .bearer_auth(TOKEN)
        .json(&json!({ "title": "Rover", "short": "A robot", "badges": ["new"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["product"]["numericId"], 1);
    assert_eq!(body["product"]["highlights"], json!([]));

    let list: Value = client
        .get(format!("{base}/api/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);

    let resp = client
        .put(format!("{base}/api/products/1"))
        .bearer_auth(TOKEN)
        .json(&json!({ "title": "Rover II" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["product"]["title"], "Rover II");
    assert_eq!(body["product"]["short"], "A robot");
    assert_eq!(body["product"]["badges"], json!(["new"]));

    let resp = client
        .delete(format!("{base}/api/products/1"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());

    let resp = client.get(format!("{base}/api/products/1")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn mutations_require_token() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/products", server.base))
        .json(&json!({ "title": "Rover", "short": "A robot" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    let resp = client
        .post(format!("{}/api/upload", server.base))
        .bearer_auth("wrong")
        .json(&json!({ "filename": "a.png", "contentType": "image/png" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn validation_failures_are_400() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/projects", server.base))
        .bearer_auth(TOKEN)
        .json(&json!({ "title": "Bridge", "summary": "steel", "gallery": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("gallery"));

    let resp = client
        .post(format!("{}/api/products", server.base))
        .bearer_auth(TOKEN)
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .put(format!("{}/api/products/abc", server.base))
        .bearer_auth(TOKEN)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn project_listing_filters() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    for (title, status) in [("Solar Tracker", "delivered"), ("Drone Frame", "prototype")] {
        let resp = client
            .post(format!("{}/api/projects", server.base))
            .bearer_auth(TOKEN)
            .json(&json!({
                "title": title,
                "summary": "s",
                "gallery": ["https://cdn.example.com/x.png"],
                "status": status,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let list: Vec<Value> = client
        .get(format!("{}/api/projects?status=prototype", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Drone Frame");

    let list: Vec<Value> = client
        .get(format!("{}/api/projects?q=solar", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["status"], "delivered");

    let resp = client
        .get(format!("{}/api/projects?status=shipped", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unknown status: shipped");
}

#[tokio::test]
async fn upload_presign_and_cascade_delete() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/upload", server.base))
        .bearer_auth(TOKEN)
        .json(&json!({ "filename": "my photo.png", "contentType": "image/png", "folder": "projects" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let upload: Value = resp.json().await.unwrap();
    let key = upload["key"].as_str().unwrap().to_string();
    let public_url = upload["publicUrl"].as_str().unwrap().to_string();
    assert!(key.starts_with("projects/"));
    assert!(key.ends_with("-my_photo.png"));

    server
        .objects
        .upload(upload["uploadUrl"].as_str().unwrap(), "image/png", vec![0u8; 4])
        .unwrap();
    assert!(server.objects.contains(&key));

    let resp = client
        .post(format!("{}/api/projects", server.base))
        .bearer_auth(TOKEN)
        .json(&json!({ "title": "Bridge", "summary": "steel", "gallery": [public_url] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = client
        .delete(format!("{}/api/projects/1", server.base))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(!server.objects.contains(&key));

    let resp = client
        .post(format!("{}/api/upload", server.base))
        .bearer_auth(TOKEN)
        .json(&json!({ "contentType": "image/png" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
