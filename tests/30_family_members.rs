mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;
use sha2::{Digest, Sha256};

use common::{authed, TestServer};

#[tokio::test]
async fn member_create_login_and_session_use() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let res = authed(&client, Method::POST, server.url("/api/family/members"))
        .json(&json!({ "username": "anna", "password": "hunter2", "role": "parent", "displayName": "Anna" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let member = common::body(res).await?["data"].clone();
    assert_eq!(member["username"], "anna");
    assert!(member.get("passwordHash").is_none());

    // The stored record carries an Argon2 hash, never the password
    let stored = server.stored("family/family.json").unwrap();
    let hash = stored["members"][0]["passwordHash"].as_str().unwrap();
    assert!(hash.starts_with("$argon2"));

    let res = authed(&client, Method::POST, server.url("/api/family/login"))
        .json(&json!({ "username": "ANNA", "password": "hunter2" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let login = common::body(res).await?["data"].clone();
    let session = login["token"].as_str().unwrap().to_string();
    assert_eq!(login["member"]["role"], "parent");
    assert!(login["expiresIn"].as_u64().unwrap() > 0);

    let res = common::family(&client, Method::GET, server.url("/api/family/anna/calendar"), &session)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body(res).await?["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    server.seed_members(&[("anna", family_hub::models::Role::Parent)]);

    for (username, password) in [("anna", "wrong"), ("nobody", "secret")] {
        let res = authed(&client, Method::POST, server.url("/api/family/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(common::body(res).await?["error"], "Invalid username or password");
    }
    Ok(())
}

#[tokio::test]
async fn duplicate_usernames_conflict() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    server.seed_members(&[("anna", family_hub::models::Role::Parent)]);

    let res = authed(&client, Method::POST, server.url("/api/family/members"))
        .json(&json!({ "username": "Anna", "password": "pass" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let stored = server.stored("family/family.json").unwrap();
    assert_eq!(stored["members"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn legacy_hash_is_upgraded_on_login() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let legacy = format!("{:x}", Sha256::digest(b"oldpass"));
    server.seed(
        "family/family.json",
        &json!({ "members": [{ "id": "1", "username": "bob", "role": "child", "passwordHash": legacy }] }),
    );

    let res = authed(&client, Method::POST, server.url("/api/family/login"))
        .json(&json!({ "username": "bob", "password": "oldpass" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let stored = server.stored("family/family.json").unwrap();
    assert!(stored["members"][0]["passwordHash"].as_str().unwrap().starts_with("$argon2"));

    // Still works with the upgraded hash
    let res = authed(&client, Method::POST, server.url("/api/family/login"))
        .json(&json!({ "username": "bob", "password": "oldpass" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn member_update_and_delete() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let members = server.seed_members(&[("anna", family_hub::models::Role::Parent), ("bob", family_hub::models::Role::Child)]);
    let bob = &members[1];

    // Renames would strand family/bob/ data and outstanding sessions
    let res = authed(&client, Method::PUT, server.url(&format!("/api/family/members/{}", bob.id)))
        .json(&json!({ "username": "bobby", "role": "child" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = authed(&client, Method::PUT, server.url(&format!("/api/family/members/{}", bob.id)))
        .json(&json!({ "username": "bob", "role": "child", "displayName": "Bobby" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let stored = server.stored("family/family.json").unwrap();
    assert_eq!(stored["members"][1]["username"], "bob");
    assert_eq!(stored["members"][1]["displayName"], "Bobby");
    // No password in the body: the hash is untouched
    assert_eq!(stored["members"][1]["passwordHash"], bob.password_hash.as_str());

    let res = authed(&client, Method::DELETE, server.url(&format!("/api/family/members/{}", bob.id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = authed(&client, Method::GET, server.url("/api/family/members")).send().await?;
    let list = common::body(res).await?["data"].clone();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["username"], "anna");
    Ok(())
}

#[tokio::test]
async fn settings_round_trip_keeps_members() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    server.seed_members(&[("anna", family_hub::models::Role::Parent)]);

    let res = authed(&client, Method::PUT, server.url("/api/family/settings"))
        .json(&json!({ "name": "The Smiths", "currency": "EUR", "theme": "dark" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = authed(&client, Method::GET, server.url("/api/family/settings")).send().await?;
    let settings = common::body(res).await?["data"].clone();
    assert_eq!(settings["currency"], "EUR");
    assert_eq!(settings["theme"], "dark");

    let stored = server.stored("family/family.json").unwrap();
    assert_eq!(stored["members"].as_array().unwrap().len(), 1);
    Ok(())
}
