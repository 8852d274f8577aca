mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::{event, family, TestServer};
use family_hub::models::Role;

#[tokio::test]
async fn created_event_is_listed_once() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let members = server.seed_members(&[("alice", Role::Child)]);
    let session = server.session_for(&members[0]);

    let res = family(&client, Method::POST, server.url("/api/family/alice/calendar"), &session)
        .json(&event("Dentist", "2025-03-10"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = common::body(res).await?["data"].clone();
    assert_eq!(created["endDate"], "2025-03-10");
    assert_eq!(created["category"], "general");

    let res = family(&client, Method::GET, server.url("/api/family/alice/calendar"), &session)
        .send()
        .await?;
    let events = common::body(res).await?["data"].clone();
    let matching: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["title"] == "Dentist")
        .collect();

    assert_eq!(matching.len(), 1);
    assert!(!matching[0]["id"].as_str().unwrap().is_empty());
    assert_eq!(matching[0]["id"], created["id"]);
    Ok(())
}

#[tokio::test]
async fn missing_family_token_is_rejected_without_store_access() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let res = common::authed(&client, Method::POST, server.url("/api/family/alice/calendar"))
        .json(&event("Dentist", "2025-03-10"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::body(res).await?["error"], "Family token required");

    let res = family(&client, Method::GET, server.url("/api/family/alice/calendar"), "not-a-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(server.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn children_cannot_read_other_members() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let members = server.seed_members(&[("mom", Role::Parent), ("alice", Role::Child), ("bob", Role::Child)]);
    let calls_after_seed = server.store.calls();

    let alice = server.session_for(&members[1]);
    let res = family(&client, Method::GET, server.url("/api/family/bob/calendar"), &alice)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(server.store.calls(), calls_after_seed);

    // Parents see everyone
    let mom = server.session_for(&members[0]);
    let res = family(&client, Method::GET, server.url("/api/family/bob/calendar"), &mom)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn member_segment_must_match_username_exactly() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let members = server.seed_members(&[("anna", Role::Child)]);
    let anna = server.session_for(&members[0]);

    let res = family(&client, Method::POST, server.url("/api/family/ANNA/calendar"), &anna)
        .json(&event("Piano", "2025-02-01"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = family(&client, Method::GET, server.url("/api/family/ANNA/calendar"), &anna)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(server.stored("family/ANNA/calendar/events.json").is_none());
    Ok(())
}

#[tokio::test]
async fn invalid_member_segment_is_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let members = server.seed_members(&[("mom", Role::Parent)]);
    let mom = server.session_for(&members[0]);

    let res = family(&client, Method::GET, server.url("/api/family/bad.name/calendar"), &mom)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn range_filter_update_and_delete() -> Result<()> {
    let server = TestServer::spawn().await?;
    let client = reqwest::Client::new();
    let members = server.seed_members(&[("alice", Role::Child)]);
    let session = server.session_for(&members[0]);
    let base = server.url("/api/family/alice/calendar");

    let mut ids = Vec::new();
    for (title, start) in [("January", "2025-01-15"), ("March", "2025-03-01"), ("May", "2025-05-20")] {
        let res = family(&client, Method::POST, base.clone(), &session)
            .json(&event(title, start))
            .send()
            .await?;
        ids.push(common::body(res).await?["data"]["id"].as_str().unwrap().to_string());
    }

    let res = family(&client, Method::GET, format!("{}?from=2025-02-01&to=2025-04-30", base), &session)
        .send()
        .await?;
    let events = common::body(res).await?["data"].clone();
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["title"], "March");

    let res = family(&client, Method::PUT, format!("{}/{}", base, ids[1]), &session)
        .json(&json!({ "title": "March trip", "startDate": "2025-03-01", "endDate": "2025-03-05" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body(res).await?["data"]["title"], "March trip");

    let res = family(&client, Method::PUT, format!("{}/{}", base, ids[1]), &session)
        .json(&json!({ "title": "Backwards", "startDate": "2025-03-05", "endDate": "2025-03-01" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = family(&client, Method::DELETE, format!("{}/{}", base, ids[0]), &session)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = family(&client, Method::DELETE, format!("{}/{}", base, ids[0]), &session)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::body(res).await?["error"], "Event not found");

    let stored = server.stored("family/alice/calendar/events.json").unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 2);
    Ok(())
}
