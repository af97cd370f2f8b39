use crate::common::{TestApp, ids, routes};
use serde_json::json;

#[tokio::test]
async fn finalize_locks_out_further_submissions() {
    let app = TestApp::spawn().await;
    let token = app.token(1);

    let res = app
        .post_with_token(&routes::finalize(ids::OPEN_CONTEST), &json!({}), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["contest_id"], ids::OPEN_CONTEST);

    let rejected = app
        .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
        .await;
    assert_eq!(rejected.status, 403);
    assert_eq!(rejected.body["code"], "CONTEST_FINALIZED");
    assert_eq!(app.dispatcher.calls(), 0);

    // Other students are unaffected.
    let other = app
        .submit(2, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
        .await;
    assert_eq!(other.status, 201);
}

#[tokio::test]
async fn finalize_is_idempotent() {
    let app = TestApp::spawn().await;
    let token = app.token(1);

    let first = app
        .post_with_token(&routes::finalize(ids::OPEN_CONTEST), &json!({}), &token)
        .await;
    let second = app
        .post_with_token(&routes::finalize(ids::OPEN_CONTEST), &json!({}), &token)
        .await;
    assert_eq!(second.status, 200);
    assert_eq!(first.body["finalized_at"], second.body["finalized_at"]);
}

#[tokio::test]
async fn finalize_unknown_contest() {
    let app = TestApp::spawn().await;
    let res = app
        .post_with_token(&routes::finalize(404), &json!({}), &app.token(1))
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn finalize_requires_token() {
    let app = TestApp::spawn().await;
    let res = app
        .post_without_token(&routes::finalize(ids::OPEN_CONTEST), &json!({}))
        .await;
    assert_eq!(res.status, 401);
}
