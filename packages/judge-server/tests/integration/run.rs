use crate::common::{TestApp, ids, routes};
use judge_server::store::SubmissionStore;
use serde_json::json;

#[tokio::test]
async fn sample_run_uses_visible_cases_only() {
    let app = TestApp::spawn().await;
    let res = app
        .post_with_token(
            routes::RUN,
            &json!({
                "contest_id": ids::OPEN_CONTEST,
                "question_id": ids::ECHO_QUESTION,
                "code": "echo",
                "language": "python",
            }),
            &app.token(1),
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["mode"], "test_cases");
    let results = res.body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["is_hidden"] == false));
    // Fallback total is scoped to the visible cases.
    assert_eq!(res.body["max_marks"], 50);
    assert_eq!(res.body["marks_awarded"], 50);
    assert_eq!(res.body["score_percentage"], 100);
    assert_eq!(app.dispatcher.calls(), 2);
}

#[tokio::test]
async fn sample_run_consumes_no_attempt() {
    let app = TestApp::spawn().await;
    let body = json!({
        "contest_id": ids::OPEN_CONTEST,
        "question_id": ids::ECHO_QUESTION,
        "code": "echo",
        "language": "python",
    });
    for _ in 0..4 {
        let res = app.post_with_token(routes::RUN, &body, &app.token(1)).await;
        assert_eq!(res.status, 200);
    }

    assert_eq!(
        app.store
            .count_attempts(ids::OPEN_CONTEST, ids::ECHO_QUESTION, 1)
            .await
            .unwrap(),
        0
    );
    let scores = app.get_with_token(routes::SCORES, &app.token(1)).await;
    assert!(scores.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sample_run_checks_language() {
    let app = TestApp::spawn().await;
    let res = app
        .post_with_token(
            routes::RUN,
            &json!({
                "contest_id": ids::OPEN_CONTEST,
                "question_id": ids::ECHO_QUESTION,
                "code": "echo",
                "language": "java",
            }),
            &app.token(1),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "LANGUAGE_NOT_ALLOWED");
    assert_eq!(app.dispatcher.calls(), 0);
}

#[tokio::test]
async fn sample_run_unknown_question() {
    let app = TestApp::spawn().await;
    let res = app
        .post_with_token(
            routes::RUN,
            &json!({
                "contest_id": ids::OPEN_CONTEST,
                "question_id": 999,
                "code": "echo",
                "language": "python",
            }),
            &app.token(1),
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn ad_hoc_run_echoes_input() {
    let app = TestApp::spawn().await;
    let res = app
        .post_with_token(
            routes::RUN,
            &json!({ "code": "echo", "language": "python", "input": "hello" }),
            &app.token(1),
        )
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["mode"], "ad_hoc");
    assert_eq!(res.body["status"], "success");
    assert_eq!(res.body["output"], "hello");
}

#[tokio::test]
async fn ad_hoc_dispatch_failure_is_an_error_result() {
    let app = TestApp::spawn().await;
    let res = app
        .post_with_token(
            routes::RUN,
            &json!({ "code": "unrunnable", "language": "python" }),
            &app.token(1),
        )
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["mode"], "ad_hoc");
    assert_eq!(res.body["status"], "error");
    assert!(res.body["error"].as_str().is_some());
}

#[tokio::test]
async fn half_a_question_reference_is_invalid() {
    let app = TestApp::spawn().await;
    let res = app
        .post_with_token(
            routes::RUN,
            &json!({ "contest_id": 1, "code": "echo", "language": "python" }),
            &app.token(1),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}
