use crate::common::{TestApp, ids, routes};

#[tokio::test]
async fn ledger_keeps_best_attempt() {
    let app = TestApp::spawn().await;
    let student = 5;

    // 30 of 50, then 50 of 50, then 0 of 50.
    let first = app
        .submit(student, ids::OPEN_CONTEST, ids::MARKED_QUESTION, "print a")
        .await;
    assert_eq!(first.body["marks_awarded"], 30);
    let best = app
        .submit(student, ids::OPEN_CONTEST, ids::MARKED_QUESTION, "echo")
        .await;
    assert_eq!(best.body["marks_awarded"], 50);
    let worse = app
        .submit(student, ids::OPEN_CONTEST, ids::MARKED_QUESTION, "crash")
        .await;
    assert_eq!(worse.body["marks_awarded"], 0);

    let res = app.get_with_token(routes::SCORES, &app.token(student)).await;
    assert_eq!(res.status, 200);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["question_id"], ids::MARKED_QUESTION);
    assert_eq!(data[0]["score"], 50);
    assert_eq!(data[0]["total_marks"], 50);
    assert_eq!(data[0]["submission_id"], best.submission_id());
}

#[tokio::test]
async fn ledger_is_per_student_and_question() {
    let app = TestApp::spawn().await;
    app.submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
        .await;
    app.submit(1, ids::OPEN_CONTEST, ids::MARKED_QUESTION, "print a")
        .await;
    app.submit(2, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "crash")
        .await;

    let mine = app.get_with_token(routes::SCORES, &app.token(1)).await;
    let data = mine.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["question_id"], ids::ECHO_QUESTION);
    assert_eq!(data[0]["score"], 50);
    assert_eq!(data[1]["question_id"], ids::MARKED_QUESTION);
    assert_eq!(data[1]["score"], 30);

    let theirs = app.get_with_token(routes::SCORES, &app.token(2)).await;
    let data = theirs.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["score"], 0);
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = TestApp::spawn().await;
    let res = app.get_without_token(routes::HEALTH).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "ok");
}

#[tokio::test]
async fn openapi_document_lists_judge_routes() {
    let app = TestApp::spawn().await;
    let res = app.get_without_token("/api-docs/openapi.json").await;
    assert_eq!(res.status, 200);
    let paths = res.body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/v1/contests/{contest_id}/questions/{question_id}/submissions"));
    assert!(paths.contains_key("/api/v1/run"));
    assert!(paths.contains_key("/api/v1/scores"));
}
