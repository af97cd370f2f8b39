use crate::common::{TestApp, ids, routes};
use judge_server::config::SubmissionConfig;
use judge_server::store::SubmissionStore;
use serde_json::json;

mod judging {
    use super::*;

    #[tokio::test]
    async fn fallback_marks_are_split_and_totalled() {
        let app = TestApp::spawn().await;
        let res = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo except 3")
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "completed");
        assert_eq!(res.body["marks_awarded"], 34);
        assert_eq!(res.body["max_marks"], 50);
        assert_eq!(res.body["score_percentage"], 68);

        let results = res.body["test_case_results"].as_array().unwrap();
        let statuses: Vec<&str> = results
            .iter()
            .map(|r| r["status"].as_str().unwrap())
            .collect();
        assert_eq!(statuses, ["passed", "passed", "failed"]);
        let maxes: Vec<i64> = results
            .iter()
            .map(|r| r["max_marks"].as_i64().unwrap())
            .collect();
        assert_eq!(maxes, [17, 17, 16]);
        assert_eq!(app.dispatcher.calls(), 3);
    }

    #[tokio::test]
    async fn hidden_output_is_redacted() {
        let app = TestApp::spawn().await;
        let res = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
            .await;

        assert_eq!(res.status, 201);
        let results = res.body["test_case_results"].as_array().unwrap();
        assert_eq!(results[0]["output"], "1\n");
        assert_eq!(results[2]["is_hidden"], true);
        assert!(results[2]["output"].is_null());
        assert_eq!(results[2]["marks_awarded"], 16);
    }

    #[tokio::test]
    async fn authored_marks_are_used_verbatim() {
        let app = TestApp::spawn().await;
        let res = app
            .submit(1, ids::OPEN_CONTEST, ids::MARKED_QUESTION, "print a")
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["marks_awarded"], 30);
        assert_eq!(res.body["max_marks"], 50);
        assert_eq!(res.body["score_percentage"], 60);
    }

    #[tokio::test]
    async fn timeouts_and_crashes_are_scored_results() {
        let app = TestApp::spawn().await;

        let slow = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "slow")
            .await;
        assert_eq!(slow.body["status"], "completed");
        assert_eq!(slow.body["marks_awarded"], 0);
        assert_eq!(slow.body["test_case_results"][0]["status"], "time_limit_exceeded");

        let crash = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "crash")
            .await;
        assert_eq!(crash.body["status"], "completed");
        assert_eq!(crash.body["test_case_results"][0]["status"], "runtime_error");
        assert_eq!(
            crash.body["test_case_results"][0]["error"],
            "Segmentation fault"
        );
    }

    #[tokio::test]
    async fn dispatch_failure_is_a_runtime_error() {
        let app = TestApp::spawn().await;
        let res = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "unrunnable")
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], "completed");
        let results = res.body["test_case_results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r["status"] == "runtime_error"));
    }
}

mod gate {
    use super::*;

    #[tokio::test]
    async fn disallowed_language_never_reaches_dispatcher() {
        let app = TestApp::spawn().await;
        let res = app
            .post_with_token(
                &routes::submit(ids::OPEN_CONTEST, ids::ECHO_QUESTION),
                &json!({ "code": "echo", "language": "java" }),
                &app.token(1),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "LANGUAGE_NOT_ALLOWED");
        assert_eq!(app.dispatcher.calls(), 0);
        assert_eq!(
            app.store
                .count_attempts(ids::OPEN_CONTEST, ids::ECHO_QUESTION, 1)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn inactive_contest_is_rejected() {
        let app = TestApp::spawn().await;
        let res = app
            .submit(1, ids::CLOSED_CONTEST, ids::CLOSED_QUESTION, "echo")
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "CONTEST_INACTIVE");
        assert_eq!(app.dispatcher.calls(), 0);
    }

    #[tokio::test]
    async fn question_from_another_contest_is_not_found() {
        let app = TestApp::spawn().await;
        let res = app
            .submit(1, ids::OPEN_CONTEST, ids::CLOSED_QUESTION, "echo")
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn fourth_attempt_is_rejected() {
        let app = TestApp::spawn().await;
        for _ in 0..3 {
            let res = app
                .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
                .await;
            assert_eq!(res.status, 201);
        }
        let calls = app.dispatcher.calls();

        let res = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
            .await;
        assert_eq!(res.status, 429);
        assert_eq!(res.body["code"], "ATTEMPTS_EXHAUSTED");
        assert_eq!(app.dispatcher.calls(), calls);
        assert_eq!(
            app.store
                .count_attempts(ids::OPEN_CONTEST, ids::ECHO_QUESTION, 1)
                .await
                .unwrap(),
            3
        );

        // The quota is per question and per student.
        let other_question = app
            .submit(1, ids::OPEN_CONTEST, ids::MARKED_QUESTION, "echo")
            .await;
        assert_eq!(other_question.status, 201);
        let other_student = app
            .submit(2, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
            .await;
        assert_eq!(other_student.status, 201);
    }
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn requires_authentication() {
        let app = TestApp::spawn().await;
        let res = app
            .post_without_token(
                &routes::submit(ids::OPEN_CONTEST, ids::ECHO_QUESTION),
                &json!({ "code": "echo", "language": "python" }),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_invalid_token() {
        let app = TestApp::spawn().await;
        let res = app
            .post_with_token(
                &routes::submit(ids::OPEN_CONTEST, ids::ECHO_QUESTION),
                &json!({ "code": "echo", "language": "python" }),
                "not-a-jwt",
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn rejects_empty_code() {
        let app = TestApp::spawn().await;
        let res = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "   ")
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_oversized_code() {
        let app = TestApp::spawn_with(SubmissionConfig {
            max_code_size: 8,
            rate_limit_per_minute: 0,
            ..Default::default()
        })
        .await;
        let res = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo except 3")
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_malformed_body() {
        let app = TestApp::spawn().await;
        let res = app
            .post_with_token(
                &routes::submit(ids::OPEN_CONTEST, ids::ECHO_QUESTION),
                &json!({ "language": "python" }),
                &app.token(1),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        let message = res.body["message"].as_str().unwrap();
        assert!(message.starts_with("Invalid request body"), "{message}");
    }

    #[tokio::test]
    async fn rate_limit_sets_retry_after() {
        let app = TestApp::spawn_with(SubmissionConfig {
            rate_limit_per_minute: 2,
            ..Default::default()
        })
        .await;
        for question in [ids::ECHO_QUESTION, ids::MARKED_QUESTION] {
            let res = app.submit(1, ids::OPEN_CONTEST, question, "echo").await;
            assert_eq!(res.status, 201);
        }

        let res = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
            .await;
        assert_eq!(res.status, 429);
        assert_eq!(res.body["code"], "RATE_LIMITED");
        let retry_after: u64 = res.retry_after.unwrap().parse().unwrap();
        assert!((1..=60).contains(&retry_after));
    }
}

mod retrieval {
    use super::*;

    #[tokio::test]
    async fn owner_can_fetch_submission() {
        let app = TestApp::spawn().await;
        let created = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
            .await;
        let id = created.submission_id();

        let res = app.get_with_token(&routes::submission(id), &app.token(1)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["submission_id"], id);
        assert_eq!(res.body["status"], "completed");
        assert_eq!(res.body["marks_awarded"], 50);
        assert_eq!(res.body["test_case_results"].as_array().unwrap().len(), 3);
        assert!(res.body["test_case_results"][2]["output"].is_null());
    }

    #[tokio::test]
    async fn other_students_get_not_found() {
        let app = TestApp::spawn().await;
        let created = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
            .await;

        let res = app
            .get_with_token(&routes::submission(created.submission_id()), &app.token(2))
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn lists_own_submissions_newest_first() {
        let app = TestApp::spawn().await;
        let first = app
            .submit(1, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "crash")
            .await
            .submission_id();
        let second = app
            .submit(1, ids::OPEN_CONTEST, ids::MARKED_QUESTION, "echo")
            .await
            .submission_id();
        app.submit(2, ids::OPEN_CONTEST, ids::ECHO_QUESTION, "echo")
            .await;

        let res = app
            .get_with_token(&routes::contest_submissions(ids::OPEN_CONTEST), &app.token(1))
            .await;
        assert_eq!(res.status, 200);
        let listed: Vec<i64> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["submission_id"].as_i64().unwrap())
            .collect();
        assert_eq!(listed, [second, first]);

        let filtered = app
            .get_with_token(
                &format!(
                    "{}?question_id={}",
                    routes::contest_submissions(ids::OPEN_CONTEST),
                    ids::ECHO_QUESTION
                ),
                &app.token(1),
            )
            .await;
        let data = filtered.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["submission_id"], first);
    }
}
