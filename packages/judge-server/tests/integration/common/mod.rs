use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use common::{ExecutionOutcome, TestCaseData};
use reqwest::Client;
use serde_json::Value;

use judge_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, ServerConfig, SubmissionConfig,
};
use judge_server::judge::JudgeEngine;
use judge_server::state::AppState;
use judge_server::store::{Contest, MemoryStore, Question};
use judge_server::utils::jwt;
use worker::{DispatchError, Dispatcher, WorkerConfig};

const JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Seeded ids.
pub mod ids {
    /// Open contest allowing python and cpp, three attempts per question.
    pub const OPEN_CONTEST: i32 = 1;
    /// Deactivated contest.
    pub const CLOSED_CONTEST: i32 = 2;
    /// Three zero-mark test cases, the last one hidden.
    pub const ECHO_QUESTION: i32 = 10;
    /// Authored marks 30 and 20.
    pub const MARKED_QUESTION: i32 = 11;
    /// Belongs to `CLOSED_CONTEST`.
    pub const CLOSED_QUESTION: i32 = 20;
}

pub mod routes {
    pub const RUN: &str = "/api/v1/run";
    pub const SCORES: &str = "/api/v1/scores";
    pub const HEALTH: &str = "/api/v1/health";

    pub fn submit(contest_id: i32, question_id: i32) -> String {
        format!("/api/v1/contests/{contest_id}/questions/{question_id}/submissions")
    }

    pub fn submission(id: i64) -> String {
        format!("/api/v1/submissions/{id}")
    }

    pub fn contest_submissions(contest_id: i32) -> String {
        format!("/api/v1/contests/{contest_id}/submissions")
    }

    pub fn finalize(contest_id: i32) -> String {
        format!("/api/v1/contests/{contest_id}/finalize")
    }
}

/// Dispatcher driven by the submitted code instead of a real toolchain.
///
/// * `echo` prints its input.
/// * `echo except <s>` prints its input, but `X` when the input is `<s>`.
/// * `print <s>` prints `<s>` whatever the input.
/// * `slow` times out.
/// * `crash` fails at runtime.
/// * anything else cannot be dispatched at all.
#[derive(Default)]
pub struct ScriptedDispatcher {
    calls: AtomicUsize,
}

impl ScriptedDispatcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dispatcher for ScriptedDispatcher {
    async fn execute(
        &self,
        code: &str,
        _language: &str,
        stdin: &str,
        time_limit_ms: u64,
    ) -> Result<ExecutionOutcome, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = if code == "echo" {
            ExecutionOutcome::success(stdin, 3)
        } else if let Some(bad) = code.strip_prefix("echo except ") {
            let output = if stdin.trim() == bad { "X" } else { stdin };
            ExecutionOutcome::success(output, 3)
        } else if let Some(text) = code.strip_prefix("print ") {
            ExecutionOutcome::success(text, 3)
        } else if code == "slow" {
            ExecutionOutcome::timeout(time_limit_ms, time_limit_ms + 10)
        } else if code == "crash" {
            ExecutionOutcome::error("Segmentation fault", 2)
        } else {
            return Err(DispatchError::EmptyCommand);
        };
        Ok(outcome)
    }
}

fn case(id: i32, input: &str, expected: &str, marks: i32, is_hidden: bool) -> TestCaseData {
    TestCaseData {
        id,
        position: id,
        input: input.into(),
        expected_output: expected.into(),
        marks,
        is_hidden,
    }
}

fn seed(store: &MemoryStore) {
    let now = Utc::now();
    store.insert_contest(Contest {
        id: ids::OPEN_CONTEST,
        title: "Open".into(),
        start_time: now - Duration::hours(1),
        end_time: now + Duration::hours(2),
        is_active: true,
        allowed_languages: vec!["python".into(), "cpp".into()],
        max_attempts: 3,
    });
    store.insert_contest(Contest {
        id: ids::CLOSED_CONTEST,
        title: "Closed".into(),
        start_time: now - Duration::hours(1),
        end_time: now + Duration::hours(2),
        is_active: false,
        allowed_languages: vec!["python".into()],
        max_attempts: 3,
    });
    store.insert_question(Question {
        id: ids::ECHO_QUESTION,
        contest_id: ids::OPEN_CONTEST,
        title: "Echo".into(),
        time_limit_ms: 1000,
        memory_limit_kb: 65536,
        total_marks: 0,
        test_cases: vec![
            case(101, "1\n", "1\n", 0, false),
            case(102, "2\n", "2", 0, false),
            case(103, "3\n", "3", 0, true),
        ],
    });
    store.insert_question(Question {
        id: ids::MARKED_QUESTION,
        contest_id: ids::OPEN_CONTEST,
        title: "Marked".into(),
        time_limit_ms: 1000,
        memory_limit_kb: 65536,
        total_marks: 50,
        test_cases: vec![
            case(111, "a", "a", 30, false),
            case(112, "b", "b", 20, true),
        ],
    });
    store.insert_question(Question {
        id: ids::CLOSED_QUESTION,
        contest_id: ids::CLOSED_CONTEST,
        title: "Closed".into(),
        time_limit_ms: 1000,
        memory_limit_kb: 65536,
        total_marks: 10,
        test_cases: vec![case(201, "1", "1", 10, false)],
    });
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub dispatcher: Arc<ScriptedDispatcher>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
    /// `Retry-After` header, when present.
    pub retry_after: Option<String>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(SubmissionConfig {
            rate_limit_per_minute: 0,
            ..Default::default()
        })
        .await
    }

    pub async fn spawn_with(submission: SubmissionConfig) -> Self {
        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig::default(),
            },
            database: DatabaseConfig::default(),
            auth: AuthConfig {
                jwt_secret: JWT_SECRET.to_string(),
            },
            submission,
            worker: WorkerConfig::default(),
        };

        let store = Arc::new(MemoryStore::new());
        seed(&store);
        let dispatcher = Arc::new(ScriptedDispatcher::default());

        let judge = JudgeEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            dispatcher.clone(),
            2,
        );
        let state = AppState {
            config: Arc::new(app_config),
            judge,
        };

        let app = judge_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            store,
            dispatcher,
        }
    }

    /// Token for a student, signed with the server's secret.
    pub fn token(&self, student_id: i32) -> String {
        jwt::sign(JWT_SECRET, student_id, &format!("student{student_id}"))
            .expect("Failed to sign token")
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    /// Submit code as a student and return the response.
    pub async fn submit(
        &self,
        student_id: i32,
        contest_id: i32,
        question_id: i32,
        code: &str,
    ) -> TestResponse {
        self.post_with_token(
            &routes::submit(contest_id, question_id),
            &serde_json::json!({ "code": code, "language": "python" }),
            &self.token(student_id),
        )
        .await
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let retry_after = res
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            text,
            body,
            retry_after,
        }
    }

    pub fn submission_id(&self) -> i64 {
        self.body["submission_id"]
            .as_i64()
            .expect("response body should contain 'submission_id'")
    }
}
