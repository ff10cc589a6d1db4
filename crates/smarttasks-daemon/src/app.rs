use axum::{
    routing::{delete, get, post, put},
    Router,
};
use smarttasks_core::config::SmartTasksConfig;
use smarttasks_reminder::ReminderScheduler;
use smarttasks_tasks::TaskManager;
use std::sync::Arc;

use crate::{http, inbox::NotificationInbox};

/// Central shared state, passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: SmartTasksConfig,
    pub tasks: TaskManager,
    pub scheduler: Arc<ReminderScheduler>,
    pub inbox: Arc<NotificationInbox>,
}

impl AppState {
    pub fn new(
        config: SmartTasksConfig,
        tasks: TaskManager,
        scheduler: Arc<ReminderScheduler>,
        inbox: Arc<NotificationInbox>,
    ) -> Self {
        Self {
            config,
            tasks,
            scheduler,
            inbox,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(http::health::health_handler))
        .route(
            "/tasks",
            get(http::tasks::list_tasks).post(http::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            put(http::tasks::update_task).delete(http::tasks::delete_task),
        )
        .route("/tasks/{id}/complete", post(http::tasks::complete_task))
        .route("/reminders", get(http::reminders::reminders_handler))
        .route(
            "/notifications",
            get(http::notifications::list_notifications),
        )
        .route(
            "/notifications/{task_id}",
            delete(http::notifications::dismiss_notification),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::TokioAlarm;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use smarttasks_reminder::{Notifier, SystemClock, TaskLifecycleBridge, BRIDGE_EVENT_KINDS};
    use smarttasks_tasks::TaskEventBus;
    use std::time::Duration;
    use tokio::sync::{mpsc, watch};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        state: Arc<AppState>,
        _shutdown: watch::Sender<bool>,
    }

    fn test_app() -> TestApp {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        smarttasks_tasks::db::init_db(&conn).unwrap();
        let bus = Arc::new(TaskEventBus::new());
        let tasks = TaskManager::new(conn, bus.clone());

        let (fired_tx, _fired_rx) = mpsc::channel(8);
        let inbox = Arc::new(NotificationInbox::new());
        let scheduler = Arc::new(ReminderScheduler::new(
            Arc::new(TokioAlarm::new(fired_tx)),
            inbox.clone(),
            Arc::new(SystemClock),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let events = bus.subscribe(&BRIDGE_EVENT_KINDS);
        tokio::spawn(TaskLifecycleBridge::new(scheduler.clone()).run(events, shutdown_rx));

        let state = Arc::new(AppState::new(
            SmartTasksConfig::default(),
            tasks,
            scheduler,
            inbox,
        ));
        TestApp {
            router: build_router(state.clone()),
            state,
            _shutdown: shutdown_tx,
        }
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = router.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn eventually(mut check: impl FnMut() -> bool) {
        for _ in 0..200 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    fn in_one_hour_millis() -> i64 {
        (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp_millis()
    }

    #[tokio::test]
    async fn health_reports_healthy_scheduler() {
        let app = test_app();
        let (status, body) = send(&app.router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["scheduler"]["state"], "healthy");
        assert_eq!(body["pending_reminders"], 0);
    }

    #[tokio::test]
    async fn created_task_with_start_time_gets_armed() {
        let app = test_app();
        let (status, task) = send(
            &app.router,
            "POST",
            "/tasks",
            Some(json!({ "title": "standup", "start_time": in_one_hour_millis() })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = task["id"].as_i64().unwrap();

        let scheduler = app.state.scheduler.clone();
        eventually(|| scheduler.armed().is_some_and(|a| a.task_id == id)).await;

        let (status, reminders) = send(&app.router, "GET", "/reminders", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reminders["armed"]["task_id"], id);
        assert_eq!(reminders["pending"][0]["title"], "standup");
    }

    #[tokio::test]
    async fn completing_task_drops_its_reminder() {
        let app = test_app();
        let (_, task) = send(
            &app.router,
            "POST",
            "/tasks",
            Some(json!({ "title": "gym", "start_time": in_one_hour_millis() })),
        )
        .await;
        let id = task["id"].as_i64().unwrap();
        let scheduler = app.state.scheduler.clone();
        eventually(|| scheduler.pending().len() == 1).await;

        let (status, done) = send(
            &app.router,
            "POST",
            &format!("/tasks/{id}/complete"),
            Some(json!({ "completed": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["completed"], true);
        eventually(|| scheduler.pending().is_empty() && scheduler.armed().is_none()).await;
    }

    #[tokio::test]
    async fn task_without_start_time_schedules_nothing() {
        let app = test_app();
        let body = json!({ "title": "someday" });
        let (status, _) = send(&app.router, "POST", "/tasks", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, tasks) = send(&app.router, "GET", "/tasks", None).await;
        assert_eq!(tasks.as_array().unwrap().len(), 1);
        assert!(app.state.scheduler.pending().is_empty());
    }

    #[tokio::test]
    async fn invalid_and_missing_tasks_map_to_status_codes() {
        let app = test_app();
        let blank = json!({ "title": "  " });
        let (status, body) = send(&app.router, "POST", "/tasks", Some(blank)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("title"));

        let (status, body) = send(&app.router, "DELETE", "/tasks/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "task not found: 42");

        let (status, _) = send(
            &app.router,
            "PUT",
            "/tasks/42",
            Some(json!({ "title": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_task_returns_no_content() {
        let app = test_app();
        let (_, task) = send(
            &app.router,
            "POST",
            "/tasks",
            Some(json!({ "title": "dentist", "start_time": in_one_hour_millis() })),
        )
        .await;
        let id = task["id"].as_i64().unwrap();
        let scheduler = app.state.scheduler.clone();
        eventually(|| scheduler.pending().len() == 1).await;

        let (status, _) = send(&app.router, "DELETE", &format!("/tasks/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        eventually(|| scheduler.pending().is_empty()).await;
    }

    #[tokio::test]
    async fn notifications_can_be_listed_and_dismissed() {
        let app = test_app();
        app.state.inbox.notify(7, "water plants");

        let (status, body) = send(&app.router, "GET", "/notifications", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notifications"][0]["task_id"], 7);

        let (status, _) = send(&app.router, "DELETE", "/notifications/7", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app.router, "DELETE", "/notifications/7", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }
}
