#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shelf_app::App;
use shelf_kernel::settings::{AuthSettings, DatabaseSettings, Settings};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_settings() -> Settings {
    Settings {
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            ..DatabaseSettings::default()
        },
        auth: AuthSettings {
            jwt_secret: TEST_SECRET.to_string(),
            bcrypt_cost: 4,
            ..AuthSettings::default()
        },
        ..Settings::default()
    }
}

/// A booted app on a fresh in-memory database.
pub struct TestApp {
    pub app: App,
    pub router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let app = shelf_app::bootstrap(test_settings()).await.unwrap();
        let router = app.router();
        Self { app, router }
    }

    pub fn db(&self) -> &sqlx::SqlitePool {
        &self.app.state.db
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            set_cookie,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn register(&self, name: &str, email: &str, role: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "name": name,
                "email": email,
                "password": "correct horse",
                "role": role
            })),
        )
        .await
    }

    /// Log in and return the `token=...` pair to replay as a Cookie header.
    pub async fn login(&self, email: &str, role: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "email": email, "password": "correct horse", "role": role })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        let set_cookie = response.set_cookie.expect("login sets a cookie");
        set_cookie
            .split(';')
            .next()
            .unwrap()
            .trim()
            .to_string()
    }

    pub async fn signed_in(&self, name: &str, email: &str, role: &str) -> String {
        let registered = self.register(name, email, role).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);
        self.login(email, role).await
    }

    pub async fn add_book(&self, admin: &str, title: &str, author: &str, year: i64) -> i64 {
        let response = self
            .send(
                Method::POST,
                "/addBook",
                Some(admin),
                Some(json!({ "title": title, "author": author, "year": year })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["bookId"].as_i64().unwrap()
    }

    pub async fn add_review(&self, user: &str, book_id: i64, rating: i64, comment: &str) -> i64 {
        let response = self
            .send(
                Method::POST,
                "/addReview",
                Some(user),
                Some(json!({ "book_id": book_id, "rating": rating, "comment": comment })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["reviewId"].as_i64().unwrap()
    }

    pub async fn count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.db())
            .await
            .unwrap();
        count
    }
}
