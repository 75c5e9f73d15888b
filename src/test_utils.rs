// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use futures::future::BoxFuture;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::Instant;
use tower::Service;

/// How a route answers successive requests
enum Reply {
    /// Responses handed out in order; the last one repeats forever
    Sequence(VecDeque<(u16, String)>),
    /// `before` until `switch_at`, `after` from then on
    Timed {
        switch_at: Instant,
        before: (u16, String),
        after: (u16, String),
    },
}

impl Reply {
    fn next(&mut self) -> (u16, String) {
        match self {
            Reply::Sequence(queue) => {
                if queue.len() > 1 {
                    queue.pop_front().unwrap()
                } else {
                    queue.front().cloned().unwrap()
                }
            }
            Reply::Timed {
                switch_at,
                before,
                after,
            } => {
                if Instant::now() >= *switch_at {
                    after.clone()
                } else {
                    before.clone()
                }
            }
        }
    }
}

struct Route {
    method: String,
    path: String,
    query_contains: Option<String>,
    reply: Reply,
}

impl Route {
    fn matches(&self, method: &str, path: &str, query: &str) -> bool {
        self.method == method
            && self.path == path
            && self
                .query_contains
                .as_ref()
                .map_or(true, |fragment| query.contains(fragment.as_str()))
    }
}

/// A request as seen by the mock
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

/// A mock HTTP service that returns predefined responses based on request method and path.
///
/// Routes are matched in registration order. Unmatched requests get a 404 Status.
#[derive(Clone)]
pub struct MockService {
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn route(self, method: &str, path: &str, query_contains: Option<&str>, reply: Reply) -> Self {
        self.routes.lock().unwrap().push(Route {
            method: method.to_string(),
            path: path.to_string(),
            query_contains: query_contains.map(str::to_string),
            reply,
        });
        self
    }

    fn fixed(status: u16, body: &str) -> Reply {
        Reply::Sequence(VecDeque::from([(status, body.to_string())]))
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.route("GET", path, None, Self::fixed(status, body))
    }

    /// Answer GET requests with `responses` in order, repeating the last one
    pub fn on_get_sequence(self, path: &str, responses: Vec<(u16, String)>) -> Self {
        assert!(!responses.is_empty(), "sequence needs at least one response");
        self.route("GET", path, None, Reply::Sequence(responses.into()))
    }

    /// Answer GET requests with `before` until `after_elapsed` has passed, then with `after`
    pub fn on_get_switching(
        self,
        path: &str,
        after_elapsed: Duration,
        before: (u16, String),
        after: (u16, String),
    ) -> Self {
        let reply = Reply::Timed {
            switch_at: Instant::now() + after_elapsed,
            before,
            after,
        };
        self.route("GET", path, None, reply)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.route("PATCH", path, None, Self::fixed(status, body))
    }

    /// Add a response for PATCH requests whose query string contains `query_fragment`
    pub fn on_patch_with_query(
        self,
        path: &str,
        query_fragment: &str,
        status: u16,
        body: &str,
    ) -> Self {
        self.route("PATCH", path, Some(query_fragment), Self::fixed(status, body))
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.route("DELETE", path, None, Self::fixed(status, body))
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received for a method and path
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn find_response(&self, method: &str, path: &str, query: &str) -> Option<(u16, String)> {
        let mut routes = self.routes.lock().unwrap();
        routes
            .iter_mut()
            .find(|r| r.matches(method, path, query))
            .map(|r| r.reply.next())
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let this = self.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let method = parts.method.to_string();
            let path = parts.uri.path().to_string();
            let query = parts.uri.query().unwrap_or_default().to_string();
            let body = body.collect().await?.to_bytes();

            this.requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path: path.clone(),
                query: query.clone(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });

            let (status, body) = this
                .find_response(&method, &path, &query)
                .unwrap_or_else(|| (404, not_found_json("object", path.as_str())));

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

/// Create a 409 field manager conflict response
pub fn conflict_json(field: &str, manager: &str) -> String {
    status_json(
        409,
        "Conflict",
        &format!(
            "Apply failed with 1 conflict: conflict with \"{}\": {}",
            manager, field
        ),
    )
}

/// Create a failure Status response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a mock Ditto object JSON response
pub fn ditto_json(
    name: &str,
    namespace: &str,
    spec: serde_json::Value,
    status: Option<serde_json::Value>,
) -> String {
    let mut object = serde_json::json!({
        "apiVersion": "iot.eclipse.org/v1alpha1",
        "kind": "Ditto",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid",
            "resourceVersion": "1"
        },
        "spec": spec
    });
    if let Some(status) = status {
        object["status"] = status;
    }
    object.to_string()
}

pub const DITTO_PATH: &str = "/apis/iot.eclipse.org/v1alpha1/namespaces/default/dittos/demo";

pub fn ditto_ref() -> crate::types::ResourceRef {
    crate::types::ResourceRef::new(
        crate::types::ResourceDescriptor::new("iot.eclipse.org", "v1alpha1", "Ditto", "dittos"),
        "default",
        "demo",
    )
    .unwrap()
}
