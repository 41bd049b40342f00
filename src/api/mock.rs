//! Recording in-memory transport for tests.
//!
//! Routes are matched on method and URL path. Each route holds a queue of
//! responses; the last one is sticky, so a route registered once answers
//! every call.

use crate::api::client::{ApiResponse, OutgoingRequest, Transport};
use crate::api::error::HttpError;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Route {
  method: Method,
  path: String,
  responses: VecDeque<Result<ApiResponse, HttpError>>,
}

pub struct MockTransport {
  routes: Mutex<Vec<Route>>,
  requests: Mutex<Vec<OutgoingRequest>>,
  delay: Option<Duration>,
}

impl MockTransport {
  pub fn new() -> Arc<Self> {
    Arc::new(Self {
      routes: Mutex::new(Vec::new()),
      requests: Mutex::new(Vec::new()),
      delay: None,
    })
  }

  /// Delay every response, to keep requests in flight
  pub fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
    let inner = Arc::try_unwrap(self).unwrap_or_else(|_| panic!("mock already shared"));
    Arc::new(Self {
      delay: Some(delay),
      ..inner
    })
  }

  pub fn on(&self, method: Method, path: &str, status: u16, body: Value) {
    self.push(
      method,
      path,
      Ok(ApiResponse {
        status,
        body: serde_json::to_vec(&body).unwrap(),
      }),
    );
  }

  pub fn on_raw(&self, method: Method, path: &str, status: u16, body: &str) {
    self.push(
      method,
      path,
      Ok(ApiResponse {
        status,
        body: body.as_bytes().to_vec(),
      }),
    );
  }

  pub fn fail(&self, method: Method, path: &str, error: HttpError) {
    self.push(method, path, Err(error));
  }

  fn push(&self, method: Method, path: &str, response: Result<ApiResponse, HttpError>) {
    let mut routes = self.routes.lock().unwrap();
    match routes
      .iter_mut()
      .find(|r| r.method == method && r.path == path)
    {
      Some(route) => route.responses.push_back(response),
      None => routes.push(Route {
        method,
        path: path.to_string(),
        responses: VecDeque::from([response]),
      }),
    }
  }

  /// Every request received so far, in arrival order
  pub fn requests(&self) -> Vec<OutgoingRequest> {
    self.requests.lock().unwrap().clone()
  }

  /// Number of requests received for a route
  pub fn count(&self, method: Method, path: &str) -> usize {
    self
      .requests
      .lock()
      .unwrap()
      .iter()
      .filter(|r| r.method == method && r.url.path() == path)
      .count()
  }

  fn next_response(&self, method: &Method, path: &str) -> Result<ApiResponse, HttpError> {
    let mut routes = self.routes.lock().unwrap();
    let route = routes
      .iter_mut()
      .find(|r| &r.method == method && r.path == path);

    match route {
      Some(route) if route.responses.len() > 1 => route.responses.pop_front().unwrap(),
      Some(route) => route.responses.front().cloned().unwrap(),
      None => Ok(ApiResponse {
        status: 404,
        body: br#"{"detail": "no mock route"}"#.to_vec(),
      }),
    }
  }
}

#[async_trait]
impl Transport for MockTransport {
  async fn send(&self, request: OutgoingRequest) -> Result<ApiResponse, HttpError> {
    let method = request.method.clone();
    let path = request.url.path().to_string();
    self.requests.lock().unwrap().push(request);

    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }

    self.next_response(&method, &path)
  }
}
