//! REST access for the admin backend.
//!
//! [`ResourceClient`] executes requests, the domain modules declare typed
//! [`Endpoint`]s, and [`Api`] ties both to the [`QueryCache`]: queries go
//! through the cache, mutations invalidate it.

mod client;
mod endpoint;
mod error;
#[cfg(test)]
pub(crate) mod mock;
pub mod types;

pub mod auth;
pub mod donations;
pub mod posts;
pub mod profile;
pub mod series;
pub mod settings;
pub mod stories;
pub mod subscriptions;
pub mod users;

#[cfg(test)]
pub use client::Body;
pub use client::{ApiRequest, MultipartForm, ReqwestTransport, ResourceClient};
pub use endpoint::{Endpoint, EndpointDef, EndpointKind, Registry};
pub use error::HttpError;

use std::sync::Arc;

use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{Erased, Fetcher, QueryCache, QueryKey};
use crate::query::QueryHandle;

/// Entry point views and forms use to reach the backend. Cheap to clone.
#[derive(Clone)]
pub struct Api {
  client: ResourceClient,
  cache: QueryCache,
  registry: Arc<Registry>,
}

impl Api {
  pub fn new(client: ResourceClient, cache: QueryCache, registry: Arc<Registry>) -> Self {
    Self {
      client,
      cache,
      registry,
    }
  }

  pub fn client(&self) -> &ResourceClient {
    &self.client
  }

  /// Whether a bearer token is stored
  pub fn is_signed_in(&self) -> bool {
    self.client.tokens().token().is_some()
  }

  fn check(&self, def: &EndpointDef, kind: EndpointKind) -> Result<(), HttpError> {
    let Some(registered) = self.registry.get(def.id) else {
      return Err(HttpError::Unregistered(def.id));
    };
    if registered.kind != kind || def.kind != kind {
      return Err(HttpError::InvalidRequest(format!(
        "{} is a {:?} endpoint",
        def.id, def.kind
      )));
    }
    Ok(())
  }

  /// Acquire a cached query.
  ///
  /// The handle shares its entry with every other handle on the same
  /// endpoint and argument.
  pub fn query<A, R>(&self, endpoint: &Endpoint<A, R>, arg: &A) -> QueryHandle<R>
  where
    A: Serialize + ?Sized,
    R: DeserializeOwned + Send + Sync + 'static,
  {
    let def = endpoint.def;
    let key = QueryKey::new(def.id, arg);

    let fetcher: Fetcher = match self.check(&def, EndpointKind::Query) {
      Ok(()) => {
        let client = self.client.clone();
        let request = endpoint.request(arg);
        Arc::new(move || {
          let client = client.clone();
          let request = request.clone();
          async move {
            let response = client.send(request).await?;
            let data: R = response.decode(def.id)?;
            Ok(Arc::new(data) as Erased)
          }
          .boxed()
        })
      }
      Err(e) => {
        warn!(endpoint = def.id, error = %e, "refusing query");
        Arc::new(move || {
          let e = e.clone();
          async move { Err(e) }.boxed()
        })
      }
    };

    QueryHandle::new(self.cache.acquire(key, def.provides, fetcher))
  }

  /// Run a mutation and invalidate its tags once a 2xx response arrives.
  ///
  /// Mutations with overlapping tags run one at a time.
  pub async fn mutate<A, R>(&self, endpoint: &Endpoint<A, R>, arg: &A) -> Result<R, HttpError>
  where
    A: ?Sized + Sync,
    R: DeserializeOwned,
  {
    self.mutate_then(endpoint, arg, |_| Ok(())).await
  }

  /// Like [`Api::mutate`], running `on_success` on the decoded response
  /// before tags are invalidated. A body that does not decode is still
  /// reported as an error, after invalidation. Sign-in stores its token here so the
  /// refetches it triggers are authenticated.
  pub async fn mutate_then<A, R, F>(
    &self,
    endpoint: &Endpoint<A, R>,
    arg: &A,
    on_success: F,
  ) -> Result<R, HttpError>
  where
    A: ?Sized + Sync,
    R: DeserializeOwned,
    F: FnOnce(&R) -> Result<(), HttpError>,
  {
    let def = endpoint.def;
    self.check(&def, EndpointKind::Mutation)?;
    let request = endpoint.request(arg);

    let _guards = self.cache.lock_tags(def.invalidates).await;
    info!(endpoint = def.id, method = %request.method, path = %request.path, "running mutation");

    let response = self.client.send(request).await?;
    let result = response
      .decode::<R>(def.id)
      .and_then(|data| on_success(&data).map(|()| data));

    // A 2xx means the write happened, whatever the body looks like
    let refetched = self.cache.invalidate(def.invalidates);
    let invalidated: Vec<&str> = def.invalidates.iter().map(|t| t.as_str()).collect();
    match &result {
      Ok(_) => info!(endpoint = def.id, ?invalidated, refetched, "mutation succeeded"),
      Err(e) => warn!(
        endpoint = def.id,
        ?invalidated,
        refetched,
        error = %e,
        "mutation applied but its response was rejected"
      ),
    }
    result
  }

  /// Forget the token and every cached entry
  pub fn sign_out(&self) -> std::io::Result<()> {
    self.cache.clear();
    self.client.tokens().clear()
  }
}


#[cfg(test)]
mod tests {
  use super::testing::api_with;
  use super::*;
  use crate::api::mock::MockTransport;
  use crate::api::endpoint::Domain;
  use crate::api::types::MsPost;
  use crate::cache::Tag;
  use reqwest::Method;
  use serde_json::json;
  use std::time::Duration;

  const UNLISTED: Endpoint<(), Vec<MsPost>> =
    Endpoint::query("posts/unlisted", Domain::Posts, &[Tag::MsPost], |_| {
      ApiRequest::get("/blogs/v1/unlisted/")
    });

  fn post(id: u64, title: &str) -> serde_json::Value {
    json!({"id": id, "title": title, "description": "A description long enough"})
  }

  #[tokio::test]
  async fn test_second_acquire_is_served_from_cache() {
    let transport = MockTransport::new();
    transport.on(Method::GET, "/blogs/v1/ms-posts/", 200, json!([post(1, "First")]));
    let api = api_with(transport.clone());

    let mut first = api.query(&posts::LIST, &());
    first.settled().await;
    let mut second = api.query(&posts::LIST, &());
    let state = second.settled().await;

    assert_eq!(state.data().map(|p| p.len()), Some(1));
    assert_eq!(transport.count(Method::GET, "/blogs/v1/ms-posts/"), 1);
  }

  #[tokio::test]
  async fn test_concurrent_handles_share_one_request() {
    let transport = MockTransport::new().with_delay(Duration::from_millis(20));
    transport.on(Method::GET, "/donation/all-donations/", 200, json!([]));
    let api = api_with(transport.clone());

    let mut handles: Vec<_> = (0..4)
      .map(|_| api.query(&donations::LIST, &()))
      .collect();
    for handle in handles.iter_mut() {
      assert!(handle.settled().await.is_success());
    }
    assert_eq!(transport.count(Method::GET, "/donation/all-donations/"), 1);
  }

  #[tokio::test]
  async fn test_mutation_refetches_subscribed_queries_once() {
    let transport = MockTransport::new();
    transport.on(Method::GET, "/blogs/v1/ms-posts/", 200, json!([post(1, "First")]));
    transport.on(
      Method::GET,
      "/blogs/v1/ms-posts/",
      200,
      json!([post(1, "First"), post(2, "Second")]),
    );
    transport.on_raw(Method::DELETE, "/blogs/v1/ms-posts/3/", 204, "");
    transport.on(Method::GET, "/auth/get_user_profile/", 200, json!({"full_name": "A", "email": "a@b.co"}));
    let api = api_with(transport.clone());

    let mut list = api.query(&posts::LIST, &());
    let mut profile = api.query(&profile::GET, &());
    list.settled().await;
    profile.settled().await;

    api.mutate(&posts::DELETE, &3).await.unwrap();
    let state = list.settled().await;

    assert_eq!(state.data().map(|p| p.len()), Some(2));
    assert_eq!(transport.count(Method::GET, "/blogs/v1/ms-posts/"), 2);
    assert_eq!(transport.count(Method::GET, "/auth/get_user_profile/"), 1);
  }

  #[tokio::test]
  async fn test_failed_mutation_does_not_invalidate() {
    let transport = MockTransport::new();
    transport.on(Method::GET, "/blogs/v1/ms-posts/", 200, json!([]));
    transport.on(Method::DELETE, "/blogs/v1/ms-posts/3/", 500, json!({"detail": "boom"}));
    let api = api_with(transport.clone());

    let mut list = api.query(&posts::LIST, &());
    list.settled().await;

    let err = api.mutate(&posts::DELETE, &3).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(transport.count(Method::GET, "/blogs/v1/ms-posts/"), 1);
  }

  #[tokio::test]
  async fn test_bare_string_acknowledgement_still_invalidates() {
    let transport = MockTransport::new();
    transport.on(Method::GET, "/blogs/v1/ms-posts/", 200, json!([post(3, "Third")]));
    transport.on(Method::GET, "/blogs/v1/ms-posts/", 200, json!([]));
    transport.on(Method::DELETE, "/blogs/v1/ms-posts/3/", 200, json!("Deleted"));
    let api = api_with(transport.clone());

    let mut list = api.query(&posts::LIST, &());
    list.settled().await;

    let response = api.mutate(&posts::DELETE, &3).await.unwrap();
    assert_eq!(response.message_or("Post deleted"), "Deleted");

    let state = list.settled().await;
    assert_eq!(state.data().map(|p| p.len()), Some(0));
    assert_eq!(transport.count(Method::GET, "/blogs/v1/ms-posts/"), 2);
  }

  #[tokio::test]
  async fn test_undecodable_success_body_still_invalidates() {
    let transport = MockTransport::new();
    transport.on(
      Method::GET,
      "/auth/get_user_profile/",
      200,
      json!({"full_name": "A", "email": "a@b.co"}),
    );
    transport.on(Method::POST, "/auth/login/", 200, json!("ok"));
    let api = api_with(transport.clone());

    let mut profile = api.query(&profile::GET, &());
    profile.settled().await;

    let credentials = auth::Credentials {
      email: "admin@ms.org".to_string(),
      password: "password1".to_string(),
    };
    let err = api.mutate(&auth::LOGIN, &credentials).await.unwrap_err();
    assert!(matches!(err, HttpError::SchemaMismatch { status: 200, .. }));

    profile.settled().await;
    assert_eq!(transport.count(Method::GET, "/auth/get_user_profile/"), 2);
  }

  #[tokio::test]
  async fn test_unregistered_endpoint_is_refused() {
    let transport = MockTransport::new();
    let api = api_with(transport.clone());

    let mut handle = api.query(&UNLISTED, &());
    let state = handle.settled().await;

    assert_eq!(state.error(), Some(&HttpError::Unregistered("posts/unlisted")));
    assert!(transport.requests().is_empty());
  }

  #[tokio::test]
  async fn test_schema_mismatch_is_reported_per_endpoint() {
    let transport = MockTransport::new();
    transport.on(Method::GET, "/blogs/v1/ms-posts/", 200, json!({"unexpected": true}));
    let api = api_with(transport);

    let mut handle = api.query(&posts::LIST, &());
    let state = handle.settled().await;

    assert!(matches!(
      state.error(),
      Some(HttpError::SchemaMismatch {
        endpoint: "posts/list",
        status: 200,
        ..
      })
    ));
  }

  #[tokio::test]
  async fn test_sign_out_clears_token_and_cache() {
    let transport = MockTransport::new();
    transport.on(Method::GET, "/blogs/v1/ms-posts/", 200, json!([]));
    let api = api_with(transport);

    let mut handle = api.query(&posts::LIST, &());
    handle.settled().await;
    assert!(api.is_signed_in());

    api.sign_out().unwrap();
    assert!(!api.is_signed_in());
    assert_eq!(api.cache.len(), 0);
  }
}
