//! Typed endpoint declarations and the process-wide registry.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use crate::api::client::ApiRequest;
use crate::cache::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
  /// Cached read; provides tags
  Query,
  /// Write; invalidates tags once its response has been decoded
  Mutation,
}

/// Resource domain an endpoint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
  Auth,
  Posts,
  Stories,
  Series,
  Donations,
  Users,
  Profile,
  Settings,
  Subscriptions,
}

impl Domain {
  pub const fn as_str(self) -> &'static str {
    match self {
      Domain::Auth => "auth",
      Domain::Posts => "posts",
      Domain::Stories => "stories",
      Domain::Series => "series",
      Domain::Donations => "donations",
      Domain::Users => "users",
      Domain::Profile => "profile",
      Domain::Settings => "settings",
      Domain::Subscriptions => "subscriptions",
    }
  }
}

impl fmt::Display for Domain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Untyped part of an endpoint, as stored in the [`Registry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDef {
  pub id: &'static str,
  pub domain: Domain,
  pub kind: EndpointKind,
  pub provides: &'static [Tag],
  pub invalidates: &'static [Tag],
}

/// One REST operation: argument type `A`, decoded response type `R`.
pub struct Endpoint<A: ?Sized, R> {
  pub def: EndpointDef,
  build: fn(&A) -> ApiRequest,
  _response: PhantomData<fn() -> R>,
}

impl<A: ?Sized, R> Endpoint<A, R> {
  pub const fn query(
    id: &'static str,
    domain: Domain,
    provides: &'static [Tag],
    build: fn(&A) -> ApiRequest,
  ) -> Self {
    Self {
      def: EndpointDef {
        id,
        domain,
        kind: EndpointKind::Query,
        provides,
        invalidates: &[],
      },
      build,
      _response: PhantomData,
    }
  }

  pub const fn mutation(
    id: &'static str,
    domain: Domain,
    invalidates: &'static [Tag],
    build: fn(&A) -> ApiRequest,
  ) -> Self {
    Self {
      def: EndpointDef {
        id,
        domain,
        kind: EndpointKind::Mutation,
        provides: &[],
        invalidates,
      },
      build,
      _response: PhantomData,
    }
  }

  /// Build the request for an argument
  pub fn request(&self, arg: &A) -> ApiRequest {
    (self.build)(arg)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
  #[error("endpoint {0} is already registered")]
  Duplicate(&'static str),

  #[error("endpoint {id} must be namespaced as {domain}/...")]
  NotNamespaced { id: &'static str, domain: Domain },

  #[error("query {0} must not invalidate tags")]
  QueryInvalidates(&'static str),

  #[error("mutation {0} must not provide tags")]
  MutationProvides(&'static str),
}

/// Endpoint definitions known to the process.
///
/// Built once at startup from one `register` call per domain module. A
/// rejected batch leaves the registry untouched.
#[derive(Debug, Default)]
pub struct Registry {
  defs: BTreeMap<&'static str, EndpointDef>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry with every domain of the admin API
  pub fn standard() -> Result<Self, RegistryError> {
    use crate::api::{
      auth, donations, posts, profile, series, settings, stories, subscriptions, users,
    };

    let mut registry = Self::new();
    registry.register(Domain::Auth, &auth::ENDPOINTS)?;
    registry.register(Domain::Posts, &posts::ENDPOINTS)?;
    registry.register(Domain::Stories, &stories::ENDPOINTS)?;
    registry.register(Domain::Series, &series::ENDPOINTS)?;
    registry.register(Domain::Donations, &donations::ENDPOINTS)?;
    registry.register(Domain::Users, &users::ENDPOINTS)?;
    registry.register(Domain::Profile, &profile::ENDPOINTS)?;
    registry.register(Domain::Settings, &settings::ENDPOINTS)?;
    registry.register(Domain::Subscriptions, &subscriptions::ENDPOINTS)?;
    Ok(registry)
  }

  pub fn register(&mut self, domain: Domain, defs: &[EndpointDef]) -> Result<(), RegistryError> {
    let prefix = format!("{}/", domain.as_str());
    let mut seen = Vec::with_capacity(defs.len());

    for def in defs {
      if def.domain != domain || !def.id.starts_with(&prefix) || def.id.len() == prefix.len() {
        return Err(RegistryError::NotNamespaced { id: def.id, domain });
      }
      if self.defs.contains_key(def.id) || seen.contains(&def.id) {
        return Err(RegistryError::Duplicate(def.id));
      }
      match def.kind {
        EndpointKind::Query if !def.invalidates.is_empty() => {
          return Err(RegistryError::QueryInvalidates(def.id));
        }
        EndpointKind::Mutation if !def.provides.is_empty() => {
          return Err(RegistryError::MutationProvides(def.id));
        }
        _ => {}
      }
      seen.push(def.id);
    }

    for def in defs {
      self.defs.insert(def.id, *def);
    }
    tracing::debug!(%domain, count = defs.len(), "registered endpoints");
    Ok(())
  }

  pub fn get(&self, id: &str) -> Option<&EndpointDef> {
    self.defs.get(id)
  }

  #[cfg(test)]
  pub fn contains(&self, id: &str) -> bool {
    self.defs.contains_key(id)
  }

  #[cfg(test)]
  pub fn iter(&self) -> impl Iterator<Item = &EndpointDef> {
    self.defs.values()
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.defs.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const LIST: Endpoint<(), ()> = Endpoint::query("posts/list", Domain::Posts, &[Tag::MsPost], |_| {
    ApiRequest::get("/blogs/v1/ms-posts/")
  });

  const DELETE: Endpoint<u64, ()> =
    Endpoint::mutation("posts/delete", Domain::Posts, &[Tag::MsPost], |id| {
      ApiRequest::delete(format!("/blogs/v1/ms-posts/{}/", id))
    });

  #[test]
  fn test_register_and_lookup() {
    let mut registry = Registry::new();
    registry
      .register(Domain::Posts, &[LIST.def, DELETE.def])
      .unwrap();

    assert!(registry.contains("posts/list"));
    assert_eq!(
      registry.get("posts/delete").map(|d| d.kind),
      Some(EndpointKind::Mutation)
    );
    assert_eq!(registry.len(), 2);
  }

  #[test]
  fn test_request_builder() {
    let request = DELETE.request(&9);
    assert_eq!(request.method, reqwest::Method::DELETE);
    assert_eq!(request.path, "/blogs/v1/ms-posts/9/");
  }

  #[test]
  fn test_duplicate_id_is_rejected_and_batch_is_atomic() {
    let mut registry = Registry::new();
    registry.register(Domain::Posts, &[LIST.def]).unwrap();

    let err = registry
      .register(Domain::Posts, &[DELETE.def, LIST.def])
      .unwrap_err();
    assert_eq!(err, RegistryError::Duplicate("posts/list"));
    assert!(!registry.contains("posts/delete"));
  }

  #[test]
  fn test_misdeclared_tags_are_rejected() {
    let mut registry = Registry::new();

    let mut bad_query = LIST.def;
    bad_query.invalidates = &[Tag::MsPost];
    assert_eq!(
      registry.register(Domain::Posts, &[bad_query]),
      Err(RegistryError::QueryInvalidates("posts/list"))
    );

    let mut bad_mutation = DELETE.def;
    bad_mutation.provides = &[Tag::MsPost];
    assert_eq!(
      registry.register(Domain::Posts, &[bad_mutation]),
      Err(RegistryError::MutationProvides("posts/delete"))
    );
  }

  #[test]
  fn test_ids_must_carry_domain_prefix() {
    let mut registry = Registry::new();
    assert!(matches!(
      registry.register(Domain::Stories, &[LIST.def]),
      Err(RegistryError::NotNamespaced { .. })
    ));
  }

  #[test]
  fn test_standard_registry_is_consistent() {
    let registry = Registry::standard().unwrap();
    assert!(registry.contains("auth/login"));
    assert!(registry.contains("settings/get-document"));
    assert!(registry.contains("subscriptions/delete"));
    for def in registry.iter() {
      match def.kind {
        EndpointKind::Query => assert!(!def.provides.is_empty(), "{} provides nothing", def.id),
        EndpointKind::Mutation => assert!(def.provides.is_empty()),
      }
    }
  }

  #[test]
  fn test_every_tag_is_provided_except_backend_only_ones() {
    let registry = Registry::standard().unwrap();
    let provided: Vec<Tag> = registry.iter().flat_map(|d| d.provides.iter().copied()).collect();
    let unprovided: Vec<Tag> = Tag::ALL.into_iter().filter(|t| !provided.contains(t)).collect();
    assert_eq!(unprovided, vec![Tag::Session, Tag::Story]);

    let invalidated: Vec<Tag> = registry
      .iter()
      .flat_map(|d| d.invalidates.iter().copied())
      .collect();
    assert!(!invalidated.contains(&Tag::Story));
  }
}
