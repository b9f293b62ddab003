//! Resource adapters and the event dispatcher.
//!
//! Every Auth0 resource kind implements [`Resource`] with a typed declaration.
//! The blanket [`Adapter`] impl turns that into something the [`Registry`] can
//! hold: it rejects unknown request types, decodes the declaration and routes
//! the event to `create`, `update` or `delete`.

mod context;
mod error;
mod event;
pub mod poll;
pub mod props;
pub mod resources;

pub use context::{Context, Services};
pub use error::HandlerError;
pub use event::{Event, RequestType, Response};
pub use poll::PollPolicy;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument};

/// Create/update/delete contract for one Auth0 resource kind.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Type name used by the orchestrator, e.g. `Custom::Auth0Role`.
    const RESOURCE_TYPE: &'static str;

    /// Decoded declaration.
    type Props: DeserializeOwned + Send + Sync;

    async fn create(&self, ctx: &Context<'_>, props: &Self::Props)
        -> Result<Response, HandlerError>;

    async fn update(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &Self::Props,
        old: &Self::Props,
    ) -> Result<Response, HandlerError>;

    async fn delete(
        &self,
        ctx: &Context<'_>,
        id: &str,
        props: &Self::Props,
    ) -> Result<Response, HandlerError>;
}

/// Object-safe view of a [`Resource`].
#[async_trait]
pub trait Adapter: Send + Sync {
    fn resource_type(&self) -> &'static str;

    async fn handle(&self, ctx: &Context<'_>) -> Result<Response, HandlerError>;
}

#[async_trait]
impl<R: Resource> Adapter for R {
    fn resource_type(&self) -> &'static str {
        R::RESOURCE_TYPE
    }

    async fn handle(&self, ctx: &Context<'_>) -> Result<Response, HandlerError> {
        let event = ctx.event;

        match &event.request_type {
            RequestType::Create => {
                let props = decode::<R::Props>(&event.resource_properties)?;
                self.create(ctx, &props).await
            }
            RequestType::Update => {
                let id = physical_id(event)?;
                let props = decode::<R::Props>(&event.resource_properties)?;
                let old = event
                    .old_resource_properties
                    .as_ref()
                    .ok_or_else(|| HandlerError::invalid("OldResourceProperties is required"))
                    .and_then(decode::<R::Props>)?;
                self.update(ctx, id, &props, &old).await
            }
            RequestType::Delete => {
                let id = physical_id(event)?;
                let props = decode::<R::Props>(&event.resource_properties)?;
                self.delete(ctx, id, &props).await
            }
            RequestType::Other(other) => Err(HandlerError::UnsupportedRequestType(other.clone())),
        }
    }
}

fn decode<T: DeserializeOwned>(properties: &Map<String, Value>) -> Result<T, HandlerError> {
    serde_json::from_value(Value::Object(properties.clone())).map_err(HandlerError::invalid)
}

fn physical_id(event: &Event) -> Result<&str, HandlerError> {
    event
        .physical_resource_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            HandlerError::invalid(format!(
                "PhysicalResourceId is required for {}",
                event.request_type
            ))
        })
}

/// Fail with `ImmutableFieldChanged` when `old` and `new` differ.
///
/// # Errors
/// Returns `ImmutableFieldChanged` naming `field`.
pub fn ensure_unchanged<T: PartialEq + ?Sized>(
    resource: &'static str,
    field: &'static str,
    new: &T,
    old: &T,
) -> Result<(), HandlerError> {
    if new == old {
        Ok(())
    } else {
        Err(HandlerError::ImmutableFieldChanged { resource, field })
    }
}

/// Adapters keyed by resource type.
#[derive(Clone, Default)]
pub struct Registry {
    adapters: HashMap<&'static str, Arc<dyn Adapter>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with an adapter for every supported Auth0 resource kind.
    #[must_use]
    pub fn with_defaults() -> Self {
        resources::register_all(Self::new())
    }

    /// Add (or replace) the adapter for `adapter.resource_type()`.
    #[must_use]
    pub fn register<A: Adapter + 'static>(mut self, adapter: A) -> Self {
        self.adapters.insert(adapter.resource_type(), Arc::new(adapter));
        self
    }

    #[must_use]
    pub fn get(&self, resource_type: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(resource_type).cloned()
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.adapters.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.resource_types()).finish()
    }
}

/// Dispatches events to the registered adapters.
#[derive(Debug)]
pub struct Provider {
    registry: Registry,
    services: Services,
}

impl Provider {
    #[must_use]
    pub const fn new(registry: Registry, services: Services) -> Self {
        Self { registry, services }
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Apply one lifecycle event.
    ///
    /// # Errors
    /// Returns the adapter's error, or `UnknownResourceType` if nothing is
    /// registered for the event's resource type.
    #[instrument(
        skip_all,
        fields(
            resource_type = %event.resource_type,
            request_type = %event.request_type,
            logical_id = %event.logical_resource_id,
        )
    )]
    pub async fn handle(&self, event: &Event) -> Result<Response, HandlerError> {
        let adapter = self
            .registry
            .get(&event.resource_type)
            .ok_or_else(|| HandlerError::UnknownResourceType(event.resource_type.clone()))?;

        let ctx = Context::new(&self.services, event);
        let response = adapter.handle(&ctx).await?;

        info!(
            physical_id = %response.physical_resource_id,
            "{} {} done",
            event.request_type,
            event.resource_type
        );

        Ok(response)
    }
}
