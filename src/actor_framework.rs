use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Payloads, and Actions)
// =============================================================================

/// Errors produced by a [`ResourceActor`] or the channel in front of it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

/// Trait that any stored record must implement to be managed by [`ResourceActor`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    fn id(&self) -> &Self::Id;

    /// Construct the full record from the generated id and the payload.
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> Result<Self, FrameworkError>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), FrameworkError> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), FrameworkError>;
    fn on_delete(&self) -> Result<(), FrameworkError> { Ok(()) }

    /// Handle a domain-specific action (state transition, counter bump).
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, FrameworkError>;

    // --- Natural key (upsert) ---

    /// Whether this record is the natural-key match for `payload`.
    fn matches(&self, _payload: &Self::CreatePayload) -> bool { false }

    /// Applied to the matching record when an upsert finds one.
    fn on_upsert(&mut self, _payload: Self::CreatePayload) -> Result<(), FrameworkError> { Ok(()) }
}

/// Row predicate used by `List` and `Count`.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Outcome of an upsert: which row was touched and whether it was new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upserted<Id> {
    Created(Id),
    Matched(Id),
}

impl<Id> Upserted<Id> {
    pub fn id(&self) -> &Id {
        match self {
            Upserted::Created(id) | Upserted::Matched(id) => id,
        }
    }

    pub fn into_id(self) -> Id {
        match self {
            Upserted::Created(id) | Upserted::Matched(id) => id,
        }
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T::Id>,
    },
    Upsert {
        payload: T::CreatePayload,
        respond_to: Response<Upserted<T::Id>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: Option<Filter<T>>,
        respond_to: Response<Vec<T>>,
    },
    Count {
        filter: Option<Filter<T>>,
        respond_to: Response<usize>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// Filters are closures, so Debug is written by hand.
impl<T: Entity> Debug for ResourceRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceRequest::Create { payload, .. } => f.debug_struct("Create").field("payload", payload).finish(),
            ResourceRequest::Upsert { payload, .. } => f.debug_struct("Upsert").field("payload", payload).finish(),
            ResourceRequest::Get { id, .. } => f.debug_struct("Get").field("id", id).finish(),
            ResourceRequest::List { filter, .. } => f.debug_struct("List").field("filtered", &filter.is_some()).finish(),
            ResourceRequest::Count { filter, .. } => f.debug_struct("Count").field("filtered", &filter.is_some()).finish(),
            ResourceRequest::Update { id, patch, .. } => f.debug_struct("Update").field("id", id).field("patch", patch).finish(),
            ResourceRequest::Delete { id, .. } => f.debug_struct("Delete").field("id", id).finish(),
            ResourceRequest::Action { id, action, .. } => f.debug_struct("Action").field("id", id).field("action", action).finish(),
        }
    }
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// One table of the backend. Serializes every request, so read-modify-write
/// sequences inside a hook or action never race.
pub struct ResourceActor<T: Entity> {
    name: &'static str,
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        name: &'static str,
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            name,
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self), fields(table = self.name))]
    pub async fn run(mut self) {
        info!("Store starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_create(payload));
                }
                ResourceRequest::Upsert { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_upsert(payload));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items = self
                        .store
                        .values()
                        .filter(|item| filter.as_ref().map_or(true, |f| f(item)))
                        .cloned()
                        .collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Count { filter, respond_to } => {
                    let count = self
                        .store
                        .values()
                        .filter(|item| filter.as_ref().map_or(true, |f| f(item)))
                        .count();
                    let _ = respond_to.send(Ok(count));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
            }
        }
        info!(rows = self.store.len(), "Store stopped");
    }

    fn handle_create(&mut self, payload: T::CreatePayload) -> Result<T::Id, FrameworkError> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create(id.clone(), payload)?;
        item.on_create()?;
        debug!(id = %id, "Row created");
        self.store.insert(id.clone(), item);
        Ok(id)
    }

    fn handle_upsert(&mut self, payload: T::CreatePayload) -> Result<Upserted<T::Id>, FrameworkError> {
        let existing = self.store.values().find(|item| item.matches(&payload)).map(|item| item.id().clone());
        match existing {
            Some(id) => {
                self.commit(&id, |draft| draft.on_upsert(payload))?;
                debug!(id = %id, "Upsert matched existing row");
                Ok(Upserted::Matched(id))
            }
            None => self.handle_create(payload).map(Upserted::Created),
        }
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.commit(&id, |draft| draft.on_update(patch))?;
        self.store.get(&id).cloned().ok_or_else(|| FrameworkError::NotFound(id.to_string()))
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError> {
        let item = self.store.get(&id).ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete()?;
        self.store.remove(&id);
        debug!(id = %id, "Row deleted");
        Ok(())
    }

    fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.commit(&id, |draft| draft.handle_action(action))
    }

    /// Runs `apply` against a copy of the row and writes it back only on success.
    fn commit<R>(
        &mut self,
        id: &T::Id,
        apply: impl FnOnce(&mut T) -> Result<R, FrameworkError>,
    ) -> Result<R, FrameworkError> {
        let current = self.store.get(id).ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let mut draft = current.clone();
        match apply(&mut draft) {
            Ok(result) => {
                self.store.insert(id.clone(), draft);
                Ok(result)
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Change refused, row left untouched");
                Err(e)
            }
        }
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to }).await
    }

    pub async fn upsert(&self, payload: T::CreatePayload) -> Result<Upserted<T::Id>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Upsert { payload, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self, filter: Option<Filter<T>>) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { filter, respond_to }).await
    }

    pub async fn count(&self, filter: Option<Filter<T>>) -> Result<usize, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Count { filter, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}
