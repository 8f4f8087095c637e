//! Resource descriptors: which event names drive which state transitions.
//!
//! A descriptor is configuration supplied once per resource type. It is
//! validated into [`EventRoutes`], a closed lookup from event name to
//! [`EventKind`], before any reducer is built.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Remote operation with a request lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
    FetchOne,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::FetchOne,
    ];

    fn token(self) -> &'static str {
        match self {
            Operation::List => "LIST",
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::FetchOne => "FETCH_ONE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token().to_ascii_lowercase())
    }
}

/// Stage of a request lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Requested,
    Succeeded,
    Failed,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Requested, Phase::Succeeded, Phase::Failed];

    fn token(self) -> &'static str {
        match self {
            Phase::Requested => "REQUESTED",
            Phase::Succeeded => "SUCCEEDED",
            Phase::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token().to_ascii_lowercase())
    }
}

/// What a resolved event name means to the reducers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Lifecycle(Operation, Phase),
    /// Local replacement of the focused record.
    Set,
    /// Return both slices to their empty state.
    Reset,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Lifecycle(op, phase) => write!(f, "{op}_{phase}"),
            EventKind::Set => f.write_str("set"),
            EventKind::Reset => f.write_str("reset"),
        }
    }
}

/// Event names for one resource type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceDescriptor {
    resource: String,
    lifecycle: BTreeMap<(Operation, Phase), String>,
    set: Option<String>,
    reset: Option<String>,
}

impl ResourceDescriptor {
    /// An empty descriptor; every lifecycle name must be added before it
    /// validates.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            lifecycle: BTreeMap::new(),
            set: None,
            reset: None,
        }
    }

    /// A complete descriptor with names derived from the resource name,
    /// e.g. `ISSUES_LIST_REQUESTED`, `ISSUES_FETCH_ONE_FAILED`, `ISSUES_SET`.
    pub fn conventional(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        let prefix: String = resource
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();

        let mut descriptor = Self::new(resource);
        for op in Operation::ALL {
            for phase in Phase::ALL {
                let name = format!("{prefix}_{}_{}", op.token(), phase.token());
                descriptor.lifecycle.insert((op, phase), name);
            }
        }
        descriptor.set = Some(format!("{prefix}_SET"));
        descriptor.reset = Some(format!("{prefix}_RESET"));
        descriptor
    }

    /// Bind (or rebind) the event name for one lifecycle step.
    pub fn with_event(
        mut self,
        operation: Operation,
        phase: Phase,
        name: impl Into<String>,
    ) -> Self {
        self.lifecycle.insert((operation, phase), name.into());
        self
    }

    /// Remove the event name for one lifecycle step.
    pub fn without_event(mut self, operation: Operation, phase: Phase) -> Self {
        self.lifecycle.remove(&(operation, phase));
        self
    }

    pub fn with_set(mut self, name: impl Into<String>) -> Self {
        self.set = Some(name.into());
        self
    }

    pub fn with_reset(mut self, name: impl Into<String>) -> Self {
        self.reset = Some(name.into());
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn event_name(&self, operation: Operation, phase: Phase) -> Option<&str> {
        self.lifecycle.get(&(operation, phase)).map(String::as_str)
    }

    pub fn set_event(&self) -> Option<&str> {
        self.set.as_deref()
    }

    pub fn reset_event(&self) -> Option<&str> {
        self.reset.as_deref()
    }

    /// Check the descriptor and build its routing table.
    ///
    /// Every operation needs all three lifecycle names, and no name may be
    /// bound twice. `set` and `reset` are optional.
    pub fn validate(&self) -> Result<EventRoutes> {
        if self.resource.trim().is_empty() {
            return Err(StoreError::EmptyResourceName);
        }

        let mut routes = EventRoutes {
            resource: self.resource.clone(),
            by_name: HashMap::new(),
            by_kind: HashMap::new(),
        };

        for op in Operation::ALL {
            for phase in Phase::ALL {
                let name = self.event_name(op, phase).ok_or_else(|| StoreError::MissingEventName {
                    resource: self.resource.clone(),
                    operation: op,
                    phase,
                })?;
                routes.bind(name, EventKind::Lifecycle(op, phase))?;
            }
        }
        if let Some(name) = &self.set {
            routes.bind(name, EventKind::Set)?;
        }
        if let Some(name) = &self.reset {
            routes.bind(name, EventKind::Reset)?;
        }

        Ok(routes)
    }
}

/// Validated mapping between event names and [`EventKind`]s.
#[derive(Clone, Debug)]
pub struct EventRoutes {
    resource: String,
    by_name: HashMap<String, EventKind>,
    by_kind: HashMap<EventKind, String>,
}

impl EventRoutes {
    fn bind(&mut self, name: &str, kind: EventKind) -> Result<()> {
        if name.is_empty() || self.by_name.contains_key(name) {
            return Err(StoreError::DuplicateEventName {
                resource: self.resource.clone(),
                name: name.to_string(),
            });
        }
        self.by_name.insert(name.to_string(), kind);
        self.by_kind.insert(kind, name.to_string());
        Ok(())
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Resolve an incoming event type. `None` means the event is not for
    /// this resource.
    pub fn resolve(&self, event_type: &str) -> Option<EventKind> {
        self.by_name.get(event_type).copied()
    }

    /// The event name bound to `kind`, if any.
    pub fn name_of(&self, kind: EventKind) -> Option<&str> {
        self.by_kind.get(&kind).map(String::as_str)
    }

    /// All bound event names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_names() {
        let descriptor = ResourceDescriptor::conventional("issues");
        assert_eq!(
            descriptor.event_name(Operation::List, Phase::Requested),
            Some("ISSUES_LIST_REQUESTED")
        );
        assert_eq!(
            descriptor.event_name(Operation::FetchOne, Phase::Failed),
            Some("ISSUES_FETCH_ONE_FAILED")
        );
        assert_eq!(descriptor.set_event(), Some("ISSUES_SET"));

        let routes = descriptor.validate().unwrap();
        assert_eq!(routes.names().count(), 17);
        assert_eq!(
            routes.resolve("ISSUES_DELETE_SUCCEEDED"),
            Some(EventKind::Lifecycle(Operation::Delete, Phase::Succeeded))
        );
        assert_eq!(routes.resolve("ARTICLES_DELETE_SUCCEEDED"), None);
    }

    #[test]
    fn test_conventional_prefix_sanitized() {
        let descriptor = ResourceDescriptor::conventional("image-attachments");
        assert_eq!(
            descriptor.event_name(Operation::Create, Phase::Succeeded),
            Some("IMAGE_ATTACHMENTS_CREATE_SUCCEEDED")
        );
    }

    #[test]
    fn test_missing_name_rejected() {
        let descriptor = ResourceDescriptor::conventional("issues")
            .without_event(Operation::Update, Phase::Failed);

        match descriptor.validate() {
            Err(StoreError::MissingEventName { operation, phase, .. }) => {
                assert_eq!(operation, Operation::Update);
                assert_eq!(phase, Phase::Failed);
            }
            other => panic!("Expected MissingEventName, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let descriptor = ResourceDescriptor::conventional("issues").with_event(
            Operation::Create,
            Phase::Succeeded,
            "ISSUES_UPDATE_SUCCEEDED",
        );
        assert!(matches!(
            descriptor.validate(),
            Err(StoreError::DuplicateEventName { .. })
        ));
    }

    #[test]
    fn test_set_and_reset_optional() {
        let mut descriptor = ResourceDescriptor::new("people");
        for op in Operation::ALL {
            for phase in Phase::ALL {
                descriptor = descriptor.with_event(op, phase, format!("people/{op}/{phase}"));
            }
        }
        let routes = descriptor.validate().unwrap();
        assert_eq!(routes.name_of(EventKind::Set), None);
        assert_eq!(
            routes.name_of(EventKind::Lifecycle(Operation::List, Phase::Succeeded)),
            Some("people/list/succeeded")
        );
    }

    #[test]
    fn test_empty_resource_rejected() {
        assert!(matches!(
            ResourceDescriptor::conventional(" ").validate(),
            Err(StoreError::EmptyResourceName)
        ));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(
            EventKind::Lifecycle(Operation::FetchOne, Phase::Requested).to_string(),
            "fetch_one_requested"
        );
        assert_eq!(EventKind::Reset.to_string(), "reset");
    }
}
