//! Error taxonomy and the load-time error filter.
//!
//! Every failure that can happen while registering or loading a record is a
//! [`RegistryError`]. Each variant classifies into an [`ErrorKind`]; the
//! [`ErrorFilter`] decides per kind whether the error aborts the load or is
//! demoted to a `NOTE:` line on its [`Logger`](crate::log::Logger).

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::container::ContainerError;
use crate::entity::EntityError;
use crate::log::{Logger, TracingLogger};
use crate::log_warn;
use crate::schema::CodecError;
use crate::store::StoreError;

/// Classification of a registry or load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An id or name is already indexed.
    Duplicate,
    /// A referenced record, kind or format does not exist.
    Unknown,
    /// Bytes or values that cannot form a valid record.
    Malformed,
    /// An update contradicts what is already registered.
    Conflict,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::Unknown => "unknown",
            ErrorKind::Malformed => "malformed",
            ErrorKind::Conflict => "conflict",
        };
        f.write_str(name)
    }
}

/// Uniqueness constraint named by a duplicate error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    SystemId,
    SystemName,
    FacilityId,
    FacilityNameInSystem,
    CommodityId,
    CommodityName,
}

impl Constraint {
    /// Whether the constraint is on the id rather than the name.
    pub fn is_id(self) -> bool {
        matches!(
            self,
            Constraint::SystemId | Constraint::FacilityId | Constraint::CommodityId
        )
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Constraint::SystemId => "system id",
            Constraint::SystemName => "system name",
            Constraint::FacilityId => "facility id",
            Constraint::FacilityNameInSystem => "facility name in system",
            Constraint::CommodityId => "commodity id",
            Constraint::CommodityName => "commodity name",
        };
        f.write_str(text)
    }
}

/// Record type a dangling reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    System,
    Facility,
    Commodity,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Reference::System => "system",
            Reference::Facility => "facility",
            Reference::Commodity => "commodity",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{name} (#{id}): duplicate: {constraint}")]
    Duplicate {
        constraint: Constraint,
        name: String,
        id: u32,
    },

    #[error("{referrer}: unknown {reference} #{id}")]
    Unknown {
        reference: Reference,
        id: u32,
        referrer: String,
    },

    #[error("unrecognized loader type: {0}")]
    UnknownLoader(String),

    #[error("unknown system name: {0}")]
    UnknownName(String),

    #[error("{name} (#{id}): name collides with #{existing}")]
    NameCollision { name: String, id: u32, existing: u32 },

    #[error("{name} (#{id}): facility renames and relocations are not supported")]
    FacilityMoved { name: String, id: u32 },

    #[error("invalid radius: {0}")]
    InvalidRadius(f64),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::Duplicate { .. } => ErrorKind::Duplicate,
            RegistryError::Unknown { .. }
            | RegistryError::UnknownLoader(_)
            | RegistryError::UnknownName(_) => ErrorKind::Unknown,
            RegistryError::NameCollision { .. } | RegistryError::FacilityMoved { .. } => {
                ErrorKind::Conflict
            }
            RegistryError::InvalidRadius(_)
            | RegistryError::Entity(_)
            | RegistryError::Codec(_)
            | RegistryError::Store(_) => ErrorKind::Malformed,
            RegistryError::Container(err) => err.kind(),
        }
    }

    pub(crate) fn duplicate(constraint: Constraint, name: impl Into<String>, id: u32) -> Self {
        RegistryError::Duplicate {
            constraint,
            name: name.into(),
            id,
        }
    }

    pub(crate) fn unknown(reference: Reference, id: u32, referrer: impl Into<String>) -> Self {
        RegistryError::Unknown {
            reference,
            id,
            referrer: referrer.into(),
        }
    }
}

/// Which filterable error kinds abort a load.
///
/// The default demotes both duplicates and unknown references and keeps
/// the resulting notes quiet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterPolicy {
    pub error_on_duplicate: bool,
    pub error_on_unknown: bool,
    pub show_warnings: bool,
}

impl FilterPolicy {
    /// Every filterable kind is fatal.
    pub fn strict() -> Self {
        Self {
            error_on_duplicate: true,
            error_on_unknown: true,
            show_warnings: true,
        }
    }

    /// Whether an error of `kind` is demoted to a warning.
    pub fn should_suppress(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Duplicate => !self.error_on_duplicate,
            ErrorKind::Unknown => !self.error_on_unknown,
            ErrorKind::Malformed | ErrorKind::Conflict => false,
        }
    }
}

/// A [`FilterPolicy`] paired with the sink demoted errors are reported to.
#[derive(Clone)]
pub struct ErrorFilter {
    policy: FilterPolicy,
    logger: Arc<dyn Logger>,
}

impl ErrorFilter {
    pub fn new(policy: FilterPolicy, logger: Arc<dyn Logger>) -> Self {
        Self { policy, logger }
    }

    /// Filter reporting to `tracing`.
    pub fn with_policy(policy: FilterPolicy) -> Self {
        Self::new(policy, Arc::new(TracingLogger))
    }

    pub fn policy(&self) -> FilterPolicy {
        self.policy
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn should_suppress(&self, kind: ErrorKind) -> bool {
        self.policy.should_suppress(kind)
    }

    /// Demote `err` to a note when its kind is suppressed, otherwise hand it back.
    pub fn filter(&self, err: RegistryError) -> Result<(), RegistryError> {
        if !self.should_suppress(err.kind()) {
            return Err(err);
        }
        if self.policy.show_warnings {
            log_warn!(self.logger, "NOTE: {}", err);
        }
        Ok(())
    }
}

impl Default for ErrorFilter {
    fn default() -> Self {
        Self::with_policy(FilterPolicy::default())
    }
}

impl fmt::Debug for ErrorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorFilter")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemoryLogger;

    fn duplicate() -> RegistryError {
        RegistryError::duplicate(Constraint::SystemId, "first", 1)
    }

    fn unknown() -> RegistryError {
        RegistryError::unknown(Reference::System, 5, "Galileo (#10)")
    }

    #[test]
    fn test_duplicate_message() {
        assert_eq!(duplicate().to_string(), "first (#1): duplicate: system id");
        let err = RegistryError::duplicate(Constraint::FacilityNameInSystem, "first/first", 2);
        assert_eq!(err.to_string(), "first/first (#2): duplicate: facility name in system");
    }

    #[test]
    fn test_unknown_message() {
        assert_eq!(unknown().to_string(), "Galileo (#10): unknown system #5");
    }

    #[test]
    fn test_classification() {
        assert_eq!(duplicate().kind(), ErrorKind::Duplicate);
        assert_eq!(unknown().kind(), ErrorKind::Unknown);
        assert_eq!(RegistryError::UnknownLoader("csv".into()).kind(), ErrorKind::Unknown);
        let collision = RegistryError::NameCollision {
            name: "Sol".into(),
            id: 2,
            existing: 1,
        };
        assert_eq!(collision.kind(), ErrorKind::Conflict);
        assert_eq!(
            RegistryError::from(EntityError::InvalidId(0)).kind(),
            ErrorKind::Malformed
        );
    }

    #[test]
    fn test_constraint_is_id() {
        assert!(Constraint::SystemId.is_id());
        assert!(!Constraint::SystemName.is_id());
        assert!(!Constraint::FacilityNameInSystem.is_id());
    }

    #[test]
    fn test_default_policy_suppresses_filterable_kinds() {
        let policy = FilterPolicy::default();
        assert!(policy.should_suppress(ErrorKind::Duplicate));
        assert!(policy.should_suppress(ErrorKind::Unknown));
        assert!(!policy.should_suppress(ErrorKind::Malformed));
        assert!(!policy.should_suppress(ErrorKind::Conflict));
    }

    #[test]
    fn test_strict_policy_suppresses_nothing() {
        let policy = FilterPolicy::strict();
        for kind in [
            ErrorKind::Duplicate,
            ErrorKind::Unknown,
            ErrorKind::Malformed,
            ErrorKind::Conflict,
        ] {
            assert!(!policy.should_suppress(kind));
        }
    }

    #[test]
    fn test_filter_notes_when_showing_warnings() {
        let sink = Arc::new(MemoryLogger::new());
        let filter = ErrorFilter::new(
            FilterPolicy {
                show_warnings: true,
                ..FilterPolicy::default()
            },
            sink.clone(),
        );

        assert!(filter.filter(duplicate()).is_ok());
        assert_eq!(
            sink.messages(),
            vec!["NOTE: first (#1): duplicate: system id".to_string()]
        );
    }

    #[test]
    fn test_filter_is_quiet_by_default() {
        let sink = Arc::new(MemoryLogger::new());
        let filter = ErrorFilter::new(FilterPolicy::default(), sink.clone());
        assert!(filter.filter(unknown()).is_ok());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_filter_returns_fatal_errors() {
        let sink = Arc::new(MemoryLogger::new());
        let filter = ErrorFilter::new(
            FilterPolicy {
                error_on_duplicate: true,
                show_warnings: true,
                ..FilterPolicy::default()
            },
            sink.clone(),
        );

        let err = filter.filter(duplicate()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert!(filter.filter(unknown()).is_ok());

        let err = filter
            .filter(RegistryError::FacilityMoved {
                name: "Sol/Galileo".into(),
                id: 10,
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(sink.messages().len(), 1);
    }
}
