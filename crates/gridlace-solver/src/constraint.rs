//! Connection constraints: pluggable predicates gating proposed
//! connections, evaluated by an ordered engine.
//!
//! A constraint is a named predicate over `(grid, a, b)`. The
//! [`ConstraintSet`] evaluates registered constraints in registration
//! order, skipping disabled ones and short-circuiting on the first
//! failure. A constraint whose evaluation itself fails blocks the
//! connection rather than propagating the error -- a malfunctioning
//! predicate must not crash the search.
//!
//! Stateful constraints (those that track realized connections, like
//! [`NonCrossing`](crate::NonCrossing)) override the observer hooks
//! [`on_connect`](Constraint::on_connect) /
//! [`on_disconnect`](Constraint::on_disconnect) /
//! [`on_reset`](Constraint::on_reset); the engine notifies every
//! registered constraint, enabled or not, so internal tracking stays
//! consistent across toggles.

use crate::grid::Grid;
use crate::types::{Coord, CoverError, PointId};

/// Error raised by a constraint whose evaluation failed (as opposed to
/// a constraint that evaluated cleanly to "connection not allowed").
///
/// The engine converts this into a validation failure of the offending
/// constraint; it never crosses the engine boundary.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ConstraintError(String);

impl ConstraintError {
    /// Create a new evaluation error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A named, independently toggleable predicate over a proposed
/// connection.
///
/// Implementations that track realized connection state override the
/// observer hooks; the defaults are no-ops for stateless predicates.
pub trait Constraint {
    /// Unique registration name for this constraint.
    fn name(&self) -> &'static str;

    /// Human-readable description of what this constraint validates.
    fn description(&self) -> String;

    /// Whether a connection between `a` and `b` is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] when the predicate itself cannot be
    /// evaluated. The engine treats that as a failure of this
    /// constraint.
    fn check(&self, grid: &Grid, a: PointId, b: PointId) -> Result<bool, ConstraintError>;

    /// A connection between `a` and `b` was realized.
    fn on_connect(&mut self, a: Coord, b: Coord) {
        let _ = (a, b);
    }

    /// The connection between `a` and `b` was removed.
    fn on_disconnect(&mut self, a: Coord, b: Coord) {
        let _ = (a, b);
    }

    /// All connections were cleared; drop any tracked state.
    fn on_reset(&mut self) {}
}

/// Outcome of one full constraint pass over a proposed connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Every enabled constraint passed.
    Pass,
    /// An enabled constraint rejected the connection (or failed to
    /// evaluate). Evaluation stopped there.
    Fail {
        /// Name of the first failing constraint.
        constraint: &'static str,
        /// Human-readable failure reason.
        reason: String,
    },
}

impl ValidationResult {
    /// Whether the connection passed every enabled constraint.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Name of the failing constraint, if any.
    #[must_use]
    pub const fn failed_constraint(&self) -> Option<&'static str> {
        match self {
            Self::Pass => None,
            Self::Fail { constraint, .. } => Some(constraint),
        }
    }

    /// Failure reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Fail { reason, .. } => Some(reason),
        }
    }
}

/// Display row for one registered constraint.
#[derive(Debug, Clone)]
pub struct ConstraintStatus {
    /// Registration name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: String,
    /// Whether the constraint is currently enabled.
    pub enabled: bool,
}

struct Entry {
    enabled: bool,
    constraint: Box<dyn Constraint>,
}

/// Ordered engine over zero or more connection constraints.
///
/// Constraints are evaluated in registration order. Enable/disable
/// state lives here, not on the constraints themselves: a constraint is
/// a pure predicate, and the engine owns its participation.
#[derive(Default)]
pub struct ConstraintSet {
    entries: Vec<Entry>,
}

impl ConstraintSet {
    /// Create an empty constraint set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a constraint.
    ///
    /// # Errors
    ///
    /// Returns [`CoverError::DuplicateConstraint`] if a constraint with
    /// the same name is already registered.
    pub fn add(&mut self, constraint: Box<dyn Constraint>, enabled: bool) -> Result<(), CoverError> {
        if self.position(constraint.name()).is_some() {
            return Err(CoverError::DuplicateConstraint(
                constraint.name().to_string(),
            ));
        }
        self.entries.push(Entry {
            enabled,
            constraint,
        });
        Ok(())
    }

    /// Remove a constraint by name. Returns `false` if absent.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Enable a constraint by name. Returns `false` if absent.
    pub fn enable(&mut self, name: &str) -> bool {
        self.set_enabled(name, true)
    }

    /// Disable a constraint by name. Returns `false` if absent.
    pub fn disable(&mut self, name: &str) -> bool {
        self.set_enabled(name, false)
    }

    /// Whether the named constraint exists and is enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.position(name)
            .is_some_and(|idx| self.entries[idx].enabled)
    }

    /// Total number of registered constraints.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no constraints are registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of currently enabled constraints.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        self.entries.iter().filter(|e| e.enabled).count()
    }

    /// Registration names, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.constraint.name()).collect()
    }

    /// Name, description, and enabled flag for every registered
    /// constraint, in registration order. For presentation layers.
    #[must_use]
    pub fn statuses(&self) -> Vec<ConstraintStatus> {
        self.entries
            .iter()
            .map(|e| ConstraintStatus {
                name: e.constraint.name(),
                description: e.constraint.description(),
                enabled: e.enabled,
            })
            .collect()
    }

    /// Validate a proposed connection against every enabled constraint,
    /// in registration order, stopping at the first failure.
    ///
    /// An evaluation error counts as a failure of that constraint; the
    /// error never propagates past the engine.
    #[must_use]
    pub fn validate(&self, grid: &Grid, a: PointId, b: PointId) -> ValidationResult {
        for entry in &self.entries {
            if !entry.enabled {
                continue;
            }
            match entry.constraint.check(grid, a, b) {
                Ok(true) => {}
                Ok(false) => {
                    return ValidationResult::Fail {
                        constraint: entry.constraint.name(),
                        reason: format!(
                            "connection violates {}",
                            entry.constraint.description()
                        ),
                    };
                }
                Err(err) => {
                    return ValidationResult::Fail {
                        constraint: entry.constraint.name(),
                        reason: format!("constraint evaluation error: {err}"),
                    };
                }
            }
        }
        ValidationResult::Pass
    }

    /// Boolean-only validation with the same semantics as
    /// [`validate`](Self::validate). Hot path: no failure reasons are
    /// allocated.
    #[must_use]
    pub fn validate_fast(&self, grid: &Grid, a: PointId, b: PointId) -> bool {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .all(|e| e.constraint.check(grid, a, b).unwrap_or(false))
    }

    /// Notify every constraint (enabled or not) that a connection was
    /// realized.
    pub fn notify_connected(&mut self, a: Coord, b: Coord) {
        for entry in &mut self.entries {
            entry.constraint.on_connect(a, b);
        }
    }

    /// Notify every constraint that a connection was removed.
    pub fn notify_disconnected(&mut self, a: Coord, b: Coord) {
        for entry in &mut self.entries {
            entry.constraint.on_disconnect(a, b);
        }
    }

    /// Notify every constraint that all connections were cleared.
    pub fn notify_reset(&mut self) {
        for entry in &mut self.entries {
            entry.constraint.on_reset();
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.constraint.name() == name)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.entries[idx].enabled = enabled;
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintSet")
            .field("total", &self.len())
            .field("enabled", &self.enabled_count())
            .finish()
    }
}
