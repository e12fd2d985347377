//! The step contract
//!
//! A comparison is a pipeline of steps. At every node the validator offers
//! the comparands to each step in turn until one of them finishes the node.

use super::comparands::Comparands;
use super::context::EquivalencyContext;
use super::validator::EquivalencyValidator;
use crate::errors::Result;
use crate::scope::AssertionScope;

/// What a step did with a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquivalencyResult {
    /// Not handled here; offer the node to the next step
    ContinueWithNext,
    /// Handled; any mismatch has been recorded on the scope
    AssertionCompleted,
    /// Handled and known to be equivalent without further work
    EquivalencyProven,
}

impl EquivalencyResult {
    pub fn is_done(self) -> bool {
        !matches!(self, EquivalencyResult::ContinueWithNext)
    }
}

/// One stage of the comparison pipeline.
///
/// Implementations must not raise mismatches as errors: mismatches are
/// recorded on the `scope`. Errors are reserved for misuse that makes the
/// comparison meaningless (for example a record with no selected members).
pub trait EquivalencyStep: Send + Sync {
    /// Name shown in the configuration listing and in traces
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether this step wants to look at the node at all
    fn can_handle(&self, comparands: &Comparands, context: &EquivalencyContext<'_>) -> bool;

    /// Compare one node
    ///
    /// # Arguments
    /// * `validator` - used to recurse into child nodes
    /// * `scope` - where failures are recorded
    ///
    /// # Errors
    ///
    /// Returns an error only for misuse; see the trait docs.
    fn handle(
        &self,
        comparands: &Comparands,
        context: &EquivalencyContext<'_>,
        validator: &EquivalencyValidator,
        scope: &mut AssertionScope,
    ) -> Result<EquivalencyResult>;
}
