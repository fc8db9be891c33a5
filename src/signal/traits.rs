//! The signal module contract.

use crate::context::{AnalysisContext, ModuleInput};
use crate::signal::{ModuleResult, Unevaluable};
use crate::types::ModuleId;

/// A pure analysis of one facet of a message.
///
/// Each module declares the typed slice of [`AnalysisContext`] it reads and
/// evaluates only that slice. Implementations must return scores in
/// `0..=100` and must not rely on any other module's output.
pub trait SignalModule: Send + Sync {
    /// The context slice this module evaluates.
    type Input;

    /// Key of this module in result maps and verdicts.
    const ID: ModuleId;

    /// Pick this module's slice out of the context, if the caller supplied it.
    fn select(context: &AnalysisContext) -> Option<&ModuleInput<Self::Input>>;

    /// Evaluate the input.
    fn evaluate(&self, input: &Self::Input) -> Result<ModuleResult, Unevaluable>;
}

/// Object-safe view of a [`SignalModule`], used by the aggregator's registry.
pub trait DynSignalModule: Send + Sync {
    fn id(&self) -> ModuleId;

    /// Select this module's slice and evaluate it.
    fn run(&self, context: &AnalysisContext) -> Result<ModuleResult, Unevaluable>;
}

impl<M: SignalModule> DynSignalModule for M {
    fn id(&self) -> ModuleId {
        M::ID
    }

    fn run(&self, context: &AnalysisContext) -> Result<ModuleResult, Unevaluable> {
        let input = M::select(context).ok_or(Unevaluable::MissingInput)?;
        self.evaluate(input.decoded()?)
    }
}
