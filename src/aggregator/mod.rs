//! Aggregation layer.
//!
//! This module merges per-module results into one verdict:
//! - Holds the static module registry
//! - Runs independent modules, in parallel when enabled
//! - Applies the channel adjuster once every other result is in
//! - Combines scores, flags and evidence
//!
//! `evaluate_all` never fails. Modules that cannot evaluate, panic, or return
//! an out-of-range score are recorded in the verdict's module reports instead.

pub mod combine;
pub mod error;
pub mod verdict;

pub use combine::{Combiner, union_flags};
pub use error::RegistryError;
pub use verdict::{ModuleReport, ModuleStatus, RiskLevel, Verdict};

use crate::config::Config;
use crate::context::AnalysisContext;
use crate::signal::{
    ChannelAdjuster, ContentModule, DynSignalModule, HeaderModule, ModuleResult, ModuleResults,
    SignalModule, Unevaluable, UrlModule, builtin_modules,
};
use crate::types::ModuleId;
use rayon::prelude::*;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Runs the registered signal modules and the channel adjuster.
pub struct Aggregator {
    modules: Vec<Box<dyn DynSignalModule>>,
    adjuster: ChannelAdjuster,
    combiner: Combiner,
    parallel: bool,
}

impl Aggregator {
    /// An aggregator with no signal modules; only the channel adjuster runs.
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            adjuster: ChannelAdjuster::new(),
            combiner: Combiner::default(),
            parallel: true,
        }
    }

    /// An aggregator with the built-in url, header and content modules.
    pub fn builtin() -> Self {
        Self {
            modules: builtin_modules(),
            ..Self::new()
        }
    }

    /// Build the registry and policy described by a configuration.
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let mut aggregator = Self::new()
            .with_combiner(config.aggregator.combiner)
            .with_parallel(config.aggregator.parallel);

        let url = UrlModule::new().with_extra_shorteners(&config.url.extra_shorteners);
        let candidates: Vec<Box<dyn DynSignalModule>> = vec![
            Box::new(url),
            Box::new(HeaderModule::new()),
            Box::new(ContentModule::new()),
        ];

        for module in candidates {
            if config.is_module_disabled(module.id()) {
                debug!(module = %module.id(), "Module disabled by configuration");
                continue;
            }
            aggregator.register_boxed(module)?;
        }

        Ok(aggregator)
    }

    pub fn with_combiner(mut self, combiner: Combiner) -> Self {
        self.combiner = combiner;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn combiner(&self) -> Combiner {
        self.combiner
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Register a typed signal module.
    pub fn register<M>(&mut self, module: M) -> Result<(), RegistryError>
    where
        M: SignalModule + 'static,
    {
        self.register_boxed(Box::new(module))
    }

    /// Register an already boxed module.
    ///
    /// Fails if the id is the reserved channel key or is already registered.
    pub fn register_boxed(&mut self, module: Box<dyn DynSignalModule>) -> Result<(), RegistryError> {
        let id = module.id();
        if id.is_reserved() {
            return Err(RegistryError::ReservedModule(id));
        }
        if self.modules.iter().any(|m| m.id() == id) {
            return Err(RegistryError::DuplicateModule(id));
        }
        debug!(module = %id, "Registered signal module");
        self.modules.push(module);
        Ok(())
    }

    /// Ids of the registered modules, in registration order.
    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules.iter().map(|m| m.id()).collect()
    }

    /// Evaluate one message with every registered module.
    pub fn evaluate_all(&self, context: &AnalysisContext) -> Verdict {
        debug!(
            channel = %context.channel(),
            modules = self.modules.len(),
            parallel = self.parallel,
            "Evaluating message"
        );

        let outcomes: Vec<(ModuleId, Result<ModuleResult, Unevaluable>)> = if self.parallel {
            self.modules
                .par_iter()
                .map(|module| (module.id(), run_guarded(module.as_ref(), context)))
                .collect()
        } else {
            self.modules
                .iter()
                .map(|module| (module.id(), run_guarded(module.as_ref(), context)))
                .collect()
        };

        // Every independent module has finished; only this thread writes the map.
        let mut results = ModuleResults::new();
        let mut reports = BTreeMap::new();
        for (id, outcome) in outcomes {
            let (result, status) = settle(id, outcome);
            reports.insert(
                id,
                ModuleReport {
                    score: result.clamped_score(),
                    status,
                },
            );
            results.insert(id, result);
        }

        let adjustment = self.adjuster.adjust(context.channel(), &results);
        reports.insert(
            ModuleId::Channel,
            ModuleReport {
                score: adjustment.clamped_score(),
                status: ModuleStatus::Evaluated,
            },
        );
        results.insert(ModuleId::Channel, adjustment);

        let verdict = Verdict::combine(results, reports, self.combiner);
        debug!(
            score = verdict.score(),
            level = %verdict.level(),
            flags = verdict.flags().len(),
            "Verdict ready"
        );
        verdict
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("modules", &self.module_ids())
            .field("adjuster", &self.adjuster)
            .field("combiner", &self.combiner)
            .field("parallel", &self.parallel)
            .finish()
    }
}

/// Run a module, turning a panic into `Unevaluable::Panicked`.
fn run_guarded(
    module: &dyn DynSignalModule,
    context: &AnalysisContext,
) -> Result<ModuleResult, Unevaluable> {
    panic::catch_unwind(AssertUnwindSafe(|| module.run(context)))
        .unwrap_or_else(|payload| Err(Unevaluable::Panicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Resolve a module outcome into the result that enters the map and its status.
fn settle(
    id: ModuleId,
    outcome: Result<ModuleResult, Unevaluable>,
) -> (ModuleResult, ModuleStatus) {
    match outcome {
        Ok(result) if result.is_in_bounds() => {
            debug!(module = %id, score = result.score, flags = result.flags.len(), "Module evaluated");
            (result, ModuleStatus::Evaluated)
        }
        Ok(mut result) => {
            let raw_score = result.score;
            result.score = i32::from(result.clamped_score());
            result.evidence.insert("clamped_from", raw_score);
            warn!(module = %id, raw_score, clamped = result.score, "Module score out of bounds");
            (result, ModuleStatus::InvariantViolation { raw_score })
        }
        Err(reason) => {
            match &reason {
                Unevaluable::Panicked(message) => {
                    warn!(module = %id, message = %message, "Module panicked")
                }
                other => debug!(module = %id, reason = %other, "Module unevaluable"),
            }
            let status = ModuleStatus::Unevaluable {
                kind: reason.kind(),
                reason: reason.to_string(),
            };
            (ModuleResult::unevaluable(&reason), status)
        }
    }
}
