//! Domain orchestration: validation, per-domain categorization, and
//! assembly of the final result.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assign::{assign_and_rank, CategoryBuckets};
use crate::error::{Error, Result};
use crate::matrix::build_matrix;
use crate::metric::Metric;
use crate::model::EmbeddingModel;
use crate::observer::{PhaseEvent, RunObserver};

/// Shared cancellation flag. Cloning hands out another handle to the same
/// flag; any holder may cancel. The run checks it between domains and
/// between response rows and aborts with [`Error::Cancelled`], yielding no
/// partial result.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One domain's category vocabulary: a lowercase name and its ordered,
/// duplicate-free category labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub categories: Vec<String>,
}

impl Domain {
    pub fn new(name: impl Into<String>, categories: Vec<String>) -> Self {
        Domain {
            name: name.into(),
            categories,
        }
    }
}

/// Final nested structure: domain → category → ordered scored responses.
/// Serializes directly to the JSON document downstream tools consume.
pub type CategorizationResult = BTreeMap<String, CategoryBuckets>;

/// The categorization engine: owns the run configuration and sequences
/// matrix construction and assignment across domains.
pub struct Categorizer<'a> {
    model: &'a dyn EmbeddingModel,
    metric: Metric,
    cancel: Option<CancelFlag>,
    observers: Vec<Box<dyn RunObserver + 'a>>,
}

impl<'a> Categorizer<'a> {
    /// A categorizer over a loaded model with the default distance metric.
    pub fn new(model: &'a dyn EmbeddingModel) -> Self {
        Categorizer {
            model,
            metric: Metric::default(),
            cancel: None,
            observers: Vec::new(),
        }
    }

    /// Selects the metric for every matrix cell of this run.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Installs a cancellation flag checked between domains and rows.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Registers an observer for phase timings and the finished result.
    pub fn with_observer(mut self, observer: Box<dyn RunObserver + 'a>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Categorizes every domain's responses against its category
    /// vocabulary.
    ///
    /// Domains are processed in declared order. Configuration mismatches
    /// between `domains` and `responses` fail fast before any matrix work;
    /// the caller receives either a complete result or an error, never a
    /// partial result.
    pub fn categorize(
        &mut self,
        domains: &[Domain],
        responses: &HashMap<String, Vec<String>>,
    ) -> Result<CategorizationResult> {
        validate_configuration(domains, responses)?;

        let mut results = CategorizationResult::new();

        for domain in domains {
            if let Some(cancel) = &self.cancel {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
            }

            info!(domain = %domain.name, "categorizing domain");
            let domain_responses = &responses[&domain.name];

            let started = Instant::now();
            let build = build_matrix(
                domain_responses,
                &domain.categories,
                self.model,
                self.metric,
                self.cancel.as_ref(),
            )?;
            self.notify_phase(&PhaseEvent {
                domain: Some(&domain.name),
                phase: "similarity matrix populated",
                elapsed: started.elapsed(),
            })?;

            let started = Instant::now();
            let buckets =
                assign_and_rank(&build.matrix, &build.retained, &domain.categories, self.metric);
            self.notify_phase(&PhaseEvent {
                domain: Some(&domain.name),
                phase: "responses assigned and ranked",
                elapsed: started.elapsed(),
            })?;

            results.insert(domain.name.clone(), buckets);
        }

        for observer in &mut self.observers {
            observer.run_completed(&results)?;
        }

        Ok(results)
    }

    fn notify_phase(&mut self, event: &PhaseEvent<'_>) -> Result<()> {
        for observer in &mut self.observers {
            observer.phase_completed(event)?;
        }
        Ok(())
    }
}

/// Rejects caller contract violations before any matrix work: the category
/// vocabulary and the response mapping must cover exactly the same domains,
/// domain names must be pre-lowercased and unique, and every category list
/// must be non-empty and free of duplicate labels.
fn validate_configuration(
    domains: &[Domain],
    responses: &HashMap<String, Vec<String>>,
) -> Result<()> {
    let mut declared = HashSet::new();

    for domain in domains {
        if domain.name != domain.name.to_lowercase() {
            return Err(Error::mismatch(format!(
                "domain name {:?} is not lowercase",
                domain.name
            )));
        }
        if !declared.insert(domain.name.as_str()) {
            return Err(Error::mismatch(format!(
                "domain {:?} is declared more than once",
                domain.name
            )));
        }
        if domain.categories.is_empty() {
            return Err(Error::mismatch(format!(
                "domain {:?} declares no categories",
                domain.name
            )));
        }

        let mut labels = HashSet::new();
        for category in &domain.categories {
            if !labels.insert(category.as_str()) {
                return Err(Error::mismatch(format!(
                    "domain {:?} declares category {:?} more than once",
                    domain.name, category
                )));
            }
        }

        if !responses.contains_key(&domain.name) {
            return Err(Error::mismatch(format!(
                "domain {:?} has categories but no responses entry",
                domain.name
            )));
        }
    }

    for name in responses.keys() {
        if !declared.contains(name.as_str()) {
            return Err(Error::mismatch(format!(
                "domain {:?} has responses but no category vocabulary",
                name
            )));
        }
    }

    Ok(())
}
