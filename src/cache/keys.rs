//! Key and TTL conventions
//!
//! Helpers for callers to build stable, namespaced keys (`entity:id`,
//! `entity:all`) and pick from a fixed set of TTL tiers. The engine itself
//! does not enforce any of this.

use std::time::Duration;

// == TTL Tiers ==
/// Named TTL classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlTier {
    /// 1 minute: run status, live metrics
    Short,
    /// 5 minutes: lists and detail views
    Medium,
    /// 15 minutes: rarely edited records
    Long,
    Hour,
    Day,
}

impl TtlTier {
    pub fn duration(self) -> Duration {
        match self {
            TtlTier::Short => Duration::from_secs(60),
            TtlTier::Medium => Duration::from_secs(300),
            TtlTier::Long => Duration::from_secs(900),
            TtlTier::Hour => Duration::from_secs(3_600),
            TtlTier::Day => Duration::from_secs(86_400),
        }
    }
}

impl From<TtlTier> for Duration {
    fn from(tier: TtlTier) -> Self {
        tier.duration()
    }
}

// == Cache Keys ==
/// Key builders for the dashboard's entities.
pub struct CacheKeys;

impl CacheKeys {
    pub fn model(id: impl std::fmt::Display) -> String {
        format!("model:{id}")
    }

    pub fn models() -> String {
        "model:all".to_string()
    }

    pub fn model_versions(id: impl std::fmt::Display) -> String {
        format!("model:{id}:versions")
    }

    pub fn experiment(id: impl std::fmt::Display) -> String {
        format!("experiment:{id}")
    }

    pub fn experiments() -> String {
        "experiment:all".to_string()
    }

    pub fn experiment_runs(id: impl std::fmt::Display) -> String {
        format!("experiment:{id}:runs")
    }

    pub fn run(id: impl std::fmt::Display) -> String {
        format!("run:{id}")
    }

    pub fn run_metrics(id: impl std::fmt::Display) -> String {
        format!("run:{id}:metrics")
    }

    pub fn pipeline(id: impl std::fmt::Display) -> String {
        format!("pipeline:{id}")
    }

    pub fn pipelines() -> String {
        "pipeline:all".to_string()
    }

    pub fn dashboard(id: impl std::fmt::Display) -> String {
        format!("dashboard:{id}")
    }

    pub fn dashboards() -> String {
        "dashboard:all".to_string()
    }

    pub fn dataset(id: impl std::fmt::Display) -> String {
        format!("dataset:{id}")
    }

    pub fn datasets() -> String {
        "dataset:all".to_string()
    }

    /// Glob matching every key of an entity namespace, e.g. `model:*`.
    pub fn namespace_pattern(entity: &str) -> String {
        format!("{entity}:*")
    }
}
