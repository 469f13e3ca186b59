use serde::{Deserialize, Serialize};

use crate::aliases::{AliasCache, AliasResolver, FileAliasSource, StaticAliasSource};
use crate::config::EngineConfig;
use crate::layout::LayoutItem;
use crate::normalize::{FieldNormalizer, NormalizedFieldSet, NormalizerOptions};
use crate::score::{required_coverage, ComplianceResult, ComplianceScorer, RequiredCoverage};
use crate::specs::{check_specs, FileSpecSource, Issue, SpecMatcher, SpecSource, StaticSpecSource};

/// Everything produced for one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub doc_type: String,
    pub fields: NormalizedFieldSet,
    pub issues: Vec<Issue>,
    pub compliance: ComplianceResult,
    pub required: RequiredCoverage,
}

/// Normalization, spec matching and scoring wired together.
pub struct Engine {
    resolver: AliasResolver,
    specs: Box<dyn SpecSource>,
    normalizer: NormalizerOptions,
    scorer: ComplianceScorer,
}

impl Engine {
    pub fn new(
        resolver: AliasResolver,
        specs: Box<dyn SpecSource>,
        normalizer: NormalizerOptions,
        scorer: ComplianceScorer,
    ) -> Self {
        Self { resolver, specs, normalizer, scorer }
    }

    /// Build from config; absent catalog files mean defaults and no specs.
    pub fn from_config(cfg: &EngineConfig) -> Self {
        let cache = AliasCache::new(cfg.aliases.ttl());
        let resolver = match &cfg.aliases.path {
            Some(p) => AliasResolver::new(Box::new(FileAliasSource::new(p)), cache),
            None => AliasResolver::new(Box::new(StaticAliasSource::default()), cache),
        };
        let specs: Box<dyn SpecSource> = match &cfg.specs.path {
            Some(p) => Box::new(FileSpecSource::new(p)),
            None => Box::new(StaticSpecSource::default()),
        };
        Self::new(resolver, specs, cfg.normalizer, ComplianceScorer::new(cfg.scoring.clone()))
    }

    pub fn resolver(&self) -> &AliasResolver {
        &self.resolver
    }

    pub fn scorer(&self) -> &ComplianceScorer {
        &self.scorer
    }

    pub fn normalize(&self, items: &[LayoutItem], doc_type: Option<&str>) -> NormalizedFieldSet {
        FieldNormalizer::new(&self.resolver, self.normalizer).normalize(items, doc_type)
    }

    pub fn validate_document(&self, doc_type: &str, items: &[LayoutItem]) -> ValidationReport {
        let fields = self.normalize(items, Some(doc_type));
        let specs = SpecMatcher::new(&*self.specs).load(doc_type);
        let issues = check_specs(&specs, &fields);
        let compliance = self.scorer.score(&fields);
        let required = required_coverage(&specs, &fields);
        ValidationReport { doc_type: doc_type.to_string(), fields, issues, compliance, required }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
