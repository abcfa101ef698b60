//! Placement listing use-case service.
//!
//! # Responsibility
//! - Run the listing flow: range -> items -> child sections -> partitions.
//! - Serve index lookups for stub expansion.
//!
//! # Invariants
//! - Items are resolved only for the capped portion of a range.
//! - Child sections are listed for every partition anchor that survives the caps.

use crate::index::{GraphIndex, IndexError, SectionQueryService, SectionSummary};
use crate::model::item::Item;
use crate::model::placement::{Placement, ValidationError};
use crate::model::range::PlacementRange;
use crate::partition::{
    FormatOptions, PartitionBuilder, PartitionOptions, PartitionSet, SectionStub, StubExpander,
    StubQueries,
};
use crate::repo::item_repo::{ItemRepository, RepoError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from placement service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Untrusted placement or range text is malformed.
    Validation(ValidationError),
    /// Index read failed.
    Index(IndexError),
    /// Item repository failed.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Index(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Index(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<IndexError> for ServiceError {
    fn from(value: IndexError) -> Self {
        Self::Index(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Index(err) => Self::Index(err),
            other => Self::Repo(other),
        }
    }
}

/// Placement listing facade over an item repository and the graph index.
pub struct PlacementService<'a, R: ItemRepository> {
    repo: R,
    index: &'a GraphIndex,
}

impl<'a, R: ItemRepository> PlacementService<'a, R> {
    pub fn new(repo: R, index: &'a GraphIndex) -> Self {
        Self { repo, index }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Parses untrusted range text.
    pub fn resolve_range(&self, input: &str) -> Result<PlacementRange, ServiceError> {
        PlacementRange::parse(input).map_err(Into::into)
    }

    /// Builds partitions for `range` with default header labels.
    pub fn partitions(
        &self,
        range: &PlacementRange,
        options: PartitionOptions,
    ) -> Result<PartitionSet, ServiceError> {
        self.partitions_with(range, PartitionBuilder::new(options))
    }

    /// Builds partitions with a caller-supplied section header label.
    pub fn partitions_labeled(
        &self,
        range: &PlacementRange,
        options: PartitionOptions,
        label: impl Fn(&Placement) -> String,
    ) -> Result<PartitionSet, ServiceError> {
        self.partitions_with(
            range,
            PartitionBuilder::new(options).with_label_formatter(label),
        )
    }

    fn partitions_with(
        &self,
        range: &PlacementRange,
        builder: PartitionBuilder<'_>,
    ) -> Result<PartitionSet, ServiceError> {
        let started_at = Instant::now();
        let result = self.collect(range, &builder);
        match &result {
            Ok(set) => info!(
                "event=placement_query module=service status=ok shape={} partitions={} warnings={} duration_ms={}",
                range.shape(),
                set.partitions.len(),
                set.warnings.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=placement_query module=service status=error shape={} duration_ms={} error={}",
                range.shape(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn collect(
        &self,
        range: &PlacementRange,
        builder: &PartitionBuilder<'_>,
    ) -> Result<PartitionSet, ServiceError> {
        let items = match builder.effective_range(range) {
            Some(effective) => self.repo.list_by_placement(&effective)?,
            None => Vec::new(),
        };

        let mut sections = Vec::new();
        for anchor in builder.section_anchors(range) {
            sections.extend(self.list_sections(&anchor)?);
        }

        Ok(builder.build(range, items, &sections))
    }

    /// Non-empty immediate child sections of `placement`.
    pub fn list_sections(&self, placement: &Placement) -> Result<Vec<SectionSummary>, ServiceError> {
        SectionQueryService::new(self.index)
            .list_sections(placement)
            .map_err(Into::into)
    }

    /// Child sections of `placement` as stubs relative to it.
    pub fn stubs(&self, placement: &Placement) -> Result<Vec<SectionStub>, ServiceError> {
        Ok(self
            .list_sections(placement)?
            .iter()
            .map(|summary| SectionStub::from_summary(summary, placement))
            .collect())
    }

    /// Renders `stubs` up to `depth` levels deep.
    pub fn expand_stubs(
        &self,
        stubs: &[SectionStub],
        depth: usize,
        options: &FormatOptions,
        format_items: &dyn Fn(&[Item], &FormatOptions) -> Vec<String>,
        status_filter: &dyn Fn(&Item) -> bool,
    ) -> Vec<String> {
        StubExpander::new(self, options, format_items, status_filter).expand_lines(stubs, depth)
    }
}

impl<R: ItemRepository> StubQueries for PlacementService<'_, R> {
    type Error = ServiceError;

    fn items_at(&self, placement: &Placement) -> Result<Vec<Item>, Self::Error> {
        let items = self
            .repo
            .list_by_placement(&PlacementRange::single(placement.clone()))?;
        Ok(items
            .into_iter()
            .filter(|item| item.placement == *placement)
            .collect())
    }

    fn sections_at(&self, placement: &Placement) -> Result<Vec<SectionSummary>, Self::Error> {
        self.list_sections(placement)
    }
}
