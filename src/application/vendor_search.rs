//! Vendor Search - Directory discovery use case
//!
//! Combines the vendor directory, the location resolver and the proximity
//! filter into the "vendors near me" search used by the directory pages.

use crate::application::LocationResolver;
use crate::domain::entities::Vendor;
use crate::domain::errors::ResolveError;
use crate::domain::ports::VendorRepository;
use crate::domain::services::ProximityFilter;
use crate::domain::value_objects::{Coordinate, RadiusTiers};
use crate::infrastructure::CancelHandle;
use std::sync::Arc;

/// A directory search request.
#[derive(Debug, Clone, Default)]
pub struct VendorSearchQuery {
    /// Free-text place to search around; blank means "anywhere"
    pub location: Option<String>,
    /// Restrict to one category (case-insensitive)
    pub category: Option<String>,
    /// Radius tiers for this search; the service default when None
    pub tiers: Option<RadiusTiers>,
}

impl VendorSearchQuery {
    pub fn near(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tiers(mut self, tiers: RadiusTiers) -> Self {
        self.tiers = Some(tiers);
        self
    }

    /// The location text, if it is non-blank.
    fn location_text(&self) -> Option<&str> {
        self.location.as_deref().filter(|l| !l.trim().is_empty())
    }
}

/// Result of a directory search.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorSearchOutcome {
    /// Resolved search center; None for a plain directory browse
    pub center: Option<Coordinate>,
    /// Radius that produced `vendors`; None for a plain directory browse
    pub radius_used_km: Option<u32>,
    pub vendors: Vec<Vendor>,
}

/// Vendor search service.
pub struct VendorSearchService {
    resolver: Arc<LocationResolver>,
    vendors: Arc<dyn VendorRepository>,
    default_tiers: RadiusTiers,
}

impl VendorSearchService {
    pub fn new(
        resolver: Arc<LocationResolver>,
        vendors: Arc<dyn VendorRepository>,
        default_tiers: RadiusTiers,
    ) -> Self {
        Self {
            resolver,
            vendors,
            default_tiers,
        }
    }

    pub fn resolver(&self) -> &Arc<LocationResolver> {
        &self.resolver
    }

    pub fn default_tiers(&self) -> &RadiusTiers {
        &self.default_tiers
    }

    /// Number of vendors currently listed in the directory.
    pub async fn listed_count(&self) -> usize {
        self.vendors.get_listed().await.len()
    }

    /// Version of the directory snapshot searches currently run against.
    pub async fn directory_version(&self) -> u64 {
        self.vendors.get_version().await
    }

    /// Search the directory.
    pub async fn search(
        &self,
        query: &VendorSearchQuery,
    ) -> Result<VendorSearchOutcome, ResolveError> {
        self.search_inner(query, None).await
    }

    /// Search, abandoning the geocoding step if `cancel` fires.
    pub async fn search_with_cancel(
        &self,
        query: &VendorSearchQuery,
        cancel: &CancelHandle,
    ) -> Result<VendorSearchOutcome, ResolveError> {
        self.search_inner(query, Some(cancel)).await
    }

    async fn search_inner(
        &self,
        query: &VendorSearchQuery,
        cancel: Option<&CancelHandle>,
    ) -> Result<VendorSearchOutcome, ResolveError> {
        let Some(location) = query.location_text() else {
            return Ok(VendorSearchOutcome {
                center: None,
                radius_used_km: None,
                vendors: self.listed_in_category(query).await,
            });
        };

        let center = match cancel {
            Some(cancel) => self.resolver.resolve_with_cancel(location, cancel).await?,
            None => self.resolver.resolve(location).await?,
        };

        let candidates = self.listed_in_category(query).await;
        let tiers = query.tiers.as_ref().unwrap_or(&self.default_tiers);
        let result = ProximityFilter::filter_by_proximity(&candidates, center, tiers);

        tracing::debug!(
            "search near {:?}: {} of {} vendors within {} km",
            location,
            result.matches.len(),
            candidates.len(),
            result.radius_used_km
        );

        Ok(VendorSearchOutcome {
            center: Some(center),
            radius_used_km: Some(result.radius_used_km),
            vendors: result.matches,
        })
    }

    async fn listed_in_category(&self, query: &VendorSearchQuery) -> Vec<Vendor> {
        let listed = self.vendors.get_listed().await;

        match query.category.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(category) => listed
                .into_iter()
                .filter(|v| v.in_category(category))
                .collect(),
            None => listed,
        }
    }
}
