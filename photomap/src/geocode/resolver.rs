//! Cached country resolution.
//!
//! Lookup order for a coordinate:
//!
//! 1. exact coordinate cache, with no cache mutation on a hit;
//! 2. trusted grid cell, optionally copied into the coordinate cache;
//! 3. the geocoding authority, whose answer always lands in the coordinate
//!    cache and, when grid learning is trusted, in the grid;
//! 4. otherwise the unresolved code. The marker is still kept.

use tracing::{debug, warn};

use super::types::{CountryCode, GeocodingAuthority};
use crate::cache::{CoordinateCache, GridCache, LearnOutcome};
use crate::coord::Coordinate;

/// Confirmations a grid cell needs before it answers on its own.
pub const DEFAULT_GRID_MIN_CONFIRMATIONS: u32 = 2;

/// Configuration for [`CountryResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Whether authority answers are written into the grid cache.
    ///
    /// Grid learning is lossy: one wrong write misclassifies every future
    /// coordinate sharing the cell until the cell is marked ambiguous.
    pub trust_grid_learning: bool,

    /// Whether grid hits are copied into the coordinate cache.
    pub cache_grid_hits: bool,

    /// Agreeing authority answers required before a cell is trusted.
    ///
    /// `1` trusts a cell after its first answer.
    pub grid_min_confirmations: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            trust_grid_learning: true,
            cache_grid_hits: true,
            grid_min_confirmations: DEFAULT_GRID_MIN_CONFIRMATIONS,
        }
    }
}

impl ResolverConfig {
    /// Enable or disable grid learning.
    pub fn with_trust_grid_learning(mut self, trust: bool) -> Self {
        self.trust_grid_learning = trust;
        self
    }

    /// Enable or disable copying grid hits into the coordinate cache.
    pub fn with_cache_grid_hits(mut self, cache: bool) -> Self {
        self.cache_grid_hits = cache;
        self
    }

    /// Set the confirmations required to trust a cell (at least 1).
    pub fn with_grid_min_confirmations(mut self, confirmations: u32) -> Self {
        self.grid_min_confirmations = confirmations.max(1);
        self
    }
}

/// Where a resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Exact coordinate cache hit.
    CoordinateCache,
    /// Trusted grid cell.
    Grid,
    /// Fresh authority answer (possibly "no country").
    Authority,
    /// The authority failed; the code is the unresolved placeholder.
    Unavailable,
}

/// Country assigned to one coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved code, or the unresolved placeholder.
    pub code: CountryCode,
    /// Display name, only known when the authority answered.
    pub name: Option<String>,
    /// Which tier answered.
    pub source: ResolutionSource,
}

impl Resolution {
    fn cached(code: CountryCode, source: ResolutionSource) -> Self {
        Self {
            code,
            name: None,
            source,
        }
    }

    /// Returns true if no country was assigned.
    pub fn is_unresolved(&self) -> bool {
        self.code.is_unresolved()
    }
}

/// Counters for one resolver's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub coordinate_hits: usize,
    pub grid_hits: usize,
    pub authority_lookups: usize,
    /// Authority answers placing the point in no country.
    pub no_country: usize,
    /// Lookups that failed after all retries.
    pub authority_failures: usize,
    pub grid_cells_learned: usize,
    pub grid_cells_marked_ambiguous: usize,
}

/// Resolves coordinates to countries through the two cache tiers.
pub struct CountryResolver<A> {
    authority: A,
    config: ResolverConfig,
    stats: ResolverStats,
}

impl<A: GeocodingAuthority> CountryResolver<A> {
    /// Create a resolver over `authority`.
    pub fn new(authority: A, config: ResolverConfig) -> Self {
        Self {
            authority,
            config,
            stats: ResolverStats::default(),
        }
    }

    /// Resolve `coordinate`, updating the caches in place.
    ///
    /// Never fails: an authority failure yields the unresolved code and is
    /// counted in [`ResolverStats::authority_failures`].
    pub fn resolve(
        &mut self,
        coordinate: Coordinate,
        grid: &mut GridCache,
        coordinates: &mut CoordinateCache,
    ) -> Resolution {
        if let Some(code) = coordinates.get(&coordinate) {
            self.stats.coordinate_hits += 1;
            return Resolution::cached(code.clone(), ResolutionSource::CoordinateCache);
        }

        let trusted = grid
            .classify(&coordinate)
            .and_then(|c| c.trusted_country(self.config.grid_min_confirmations))
            .cloned();
        if let Some(code) = trusted {
            self.stats.grid_hits += 1;
            if self.config.cache_grid_hits {
                coordinates.insert(coordinate, code.clone());
            }
            return Resolution::cached(code, ResolutionSource::Grid);
        }

        self.stats.authority_lookups += 1;
        match self.authority.lookup(coordinate) {
            Ok(Some(country)) if !country.code.is_unresolved() => {
                coordinates.insert(coordinate, country.code.clone());
                if self.config.trust_grid_learning {
                    match grid.learn(&coordinate, &country.code) {
                        LearnOutcome::Created => self.stats.grid_cells_learned += 1,
                        LearnOutcome::MarkedAmbiguous => {
                            self.stats.grid_cells_marked_ambiguous += 1
                        }
                        _ => {}
                    }
                }
                debug!(
                    %coordinate,
                    country = %country.code,
                    name = %country.name,
                    "Resolved by authority"
                );
                let name = (!country.name.is_empty()).then_some(country.name);
                Resolution {
                    code: country.code,
                    name,
                    source: ResolutionSource::Authority,
                }
            }
            Ok(_) => {
                self.stats.no_country += 1;
                coordinates.insert(coordinate, CountryCode::unresolved());
                debug!(%coordinate, "Authority places coordinate in no country");
                Resolution::cached(CountryCode::unresolved(), ResolutionSource::Authority)
            }
            Err(e) => {
                self.stats.authority_failures += 1;
                warn!(
                    %coordinate,
                    authority = self.authority.name(),
                    error = %e,
                    "Geocoding unavailable, keeping marker unresolved"
                );
                Resolution::cached(CountryCode::unresolved(), ResolutionSource::Unavailable)
            }
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// The active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The underlying authority.
    pub fn authority(&self) -> &A {
        &self.authority
    }
}
