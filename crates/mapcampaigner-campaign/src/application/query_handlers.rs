//! Query handlers for the campaign context.
//!
//! There is no index: every query walks all stored documents and re-loads
//! each one. Scans are not isolated from concurrent writers, so a campaign
//! created or removed mid-scan may or may not be seen.

use mapcampaigner_core::error::DomainError;
use mapcampaigner_core::repository::DocumentRepository;
use tracing::{debug, instrument, warn};

use crate::domain::aggregates::Campaign;
use crate::domain::filters::CampaignFilters;
use crate::domain::geometry::{BoundingBox, BufferCircle, parse_coordinate};

/// Radius of the proximity buffer, in raw coordinate units (degrees).
pub const NEAREST_RADIUS: f64 = 3.0;

/// Retrieves a campaign by its identifier.
///
/// # Errors
///
/// Returns `DomainError::DoesNotExist` if no document is stored under `id`,
/// or the load errors of [`Campaign::load`].
pub fn get_campaign(id: &str, repo: &dyn DocumentRepository) -> Result<Campaign, DomainError> {
    Campaign::load(id, repo)
}

/// Lists every campaign passing `filters`, sorted by ascending name.
/// Campaigns with equal names keep scan order.
///
/// # Errors
///
/// Returns the first load error other than `DoesNotExist`; a single
/// corrupted document aborts the listing.
#[instrument(skip_all, fields(filters = ?filters))]
pub fn list_campaigns(
    filters: &CampaignFilters,
    repo: &dyn DocumentRepository,
) -> Result<Vec<Campaign>, DomainError> {
    let mut campaigns: Vec<Campaign> = Vec::new();
    scan(repo, |campaign| {
        if admits(filters, &campaign)? {
            let position = campaigns.partition_point(|listed| listed.name() <= campaign.name());
            campaigns.insert(position, campaign);
        }
        Ok(())
    })?;
    debug!(count = campaigns.len(), "listed campaigns");
    Ok(campaigns)
}

/// Lists the campaigns whose region lies inside a buffer circle of
/// [`NEAREST_RADIUS`] around `coordinate` (`"lat,lon"`), in scan order.
/// Campaigns without a region never match.
///
/// # Errors
///
/// Returns `DomainError::InvalidCoordinate` for a malformed coordinate,
/// `DomainError::InvalidGeometry` for a campaign with a malformed region,
/// and the first load error other than `DoesNotExist`.
#[instrument(skip_all, fields(coordinate = %coordinate, filters = ?filters))]
pub fn nearest_campaigns(
    coordinate: &str,
    filters: &CampaignFilters,
    repo: &dyn DocumentRepository,
) -> Result<Vec<Campaign>, DomainError> {
    let circle = BufferCircle::new(parse_coordinate(coordinate)?, NEAREST_RADIUS);
    let mut campaigns = Vec::new();
    scan(repo, |campaign| {
        let ring = campaign.corrected_coordinates()?;
        if circle.contains_ring(&ring) && admits(filters, &campaign)? {
            campaigns.push(campaign);
        }
        Ok(())
    })?;
    debug!(count = campaigns.len(), "found nearest campaigns");
    Ok(campaigns)
}

/// Bounding box of a stored campaign's region in `[lat, lon]` order.
///
/// # Errors
///
/// Returns the load errors of [`Campaign::load`], or
/// `DomainError::InvalidGeometry` for a malformed region.
pub fn campaign_bounding_box(
    id: &str,
    repo: &dyn DocumentRepository,
) -> Result<Option<BoundingBox>, DomainError> {
    Campaign::load(id, repo)?.bounding_box()
}

/// Loads every stored campaign in identifier order and hands it to `visit`.
/// Documents that vanish between listing and loading are skipped.
fn scan(
    repo: &dyn DocumentRepository,
    mut visit: impl FnMut(Campaign) -> Result<(), DomainError>,
) -> Result<(), DomainError> {
    for id in repo.list_ids()? {
        match Campaign::load(&id, repo) {
            Ok(campaign) => visit(campaign)?,
            Err(DomainError::DoesNotExist(_)) => {
                debug!(campaign_id = %id, "campaign vanished during scan");
            }
            Err(e) => {
                warn!(campaign_id = %id, error = %e, "campaign scan aborted");
                return Err(e);
            }
        }
    }
    Ok(())
}

fn admits(filters: &CampaignFilters, campaign: &Campaign) -> Result<bool, DomainError> {
    if filters.is_empty() {
        return Ok(true);
    }
    Ok(filters.matches(&campaign.attributes()?))
}
