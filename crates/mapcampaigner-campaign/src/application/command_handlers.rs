//! Command handlers for the campaign context.
//!
//! Each handler loads (or creates) the campaign, applies the command and
//! persists the result through the injected repository.

use mapcampaigner_core::command::Command;
use mapcampaigner_core::error::DomainError;
use mapcampaigner_core::repository::DocumentRepository;
use tracing::{info, instrument};

use crate::domain::aggregates::Campaign;
use crate::domain::commands::{CreateCampaign, UpdateCampaign};

/// Handles the `CreateCampaign` command: writes a brand-new campaign at
/// version 1.
///
/// # Errors
///
/// Returns `DomainError` if the attributes are rejected or the identifier is
/// already taken.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub fn handle_create_campaign(
    command: &CreateCampaign,
    repo: &dyn DocumentRepository,
) -> Result<Campaign, DomainError> {
    info!(
        command_type = command.command_type(),
        uploader = %command.uploader,
        "handling create_campaign command"
    );
    Campaign::create(command.attributes.clone(), &command.uploader, repo)
}

/// Handles the `UpdateCampaign` command: loads the campaign, assigns the
/// attributes and saves it as the next version.
///
/// # Errors
///
/// Returns `DomainError::DoesNotExist` if the campaign is not stored, or the
/// load/update errors of [`Campaign`].
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, campaign_id = %command.campaign_id))]
pub fn handle_update_campaign(
    command: &UpdateCampaign,
    repo: &dyn DocumentRepository,
) -> Result<Campaign, DomainError> {
    info!(
        command_type = command.command_type(),
        uploader = %command.uploader,
        "handling update_campaign command"
    );
    let mut campaign = Campaign::load(&command.campaign_id, repo)?;
    campaign.update(command.attributes.clone(), &command.uploader, repo)?;
    Ok(campaign)
}
