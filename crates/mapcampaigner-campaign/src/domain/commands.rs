//! Commands for the campaign context.

use mapcampaigner_core::command::Command;
use uuid::Uuid;

use super::record::Attributes;

/// Command to create a campaign from submitted attributes.
#[derive(Debug, Clone)]
pub struct CreateCampaign {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Initial attributes; `uuid` and `name` are required.
    pub attributes: Attributes,
    /// The uploader creating the campaign.
    pub uploader: String,
}

impl Command for CreateCampaign {
    fn command_type(&self) -> &'static str {
        "campaign.create_campaign"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to assign attributes onto an existing campaign.
#[derive(Debug, Clone)]
pub struct UpdateCampaign {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The campaign identifier.
    pub campaign_id: String,
    /// Attributes to assign.
    pub attributes: Attributes,
    /// The uploader making the change.
    pub uploader: String,
}

impl Command for UpdateCampaign {
    fn command_type(&self) -> &'static str {
        "campaign.update_campaign"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
