//! Contact service - contact search

use std::{fmt, sync::Arc};

use domain::{Contact, PageRequest};
use tracing::{info, instrument};

use crate::{error::ApplicationError, ports::WhatsAppGatewayPort, services::PaginationPolicy};

/// Service for looking up contacts
pub struct ContactService {
    gateway: Arc<dyn WhatsAppGatewayPort>,
    policy: PaginationPolicy,
}

impl fmt::Debug for ContactService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ContactService {
    /// Create a new contact service
    pub fn new(gateway: Arc<dyn WhatsAppGatewayPort>, policy: PaginationPolicy) -> Self {
        Self { gateway, policy }
    }

    /// Search contacts by name or phone number
    ///
    /// The provider's `name` filter only matches from the start of a name or
    /// number, so one unfiltered page is fetched and matched client-side on
    /// substrings. Results keep provider order; an empty query returns the
    /// whole page.
    #[instrument(skip(self))]
    pub async fn search_contacts(&self, query: &str) -> Result<Vec<Contact>, ApplicationError> {
        let page = self
            .gateway
            .fetch_contacts(PageRequest::first(self.policy.contacts_page_size), None)
            .await?;

        let matches: Vec<Contact> = page
            .items
            .into_iter()
            .filter(|c| c.matches_query(query))
            .collect();

        info!(count = matches.len(), "Contact search complete");
        Ok(matches)
    }
}
