//! Acceptance checks run before a submission is queued.

use courier_common::{MAX_DELAY_SECS, SubmissionRequest, address, tracing::debug};
use thiserror::Error;

use crate::dns::Resolver;

/// Why a submission was refused. The `Display` of each variant is the
/// message handed back to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Source email address is invalid")]
    InvalidSource,

    #[error("Destination email address is invalid")]
    InvalidDestination,

    /// Not an integer, negative, or longer than [`MAX_DELAY_SECS`].
    #[error("Delay time is invalid")]
    InvalidDelay,

    #[error("Unable to find the SMTP server corresponding to the recipient address")]
    RelayNotFound,

    #[error("SMTP server doesn't exist")]
    RelayDoesNotExist,
}

/// Values derived while validating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    /// The requested relay, or the destination's MX host when none was given
    pub relay_host: String,
    pub delay_secs: u64,
}

/// Checks `request` in a fixed order and stops at the first failure.
///
/// The only side effects are the lookups made through `resolver`: an MX query
/// when no relay was given, then an address query for the relay.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub async fn validate(
    request: &SubmissionRequest,
    resolver: &dyn Resolver,
) -> Result<Validated, ValidationError> {
    if !address::is_valid(&request.source) {
        return Err(ValidationError::InvalidSource);
    }

    if !address::is_valid(&request.destination) {
        return Err(ValidationError::InvalidDestination);
    }

    let delay = request
        .delay
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidDelay)?;
    let delay_secs = u64::try_from(delay)
        .ok()
        .filter(|secs| *secs <= MAX_DELAY_SECS)
        .ok_or(ValidationError::InvalidDelay)?;

    let relay_host = if request.relay_host.is_empty() {
        let domain = address::domain_of(&request.destination);
        let host = resolver.mx_host(domain).await;
        if host.is_empty() {
            return Err(ValidationError::RelayNotFound);
        }
        host
    } else {
        request.relay_host.clone()
    };

    if !resolver.domain_exists(&relay_host).await {
        return Err(ValidationError::RelayDoesNotExist);
    }

    debug!("Accepted submission to {} via {relay_host}", request.destination);

    Ok(Validated {
        relay_host,
        delay_secs,
    })
}
