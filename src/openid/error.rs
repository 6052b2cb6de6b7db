use thiserror::Error;

/// This collection of reasons explains why an OpenID response was not accepted as a Google email
/// assertion. Every variant corresponds to one failed validation step; only the first failure is
/// ever reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// This reason is returned when there is not exactly one parameter whose value is the AX
    /// email schema URI.
    #[error("Expected exactly one AX email type declaration, found {found}.")]
    EmailTypeCount {
        /// The number of parameters that declared the AX email type.
        found: usize,
    },
    /// This reason is returned when the email type declaration is not of the form
    /// `openid.<namespace>.type.<typename>`.
    #[error("Malformed AX type declaration key: {key}")]
    MalformedTypeKey {
        /// The offending parameter key.
        key: String,
    },
    /// This reason is returned when the attribute value is missing or is not a valid email
    /// address.
    #[error("Missing or invalid email address at {key}")]
    InvalidEmail {
        /// The key that was expected to hold the email address.
        key: String,
    },
    /// This reason is returned when the namespace alias is not registered as AX version 1.0.
    #[error("Namespace {namespace} is not registered as AX 1.0.")]
    NamespaceMismatch {
        /// The namespace alias of the email type declaration.
        namespace: String,
    },
    /// This reason is returned when a required field is not covered by the signature.
    #[error("Required field {field} is not signed.")]
    Unsigned {
        /// The missing signed-fields token.
        field: String,
    },
    /// This reason is returned when the response was not issued by Google's OpenID endpoint.
    #[error("Unexpected OpenID provider endpoint: {endpoint:?}")]
    EndpointMismatch {
        /// The value of `openid.op_endpoint`, if present.
        endpoint: Option<String>,
    },
    /// This reason is returned when the claimed identifier is not a Google account identifier.
    #[error("Claimed identifier is not a Google account: {claimed_id:?}")]
    ClaimedIdMismatch {
        /// The value of `openid.claimed_id`, if present.
        claimed_id: Option<String>,
    },
}
