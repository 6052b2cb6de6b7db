//! This module contains the validator for OpenID 2.0 Attribute Exchange responses from Google's
//! (legacy) OpenID provider.
//!
//! A response is accepted as an email assertion only if it carries exactly one AX email attribute
//! under a namespace registered as AX 1.0, the attribute value is a valid email address, the
//! response was issued by Google's fixed endpoint for a Google claimed identifier, and all of
//! these fields are listed in `openid.signed`.
//!
//! Signature verification itself, nonce and association handling, and discovery are not done
//! here. The caller is responsible for checking `openid.sig` against the signed fields.
//!
//! ```
//! use gmail_openid_bridge::openid::{self, OpenIDParameters};
//!
//! let params: OpenIDParameters = [
//!     ("openid.ns.ext1", "http://openid.net/srv/ax/1.0"),
//!     ("openid.ext1.type.email", "http://axschema.org/contact/email"),
//!     ("openid.ext1.value.email", "alice@gmail.com"),
//!     ("openid.signed", "ns.ext1,ext1.type.email,ext1.value.email,op_endpoint,claimed_id"),
//!     ("openid.op_endpoint", "https://www.google.com/accounts/o8/ud"),
//!     ("openid.claimed_id", "https://www.google.com/accounts/o8/id?id=abc"),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert!(openid::validate(&params));
//! assert_eq!(openid::verify(&params).unwrap().email(), "alice@gmail.com");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::email::{EmailSyntax, SimpleEmailSyntax};

mod error;
pub use error::RejectionReason;

mod parameters;
pub use parameters::{AxAttribute, OpenIDParameters, SignedFields};

/// This is the Attribute Exchange type URI for email addresses.
pub const AX_EMAIL_SCHEMA: &str = "http://axschema.org/contact/email";

/// This is the namespace URI of Attribute Exchange version 1.0. Other versions are not trusted.
pub const AX_NAMESPACE_1_0: &str = "http://openid.net/srv/ax/1.0";

/// This is the OpenID provider endpoint of Google accounts.
pub const GOOGLE_OP_ENDPOINT: &str = "https://www.google.com/accounts/o8/ud";

/// Claimed identifiers issued by Google start with this pattern. Only the start is anchored.
pub const GOOGLE_CLAIMED_ID_PREFIX: &str = r"^https://www\.google\.com/accounts/o8/id";

static GOOGLE_CLAIMED_ID: Lazy<Regex> = Lazy::new(|| Regex::new(GOOGLE_CLAIMED_ID_PREFIX).unwrap());

const OP_ENDPOINT_KEY: &str = "openid.op_endpoint";
const CLAIMED_ID_KEY: &str = "openid.claimed_id";

const SIGNED_OP_ENDPOINT: &str = "op_endpoint";
const SIGNED_CLAIMED_ID: &str = "claimed_id";

/// This struct contains the identity that a validated response asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAssertion {
    email: String,
    claimed_id: String,
    attribute: AxAttribute,
}

impl EmailAssertion {
    /// The asserted email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The Google claimed identifier the email address belongs to.
    pub fn claimed_id(&self) -> &str {
        &self.claimed_id
    }

    /// The AX attribute the email address was read from.
    pub fn attribute(&self) -> &AxAttribute {
        &self.attribute
    }
}

/// This validator checks OpenID responses against Google's provider. Only the email syntax checker
/// can be replaced; all trust anchors are fixed.
///
/// ```
/// use gmail_openid_bridge::openid::{AssertionValidator, OpenIDParameters};
///
/// let validator = AssertionValidator::new().with_email_syntax(|email: &str| email.ends_with("@gmail.com"));
///
/// assert!(!validator.validate(&OpenIDParameters::default()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AssertionValidator<E = SimpleEmailSyntax> {
    email_syntax: E,
}

impl AssertionValidator {
    /// This method creates a validator that uses the default email syntax checker.
    pub fn new() -> Self {
        AssertionValidator {
            email_syntax: SimpleEmailSyntax,
        }
    }
}

impl<E: EmailSyntax> AssertionValidator<E> {
    /// This method can be used to replace the email syntax checker.
    pub fn with_email_syntax<F: EmailSyntax>(self, email_syntax: F) -> AssertionValidator<F> {
        AssertionValidator { email_syntax }
    }

    /// This method returns `true` if the parameters are a trustworthy Google email assertion. It
    /// never fails; any anomaly results in `false`.
    pub fn validate(&self, params: &OpenIDParameters) -> bool {
        self.verify(params).is_ok()
    }

    /// This method performs the same checks as [`validate`](#method.validate), but returns the
    /// asserted identity on success, or the reason for the first failed check.
    pub fn verify(&self, params: &OpenIDParameters) -> Result<EmailAssertion, RejectionReason> {
        match self.check(params) {
            Ok(assertion) => {
                log::info!("Accepted email assertion for {}.", assertion.claimed_id);
                Ok(assertion)
            },
            Err(reason) => {
                log::debug!("Rejected OpenID response: {}", reason);
                Err(reason)
            },
        }
    }

    fn check(&self, params: &OpenIDParameters) -> Result<EmailAssertion, RejectionReason> {
        // there must be exactly one AX email type declaration
        let declarations = params.keys_with_value(AX_EMAIL_SCHEMA);
        let key = match declarations.as_slice() {
            [key] => *key,
            _ => {
                return Err(RejectionReason::EmailTypeCount {
                    found: declarations.len(),
                })
            },
        };

        // and it must be declared as openid.NAMESPACE.type.TYPENAME
        let attribute = AxAttribute::parse_type_key(key).ok_or_else(|| RejectionReason::MalformedTypeKey {
            key: key.to_string(),
        })?;

        // the value lives at openid.NAMESPACE.value.TYPENAME
        let value_key = attribute.value_key();
        let email = match params.get(&value_key) {
            Some(email) if self.email_syntax.is_valid(email) => email,
            _ => return Err(RejectionReason::InvalidEmail { key: value_key }),
        };

        if params.get(&attribute.ns_key()) != Some(AX_NAMESPACE_1_0) {
            return Err(RejectionReason::NamespaceMismatch {
                namespace: attribute.namespace().to_string(),
            });
        }

        // namespace, type, and value must all be signed
        let signed = params.signed_fields();
        for field in [attribute.signed_ns(), attribute.signed_value(), attribute.signed_type()] {
            require_signed(&signed, &field)?;
        }

        // this is only a Gmail bridge, so the provider is fixed
        let endpoint = params.get(OP_ENDPOINT_KEY);
        if endpoint != Some(GOOGLE_OP_ENDPOINT) {
            return Err(RejectionReason::EndpointMismatch {
                endpoint: endpoint.map(String::from),
            });
        }
        require_signed(&signed, SIGNED_OP_ENDPOINT)?;

        let claimed_id = match params.get(CLAIMED_ID_KEY) {
            Some(claimed_id) if GOOGLE_CLAIMED_ID.is_match(claimed_id) => claimed_id,
            other => {
                return Err(RejectionReason::ClaimedIdMismatch {
                    claimed_id: other.map(String::from),
                })
            },
        };
        require_signed(&signed, SIGNED_CLAIMED_ID)?;

        Ok(EmailAssertion {
            email: email.to_string(),
            claimed_id: claimed_id.to_string(),
            attribute,
        })
    }
}

fn require_signed(signed: &SignedFields, field: &str) -> Result<(), RejectionReason> {
    if signed.contains(field) {
        Ok(())
    } else {
        Err(RejectionReason::Unsigned {
            field: field.to_string(),
        })
    }
}

/// This function returns `true` if the parameters are a trustworthy Google email assertion, using
/// the default email syntax checker.
pub fn validate(params: &OpenIDParameters) -> bool {
    AssertionValidator::new().validate(params)
}

/// This function returns the asserted identity, or the reason why the parameters are not a
/// trustworthy Google email assertion, using the default email syntax checker.
pub fn verify(params: &OpenIDParameters) -> Result<EmailAssertion, RejectionReason> {
    AssertionValidator::new().verify(params)
}
