//! This crate contains the validation logic for bridging Google's legacy OpenID 2.0 provider into
//! email-based identity assertions.
//!
//! The [`openid`] module decides whether the parameters of an OpenID indirect response,
//! carrying an Attribute Exchange (AX) email attribute, are internally consistent and sufficiently
//! signed to be trusted as an assertion of a Gmail address. The [`email`] module contains the
//! email syntax checker that is used for the asserted address.
//!
//! HTTP handling, OpenID discovery, association and nonce handling, and cryptographic signature
//! verification are out of scope.

pub mod email;

pub mod openid;
pub use openid::{validate, verify, AssertionValidator, EmailAssertion, OpenIDParameters, RejectionReason};
