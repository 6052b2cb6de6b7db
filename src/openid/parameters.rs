use std::collections::hash_map::Iter;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// Key of the comma-separated list of signed fields.
const SIGNED_KEY: &str = "openid.signed";

/// This struct contains the flat set of parameters of an OpenID 2.0 indirect response, as they were
/// received in the query string or form body of the redirect back to the relying party.
///
/// The set is immutable once constructed. If a key occurs more than once in the input, the last
/// occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct OpenIDParameters {
    params: HashMap<String, String>,
}

impl OpenIDParameters {
    /// This method collects the decoded query arguments of a redirect URL.
    pub fn from_query(url: &Url) -> Self {
        url.query_pairs().collect()
    }

    /// This method decodes an `application/x-www-form-urlencoded` request body.
    pub fn from_form(body: &str) -> Self {
        url::form_urlencoded::parse(body.as_bytes()).collect()
    }

    /// This method deserializes a flat JSON object of string values, as returned by OpenID
    /// endpoints that relay the response parameters as JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// This method returns the value for the given key, if it is present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// This method returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// This method returns `true` if no parameters are present.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// This method returns an iterator over all `(key, value)` pairs, in no particular order.
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.params.iter()
    }

    /// This method returns all keys whose value is exactly equal to `value`.
    pub fn keys_with_value(&self, value: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(_, v)| v.as_str() == value)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// This method returns the list of fields that the provider claims to have signed. A missing
    /// `openid.signed` parameter is treated like an empty list.
    pub fn signed_fields(&self) -> SignedFields<'_> {
        SignedFields::parse(self.get(SIGNED_KEY).unwrap_or_default())
    }
}

impl From<HashMap<String, String>> for OpenIDParameters {
    fn from(params: HashMap<String, String>) -> Self {
        OpenIDParameters { params }
    }
}

impl<K, V> FromIterator<(K, V)> for OpenIDParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let params = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        OpenIDParameters { params }
    }
}

impl<'a> IntoIterator for &'a OpenIDParameters {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The tokens of the `openid.signed` list, in the order the provider sent them.
///
/// Tokens are compared verbatim: they are neither trimmed nor deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedFields<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> SignedFields<'a> {
    /// This method splits a raw signed-fields value on `,`.
    pub fn parse(raw: &'a str) -> Self {
        SignedFields {
            tokens: raw.split(',').collect(),
        }
    }

    /// This method returns `true` if the exact token is part of the list.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| *t == token)
    }

    /// This method returns the tokens in their original order.
    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }
}

/// An Attribute Exchange attribute, identified by the namespace alias it was declared under and
/// its type name, as found in a key of the form `openid.<namespace>.type.<typename>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AxAttribute {
    namespace: String,
    typename: String,
}

impl AxAttribute {
    /// This method parses a type declaration key. Both segments must be non-empty and must not
    /// contain dots, so keys with extra path segments are rejected.
    pub fn parse_type_key(key: &str) -> Option<Self> {
        let rest = key.strip_prefix("openid.")?;
        let (namespace, typename) = rest.split_once(".type.")?;

        if !is_segment(namespace) || !is_segment(typename) {
            return None;
        }

        Some(AxAttribute {
            namespace: namespace.to_string(),
            typename: typename.to_string(),
        })
    }

    /// The namespace alias, e.g. `ext1`.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The attribute type name, e.g. `email`.
    pub fn typename(&self) -> &str {
        &self.typename
    }

    /// `openid.<namespace>.type.<typename>`
    pub fn type_key(&self) -> String {
        format!("openid.{}", self.signed_type())
    }

    /// `openid.<namespace>.value.<typename>`
    pub fn value_key(&self) -> String {
        format!("openid.{}", self.signed_value())
    }

    /// `openid.ns.<namespace>`
    pub fn ns_key(&self) -> String {
        format!("openid.{}", self.signed_ns())
    }

    /// Signed-fields token for the namespace registration.
    pub fn signed_ns(&self) -> String {
        format!("ns.{}", self.namespace)
    }

    /// Signed-fields token for the type declaration.
    pub fn signed_type(&self) -> String {
        format!("{}.type.{}", self.namespace, self.typename)
    }

    /// Signed-fields token for the attribute value.
    pub fn signed_value(&self) -> String {
        format!("{}.value.{}", self.namespace, self.typename)
    }
}

fn is_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_keys() {
        let attribute = AxAttribute::parse_type_key("openid.ext1.type.email").unwrap();

        assert_eq!(attribute.namespace(), "ext1");
        assert_eq!(attribute.typename(), "email");
        assert_eq!(attribute.type_key(), "openid.ext1.type.email");
        assert_eq!(attribute.value_key(), "openid.ext1.value.email");
        assert_eq!(attribute.ns_key(), "openid.ns.ext1");
        assert_eq!(attribute.signed_ns(), "ns.ext1");
        assert_eq!(attribute.signed_type(), "ext1.type.email");
        assert_eq!(attribute.signed_value(), "ext1.value.email");
    }

    #[test]
    fn rejects_malformed_type_keys() {
        for key in [
            "openid.ns1.sub.type.email",
            "openid.ext1.type.email.extra",
            "openid..type.email",
            "openid.ext1.type.",
            "ext1.type.email",
            "xopenid.ext1.type.email",
            "openid.ext1.value.email",
            "openid.type.email",
            "openid.ns.ext1",
            "",
        ] {
            assert_eq!(AxAttribute::parse_type_key(key), None, "{:?} should be rejected", key);
        }
    }

    #[test]
    fn signed_fields_are_exact() {
        let params: OpenIDParameters = [("openid.signed", "ns.ext1, op_endpoint,claimed_id,claimed_id")]
            .into_iter()
            .collect();
        let signed = params.signed_fields();

        assert!(signed.contains("ns.ext1"));
        assert!(signed.contains("claimed_id"));
        assert!(!signed.contains("op_endpoint"));
        assert!(signed.contains(" op_endpoint"));
        assert_eq!(signed.tokens().len(), 4);
    }

    #[test]
    fn missing_signed_list_is_empty() {
        let params = OpenIDParameters::default();
        let signed = params.signed_fields();

        assert_eq!(signed.tokens(), &[""]);
        assert!(!signed.contains("claimed_id"));
    }

    #[test]
    fn decodes_query_strings() {
        let url = Url::parse(
            "https://example.com/auth/return?openid.ns.ext1=http%3A%2F%2Fopenid.net%2Fsrv%2Fax%2F1.0\
             &openid.ext1.value.email=alice%40gmail.com&openid.mode=id_res&openid.mode=cancel",
        )
        .unwrap();
        let params = OpenIDParameters::from_query(&url);

        assert_eq!(params.len(), 3);
        assert_eq!(params.get("openid.ns.ext1"), Some("http://openid.net/srv/ax/1.0"));
        assert_eq!(params.get("openid.ext1.value.email"), Some("alice@gmail.com"));
        assert_eq!(params.get("openid.mode"), Some("cancel"));
    }

    #[test]
    fn decodes_form_bodies() {
        let params = OpenIDParameters::from_form("openid.signed=ns.ext1%2Cclaimed_id&openid.claimed_id=a+b");

        assert_eq!(params.get("openid.signed"), Some("ns.ext1,claimed_id"));
        assert_eq!(params.get("openid.claimed_id"), Some("a b"));
        assert!(OpenIDParameters::from_form("").is_empty());
    }

    #[test]
    fn deserializes_from_json() {
        let params = OpenIDParameters::from_json(
            r#"{"openid.ext1.type.email": "http://axschema.org/contact/email", "openid.mode": "id_res"}"#,
        )
        .unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params.keys_with_value("http://axschema.org/contact/email"), vec!["openid.ext1.type.email"]);
        assert!(params.keys_with_value("nothing").is_empty());

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["openid.mode"], "id_res");

        assert!(OpenIDParameters::from_json(r#"{"openid.mode": 1}"#).is_err());
        assert!(OpenIDParameters::from_json("[]").is_err());
    }
}
