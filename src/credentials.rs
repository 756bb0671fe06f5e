//! # Azure Credentials Payload
//!
//! Decodes the service-principal credentials blob (usually the content of a
//! Kubernetes Secret) into a [`CredentialSet`].
//!
//! The payload is a flat JSON object of strings:
//!
//! ```json
//! {"clientId": "...", "clientSecret": "...", "tenantId": "..."}
//! ```
//!
//! Certificate-based service principals supply `clientCertificate` (and
//! optionally `clientCertificatePassword`) instead of `clientSecret`.
//! Unknown keys are ignored; missing keys are left unset.

use crate::constants::{
    CREDENTIALS_KEY_CLIENT_CERT, CREDENTIALS_KEY_CLIENT_CERT_PASSWORD, CREDENTIALS_KEY_CLIENT_ID,
    CREDENTIALS_KEY_CLIENT_SECRET, CREDENTIALS_KEY_TENANT_ID,
};
use crate::error::DecodeError;
use std::collections::HashMap;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Service-principal credentials taken from the payload
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CredentialSet {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant_id: Option<String>,
    /// PKCS#12 certificate, base64 encoded or a file path
    pub client_certificate: Option<String>,
    /// Only meaningful together with `client_certificate`
    pub client_certificate_password: Option<String>,
}

impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSet")
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(self.client_secret.as_ref()))
            .field("tenant_id", &self.tenant_id)
            .field(
                "client_certificate",
                &redacted(self.client_certificate.as_ref()),
            )
            .field(
                "client_certificate_password",
                &redacted(self.client_certificate_password.as_ref()),
            )
            .finish()
    }
}

pub(crate) fn redacted(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "<redacted>")
}

impl CredentialSet {
    /// Decode a credentials payload
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the payload is not a JSON object whose values
    /// are all strings. Nothing is partially decoded in that case.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut fields: HashMap<String, String> = serde_json::from_slice(payload)?;

        let credentials = Self {
            client_id: fields.remove(CREDENTIALS_KEY_CLIENT_ID),
            client_secret: fields.remove(CREDENTIALS_KEY_CLIENT_SECRET),
            tenant_id: fields.remove(CREDENTIALS_KEY_TENANT_ID),
            client_certificate: fields.remove(CREDENTIALS_KEY_CLIENT_CERT),
            client_certificate_password: fields.remove(CREDENTIALS_KEY_CLIENT_CERT_PASSWORD),
        };

        // Whatever is left is unrecognized and may still hold secret material
        fields.values_mut().for_each(Zeroize::zeroize);

        Ok(credentials)
    }

    /// Whether the payload describes a certificate-based service principal
    pub fn has_certificate(&self) -> bool {
        self.client_certificate.is_some()
    }
}
