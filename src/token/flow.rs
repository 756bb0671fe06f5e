//! # Login Flow Selection
//!
//! Turns merged [`AuthOptions`] into a validated, typed description of the
//! login to perform. Service principal is the only flow wired to a token
//! provider; every other login method is rejected here instead of being
//! silently misconfigured.

use crate::error::ProviderError;
use crate::options::{AuthOptions, LoginMethod};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// A supported login, tagged by method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFlow {
    ServicePrincipal(ServicePrincipalFlow),
}

/// Client-credentials login of an Azure AD application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePrincipalFlow {
    pub tenant_id: String,
    pub client_id: String,
    pub secret: ServicePrincipalSecret,
    /// OAuth2 scope, `<server-id>/.default`
    pub scope: String,
    pub authority_host: String,
    /// Upper bound for one token acquisition
    pub timeout: Duration,
}

/// How the service principal proves its identity
#[derive(Clone, PartialEq, Eq)]
pub enum ServicePrincipalSecret {
    ClientSecret(String),
    /// PKCS#12 bundle, base64 encoded
    ClientCertificate {
        certificate: String,
        password: Option<String>,
    },
}

impl std::fmt::Debug for ServicePrincipalSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServicePrincipalSecret::ClientSecret(_) => f.write_str("ClientSecret(<redacted>)"),
            ServicePrincipalSecret::ClientCertificate { password, .. } => f
                .debug_struct("ClientCertificate")
                .field("certificate", &"<redacted>")
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

impl LoginFlow {
    /// Select and validate the login flow described by the options
    ///
    /// # Errors
    ///
    /// - [`ProviderError::UnsupportedLoginMethod`] for anything but `spn`
    /// - [`ProviderError::MissingField`] / [`ProviderError::MissingSecret`]
    ///   when required service-principal fields are empty
    /// - [`ProviderError::Unsupported`] for proof-of-possession tokens
    /// - [`ProviderError::Certificate`] if a certificate file cannot be read
    pub fn from_options(options: &AuthOptions) -> Result<Self, ProviderError> {
        match options.login_method {
            LoginMethod::ServicePrincipal => {
                ServicePrincipalFlow::from_options(options).map(LoginFlow::ServicePrincipal)
            }
            other => Err(ProviderError::UnsupportedLoginMethod(other.to_string())),
        }
    }

    pub fn login_method(&self) -> LoginMethod {
        match self {
            LoginFlow::ServicePrincipal(_) => LoginMethod::ServicePrincipal,
        }
    }
}

impl ServicePrincipalFlow {
    fn from_options(options: &AuthOptions) -> Result<Self, ProviderError> {
        let client_id =
            non_empty(options.client_id.as_ref()).ok_or(ProviderError::MissingField("client ID"))?;

        let certificate = non_empty(options.client_certificate.as_ref());
        let client_secret = non_empty(options.client_secret.as_ref());
        let secret = match (certificate, client_secret) {
            (Some(certificate), _) => ServicePrincipalSecret::ClientCertificate {
                certificate: load_certificate(certificate)?,
                password: non_empty(options.client_certificate_password.as_ref())
                    .map(ToString::to_string),
            },
            (None, Some(client_secret)) => {
                ServicePrincipalSecret::ClientSecret(client_secret.to_string())
            }
            (None, None) => return Err(ProviderError::MissingSecret),
        };

        let tenant_id =
            non_empty(options.tenant_id.as_ref()).ok_or(ProviderError::MissingField("tenant ID"))?;
        if options.server_id.is_empty() {
            return Err(ProviderError::MissingField("server ID"));
        }
        if options.pop_enabled {
            return Err(ProviderError::Unsupported(
                "proof-of-possession tokens are not supported".to_string(),
            ));
        }

        let authority_host = non_empty(options.authority_host.as_ref())
            .map_or_else(|| options.environment.authority_host().to_string(), ToString::to_string);

        Ok(Self {
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
            secret,
            scope: options.scope(),
            authority_host,
            timeout: options.timeout,
        })
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// A certificate is either a path to a PKCS#12 file or inline base64 data
fn load_certificate(value: &str) -> Result<String, ProviderError> {
    let path = Path::new(value);
    if path.is_file() {
        debug!(path = %path.display(), "Reading client certificate from file");
        let bytes = std::fs::read(path).map_err(|source| ProviderError::Certificate {
            path: value.to_string(),
            source,
        })?;
        return Ok(STANDARD.encode(bytes));
    }

    let inline: String = value.split_whitespace().collect();
    if STANDARD.decode(&inline).is_err() {
        return Err(ProviderError::Unsupported(
            "client certificate is neither a readable file nor base64 data".to_string(),
        ));
    }
    Ok(inline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialSet;
    use std::io::Write;

    fn merged(args: &[&str], credentials: &str) -> AuthOptions {
        let mut opts = AuthOptions::from_exec_args(args).unwrap();
        opts.merge_credentials(&CredentialSet::decode(credentials.as_bytes()).unwrap());
        opts
    }

    #[test]
    fn test_secret_based_flow() {
        let opts = merged(
            &["get-token"],
            r#"{"clientId":"abc","clientSecret":"s3cr3t","tenantId":"ten1"}"#,
        );
        let LoginFlow::ServicePrincipal(flow) = LoginFlow::from_options(&opts).unwrap();

        assert_eq!(flow.client_id, "abc");
        assert_eq!(flow.tenant_id, "ten1");
        assert_eq!(
            flow.secret,
            ServicePrincipalSecret::ClientSecret("s3cr3t".to_string())
        );
        assert_eq!(flow.scope, "6dae42f8-4368-4678-94ff-3960e28e3630/.default");
        assert_eq!(flow.authority_host, "https://login.microsoftonline.com/");
        assert_eq!(flow.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_certificate_wins_over_secret() {
        let opts = merged(
            &[],
            r#"{"clientId":"abc","clientSecret":"s3cr3t","tenantId":"ten1","clientCertificate":"TUlJS2NR","clientCertificatePassword":"pw"}"#,
        );
        let LoginFlow::ServicePrincipal(flow) = LoginFlow::from_options(&opts).unwrap();

        assert_eq!(
            flow.secret,
            ServicePrincipalSecret::ClientCertificate {
                certificate: "TUlJS2NR".to_string(),
                password: Some("pw".to_string()),
            }
        );
    }

    #[test]
    fn test_certificate_file_is_read_and_encoded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x30\x82\x0a\x71").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let mut credentials = CredentialSet::default();
        credentials.client_id = Some("abc".to_string());
        credentials.tenant_id = Some("ten1".to_string());
        credentials.client_certificate = Some(path);

        let mut opts = AuthOptions::default();
        opts.merge_credentials(&credentials);
        let LoginFlow::ServicePrincipal(flow) = LoginFlow::from_options(&opts).unwrap();

        assert_eq!(
            flow.secret,
            ServicePrincipalSecret::ClientCertificate {
                certificate: "MIIKcQ==".to_string(),
                password: None,
            }
        );
    }

    #[test]
    fn test_invalid_inline_certificate_is_rejected() {
        let opts = merged(
            &[],
            r#"{"clientId":"abc","tenantId":"ten1","clientCertificate":"/no/such/file.pfx"}"#,
        );
        assert!(matches!(
            LoginFlow::from_options(&opts),
            Err(ProviderError::Unsupported(_))
        ));
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let missing_tenant = merged(&[], r#"{"clientId":"abc","clientSecret":"s"}"#);
        assert!(matches!(
            LoginFlow::from_options(&missing_tenant),
            Err(ProviderError::MissingField("tenant ID"))
        ));

        let missing_client = merged(&[], r#"{"tenantId":"ten1","clientSecret":"s"}"#);
        assert!(matches!(
            LoginFlow::from_options(&missing_client),
            Err(ProviderError::MissingField("client ID"))
        ));

        let missing_secret = merged(&[], r#"{"clientId":"abc","tenantId":"ten1"}"#);
        assert!(matches!(
            LoginFlow::from_options(&missing_secret),
            Err(ProviderError::MissingSecret)
        ));

        let empty_server = merged(
            &["--server-id="],
            r#"{"clientId":"abc","clientSecret":"s","tenantId":"ten1"}"#,
        );
        assert!(matches!(
            LoginFlow::from_options(&empty_server),
            Err(ProviderError::MissingField("server ID"))
        ));
    }

    #[test]
    fn test_other_login_methods_are_rejected() {
        let opts = AuthOptions::from_exec_args(["--login", "msi"]).unwrap();
        let err = LoginFlow::from_options(&opts).unwrap_err();
        assert_eq!(err.to_string(), "login method msi is not supported");
    }

    #[test]
    fn test_pop_tokens_are_rejected() {
        let opts = merged(
            &["--pop-enabled"],
            r#"{"clientId":"abc","clientSecret":"s","tenantId":"ten1"}"#,
        );
        assert!(matches!(
            LoginFlow::from_options(&opts),
            Err(ProviderError::Unsupported(_))
        ));
    }

    #[test]
    fn test_authority_host_follows_environment_and_override() {
        let json = r#"{"clientId":"abc","clientSecret":"s","tenantId":"ten1"}"#;

        let opts = merged(&["-e", "AzureUSGovernmentCloud"], json);
        let LoginFlow::ServicePrincipal(flow) = LoginFlow::from_options(&opts).unwrap();
        assert_eq!(flow.authority_host, "https://login.microsoftonline.us/");

        let opts = merged(&["--authority-host", "https://login.example.test/"], json);
        let LoginFlow::ServicePrincipal(flow) = LoginFlow::from_options(&opts).unwrap();
        assert_eq!(flow.authority_host, "https://login.example.test/");
    }
}
