//! # Authentication Options
//!
//! [`AuthOptions`] is the flag schema of `kubelogin get-token`, the command a
//! legacy AKS kubeconfig invokes through its `exec` section. The exec
//! arguments are parsed into it (see [`AuthOptions::from_exec_args`]), then the
//! service-principal credentials are merged on top with
//! [`AuthOptions::merge_credentials`].

mod args;
mod login;

pub use login::{AzureEnvironment, LoginMethod};

use crate::constants::{AKS_SERVER_ID, DEFAULT_TOKEN_TIMEOUT, EXEC_PROGRAM_NAME, SCOPE_SUFFIX};
use crate::credentials::{redacted, CredentialSet};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Options for acquiring an Azure AD token for a cluster
#[derive(Clone, PartialEq, Eq, Parser, Zeroize, ZeroizeOnDrop)]
#[command(name = EXEC_PROGRAM_NAME, no_binary_name = true, args_override_self = true)]
pub struct AuthOptions {
    /// Bare words of the exec invocation, e.g. `get-token`
    #[arg(value_name = "COMMAND", hide = true)]
    pub command: Vec<String>,

    #[arg(short = 'l', long = "login", value_enum, default_value_t = LoginMethod::DeviceCode)]
    #[zeroize(skip)]
    pub login_method: LoginMethod,

    /// AAD server application ID of the cluster
    #[arg(long = "server-id", default_value = AKS_SERVER_ID)]
    pub server_id: String,

    #[arg(long = "client-id")]
    pub client_id: Option<String>,

    #[arg(long = "client-secret")]
    pub client_secret: Option<String>,

    /// PKCS#12 certificate, base64 encoded or a file path
    #[arg(long = "client-certificate")]
    pub client_certificate: Option<String>,

    #[arg(long = "client-certificate-password")]
    pub client_certificate_password: Option<String>,

    #[arg(short = 't', long = "tenant-id")]
    pub tenant_id: Option<String>,

    #[arg(
        short = 'e',
        long = "environment",
        value_enum,
        ignore_case = true,
        default_value_t = AzureEnvironment::PublicCloud
    )]
    #[zeroize(skip)]
    pub environment: AzureEnvironment,

    #[arg(long = "authority-host")]
    pub authority_host: Option<String>,

    #[arg(long = "username")]
    pub username: Option<String>,

    #[arg(long = "password")]
    pub password: Option<String>,

    #[arg(long = "identity-resource-id")]
    pub identity_resource_id: Option<String>,

    #[arg(long = "federated-token-file")]
    pub federated_token_file: Option<String>,

    #[arg(long = "token-cache-dir")]
    pub token_cache_dir: Option<String>,

    #[arg(long = "redirect-url")]
    pub redirect_url: Option<String>,

    #[arg(long = "login-hint")]
    pub login_hint: Option<String>,

    #[arg(long = "pop-claims")]
    pub pop_claims: Option<String>,

    /// Upper bound for a single token acquisition
    #[arg(long = "timeout", value_parser = args::parse_duration, default_value = "60s")]
    #[zeroize(skip)]
    pub timeout: Duration,

    #[arg(long = "legacy", num_args = 0..=1, require_equals = true, default_missing_value = "true",
          default_value = "false", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub is_legacy: bool,

    #[arg(long = "pop-enabled", num_args = 0..=1, require_equals = true, default_missing_value = "true",
          default_value = "false", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub pop_enabled: bool,

    #[arg(long = "use-azurerm-env-vars", num_args = 0..=1, require_equals = true, default_missing_value = "true",
          default_value = "false", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub use_azurerm_env_vars: bool,

    #[arg(long = "disable-environment-override", num_args = 0..=1, require_equals = true, default_missing_value = "true",
          default_value = "false", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub disable_environment_override: bool,

    #[arg(long = "disable-instance-discovery", num_args = 0..=1, require_equals = true, default_missing_value = "true",
          default_value = "false", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub disable_instance_discovery: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            login_method: LoginMethod::DeviceCode,
            server_id: AKS_SERVER_ID.to_string(),
            client_id: None,
            client_secret: None,
            client_certificate: None,
            client_certificate_password: None,
            tenant_id: None,
            environment: AzureEnvironment::PublicCloud,
            authority_host: None,
            username: None,
            password: None,
            identity_resource_id: None,
            federated_token_file: None,
            token_cache_dir: None,
            redirect_url: None,
            login_hint: None,
            pop_claims: None,
            timeout: DEFAULT_TOKEN_TIMEOUT,
            is_legacy: false,
            pop_enabled: false,
            use_azurerm_env_vars: false,
            disable_environment_override: false,
            disable_instance_discovery: false,
        }
    }
}

impl std::fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthOptions")
            .field("command", &self.command)
            .field("login_method", &self.login_method)
            .field("server_id", &self.server_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(self.client_secret.as_ref()))
            .field(
                "client_certificate",
                &redacted(self.client_certificate.as_ref()),
            )
            .field(
                "client_certificate_password",
                &redacted(self.client_certificate_password.as_ref()),
            )
            .field("tenant_id", &self.tenant_id)
            .field("environment", &self.environment)
            .field("authority_host", &self.authority_host)
            .field("username", &self.username)
            .field("password", &redacted(self.password.as_ref()))
            .field("timeout", &self.timeout)
            .field("is_legacy", &self.is_legacy)
            .field("pop_enabled", &self.pop_enabled)
            .finish_non_exhaustive()
    }
}

impl AuthOptions {
    /// Overlay service-principal credentials and force service-principal login
    ///
    /// Client ID, client secret and tenant ID are always replaced, including
    /// with "unset" when the payload lacks them. The certificate is only
    /// replaced when the payload carries one, and the certificate password is
    /// only taken alongside a certificate.
    pub fn merge_credentials(&mut self, credentials: &CredentialSet) {
        replace_secret(&mut self.client_id, credentials.client_id.clone());
        replace_secret(&mut self.client_secret, credentials.client_secret.clone());
        replace_secret(&mut self.tenant_id, credentials.tenant_id.clone());

        if let Some(certificate) = &credentials.client_certificate {
            replace_secret(&mut self.client_certificate, Some(certificate.clone()));
            if let Some(password) = &credentials.client_certificate_password {
                replace_secret(
                    &mut self.client_certificate_password,
                    Some(password.clone()),
                );
            }
        }

        // TODO: select managed identity and workload identity from a login
        // discriminator in the credentials payload once those flows are wired
        self.login_method = LoginMethod::ServicePrincipal;
    }

    /// OAuth2 scope requested for the cluster's server application
    pub fn scope(&self) -> String {
        format!("{}{}", self.server_id, SCOPE_SUFFIX)
    }
}

fn replace_secret(slot: &mut Option<String>, value: Option<String>) {
    slot.zeroize();
    *slot = value;
}
