//! # Login Methods and Cloud Environments
//!
//! Value types of the `--login` and `--environment` exec flags.

use clap::ValueEnum;
use std::fmt;

/// Login method selected by `-l/--login`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LoginMethod {
    #[value(name = "devicecode")]
    DeviceCode,
    #[value(name = "interactive")]
    Interactive,
    /// Service principal with a client secret or certificate
    #[value(name = "spn")]
    ServicePrincipal,
    /// Resource owner password credentials
    #[value(name = "ropc")]
    ResourceOwnerPassword,
    #[value(name = "msi")]
    ManagedIdentity,
    #[value(name = "azurecli")]
    AzureCli,
    #[value(name = "azd")]
    AzureDeveloperCli,
    #[value(name = "workloadidentity")]
    WorkloadIdentity,
    #[value(name = "azurepipelines")]
    AzurePipelines,
}

impl LoginMethod {
    /// Flag value as written in a kubeconfig
    pub fn as_str(self) -> &'static str {
        match self {
            LoginMethod::DeviceCode => "devicecode",
            LoginMethod::Interactive => "interactive",
            LoginMethod::ServicePrincipal => "spn",
            LoginMethod::ResourceOwnerPassword => "ropc",
            LoginMethod::ManagedIdentity => "msi",
            LoginMethod::AzureCli => "azurecli",
            LoginMethod::AzureDeveloperCli => "azd",
            LoginMethod::WorkloadIdentity => "workloadidentity",
            LoginMethod::AzurePipelines => "azurepipelines",
        }
    }
}

impl fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Azure cloud selected by `-e/--environment`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AzureEnvironment {
    #[value(name = "AzurePublicCloud")]
    PublicCloud,
    #[value(name = "AzureChinaCloud")]
    ChinaCloud,
    #[value(name = "AzureUSGovernmentCloud")]
    UsGovernmentCloud,
}

impl AzureEnvironment {
    /// Microsoft Entra authority host of this cloud
    pub fn authority_host(self) -> &'static str {
        match self {
            AzureEnvironment::PublicCloud => "https://login.microsoftonline.com/",
            AzureEnvironment::ChinaCloud => "https://login.chinacloudapi.cn/",
            AzureEnvironment::UsGovernmentCloud => "https://login.microsoftonline.us/",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AzureEnvironment::PublicCloud => "AzurePublicCloud",
            AzureEnvironment::ChinaCloud => "AzureChinaCloud",
            AzureEnvironment::UsGovernmentCloud => "AzureUSGovernmentCloud",
        }
    }
}

impl fmt::Display for AzureEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
