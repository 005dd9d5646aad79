//! `az` command-line gateway
//!
//! Shells out to the Azure CLI with `--output json` and decodes the result.
//! Calls are synchronous and block the calling thread until `az` exits.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use log::debug;
use serde::de::DeserializeOwned;

use super::api::{AccountEntry, GraphResponse, RawResource};
use super::normalize::{normalize_graph_row, normalize_resource, normalize_subscription};
use super::{CliStatus, DirectoryGateway, GraphPage, portal_url};
use crate::config::Settings;
use crate::error::{AzResult, AzureError};
use crate::models::{Resource, ResourceId, Subscription, SubscriptionId};

/// Projection used for the bulk query; ordered so skip tokens stay stable
const GRAPH_QUERY: &str = "Resources \
    | project id, name, type, resourceGroup, location, subscriptionId, tags \
    | order by id asc";

/// Gateway backed by the `az` executable
pub struct AzCli {
    settings: Settings,
}

impl AzCli {
    /// Create a gateway using the given settings
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// PATH with the configured extra directories prepended
    fn search_path(&self) -> Option<OsString> {
        let mut dirs: Vec<PathBuf> = self.settings.extra_path.iter().map(PathBuf::from).collect();
        if let Some(current) = std::env::var_os("PATH") {
            dirs.extend(std::env::split_paths(&current));
        }
        std::env::join_paths(dirs).ok()
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.settings.az_path);
        cmd.args(args).stdin(Stdio::null());
        if let Some(path) = self.search_path() {
            cmd.env("PATH", path);
        }
        cmd
    }

    /// Run `az` and capture its output, mapping spawn failures
    fn run(&self, label: &str, args: &[&str]) -> AzResult<Output> {
        debug!("az {}", args.join(" "));
        self.command(args).output().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => AzureError::Unavailable,
            _ => AzureError::gateway(label, format!("failed to start az: {}", e)),
        })
    }

    /// Run `az ... --output json` and decode stdout
    fn run_json<T: DeserializeOwned>(&self, label: &str, args: &[&str]) -> AzResult<T> {
        let mut full_args = args.to_vec();
        full_args.extend(["--output", "json"]);

        let output = self.run(label, &full_args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::gateway(label, first_error_line(&stderr)));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| AzureError::gateway(label, format!("invalid JSON output: {}", e)))
    }

    /// Whether `az <args>` exits successfully; spawn failures count as failure
    fn probe(&self, args: &[&str]) -> bool {
        self.command(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl DirectoryGateway for AzCli {
    fn check_availability(&self) -> CliStatus {
        if !self.probe(&["--version"]) {
            return CliStatus::default();
        }
        CliStatus {
            installed: true,
            logged_in: self.probe(&["account", "show"]),
        }
    }

    fn list_subscriptions(&self) -> AzResult<Vec<Subscription>> {
        let entries: Vec<AccountEntry> = self.run_json("account list", &["account", "list"])?;
        Ok(entries.into_iter().map(normalize_subscription).collect())
    }

    fn list_resources(
        &self,
        subscription_id: &SubscriptionId,
        subscription_name: &str,
    ) -> AzResult<Vec<Resource>> {
        let raw: Vec<RawResource> = self.run_json(
            "resource list",
            &["resource", "list", "--subscription", subscription_id.as_str()],
        )?;
        Ok(raw
            .into_iter()
            .map(|r| normalize_resource(r, subscription_id, subscription_name))
            .collect())
    }

    fn query_resources_page(
        &self,
        subscription_ids: &[SubscriptionId],
        skip_token: Option<&str>,
    ) -> AzResult<GraphPage> {
        let page_size = self.settings.graph_page_size.to_string();
        let mut args = vec!["graph", "query", "-q", GRAPH_QUERY, "--first", &page_size];
        if !subscription_ids.is_empty() {
            args.push("--subscriptions");
            args.extend(subscription_ids.iter().map(|id| id.as_str()));
        }
        if let Some(token) = skip_token {
            args.extend(["--skip-token", token]);
        }

        let response: GraphResponse = self.run_json("graph query", &args)?;
        Ok(GraphPage {
            resources: response.data.into_iter().map(normalize_graph_row).collect(),
            skip_token: response.skip_token.filter(|t| !t.is_empty()),
        })
    }

    fn set_default_subscription(&self, id: &SubscriptionId) -> AzResult<()> {
        let output = self.run(
            "account set",
            &["account", "set", "--subscription", id.as_str()],
        )?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::gateway("account set", first_error_line(&stderr)));
        }
        Ok(())
    }

    fn portal_url(&self, resource_id: &ResourceId) -> String {
        portal_url(&self.settings.portal_base_url, resource_id)
    }
}

/// First meaningful line of `az` stderr, for a compact error message
fn first_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("WARNING"))
        .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| "command exited with an error".to_string())
}
