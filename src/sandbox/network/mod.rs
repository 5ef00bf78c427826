//! Outbound HTTP for generated code.
//!
//! Pipeline for every request, and again for a redirect target:
//! parse → scheme check → resolve every address → check every address →
//! connect only to the checked addresses.

mod resolver;
mod types;

pub use resolver::{Resolver, StaticResolver, SystemResolver};
pub use types::{Auth, HttpMethod, HttpResponse, RequestBody, RequestOptions};

use super::{SandboxDecision, truncate_utf8};
use crate::config::NetworkSandboxConfig;
use crate::error::SecurityError;
use crate::runtime::observability::{NoopObserver, Observer, ObserverEvent};
use crate::security::url_validation::AddressPolicy;
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::debug;
use url::{Host, Url};

const SANDBOX: &str = "network";

/// Caller headers withheld once a redirect leaves the original host.
const CREDENTIAL_HEADERS: [&str; 3] = ["authorization", "cookie", "proxy-authorization"];

/// A URL that passed every destination check.
#[derive(Debug, Clone)]
struct Target {
    url: Url,
    /// Set for hostnames: the only addresses the client may connect to.
    pinned: Option<(String, Vec<SocketAddr>)>,
}

pub struct NetworkSandbox {
    config: NetworkSandboxConfig,
    policy: AddressPolicy,
    resolver: Arc<dyn Resolver>,
    observer: Arc<dyn Observer>,
}

impl NetworkSandbox {
    pub fn new(config: NetworkSandboxConfig) -> Self {
        Self {
            config,
            policy: AddressPolicy::standard(),
            resolver: Arc::new(SystemResolver),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Build from config, applying its operator exemptions.
    pub fn from_config(config: &NetworkSandboxConfig) -> anyhow::Result<Self> {
        let policy = AddressPolicy::with_exemptions(config.parsed_exemptions()?);
        Ok(Self::new(config.clone()).with_policy(policy))
    }

    pub fn with_policy(mut self, policy: AddressPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &NetworkSandboxConfig {
        &self.config
    }

    /// Run the destination checks for `url` without sending anything.
    pub async fn validate(&self, url: &str) -> SandboxDecision {
        match self.authorize(url).await {
            Ok(_) => SandboxDecision::allow(),
            Err(reason) => SandboxDecision::deny(reason),
        }
    }

    pub async fn get(&self, url: &str, options: &RequestOptions) -> HttpResponse {
        self.request(HttpMethod::Get, url, options).await
    }

    pub async fn post(&self, url: &str, options: &RequestOptions) -> HttpResponse {
        self.request(HttpMethod::Post, url, options).await
    }

    pub async fn put(&self, url: &str, options: &RequestOptions) -> HttpResponse {
        self.request(HttpMethod::Put, url, options).await
    }

    pub async fn delete(&self, url: &str, options: &RequestOptions) -> HttpResponse {
        self.request(HttpMethod::Delete, url, options).await
    }

    pub async fn head(&self, url: &str, options: &RequestOptions) -> HttpResponse {
        self.request(HttpMethod::Head, url, options).await
    }

    /// Executing a caller-supplied fetch command line (curl/wget style) is not offered.
    pub fn fetch_command(&self, _command: &str) -> Result<HttpResponse, SecurityError> {
        Err(SecurityError::CapabilityRemoved {
            capability: "raw fetch command execution",
        })
    }

    pub async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        options: &RequestOptions,
    ) -> HttpResponse {
        let mut method = method;
        let mut current = with_query(url, &options.query);
        let mut send_body = true;
        let mut send_credentials = true;
        let mut hops_left = usize::from(self.config.follow_redirects);
        let first_host = Url::parse(&current)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase));

        loop {
            let target = match self.authorize(&current).await {
                Ok(target) => target,
                Err(reason) => {
                    self.observer.record_event(&ObserverEvent::SandboxRejected {
                        sandbox: SANDBOX,
                        target: current.clone(),
                        reason: reason.clone(),
                    });
                    return HttpResponse::rejected(reason);
                }
            };

            let response = match self
                .send(&target, method, options, send_body, send_credentials)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let message = format!("request failed: {e}");
                    self.observer.record_event(&ObserverEvent::ExternalFailure {
                        sandbox: SANDBOX,
                        target: current.clone(),
                        message: message.clone(),
                    });
                    return HttpResponse::failed(message);
                }
            };

            if hops_left > 0
                && response.status().is_redirection()
                && let Some(location) = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
            {
                let next = match target.url.join(location) {
                    Ok(next) => next,
                    Err(e) => return HttpResponse::failed(format!("invalid redirect location: {e}")),
                };
                debug!(from = %target.url, to = %next, "following redirect");
                hops_left -= 1;
                let status = response.status().as_u16();
                if !matches!(status, 307 | 308) {
                    if method != HttpMethod::Head {
                        method = HttpMethod::Get;
                    }
                    send_body = false;
                }
                let next_host = next.host_str().map(str::to_ascii_lowercase);
                send_credentials = send_credentials && next_host == first_host;
                current = next.to_string();
                continue;
            }

            return self.normalize(response).await;
        }
    }

    async fn authorize(&self, raw: &str) -> Result<Target, String> {
        let url = Url::parse(raw).map_err(|e| format!("invalid URL: {e}"))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(format!(
                    "unsupported scheme '{scheme}' (only http and https are allowed)"
                ));
            }
        }

        let port = url.port_or_known_default().unwrap_or(80);
        match url.host() {
            None => Err("URL has no host".to_string()),
            Some(Host::Ipv4(v4)) => {
                self.policy.check(&IpAddr::V4(v4))?;
                Ok(Target { url, pinned: None })
            }
            Some(Host::Ipv6(v6)) => {
                self.policy.check(&IpAddr::V6(v6))?;
                Ok(Target { url, pinned: None })
            }
            Some(Host::Domain(domain)) => {
                let domain = domain.to_string();
                let addrs = self
                    .resolver
                    .resolve(&domain, port)
                    .await
                    .map_err(|e| format!("DNS resolution failed for host '{domain}': {e}"))?;
                if addrs.is_empty() {
                    return Err(format!("host '{domain}' did not resolve to any address"));
                }
                for ip in &addrs {
                    self.policy
                        .check(ip)
                        .map_err(|reason| format!("host '{domain}' resolves to a blocked address: {reason}"))?;
                }
                let pinned = addrs.iter().map(|ip| SocketAddr::new(*ip, port)).collect();
                Ok(Target {
                    url,
                    pinned: Some((domain, pinned)),
                })
            }
        }
    }

    async fn send(
        &self,
        target: &Target,
        method: HttpMethod,
        options: &RequestOptions,
        send_body: bool,
        send_credentials: bool,
    ) -> reqwest::Result<reqwest::Response> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.config.connect_timeout())
            .read_timeout(self.config.read_timeout())
            .redirect(reqwest::redirect::Policy::none())
            // A proxy would resolve the host itself and bypass the address checks.
            .no_proxy();
        if let Some((domain, addrs)) = &target.pinned {
            builder = builder.resolve_to_addrs(domain, addrs);
        }
        let client = builder.build()?;

        let mut request = client.request(method.into(), target.url.clone());
        for (name, value) in &options.headers {
            if !send_credentials && is_credential_header(name) {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }
        if !options.has_header("user-agent") {
            request = request.header(reqwest::header::USER_AGENT, self.config.user_agent.as_str());
        }
        if send_credentials && let Some(auth) = &options.auth {
            request = match auth {
                Auth::Basic { username, password } => request.basic_auth(username, password.as_ref()),
                Auth::Bearer { token } => request.bearer_auth(token),
                Auth::Header { name, value } => request.header(name.as_str(), value.as_str()),
            };
        }
        if send_body && let Some(body) = &options.body {
            request = match body {
                RequestBody::Text(text) => request.body(text.clone()),
                RequestBody::Json(json) => request.json(json),
            };
        }

        request.send().await
    }

    async fn normalize(&self, mut response: reqwest::Response) -> HttpResponse {
        let status = response.status().as_u16();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let limit = self.config.max_response_bytes;
        let mut bytes: Vec<u8> = Vec::new();
        let mut truncated = false;
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    bytes.extend_from_slice(&chunk);
                    if bytes.len() > limit {
                        truncated = true;
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let message = format!("error reading response body: {e}");
                    self.observer.record_event(&ObserverEvent::ExternalFailure {
                        sandbox: SANDBOX,
                        target: response.url().to_string(),
                        message: message.clone(),
                    });
                    return HttpResponse {
                        status,
                        headers,
                        ..HttpResponse::failed(message)
                    };
                }
            }
        }

        let mut body = String::from_utf8_lossy(&bytes).into_owned();
        if truncated {
            truncate_utf8(&mut body, limit, &format!("\n[body truncated at {limit} bytes]"));
        }

        let json = if !truncated && is_json(headers.get("content-type").map(String::as_str)) {
            serde_json::from_str(&body).ok()
        } else {
            None
        };

        HttpResponse {
            status,
            headers,
            body,
            success: (200..300).contains(&status),
            json,
            error: None,
            blocked: false,
        }
    }
}

fn is_credential_header(name: &str) -> bool {
    CREDENTIAL_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name.trim()))
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        let ct = ct.to_ascii_lowercase();
        ct.contains("application/json") || ct.contains("+json")
    })
}

/// Append query pairs to `url`; an unparseable URL is returned untouched for
/// `authorize` to reject.
fn with_query(url: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().extend_pairs(query);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
