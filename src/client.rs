// File: src/client.rs
use crate::error::{Error, Result};
use crate::ics;

use http::{Request, Uri, header};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use icalendar::Calendar;
use log::{debug, info, warn};

const MAX_REDIRECTS: usize = 5;

type HttpsClient =
    Client<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>, String>;

/// Something that can produce a parsed calendar for a URL.
#[allow(async_fn_in_trait)]
pub trait CalendarSource {
    async fn fetch(&self, url: &str) -> Result<Calendar>;
}

/// Fetches feeds over HTTP(S) with a plain GET.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: HttpsClient,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() {
            // Plain http feeds still work; https ones will fail the handshake.
            warn!("No valid system certificates found.");
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();
        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(https_connector);
        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let mut uri = parse_feed_uri(url)?;

        for _ in 0..=MAX_REDIRECTS {
            debug!("GET {}", uri);
            let req = Request::get(uri.clone())
                .header(header::ACCEPT, "text/calendar, */*")
                .body(String::new())
                .map_err(|e| Error::Fetch(e.to_string()))?;

            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| Error::Fetch(format!("{}: {}", uri, e)))?;
            let status = resp.status();

            if status.is_redirection() {
                let location = resp
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| Error::Fetch(format!("{} without Location", status)))?;
                uri = resolve_redirect(&uri, location)?;
                continue;
            }
            if !status.is_success() {
                return Err(Error::Fetch(format!("{} returned {}", uri, status)));
            }

            let bytes = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| Error::Fetch(e.to_string()))?
                .to_bytes();
            return String::from_utf8(bytes.to_vec())
                .map_err(|_| Error::Fetch(format!("{} is not UTF-8 text", uri)));
        }

        Err(Error::Fetch(format!("Too many redirects for {}", url)))
    }
}

impl CalendarSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Calendar> {
        let text = self.get_text(url).await?;
        let text = text.trim_start_matches('\u{feff}');
        if !text.trim_start().starts_with("BEGIN:VCALENDAR") {
            return Err(Error::Fetch(format!("{} did not return a calendar", url)));
        }
        let calendar = ics::parse(text)?;
        info!(
            "Fetched {} ({} components)",
            url,
            calendar.components.len()
        );
        Ok(calendar)
    }
}

/// Accepts http, https and webcal (served as https) URLs.
fn parse_feed_uri(url: &str) -> Result<Uri> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::Config("No calendar URL configured".to_string()));
    }
    let normalized = match url.strip_prefix("webcal://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    };
    let uri: Uri = normalized
        .parse()
        .map_err(|e: http::uri::InvalidUri| Error::Fetch(format!("{}: {}", url, e)))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => Ok(uri),
        _ => Err(Error::Fetch(format!("Unsupported URL scheme: {}", url))),
    }
}

fn resolve_redirect(base: &Uri, location: &str) -> Result<Uri> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return parse_feed_uri(location);
    }
    let scheme = base.scheme_str().unwrap_or("https");
    let authority = base
        .authority()
        .map(|a| a.as_str())
        .ok_or_else(|| Error::Fetch(format!("Cannot resolve redirect to {}", location)))?;
    let path = if location.starts_with('/') {
        location.to_string()
    } else {
        let dir = base.path().rsplit_once('/').map(|(d, _)| d).unwrap_or("");
        format!("{}/{}", dir, location)
    };
    parse_feed_uri(&format!("{}://{}{}", scheme, authority, path))
}
