//! CalDAV client helpers using libdav.
//!
//! Provides utilities for creating libdav CalDav clients with basic
//! authentication, plus a PROPFIND request used to check that the target
//! calendar collection exists.

use anyhow::{Context, Result};
use http::{Method, Uri};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::{client::legacy::Client, rt::TokioExecutor};
use libdav::CalDavClient;
use libdav::dav::WebDavClient;
use libdav::requests::{DavRequest, ParseResponseError, PreparedRequest};
use tower::ServiceBuilder;
use tower_http::{auth::AddAuthorization, follow_redirect::FollowRedirect};

/// Type alias for the HTTP client with auth and redirect following.
type HttpClient = FollowRedirect<
    AddAuthorization<
        Client<
            hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
            String,
        >,
    >,
>;

/// Type alias for our CalDAV client.
pub type KerioCalDavClient = CalDavClient<HttpClient>;

/// Create a libdav CalDavClient with basic authentication, HTTPS support
/// and automatic redirect following.
pub fn create_caldav_client(
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<KerioCalDavClient> {
    let uri: Uri = base_url
        .parse()
        .with_context(|| format!("Invalid base URL: {}", base_url))?;

    let https_connector = HttpsConnectorBuilder::new()
        .with_native_roots()
        .context("Failed to load native TLS roots")?
        .https_or_http()
        .enable_http1()
        .build();

    let http_client = Client::builder(TokioExecutor::new()).build(https_connector);
    let auth_client = AddAuthorization::basic(http_client, username, password);

    let client = ServiceBuilder::new()
        .layer(tower_http::follow_redirect::FollowRedirectLayer::new())
        .service(auth_client);

    let webdav = WebDavClient::new(uri, client);
    Ok(CalDavClient::new(webdav))
}

/// Build the URL for an event resource.
pub fn event_url(calendar_url: &str, event_uid: &str) -> String {
    let base = calendar_url.trim_end_matches('/');
    format!("{}/{}.ics", base, event_uid)
}

/// Extract the href path from a full URL.
///
/// Converts "https://kerio1.kampmail.de/caldav/max/kalender/" to "/caldav/max/kalender/"
pub fn url_to_href(url: &str) -> String {
    if let Ok(uri) = url.parse::<Uri>() {
        uri.path().to_string()
    } else {
        url.to_string()
    }
}

// ============================================================================
// PROPFIND on a single collection
// ============================================================================

/// Request the `resourcetype` of one collection (Depth: 0).
pub struct GetResourceType<'a> {
    href: &'a str,
}

impl<'a> GetResourceType<'a> {
    pub fn new(href: &'a str) -> Self {
        Self { href }
    }
}

/// Response from a [`GetResourceType`] request.
#[derive(Debug, PartialEq, Eq)]
pub struct GetResourceTypeResponse {
    /// Whether `resourcetype` contains `<C:calendar/>`
    pub is_calendar: bool,
}

impl DavRequest for GetResourceType<'_> {
    type Response = GetResourceTypeResponse;
    type ParseError = ParseResponseError;
    type Error<E> = libdav::dav::WebDavError<E>;

    fn prepare_request(&self) -> std::result::Result<PreparedRequest, http::Error> {
        let body = r#"<propfind xmlns="DAV:">
    <prop>
        <resourcetype/>
    </prop>
</propfind>"#
            .to_string();

        Ok(PreparedRequest {
            method: Method::from_bytes(b"PROPFIND")?,
            path: self.href.to_string(),
            body,
            headers: vec![("Depth".to_string(), "0".to_string())],
        })
    }

    fn parse_response(
        &self,
        parts: &http::response::Parts,
        body: &[u8],
    ) -> std::result::Result<Self::Response, ParseResponseError> {
        if !parts.status.is_success() {
            return Err(ParseResponseError::BadStatusCode(parts.status));
        }

        Ok(GetResourceTypeResponse {
            is_calendar: parse_is_calendar(body)?,
        })
    }
}

/// Look for a `calendar` element (CalDAV namespace) inside `resourcetype`.
fn parse_is_calendar(body: &[u8]) -> std::result::Result<bool, ParseResponseError> {
    let text = std::str::from_utf8(body)?;
    let doc = roxmltree::Document::parse(text)?;

    let is_calendar = doc
        .root_element()
        .descendants()
        .filter(|n| n.tag_name().name() == "resourcetype")
        .flat_map(|n| n.children())
        .any(|n| {
            n.tag_name().name() == "calendar"
                && n.tag_name().namespace() == Some("urn:ietf:params:xml:ns:caldav")
        });

    Ok(is_calendar)
}
