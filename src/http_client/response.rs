//! Buffered view of a response: status, headers, and the pending body.

use std::collections::HashMap;

use reqwest::{Response, StatusCode};

/// Response with header names lower-cased for lookup.
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub(crate) response: Response,
}

impl HttpResponse {
    /// Only a plain 200 counts as a usable download.
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Filename announced by `Content-Disposition`, if any.
    pub fn content_disposition_filename(&self) -> Option<String> {
        self.header("content-disposition")
            .and_then(parse_content_disposition_filename)
    }

    pub async fn bytes(self) -> Result<Vec<u8>, reqwest::Error> {
        Ok(self.response.bytes().await?.to_vec())
    }

    pub async fn text(self) -> Result<String, reqwest::Error> {
        self.response.text().await
    }
}

/// Extract the filename parameter from a `Content-Disposition` value.
///
/// The extended `filename*=charset''percent-encoded` form is preferred over
/// plain `filename=`. Directory components some servers leak are dropped.
pub fn parse_content_disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in header.split(';').skip(1) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // charset'language'value
                let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
                extended = urlencoding::decode(encoded).ok().map(|s| s.into_owned());
            }
            "filename" => plain = Some(value.to_string()),
            _ => {}
        }
    }

    extended
        .into_iter()
        .chain(plain)
        .map(|name| basename(&name).trim().to_string())
        .find(|name| !name.is_empty())
}

fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
