// URL fetching.
//
// Downloads land in a scratch directory under the corpus root; the
// caller copies them into place like any local file. The suggested
// filename comes from the Content-Disposition header when present,
// otherwise from the URL path plus a content-type derived extension.

use std::path::{Path, PathBuf};

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch failed for {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch failed for {url}: HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not store download for {url}")]
    Store {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

const USER_AGENT: &str = concat!("korpus/", env!("CARGO_PKG_VERSION"), " (corpus ingestion tool)");

/// A download, stored locally.
#[derive(Debug)]
pub struct Fetched {
    /// Local scratch file holding the body.
    pub path: PathBuf,
    /// Name the document should be known by before normalization.
    pub original_name: String,
    /// Final URL after redirects, recorded as provenance.
    pub origin: String,
}

/// Download `url` into `download_dir`.
///
/// `wanted_name` overrides the server-suggested filename.
pub async fn fetch_url(
    url: &str,
    download_dir: &Path,
    wanted_name: Option<&str>,
) -> Result<Fetched, FetchError> {
    let request_error = |source| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(request_error)?;

    let response = client.get(url).send().await.map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let origin = response.url().to_string();
    let suggested = match wanted_name {
        Some(name) => name.to_string(),
        None => suggested_filename(&response),
    };
    let original_name = storage_name(&suggested);

    let bytes = response.bytes().await.map_err(request_error)?;
    let store_error = |source| FetchError::Store {
        url: url.to_string(),
        source,
    };
    std::fs::create_dir_all(download_dir).map_err(store_error)?;
    let path = download_dir.join(&original_name);
    std::fs::write(&path, &bytes).map_err(store_error)?;

    tracing::info!(url = %origin, bytes = bytes.len(), name = %original_name, "Downloaded");

    Ok(Fetched {
        path,
        original_name,
        origin,
    })
}

/// Best filename for a response: Content-Disposition parameter, else the
/// last URL path segment with a content-type extension.
fn suggested_filename(response: &reqwest::Response) -> String {
    let header = |name| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    };

    if let Some(name) = header(CONTENT_DISPOSITION).and_then(disposition_filename) {
        return name;
    }

    let base = response
        .url()
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or("")
        .to_string();
    add_url_extension(base, header(CONTENT_TYPE).unwrap_or(""))
}

/// Confine a suggested name to a single path component. The server picks
/// the filename via Content-Disposition, never where it is written, so
/// separators and dot-dot segments must not survive into the join.
fn storage_name(suggested: &str) -> String {
    let base = suggested.rsplit(['/', '\\']).next().unwrap_or("");
    if base.is_empty() || base == "." || base == ".." {
        "index".to_string()
    } else {
        base.to_string()
    }
}

/// The `filename=` parameter of a Content-Disposition header value.
fn disposition_filename(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| {
            let name = param.strip_prefix("filename=")?;
            Some(name.trim_matches('"').to_string())
        })
        .filter(|name| !name.is_empty())
}

/// Give extensionless download names an extension matching the content type.
fn add_url_extension(mut filename: String, content_type: &str) -> String {
    const EXTENSIONS: &[(&str, &str)] = &[
        ("text/html", ".html"),
        ("application/msword", ".doc"),
        ("application/pdf", ".pdf"),
        ("text/plain", ".txt"),
    ];

    if filename.is_empty() {
        filename.push_str("index");
    }
    for (mime, extension) in EXTENSIONS {
        if content_type.contains(mime) && !filename.ends_with(extension) {
            filename.push_str(extension);
        }
    }
    filename
}
