//! Resume text extraction
//!
//! Downloads the resume and extracts its text when the body is plain text or
//! a PDF. Other binary documents yield no text.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Upper bound on resume bodies we are willing to buffer.
const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ResumeFetchError {
    #[error("resume URL '{0}' cannot be resolved to an http(s) URL")]
    UnsupportedUrl(String),
    #[error("resume host returned status {0}")]
    Status(u16),
    #[error("resume content type '{0}' is not extractable")]
    UnsupportedContentType(String),
    #[error("resume body exceeds {MAX_RESUME_BYTES} bytes")]
    TooLarge,
    #[error("resume body is not valid UTF-8")]
    NotUtf8,
    #[error("PDF text extraction failed: {0}")]
    Pdf(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// How a resume body is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Text,
    Pdf,
}

/// Pick the extractor from the declared content type, falling back to the
/// PDF signature for hosts that serve everything as octet-stream.
pub fn resume_format(content_type: &str, body_prefix: &[u8]) -> Option<ResumeFormat> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if mime == "application/pdf" || body_prefix.starts_with(PDF_MAGIC) {
        Some(ResumeFormat::Pdf)
    } else if mime.starts_with("text/")
        || mime == "application/json"
        || mime == "application/xml"
        || mime.ends_with("+json")
        || mime.ends_with("+xml")
    {
        Some(ResumeFormat::Text)
    } else {
        None
    }
}

/// Absolute http(s) URLs are used as-is; relative ones (`/uploads/cv.pdf`)
/// are joined onto `base` when one is configured.
pub fn resolve_resume_url(raw: &str, base: Option<&Url>) -> Result<Url, ResumeFetchError> {
    let unsupported = || ResumeFetchError::UnsupportedUrl(raw.to_string());
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            base.ok_or_else(unsupported)?.join(raw).map_err(|_| unsupported())?
        }
        Err(_) => return Err(unsupported()),
    };
    if matches!(url.scheme(), "http" | "https") {
        Ok(url)
    } else {
        Err(unsupported())
    }
}

/// Fetch a resume and return its text, or `Ok(None)` when nothing readable
/// was in it.
pub async fn fetch_resume_text(
    client: &reqwest::Client,
    url: Url,
    timeout: Duration,
) -> Result<Option<String>, ResumeFetchError> {
    let response = client.get(url).timeout(timeout).send().await?;
    if !response.status().is_success() {
        return Err(ResumeFetchError::Status(response.status().as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if response
        .content_length()
        .is_some_and(|len| len as usize > MAX_RESUME_BYTES)
    {
        return Err(ResumeFetchError::TooLarge);
    }

    let bytes = response.bytes().await?;
    if bytes.len() > MAX_RESUME_BYTES {
        return Err(ResumeFetchError::TooLarge);
    }

    let text = match resume_format(&content_type, &bytes) {
        Some(ResumeFormat::Text) => {
            String::from_utf8(bytes.to_vec()).map_err(|_| ResumeFetchError::NotUtf8)?
        }
        Some(ResumeFormat::Pdf) => extract_pdf_text(bytes.to_vec()).await?,
        None => return Err(ResumeFetchError::UnsupportedContentType(content_type)),
    };
    Ok(normalize_whitespace(&text))
}

/// PDF parsing is CPU-bound and may panic on hostile input, so it runs on the
/// blocking pool and a panic is reported as an extraction failure.
async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, ResumeFetchError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|join_err| ResumeFetchError::Pdf(join_err.to_string()))?
        .map_err(|err| ResumeFetchError::Pdf(err.to_string()))
}

fn normalize_whitespace(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}
