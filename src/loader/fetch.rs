use std::sync::Arc;

use url::Url;

use crate::assets::image::ImageHandle;
use crate::loader::mailbox::Completion;

/// Result delivered by an [`ImageFetcher`].
pub type FetchOutcome = Result<ImageHandle, FetchError>;

/// Why a fetch failed. Avatars collapse every variant into a single failed state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The fetcher does not handle this URL scheme.
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    /// Local IO failed.
    #[error("io error: {0}")]
    Io(String),
    /// Transport-level failure (connect, TLS, non-success status).
    #[error("network error: {0}")]
    Network(String),
    /// Bytes arrived but are not a decodable image.
    #[error("decode error: {0}")]
    Decode(String),
    /// The transport gave up waiting.
    #[error("timed out")]
    Timeout,
}

/// Capability that turns a URL into an image, asynchronously.
///
/// Implementations must call [`Completion::complete`] exactly once, from any thread. The
/// outcome is applied on the owning thread at the next [`crate::LoadMailbox::pump`].
pub trait ImageFetcher {
    /// Start fetching `url`.
    fn fetch(&self, url: &Url, completion: Completion);
}

impl<F: ImageFetcher + ?Sized> ImageFetcher for Arc<F> {
    fn fetch(&self, url: &Url, completion: Completion) {
        (**self).fetch(url, completion)
    }
}

/// Blocking byte transport run off-thread by [`PooledFetcher`].
pub trait ByteTransport: Send + Sync + 'static {
    /// Fetch the raw bytes behind `url`.
    fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

impl<F> ByteTransport for F
where
    F: Fn(&Url) -> Result<Vec<u8>, FetchError> + Send + Sync + 'static,
{
    fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self(url)
    }
}

/// Runs a blocking [`ByteTransport`] plus image decoding on the rayon global pool.
pub struct PooledFetcher<T> {
    transport: Arc<T>,
}

impl<T: ByteTransport> PooledFetcher<T> {
    /// Wrap `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }
}

impl<T: ByteTransport> ImageFetcher for PooledFetcher<T> {
    fn fetch(&self, url: &Url, completion: Completion) {
        let transport = self.transport.clone();
        let url = url.clone();
        rayon::spawn(move || {
            let outcome = transport.get(&url).and_then(|bytes| decode_fetched(&bytes));
            completion.complete(outcome);
        });
    }
}

/// Reads `file://` URLs on the calling thread.
///
/// The outcome still goes through the mailbox, so the avatar shows its placeholder until the
/// host pumps.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFetcher;

impl FileFetcher {
    fn read(url: &Url) -> FetchOutcome {
        if url.scheme() != "file" {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_owned()));
        }
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::Io(format!("not a local file path: {url}")))?;
        let bytes = std::fs::read(&path)
            .map_err(|e| FetchError::Io(format!("read '{}': {e}", path.display())))?;
        decode_fetched(&bytes)
    }
}

impl ImageFetcher for FileFetcher {
    fn fetch(&self, url: &Url, completion: Completion) {
        completion.complete(Self::read(url));
    }
}

fn decode_fetched(bytes: &[u8]) -> FetchOutcome {
    ImageHandle::decode(bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

#[cfg(feature = "http")]
pub use http::{HttpFetcher, HttpFetcherOpts, HttpTransport};

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use url::Url;

    use super::{ByteTransport, FetchError, PooledFetcher};

    /// Options for [`HttpTransport`].
    #[derive(Clone, Debug)]
    pub struct HttpFetcherOpts {
        /// Whole-request timeout.
        pub timeout: Duration,
        /// `User-Agent` header value.
        pub user_agent: String,
    }

    impl Default for HttpFetcherOpts {
        fn default() -> Self {
            Self {
                timeout: Duration::from_secs(15),
                user_agent: concat!("avatar-kit/", env!("CARGO_PKG_VERSION")).to_owned(),
            }
        }
    }

    impl HttpFetcherOpts {
        /// Return options with a different request timeout.
        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }
    }

    /// Blocking HTTP(S) transport backed by `reqwest`.
    pub struct HttpTransport {
        client: reqwest::blocking::Client,
    }

    impl HttpTransport {
        /// Build a client from `opts`.
        pub fn new(opts: &HttpFetcherOpts) -> Result<Self, FetchError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(opts.timeout)
                .user_agent(opts.user_agent.clone())
                .build()
                .map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl ByteTransport for HttpTransport {
        fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(FetchError::UnsupportedScheme(url.scheme().to_owned()));
            }
            let map_err = |e: reqwest::Error| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Network(e.to_string())
                }
            };
            let resp = self
                .client
                .get(url.clone())
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(map_err)?;
            let bytes = resp.bytes().map_err(map_err)?;
            Ok(bytes.to_vec())
        }
    }

    /// HTTP(S) image fetcher running requests on the rayon pool.
    pub type HttpFetcher = PooledFetcher<HttpTransport>;

    impl PooledFetcher<HttpTransport> {
        /// HTTP fetcher configured by `opts`.
        pub fn http(opts: &HttpFetcherOpts) -> Result<Self, FetchError> {
            Ok(Self::new(HttpTransport::new(opts)?))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/fetch.rs"]
mod tests;
