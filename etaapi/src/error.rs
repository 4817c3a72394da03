#[derive(thiserror::Error, Debug)]
pub enum EtaError {
    #[error("http transport error: `{0}`")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status} for {url}: `{body}`")]
    ApiRequest {
        status: u16,
        url: String,
        body: String,
    },

    #[error("unsupported ETAtouch REST api version `{detected}`, supported versions: {supported:?}")]
    UnsupportedApiVersion {
        detected: String,
        supported: &'static [&'static str],
    },

    #[error("cannot parse xml: `{0}`")]
    XmlParseError(String),

    #[error("parser error: `{0}`")]
    ParserError(String),

    #[error("updating variable {uri} failed: {source}")]
    UpdateFailed {
        uri: String,
        #[source]
        source: Box<EtaError>,
    },
}

impl EtaError {
    /// The error that caused a variable update to fail, unwrapped from
    /// [`EtaError::UpdateFailed`].
    pub fn root_cause(&self) -> &EtaError {
        match self {
            EtaError::UpdateFailed { source, .. } => source.root_cause(),
            err => err,
        }
    }
}

impl From<quick_xml::Error> for EtaError {
    fn from(err: quick_xml::Error) -> Self {
        EtaError::XmlParseError(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for EtaError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        EtaError::XmlParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EtaError>;
