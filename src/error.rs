use thiserror::Error;

/// Binance codes for a bad signature (-1022), a malformed key (-2014) and a
/// rejected key, IP or permission set (-2015).
const AUTH_ERROR_CODES: [i64; 3] = [-1022, -2014, -2015];

/// Errors surfaced by the bot, the REST client and order normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BotError {
    /// Session could not be established or validated. Nothing else may run.
    #[error("connection failure: {0}")]
    ConnectionFailure(String),

    /// Symbol precision could not be determined (unknown symbol or fetch failure).
    #[error("precision unavailable for symbol {symbol}")]
    PrecisionUnavailable { symbol: String },

    /// Malformed side/type/quantity/price combination, caught before any request.
    #[error("invalid order: {0}")]
    InvalidOrderSpec(String),

    #[error("price is required for LIMIT orders")]
    MissingPrice,

    /// Application-level error returned by the exchange.
    #[error("exchange rejected request (status {status}, code {code:?}): {message}")]
    ExchangeRejected {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// Network, timeout, server-side or decoding failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl BotError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        BotError::InvalidOrderSpec(msg.into())
    }

    /// Only a failed connection ends the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BotError::ConnectionFailure(_))
    }

    /// The exchange refused the API key, its permissions, or the request
    /// signature. A session with these credentials cannot place orders.
    pub fn is_auth_rejection(&self) -> bool {
        match self {
            BotError::ExchangeRejected { code: Some(code), .. } => AUTH_ERROR_CODES.contains(code),
            BotError::ExchangeRejected { status, code: None, .. } => *status == 401,
            _ => false,
        }
    }

    /// True for errors detected locally, before anything is sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BotError::InvalidOrderSpec(_) | BotError::MissingPrice
        )
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BotError::Transport(format!("request timed out: {err}"))
        } else if err.is_decode() {
            BotError::Transport(format!("failed to decode response: {err}"))
        } else {
            BotError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Transport(format!("failed to parse response: {err}"))
    }
}

pub type Result<T, E = BotError> = std::result::Result<T, E>;
