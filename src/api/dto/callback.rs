use serde::Deserialize;

/// Query of `GET /callback`, as sent by the authorization server's redirect.
///
/// On success `code` (+ `state`) is present; on failure `error`
/// (+ `error_description`) is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    /// Echoed back from the authorize request. Not validated.
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}
