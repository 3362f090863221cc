use serde::{Deserialize, Serialize};

/// Query of `POST /refresh`. Both hints are accepted and currently unused.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshQuery {
    pub id_token: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub id_token: String,
}
