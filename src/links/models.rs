use serde::{Deserialize, Serialize};

/// Body of the `accounts:sendOobCode` call. `returnOobLink` makes the
/// provider hand the link back instead of emailing it itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OobCodeRequest<'a> {
    pub request_type: &'static str,
    pub email: &'a str,
    pub return_oob_link: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OobCodeResponse {
    pub email: Option<String>,
    pub oob_link: Option<String>,
}
