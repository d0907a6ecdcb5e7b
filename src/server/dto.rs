use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub nip: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub nip: String,
    pub reset_token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct AssetStatusRequest {
    pub asset_status: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionStatusRequest {
    pub submission_status: String,
}

#[derive(Debug, Deserialize)]
pub struct HashQuery {
    pub hash: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutletListQuery {
    pub area_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAreaRequest {
    pub area_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePositionRequest {
    pub position_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePersonalResponsibleRequest {
    pub personal_name: String,
}

#[derive(Debug, Serialize)]
pub struct SubmissionParentCreated {
    pub submission_parent_id: i64,
}
