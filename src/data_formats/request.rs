use serde::{Deserialize, Serialize};

// ----------------- User Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    pub handle: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateDetailsRequest {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
}

// ----------------- Scream Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct ScreamRequest {
    pub body: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentRequest {
    pub body: String,
}
