//! Account management and password reset

use super::config::{ClientDefaults, Endpoints};
use super::{AuthOptions, ClientError, MovieClient, decode_json, error_from_response};
use crate::types::{
    ChangeNameRequest, ChangePasswordRequest, ResetPasswordRequest, UserEmailRequest,
};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

fn reset_token(body: &Value) -> Option<String> {
    ["token", "accessToken"]
        .iter()
        .find_map(|field| body.get(*field)?.as_str().filter(|token| !token.is_empty()))
        .map(str::to_string)
}

fn validate_reset_code(code: &str) -> Result<&str, ClientError> {
    let code = code.trim();
    if code.len() != ClientDefaults::RESET_CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::Validation(format!(
            "the code must be exactly {} digits",
            ClientDefaults::RESET_CODE_LEN
        )));
    }
    Ok(code)
}

impl MovieClient {
    /// Rename the signed-in user
    pub async fn change_name(&self, name: &str) -> Result<(), ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("name must not be empty".into()));
        }

        let request = self
            .request(Method::PATCH, Endpoints::CHANGE_NAME)
            .json(&ChangeNameRequest { name });
        self.execute_empty(request, AuthOptions::authenticated())
            .await?;

        self.session.update_user(|user| user.name = Some(name.to_string()));
        info!("Name changed");
        Ok(())
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        if old_password.is_empty() || new_password.is_empty() {
            return Err(ClientError::Validation(
                "both the current and the new password are required".into(),
            ));
        }

        let request = self
            .request(Method::PATCH, &Endpoints::change_password(user_id))
            .json(&ChangePasswordRequest {
                old_password,
                new_password,
            });
        self.execute_empty(request, AuthOptions::authenticated())
            .await?;
        info!("Password changed");
        Ok(())
    }

    /// Email a six digit reset code to the account
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ClientError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ClientError::Validation("email must not be empty".into()));
        }

        let request = self
            .request(Method::PATCH, Endpoints::RESET_PASSWORD_REQUEST)
            .json(&UserEmailRequest { email });
        self.execute_empty(request, AuthOptions::authenticated())
            .await
    }

    /// Exchange the emailed code for a single-use reset token
    pub async fn verify_reset_code(&self, user_id: i64, code: &str) -> Result<String, ClientError> {
        let code = validate_reset_code(code)?;

        let request = self
            .request(Method::PATCH, Endpoints::RESET_PASSWORD_VERIFY)
            .query(&[("id", user_id.to_string().as_str()), ("code", code)]);
        let response = self.send(request, AuthOptions::authenticated()).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: Value = decode_json(response).await?;
        debug!("Reset code accepted");
        reset_token(&body).ok_or(ClientError::MissingToken)
    }

    /// Set a new password using a reset token. The reset token replaces the
    /// session token for this one request.
    pub async fn confirm_password_reset(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<(), ClientError> {
        let new_password = new_password.trim();
        if new_password.is_empty() {
            return Err(ClientError::Validation("new password must not be empty".into()));
        }

        let request = self
            .request(Method::PATCH, Endpoints::RESET_PASSWORD_CONFIRM)
            .bearer_auth(reset_token)
            .json(&ResetPasswordRequest { new_password });
        self.execute_empty(request, AuthOptions::public()).await?;
        info!("Password reset");
        Ok(())
    }
}
