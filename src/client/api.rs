use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::auth::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::products::dto::{
    CreateProductRequest, DeleteResponse, ProductResponse, UpdateProductRequest,
};

/// Blocking HTTP client for the inventory API. Holds the base URL and the
/// bearer token of the active session, if any.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            agent: ureq::Agent::new(),
        }
    }

    pub fn with_token(base_url: &str, token: &str) -> Self {
        let mut client = Self::new(base_url);
        client.token = Some(token.to_string());
        client
    }

    fn get(&self, path: &str) -> ureq::Request {
        self.authorized(self.agent.get(&format!("{}{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> ureq::Request {
        self.authorized(self.agent.post(&format!("{}{}", self.base_url, path)))
    }

    fn put(&self, path: &str) -> ureq::Request {
        self.authorized(self.agent.put(&format!("{}{}", self.base_url, path)))
    }

    fn delete(&self, path: &str) -> ureq::Request {
        self.authorized(self.agent.delete(&format!("{}{}", self.base_url, path)))
    }

    fn authorized(&self, req: ureq::Request) -> ureq::Request {
        match &self.token {
            Some(token) => req.set("Authorization", &format!("Bearer {}", token)),
            None => req,
        }
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let resp = self
            .post("/api/auth/register")
            .send_json(RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .map_err(api_error)?;
        Ok(resp.into_json()?)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let resp = self
            .post("/api/auth/login")
            .send_json(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .map_err(api_error)?;
        Ok(resp.into_json()?)
    }

    pub fn list_products(&self) -> Result<Vec<ProductResponse>> {
        let resp = self.get("/api/products").call().map_err(api_error)?;
        Ok(resp.into_json()?)
    }

    pub fn create_product(&self, fields: &CreateProductRequest) -> Result<ProductResponse> {
        let resp = self
            .post("/api/products")
            .send_json(fields)
            .map_err(api_error)?;
        Ok(resp.into_json()?)
    }

    pub fn update_product(
        &self,
        id: Uuid,
        changes: &UpdateProductRequest,
    ) -> Result<ProductResponse> {
        let resp = self
            .put(&format!("/api/products/{}", id))
            .send_json(changes)
            .map_err(api_error)?;
        Ok(resp.into_json()?)
    }

    pub fn delete_product(&self, id: Uuid) -> Result<String> {
        let resp = self
            .delete(&format!("/api/products/{}", id))
            .call()
            .map_err(api_error)?;
        let body: DeleteResponse = resp.into_json()?;
        Ok(body.message)
    }

    pub fn health(&self) -> Result<bool> {
        let resp = self.get("/health").call().map_err(api_error)?;
        let body: serde_json::Value = resp.into_json()?;
        Ok(body["ok"] == true)
    }
}

/// Pull the server's `{"error": message}` body out of an error status,
/// falling back to the raw body text.
fn api_error(err: ureq::Error) -> anyhow::Error {
    match err {
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"].as_str().map(str::to_string))
                .unwrap_or(body);
            anyhow!("server returned {}: {}", code, message)
        }
        e => anyhow!("request failed: {}", e),
    }
}
