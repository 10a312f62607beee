use cronkite_core::config::{AuthMode, CronkiteConfig, PROTOCOL_VERSION};
use cronkite_protocol::handshake::{AuthPayload, ConnectParams, HelloOk, ServerInfo};

use crate::app::AppState;

/// Verify client auth against server config.
pub fn verify_auth(params: &ConnectParams, config: &CronkiteConfig) -> Result<(), String> {
    match config.gateway.auth.mode {
        AuthMode::None => Ok(()),

        AuthMode::Token => match &params.auth {
            AuthPayload::Token { token } => {
                if Some(token) == config.gateway.auth.token.as_ref() {
                    Ok(())
                } else {
                    Err("invalid token".to_string())
                }
            }
            _ => Err("expected token auth mode".to_string()),
        },
    }
}

/// Build the `hello-ok` response payload after successful authentication.
/// The snapshot lets clients render the job list without a follow-up request.
pub fn hello_ok_payload(app: &AppState) -> HelloOk {
    HelloOk {
        protocol: PROTOCOL_VERSION,
        server: ServerInfo {
            name: "cronkite".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        snapshot: serde_json::json!({
            "jobs": app.registry.list(),
            "scheduler_running": app.scheduler.is_running(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cronkite_core::config::AuthConfig;

    fn config(mode: AuthMode, token: Option<&str>) -> CronkiteConfig {
        let mut config = CronkiteConfig::default();
        config.gateway.auth = AuthConfig {
            mode,
            token: token.map(String::from),
        };
        config
    }

    fn token_params(token: &str) -> ConnectParams {
        ConnectParams {
            auth: AuthPayload::Token {
                token: token.to_string(),
            },
            client_info: None,
        }
    }

    #[test]
    fn matching_token_is_accepted() {
        let config = config(AuthMode::Token, Some("s3cret"));
        assert!(verify_auth(&token_params("s3cret"), &config).is_ok());
    }

    #[test]
    fn wrong_token_is_rejected() {
        let config = config(AuthMode::Token, Some("s3cret"));
        assert!(verify_auth(&token_params("guess"), &config).is_err());
    }

    #[test]
    fn none_mode_accepts_anything() {
        let config = config(AuthMode::None, None);
        let params = ConnectParams {
            auth: AuthPayload::None,
            client_info: None,
        };
        assert!(verify_auth(&params, &config).is_ok());
        assert!(verify_auth(&token_params("whatever"), &config).is_ok());
    }

    #[test]
    fn token_mode_rejects_none_auth() {
        let config = config(AuthMode::Token, Some("s3cret"));
        let params = ConnectParams {
            auth: AuthPayload::None,
            client_info: None,
        };
        assert!(verify_auth(&params, &config).is_err());
    }
}
