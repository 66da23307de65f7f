mod common;

use anyhow::Result;
use reqwest::StatusCode;

use insurai_api::auth::{generate_jwt, Claims};

// Both this process and the spawned server resolve the same config, so
// tokens minted here verify against the server's secret.
fn token_for(role: &str) -> Result<String> {
    let claims = Claims::new(format!("{}@insurai.test", role.to_lowercase()), role.to_string(), 1);
    Ok(generate_jwt(claims)?)
}

fn status_body() -> serde_json::Value {
    serde_json::json!({ "role": "EMPLOYEE", "id": 1, "status": "ACTIVE" })
}

#[tokio::test]
async fn admin_roles_pass_the_role_check() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for role in ["HR", "ADMIN"] {
        let res = client
            .put(format!("{}/admin/users/status", server.base_url))
            .bearer_auth(token_for(role)?)
            .json(&status_body())
            .send()
            .await?;

        // Authentication and authorization both cleared; whatever happens
        // next is the handler's business (without a database this is a 5xx)
        assert_ne!(res.status(), StatusCode::UNAUTHORIZED, "role {}", role);
        assert_ne!(res.status(), StatusCode::FORBIDDEN, "role {}", role);
    }
    Ok(())
}

#[tokio::test]
async fn non_admin_roles_are_forbidden() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for role in ["EMPLOYEE", "AGENT"] {
        let res = client
            .put(format!("{}/admin/users/status", server.base_url))
            .bearer_auth(token_for(role)?)
            .json(&status_body())
            .send()
            .await?;

        assert_eq!(res.status(), StatusCode::FORBIDDEN, "role {}", role);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["code"], "FORBIDDEN");
    }
    Ok(())
}

#[tokio::test]
async fn garbage_tokens_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .put(format!("{}/admin/users/status", server.base_url))
        .bearer_auth("not.a.jwt")
        .json(&status_body())
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
