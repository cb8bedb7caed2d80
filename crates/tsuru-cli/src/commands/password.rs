use anyhow::{bail, Result};
use tsuru_core::auth::read_password;

use super::Context;

pub async fn change(ctx: &mut Context<'_>) -> Result<()> {
    ctx.console.prompt("Current password: ")?;
    let old = read_password(&mut *ctx.console.input)?;
    ctx.console.prompt("\nNew password: ")?;
    let new = read_password(&mut *ctx.console.input)?;
    ctx.console.prompt("\nConfirm: ")?;
    let confirm = read_password(&mut *ctx.console.input)?;
    writeln!(ctx.console.out)?;

    if new != confirm {
        bail!("New password and password confirmation didn't match.");
    }

    ctx.api.change_password(&old, &new).await?;
    writeln!(ctx.console.out, "Password successfully updated!")?;
    Ok(())
}

fn reset_message(token: Option<&str>) -> &'static str {
    match token {
        None => "You've successfully started the password reset process.\n\nPlease check your email.",
        Some(_) => "Your password has been reset and mailed to you.\n\nPlease check your email.",
    }
}

pub async fn reset(ctx: &mut Context<'_>, email: &str, token: Option<&str>) -> Result<()> {
    let token = token.filter(|t| !t.is_empty());
    ctx.api.reset_password(email, token).await?;
    writeln!(ctx.console.out, "{}", reset_message(token))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{block_on, Harness, UNREACHABLE};
    use httpmock::prelude::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        #[test]
        fn property_mismatched_confirmation_never_reaches_the_server(
            old in "[!-~]{1,24}",
            new in "[!-~]{1,24}",
            confirm in "[!-~]{1,24}",
        ) {
            prop_assume!(new != confirm);
            let input = format!("{}\n{}\n{}\n", old, new, confirm);
            let mut h = Harness::new(UNREACHABLE, &input);
            let err = block_on(change(&mut h.context())).unwrap_err();
            prop_assert_eq!(
                err.to_string(),
                "New password and password confirmation didn't match."
            );
        }
    }

    #[tokio::test]
    async fn test_change_password() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/users/password")
                    .json_body(json!({"old": "gopher", "new": "bbrothers"}));
                then.status(200);
            })
            .await;

        let mut h = Harness::new(&server.base_url(), "gopher\nbbrothers\nbbrothers\n");
        change(&mut h.context()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            h.output(),
            "Current password: \nNew password: \nConfirm: \nPassword successfully updated!\n"
        );
    }

    #[tokio::test]
    async fn test_change_password_mismatch_skips_network() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200);
            })
            .await;

        let mut h = Harness::new(&server.base_url(), "gopher\nblood\nsugar\n");
        let err = change(&mut h.context()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "New password and password confirmation didn't match."
        );
        mock.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_reset_password_starts_process() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/users/x@y.com/password");
                then.status(200);
            })
            .await;

        let mut h = Harness::new(&server.base_url(), "");
        reset(&mut h.context(), "x@y.com", None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            h.output(),
            "You've successfully started the password reset process.\n\nPlease check your email.\n"
        );
    }

    #[tokio::test]
    async fn test_reset_password_with_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/users/x@y.com/password")
                    .query_param("token", "abc");
                then.status(200);
            })
            .await;

        let mut h = Harness::new(&server.base_url(), "");
        reset(&mut h.context(), "x@y.com", Some("abc")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            h.output(),
            "Your password has been reset and mailed to you.\n\nPlease check your email.\n"
        );
    }
}
