use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::lookup::report::{self, CHECKING, GREETING};
use crate::lookup::{validate, FailureKind, Imei, LookupOutcome, Resolver};
use crate::telegram::client::{BotClient, TelegramError};

/// What to do with one inbound text message.
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Greet,
    Ignore,
    Lookup(&'a str),
}

pub fn route(text: &str) -> Route<'_> {
    let text = text.trim();
    match text.strip_prefix('/') {
        Some(command) => {
            // "/start@SomeBot payload" -> "start"
            let name = command
                .split(|c: char| c.is_whitespace() || c == '@')
                .next()
                .unwrap_or_default();
            match name {
                "start" | "help" => Route::Greet,
                _ => Route::Ignore,
            }
        }
        None => Route::Lookup(text),
    }
}

/// Runs one message through validate, resolve and format, replying as it goes.
pub async fn handle_text<R: Resolver>(
    bot: &BotClient,
    resolver: &Arc<R>,
    chat_id: i64,
    text: &str,
) -> Result<(), TelegramError> {
    let candidate = match route(text) {
        Route::Greet => {
            bot.send_message(chat_id, GREETING).await?;
            return Ok(());
        }
        Route::Ignore => {
            debug!(chat_id, "Ignoring command");
            return Ok(());
        }
        Route::Lookup(candidate) => candidate,
    };

    let imei = match validate(candidate) {
        Ok(imei) => imei,
        Err(failure) => {
            bot.send_message(chat_id, &report::format_failure(&failure))
                .await?;
            return Ok(());
        }
    };

    bot.send_message(chat_id, CHECKING).await?;
    let outcome = resolve_isolated(Arc::clone(resolver), imei).await;
    bot.send_message(chat_id, &report::format(&outcome)).await?;

    Ok(())
}

/// Resolves on its own task so a panic becomes an InternalError reply.
/// Dropping the returned future aborts the lookup.
async fn resolve_isolated<R: Resolver>(resolver: Arc<R>, imei: Imei) -> LookupOutcome {
    let mut task = JoinSet::new();
    task.spawn(async move { resolver.resolve(&imei).await });

    match task.join_next().await {
        Some(Ok(outcome)) => outcome,
        Some(Err(err)) => {
            error!(error = %err, "Lookup task failed");
            LookupOutcome::failure(FailureKind::InternalError, err.to_string())
        }
        None => LookupOutcome::failure(FailureKind::InternalError, "lookup task vanished"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_commands_and_text() {
        assert_eq!(route("/start"), Route::Greet);
        assert_eq!(route("/help@ImeiBot"), Route::Greet);
        assert_eq!(route("  /start now "), Route::Greet);
        assert_eq!(route("/settings"), Route::Ignore);
        assert_eq!(route(" 123456789012345\n"), Route::Lookup("123456789012345"));
        assert_eq!(route("hello"), Route::Lookup("hello"));
    }

    struct Panicking;

    impl Resolver for Panicking {
        fn source_name(&self) -> &'static str {
            "panicking"
        }

        async fn resolve(&self, _imei: &Imei) -> LookupOutcome {
            panic!("boom")
        }
    }

    struct Fixed;

    impl Resolver for Fixed {
        fn source_name(&self) -> &'static str {
            "fixed"
        }

        async fn resolve(&self, _imei: &Imei) -> LookupOutcome {
            LookupOutcome::brand_model("Acme", "X1")
        }
    }

    #[tokio::test]
    async fn panicking_resolver_becomes_internal_error() {
        let imei = validate("123456789012345").unwrap();
        let outcome = resolve_isolated(Arc::new(Panicking), imei).await;
        assert!(matches!(
            outcome,
            LookupOutcome::Failure(ref f) if f.kind == FailureKind::InternalError
        ));
        assert_eq!(
            report::format(&outcome),
            "❌ Sorry, something went wrong while checking this IMEI."
        );
    }

    #[tokio::test]
    async fn isolated_resolve_returns_outcome() {
        let imei = validate("123456789012345").unwrap();
        assert_eq!(
            resolve_isolated(Arc::new(Fixed), imei).await,
            LookupOutcome::brand_model("Acme", "X1")
        );
    }
}
