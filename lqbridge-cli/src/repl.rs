//! The line protocol.
//!
//! One request per line: a method name, optionally followed by a JSON
//! argument document.
//!
//! ```text
//! getInfo {"withScan": false}
//! prepareSendPayment {"invoice": "lnbcrt5000n1..."}
//! listPayments
//! subscribe
//! ```
//!
//! Replies are `ok <json>` or `error <code>: <message>`. Deliveries are
//! printed as `<topic> <json>` whenever they arrive. `subscribe` registers
//! an event listener and `quit` ends the session.

use std::io::Write as _;

use lqbridge::proto::WireValue;
use lqbridge::{BridgeFailure, Delivery, LiquidBridge};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Blank line or `#` comment.
    Empty,
    /// `quit` / `exit`.
    Quit,
    /// Register a listener printing domain events.
    Subscribe,
    /// Any other method, routed through the bridge.
    Call {
        /// Host method name.
        method: String,
        /// Argument document, `Null` when omitted.
        args: WireValue,
    },
}

/// A line that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid arguments for {method}: {source}")]
pub struct CommandError {
    method: String,
    #[source]
    source: serde_json::Error,
}

/// Parses one input line.
///
/// # Errors
///
/// [`CommandError`] when the argument text is not JSON.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Command::Empty);
    }
    let (method, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(method, rest)| (method, rest.trim()));
    match method {
        "quit" | "exit" => return Ok(Command::Quit),
        "subscribe" => return Ok(Command::Subscribe),
        _ => {}
    }
    let args = if rest.is_empty() {
        WireValue::Null
    } else {
        serde_json::from_str::<serde_json::Value>(rest)
            .map(WireValue::from)
            .map_err(|source| CommandError {
                method: method.to_owned(),
                source,
            })?
    };
    Ok(Command::Call {
        method: method.to_owned(),
        args,
    })
}

/// Formats an operation result as a reply line.
#[must_use]
pub fn format_reply(result: &Result<WireValue, BridgeFailure>) -> String {
    match result {
        Ok(value) => format!("ok {value}"),
        Err(failure) => format!("error {failure}"),
    }
}

/// Prints a delivery to stdout.
pub fn print_delivery(delivery: Delivery) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{} {}", delivery.topic, delivery.payload);
}

/// Reads requests from `input` until it closes, `quit` is read or
/// `shutdown` is cancelled, writing one reply line per request.
///
/// # Errors
///
/// I/O errors from `input` or `output`.
pub async fn run<R, W>(
    bridge: &LiquidBridge,
    input: R,
    mut output: W,
    shutdown: &CancellationToken,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            () = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };

        let reply = match parse_command(&line) {
            Ok(Command::Empty) => continue,
            Ok(Command::Quit) => break,
            Ok(Command::Subscribe) => format_reply(&bridge.add_event_listener(print_delivery).await),
            Ok(Command::Call { method, args }) => {
                tracing::debug!(%method, "dispatching");
                format_reply(&bridge.dispatch(&method, &args).await)
            }
            Err(err) => format!("error {err}"),
        };
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use lqbridge::simulated::SimulatedConnector;
    use serde_json::json;
    use tokio::io::BufReader;

    use super::*;

    #[test]
    fn parses_methods_and_arguments() {
        assert_eq!(parse_command("   ").unwrap(), Command::Empty);
        assert_eq!(parse_command("# note").unwrap(), Command::Empty);
        assert_eq!(parse_command("exit").unwrap(), Command::Quit);
        assert_eq!(parse_command("subscribe").unwrap(), Command::Subscribe);
        assert_eq!(
            parse_command("sync").unwrap(),
            Command::Call {
                method: "sync".into(),
                args: WireValue::Null
            }
        );
        assert_eq!(
            parse_command("getInfo  {\"withScan\": true}").unwrap(),
            Command::Call {
                method: "getInfo".into(),
                args: WireValue::from(json!({"withScan": true}))
            }
        );
    }

    #[test]
    fn bad_json_names_the_method() {
        let err = parse_command("getInfo {withScan}").unwrap_err();
        assert!(err.to_string().starts_with("invalid arguments for getInfo"));
    }

    async fn session(script: &str) -> String {
        let bridge = LiquidBridge::new(SimulatedConnector::with_balance(50_000));
        let mut output = Vec::new();
        run(
            &bridge,
            BufReader::new(script.as_bytes()),
            &mut output,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn replies_line_by_line() {
        let script = concat!(
            "getInfo {\"withScan\": false}\n",
            "connect {\"mnemonic\": \"a b c d e f g h i j k l\", \"network\": \"REGTEST\"}\n",
            "\n",
            "getInfo {\"withScan\": false}\n",
            "quit\n",
            "sync\n",
        );
        let output = session(script).await;
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(
            lines,
            [
                "error NotInitialized: Not initialized",
                "ok {\"status\":\"ok\"}",
                lines[2],
            ]
        );
        assert!(lines[2].starts_with("ok {\"balanceSat\":50000.0,"));
    }

    #[tokio::test]
    async fn reports_parse_errors_and_keeps_going() {
        let output = session("getInfo {nope\nfrobnicate\n").await;
        let lines: Vec<_> = output.lines().collect();
        assert!(lines[0].starts_with("error invalid arguments for getInfo"));
        assert_eq!(lines[1], "error Generic: Unknown method frobnicate");
    }

    #[tokio::test]
    async fn stops_when_cancelled() {
        let bridge = LiquidBridge::new(SimulatedConnector::default());
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let (_writer, reader) = tokio::io::duplex(64);
        let mut output = Vec::new();
        run(&bridge, BufReader::new(reader), &mut output, &shutdown)
            .await
            .unwrap();
        assert!(output.is_empty());
    }
}
