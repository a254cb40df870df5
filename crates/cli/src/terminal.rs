//! Terminal presentation: the session-expiry notice and value formatting

use async_trait::async_trait;
use oak_http::{Navigator, Notifier};
use std::io::IsTerminal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Prints the expiry notice and, on an interactive terminal, waits for Enter
pub struct TerminalNotifier;

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn notify(&self, title: &str, text: &str) {
        eprintln!("\n!! {title}\n   {text}");

        if !std::io::stdin().is_terminal() {
            return;
        }

        eprintln!("   Press Enter to continue.");
        let mut line = String::new();
        let _ = BufReader::new(tokio::io::stdin()).read_line(&mut line).await;
    }
}

/// The login screen of a command-line client is `oak login`
pub struct LoginRedirect;

impl Navigator for LoginRedirect {
    fn navigate(&self, route: &str) {
        info!(route, "Returning to login");
        eprintln!("   Session cleared. Run `oak login` to start a new one.");
    }
}

/// Brazilian real formatting: `R$ 15.780,50`
pub fn format_brl(value: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();

    let units = (cents / 100).to_string();
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{sign}R$ {grouped},{:02}", cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brl_grouping() {
        assert_eq!(format_brl(15_780.5), "R$ 15.780,50");
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(999.999), "R$ 1.000,00");
        assert_eq!(format_brl(1_234_567.89), "R$ 1.234.567,89");
        assert_eq!(format_brl(-12.3), "-R$ 12,30");
    }
}
