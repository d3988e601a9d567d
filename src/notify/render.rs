//! Alert message rendering
//!
//! Produces the Telegram HTML body for a decided alert, folding in whatever
//! enrichment fields were available.

use crate::enrich::Enrichment;
use crate::signal::{Alert, AlertKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Render an alert as a Telegram HTML message
pub fn render_alert(alert: &Alert, enrichment: &Enrichment) -> String {
    let (emoji, title) = match alert.kind {
        AlertKind::Entry => ("\u{1F6A8}", "Liquidity entry"),
        AlertKind::Enhancement => ("\u{1F680}", "Liquidity enhancement"),
        AlertKind::ExitWarning => ("\u{26A0}\u{FE0F}", "Exit warning"),
        AlertKind::ExitFinal => ("\u{1F534}", "Final exit"),
    };

    let mut message = format!("{emoji} <b>{title}: {}</b>\n\n", alert.symbol);
    message.push_str(&format!("\u{1F4B0} Price: ${:.2}\n", alert.price));
    let change = alert.percent_change.round_dp(2);
    let sign = if change >= Decimal::ZERO { "+" } else { "" };
    message.push_str(&format!("\u{1F4C8} Change: {sign}{change}%\n"));
    message.push_str(&format!("\u{1F4CA} Volume: {}\n", alert.volume.round()));

    if let Some(fair) = enrichment.fair_value {
        message.push('\n');
        message.push_str(&format!("\u{1F3AF} Fair value: ${fair:.2}\n"));
        if fair > Decimal::ZERO {
            let ratio = (alert.price / fair).round_dp(2);
            let verdict = if ratio < dec!(0.9) {
                "undervalued"
            } else if ratio > dec!(1.1) {
                "overvalued"
            } else {
                "fairly valued"
            };
            message.push_str(&format!("{verdict} at {ratio}x\n"));
        }
    }

    if let Some(rsi) = enrichment.rsi {
        let verdict = if rsi < dec!(30) {
            "oversold"
        } else if rsi > dec!(70) {
            "overbought"
        } else {
            "neutral"
        };
        message.push_str(&format!("\n\u{1F4C9} RSI {rsi} ({verdict})\n"));
    }

    if let (Some(support), Some(resistance)) = (enrichment.support, enrichment.resistance) {
        message.push_str(&format!(
            "\n\u{1F7E2} Support: ${support:.2}\n\u{1F534} Resistance: ${resistance:.2}\n"
        ));
    }

    message.push_str(&format!(
        "\n\u{23F0} {}",
        alert.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    message
}
