//! Operator-facing rendering of the bootstrap report.

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::app::{AccountOutcome, BootstrapReport, Stage};
use crate::domain::OrderBookSnapshot;

#[derive(Tabled)]
struct BookRow {
    side: &'static str,
    price: String,
    amount: String,
    owner: String,
    offer: String,
}

/// Render the final order book as a table, best prices first on each side.
#[must_use]
pub fn render_book(snapshot: &OrderBookSnapshot) -> String {
    let rows: Vec<BookRow> = snapshot
        .bids
        .iter()
        .map(|level| ("bid", level))
        .chain(snapshot.asks.iter().map(|level| ("ask", level)))
        .map(|(side, level)| BookRow {
            side,
            price: level.price.to_string(),
            amount: level.amount.to_string(),
            owner: level.owner.to_string(),
            offer: level.offer_id.to_string(),
        })
        .collect();

    if rows.is_empty() {
        return "order book is empty".to_string();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

fn print_outcome(outcome: &AccountOutcome) {
    let stage = match outcome.stage {
        Stage::Offered => format!("{}", outcome.stage.green()),
        Stage::Failed => format!("{}", outcome.stage.red()),
        _ => format!("{}", outcome.stage.yellow()),
    };
    let mut line = format!("{}: {stage}", outcome.id);
    if outcome.cleared > 0 {
        line.push_str(&format!(" (cleared {})", outcome.cleared));
    }
    if let Some(offer) = &outcome.offer {
        line.push_str(&format!(" offer #{}", offer.id));
    }
    println!("{line}");
    if let Some(err) = &outcome.error {
        println!("  {}", err.red());
    }
}

/// Print the per-account outcomes and the resulting order book.
pub fn print_report(report: &BootstrapReport) {
    println!();
    print_outcome(&report.buyer);
    print_outcome(&report.seller);
    println!();
    match &report.book {
        Some(book) => println!("{}", render_book(book)),
        None => println!("(run aborted before the order book was fetched)"),
    }
}
