//! Terminal rendering for ledger records.

use chrono::{DateTime, Utc};
use colored::Colorize;
use ftgp_core::deposit::DepositRecord;
use ftgp_core::loan::LoanRecord;
use ftgp_core::operation::OperationPhase;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn deposits(records: &[DepositRecord]) {
    if records.is_empty() {
        println!("{}", "No deposits found".bright_black());
        return;
    }

    println!(
        "{}",
        format!(
            "{:>4}  {:>14}  {:<16}  {:<9}  {:<6}  {:<16}  {}",
            "ID", "Amount", "Start", "Period", "Rate", "Maturity", "Status"
        )
        .bold()
    );
    for record in records {
        let rate = match record.rate_label() {
            Ok(rate) => rate,
            Err(e) => {
                println!("{}", format!("  deposit {}: {}", record.id, e).red());
                "?".to_string()
            }
        };
        let status = if record.withdrawn {
            "Withdrawn".bright_black()
        } else {
            "Active".bright_green()
        };
        println!(
            "{:>4}  {:>14}  {:<16}  {:<9}  {:<6}  {:<16}  {}",
            record.id,
            record.principal.to_display_2dp(),
            format_time(record.start_datetime()),
            record.period_label(),
            rate,
            format_time(record.maturity_datetime()),
            status
        );
    }
}

pub fn loan(loan: &LoanRecord) {
    println!("{}", "Active loan".bold());
    println!("  Collateral:   {} ETH", loan.collateral.to_display_2dp());
    println!("  Principal:    {} FTGP", loan.principal.to_display_2dp());
    println!("  Started:      {}", format_time(loan.start_datetime()));
    println!("  Due:          {} FTGP", loan.repayment_due.to_display_2dp());
    println!(
        "  Installment:  {} FTGP / month",
        loan.monthly_installment.to_display_2dp()
    );
    println!("  Repaid:       {} FTGP", loan.repaid.to_display_2dp());
    println!("  Outstanding:  {} FTGP", loan.outstanding().to_display_2dp());
}

pub fn phase(phase: OperationPhase) -> Option<String> {
    match phase {
        OperationPhase::Submitted(kind) => Some(format!("{} submitted", kind)),
        OperationPhase::Confirming(kind) => Some(format!("waiting for {} confirmation", kind)),
        _ => None,
    }
}
