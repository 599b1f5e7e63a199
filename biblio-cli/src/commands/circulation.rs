//! Borrow, return, reserve and cancel commands

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{day_or_today, finish, get_context};
use crate::output::{self, format_penalty};

pub fn borrow(copy_id: &str, user_id: &str, date: Option<NaiveDate>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx
        .circulation_service
        .borrow(copy_id, user_id, day_or_today(date));
    finish(result, json, |loan| {
        output::success(&format!("Copy {} lent to {}", copy_id, loan.borrower));
        println!("  Due back by {}", loan.due_on);
    })
}

pub fn return_copy(copy_id: &str, date: Option<NaiveDate>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx
        .circulation_service
        .return_copy(copy_id, day_or_today(date));
    finish(result, json, |receipt| {
        output::success(&format!("Copy {} returned by {}", receipt.copy_id, receipt.borrower));
        if receipt.penalty > Decimal::ZERO {
            output::warning(&format!(
                "OVERDUE: {} day(s), penalty {}",
                receipt.overdue_days,
                format_penalty(receipt.penalty)
            ));
        }
    })
}

pub fn reserve(copy_id: &str, user_id: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.circulation_service.reserve(copy_id, user_id);
    finish(result, json, |copy| {
        output::success(&format!("Copy {} of '{}' reserved for {}", copy.id, copy.title, user_id));
    })
}

pub fn cancel(copy_id: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.circulation_service.cancel_reservation(copy_id);
    finish(result, json, |copy| {
        output::success(&format!("Reservation on copy {} cancelled", copy.id));
    })
}
