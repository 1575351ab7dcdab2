//! 缴费状态推导 — 全系统唯一出口
//!
//! `payment_status` 是 member.payment_status 的单一事实来源：
//! 任何改动 total_plan_price / total_paid / admission_fee 的写入
//! 之后都必须重新调用，禁止在别处直接赋值状态。

use rust_decimal::Decimal;

use crate::db::models::PaymentStatusTag;
use crate::utils::money::{MONEY_TOLERANCE, to_decimal, to_f64};

/// 应缴 = 套餐价快照 + 入会费；三个输入之外不看任何状态。
///
/// paid: 应缴为 0，或已缴够 (容差 0.01)；unpaid: 分文未缴；其余 partial。
pub fn payment_status(total_plan_price: f64, total_paid: f64, admission_fee: f64) -> PaymentStatusTag {
    let total_due = to_decimal(total_plan_price) + to_decimal(admission_fee);
    let paid = to_decimal(total_paid);

    if total_due <= Decimal::ZERO || paid >= total_due - MONEY_TOLERANCE {
        PaymentStatusTag::Paid
    } else if paid <= Decimal::ZERO {
        PaymentStatusTag::Unpaid
    } else {
        PaymentStatusTag::Partial
    }
}

/// 未缴余额，多缴不出现负数
pub fn balance(total_plan_price: f64, total_paid: f64, admission_fee: f64) -> f64 {
    let total_due = to_decimal(total_plan_price) + to_decimal(admission_fee);
    let paid = to_decimal(total_paid);
    to_f64((total_due - paid).max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_due_is_paid_even_with_no_payment() {
        assert_eq!(payment_status(0.0, 0.0, 0.0), PaymentStatusTag::Paid);
    }

    #[test]
    fn partial_then_paid_scenario() {
        // plan 3000, fee 0
        assert_eq!(payment_status(3000.0, 0.0, 0.0), PaymentStatusTag::Unpaid);
        assert_eq!(payment_status(3000.0, 1000.0, 0.0), PaymentStatusTag::Partial);
        assert_eq!(payment_status(3000.0, 3000.0, 0.0), PaymentStatusTag::Paid);
    }

    #[test]
    fn admission_fee_counts_toward_due() {
        // plan 2000 + fee 500: paying only the plan price is still partial
        assert_eq!(payment_status(2000.0, 2000.0, 500.0), PaymentStatusTag::Partial);
        assert_eq!(payment_status(2000.0, 2500.0, 500.0), PaymentStatusTag::Paid);
    }

    #[test]
    fn overpayment_is_paid() {
        assert_eq!(payment_status(1000.0, 1500.0, 0.0), PaymentStatusTag::Paid);
    }

    #[test]
    fn status_depends_only_on_inputs() {
        // same inputs, same answer, regardless of call order
        let a = payment_status(3000.0, 1000.0, 0.0);
        let b = payment_status(3000.0, 1000.0, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn float_cents_do_not_flip_status() {
        // ten 0.1 payments against a 1.0 due must read as paid
        let paid = crate::utils::money::sum(std::iter::repeat(0.1).take(10));
        assert_eq!(payment_status(1.0, paid, 0.0), PaymentStatusTag::Paid);
    }

    #[test]
    fn balance_never_negative() {
        assert_eq!(balance(1000.0, 1500.0, 0.0), 0.0);
        assert_eq!(balance(3000.0, 1000.0, 0.0), 2000.0);
        assert_eq!(balance(2000.0, 0.0, 500.0), 2500.0);
    }
}
