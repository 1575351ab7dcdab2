//! 提成纯函数
//!
//! fixed: 在册私教人数 × 单价; percentage: 私教套餐营收 × 比例。
//! 提成取整到元，应发 = 底薪 + 提成。

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::db::models::CommissionType;
use crate::utils::money;

/// 提成金额 (已取整到元)
pub fn commission(
    commission_type: CommissionType,
    commission_value: f64,
    client_count: usize,
    pt_prices: &[f64],
) -> f64 {
    let value = money::to_decimal(commission_value);
    let raw = match commission_type {
        CommissionType::Fixed => Decimal::from(client_count as u64) * value,
        CommissionType::Percentage => {
            let revenue: Decimal = pt_prices.iter().map(|p| money::to_decimal(*p)).sum();
            revenue * value / Decimal::from(100)
        }
    };
    raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// 应发工资
pub fn total_payable(base_salary: f64, commission: f64) -> f64 {
    money::to_f64(money::to_decimal(base_salary) + money::to_decimal(commission))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_commission_scales_with_client_count() {
        let c = commission(CommissionType::Fixed, 200.0, 3, &[]);
        assert_eq!(c, 600.0);
        assert_eq!(total_payable(5000.0, c), 5600.0);
    }

    #[test]
    fn fixed_commission_ignores_prices() {
        let c = commission(CommissionType::Fixed, 150.0, 2, &[9999.0, 9999.0]);
        assert_eq!(c, 300.0);
    }

    #[test]
    fn percentage_commission_sums_pt_revenue() {
        // 10% of 3000 + 2000
        let c = commission(CommissionType::Percentage, 10.0, 2, &[3000.0, 2000.0]);
        assert_eq!(c, 500.0);
        assert_eq!(total_payable(4000.0, c), 4500.0);
    }

    #[test]
    fn percentage_commission_rounds_to_whole_units() {
        // 7.5% of 1999 = 149.925 → 150
        let c = commission(CommissionType::Percentage, 7.5, 1, &[1999.0]);
        assert_eq!(c, 150.0);
    }

    #[test]
    fn no_clients_means_no_commission() {
        assert_eq!(commission(CommissionType::Fixed, 200.0, 0, &[]), 0.0);
        assert_eq!(commission(CommissionType::Percentage, 10.0, 0, &[]), 0.0);
        assert_eq!(total_payable(3500.0, 0.0), 3500.0);
    }
}
