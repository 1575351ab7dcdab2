//! 标识符解析阶梯 — 自由文本到唯一用户
//!
//! 前台扫码/手输框只有一个输入框，什么都可能进来：业务编号、裸数字、
//! 手机号、名字片段。解析按固定顺序试探，先命中先赢，不打分。
//! 会员优先于教练。

/// 纯数字输入 (候选编号阶梯适用)
pub fn is_numeric(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.chars().all(|c| c.is_ascii_digit())
}

/// 数字输入的候选编号，按试探顺序排列
///
/// 编号按三位零填充铸造 (MEM059)，所以 "59" 要在第二档补零后命中；
/// 最后一档试裸数字本身 (历史导入的非标准编号)。
pub fn candidate_codes(numeric_id: &str, prefix: &str) -> Vec<String> {
    vec![
        format!("{prefix}{numeric_id}"),
        format!("{prefix}0{numeric_id}"),
        format!("{prefix}00{numeric_id}"),
        numeric_id.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_detection() {
        assert!(is_numeric("59"));
        assert!(is_numeric("0012"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("MEM059"));
        assert!(!is_numeric("98 12"));
    }

    #[test]
    fn ladder_orders_padded_codes_before_raw() {
        assert_eq!(
            candidate_codes("59", "MEM"),
            vec!["MEM59", "MEM059", "MEM0059", "59"]
        );
        assert_eq!(
            candidate_codes("5", "TRN"),
            vec!["TRN5", "TRN05", "TRN005", "5"]
        );
    }

    #[test]
    fn three_digit_input_hits_first_rung() {
        // 编号本身就是三位时第一档直接命中
        assert_eq!(candidate_codes("123", "MEM")[0], "MEM123");
    }
}
