//! Member Ledger — 会员账本对账
//!
//! 会员的财务视图 (total_paid / payment_status / 周期窗口) 永远从
//! 付款记录推导，不做增量修补：
//!
//! - [`status`] — 缴费状态和余额的纯函数，单一事实来源
//! - [`processor`] — 付款创建/修改/删除的事务化写入，
//!   周期重置和全量重算都在这里
//!
//! 任何绕过本模块直接改会员财务字段的代码都是缺陷。

pub mod processor;
pub mod status;

pub use processor::{LedgerWrite, PaymentProcessor};
pub use status::{balance, payment_status};
