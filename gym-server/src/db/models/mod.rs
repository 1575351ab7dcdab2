//! Database Models

// Serde helpers
pub mod serde_helpers;

// People
pub mod member;
pub mod trainer;

// Reference data
pub mod plan;

// Finance
pub mod payment;
pub mod trainer_payment;

// Attendance
pub mod attendance;
pub mod trainer_attendance;

// Re-exports
pub use member::{Member, MemberId, MemberRegister, MemberStatus, MemberUpdate, PaymentStatusTag};
pub use trainer::{CommissionType, Trainer, TrainerCreate, TrainerId, TrainerUpdate};
pub use plan::{Plan, PlanCreate, PlanId, PlanUpdate, PtPlan, PtPlanCreate, PtPlanId, PtPlanUpdate};
pub use payment::{
    MembershipAction, Payment, PaymentCategory, PaymentCreate, PaymentId, PaymentState,
    PaymentUpdate, PlanKind,
};
pub use trainer_payment::{TrainerPayment, TrainerPaymentCreate, TrainerPaymentId};
pub use attendance::{Attendance, AttendanceId, AttendanceStatus, UserKind};
pub use trainer_attendance::{TrainerAttendance, TrainerAttendanceId, TrainerDayStatus};
