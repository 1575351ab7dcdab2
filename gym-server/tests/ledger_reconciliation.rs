//! 会员账本对账的端到端行为
//!
//! Run: cargo test -p gym-server --test ledger_reconciliation

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use gym_server::db::DbService;
use gym_server::db::models::{
    Member, MemberStatus, MembershipAction, PaymentCreate, PaymentState, PaymentStatusTag,
    PaymentUpdate, PlanCreate,
};
use gym_server::db::repository::{
    MemberRepository, PaymentRepository, PlanRepository, RepoError,
};
use gym_server::ledger::PaymentProcessor;
use gym_server::utils::time::now_millis;

const TZ: chrono_tz::Tz = chrono_tz::Asia::Kolkata;

async fn test_db() -> (tempfile::TempDir, Surreal<Db>) {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("test.db");
    let service = DbService::new(path.to_str().unwrap()).await.unwrap();
    (tmp, service.db)
}

fn pending_member(code: &str) -> Member {
    let now = now_millis();
    Member {
        id: None,
        member_id: code.to_string(),
        name: format!("Member {code}"),
        phone: format!("90000{}", &code[3..]),
        email: None,
        address: None,
        photo: None,
        join_date: now,
        status: MemberStatus::Pending,
        plan: None,
        trainer: None,
        pt_plan: None,
        discount: None,
        membership_start: None,
        membership_end: None,
        total_plan_price: 0.0,
        admission_fee: 0.0,
        total_paid: 0.0,
        payment_status: PaymentStatusTag::Paid,
        last_payment_date: None,
        last_payment_amount: None,
        cycle_seq: 0,
        version: 0,
        is_active: true,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

fn payment(member: &Member, amount: f64) -> PaymentCreate {
    PaymentCreate {
        member: member.id.clone().unwrap(),
        amount,
        date: None,
        mode: None,
        category: None,
        plan_kind: None,
        plan: None,
        membership_action: None,
        renewal_plan: None,
        activate_membership: false,
        custom_price: None,
        membership_start: None,
        notes: None,
    }
}

#[tokio::test]
async fn partial_payments_accumulate_to_paid() {
    let (_tmp, db) = test_db().await;
    let members = MemberRepository::new(db.clone());
    let plans = PlanRepository::new(db.clone());
    let processor = PaymentProcessor::new(db.clone(), TZ);

    let plan = plans
        .create(PlanCreate {
            name: "Quarterly".into(),
            price: 3000.0,
            duration_months: 3,
            features: None,
        })
        .await
        .unwrap();
    let member = members.create(pending_member("MEM001")).await.unwrap();

    // 开卡 + 首笔 1000
    let mut first = payment(&member, 1000.0);
    first.activate_membership = true;
    first.plan = plan.id.clone();
    let write = processor.create_payment(first).await.unwrap();

    assert_eq!(write.member.status, MemberStatus::Active);
    assert_eq!(write.member.total_plan_price, 3000.0);
    assert_eq!(write.member.total_paid, 1000.0);
    assert_eq!(write.member.payment_status, PaymentStatusTag::Partial);
    assert_eq!(write.member.cycle_seq, 1);
    assert!(write.member.membership_end.is_some());
    assert_eq!(write.payment.status, PaymentState::Completed);

    // 补齐 2000
    let write = processor
        .create_payment(payment(&write.member, 2000.0))
        .await
        .unwrap();
    assert_eq!(write.member.total_paid, 3000.0);
    assert_eq!(write.member.payment_status, PaymentStatusTag::Paid);
    assert_eq!(write.member.last_payment_amount, Some(2000.0));
}

#[tokio::test]
async fn renewal_resets_cumulative_total() {
    let (_tmp, db) = test_db().await;
    let members = MemberRepository::new(db.clone());
    let plans = PlanRepository::new(db.clone());
    let processor = PaymentProcessor::new(db.clone(), TZ);

    let annual = plans
        .create(PlanCreate {
            name: "Annual".into(),
            price: 5000.0,
            duration_months: 12,
            features: None,
        })
        .await
        .unwrap();
    let quarterly = plans
        .create(PlanCreate {
            name: "Quarterly".into(),
            price: 2000.0,
            duration_months: 3,
            features: None,
        })
        .await
        .unwrap();

    let member = members.create(pending_member("MEM002")).await.unwrap();

    let mut first = payment(&member, 5000.0);
    first.activate_membership = true;
    first.plan = annual.id.clone();
    let write = processor.create_payment(first).await.unwrap();
    assert_eq!(write.member.total_paid, 5000.0);
    assert_eq!(write.member.payment_status, PaymentStatusTag::Paid);

    // 续费换季卡：累计清零重新起算，不是 5000 + 2000
    let mut renewal = payment(&write.member, 2000.0);
    renewal.membership_action = Some(MembershipAction::Renewal);
    renewal.renewal_plan = quarterly.id.clone();
    let write = processor.create_payment(renewal).await.unwrap();

    assert_eq!(write.member.total_paid, 2000.0);
    assert_eq!(write.member.total_plan_price, 2000.0);
    assert_eq!(write.member.payment_status, PaymentStatusTag::Paid);
    assert_eq!(write.member.cycle_seq, 2);
    assert_eq!(write.payment.cycle_seq, 2);
}

#[tokio::test]
async fn admission_fee_counts_toward_first_cycle_only() {
    let (_tmp, db) = test_db().await;
    let members = MemberRepository::new(db.clone());
    let plans = PlanRepository::new(db.clone());
    let processor = PaymentProcessor::new(db.clone(), TZ);

    let plan = plans
        .create(PlanCreate {
            name: "Monthly".into(),
            price: 1000.0,
            duration_months: 1,
            features: None,
        })
        .await
        .unwrap();

    let mut draft = pending_member("MEM003");
    draft.admission_fee = 500.0;
    let member = members.create(draft).await.unwrap();

    // 首周期应缴 1000 + 500
    let mut first = payment(&member, 1000.0);
    first.activate_membership = true;
    first.plan = plan.id.clone();
    let write = processor.create_payment(first).await.unwrap();
    assert_eq!(write.member.payment_status, PaymentStatusTag::Partial);

    let write = processor
        .create_payment(payment(&write.member, 500.0))
        .await
        .unwrap();
    assert_eq!(write.member.payment_status, PaymentStatusTag::Paid);

    // 续费周期不再计入会费：2 期应缴只有套餐价
    let mut renewal = payment(&write.member, 1000.0);
    renewal.membership_action = Some(MembershipAction::Renewal);
    let write = processor.create_payment(renewal).await.unwrap();
    assert_eq!(write.member.admission_fee, 0.0);
    assert_eq!(write.member.payment_status, PaymentStatusTag::Paid);
}

#[tokio::test]
async fn edit_resums_the_whole_cycle() {
    let (_tmp, db) = test_db().await;
    let members = MemberRepository::new(db.clone());
    let plans = PlanRepository::new(db.clone());
    let processor = PaymentProcessor::new(db.clone(), TZ);

    let plan = plans
        .create(PlanCreate {
            name: "Quarterly".into(),
            price: 3000.0,
            duration_months: 3,
            features: None,
        })
        .await
        .unwrap();
    let member = members.create(pending_member("MEM004")).await.unwrap();

    let mut first = payment(&member, 1000.0);
    first.activate_membership = true;
    first.plan = plan.id.clone();
    let first_write = processor.create_payment(first).await.unwrap();
    let second_write = processor
        .create_payment(payment(&first_write.member, 2000.0))
        .await
        .unwrap();
    assert_eq!(second_write.member.payment_status, PaymentStatusTag::Paid);

    // 把第二笔改成 500：重算后回到 partial，总额是重求和不是增量
    let update = PaymentUpdate {
        amount: Some(500.0),
        date: None,
        mode: None,
        category: None,
        status: None,
        notes: None,
    };
    let revised = processor
        .update_payment(second_write.payment.id.as_ref().unwrap(), update)
        .await
        .unwrap();
    assert_eq!(revised.payment.amount, 500.0);
    assert_eq!(revised.member.total_paid, 1500.0);
    assert_eq!(revised.member.payment_status, PaymentStatusTag::Partial);

    // 会员版本号随每次账本写入递增
    let fresh = members
        .find_by_id(member.id.as_ref().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fresh.version, 3);
}

#[tokio::test]
async fn delete_resums_and_can_empty_the_cycle() {
    let (_tmp, db) = test_db().await;
    let members = MemberRepository::new(db.clone());
    let plans = PlanRepository::new(db.clone());
    let payments = PaymentRepository::new(db.clone());
    let processor = PaymentProcessor::new(db.clone(), TZ);

    let plan = plans
        .create(PlanCreate {
            name: "Quarterly".into(),
            price: 3000.0,
            duration_months: 3,
            features: None,
        })
        .await
        .unwrap();
    let member = members.create(pending_member("MEM005")).await.unwrap();

    let mut first = payment(&member, 3000.0);
    first.activate_membership = true;
    first.plan = plan.id.clone();
    let write = processor.create_payment(first).await.unwrap();
    assert_eq!(write.member.payment_status, PaymentStatusTag::Paid);

    let after = processor
        .delete_payment(write.payment.id.as_ref().unwrap())
        .await
        .unwrap();
    assert_eq!(after.total_paid, 0.0);
    assert_eq!(after.payment_status, PaymentStatusTag::Unpaid);

    // 流水确实没了
    let gone = payments
        .find_by_id(write.payment.id.as_ref().unwrap())
        .await
        .unwrap();
    assert!(gone.is_none());

    // 再删一次 → NotFound
    let err = processor
        .delete_payment(write.payment.id.as_ref().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn create_rejects_bad_targets_and_amounts() {
    let (_tmp, db) = test_db().await;
    let members = MemberRepository::new(db.clone());
    let processor = PaymentProcessor::new(db.clone(), TZ);

    // 幽灵会员
    let ghost = pending_member("MEM404");
    let mut req = payment(&ghost, 100.0);
    req.member = surrealdb::RecordId::from_table_key("member", "missing");
    let err = processor.create_payment(req).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    // 软删除会员不再收款
    let member = members.create(pending_member("MEM006")).await.unwrap();
    members
        .soft_delete(member.id.as_ref().unwrap())
        .await
        .unwrap();
    let err = processor
        .create_payment(payment(&member, 100.0))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    // 非法金额
    let member2 = members.create(pending_member("MEM007")).await.unwrap();
    for bad in [0.0, -10.0, f64::NAN] {
        let err = processor
            .create_payment(payment(&member2, bad))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)), "amount {bad}");
    }
}

#[tokio::test]
async fn receipts_are_unique_per_payment() {
    let (_tmp, db) = test_db().await;
    let members = MemberRepository::new(db.clone());
    let plans = PlanRepository::new(db.clone());
    let processor = PaymentProcessor::new(db.clone(), TZ);

    let plan = plans
        .create(PlanCreate {
            name: "Monthly".into(),
            price: 1000.0,
            duration_months: 1,
            features: None,
        })
        .await
        .unwrap();
    let member = members.create(pending_member("MEM008")).await.unwrap();

    let mut first = payment(&member, 200.0);
    first.activate_membership = true;
    first.plan = plan.id.clone();
    let a = processor.create_payment(first).await.unwrap();
    let b = processor
        .create_payment(payment(&a.member, 300.0))
        .await
        .unwrap();

    assert!(a.payment.receipt_number.starts_with("RCP"));
    assert_ne!(a.payment.receipt_number, b.payment.receipt_number);
}
