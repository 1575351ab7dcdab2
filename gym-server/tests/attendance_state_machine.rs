//! 签到状态机与标识符解析的端到端行为
//!
//! Run: cargo test -p gym-server --test attendance_state_machine

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use gym_server::attendance::AttendanceEngine;
use gym_server::db::DbService;
use gym_server::db::models::{
    AttendanceStatus, Member, MemberStatus, PaymentStatusTag, TrainerCreate, TrainerDayStatus,
    UserKind,
};
use gym_server::db::repository::attendance::AttendanceCheckIn;
use gym_server::db::repository::{
    AttendanceRepository, MemberRepository, RepoError, TrainerAttendanceRepository,
    TrainerRepository,
};
use gym_server::utils::time::{DAY_MS, MINUTE_MS, day_bucket_millis, now_millis};

const TZ: chrono_tz::Tz = chrono_tz::Asia::Kolkata;

async fn test_db() -> (tempfile::TempDir, Surreal<Db>) {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("test.db");
    let service = DbService::new(path.to_str().unwrap()).await.unwrap();
    (tmp, service.db)
}

async fn seed_member(db: &Surreal<Db>, code: &str, phone: &str, name: &str) -> Member {
    let now = now_millis();
    let member = Member {
        id: None,
        member_id: code.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        email: None,
        address: None,
        photo: None,
        join_date: now,
        status: MemberStatus::Active,
        plan: None,
        trainer: None,
        pt_plan: None,
        discount: None,
        membership_start: Some(now),
        membership_end: Some(now + 30 * DAY_MS),
        total_plan_price: 1000.0,
        admission_fee: 0.0,
        total_paid: 1000.0,
        payment_status: PaymentStatusTag::Paid,
        last_payment_date: Some(now),
        last_payment_amount: Some(1000.0),
        cycle_seq: 1,
        version: 1,
        is_active: true,
        notes: None,
        created_at: now,
        updated_at: now,
    };
    MemberRepository::new(db.clone()).create(member).await.unwrap()
}

async fn seed_trainer(db: &Surreal<Db>, code: &str, phone: &str, name: &str) -> RecordId {
    let trainer = TrainerRepository::new(db.clone())
        .create(
            code.to_string(),
            TrainerCreate {
                name: name.to_string(),
                phone: phone.to_string(),
                email: None,
                photo: None,
                specialization: None,
                join_date: None,
                base_salary: Some(20000.0),
                commission_type: None,
                commission_value: None,
            },
        )
        .await
        .unwrap();
    trainer.id.unwrap()
}

#[tokio::test]
async fn checkout_stamps_rounded_duration() {
    let (_tmp, db) = test_db().await;
    let repo = AttendanceRepository::new(db.clone());
    let member = seed_member(&db, "MEM001", "9876500001", "Ravi Kumar").await;
    let user = member.id.unwrap();

    // 签到 90 分钟前，签退多出 20 秒，取整仍是 90
    let t0 = now_millis() - 90 * MINUTE_MS;
    let record = repo
        .check_in(
            AttendanceCheckIn {
                user: user.clone(),
                user_kind: UserKind::Member,
                date: day_bucket_millis(t0, TZ),
                time: t0,
                photo: None,
                self_service: false,
            },
            false,
        )
        .await
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::CheckedIn);
    assert!(record.check_out_time.is_none());

    let closed = repo
        .check_out(record.id.as_ref().unwrap(), t0 + 90 * MINUTE_MS + 20_000, None)
        .await
        .unwrap();
    assert_eq!(closed.status, AttendanceStatus::CheckedOut);
    assert_eq!(closed.duration_minutes, Some(90));
    assert!(closed.check_out_time.is_some());
}

#[tokio::test]
async fn one_active_record_per_user() {
    let (_tmp, db) = test_db().await;
    let engine = AttendanceEngine::new(db.clone(), TZ);
    let member = seed_member(&db, "MEM002", "9876500002", "Priya Singh").await;
    let user = member.id.unwrap();

    engine
        .check_in(user.clone(), UserKind::Member, None, false)
        .await
        .unwrap();

    // 活动记录未闭合，再签到被拦
    let err = engine
        .check_in(user.clone(), UserKind::Member, None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    let closed = engine.check_out_user(&user, None).await.unwrap();
    assert_eq!(closed.status, AttendanceStatus::CheckedOut);

    // 前台代签不按日去重：闭合后当天可以再来一次
    engine
        .check_in(user.clone(), UserKind::Member, None, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn self_service_is_once_per_day() {
    let (_tmp, db) = test_db().await;
    let engine = AttendanceEngine::new(db.clone(), TZ);
    let member = seed_member(&db, "MEM003", "9876500003", "Arjun Mehta").await;
    let user = member.id.unwrap();

    let record = engine
        .check_in(
            user.clone(),
            UserKind::Member,
            Some("/photos/abc.jpg".to_string()),
            true,
        )
        .await
        .unwrap();
    assert!(record.self_service);
    assert_eq!(record.check_in_photo.as_deref(), Some("/photos/abc.jpg"));

    engine.check_out_user(&user, None).await.unwrap();

    // 已有当日记录 (即使已签退)，自助再签被拦
    let err = engine
        .check_in(
            user.clone(),
            UserKind::Member,
            Some("/photos/abc.jpg".to_string()),
            true,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    // 前台代签不受按日去重限制
    engine
        .check_in(user, UserKind::Member, None, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn auto_checkout_is_idempotent() {
    let (_tmp, db) = test_db().await;
    let engine = AttendanceEngine::new(db.clone(), TZ);
    let repo = AttendanceRepository::new(db.clone());

    let member = seed_member(&db, "MEM004", "9876500004", "Neha Patel").await;
    let m_user = member.id.unwrap();
    let t_user = seed_trainer(&db, "TRN001", "9876500101", "Bikram Das").await;

    engine
        .check_in(m_user.clone(), UserKind::Member, None, false)
        .await
        .unwrap();
    engine
        .check_in(t_user.clone(), UserKind::Trainer, None, false)
        .await
        .unwrap();

    assert_eq!(engine.auto_checkout().await.unwrap(), 2);
    assert_eq!(engine.auto_checkout().await.unwrap(), 0);

    assert!(repo.find_active_by_user(&m_user).await.unwrap().is_none());
    assert!(repo.find_active_by_user(&t_user).await.unwrap().is_none());

    let day = day_bucket_millis(now_millis(), TZ);
    let records = repo.find_by_user_and_date(&m_user, day).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendanceStatus::CheckedOut);
    assert!(records[0].duration_minutes.unwrap() >= 0);
}

#[tokio::test]
async fn checkout_rejections() {
    let (_tmp, db) = test_db().await;
    let engine = AttendanceEngine::new(db.clone(), TZ);
    let repo = AttendanceRepository::new(db.clone());
    let member = seed_member(&db, "MEM005", "9876500005", "Sanjay Rao").await;
    let user = member.id.unwrap();

    // 不存在的记录
    let missing = RecordId::from_table_key("attendance", "missing");
    let err = repo.check_out(&missing, now_millis(), None).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    // 无活动记录的用户
    let err = engine.check_out_user(&user, None).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    // 重复签退
    let record = engine
        .check_in(user.clone(), UserKind::Member, None, false)
        .await
        .unwrap();
    let id = record.id.unwrap();
    engine.check_out_record(&id, None).await.unwrap();
    let err = engine.check_out_record(&id, None).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[tokio::test]
async fn identifier_ladder_resolves_members_then_trainers() {
    let (_tmp, db) = test_db().await;
    let engine = AttendanceEngine::new(db.clone(), TZ);
    seed_member(&db, "MEM059", "9876500059", "Asha Verma").await;
    seed_trainer(&db, "TRN007", "9876500777", "Bikram Das").await;

    // 裸数字经零填充命中 MEM059
    let hit = engine.resolve("59").await.unwrap();
    assert_eq!(hit.kind, UserKind::Member);
    assert_eq!(hit.member.unwrap().member_id, "MEM059");

    // 手机号
    let hit = engine.resolve("9876500059").await.unwrap();
    assert_eq!(hit.kind, UserKind::Member);

    // 编号大小写不敏感
    let hit = engine.resolve("mem059").await.unwrap();
    assert_eq!(hit.member.unwrap().member_id, "MEM059");

    // 姓名子串
    let hit = engine.resolve("asha").await.unwrap();
    assert_eq!(hit.member.unwrap().name, "Asha Verma");

    // 会员全部不中才轮到教练编号阶梯
    let hit = engine.resolve("7").await.unwrap();
    assert_eq!(hit.kind, UserKind::Trainer);
    assert_eq!(hit.trainer.unwrap().trainer_id, "TRN007");

    let err = engine.resolve("").await.unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    let err = engine.resolve("nobody-here").await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn lookup_reports_live_attendance_state() {
    let (_tmp, db) = test_db().await;
    let engine = AttendanceEngine::new(db.clone(), TZ);
    let member = seed_member(&db, "MEM060", "9876500060", "Kiran Joshi").await;
    let user = member.id.unwrap();

    let before = engine.lookup("60").await.unwrap();
    assert!(!before.currently_checked_in);
    assert!(!before.has_record_today);
    assert_eq!(before.membership_expired, Some(false));
    assert!(before.days_until_expiry.unwrap() > 0);

    engine
        .check_in(user, UserKind::Member, None, false)
        .await
        .unwrap();

    let after = engine.lookup("MEM060").await.unwrap();
    assert!(after.currently_checked_in);
    assert!(after.active_record.is_some());
    assert!(after.has_record_today);
}

#[tokio::test]
async fn trainer_day_attendance_cycle() {
    let (_tmp, db) = test_db().await;
    let repo = TrainerAttendanceRepository::new(db.clone());
    let trainer = seed_trainer(&db, "TRN002", "9876500102", "Meera Nair").await;

    let now = now_millis();
    let day = day_bucket_millis(now, TZ);

    let record = repo.check_in(&trainer, day, now, None).await.unwrap();
    assert_eq!(record.status, TrainerDayStatus::Present);
    assert!(record.check_out_time.is_none());

    // (trainer, day) 每天一条
    let err = repo.check_in(&trainer, day, now, None).await.unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    let closed = repo
        .check_out(&trainer, day, now + 480 * MINUTE_MS, None)
        .await
        .unwrap();
    assert_eq!(closed.duration_minutes, Some(480));

    let err = repo
        .check_out(&trainer, day, now + 481 * MINUTE_MS, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    // 未签到的教练直接签退
    let other = seed_trainer(&db, "TRN003", "9876500103", "Rohit Shetty").await;
    let err = repo.check_out(&other, day, now, None).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}
