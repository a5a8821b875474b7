//! 演示数据：由固定随机种子生成，可复现

use chrono::{prelude::DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rust_decimal::Decimal;
use utils::{AppError, AppResult, PasswordHasher};

use crate::{
    admin::model::{normalize_permissions, AdminPermission, AdminRole, AdminUser},
    audit::model::AuditLog,
    notification::model::{Notification, NotificationType},
    points::model::{PointTransaction, TransactionType},
    rate::model::ConversionRate,
    referral::model::{Referral, ReferralStatus},
    report::model::{Report, ReportSchedule, ReportType},
    settings::model::SystemSettings,
    staff::model::{StaffHours, StaffUser},
    support::model::FaqEntry,
    withdrawal::model::{Withdrawal, WithdrawalStatus},
};

pub const STAFF_PASSWORD: &str = "password123";

/// (名, 姓, 推荐码, 部门, 职级, 城市, 入职日期, 在职, 积分, 推荐数)
type RosterRow = (&'static str, &'static str, &'static str, &'static str, &'static str, &'static str, &'static str, bool, i64, usize);

const ROSTER: [RosterRow; 50] = [
    ("Adewale", "Johnson", "REFAX9K01", "Sales", "Senior", "Lagos", "2024-03-15", true, 12500, 18),
    ("Chioma", "Okafor", "REFBX2P02", "Sales", "Junior", "Lagos", "2024-08-20", true, 8900, 12),
    ("Oluwaseun", "Adebayo", "REFC3Y7Q03", "Sales", "Manager", "Lagos", "2023-05-10", true, 15000, 20),
    ("Blessing", "Eze", "REFD4M8N04", "Sales", "Junior", "Abuja", "2024-09-01", true, 6700, 9),
    ("Emeka", "Nwosu", "REFE5K1L05", "Sales", "Senior", "Lagos", "2023-11-22", true, 11200, 16),
    ("Fatima", "Abdullahi", "REFF6P9R06", "Sales", "Junior", "Abuja", "2024-07-14", true, 7800, 11),
    ("Ibrahim", "Yusuf", "REFG7T2S07", "Sales", "Senior", "Abuja", "2024-01-30", true, 10500, 15),
    ("Ngozi", "Okonkwo", "REFH8W5T08", "Sales", "Junior", "Port Harcourt", "2024-10-05", true, 5400, 7),
    ("Tunde", "Olatunji", "REFI9Q6U09", "Sales", "Senior", "Lagos", "2023-07-18", true, 13400, 19),
    ("Amarachi", "Ikenna", "REFJ0L7V10", "Sales", "Junior", "Lagos", "2024-06-25", true, 8100, 10),
    ("Kunle", "Adeyemi", "REFK1N8W11", "Sales", "Senior", "Lagos", "2023-12-08", true, 9800, 14),
    ("Zainab", "Mohammed", "REFL2M9X12", "Sales", "Junior", "Abuja", "2024-11-12", true, 4200, 5),
    ("Chinedu", "Okoro", "REFM3P0Y13", "Sales", "Senior", "Port Harcourt", "2024-02-14", false, 2100, 3),
    ("Aisha", "Bello", "REFN4Q1Z14", "Sales", "Junior", "Abuja", "2024-05-20", true, 7200, 8),
    ("Segun", "Bakare", "REFO5R2A15", "Sales", "Manager", "Lagos", "2023-04-10", true, 14700, 20),
    ("Nneka", "Chukwu", "REFP6S3B16", "Sales", "Junior", "Port Harcourt", "2024-08-30", true, 6300, 8),
    ("Babatunde", "Afolabi", "REFQ7T4C17", "Sales", "Senior", "Lagos", "2023-09-05", true, 11800, 17),
    ("Hauwa", "Aliyu", "REFR8U5D18", "Sales", "Junior", "Abuja", "2024-07-22", true, 5900, 7),
    ("Chijioke", "Nnadi", "REFS9V6E19", "Sales", "Senior", "Lagos", "2024-03-18", false, 1800, 2),
    ("Folake", "Odusanya", "REFT0W7F20", "Sales", "Junior", "Lagos", "2024-09-14", true, 6800, 9),
    ("Ahmed", "Musa", "REFU1X8G21", "Marketing", "Manager", "Lagos", "2023-06-12", true, 13900, 18),
    ("Grace", "Adekunle", "REFV2Y9H22", "Marketing", "Senior", "Lagos", "2024-01-20", true, 10200, 13),
    ("Michael", "Obi", "REFW3Z0I23", "Marketing", "Junior", "Abuja", "2024-10-01", true, 4800, 6),
    ("Kemi", "Fashola", "REFX4A1J24", "Marketing", "Senior", "Lagos", "2023-10-15", true, 11500, 15),
    ("Damilola", "Taiwo", "REFY5B2K25", "Marketing", "Junior", "Lagos", "2024-06-08", true, 7500, 10),
    ("Yusuf", "Ibrahim", "REFZ6C3L26", "Marketing", "Senior", "Abuja", "2024-02-28", true, 9400, 12),
    ("Bukola", "Ojo", "REFA7D4M27", "Marketing", "Junior", "Port Harcourt", "2024-11-20", true, 3600, 4),
    ("Oluwatobi", "Martins", "REFB8E5N28", "Marketing", "Senior", "Lagos", "2023-08-14", true, 12100, 16),
    ("Sade", "Williams", "REFC9F6O29", "Marketing", "Junior", "Lagos", "2024-05-12", false, 2700, 3),
    ("Bolaji", "Adeleke", "REFD0G7P30", "Marketing", "Senior", "Abuja", "2024-04-05", true, 8700, 11),
    ("Ifeanyi", "Uche", "REFE1H8Q31", "Marketing", "Junior", "Port Harcourt", "2024-09-22", true, 5100, 6),
    ("Titilayo", "Ogunleye", "REFF2I9R32", "Marketing", "Senior", "Lagos", "2023-11-30", true, 10800, 14),
    ("Victor", "Eze", "REFG3J0S33", "IT", "Manager", "Lagos", "2023-05-20", true, 14200, 19),
    ("Jennifer", "Okeke", "REFH4K1T34", "IT", "Senior", "Lagos", "2024-01-15", true, 9900, 13),
    ("Samuel", "Adeyinka", "REFI5L2U35", "IT", "Junior", "Abuja", "2024-08-05", true, 6100, 8),
    ("Chiamaka", "Nnamdi", "REFJ6M3V36", "IT", "Senior", "Lagos", "2023-12-10", true, 10600, 14),
    ("Daniel", "Okpara", "REFK7N4W37", "IT", "Junior", "Abuja", "2024-07-18", true, 7100, 9),
    ("Funmi", "Lawal", "REFL8O5X38", "IT", "Senior", "Port Harcourt", "2024-03-25", false, 3200, 4),
    ("Abdullahi", "Suleiman", "REFM9P6Y39", "IT", "Junior", "Abuja", "2024-10-12", true, 4500, 5),
    ("Rachael", "Dike", "REFN0Q7Z40", "IT", "Senior", "Lagos", "2023-09-08", true, 11300, 15),
    ("Precious", "Oluwole", "REFO1R8A41", "HR", "Manager", "Lagos", "2023-04-15", true, 13600, 18),
    ("Godwin", "Amadi", "REFP2S9B42", "HR", "Senior", "Lagos", "2024-02-20", true, 9200, 12),
    ("Mary", "Ajayi", "REFQ3T0C43", "HR", "Junior", "Abuja", "2024-06-30", true, 6900, 9),
    ("Gbenga", "Olaniyan", "REFR4U1D44", "HR", "Senior", "Abuja", "2023-10-25", false, 2400, 3),
    ("Esther", "Nwachukwu", "REFS5V2E45", "HR", "Junior", "Port Harcourt", "2024-09-10", true, 5600, 7),
    ("Chukwuma", "Obi", "REFT6W3F46", "Operations", "Manager", "Lagos", "2023-07-05", true, 14500, 19),
    ("Olayinka", "Balogun", "REFU7X4G47", "Operations", "Senior", "Lagos", "2024-01-12", true, 10400, 14),
    ("Elizabeth", "Ogundipe", "REFV8Y5H48", "Operations", "Junior", "Abuja", "2024-08-15", true, 6400, 8),
    ("Ikechukwu", "Anyanwu", "REFW9Z6I49", "Operations", "Senior", "Port Harcourt", "2023-11-18", false, 1500, 2),
    ("Amina", "Bala", "REFX0A7J50", "Operations", "Junior", "Abuja", "2024-10-28", true, 4100, 5),
];

/// (邮箱, 密码, 姓名, 角色)
const ADMINS: [(&str, &str, &str, AdminRole); 4] = [
    ("admin@company.com", "admin123", "Admin Super", AdminRole::SuperAdmin),
    ("manager@company.com", "manager123", "Manager User", AdminRole::Manager),
    ("analyst@company.com", "analyst123", "Analyst User", AdminRole::ReadOnly),
    ("finance@company.com", "finance123", "Finance User", AdminRole::FinanceAdmin),
];

const PHONE_PREFIXES: [&str; 8] = ["803", "806", "810", "813", "816", "907", "908", "909"];
const BANKS: [&str; 5] = ["GTBank", "Access Bank", "Zenith Bank", "First Bank", "UBA"];
const AUDIT_ACTIONS: [&str; 12] = [
    "User login",
    "User logout",
    "Referral approved",
    "Referral rejected",
    "Withdrawal approved",
    "Withdrawal rejected",
    "Points adjusted",
    "User deactivated",
    "User activated",
    "Settings updated",
    "Report generated",
    "Rate changed",
];
const REFEREE_FIRST_NAMES: [&str; 12] = [
    "Tobi", "Ifeoma", "Sani", "Bola", "Uche", "Halima", "Femi", "Ebere", "Musa", "Yemi", "Obinna", "Lami",
];
const REFEREE_LAST_NAMES: [&str; 10] = [
    "Ade", "Okeke", "Garba", "Lawal", "Nnamdi", "Ojo", "Umar", "Balogun", "Eke", "Danjuma",
];

const REFERRAL_WEIGHTS: [(ReferralStatus, f64); 4] = [
    (ReferralStatus::Pending, 0.30),
    (ReferralStatus::Approved, 0.25),
    (ReferralStatus::Completed, 0.35),
    (ReferralStatus::Rejected, 0.10),
];
const WITHDRAWAL_WEIGHTS: [(WithdrawalStatus, f64); 5] = [
    (WithdrawalStatus::Pending, 0.21),
    (WithdrawalStatus::Approved, 0.25),
    (WithdrawalStatus::Processing, 0.12),
    (WithdrawalStatus::Paid, 0.33),
    (WithdrawalStatus::Rejected, 0.09),
];

/// 初始数据集合
pub struct Fixtures {
    pub staff: Vec<StaffUser>,
    pub admins: Vec<AdminUser>,
    pub referrals: Vec<Referral>,
    pub transactions: Vec<PointTransaction>,
    pub withdrawals: Vec<Withdrawal>,
    pub audit_logs: Vec<AuditLog>,
    pub notifications: Vec<Notification>,
    pub rates: Vec<ConversionRate>,
    pub reports: Vec<Report>,
    pub faqs: Vec<FaqEntry>,
    pub settings: SystemSettings,
}

impl Fixtures {
    pub fn generate(seed: u64, referral_points: i64, currency: &str, now: DateTime<Utc>) -> AppResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);

        let admins = generate_admins()?;
        let mut staff = generate_staff(&mut rng)?;
        let referrals = generate_referrals(&mut rng, &mut staff, referral_points, now);
        let withdrawals = generate_withdrawals(&mut rng, &staff, &admins, currency, now);
        let transactions = generate_transactions(&mut rng, &staff, &referrals, &withdrawals, referral_points, now);
        let audit_logs = generate_audit_logs(&mut rng, &admins, now);
        let notifications = generate_notifications(&mut rng, &staff, now);

        Ok(Self {
            staff,
            admins,
            referrals,
            transactions,
            withdrawals,
            audit_logs,
            notifications,
            rates: conversion_rates(),
            reports: reports(now),
            faqs: faqs(),
            settings: SystemSettings::new(currency),
        })
    }
}

fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn random_between(rng: &mut StdRng, start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
    let span = (end - start).num_seconds();
    if span <= 0 {
        return start;
    }
    start + Duration::seconds(rng.gen_range(0..=span))
}

fn weighted<T: Copy>(rng: &mut StdRng, weights: &[(T, f64)]) -> T {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (value, weight) in weights {
        cumulative += weight;
        if roll < cumulative {
            return *value;
        }
    }
    weights[weights.len() - 1].0
}

fn phone(rng: &mut StdRng) -> String {
    let prefix = PHONE_PREFIXES[rng.gen_range(0..PHONE_PREFIXES.len())];
    let rest = rng.gen_range(0..10_000_000u32);
    format!("+234 {} {:03} {:04}", prefix, rest / 10_000, rest % 10_000)
}

fn generate_admins() -> AppResult<Vec<AdminUser>> {
    ADMINS
        .iter()
        .enumerate()
        .map(|(i, (email, password, name, role))| {
            Ok(AdminUser {
                id: format!("admin-{}", i + 1),
                name: name.to_string(),
                email: email.to_string(),
                password_hash: PasswordHasher::hash(password)?,
                role: *role,
                permissions: normalize_permissions(role.default_permissions()),
                is_active: true,
                created_at: utc(2023, 1 + i as u32, 1),
                last_login: None,
            })
        })
        .collect()
}

fn generate_staff(rng: &mut StdRng) -> AppResult<Vec<StaffUser>> {
    // 所有员工共用同一初始密码，只哈希一次
    let password_hash = PasswordHasher::hash(STAFF_PASSWORD)?;

    ROSTER
        .iter()
        .enumerate()
        .map(|(i, (first, last, code, department, position, location, joined, active, balance, _))| {
            let join_date = NaiveDate::parse_from_str(joined, "%Y-%m-%d")
                .map_err(|e| AppError::InternalServerErrorWithContext(format!("Invalid fixture date {}: {}", joined, e)))?;
            let created_at = Utc.from_utc_datetime(&join_date.and_hms_opt(9, 0, 0).unwrap_or_default());
            let id = i as i64 + 1;

            Ok(StaffUser {
                id,
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: format!("{}.{}@company.com", first, last).to_lowercase(),
                phone: phone(rng),
                password_hash: password_hash.clone(),
                referral_code: code.to_string(),
                department: department.to_string(),
                position: position.to_string(),
                location: location.to_string(),
                join_date,
                is_active: *active,
                points_balance: *balance,
                frozen_points: 0,
                total_referrals: 0,
                successful_referrals: 0,
                avatar: format!("https://i.pravatar.cc/150?img={}", id),
                hours: StaffHours::default(),
                created_at,
                updated_at: created_at,
            })
        })
        .collect()
}

/// 推荐数量取自花名册；员工的推荐统计由生成结果回填
fn generate_referrals(
    rng: &mut StdRng,
    staff: &mut [StaffUser],
    referral_points: i64,
    now: DateTime<Utc>,
) -> Vec<Referral> {
    let mut referrals = Vec::new();

    for (user, row) in staff.iter_mut().zip(ROSTER.iter()) {
        for _ in 0..row.9 {
            let id = referrals.len() as i64 + 1;
            let status = weighted(rng, &REFERRAL_WEIGHTS);
            let created_at = random_between(rng, user.created_at, now);
            let updated_at = match status {
                ReferralStatus::Pending => created_at,
                _ => random_between(rng, created_at, now),
            };
            let first = REFEREE_FIRST_NAMES[rng.gen_range(0..REFEREE_FIRST_NAMES.len())];
            let last = REFEREE_LAST_NAMES[rng.gen_range(0..REFEREE_LAST_NAMES.len())];

            referrals.push(Referral {
                id,
                user_id: user.id,
                referrer_name: user.full_name(),
                referrer_code: user.referral_code.clone(),
                referee_name: format!("{} {}", first, last),
                referee_email: format!("{}.{}{}@example.com", first, last, id).to_lowercase(),
                referee_phone: phone(rng),
                status,
                points_awarded: if status == ReferralStatus::Completed { referral_points } else { 0 },
                notes: match status {
                    ReferralStatus::Rejected => "Duplicate entry".to_string(),
                    ReferralStatus::Completed => "Successfully onboarded".to_string(),
                    _ => String::new(),
                },
                created_at,
                updated_at,
            });

            user.total_referrals += 1;
            if status == ReferralStatus::Completed {
                user.successful_referrals += 1;
            }
        }
    }

    referrals
}

/// 一条待写入的流水：(类型, 变动, 说明, 推荐ID, 提现ID, 时间)
type LedgerEntry = (TransactionType, i64, &'static str, Option<i64>, Option<i64>, DateTime<Utc>);

/// 按时间顺序生成流水，快照余额保持非负并最终等于员工当前积分
///
/// 每笔提现在申请时扣减积分（预留），被拒绝的提现在处理时退回
fn generate_transactions(
    rng: &mut StdRng,
    staff: &[StaffUser],
    referrals: &[Referral],
    withdrawals: &[Withdrawal],
    referral_points: i64,
    now: DateTime<Utc>,
) -> Vec<PointTransaction> {
    let mut transactions = Vec::new();

    for user in staff {
        let completed: Vec<i64> = referrals
            .iter()
            .filter(|r| r.user_id == user.id && r.status == ReferralStatus::Completed)
            .map(|r| r.id)
            .collect();

        let count = rng.gen_range(5..20);
        let mut entries: Vec<LedgerEntry> = (0..count)
            .map(|_| {
                let created_at = random_between(rng, user.created_at, now);
                match rng.gen_range(0..3) {
                    0 => (
                        TransactionType::Earned,
                        referral_points,
                        "Points earned from successful referral",
                        completed.choose(rng).copied(),
                        None,
                        created_at,
                    ),
                    1 => (TransactionType::Bonus, rng.gen_range(500..1500), "Performance bonus points", None, None, created_at),
                    _ => (TransactionType::Deduction, -rng.gen_range(100..600), "Point adjustment", None, None, created_at),
                }
            })
            .collect();

        for withdrawal in withdrawals.iter().filter(|w| w.user_id == user.id) {
            entries.push((
                TransactionType::Withdrawal,
                -withdrawal.points,
                "Withdrawal request",
                None,
                Some(withdrawal.id),
                withdrawal.created_at,
            ));
            if withdrawal.status == WithdrawalStatus::Rejected {
                entries.push((
                    TransactionType::Refund,
                    withdrawal.points,
                    "Refund for rejected withdrawal",
                    None,
                    Some(withdrawal.id),
                    withdrawal.processed_at.unwrap_or(withdrawal.created_at),
                ));
            }
        }
        // 稳定排序：同一时刻的预留排在退款之前
        entries.sort_by(|a, b| a.5.cmp(&b.5));

        // 期初余额覆盖最低点，并让期末余额等于当前积分
        let mut running = 0i64;
        let mut lowest = 0i64;
        for entry in &entries {
            running += entry.1;
            lowest = lowest.min(running);
        }
        let mut opening = -lowest;
        let difference = user.points_balance - (opening + running);
        if difference > 0 {
            opening += difference;
        } else if difference < 0 {
            entries.push((TransactionType::Deduction, difference, "Point adjustment", None, None, now));
        }
        if opening > 0 {
            entries.insert(0, (TransactionType::Bonus, opening, "Opening balance", None, None, user.created_at));
        }

        let mut balance = 0i64;
        for (kind, amount, description, referral_id, withdrawal_id, created_at) in entries {
            balance += amount;
            transactions.push(PointTransaction {
                // 临时序号，保证同一时刻的流水保持生成顺序
                id: transactions.len() as i64,
                user_id: user.id,
                user_name: user.full_name(),
                kind,
                amount,
                frozen_amount: 0,
                balance,
                description: description.to_string(),
                referral_id,
                withdrawal_id,
                created_at,
            });
        }
    }

    transactions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    for (i, tx) in transactions.iter_mut().enumerate() {
        tx.id = i as i64 + 1;
    }
    transactions.reverse();
    transactions
}

fn generate_withdrawals(
    rng: &mut StdRng,
    staff: &[StaffUser],
    admins: &[AdminUser],
    currency: &str,
    now: DateTime<Utc>,
) -> Vec<Withdrawal> {
    let rate = Decimal::from(10);
    let mut candidates: Vec<&StaffUser> = staff.iter().filter(|u| u.points_balance > 5_000).collect();
    candidates.shuffle(rng);

    let mut withdrawals = Vec::new();
    for user in candidates.into_iter().take(40) {
        for _ in 0..rng.gen_range(1..=4) {
            let status = weighted(rng, &WITHDRAWAL_WEIGHTS);
            let amount = rng.gen_range(10_000..60_000i64);
            let created_at = random_between(rng, user.created_at, now);
            let processed = status != WithdrawalStatus::Pending;
            let admin = &admins[rng.gen_range(0..admins.len())];

            withdrawals.push(Withdrawal {
                id: 0,
                user_id: user.id,
                user_name: user.full_name(),
                points: amount * 10,
                conversion_rate: rate,
                amount: Decimal::from(amount),
                currency: currency.to_string(),
                status,
                bank_name: BANKS[rng.gen_range(0..BANKS.len())].to_string(),
                account_number: rng.gen_range(1_000_000_000u64..10_000_000_000).to_string(),
                account_name: user.full_name(),
                created_at,
                processed_at: processed.then(|| random_between(rng, created_at, now)),
                processed_by: processed.then(|| admin.name.clone()),
                rejection_reason: (status == WithdrawalStatus::Rejected).then(|| "Invalid account details".to_string()),
            });
        }
    }

    withdrawals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    for (i, withdrawal) in withdrawals.iter_mut().enumerate() {
        withdrawal.id = i as i64 + 1;
    }
    withdrawals
}

fn generate_audit_logs(rng: &mut StdRng, admins: &[AdminUser], now: DateTime<Utc>) -> Vec<AuditLog> {
    let mut logs: Vec<AuditLog> = (0..215)
        .map(|_| {
            let admin = &admins[rng.gen_range(0..admins.len())];
            let action = AUDIT_ACTIONS[rng.gen_range(0..AUDIT_ACTIONS.len())];
            let target = if action.starts_with("User") {
                format!("User {}", rng.gen_range(1..=50))
            } else if action.starts_with("Referral") {
                format!("Referral {}", rng.gen_range(1..=250))
            } else if action.starts_with("Withdrawal") {
                format!("Withdrawal {}", rng.gen_range(1..=120))
            } else {
                "System".to_string()
            };

            AuditLog {
                id: 0,
                admin_id: admin.id.clone(),
                admin_name: admin.name.clone(),
                action: action.to_string(),
                target,
                description: format!("{} performed {}", admin.name, action),
                ip_address: format!("192.168.{}.{}", rng.gen_range(0..255), rng.gen_range(0..255)),
                created_at: random_between(rng, utc(2024, 1, 1), now),
            }
        })
        .collect();

    logs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    for (i, log) in logs.iter_mut().enumerate() {
        log.id = i as i64 + 1;
    }
    logs
}

fn generate_notifications(rng: &mut StdRng, staff: &[StaffUser], now: DateTime<Utc>) -> Vec<Notification> {
    let catalogue: [(NotificationType, [&str; 3]); 4] = [
        (
            NotificationType::Referral,
            ["New Referral Approved", "Referral Completed", "Referral Rejected"],
        ),
        (
            NotificationType::Withdrawal,
            ["Withdrawal Approved", "Withdrawal Completed", "Withdrawal Rejected"],
        ),
        (NotificationType::Points, ["Points Awarded", "Bonus Points", "Points Deducted"]),
        (NotificationType::System, ["System Update", "New Feature", "Maintenance Notice"]),
    ];

    let mut notifications = Vec::new();
    for user in staff {
        for _ in 0..rng.gen_range(1..=5) {
            let (kind, titles) = catalogue[rng.gen_range(0..catalogue.len())];
            let title = titles[rng.gen_range(0..titles.len())];

            notifications.push(Notification {
                id: notifications.len() as i64 + 1,
                user_id: user.id,
                kind,
                title: title.to_string(),
                message: format!("{} - Check your dashboard for details", title),
                is_read: rng.gen_bool(0.6),
                created_at: random_between(rng, user.created_at, now),
            });
        }
    }
    notifications
}

fn conversion_rates() -> Vec<ConversionRate> {
    vec![
        ConversionRate {
            id: 1,
            rate: Decimal::from(10),
            effective_from: utc(2024, 1, 1),
            effective_to: Some(utc(2024, 7, 1)),
            created_by: "admin-1".to_string(),
            created_at: utc(2023, 12, 15),
        },
        ConversionRate {
            id: 2,
            rate: Decimal::from(10),
            effective_from: utc(2024, 7, 1),
            effective_to: None,
            created_by: "admin-1".to_string(),
            created_at: utc(2024, 6, 20),
        },
    ]
}

fn reports(now: DateTime<Utc>) -> Vec<Report> {
    let report = |id: i64, title: &str, kind, description: &str, by: &str, age_days: i64, schedule: ReportSchedule| Report {
        id,
        title: title.to_string(),
        kind,
        description: description.to_string(),
        created_by: by.to_string(),
        created_at: now - Duration::days(age_days),
        schedule,
        next_run: schedule.next_run_after(now),
    };

    vec![
        report(
            1,
            "Monthly Referral Report",
            ReportType::Referral,
            "Summary of all referrals for the month",
            "admin-1",
            30,
            ReportSchedule::Monthly,
        ),
        report(
            2,
            "Weekly Withdrawal Report",
            ReportType::Withdrawal,
            "Summary of all withdrawals for the week",
            "admin-2",
            7,
            ReportSchedule::Weekly,
        ),
        report(
            3,
            "Quarterly Performance Report",
            ReportType::Performance,
            "Staff performance summary for the quarter",
            "admin-1",
            90,
            ReportSchedule::Quarterly,
        ),
    ]
}

fn faqs() -> Vec<FaqEntry> {
    let entries = [
        ("Referrals", "How do I refer someone?", "Share your unique referral code with potential candidates. When they sign up and complete onboarding, you will earn points."),
        ("Referrals", "How many points do I earn per referral?", "You earn 500 points for each successful referral that completes the onboarding process."),
        ("Points", "How do I check my points balance?", "Your current points balance is displayed on your dashboard. You can also view your points history in the Points section."),
        ("Points", "What is the conversion rate?", "The current conversion rate is 10 points per 1 Naira. This rate may be adjusted by management."),
        ("Withdrawals", "What is the minimum withdrawal amount?", "The minimum withdrawal amount is 5,000 Naira (50,000 points)."),
        ("Withdrawals", "How long does withdrawal processing take?", "Withdrawals are typically processed within 3-5 business days after approval."),
        ("Withdrawals", "Can I cancel a withdrawal request?", "Yes, you can cancel a withdrawal request as long as it has not been approved or processed."),
        ("Account", "How do I update my profile information?", "Go to your Profile page and click the Edit button to update your information."),
        ("Account", "How do I change my password?", "Navigate to Profile > Security and use the Change Password form."),
        ("General", "Who can I contact for support?", "Use the Support form on the Help page or contact your HR representative."),
    ];

    entries
        .iter()
        .enumerate()
        .map(|(i, (category, question, answer))| FaqEntry {
            id: i as i64 + 1,
            category: category.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> Fixtures {
        Fixtures::generate(42, 500, "NGN", Utc::now()).unwrap()
    }

    #[test]
    fn test_sizes_and_departments() {
        let f = fixtures();

        assert_eq!(f.staff.len(), 50);
        assert_eq!(f.staff.iter().filter(|u| u.department == "Sales").count(), 20);
        assert_eq!(f.staff.iter().filter(|u| u.department == "IT").count(), 8);
        assert_eq!(f.audit_logs.len(), 215);
        assert_eq!(f.faqs.len(), 10);
        assert_eq!(f.reports.len(), 3);
        assert!(!f.withdrawals.is_empty());
    }

    #[test]
    fn test_referral_counters_are_consistent() {
        let f = fixtures();

        for user in &f.staff {
            let own: Vec<_> = f.referrals.iter().filter(|r| r.user_id == user.id).collect();
            assert_eq!(user.total_referrals, own.len() as i64);
            assert_eq!(
                user.successful_referrals,
                own.iter().filter(|r| r.status == ReferralStatus::Completed).count() as i64
            );
        }
    }

    #[test]
    fn test_transaction_snapshots_end_at_balance() {
        let f = fixtures();

        for user in &f.staff {
            let latest = f.transactions.iter().find(|t| t.user_id == user.id).unwrap();
            assert_eq!(latest.balance, user.points_balance);
        }
        assert!(f.transactions.iter().all(|t| t.balance >= 0));
    }

    #[test]
    fn test_withdrawals_are_reserved_in_ledger() {
        let f = fixtures();
        assert!(f.withdrawals.iter().any(|w| w.status.is_open()));

        for withdrawal in &f.withdrawals {
            let linked: Vec<&PointTransaction> = f
                .transactions
                .iter()
                .filter(|t| t.withdrawal_id == Some(withdrawal.id))
                .collect();
            assert!(linked.iter().all(|t| t.user_id == withdrawal.user_id));

            let reservations: Vec<_> = linked.iter().filter(|t| t.kind == TransactionType::Withdrawal).collect();
            assert_eq!(reservations.len(), 1, "withdrawal {} has no reservation", withdrawal.id);
            assert_eq!(reservations[0].amount, -withdrawal.points);

            let net: i64 = linked.iter().map(|t| t.amount).sum();
            match withdrawal.status {
                WithdrawalStatus::Rejected => assert_eq!(net, 0),
                _ => assert_eq!(net, -withdrawal.points),
            }
        }

        // 预留不走冻结，可用积分等于余额
        assert!(f.staff.iter().all(|u| u.frozen_points == 0 && u.available_points() == u.points_balance));
    }

    #[test]
    fn test_same_seed_same_data() {
        let now = Utc::now();
        let a = Fixtures::generate(7, 500, "NGN", now).unwrap();
        let b = Fixtures::generate(7, 500, "NGN", now).unwrap();

        let codes = |f: &Fixtures| f.referrals.iter().map(|r| (r.referee_email.clone(), r.status)).collect::<Vec<_>>();
        assert_eq!(codes(&a), codes(&b));
        assert_eq!(a.withdrawals.len(), b.withdrawals.len());
    }

    #[test]
    fn test_staff_password_verifies() {
        let f = fixtures();
        assert!(PasswordHasher::verify(STAFF_PASSWORD, &f.staff[0].password_hash));
        assert!(PasswordHasher::verify("admin123", &f.admins[0].password_hash));
    }
}
