//! Per-record validation rules.
//!
//! These check a single record in isolation. Cross-record rules (unique
//! numbers, matching feed stock) live in the storage layer.

use crate::egg::EggProductionRecord;
use crate::enums::{RecordType, TaskStatus};
use crate::feed::{FeedStock, FeedUsage};
use crate::finance::FinancialRecord;
use crate::sales::SalesOrder;
use crate::task::Task;
use crate::user::User;

pub const TITLE_MAX_CHARS: usize = 200;
pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 32;

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("broken eggs ({broken}) exceed total eggs ({total})")]
    BrokenExceedsTotal { broken: u32, total: u32 },

    #[error("graded plus broken eggs ({counted}) exceed total eggs ({total})")]
    GradesExceedTotal { counted: u32, total: u32 },

    #[error("order must contain at least one item")]
    NoItems,

    #[error("item {index}: {reason}")]
    InvalidItem { index: usize, reason: String },

    #[error("amount paid ({paid:.2}) exceeds order total ({total:.2})")]
    Overpaid { paid: f64, total: f64 },

    #[error("delivery date {delivery} is before order date {order}")]
    DeliveryBeforeOrder { delivery: String, order: String },

    #[error("title must be {max} characters or less (got {got})")]
    TitleTooLong { max: usize, got: usize },

    #[error("completed tasks must have completedAt")]
    CompletedWithoutTimestamp,

    #[error("only completed tasks may have completedAt")]
    NotCompletedWithTimestamp,

    #[error("invalid username {0:?}: use 3-32 characters of a-z, 0-9, '_', '.', '-'")]
    InvalidUsername(String),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(())
}

fn builtin(field: &'static str, ok: bool, value: &str) -> Result<(), ValidationError> {
    if !ok {
        return Err(ValidationError::InvalidValue {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

pub fn validate_egg_record(r: &EggProductionRecord) -> Result<(), ValidationError> {
    required("batchNumber", &r.batch_number)?;
    if r.broken_eggs > r.total_eggs {
        return Err(ValidationError::BrokenExceedsTotal {
            broken: r.broken_eggs,
            total: r.total_eggs,
        });
    }
    let counted = u64::from(r.grade_a) + u64::from(r.grade_b) + u64::from(r.grade_c) + u64::from(r.broken_eggs);
    if counted > u64::from(r.total_eggs) {
        return Err(ValidationError::GradesExceedTotal {
            counted: u32::try_from(counted).unwrap_or(u32::MAX),
            total: r.total_eggs,
        });
    }
    Ok(())
}

pub fn validate_sales_order(o: &SalesOrder) -> Result<(), ValidationError> {
    required("orderNumber", &o.order_number)?;
    required("customerName", &o.customer_name)?;
    if o.items.is_empty() {
        return Err(ValidationError::NoItems);
    }
    for (index, item) in o.items.iter().enumerate() {
        let reason = if item.product.trim().is_empty() {
            Some("product is required".to_owned())
        } else if item.quantity == 0 {
            Some("quantity must be greater than zero".to_owned())
        } else if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            Some(format!("unit price must not be negative (got {})", item.unit_price))
        } else if !item.line_total().is_finite() {
            Some("line total is too large".to_owned())
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ValidationError::InvalidItem { index, reason });
        }
    }
    non_negative("discount", o.discount)?;
    non_negative("amountPaid", o.amount_paid)?;
    non_negative("totalAmount", o.total_amount)?;
    non_negative("balance", o.balance_due())?;
    if o.amount_paid > o.total_amount + 0.005 {
        return Err(ValidationError::Overpaid {
            paid: o.amount_paid,
            total: o.total_amount,
        });
    }
    if let Some(delivery) = o.delivery_date {
        if delivery < o.order_date {
            return Err(ValidationError::DeliveryBeforeOrder {
                delivery: delivery.to_string(),
                order: o.order_date.to_string(),
            });
        }
    }
    builtin("status", o.status.is_builtin(), o.status.as_str())?;
    builtin(
        "paymentStatus",
        o.payment_status.is_builtin(),
        o.payment_status.as_str(),
    )?;
    Ok(())
}

pub fn validate_feed_stock(s: &FeedStock) -> Result<(), ValidationError> {
    required("feedType", &s.feed_type)?;
    non_negative("quantity", s.quantity)?;
    non_negative("unitCost", s.unit_cost)?;
    non_negative("reorderLevel", s.reorder_level)?;
    Ok(())
}

pub fn validate_feed_usage(u: &FeedUsage) -> Result<(), ValidationError> {
    required("feedType", &u.feed_type)?;
    positive("quantity", u.quantity)?;
    Ok(())
}

pub fn validate_financial_record(r: &FinancialRecord) -> Result<(), ValidationError> {
    required("referenceNumber", &r.reference_number)?;
    required("category", &r.category)?;
    positive("amount", r.amount)?;
    builtin(
        "recordType",
        matches!(r.record_type, RecordType::Income | RecordType::Expense),
        r.record_type.as_str(),
    )?;
    builtin(
        "paymentMethod",
        r.payment_method.is_valid(),
        r.payment_method.as_str(),
    )?;
    Ok(())
}

pub fn validate_task(t: &Task) -> Result<(), ValidationError> {
    required("title", &t.title)?;
    let chars = t.title.chars().count();
    if chars > TITLE_MAX_CHARS {
        return Err(ValidationError::TitleTooLong {
            max: TITLE_MAX_CHARS,
            got: chars,
        });
    }
    builtin("status", t.status.is_builtin(), t.status.as_str())?;
    builtin("priority", t.priority.is_builtin(), t.priority.as_str())?;
    builtin("recurrence", t.recurrence.is_builtin(), t.recurrence.as_str())?;
    builtin("category", t.category.is_valid(), t.category.as_str())?;
    match (t.status == TaskStatus::Completed, t.completed_at.is_some()) {
        (true, false) => Err(ValidationError::CompletedWithoutTimestamp),
        (false, true) => Err(ValidationError::NotCompletedWithTimestamp),
        _ => Ok(()),
    }
}

/// Checks the username charset and length.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    let charset_ok = username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'));
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) || !charset_ok {
        return Err(ValidationError::InvalidUsername(username.to_owned()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    use crate::credentials::MIN_PASSWORD_LEN;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}

pub fn validate_user(u: &User) -> Result<(), ValidationError> {
    validate_username(&u.username)?;
    let email = u.email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(ValidationError::InvalidEmail(u.email.clone())),
    }
    builtin("role", u.role.is_builtin(), u.role.as_str())?;
    required("passwordHash", &u.password_hash)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{OrderStatus, PaymentMethod, Recurrence, UserRole};
    use crate::sales::OrderItem;
    use chrono::{NaiveDate, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    fn egg(total: u32, broken: u32) -> EggProductionRecord {
        let mut r = EggProductionRecord::new(day(), total, broken);
        r.batch_number = "BATCH-0001".into();
        r
    }

    #[test]
    fn egg_rules() {
        assert!(validate_egg_record(&egg(100, 5)).is_ok());
        assert_eq!(
            validate_egg_record(&egg(5, 6)),
            Err(ValidationError::BrokenExceedsTotal { broken: 6, total: 5 })
        );

        let mut r = egg(100, 5);
        r.grade_a = 90;
        r.grade_b = 6;
        assert!(matches!(
            validate_egg_record(&r),
            Err(ValidationError::GradesExceedTotal { counted: 101, total: 100 })
        ));

        r.batch_number.clear();
        assert_eq!(validate_egg_record(&r), Err(ValidationError::Required("batchNumber")));
    }

    fn order() -> SalesOrder {
        let mut o = SalesOrder::new("Kamau", day(), vec![OrderItem::new("tray", 2, 4.0)]);
        o.order_number = "ORD-0001".into();
        o
    }

    #[test]
    fn sales_rules() {
        assert!(validate_sales_order(&order()).is_ok());

        let mut o = order();
        o.items.clear();
        assert_eq!(validate_sales_order(&o), Err(ValidationError::NoItems));

        let mut o = order();
        o.items[0].quantity = 0;
        assert!(matches!(
            validate_sales_order(&o),
            Err(ValidationError::InvalidItem { index: 0, .. })
        ));

        let mut o = order();
        o.amount_paid = 9.0;
        assert!(matches!(validate_sales_order(&o), Err(ValidationError::Overpaid { .. })));

        let mut o = order();
        o.delivery_date = day().pred_opt();
        assert!(matches!(
            validate_sales_order(&o),
            Err(ValidationError::DeliveryBeforeOrder { .. })
        ));

        let mut o = order();
        o.status = OrderStatus::Custom("lost".into());
        assert!(matches!(
            validate_sales_order(&o),
            Err(ValidationError::InvalidValue { field: "status", .. })
        ));
    }

    #[test]
    fn feed_rules() {
        assert!(validate_feed_stock(&FeedStock::new("Layers", 0.0, 0.0)).is_ok());
        assert!(validate_feed_stock(&FeedStock::new("Layers", -1.0, 0.0)).is_err());
        assert!(validate_feed_stock(&FeedStock::new(" ", 1.0, 0.0)).is_err());
        assert!(validate_feed_usage(&FeedUsage::new("Layers", 0.0, day())).is_err());
        assert!(validate_feed_usage(&FeedUsage::new("Layers", f64::NAN, day())).is_err());
        assert!(validate_feed_usage(&FeedUsage::new("Layers", 2.5, day())).is_ok());
    }

    #[test]
    fn finance_rules() {
        let mut r = FinancialRecord::new(day(), RecordType::Expense, "feed", 10.0);
        r.reference_number = "FIN-0001".into();
        assert!(validate_financial_record(&r).is_ok());

        r.payment_method = PaymentMethod::Custom("barter".into());
        assert!(validate_financial_record(&r).is_ok());

        r.record_type = RecordType::Custom("loan".into());
        assert!(validate_financial_record(&r).is_err());

        r.record_type = RecordType::Income;
        r.amount = 0.0;
        assert!(validate_financial_record(&r).is_err());
    }

    #[test]
    fn task_rules() {
        let mut t = Task::new("Clean feeders", day());
        assert!(validate_task(&t).is_ok());

        t.title = "x".repeat(201);
        assert!(matches!(
            validate_task(&t),
            Err(ValidationError::TitleTooLong { got: 201, .. })
        ));
        t.title = "é".repeat(200);
        assert!(validate_task(&t).is_ok());

        t.status = TaskStatus::Completed;
        assert_eq!(validate_task(&t), Err(ValidationError::CompletedWithoutTimestamp));
        t.completed_at = Some(Utc::now());
        assert!(validate_task(&t).is_ok());
        t.status = TaskStatus::Pending;
        assert_eq!(validate_task(&t), Err(ValidationError::NotCompletedWithTimestamp));

        t.completed_at = None;
        t.recurrence = Recurrence::Custom("yearly".into());
        assert!(validate_task(&t).is_err());
    }

    #[test]
    fn usernames() {
        let longest = "x".repeat(32);
        let too_long = "x".repeat(33);
        for ok in ["bob", "j.doe-2", "a_b", longest.as_str()] {
            assert!(validate_username(ok).is_ok(), "{ok}");
        }
        for bad in ["ab", "Bob", "has space", "ünï", too_long.as_str()] {
            assert!(validate_username(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn user_rules() {
        let mut u = User::new("amina", "amina@farm.test", UserRole::Admin);
        u.password_hash = "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".into();
        assert!(validate_user(&u).is_ok());

        u.email = "not-an-email".into();
        assert!(matches!(validate_user(&u), Err(ValidationError::InvalidEmail(_))));

        u.email = "amina@farm.test".into();
        u.role = UserRole::Custom("owner".into());
        assert!(validate_user(&u).is_err());
    }

    #[test]
    fn passwords() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }
}
