//! Enum types for farm records.
//!
//! Each enum has:
//! - Custom Serialize (as snake_case string)
//! - Custom Deserialize (known variants + catch-all Custom(String))
//! - `as_str()`, `is_default()`, `is_builtin()`, `Display`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Macro: defines an enum with known string variants + a Custom(String) fallback.
// ---------------------------------------------------------------------------
macro_rules! define_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident,
        variants: [
            $( ($variant:ident, $str:expr) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
            Custom(String),
        }

        impl $name {
            /// All built-in variants, in declaration order.
            pub const BUILTIN: &'static [&'static str] = &[$( $str, )+];

            /// Returns the string representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $str, )+
                    Self::Custom(s) => s.as_str(),
                }
            }

            /// Returns `true` if this is the default variant.
            pub fn is_default(&self) -> bool {
                *self == Self::$default
            }

            /// Returns `true` if this is a built-in (non-custom) variant.
            pub fn is_builtin(&self) -> bool {
                !matches!(self, Self::Custom(_))
            }

            /// Returns `true` for built-in variants and non-empty custom strings.
            pub fn is_valid(&self) -> bool {
                match self {
                    Self::Custom(s) => !s.trim().is_empty(),
                    _ => true,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from(s.as_str()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $( $str => Self::$variant, )+
                    other => Self::Custom(other.to_owned()),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $( $str => Self::$variant, )+
                    _ => Self::Custom(s),
                }
            }
        }
    };
}

// ===========================================================================
// Sales
// ===========================================================================

define_enum! {
    /// Fulfilment state of a sales order.
    OrderStatus, default = Pending,
    variants: [
        (Pending, "pending"),
        (Confirmed, "confirmed"),
        (Delivered, "delivered"),
        (Cancelled, "cancelled"),
    ]
}

define_enum! {
    /// How much of an order has been paid.
    PaymentStatus, default = Unpaid,
    variants: [
        (Unpaid, "unpaid"),
        (Partial, "partial"),
        (Paid, "paid"),
    ]
}

// ===========================================================================
// Finance
// ===========================================================================

define_enum! {
    /// Direction of a financial record.
    RecordType, default = Expense,
    variants: [
        (Income, "income"),
        (Expense, "expense"),
    ]
}

define_enum! {
    /// How money changed hands. Custom methods are allowed.
    PaymentMethod, default = Cash,
    variants: [
        (Cash, "cash"),
        (BankTransfer, "bank_transfer"),
        (MobileMoney, "mobile_money"),
        (Cheque, "cheque"),
    ]
}

// ===========================================================================
// Tasks
// ===========================================================================

define_enum! {
    /// Kind of farm work. Custom categories are allowed.
    TaskCategory, default = Other,
    variants: [
        (Feeding, "feeding"),
        (Cleaning, "cleaning"),
        (Health, "health"),
        (Collection, "collection"),
        (Maintenance, "maintenance"),
        (Other, "other"),
    ]
}

define_enum! {
    /// Urgency of a task.
    TaskPriority, default = Medium,
    variants: [
        (Low, "low"),
        (Medium, "medium"),
        (High, "high"),
        (Urgent, "urgent"),
    ]
}

impl TaskPriority {
    /// Sort rank, most urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::Custom(_) => 4,
        }
    }
}

define_enum! {
    /// Lifecycle state of a task.
    TaskStatus, default = Pending,
    variants: [
        (Pending, "pending"),
        (InProgress, "in_progress"),
        (Completed, "completed"),
        (Cancelled, "cancelled"),
    ]
}

impl TaskStatus {
    /// Returns `true` once a task no longer needs attention.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

define_enum! {
    /// Repeat schedule for a task.
    Recurrence, default = None,
    variants: [
        (None, "none"),
        (Daily, "daily"),
        (Weekly, "weekly"),
        (Monthly, "monthly"),
    ]
}

// ===========================================================================
// Users & activity
// ===========================================================================

define_enum! {
    /// Access level of a user account.
    UserRole, default = Worker,
    variants: [
        (Admin, "admin"),
        (Manager, "manager"),
        (Worker, "worker"),
    ]
}

impl UserRole {
    /// Admins and managers may delete records.
    pub fn can_delete(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

define_enum! {
    /// What happened to a document, as recorded in the activity log.
    ActivityAction, default = Updated,
    variants: [
        (Created, "created"),
        (Updated, "updated"),
        (Deleted, "deleted"),
    ]
}
