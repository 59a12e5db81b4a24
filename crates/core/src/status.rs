//! Status and classification enums shared by every layer.
//!
//! Values are stored in `TEXT` columns guarded by `CHECK` constraints and
//! travel over the wire as SCREAMING_SNAKE_CASE strings. The string form
//! is the same in both places.

use crate::error::CoreError;

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($entity:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored / serialized representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {}: '{other}'",
                        $entity
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

define_text_enum! {
    /// Account role.
    UserRole ("user role") {
        Freelancer => "FREELANCER",
        Admin => "ADMIN",
    }
}

define_text_enum! {
    /// Client relationship status.
    ClientStatus ("client status") {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
        Archived => "ARCHIVED",
    }
}

define_text_enum! {
    /// Project lifecycle status.
    ProjectStatus ("project status") {
        Active => "ACTIVE",
        Completed => "COMPLETED",
        OnHold => "ON_HOLD",
        Cancelled => "CANCELLED",
    }
}

define_text_enum! {
    /// Task workflow status. Transitions between any two states are allowed.
    TaskStatus ("task status") {
        Todo => "TODO",
        InProgress => "IN_PROGRESS",
        Review => "REVIEW",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

define_text_enum! {
    /// Task priority.
    TaskPriority ("task priority") {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Urgent => "URGENT",
    }
}

define_text_enum! {
    /// Worker engagement status.
    WorkerStatus ("worker status") {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
        Archived => "ARCHIVED",
    }
}

define_text_enum! {
    /// Direction of money flow: from a client, or to a worker.
    PaymentType ("payment type") {
        Incoming => "INCOMING",
        Outgoing => "OUTGOING",
    }
}

define_text_enum! {
    /// Payment settlement status.
    PaymentStatus ("payment status") {
        Pending => "PENDING",
        Paid => "PAID",
        Overdue => "OVERDUE",
        Cancelled => "CANCELLED",
    }
}

impl TaskStatus {
    /// Statuses counted as "pending" work in task statistics.
    pub const OPEN: &'static [TaskStatus] =
        &[TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Review];

    pub fn is_completed(self) -> bool {
        self == TaskStatus::Completed
    }
}

impl Default for ClientStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}
