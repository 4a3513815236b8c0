mod ids;
mod message;
mod money;
mod payment_url;
mod submission;
mod task;
mod user;
mod wallet;

pub use ids::{SubmissionId, TaskId, UserId};
pub use message::{Message, ADMIN_SENDER, SYSTEM_SENDER};
pub use money::Amount;
pub use payment_url::{PaymentUrl, SetPaymentUrl};
pub use submission::{ApprovalReceipt, Submission, SubmissionReview, SubmissionStatus};
pub use task::{CreateTask, Task, UpdateTask};
pub use user::{normalize_email, CreateUser, Gender, ProfileType, UpdateProfile, User};
pub use wallet::{Withdrawal, WithdrawalRequest};
