//! Transactional e-mail subsystem.
//!
//! # Data Flow
//! ```text
//! maintenance submission / owner e-mail route
//!     → template.rs (owner notice, tenant copy HTML)
//!     → mailer.rs (Mailer trait)
//!         → HttpMailer: POST {from, to, subject, html} to the mail API
//!         → LogMailer: log only, when mail is disabled
//! ```
//!
//! Sends are attempted once. Callers decide whether a failure is fatal.

pub mod mailer;
pub mod template;

pub use mailer::{build_mailer, EmailMessage, HttpMailer, LogMailer, MailError, Mailer};
pub use template::{render_owner_notice, render_tenant_copy, OwnerNotice};
