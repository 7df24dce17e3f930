//! Data models for Biblioteca

pub mod book;
pub mod category;
pub mod enums;
pub mod loan;
pub mod member;
pub mod staff;

// Re-export commonly used types
pub use book::Book;
pub use category::Category;
pub use enums::{BookStatus, LoanStatus, MemberStatus, StaffRole, StaffStatus};
pub use loan::{Loan, LoanDetails};
pub use member::Member;
pub use staff::{StaffAccount, StaffClaims, StaffPublic};
