//! Domain types and models

pub mod account;
pub mod account_info;
pub mod calendar;
pub mod drive;
pub mod feed;
pub mod tasks;

pub use account::Account;
pub use account_info::AccountInfo;
pub use calendar::{Attendee, Event, EventDateTime};
pub use drive::DriveFile;
pub use feed::{Feed, FeedData};
pub use tasks::{Task, TaskList, TaskStatus};
