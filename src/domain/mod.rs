pub mod page;

pub use page::{ListOrder, NewPage, PageChanges, PagePath, PageRecord, PageUpdate};
