pub mod pages;

pub use self::pages::PageService;
