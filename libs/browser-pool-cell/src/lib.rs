pub mod error;
pub mod factory;
pub mod fake_page;
pub mod fantoccini_page;
pub mod page;
pub mod pool;
pub mod session;

pub use error::PoolError;
pub use factory::{FantocciniSessionFactory, SessionFactory};
pub use fake_page::{FakePage, FakeState};
pub use fantoccini_page::FantocciniPage;
pub use page::{NavigationWait, Page};
pub use pool::{BrowserPool, EMERGENCY_COURT_ID};
pub use session::Session;
