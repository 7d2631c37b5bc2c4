pub mod manager;
pub mod session;

pub use manager::{DriverManager, WebDriverManager, WorkerId};
pub use session::{ManagedSession, RemoteFactory, SessionFactory, WebSession};
