pub mod cdp;
pub mod driver;
pub mod error;
pub mod launch;
pub mod webdriver;

pub use cdp::CdpDriver;
pub use driver::{build_driver, BrowserDriver, DriverSettings};
pub use error::DriverError;
pub use launch::{ExecutionEnv, LaunchProfile};
pub use webdriver::WebDriverSession;
