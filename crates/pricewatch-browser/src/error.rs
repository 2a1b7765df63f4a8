use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("browser launch failed after trying {attempts} launch profiles: {last_error}")]
    Launch { attempts: usize, last_error: String },

    #[error("navigation to {url} failed after {attempts} attempts: {last_error}")]
    Navigation {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("browser session not initialized")]
    NotInitialized,

    #[error("webdriver session error: {0}")]
    Session(String),

    #[error("screenshot capture failed: {0}")]
    Screenshot(String),
}
