use std::time::Duration;

pub const DEFAULT_LOGIN_PATH: &str = "/usuarios/login/";
pub const DEFAULT_LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Moves the client to another page. Called at most once per pending redirect.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}
