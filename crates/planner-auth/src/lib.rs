pub mod flow;
pub mod google;
pub mod storage;

pub use google::{GoogleOAuth2Provider, GoogleTokenResponse, CALENDAR_READONLY_SCOPE, GOOGLE_SERVICE};
pub use storage::{TokenSet, TokenStorage};
