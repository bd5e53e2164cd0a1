mod middleware;
mod session;

pub use middleware::{require_author, SIGN_IN_PATH, UNAUTHORIZED_PATH};
pub use session::{
    clear_session_cookie, resolve_session, session_cookie, session_token, Profile, Session,
    SessionError, SESSION_COOKIE,
};
