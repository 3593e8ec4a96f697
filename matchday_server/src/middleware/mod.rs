mod hmac;
mod session;

pub use hmac::{HmacMiddlewareFactory, HmacMiddlewareService, IDENTITY_HMAC_HEADER};
pub use session::{SessionMiddlewareFactory, SessionMiddlewareService};
