mod booking_url;
mod contact;
mod health_check;
mod save_chat_request;

pub use booking_url::*;
pub use contact::*;
pub use health_check::*;
pub use save_chat_request::*;
