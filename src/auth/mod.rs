pub mod services;
pub mod session;

pub use services::{current_user, login, logout, signup, update_profile};
pub use session::SessionStore;
