mod pem;
mod validator;

pub use pem::{load_certificates, load_private_key};
pub use validator::RustlsContextValidator;
