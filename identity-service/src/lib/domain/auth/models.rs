use crate::domain::identity::models::EmailAddress;

/// Command to register a new identity with validated fields.
///
/// The password arrives in plaintext and is hashed exactly once by the
/// service before anything is stored.
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterCommand {
    pub fn new(
        email: EmailAddress,
        password: String,
        first_name: String,
        last_name: String,
    ) -> Self {
        Self {
            email,
            password,
            first_name,
            last_name,
        }
    }
}
