use crate::domain::password;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;

/// A registered account as loaded from the store. The hash is opaque; nothing
/// outside [password] interprets it.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct AppUser {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
}

/// Data submitted to register a new account. `password` is plaintext straight
/// off the form; it is hashed before anything touches the store.
#[cfg_attr(test, derive(Clone))]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
}

pub mod driven_ports {
    use super::*;

    pub trait UserReader {
        async fn get_by_id(
            &self,
            id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<AppUser>, anyhow::Error>;
        async fn get_by_username(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<AppUser>, anyhow::Error>;
    }

    pub trait UserWriter {
        /// Persists a user whose password has already been hashed, returning the new id
        async fn create_user(
            &self,
            username: &str,
            password_hash: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;
    }

    pub trait DetectUser {
        async fn username_exists(
            &self,
            username: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum RegisterError {
        #[error("that username is already registered")]
        UsernameTaken,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum AuthenticateError {
        /// An unknown username and a wrong password collapse into this single
        /// variant so a login response cannot reveal which one it was.
        #[error("username or password did not match")]
        BadCredentials,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait UserPort {
        async fn register(
            &self,
            registration: &RegisterUser,
            ext_cxn: &mut impl ExternalConnectivity,
            u_detect: &impl driven_ports::DetectUser,
            u_writer: &impl driven_ports::UserWriter,
        ) -> Result<i32, RegisterError>;
        async fn authenticate(
            &self,
            username: &str,
            candidate_password: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<AppUser, AuthenticateError>;
    }
}

pub struct UserService {}

impl driving_ports::UserPort for UserService {
    async fn register(
        &self,
        registration: &RegisterUser,
        ext_cxn: &mut impl ExternalConnectivity,
        u_detect: &impl driven_ports::DetectUser,
        u_writer: &impl driven_ports::UserWriter,
    ) -> Result<i32, driving_ports::RegisterError> {
        // The existence check and the insert are separate statements; a
        // duplicate racing through the gap lands on the unique constraint.
        let username_taken = u_detect
            .username_exists(&registration.username, &mut *ext_cxn)
            .await
            .context("checking username availability")?;
        if username_taken {
            return Err(driving_ports::RegisterError::UsernameTaken);
        }

        let password_hash =
            password::hash_password(&registration.password).context("hashing a new password")?;
        let new_id = u_writer
            .create_user(&registration.username, &password_hash, &mut *ext_cxn)
            .await
            .context("persisting a new user")?;

        Ok(new_id)
    }

    async fn authenticate(
        &self,
        username: &str,
        candidate_password: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl driven_ports::UserReader,
    ) -> Result<AppUser, driving_ports::AuthenticateError> {
        let user_lookup = u_reader
            .get_by_username(username, &mut *ext_cxn)
            .await
            .context("looking up a user at login")?;
        let Some(user) = user_lookup else {
            return Err(driving_ports::AuthenticateError::BadCredentials);
        };

        if password::verify_password(&user.password_hash, candidate_password) {
            Ok(user)
        } else {
            Err(driving_ports::AuthenticateError::BadCredentials)
        }
    }
}
