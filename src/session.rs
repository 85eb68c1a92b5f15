// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;

use tracing::{info, span, Level};

/// Errors raised while acquiring an elevated session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("domain login '{0}' is not of the form DOMAIN\\username")]
    MalformedLogin(String),

    #[error("no password supplied for {0}")]
    MissingPassword(String),
}

/// Credentials for a domain login of the form DOMAIN\username.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    domain: String,
    login: String,
    password: String,
}

impl Credentials {
    /// Splits the domain login on its backslash. Anything other than exactly one backslash leaves
    /// both the domain and the login empty.
    pub fn new(domain_login: &str, password: &str) -> Credentials {
        let (domain, login) = match domain_login.split('\\').collect::<Vec<&str>>().as_slice() {
            [domain, login] => (domain.to_string(), login.to_string()),
            _ => (String::new(), String::new()),
        };

        Credentials {
            domain,
            login,
            password: password.to_string(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    /// The qualified user name.
    pub fn user(&self) -> String {
        format!("{}\\{}", self.domain, self.login)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("domain", &self.domain)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The login the monitor runs for. Holds the credentials for as long as the session is live;
/// releasing the session wipes them.
///
/// Reading the local counter needs no elevation, so no sample ever uses the credentials. They are
/// validated up front and kept only for the lifetime of the run.
pub struct Session {
    credentials: Option<Credentials>,
    user: String,
}

impl Session {
    /// Acquires a session for the given credentials.
    pub fn acquire(credentials: Credentials) -> Result<Session, SessionError> {
        let span = span!(Level::INFO, "acquire session");
        let _enter = span.enter();

        if credentials.domain.is_empty() || credentials.login.is_empty() {
            return Err(SessionError::MalformedLogin(credentials.user()));
        }
        if credentials.password.is_empty() {
            return Err(SessionError::MissingPassword(credentials.user()));
        }

        let user = credentials.user();
        info!(user, "Session acquired.");
        Ok(Session {
            credentials: Some(credentials),
            user,
        })
    }

    /// The user the session runs as.
    pub fn user(&self) -> String {
        self.user.clone()
    }

    /// Returns true while the session holds its credentials.
    pub fn is_active(&self) -> bool {
        self.credentials.is_some()
    }

    /// Releases the session. Releasing twice is a no-op.
    pub fn release(&mut self) {
        if let Some(mut credentials) = self.credentials.take() {
            credentials.password.clear();
            info!(user = self.user, "Session released.");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release();
    }
}
