//! Error types for store and authentication operations.

use thiserror::Error;

use crate::model::{PostId, UserId};

/// Why a password was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeakPassword {
    #[error("A senha deve ter pelo menos 6 caracteres.")]
    TooShort,

    #[error("A senha deve conter pelo menos uma letra.")]
    NoLetter,

    #[error("A senha deve conter pelo menos um número.")]
    NoDigit,
}

/// Errors that can occur when reading from or writing to a store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email inválido.")]
    InvalidEmail,

    #[error("{0}")]
    WeakPassword(#[from] WeakPassword),

    #[error("Email já registrado.")]
    EmailExists,

    #[error("Título é obrigatório.")]
    EmptyTitle,

    #[error("Conteúdo é obrigatório.")]
    EmptyContent,

    #[error("Comentário não pode estar vazio.")]
    EmptyComment,

    #[error("Usuário não encontrado: {0}")]
    NoSuchUser(UserId),

    #[error("Post não encontrado: {0}")]
    NoSuchPost(PostId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid snapshot: {0}")]
    Snapshot(String),
}

impl StoreError {
    /// Whether the error was caused by the submitted data, as opposed to the storage.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            StoreError::Io(_) | StoreError::Json(_) | StoreError::Snapshot(_)
        )
    }

    /// The message to show to the user.
    ///
    /// Validation errors explain themselves; storage failures are reported generically, the
    /// details only go to the log.
    pub fn user_message(&self) -> String {
        if self.is_validation() {
            self.to_string()
        } else {
            "Erro ao acessar os dados. Tente novamente.".to_string()
        }
    }
}

/// Errors that can occur when registering or logging in.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email e senha são obrigatórios.")]
    MissingFields,

    #[error("Senhas não coincidem.")]
    PasswordMismatch,

    #[error("Email ou senha incorretos.")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Store(err) => err.user_message(),
            AuthError::Hash(_) => {
                "Erro na autenticação. Tente novamente.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
