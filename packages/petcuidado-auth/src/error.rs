//! Definições de erro para a biblioteca petcuidado-auth

use thiserror::Error;

/// Erros do serviço de identidade
#[derive(Error, Debug)]
pub enum AuthError {
    /// Falha de transporte ou indisponibilidade do provedor
    #[error("Falha no provedor de identidade: {0}")]
    Provider(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Cadastro recusado: {0}")]
    SignUpRejected(String),
}
